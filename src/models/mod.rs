pub mod bank;
pub mod cell;
pub mod loaders;
pub mod question;
pub mod schema;

pub use bank::{BankSummary, QuestionBank};
pub use cell::Cell;
pub use loaders::{read_workbook, RawWorkbook};
pub use question::{EstimateRange, Key, Question, QuestionId, QuestionRef, TestId};
pub use schema::{
    ColumnAddressing, PlayPool, QuestionColumns, SchemaDescriptor, TestColumns, TestReferenceKind,
};
