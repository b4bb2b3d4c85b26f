pub mod bank_cache;
pub mod question_bank_service;
pub mod row_normalizer;
pub mod sampler;
pub mod test_assembler;

pub use bank_cache::QuestionBankCache;
pub use question_bank_service::QuestionBankService;
pub use row_normalizer::{normalize_workbook, Normalized};
pub use test_assembler::{assemble_test, TestAssembly};
