pub mod response_store;
pub mod workbook_source;

pub use response_store::{DownloadRecord, MemoryResponseStore, OnlineResponse, ResponseStore};
pub use workbook_source::{source_for, FileSource, HttpSource, MemorySource, WorkbookSource};
