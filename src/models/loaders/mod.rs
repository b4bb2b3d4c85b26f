pub mod workbook_loader;

pub use workbook_loader::{read_workbook, RawWorkbook, SheetRows};
