pub mod raw_table;
pub mod sheet_document;

pub use raw_table::RawTable;
pub use sheet_document::SheetDocument;
