pub mod aggregate;

pub use aggregate::{CashFlowRecord, FinancialRecord};
