pub mod aggregate;

pub use aggregate::{PortfolioRecord, DEFAULT_INDUSTRY, DEFAULT_STATUS};
