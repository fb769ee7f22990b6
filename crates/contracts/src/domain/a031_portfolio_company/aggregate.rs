use serde::{Deserialize, Serialize};

/// Status assigned to a company when the source has none
pub const DEFAULT_STATUS: &str = "Active";

/// Industry assigned to a manually added company without one
pub const DEFAULT_INDUSTRY: &str = "Other";

/// Portfolio company under contract.
///
/// `contract_start` / `contract_end` hold `YYYY-MM-DD` when the source value
/// could be read as a date and the original text otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRecord {
    /// 1-based position of the source row; used as a list key only
    pub id: u32,
    pub name: String,
    pub contract_start: String,
    pub contract_end: String,
    pub workers: i64,
    pub contract_value: i64,
    pub status: String,
    pub industry: String,
}

impl PortfolioRecord {
    /// Case-insensitive search over name and industry
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.industry.to_lowercase().contains(&term)
    }
}
