use serde::{Deserialize, Serialize};

// ============================================================================
// Financial month
// ============================================================================

/// One month of revenue/expenses figures shown on the revenue chart.
///
/// Numeric fields are always finite; values that could not be read from the
/// source are stored as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    pub month: String,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,

    /// Explicit cash inflow, when the source sheet has a column for it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflow: Option<f64>,

    /// Explicit cash outflow, when the source sheet has a column for it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outflow: Option<f64>,
}

impl FinancialRecord {
    pub fn new(month: impl Into<String>, revenue: f64, expenses: f64, profit: f64) -> Self {
        Self {
            month: month.into(),
            revenue,
            expenses,
            profit,
            inflow: None,
            outflow: None,
        }
    }

    /// Cash-flow view of the month: explicit inflow/outflow when present,
    /// revenue/expenses otherwise
    pub fn cash_flow(&self) -> CashFlowRecord {
        CashFlowRecord {
            month: self.month.clone(),
            inflow: self.inflow.unwrap_or(self.revenue),
            outflow: self.outflow.unwrap_or(self.expenses),
        }
    }
}

/// Row of the cash-flow chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRecord {
    pub month: String,
    pub inflow: f64,
    pub outflow: f64,
}
