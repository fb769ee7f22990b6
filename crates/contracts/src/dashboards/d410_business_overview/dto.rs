use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::a030_financial_month::{CashFlowRecord, FinancialRecord};
use crate::domain::a031_portfolio_company::PortfolioRecord;
use crate::enums::DatasetKind;

/// Everything the overview page renders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub financial: Vec<FinancialRecord>,
    pub cash_flow: Vec<CashFlowRecord>,
    pub companies: Vec<PortfolioRecord>,
    pub summary: DashboardSummary,
    /// Last commit time per dataset kind; absent while showing seed data
    pub financial_updated_at: Option<DateTime<Utc>>,
    pub portfolio_updated_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    pub fn updated_at(&self, kind: DatasetKind) -> Option<DateTime<Utc>> {
        match kind {
            DatasetKind::Financial => self.financial_updated_at,
            DatasetKind::Portfolio => self.portfolio_updated_at,
        }
    }
}

/// Headline figures of the overview cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_profit: f64,
    /// Profit as a percentage of revenue, absent when there is no revenue
    pub profit_margin: Option<f64>,
    pub company_count: usize,
    pub total_workers: i64,
    pub total_contract_value: i64,
}

/// Form payload for adding a company by hand
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompanyRequest {
    pub name: String,
    pub contract_start: String,
    pub contract_end: String,
    /// Free text as typed in the form, parsed as an integer
    #[serde(default)]
    pub workers: String,
    #[serde(default)]
    pub contract_value: String,
    #[serde(default)]
    pub industry: String,
}

/// GET /api/d410/companies query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanySearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}
