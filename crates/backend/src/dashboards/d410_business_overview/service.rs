use contracts::dashboards::d410_business_overview::{DashboardSummary, NewCompanyRequest};
use contracts::domain::a030_financial_month::FinancialRecord;
use contracts::domain::a031_portfolio_company::{PortfolioRecord, DEFAULT_INDUSTRY, DEFAULT_STATUS};
use thiserror::Error;

use crate::usecases::u601_import_from_google_sheets::schema::parse_integer;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("Field '{0}' is required")]
    MissingField(&'static str),
}

/// Headline totals. Profit is revenue minus expenses; the margin is a
/// percentage rounded to one decimal and absent without revenue.
pub fn summarize(financial: &[FinancialRecord], companies: &[PortfolioRecord]) -> DashboardSummary {
    let total_revenue: f64 = financial.iter().map(|r| r.revenue).sum();
    let total_expenses: f64 = financial.iter().map(|r| r.expenses).sum();
    let total_profit = total_revenue - total_expenses;
    let profit_margin = if total_revenue != 0.0 {
        Some((total_profit / total_revenue * 1000.0).round() / 10.0)
    } else {
        None
    };

    DashboardSummary {
        total_revenue,
        total_expenses,
        total_profit,
        profit_margin,
        company_count: companies.len(),
        total_workers: companies.iter().map(|c| c.workers).sum(),
        total_contract_value: companies.iter().map(|c| c.contract_value).sum(),
    }
}

/// Validates the form and builds the company record with the given id
pub fn new_company(request: &NewCompanyRequest, id: u32) -> Result<PortfolioRecord, DashboardError> {
    let required = |value: &str, field: &'static str| {
        let value = value.trim();
        if value.is_empty() {
            Err(DashboardError::MissingField(field))
        } else {
            Ok(value.to_string())
        }
    };

    let name = required(&request.name, "name")?;
    let contract_start = required(&request.contract_start, "contractStart")?;
    let contract_end = required(&request.contract_end, "contractEnd")?;
    let industry = match request.industry.trim() {
        "" => DEFAULT_INDUSTRY.to_string(),
        other => other.to_string(),
    };

    Ok(PortfolioRecord {
        id,
        name,
        contract_start,
        contract_end,
        // Same digit rules as imported cells, "1,200" is 1200
        workers: parse_integer(&request.workers).unwrap_or(0),
        contract_value: parse_integer(&request.contract_value).unwrap_or(0),
        status: DEFAULT_STATUS.to_string(),
        industry,
    })
}

pub fn search_companies(companies: &[PortfolioRecord], term: Option<&str>) -> Vec<PortfolioRecord> {
    match term {
        Some(term) => companies.iter().filter(|c| c.matches(term)).cloned().collect(),
        None => companies.to_vec(),
    }
}
