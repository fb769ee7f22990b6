use chrono::{DateTime, Utc};
use contracts::dashboards::d410_business_overview::{DashboardSnapshot, NewCompanyRequest};
use contracts::domain::a030_financial_month::FinancialRecord;
use contracts::domain::a031_portfolio_company::PortfolioRecord;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{seed, service, DashboardError};

#[derive(Debug, Default)]
struct DashboardState {
    financial: Vec<FinancialRecord>,
    companies: Vec<PortfolioRecord>,
    financial_updated_at: Option<DateTime<Utc>>,
    portfolio_updated_at: Option<DateTime<Utc>>,
}

/// In-memory read model of the overview page.
///
/// Imports replace a whole collection at once; readers see either the old or
/// the new collection, never a mix.
#[derive(Debug, Default)]
pub struct DashboardStore {
    state: RwLock<DashboardState>,
}

impl DashboardStore {
    /// Store holding the sample data shown before the first import
    pub fn seeded() -> Self {
        Self {
            state: RwLock::new(DashboardState {
                financial: seed::financial(),
                companies: seed::companies(),
                ..Default::default()
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, DashboardState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DashboardState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn replace_financial(&self, records: Vec<FinancialRecord>, at: DateTime<Utc>) {
        let mut state = self.write();
        tracing::info!(
            "Dashboard: {} financial records replaced by {}",
            state.financial.len(),
            records.len()
        );
        state.financial = records;
        state.financial_updated_at = Some(at);
    }

    pub fn replace_companies(&self, records: Vec<PortfolioRecord>, at: DateTime<Utc>) {
        let mut state = self.write();
        tracing::info!(
            "Dashboard: {} companies replaced by {}",
            state.companies.len(),
            records.len()
        );
        state.companies = records;
        state.portfolio_updated_at = Some(at);
    }

    pub fn financial(&self) -> Vec<FinancialRecord> {
        self.read().financial.clone()
    }

    pub fn companies(&self) -> Vec<PortfolioRecord> {
        self.read().companies.clone()
    }

    pub fn search_companies(&self, term: Option<&str>) -> Vec<PortfolioRecord> {
        service::search_companies(&self.read().companies, term)
    }

    /// Appends a hand-entered company with id = current count + 1
    pub fn add_company(&self, request: &NewCompanyRequest) -> Result<PortfolioRecord, DashboardError> {
        let mut state = self.write();
        let id = state.companies.len() as u32 + 1;
        let company = service::new_company(request, id)?;
        state.companies.push(company.clone());
        tracing::info!("Dashboard: company '{}' added with id {}", company.name, id);
        Ok(company)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let state = self.read();
        DashboardSnapshot {
            cash_flow: state.financial.iter().map(FinancialRecord::cash_flow).collect(),
            summary: service::summarize(&state.financial, &state.companies),
            financial: state.financial.clone(),
            companies: state.companies.clone(),
            financial_updated_at: state.financial_updated_at,
            portfolio_updated_at: state.portfolio_updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::enums::DatasetKind;

    #[test]
    fn test_seeded_snapshot() {
        let store = DashboardStore::seeded();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.financial.len(), 6);
        assert_eq!(snapshot.companies.len(), 4);
        assert_eq!(snapshot.cash_flow[0].inflow, 45000.0);
        assert_eq!(snapshot.cash_flow[0].outflow, 32000.0);
        assert!(snapshot.updated_at(DatasetKind::Financial).is_none());
    }

    #[test]
    fn test_replace_is_per_kind() {
        let store = DashboardStore::seeded();
        let at = Utc::now();
        let mut july = FinancialRecord::new("Jul", 70000.0, 40000.0, 30000.0);
        july.inflow = Some(65000.0);
        store.replace_financial(vec![july], at);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.financial.len(), 1);
        assert_eq!(snapshot.cash_flow[0].inflow, 65000.0);
        assert_eq!(snapshot.cash_flow[0].outflow, 40000.0);
        assert_eq!(snapshot.companies.len(), 4);
        assert_eq!(snapshot.updated_at(DatasetKind::Financial), Some(at));
        assert!(snapshot.updated_at(DatasetKind::Portfolio).is_none());
    }

    #[test]
    fn test_add_company_assigns_next_id() {
        let store = DashboardStore::seeded();
        let request = NewCompanyRequest {
            name: "Northwind".into(),
            contract_start: "2024-06-01".into(),
            contract_end: "2025-05-31".into(),
            workers: "1,200".into(),
            contract_value: "$90,000".into(),
            industry: "Logistics".into(),
        };

        let company = store.add_company(&request).unwrap();
        assert_eq!(company.id, 5);
        assert_eq!(company.workers, 1200);
        assert_eq!(company.contract_value, 90000);
        assert_eq!(store.search_companies(Some("logistics")).len(), 1);

        let invalid = NewCompanyRequest::default();
        assert!(store.add_company(&invalid).is_err());
        assert_eq!(store.companies().len(), 5);
    }
}
