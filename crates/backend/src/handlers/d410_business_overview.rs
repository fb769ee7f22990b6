use axum::extract::Query;
use axum::Json;
use contracts::dashboards::d410_business_overview::{
    CompanySearchQuery, DashboardSnapshot, NewCompanyRequest,
};
use contracts::domain::a031_portfolio_company::PortfolioRecord;

use super::{app, ApiError};

/// GET /api/d410/dashboard
pub async fn dashboard() -> Result<Json<DashboardSnapshot>, ApiError> {
    Ok(Json(app()?.dashboard.snapshot()))
}

/// GET /api/d410/companies?search=
pub async fn companies(
    Query(query): Query<CompanySearchQuery>,
) -> Result<Json<Vec<PortfolioRecord>>, ApiError> {
    let companies = app()?.dashboard.search_companies(query.search.as_deref());
    Ok(Json(companies))
}

/// POST /api/d410/companies
pub async fn add_company(
    Json(request): Json<NewCompanyRequest>,
) -> Result<Json<PortfolioRecord>, ApiError> {
    let company = app()?.dashboard.add_company(&request)?;
    Ok(Json(company))
}
