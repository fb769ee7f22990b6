pub mod a030_financial_month;
pub mod a031_portfolio_company;
