use contracts::domain::a030_financial_month::FinancialRecord;
use contracts::domain::a031_portfolio_company::PortfolioRecord;

/// Sample months shown until the first financial import
pub fn financial() -> Vec<FinancialRecord> {
    [
        ("Jan", 45000.0, 32000.0, 13000.0),
        ("Feb", 52000.0, 35000.0, 17000.0),
        ("Mar", 48000.0, 33000.0, 15000.0),
        ("Apr", 61000.0, 38000.0, 23000.0),
        ("May", 55000.0, 36000.0, 19000.0),
        ("Jun", 67000.0, 41000.0, 26000.0),
    ]
    .into_iter()
    .map(|(month, revenue, expenses, profit)| FinancialRecord::new(month, revenue, expenses, profit))
    .collect()
}

/// Sample companies shown until the first portfolio import
pub fn companies() -> Vec<PortfolioRecord> {
    [
        (1, "TechCorp Solutions", "2024-01-15", "2025-01-14", 45, 450000, "Active", "Technology"),
        (2, "Digital Innovations", "2024-03-01", "2024-12-31", 32, 320000, "Active", "Digital Marketing"),
        (3, "CloudFirst Ltd", "2024-02-10", "2025-02-09", 28, 280000, "Active", "Cloud Services"),
        (4, "DataDrive Inc", "2024-04-01", "2024-10-31", 18, 180000, "Ending Soon", "Data Analytics"),
    ]
    .into_iter()
    .map(
        |(id, name, start, end, workers, value, status, industry)| PortfolioRecord {
            id,
            name: name.to_string(),
            contract_start: start.to_string(),
            contract_end: end.to_string(),
            workers,
            contract_value: value,
            status: status.to_string(),
            industry: industry.to_string(),
        },
    )
    .collect()
}
