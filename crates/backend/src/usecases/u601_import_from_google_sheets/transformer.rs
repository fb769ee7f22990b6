//! Raw table + column mapping -> typed records. Pure functions, no I/O.

use contracts::domain::a030_financial_month::FinancialRecord;
use contracts::domain::a031_portfolio_company::PortfolioRecord;
use contracts::enums::DatasetKind;
use contracts::shared::RawTable;
use contracts::usecases::u601_import_from_google_sheets::{ColumnMapping, ValidationResult};
use std::collections::BTreeMap;

use super::schema::{self, FieldSpec, RecordBuilder, REQUIRED_PORTFOLIO_FIELD};

/// Records of one transform plus the per-field validation report
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult<T> {
    pub records: Vec<T>,
    /// Data rows in the table (header excluded)
    pub total_rows: usize,
    pub validation: Vec<ValidationResult>,
}

impl<T> TransformResult<T> {
    fn empty(validation: Vec<ValidationResult>) -> Self {
        Self {
            records: Vec::new(),
            total_rows: 0,
            validation,
        }
    }
}

/// A mapped field whose column was found in the header
struct ResolvedField {
    spec: &'static FieldSpec,
    column: usize,
}

#[derive(Default)]
struct FieldStats {
    assigned: usize,
    fell_back: usize,
}

/// First header label equal to `label` ignoring case
fn find_column(header: &[String], label: &str) -> Option<usize> {
    let wanted = label.to_lowercase();
    header.iter().position(|h| h.to_lowercase() == wanted)
}

fn resolve_fields(
    kind: DatasetKind,
    header: &[String],
    mapping: &ColumnMapping,
    validation: &mut Vec<ValidationResult>,
) -> Vec<ResolvedField> {
    let mut resolved = Vec::new();
    for entry in mapping.mapped() {
        let Some(spec) = schema::field_spec(kind, &entry.dashboard_field) else {
            tracing::debug!("Ignoring unknown {} field '{}'", kind, entry.dashboard_field);
            continue;
        };
        match find_column(header, &entry.sheet_column) {
            Some(column) => resolved.push(ResolvedField { spec, column }),
            None => validation.push(ValidationResult::warning(
                spec.name,
                format!("Column '{}' not found in sheet", entry.sheet_column),
                None,
            )),
        }
    }
    resolved
}

/// Builds one record per data row, in raw row order
fn build_rows(
    table: &RawTable,
    fields: &[ResolvedField],
    stats: &mut BTreeMap<&'static str, FieldStats>,
) -> Vec<RecordBuilder> {
    table
        .data_rows()
        .iter()
        .map(|row| {
            let mut builder = RecordBuilder::default();
            for field in fields {
                let Some(cell) = row.get(field.column) else {
                    continue;
                };
                let coerced = field.spec.kind.coerce(cell);
                let entry = stats.entry(field.spec.name).or_default();
                entry.assigned += 1;
                if coerced.fell_back {
                    entry.fell_back += 1;
                }
                builder.assign(field.spec.name, coerced.value);
            }
            builder
        })
        .collect()
}

fn field_report(
    fields: &[ResolvedField],
    stats: &BTreeMap<&'static str, FieldStats>,
    validation: &mut Vec<ValidationResult>,
) {
    for field in fields {
        let (assigned, fell_back) = stats
            .get(field.spec.name)
            .map_or((0, 0), |s| (s.assigned, s.fell_back));
        let result = if assigned == 0 {
            ValidationResult::warning(field.spec.name, "Column has no values", Some(0))
        } else if fell_back > 0 {
            ValidationResult::warning(
                field.spec.name,
                format!("{} of {} values could not be parsed", fell_back, assigned),
                Some(fell_back),
            )
        } else {
            ValidationResult::valid(field.spec.name, format!("{} values imported", assigned))
        };
        validation.push(result);
    }
}

/// Transforms monthly financial rows. Numeric fields are always finite;
/// rows where no mapped column had a cell are dropped.
pub fn transform_financial(
    table: &RawTable,
    mapping: &ColumnMapping,
) -> TransformResult<FinancialRecord> {
    if !table.has_data() {
        return TransformResult::empty(Vec::new());
    }

    let mut validation = Vec::new();
    let fields = resolve_fields(DatasetKind::Financial, table.header(), mapping, &mut validation);
    let mut stats = BTreeMap::new();
    let rows = build_rows(table, &fields, &mut stats);
    field_report(&fields, &stats, &mut validation);

    let records = rows
        .into_iter()
        .filter(|builder| !builder.is_empty())
        .map(RecordBuilder::into_financial)
        .collect();

    TransformResult {
        records,
        total_rows: table.data_rows().len(),
        validation,
    }
}

/// Transforms portfolio rows. Ids are 1-based raw row positions and are
/// assigned before rows without a company name are dropped.
pub fn transform_portfolio(
    table: &RawTable,
    mapping: &ColumnMapping,
) -> TransformResult<PortfolioRecord> {
    if !table.has_data() {
        return TransformResult::empty(Vec::new());
    }

    let mut validation = Vec::new();
    if mapping.column_for(REQUIRED_PORTFOLIO_FIELD).is_none() {
        validation.push(ValidationResult::error(
            REQUIRED_PORTFOLIO_FIELD,
            "Required field is not mapped",
            None,
        ));
    }
    let fields = resolve_fields(DatasetKind::Portfolio, table.header(), mapping, &mut validation);
    let mut stats = BTreeMap::new();
    let rows = build_rows(table, &fields, &mut stats);
    field_report(&fields, &stats, &mut validation);

    let total_rows = rows.len();
    let records: Vec<PortfolioRecord> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, builder)| builder.into_portfolio(index as u32 + 1))
        .collect();

    let skipped = total_rows - records.len();
    if skipped > 0 {
        validation.push(ValidationResult::warning(
            REQUIRED_PORTFOLIO_FIELD,
            format!("{} rows without a company name were skipped", skipped),
            Some(skipped),
        ));
    }

    TransformResult {
        records,
        total_rows,
        validation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::usecases::u601_import_from_google_sheets::ValidationStatus;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            "A:Z",
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn portfolio_mapping() -> ColumnMapping {
        ColumnMapping::from_pairs([
            ("name", "Company"),
            ("contractStart", "Start"),
            ("contractEnd", "End"),
            ("workers", "Workers"),
            ("contractValue", "Value"),
            ("status", "Status"),
            ("industry", "Industry"),
        ])
    }

    #[test]
    fn test_fewer_than_two_rows_yield_nothing() {
        let header_only = table(&[&["Month", "Rev"]]);
        let empty = RawTable::default();
        let mapping = ColumnMapping::from_pairs([("month", "Month"), ("name", "Month")]);

        assert!(transform_financial(&header_only, &mapping).records.is_empty());
        assert!(transform_portfolio(&header_only, &mapping).records.is_empty());
        assert!(transform_financial(&empty, &mapping).records.is_empty());
        assert!(transform_portfolio(&empty, &mapping).records.is_empty());
    }

    #[test]
    fn test_financial_example_row() {
        let raw = table(&[&["Month", "Rev", "Exp"], &["Jan", "45,000", "32000"]]);
        let mapping = ColumnMapping::from_pairs([
            ("month", "Month"),
            ("revenue", "Rev"),
            ("expenses", "Exp"),
        ]);

        let result = transform_financial(&raw, &mapping);
        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.month, "Jan");
        assert_eq!(record.revenue, 45000.0);
        assert_eq!(record.expenses, 32000.0);
        assert_eq!(result.total_rows, 1);
        assert!(result
            .validation
            .iter()
            .all(|v| v.status == ValidationStatus::Valid));
    }

    #[test]
    fn test_financial_numbers_are_always_finite() {
        let raw = table(&[
            &["Month", "Revenue", "Expenses", "Profit"],
            &["Jan", "n/a", "1e999", "NaN"],
            &["Feb", "", "$1,000.50", "-Infinity"],
        ]);
        let mapping = ColumnMapping::from_pairs([
            ("month", "month"),
            ("revenue", "REVENUE"),
            ("expenses", "Expenses"),
            ("profit", "Profit"),
        ]);

        let result = transform_financial(&raw, &mapping);
        assert_eq!(result.records.len(), 2);
        for record in &result.records {
            assert!(record.revenue.is_finite());
            assert!(record.expenses.is_finite());
            assert!(record.profit.is_finite());
        }
        assert_eq!(result.records[0].expenses, 0.0);
        assert_eq!(result.records[1].expenses, 1000.5);

        let revenue = result.validation.iter().find(|v| v.field == "revenue").unwrap();
        assert_eq!(revenue.status, ValidationStatus::Warning);
        assert_eq!(revenue.count, Some(1));
    }

    #[test]
    fn test_financial_rows_without_any_cell_are_dropped() {
        let raw = table(&[&["Notes", "Month"], &["only notes"], &["x", "Mar"]]);
        let mapping = ColumnMapping::from_pairs([("month", "Month")]);

        let result = transform_financial(&raw, &mapping);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].month, "Mar");
        assert_eq!(result.records[0].revenue, 0.0);
        assert_eq!(result.total_rows, 2);
    }

    #[test]
    fn test_missing_and_duplicate_columns() {
        let raw = table(&[
            &["Month", "Revenue", "revenue"],
            &["Apr", "61000", "1"],
        ]);
        let mapping = ColumnMapping::from_pairs([
            ("month", "Month"),
            ("revenue", "Revenue"),
            ("expenses", "Costs"),
        ]);

        let result = transform_financial(&raw, &mapping);
        assert_eq!(result.records[0].revenue, 61000.0);
        assert_eq!(result.records[0].expenses, 0.0);

        let expenses = result.validation.iter().find(|v| v.field == "expenses").unwrap();
        assert_eq!(expenses.status, ValidationStatus::Warning);
        assert!(expenses.message.contains("Costs"));
    }

    #[test]
    fn test_cash_flow_columns_are_optional() {
        let raw = table(&[
            &["Month", "Revenue", "Cash In", "Cash Out"],
            &["May", "55000", "50,000", "30,000"],
        ]);
        let mapping = ColumnMapping::from_pairs([
            ("month", "Month"),
            ("revenue", "Revenue"),
            ("inflow", "Cash In"),
            ("outflow", "Cash Out"),
        ]);

        let record = &transform_financial(&raw, &mapping).records[0];
        assert_eq!(record.inflow, Some(50000.0));
        assert_eq!(record.outflow, Some(30000.0));
    }

    #[test]
    fn test_portfolio_rows_and_ids() {
        let raw = table(&[
            &["Company", "Start", "End", "Workers", "Value", "Status", "Industry"],
            &["TechCorp Solutions", "2024-01-15", "01/14/2025", "45", "$450,000", "", "Technology"],
            &["", "2024-03-01", "2024-12-31", "32", "320000", "Active", "Digital Marketing"],
            &["CloudFirst Ltd", "not-a-date", "2025-02-09", "many", "280000", "Ending Soon"],
        ]);

        let result = transform_portfolio(&raw, &portfolio_mapping());
        assert_eq!(result.total_rows, 3);
        assert_eq!(result.records.len(), 2);

        let first = &result.records[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.name, "TechCorp Solutions");
        assert_eq!(first.contract_start, "2024-01-15");
        assert_eq!(first.contract_end, "2025-01-14");
        assert_eq!(first.workers, 45);
        assert_eq!(first.contract_value, 450000);
        assert_eq!(first.status, "Active");

        let third = &result.records[1];
        assert_eq!(third.id, 3);
        assert_eq!(third.contract_start, "not-a-date");
        assert_eq!(third.workers, 0);
        assert_eq!(third.status, "Ending Soon");
        assert_eq!(third.industry, "");

        let skipped = result
            .validation
            .iter()
            .find(|v| v.field == "name" && v.status == ValidationStatus::Warning)
            .unwrap();
        assert_eq!(skipped.count, Some(1));
    }

    #[test]
    fn test_portfolio_without_name_mapping_is_empty() {
        let raw = table(&[&["Company", "Workers"], &["Acme", "3"]]);
        let mapping = ColumnMapping::from_pairs([("name", ""), ("workers", "Workers")]);

        let result = transform_portfolio(&raw, &mapping);
        assert!(result.records.is_empty());
        assert!(result
            .validation
            .iter()
            .any(|v| v.field == "name" && v.status == ValidationStatus::Error));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let raw = table(&[
            &["Company", "Start", "Workers"],
            &["Acme", "March 3, 2024", "1,200"],
            &["Globex", "2024-02-30", "7"],
        ]);
        let mut mapping = portfolio_mapping();
        mapping.set("contractStart", "start");

        let first = transform_portfolio(&raw, &mapping);
        let second = transform_portfolio(&raw, &mapping);
        assert_eq!(first, second);
        assert_eq!(first.records[0].contract_start, "2024-03-03");
        assert_eq!(first.records[0].workers, 1200);
        assert_eq!(first.records[1].contract_start, "2024-02-30");
    }
}
