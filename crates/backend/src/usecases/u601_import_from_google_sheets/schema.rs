//! Static field schemas of the importable datasets and the cell coercion rules.
//!
//! Each dataset kind has a fixed list of dashboard fields. A field's
//! [`FieldKind`] decides how a raw cell string is turned into a value:
//!
//! | kind      | rule                                                          | fallback        |
//! |-----------|---------------------------------------------------------------|-----------------|
//! | `Text`    | passed through                                                | -               |
//! | `Decimal` | separators and currency symbols stripped, leading float read  | `0.0`           |
//! | `Integer` | separators and currency symbols stripped, leading integer read | `0`            |
//! | `Date`    | common date layouts read, emitted as `YYYY-MM-DD`             | original text   |

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use contracts::domain::a030_financial_month::FinancialRecord;
use contracts::domain::a031_portfolio_company::{PortfolioRecord, DEFAULT_STATUS};
use contracts::enums::DatasetKind;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Decimal,
    Integer,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

pub const FINANCIAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("month", FieldKind::Text),
    FieldSpec::new("revenue", FieldKind::Decimal),
    FieldSpec::new("expenses", FieldKind::Decimal),
    FieldSpec::new("profit", FieldKind::Decimal),
    FieldSpec::new("inflow", FieldKind::Decimal),
    FieldSpec::new("outflow", FieldKind::Decimal),
];

pub const PORTFOLIO_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", FieldKind::Text),
    FieldSpec::new("contractStart", FieldKind::Date),
    FieldSpec::new("contractEnd", FieldKind::Date),
    FieldSpec::new("workers", FieldKind::Integer),
    FieldSpec::new("contractValue", FieldKind::Integer),
    FieldSpec::new("status", FieldKind::Text),
    FieldSpec::new("industry", FieldKind::Text),
];

/// The only field a portfolio record cannot do without
pub const REQUIRED_PORTFOLIO_FIELD: &str = "name";

pub fn fields_for(kind: DatasetKind) -> &'static [FieldSpec] {
    match kind {
        DatasetKind::Financial => FINANCIAL_FIELDS,
        DatasetKind::Portfolio => PORTFOLIO_FIELDS,
    }
}

pub fn field_spec(kind: DatasetKind, name: &str) -> Option<&'static FieldSpec> {
    fields_for(kind).iter().find(|spec| spec.name == name)
}

// ============================================================================
// Coercion
// ============================================================================

/// Typed value of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Decimal(f64),
    Integer(i64),
    /// `YYYY-MM-DD`, or the source text when it was not a date
    Date(String),
}

/// Coerced cell plus whether the fallback rule had to be applied to a
/// non-empty source value
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: CellValue,
    pub fell_back: bool,
}

impl FieldKind {
    pub fn coerce(&self, raw: &str) -> Coerced {
        let blank = raw.trim().is_empty();
        match self {
            FieldKind::Text => Coerced {
                value: CellValue::Text(raw.to_string()),
                fell_back: false,
            },
            FieldKind::Decimal => {
                let parsed = parse_decimal(raw);
                Coerced {
                    fell_back: parsed.is_none() && !blank,
                    value: CellValue::Decimal(parsed.unwrap_or(0.0)),
                }
            }
            FieldKind::Integer => {
                let parsed = parse_integer(raw);
                Coerced {
                    fell_back: parsed.is_none() && !blank,
                    value: CellValue::Integer(parsed.unwrap_or(0)),
                }
            }
            FieldKind::Date => match parse_date(raw) {
                Some(date) => Coerced {
                    value: CellValue::Date(date.format("%Y-%m-%d").to_string()),
                    fell_back: false,
                },
                None => Coerced {
                    value: CellValue::Date(raw.to_string()),
                    fell_back: !blank,
                },
            },
        }
    }
}

/// Removes thousands separators, currency symbols and spacing from a number
fn strip_number_noise(raw: &str) -> String {
    raw.chars()
        .filter(|c| {
            !c.is_whitespace()
                && !matches!(
                    c,
                    ',' | '$' | '€' | '£' | '¥' | '₽' | '₹' | '₩' | '\u{a0}' | '\u{202f}'
                )
        })
        .collect()
}

/// Longest prefix that reads as a number: optional sign, digits, and for
/// decimals an optional fraction and exponent. Empty when there is none.
fn numeric_prefix(s: &str, allow_fraction: bool) -> &str {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if end < len && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if allow_fraction && end < len && bytes[end] == b'.' {
        let mut j = end + 1;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if has_digits || j > end + 1 {
            has_digits = true;
            end = j;
        }
    }
    if !has_digits {
        return "";
    }

    if allow_fraction && end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }
    &s[..end]
}

/// Reads a finite float, e.g. `"$45,000.50"` -> `45000.5`
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = strip_number_noise(raw);
    numeric_prefix(&cleaned, true)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Reads a whole number, ignoring any fraction, e.g. `"1,250.7"` -> `1250`
pub fn parse_integer(raw: &str) -> Option<i64> {
    let cleaned = strip_number_noise(raw);
    numeric_prefix(&cleaned, false).parse::<i64>().ok()
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Reads the date layouts spreadsheets commonly produce
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

// ============================================================================
// Record builder
// ============================================================================

/// Fields assigned to one record so far; unassigned fields are absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBuilder {
    values: BTreeMap<&'static str, CellValue>,
}

impl RecordBuilder {
    pub fn assign(&mut self, field: &'static str, value: CellValue) {
        self.values.insert(field, value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.values.get(field) {
            Some(CellValue::Text(s)) | Some(CellValue::Date(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn decimal(&self, field: &str) -> Option<f64> {
        match self.values.get(field) {
            Some(CellValue::Decimal(v)) => Some(*v),
            Some(CellValue::Integer(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        match self.values.get(field) {
            Some(CellValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn into_financial(self) -> FinancialRecord {
        FinancialRecord {
            month: self.text("month").unwrap_or_default().to_string(),
            revenue: self.decimal("revenue").unwrap_or(0.0),
            expenses: self.decimal("expenses").unwrap_or(0.0),
            profit: self.decimal("profit").unwrap_or(0.0),
            inflow: self.decimal("inflow"),
            outflow: self.decimal("outflow"),
        }
    }

    /// `None` when the record has no company name
    pub fn into_portfolio(self, id: u32) -> Option<PortfolioRecord> {
        let name = self
            .text(REQUIRED_PORTFOLIO_FIELD)
            .filter(|n| !n.trim().is_empty())?
            .to_string();
        let status = self
            .text("status")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_STATUS)
            .to_string();

        Some(PortfolioRecord {
            id,
            name,
            contract_start: self.text("contractStart").unwrap_or_default().to_string(),
            contract_end: self.text("contractEnd").unwrap_or_default().to_string(),
            workers: self.integer("workers").unwrap_or(0),
            contract_value: self.integer("contractValue").unwrap_or(0),
            status,
            industry: self.text("industry").unwrap_or_default().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_strips_separators_and_currency() {
        assert_eq!(parse_decimal("45,000"), Some(45000.0));
        assert_eq!(parse_decimal("$1,234.50"), Some(1234.5));
        assert_eq!(parse_decimal("€ 12 500"), Some(12500.0));
        assert_eq!(parse_decimal("-300"), Some(-300.0));
        assert_eq!(parse_decimal(".5"), Some(0.5));
    }

    #[test]
    fn test_parse_decimal_reads_leading_number() {
        assert_eq!(parse_decimal("45000 USD"), Some(45000.0));
        assert_eq!(parse_decimal("1.5e3k"), Some(1500.0));
        assert_eq!(parse_decimal("12e"), Some(12.0));
    }

    #[test]
    fn test_parse_decimal_rejects_non_numbers() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("n/a"), None);
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal("Infinity"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("1e999"), None);
    }

    #[test]
    fn test_parse_integer_truncates() {
        assert_eq!(parse_integer("1,250.7"), Some(1250));
        assert_eq!(parse_integer("$450,000"), Some(450000));
        assert_eq!(parse_integer("45 people"), Some(45));
        assert_eq!(parse_integer("about 45"), None);
    }

    #[test]
    fn test_parse_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_date("2024-01-15"), expected);
        assert_eq!(parse_date("01/15/2024"), expected);
        assert_eq!(parse_date("2024/01/15"), expected);
        assert_eq!(parse_date("January 15, 2024"), expected);
        assert_eq!(parse_date("15 Jan 2024"), expected);
        assert_eq!(parse_date("2024-01-15T10:30:00Z"), expected);
        assert_eq!(parse_date("2024-01-15 08:00:00"), expected);
    }

    #[test]
    fn test_date_coercion_is_stable_and_passes_through_garbage() {
        let first = FieldKind::Date.coerce("2024-01-15");
        assert_eq!(first.value, CellValue::Date("2024-01-15".into()));

        let again = FieldKind::Date.coerce("2024-01-15");
        assert_eq!(first, again);

        let garbage = FieldKind::Date.coerce("not-a-date");
        assert_eq!(garbage.value, CellValue::Date("not-a-date".into()));
        assert!(garbage.fell_back);
    }

    #[test]
    fn test_numeric_coercion_falls_back_to_zero() {
        let coerced = FieldKind::Decimal.coerce("TBD");
        assert_eq!(coerced.value, CellValue::Decimal(0.0));
        assert!(coerced.fell_back);

        let blank = FieldKind::Integer.coerce("");
        assert_eq!(blank.value, CellValue::Integer(0));
        assert!(!blank.fell_back);
    }

    #[test]
    fn test_portfolio_builder_requires_name_and_defaults_status() {
        let mut builder = RecordBuilder::default();
        builder.assign("workers", CellValue::Integer(12));
        assert!(builder.clone().into_portfolio(1).is_none());

        builder.assign("name", CellValue::Text("DataDrive Inc".into()));
        builder.assign("status", CellValue::Text(String::new()));
        let record = builder.into_portfolio(4).unwrap();
        assert_eq!(record.id, 4);
        assert_eq!(record.status, "Active");
        assert_eq!(record.workers, 12);
        assert_eq!(record.contract_value, 0);
    }

    #[test]
    fn test_financial_builder_defaults_missing_numbers() {
        let mut builder = RecordBuilder::default();
        builder.assign("month", CellValue::Text("Jan".into()));
        builder.assign("revenue", CellValue::Decimal(45000.0));

        let record = builder.into_financial();
        assert_eq!(record.month, "Jan");
        assert_eq!(record.revenue, 45000.0);
        assert_eq!(record.expenses, 0.0);
        assert_eq!(record.inflow, None);
    }

    #[test]
    fn test_field_lookup() {
        assert_eq!(
            field_spec(DatasetKind::Portfolio, "contractValue").map(|s| s.kind),
            Some(FieldKind::Integer)
        );
        assert!(field_spec(DatasetKind::Financial, "name").is_none());
    }
}
