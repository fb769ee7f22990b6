//! A1 notation helpers: `A:Z`, `1:1`, `B2:D10`, `'Q1 Plan'!A:Z`.

use super::error::SpreadsheetError;

/// One corner of a range; a missing part means "unbounded"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// Zero-based column index
    pub column: Option<usize>,
    /// Zero-based row index
    pub row: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: Option<String>,
    pub start: CellRef,
    pub end: CellRef,
}

/// Zero-based index of a column label: `A` -> 0, `Z` -> 25, `AA` -> 26
pub fn column_index(label: &str) -> Option<usize> {
    if label.is_empty() || !label.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut index: usize = 0;
    for c in label.chars() {
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

fn parse_cell(part: &str, original: &str) -> Result<CellRef, SpreadsheetError> {
    let invalid = || SpreadsheetError::Fetch(format!("Invalid range '{}'", original));

    let split = part
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(part.len());
    let (letters, digits) = part.split_at(split);
    if letters.is_empty() && digits.is_empty() {
        return Err(invalid());
    }

    let column = if letters.is_empty() {
        None
    } else {
        Some(column_index(letters).ok_or_else(invalid)?)
    };
    let row = if digits.is_empty() {
        None
    } else {
        let n: usize = digits.parse().map_err(|_| invalid())?;
        if n == 0 {
            return Err(invalid());
        }
        Some(n - 1)
    };
    Ok(CellRef { column, row })
}

/// Splits `'Sheet ''A'''!A:Z` into the unquoted sheet name and the cell part
fn split_sheet(range: &str) -> (Option<String>, &str) {
    match range.rfind('!') {
        Some(pos) => {
            let raw = &range[..pos];
            let sheet = if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
                raw[1..raw.len() - 1].replace("''", "'")
            } else {
                raw.to_string()
            };
            (Some(sheet), &range[pos + 1..])
        }
        None => (None, range),
    }
}

impl A1Range {
    pub fn parse(range: &str) -> Result<Self, SpreadsheetError> {
        let (sheet, cells) = split_sheet(range.trim());
        let (first, last) = match cells.split_once(':') {
            Some((a, b)) => (a, b),
            None => (cells, cells),
        };
        Ok(Self {
            sheet,
            start: parse_cell(first.trim(), range)?,
            end: parse_cell(last.trim(), range)?,
        })
    }

    /// Cuts the range window out of a full grid. Trailing empty cells and
    /// trailing empty rows are dropped, the way the remote API reports values.
    pub fn apply(&self, grid: &[Vec<String>]) -> Vec<Vec<String>> {
        let first_row = self.start.row.unwrap_or(0);
        let last_row = self.end.row.unwrap_or(usize::MAX);
        let first_col = self.start.column.unwrap_or(0);
        let last_col = self.end.column.unwrap_or(usize::MAX);

        let mut rows: Vec<Vec<String>> = grid
            .iter()
            .enumerate()
            .filter(|(i, _)| *i >= first_row && *i <= last_row)
            .map(|(_, row)| {
                let mut cells: Vec<String> = row
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j >= first_col && *j <= last_col)
                    .map(|(_, cell)| cell.clone())
                    .collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        rows
    }
}

/// `cells` scoped to a named sheet. Names that are not plain identifiers
/// are quoted with `'` doubled.
pub fn qualified_range(sheet_name: Option<&str>, cells: &str) -> String {
    match sheet_name.map(str::trim).filter(|s| !s.is_empty()) {
        None => cells.to_string(),
        Some(name) if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            format!("{}!{}", name, cells)
        }
        Some(name) => format!("'{}'!{}", name.replace('\'', "''"), cells),
    }
}

/// Range of the first row, optionally scoped to a named sheet
pub fn header_range(sheet_name: Option<&str>) -> String {
    qualified_range(sheet_name, "1:1")
}
