use serde::{Deserialize, Serialize};

/// Unprocessed cell data fetched from a spreadsheet range.
///
/// The first row holds the header labels, the following rows hold data.
/// Rows are not guaranteed to have the same length: a cell beyond the end of
/// a short row is absent, which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub range: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(range: impl Into<String>, values: Vec<Vec<String>>) -> Self {
        Self {
            range: range.into(),
            values,
        }
    }

    /// Header labels, empty for an empty table
    pub fn header(&self) -> &[String] {
        self.values.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows after the header
    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.values.len() < 2 {
            &[]
        } else {
            &self.values[1..]
        }
    }

    /// True when there is at least one row beyond the header
    pub fn has_data(&self) -> bool {
        self.values.len() >= 2
    }
}
