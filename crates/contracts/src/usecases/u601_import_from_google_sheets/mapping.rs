use serde::{Deserialize, Serialize};

/// Association of one fixed dashboard field with a spreadsheet header label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    pub dashboard_field: String,
    /// Header label of the source column; empty means "unmapped"
    #[serde(default)]
    pub sheet_column: String,
}

impl MappingEntry {
    pub fn unmapped(dashboard_field: impl Into<String>) -> Self {
        Self {
            dashboard_field: dashboard_field.into(),
            sheet_column: String::new(),
        }
    }

    pub fn is_mapped(&self) -> bool {
        !self.sheet_column.trim().is_empty()
    }
}

/// Column mapping of one dataset kind, in dashboard field order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub entries: Vec<MappingEntry>,
}

impl ColumnMapping {
    /// Mapping with every field present and nothing selected
    pub fn seeded<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: fields.into_iter().map(MappingEntry::unmapped).collect(),
        }
    }

    /// Build from `(dashboard_field, sheet_column)` pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(field, column)| MappingEntry {
                    dashboard_field: field.to_string(),
                    sheet_column: column.to_string(),
                })
                .collect(),
        }
    }

    /// Selected column of a field, `None` when the field is unknown or unmapped
    pub fn column_for(&self, dashboard_field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.dashboard_field == dashboard_field && e.is_mapped())
            .map(|e| e.sheet_column.as_str())
    }

    /// Update the column of an existing field. Returns false for unknown fields.
    pub fn set(&mut self, dashboard_field: &str, sheet_column: &str) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.dashboard_field == dashboard_field)
        {
            Some(entry) => {
                entry.sheet_column = sheet_column.to_string();
                true
            }
            None => false,
        }
    }

    /// Entries that take part in a transform
    pub fn mapped(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter().filter(|e| e.is_mapped())
    }
}
