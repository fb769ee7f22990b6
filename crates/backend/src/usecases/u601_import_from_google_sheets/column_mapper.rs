use contracts::enums::DatasetKind;
use contracts::usecases::u601_import_from_google_sheets::ColumnMapping;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::error::SyncError;
use super::schema;

/// Editable dashboard-field -> sheet-column association, one per dataset kind.
/// Persists across import cycles until edited.
pub struct ColumnMapper {
    mappings: RwLock<BTreeMap<DatasetKind, ColumnMapping>>,
}

impl ColumnMapper {
    /// Every schema field present, nothing selected
    pub fn new() -> Self {
        let mappings = DatasetKind::all()
            .iter()
            .map(|kind| (*kind, Self::seed(*kind)))
            .collect();
        Self {
            mappings: RwLock::new(mappings),
        }
    }

    fn seed(kind: DatasetKind) -> ColumnMapping {
        ColumnMapping::seeded(schema::fields_for(kind).iter().map(|f| f.name))
    }

    pub fn mapping(&self, kind: DatasetKind) -> ColumnMapping {
        self.mappings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Self::seed(kind))
    }

    /// Selects the sheet column of one field; an empty column unmaps it
    pub fn set(
        &self,
        kind: DatasetKind,
        dashboard_field: &str,
        sheet_column: &str,
    ) -> Result<ColumnMapping, SyncError> {
        let mut mappings = self.mappings.write().unwrap_or_else(PoisonError::into_inner);
        let mapping = mappings.entry(kind).or_insert_with(|| Self::seed(kind));
        if !mapping.set(dashboard_field, sheet_column.trim()) {
            return Err(SyncError::Validation(format!(
                "Unknown {} field '{}'",
                kind, dashboard_field
            )));
        }
        tracing::info!(
            "Mapping {}.{} -> '{}'",
            kind,
            dashboard_field,
            sheet_column.trim()
        );
        Ok(mapping.clone())
    }

    /// Replaces the selections of a whole mapping. Fields outside the schema
    /// are rejected; schema fields missing from `mapping` become unmapped.
    pub fn replace(&self, kind: DatasetKind, mapping: &ColumnMapping) -> Result<ColumnMapping, SyncError> {
        let mut next = Self::seed(kind);
        for entry in &mapping.entries {
            if !next.set(&entry.dashboard_field, entry.sheet_column.trim()) {
                return Err(SyncError::Validation(format!(
                    "Unknown {} field '{}'",
                    kind, entry.dashboard_field
                )));
            }
        }
        self.mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, next.clone());
        Ok(next)
    }
}

impl Default for ColumnMapper {
    fn default() -> Self {
        Self::new()
    }
}
