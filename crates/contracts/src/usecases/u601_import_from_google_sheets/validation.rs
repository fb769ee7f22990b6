use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::DatasetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Warning,
    Error,
}

/// Outcome of checking one mapped field against the fetched sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub field: String,
    pub status: ValidationStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl ValidationResult {
    pub fn valid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, ValidationStatus::Valid, message, None)
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>, count: Option<usize>) -> Self {
        Self::new(field, ValidationStatus::Warning, message, count)
    }

    pub fn error(field: impl Into<String>, message: impl Into<String>, count: Option<usize>) -> Self {
        Self::new(field, ValidationStatus::Error, message, count)
    }

    fn new(
        field: impl Into<String>,
        status: ValidationStatus,
        message: impl Into<String>,
        count: Option<usize>,
    ) -> Self {
        Self {
            field: field.into(),
            status,
            message: message.into(),
            count,
        }
    }
}

/// Result of importing one dataset kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetImportReport {
    pub kind: DatasetKind,
    pub document_id: String,
    /// Data rows in the sheet (header excluded)
    pub total_rows: usize,
    /// Records produced by the transform
    pub imported: usize,
    /// Whether the records replaced the dashboard data
    pub committed: bool,
    pub validation: Vec<ValidationResult>,
}

/// Result of one import cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub datasets: Vec<DatasetImportReport>,
}

impl ImportReport {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            datasets: Vec::new(),
        }
    }

    pub fn dataset(&self, kind: DatasetKind) -> Option<&DatasetImportReport> {
        self.datasets.iter().find(|d| d.kind == kind)
    }
}
