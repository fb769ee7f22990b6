use thiserror::Error;

use crate::shared::spreadsheets::SpreadsheetError;

pub const CONNECT_FAILED_MESSAGE: &str =
    "Failed to connect to Google Sheets. Please check your permissions and try again.";
pub const NO_SELECTION_MESSAGE: &str = "Please select at least one sheet to import data from.";

/// Failures of the sync controller operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("{0}")]
    Validation(String),

    #[error("Not connected to the spreadsheet provider")]
    NotConnected,

    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),
}

impl SyncError {
    /// Text shown in `ImportStatus.error` when an import fails
    pub fn import_message(&self) -> String {
        let reason = match self {
            SyncError::Spreadsheet(SpreadsheetError::Fetch(detail)) => detail.clone(),
            other => other.to_string(),
        };
        format!(
            "Failed to import data: {}. Please check your sheet permissions and column mappings.",
            reason
        )
    }
}
