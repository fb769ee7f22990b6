pub mod a1_range;
pub mod csv_directory;
pub mod error;
pub mod google_sheets_client;
pub mod oauth;

pub use error::SpreadsheetError;

use async_trait::async_trait;
use contracts::shared::{RawTable, SheetDocument};
use std::sync::Arc;

use crate::shared::config::{self, Config, ProviderKind};

/// Range fetched when the caller does not name one
pub const DEFAULT_RANGE: &str = "A:Z";

/// Maximum number of documents returned by a listing
pub const DOCUMENT_PAGE_SIZE: usize = 20;

/// Remote source of spreadsheet data.
///
/// Every call that reads data checks the local signed-in flag before any I/O
/// and fails with [`SpreadsheetError::NotAuthenticated`] when it is not set.
#[async_trait]
pub trait SpreadsheetProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Idempotent setup; fails with `Initialization` when the provider
    /// cannot be configured or reached
    async fn initialize(&self) -> Result<(), SpreadsheetError>;

    /// Initializes implicitly when needed. May wait for user consent.
    async fn sign_in(&self) -> Result<(), SpreadsheetError>;

    /// Idempotent
    async fn sign_out(&self) -> Result<(), SpreadsheetError>;

    /// Local flag only, no network
    fn is_signed_in(&self) -> bool;

    /// Newest-modified first, at most [`DOCUMENT_PAGE_SIZE`]
    async fn list_documents(&self) -> Result<Vec<SheetDocument>, SpreadsheetError>;

    /// `range` defaults to [`DEFAULT_RANGE`]
    async fn fetch_range(
        &self,
        document_id: &str,
        range: Option<&str>,
    ) -> Result<RawTable, SpreadsheetError>;

    /// First row of the document (or of the named sheet). Best effort:
    /// any failure yields an empty list.
    async fn fetch_header_row(&self, document_id: &str, sheet_name: Option<&str>) -> Vec<String> {
        let range = a1_range::header_range(sheet_name);
        match self.fetch_range(document_id, Some(&range)).await {
            Ok(table) => table.values.into_iter().next().unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    "Header row of {} ({}) unavailable: {}",
                    document_id,
                    range,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Consent URL of an interactive sign-in currently waiting for the user
    fn pending_consent_url(&self) -> Option<String> {
        None
    }

    /// Hands the OAuth redirect parameters to the waiting sign-in
    fn complete_consent(&self, _params: oauth::CallbackParams) -> Result<(), String> {
        Err(format!(
            "{} does not use interactive sign-in",
            self.provider_name()
        ))
    }
}

/// Orders documents newest-modified first (undated last) and caps the list
pub fn newest_first(mut documents: Vec<SheetDocument>) -> Vec<SheetDocument> {
    documents.sort_by(|a, b| b.modified_time.cmp(&a.modified_time));
    documents.truncate(DOCUMENT_PAGE_SIZE);
    documents
}

/// Creates the provider selected in `[sync] provider`
pub fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn SpreadsheetProvider>> {
    match config.sync.provider {
        ProviderKind::Google => {
            let credentials = google_sheets_client::GoogleCredentials::from_env();
            let client =
                google_sheets_client::GoogleSheetsClient::new(config.google.clone(), credentials)?;
            Ok(Arc::new(client))
        }
        ProviderKind::CsvDir => {
            let dir = config::resolve_csv_dir(&config.sync).ok_or_else(|| {
                anyhow::anyhow!("[sync] provider = \"csv_dir\" requires csv_dir to be set")
            })?;
            Ok(Arc::new(csv_directory::CsvDirectoryProvider::new(dir)))
        }
    }
}
