//! Offline provider: every `*.csv` file in a directory is one document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::shared::{RawTable, SheetDocument};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use super::a1_range::A1Range;
use super::{newest_first, SpreadsheetError, SpreadsheetProvider, DEFAULT_RANGE};

pub struct CsvDirectoryProvider {
    dir: PathBuf,
    initialized: AtomicBool,
    signed_in: AtomicBool,
}

impl CsvDirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            initialized: AtomicBool::new(false),
            signed_in: AtomicBool::new(false),
        }
    }

    fn ensure_signed_in(&self) -> Result<(), SpreadsheetError> {
        if self.signed_in.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SpreadsheetError::NotAuthenticated)
        }
    }

    /// Document ids are bare file names inside the directory
    fn document_path(&self, document_id: &str) -> Result<PathBuf, SpreadsheetError> {
        let candidate = Path::new(document_id);
        let is_bare_name = candidate.file_name().is_some_and(|n| n == candidate.as_os_str());
        if !is_bare_name || !document_id.to_ascii_lowercase().ends_with(".csv") {
            return Err(SpreadsheetError::Fetch(format!(
                "Unknown document '{}'",
                document_id
            )));
        }
        Ok(self.dir.join(candidate))
    }
}

/// Reads all records; rows may have different lengths
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[async_trait]
impl SpreadsheetProvider for CsvDirectoryProvider {
    fn provider_name(&self) -> &str {
        "csv_dir"
    }

    async fn initialize(&self) -> Result<(), SpreadsheetError> {
        if self.initialized.load(Ordering::SeqCst) {
            return Ok(());
        }
        let metadata = tokio::fs::metadata(&self.dir).await.map_err(|e| {
            SpreadsheetError::Initialization(format!("{}: {}", self.dir.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(SpreadsheetError::Initialization(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        self.initialized.store(true, Ordering::SeqCst);
        tracing::info!("CSV provider ready: {}", self.dir.display());
        Ok(())
    }

    async fn sign_in(&self) -> Result<(), SpreadsheetError> {
        self.initialize().await?;
        self.signed_in.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), SpreadsheetError> {
        self.signed_in.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    async fn list_documents(&self) -> Result<Vec<SheetDocument>, SpreadsheetError> {
        self.ensure_signed_in()?;

        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| SpreadsheetError::fetch("Cannot list directory", e))?;

        let mut documents = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SpreadsheetError::fetch("Cannot list directory", e))?
        {
            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if !is_csv {
                continue;
            }
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| SpreadsheetError::fetch("Cannot read file metadata", e))?;
            if !metadata.is_file() {
                continue;
            }

            let id = entry.file_name().to_string_lossy().to_string();
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| id.clone());
            documents.push(SheetDocument {
                link: format!("file://{}", path.display()),
                modified_time: metadata.modified().ok().map(DateTime::<Utc>::from),
                id,
                name,
            });
        }

        tracing::debug!("CSV provider: {} documents", documents.len());
        Ok(newest_first(documents))
    }

    async fn fetch_range(
        &self,
        document_id: &str,
        range: Option<&str>,
    ) -> Result<RawTable, SpreadsheetError> {
        self.ensure_signed_in()?;
        let range = range.unwrap_or(DEFAULT_RANGE);
        let window = A1Range::parse(range)?;
        let path = self.document_path(document_id)?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| SpreadsheetError::fetch(&format!("Cannot read {}", document_id), e))?;
        let grid = parse_csv(&bytes)
            .map_err(|e| SpreadsheetError::fetch(&format!("Invalid CSV in {}", document_id), e))?;

        Ok(RawTable::new(range, window.apply(&grid)))
    }
}
