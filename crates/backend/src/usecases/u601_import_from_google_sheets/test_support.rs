use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use contracts::shared::{RawTable, SheetDocument};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

use crate::shared::spreadsheets::a1_range::A1Range;
use crate::shared::spreadsheets::{SpreadsheetError, SpreadsheetProvider, DEFAULT_RANGE};

/// Scripted provider counting every call
#[derive(Default)]
pub struct MockProvider {
    signed_in: AtomicBool,
    documents: Vec<SheetDocument>,
    tables: HashMap<String, Result<Vec<Vec<String>>, SpreadsheetError>>,
    sign_in_error: Option<SpreadsheetError>,
    list_error: Option<SpreadsheetError>,
    gate: Mutex<Option<Arc<Notify>>>,
    calls: AtomicUsize,
    fetches: AtomicUsize,
    waiting: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(mut self, ids: &[&str]) -> Self {
        self.documents = ids
            .iter()
            .enumerate()
            .map(|(i, id)| SheetDocument {
                id: id.to_string(),
                name: format!("Sheet {}", id),
                link: format!("https://docs.example.com/{}", id),
                modified_time: Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0).single(),
            })
            .collect();
        self
    }

    pub fn with_table(mut self, document_id: &str, rows: Vec<Vec<&str>>) -> Self {
        let grid = rows
            .into_iter()
            .map(|row| row.into_iter().map(String::from).collect())
            .collect();
        self.tables.insert(document_id.to_string(), Ok(grid));
        self
    }

    pub fn with_failure(mut self, document_id: &str, error: SpreadsheetError) -> Self {
        self.tables.insert(document_id.to_string(), Err(error));
        self
    }

    pub fn failing_sign_in(mut self, error: SpreadsheetError) -> Self {
        self.sign_in_error = Some(error);
        self
    }

    pub fn failing_listing(mut self, error: SpreadsheetError) -> Self {
        self.list_error = Some(error);
        self
    }

    /// Subsequent fetches block until the returned handle is notified
    pub fn gate_fetches(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = Some(notify.clone());
        notify
    }

    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Fetches currently parked on the gate
    pub fn waiting_fetches(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpreadsheetProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn initialize(&self) -> Result<(), SpreadsheetError> {
        self.count();
        Ok(())
    }

    async fn sign_in(&self) -> Result<(), SpreadsheetError> {
        self.count();
        if let Some(error) = &self.sign_in_error {
            return Err(error.clone());
        }
        self.signed_in.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), SpreadsheetError> {
        self.count();
        self.signed_in.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_signed_in(&self) -> bool {
        self.count();
        self.signed_in.load(Ordering::SeqCst)
    }

    async fn list_documents(&self) -> Result<Vec<SheetDocument>, SpreadsheetError> {
        self.count();
        if !self.signed_in.load(Ordering::SeqCst) {
            return Err(SpreadsheetError::NotAuthenticated);
        }
        if let Some(error) = &self.list_error {
            return Err(error.clone());
        }
        Ok(self.documents.clone())
    }

    async fn fetch_range(
        &self,
        document_id: &str,
        range: Option<&str>,
    ) -> Result<RawTable, SpreadsheetError> {
        self.count();
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.signed_in.load(Ordering::SeqCst) {
            return Err(SpreadsheetError::NotAuthenticated);
        }

        let gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(gate) = gate {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            gate.notified().await;
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }

        let range = range.unwrap_or(DEFAULT_RANGE);
        match self.tables.get(document_id) {
            Some(Ok(grid)) => Ok(RawTable::new(
                range,
                A1Range::parse(range)?.apply(grid),
            )),
            Some(Err(error)) => Err(error.clone()),
            None => Err(SpreadsheetError::Fetch(format!(
                "Requested entity was not found: {}",
                document_id
            ))),
        }
    }
}
