use chrono::Utc;
use contracts::enums::DatasetKind;
use contracts::shared::SheetDocument;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u601_import_from_google_sheets::{
    ColumnMapping, ConfigDialog, ConnectResponse, DatasetImportReport, DialogState,
    ImportFromGoogleSheets, ImportReport,
    ImportStatus, SelectSheetRequest, SetMappingRequest, SheetColumnsResponse, SheetSelections,
    SyncPhase, SyncSnapshot,
};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

use super::column_mapper::ColumnMapper;
use super::error::{SyncError, CONNECT_FAILED_MESSAGE, NO_SELECTION_MESSAGE};
use super::status_tracker::StatusTracker;
use super::timer_slot::TimerSlot;
use super::transformer::{transform_financial, transform_portfolio};
use crate::dashboards::d410_business_overview::DashboardStore;
use crate::shared::config::SyncConfig;
use crate::shared::spreadsheets::oauth::CallbackParams;
use crate::shared::spreadsheets::{a1_range, SpreadsheetProvider, DEFAULT_RANGE};

pub const IMPORT_SUCCESS_MESSAGE: &str = "Data imported successfully from Google Sheets!";

/// Timings of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    pub auto_sync_interval: Duration,
    pub status_decay: Duration,
}

impl SyncSettings {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            auto_sync_interval: Duration::from_secs(config.auto_sync_interval_secs),
            status_decay: Duration::from_secs(config.status_decay_secs),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            auto_sync_interval: Duration::from_secs(300),
            status_decay: Duration::from_secs(5),
        }
    }
}

/// What an `import()` call did
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Completed(ImportReport),
    /// Another import was already running; nothing was touched
    Skipped,
}

/// Per-session selections and discovery results
#[derive(Debug, Default)]
struct SessionState {
    documents: Vec<SheetDocument>,
    selections: SheetSelections,
    sheet_names: BTreeMap<DatasetKind, String>,
    columns: BTreeMap<DatasetKind, Vec<String>>,
    auto_sync: bool,
    dialogs: DialogState,
    last_report: Option<ImportReport>,
}

/// Orchestrates sign-in, listing, fetch -> transform -> commit cycles,
/// the periodic re-sync and the import status.
pub struct SyncController {
    provider: Arc<dyn SpreadsheetProvider>,
    dashboard: Arc<DashboardStore>,
    mapper: ColumnMapper,
    status: StatusTracker,
    session: RwLock<SessionState>,
    /// Held for the whole import cycle; a second import does not wait for it
    import_gate: tokio::sync::Mutex<()>,
    auto_sync_timer: TimerSlot,
    settings: SyncSettings,
    this: Weak<SyncController>,
}

impl SyncController {
    pub fn new(
        provider: Arc<dyn SpreadsheetProvider>,
        dashboard: Arc<DashboardStore>,
        settings: SyncSettings,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            provider,
            dashboard,
            mapper: ColumnMapper::new(),
            status: StatusTracker::new(settings.status_decay),
            session: RwLock::new(SessionState::default()),
            import_gate: tokio::sync::Mutex::new(()),
            auto_sync_timer: TimerSlot::new(),
            settings,
            this: this.clone(),
        })
    }

    fn session(&self) -> RwLockReadGuard<'_, SessionState> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn session_mut(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dashboard(&self) -> &Arc<DashboardStore> {
        &self.dashboard
    }

    pub fn status(&self) -> ImportStatus {
        self.status.status()
    }

    // ========================================================================
    // Connection
    // ========================================================================

    /// Signs in and lists the available spreadsheets
    pub async fn connect(&self) -> Result<ConnectResponse, SyncError> {
        tracing::info!("Connecting to {}", self.provider.provider_name());
        let was_connected = self.status.is_connected();
        self.status.begin(SyncPhase::Connecting);

        let listed = match self.provider.sign_in().await {
            Ok(()) => self.provider.list_documents().await,
            Err(e) => Err(e),
        };

        match listed {
            Ok(documents) => {
                let message = format!(
                    "Successfully connected! Found {} spreadsheets.",
                    documents.len()
                );
                self.session_mut().documents = documents.clone();
                let status = self.status.connected(message);
                self.sync_auto_timer();
                tracing::info!("Connected, {} documents available", documents.len());
                Ok(ConnectResponse { documents, status })
            }
            Err(e) => {
                tracing::error!("Connect failed: {}", e);
                // A fresh sign-in must not outlive a failed listing
                if !was_connected && self.provider.is_signed_in() {
                    if let Err(sign_out_error) = self.provider.sign_out().await {
                        tracing::warn!("Sign-out after failed connect: {}", sign_out_error);
                    }
                }
                self.status.connect_failed(CONNECT_FAILED_MESSAGE.to_string());
                Err(e.into())
            }
        }
    }

    /// Signs out, forgets the document list and stops auto-sync
    pub async fn disconnect(&self) -> Result<ImportStatus, SyncError> {
        self.provider.sign_out().await?;
        {
            let mut session = self.session_mut();
            session.documents.clear();
            session.columns.clear();
        }
        let status = self.status.disconnected();
        self.sync_auto_timer();
        tracing::info!("Disconnected from {}", self.provider.provider_name());
        Ok(status)
    }

    pub fn complete_consent(&self, params: CallbackParams) -> Result<(), String> {
        self.provider.complete_consent(params)
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Runs one import cycle over the selected sheets, financial first.
    /// Each kind commits on its own success; the first failure stops the cycle.
    pub async fn import(&self) -> Result<ImportOutcome, SyncError> {
        let (selections, sheet_names) = {
            let session = self.session();
            (session.selections.clone(), session.sheet_names.clone())
        };
        if selections.is_empty() {
            self.status.reject(NO_SELECTION_MESSAGE.to_string());
            return Err(SyncError::Validation(NO_SELECTION_MESSAGE.to_string()));
        }

        let Ok(_running) = self.import_gate.try_lock() else {
            tracing::info!("Import already in progress, skipping");
            return Ok(ImportOutcome::Skipped);
        };

        if !self.provider.is_signed_in() {
            let err = SyncError::NotConnected;
            self.status.disconnected();
            self.status.import_failed(err.import_message());
            self.sync_auto_timer();
            return Err(err);
        }

        self.status.begin(SyncPhase::Importing);
        let mut report = ImportReport::start();
        tracing::info!(
            "{}: import {} started",
            ImportFromGoogleSheets::full_name(),
            report.run_id
        );

        for kind in DatasetKind::all() {
            let Some(document_id) = selections.get(kind) else {
                continue;
            };
            let sheet_name = sheet_names.get(&kind).map(String::as_str);

            match self.import_kind(kind, document_id, sheet_name).await {
                Ok(dataset) => report.datasets.push(dataset),
                Err(e) => {
                    tracing::error!("Import {} failed on {}: {}", report.run_id, kind, e);
                    report.finished_at = Some(Utc::now());
                    self.session_mut().last_report = Some(report);
                    self.status.import_failed(e.import_message());
                    return Err(e);
                }
            }
        }

        let finished = Utc::now();
        report.finished_at = Some(finished);
        {
            let mut session = self.session_mut();
            session.last_report = Some(report.clone());
            session.dialogs.close_all();
        }
        self.status
            .import_succeeded(IMPORT_SUCCESS_MESSAGE.to_string(), finished);
        tracing::info!(
            "Import {} finished: {} datasets",
            report.run_id,
            report.datasets.len()
        );
        Ok(ImportOutcome::Completed(report))
    }

    async fn import_kind(
        &self,
        kind: DatasetKind,
        document_id: &str,
        sheet_name: Option<&str>,
    ) -> Result<DatasetImportReport, SyncError> {
        let range = a1_range::qualified_range(sheet_name, DEFAULT_RANGE);
        let table = self.provider.fetch_range(document_id, Some(&range)).await?;
        let mapping = self.mapper.mapping(kind);
        let at = Utc::now();

        let (total_rows, imported, validation) = match kind {
            DatasetKind::Financial => {
                let result = transform_financial(&table, &mapping);
                let imported = result.records.len();
                if imported > 0 {
                    self.dashboard.replace_financial(result.records, at);
                }
                (result.total_rows, imported, result.validation)
            }
            DatasetKind::Portfolio => {
                let result = transform_portfolio(&table, &mapping);
                let imported = result.records.len();
                if imported > 0 {
                    self.dashboard.replace_companies(result.records, at);
                }
                (result.total_rows, imported, result.validation)
            }
        };

        if imported == 0 {
            tracing::warn!(
                "{} sheet {} produced no records, current data kept",
                kind,
                document_id
            );
        }
        Ok(DatasetImportReport {
            kind,
            document_id: document_id.to_string(),
            total_rows,
            imported,
            committed: imported > 0,
            validation,
        })
    }

    // ========================================================================
    // Sheet selection and mapping
    // ========================================================================

    /// Selects the sheet of one dataset kind and discovers its header labels.
    /// An empty document id clears the selection.
    pub async fn select_sheet(
        &self,
        request: SelectSheetRequest,
    ) -> Result<SheetColumnsResponse, SyncError> {
        let kind = request.kind;
        let document_id = request.document_id.trim().to_string();
        let sheet_name = request
            .sheet_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if document_id.is_empty() {
            let mut session = self.session_mut();
            session.selections.set(kind, None);
            session.sheet_names.remove(&kind);
            session.columns.remove(&kind);
            return Ok(SheetColumnsResponse {
                kind,
                document_id,
                columns: Vec::new(),
            });
        }

        {
            let mut session = self.session_mut();
            session.selections.set(kind, Some(document_id.clone()));
            match &sheet_name {
                Some(name) => session.sheet_names.insert(kind, name.clone()),
                None => session.sheet_names.remove(&kind),
            };
            session.columns.remove(&kind);
        }

        let columns = self
            .provider
            .fetch_header_row(&document_id, sheet_name.as_deref())
            .await;

        // The selection may have changed while the header was loading
        {
            let mut session = self.session_mut();
            if session.selections.get(kind) == Some(document_id.as_str()) {
                session.columns.insert(kind, columns.clone());
            }
        }
        tracing::info!("{} sheet {}: {} columns", kind, document_id, columns.len());

        Ok(SheetColumnsResponse {
            kind,
            document_id,
            columns,
        })
    }

    pub fn mapping(&self, kind: DatasetKind) -> ColumnMapping {
        self.mapper.mapping(kind)
    }

    pub fn set_mapping(
        &self,
        kind: DatasetKind,
        request: &SetMappingRequest,
    ) -> Result<ColumnMapping, SyncError> {
        self.mapper
            .set(kind, &request.dashboard_field, &request.sheet_column)
    }

    pub fn replace_mapping(
        &self,
        kind: DatasetKind,
        mapping: &ColumnMapping,
    ) -> Result<ColumnMapping, SyncError> {
        self.mapper.replace(kind, mapping)
    }

    // ========================================================================
    // Auto-sync, dialogs, snapshot
    // ========================================================================

    pub fn toggle_auto_sync(&self, enabled: bool) -> bool {
        self.session_mut().auto_sync = enabled;
        self.sync_auto_timer();
        tracing::info!("Auto-sync {}", if enabled { "enabled" } else { "disabled" });
        self.auto_sync_timer.is_armed()
    }

    pub fn is_auto_sync_running(&self) -> bool {
        self.auto_sync_timer.is_armed()
    }

    /// Arms the periodic import when enabled and connected, cancels it otherwise
    fn sync_auto_timer(&self) {
        let enabled = self.session().auto_sync;
        if !(enabled && self.status.is_connected()) {
            self.auto_sync_timer.cancel();
            return;
        }

        let period = self.settings.auto_sync_interval;
        if period.is_zero() {
            tracing::warn!("Auto-sync interval is zero, timer not started");
            self.auto_sync_timer.cancel();
            return;
        }

        let this = self.this.clone();
        self.auto_sync_timer.rearm(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(controller) = this.upgrade() else {
                    break;
                };
                // Separate task: cancelling the timer must not cut an import short
                tokio::spawn(async move {
                    tracing::info!("Auto-sync tick");
                    if let Err(e) = controller.import().await {
                        tracing::warn!("Auto-sync import failed: {}", e);
                    }
                });
            }
        });
    }

    pub fn set_dialog(&self, dialog: ConfigDialog, open: bool) -> DialogState {
        let mut session = self.session_mut();
        session.dialogs.set(dialog, open);
        session.dialogs
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        let session = self.session();
        SyncSnapshot {
            status: self.status.status(),
            phase: self.status.phase(),
            documents: session.documents.clone(),
            selections: session.selections.clone(),
            columns: session.columns.clone(),
            auto_sync: session.auto_sync,
            dialogs: session.dialogs,
            consent_url: self.provider.pending_consent_url(),
            last_report: session.last_report.clone(),
        }
    }

    /// Cancels timers; in-flight fetches are left to finish
    pub fn shutdown(&self) {
        self.auto_sync_timer.cancel();
        self.status.shutdown();
        tracing::info!("Sync controller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::spreadsheets::SpreadsheetError;
    use crate::usecases::u601_import_from_google_sheets::test_support::MockProvider;
    use contracts::usecases::u601_import_from_google_sheets::ValidationStatus;

    fn financial_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Month", "Revenue", "Expenses", "Profit"],
            vec!["Jul", "70,000", "40,000", "30,000"],
            vec!["Aug", "72,000", "41,000", "31,000"],
        ]
    }

    fn portfolio_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Company", "Workers"],
            vec!["Acme", "10"],
            vec!["", "3"],
            vec!["Globex", "7"],
        ]
    }

    fn controller(provider: &Arc<MockProvider>) -> Arc<SyncController> {
        SyncController::new(
            provider.clone(),
            Arc::new(DashboardStore::seeded()),
            SyncSettings::default(),
        )
    }

    fn map_financial(controller: &SyncController) {
        for (field, column) in [
            ("month", "Month"),
            ("revenue", "Revenue"),
            ("expenses", "Expenses"),
            ("profit", "Profit"),
        ] {
            controller
                .set_mapping(
                    DatasetKind::Financial,
                    &SetMappingRequest {
                        dashboard_field: field.into(),
                        sheet_column: column.into(),
                    },
                )
                .unwrap();
        }
    }

    fn map_portfolio(controller: &SyncController) {
        for (field, column) in [("name", "Company"), ("workers", "Workers")] {
            controller
                .set_mapping(
                    DatasetKind::Portfolio,
                    &SetMappingRequest {
                        dashboard_field: field.into(),
                        sheet_column: column.into(),
                    },
                )
                .unwrap();
        }
    }

    async fn select(controller: &SyncController, kind: DatasetKind, id: &str) -> Vec<String> {
        controller
            .select_sheet(SelectSheetRequest {
                kind,
                document_id: id.into(),
                sheet_name: None,
            })
            .await
            .unwrap()
            .columns
    }

    #[tokio::test]
    async fn test_import_without_selection_makes_no_provider_calls() {
        let provider = Arc::new(MockProvider::new());
        let controller = controller(&provider);

        let result = controller.import().await;
        assert_eq!(
            result,
            Err(SyncError::Validation(NO_SELECTION_MESSAGE.to_string()))
        );
        assert_eq!(controller.status().error.as_deref(), Some(NO_SELECTION_MESSAGE));
        assert_eq!(provider.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_connect_lists_documents() {
        let provider = Arc::new(MockProvider::new().with_documents(&["a", "b", "c"]));
        let controller = controller(&provider);

        let response = controller.connect().await.unwrap();
        assert_eq!(response.documents.len(), 3);
        assert!(response.status.is_connected);
        assert_eq!(
            response.status.success.as_deref(),
            Some("Successfully connected! Found 3 spreadsheets.")
        );
        assert_eq!(controller.snapshot().phase, SyncPhase::Connected);
    }

    #[tokio::test]
    async fn test_connect_failure_reports_error() {
        let provider = Arc::new(
            MockProvider::new().failing_sign_in(SpreadsheetError::Auth("denied".into())),
        );
        let controller = controller(&provider);

        let result = controller.connect().await;
        assert_eq!(
            result.unwrap_err(),
            SyncError::Spreadsheet(SpreadsheetError::Auth("denied".into()))
        );
        let status = controller.status();
        assert!(!status.is_connected);
        assert!(!status.is_loading);
        assert_eq!(status.error.as_deref(), Some(CONNECT_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_listing_failure_after_sign_in_signs_out() {
        let provider = Arc::new(
            MockProvider::new()
                .with_table("fin", financial_rows())
                .failing_listing(SpreadsheetError::Fetch("quota exceeded".into())),
        );
        let controller = controller(&provider);

        let result = controller.connect().await;
        assert_eq!(
            result.unwrap_err(),
            SyncError::Spreadsheet(SpreadsheetError::Fetch("quota exceeded".into()))
        );
        assert!(!provider.is_signed_in());
        let status = controller.status();
        assert!(!status.is_connected);
        assert_eq!(status.error.as_deref(), Some(CONNECT_FAILED_MESSAGE));
        assert!(!controller.toggle_auto_sync(true));

        select(&controller, DatasetKind::Financial, "fin").await;
        assert_eq!(controller.import().await, Err(SyncError::NotConnected));
    }

    #[tokio::test]
    async fn test_successful_import_commits_both_kinds() {
        let provider = Arc::new(
            MockProvider::new()
                .with_table("fin", financial_rows())
                .with_table("port", portfolio_rows()),
        );
        let controller = controller(&provider);
        controller.connect().await.unwrap();
        map_financial(&controller);
        map_portfolio(&controller);
        assert_eq!(
            select(&controller, DatasetKind::Financial, "fin").await,
            vec!["Month", "Revenue", "Expenses", "Profit"]
        );
        select(&controller, DatasetKind::Portfolio, "port").await;
        controller.set_dialog(ConfigDialog::Mapping, true);

        let outcome = controller.import().await.unwrap();
        let ImportOutcome::Completed(report) = outcome else {
            panic!("import was skipped");
        };
        assert_eq!(report.datasets.len(), 2);
        let portfolio = report.dataset(DatasetKind::Portfolio).unwrap();
        assert_eq!(portfolio.total_rows, 3);
        assert_eq!(portfolio.imported, 2);
        assert!(portfolio.committed);

        let snapshot = controller.dashboard().snapshot();
        assert_eq!(snapshot.financial.len(), 2);
        assert_eq!(snapshot.financial[0].revenue, 70000.0);
        let ids: Vec<u32> = snapshot.companies.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let sync = controller.snapshot();
        assert_eq!(sync.status.success.as_deref(), Some(IMPORT_SUCCESS_MESSAGE));
        assert!(sync.status.last_sync.is_some());
        assert!(!sync.dialogs.mapping_open);
        assert_eq!(sync.phase, SyncPhase::ImportSucceeded);
        assert!(sync.last_report.is_some());
    }

    #[tokio::test]
    async fn test_portfolio_failure_keeps_financial_commit() {
        let provider = Arc::new(
            MockProvider::new()
                .with_table("fin", financial_rows())
                .with_failure("port", SpreadsheetError::Fetch("HTTP 403".into())),
        );
        let controller = controller(&provider);
        controller.connect().await.unwrap();
        map_financial(&controller);
        map_portfolio(&controller);
        select(&controller, DatasetKind::Financial, "fin").await;
        select(&controller, DatasetKind::Portfolio, "port").await;

        let err = controller.import().await.unwrap_err();
        assert_eq!(err, SyncError::Spreadsheet(SpreadsheetError::Fetch("HTTP 403".into())));

        let snapshot = controller.dashboard().snapshot();
        assert_eq!(snapshot.financial.len(), 2);
        assert_eq!(snapshot.companies.len(), 4);
        assert!(snapshot.portfolio_updated_at.is_none());

        let status = controller.status();
        assert_eq!(
            status.error.as_deref(),
            Some("Failed to import data: HTTP 403. Please check your sheet permissions and column mappings.")
        );
        assert!(status.last_sync.is_none());
        assert_eq!(controller.snapshot().phase, SyncPhase::ImportFailed);
    }

    #[tokio::test]
    async fn test_empty_transform_keeps_current_data() {
        let provider = Arc::new(MockProvider::new().with_table("port", portfolio_rows()));
        let controller = controller(&provider);
        controller.connect().await.unwrap();
        select(&controller, DatasetKind::Portfolio, "port").await;

        let ImportOutcome::Completed(report) = controller.import().await.unwrap() else {
            panic!("import was skipped");
        };
        let dataset = report.dataset(DatasetKind::Portfolio).unwrap();
        assert!(!dataset.committed);
        assert!(dataset
            .validation
            .iter()
            .any(|v| v.status == ValidationStatus::Error));
        assert_eq!(controller.dashboard().companies().len(), 4);
    }

    #[tokio::test]
    async fn test_import_requires_connection() {
        let provider = Arc::new(MockProvider::new().with_table("fin", financial_rows()));
        let controller = controller(&provider);
        select(&controller, DatasetKind::Financial, "fin").await;

        assert_eq!(controller.import().await, Err(SyncError::NotConnected));
        assert_eq!(provider.fetch_calls(), 1);
        assert!(controller.status().error.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_import_is_skipped() {
        let provider = Arc::new(MockProvider::new().with_table("fin", financial_rows()));
        let controller = controller(&provider);
        controller.connect().await.unwrap();
        select(&controller, DatasetKind::Financial, "fin").await;

        let gate = provider.gate_fetches();
        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.import().await })
        };
        while provider.waiting_fetches() == 0 {
            tokio::task::yield_now().await;
        }

        let status_before = controller.status();
        assert_eq!(controller.import().await, Ok(ImportOutcome::Skipped));
        assert_eq!(controller.status(), status_before);

        gate.notify_one();
        let finished = first.await.unwrap().unwrap();
        assert!(matches!(finished, ImportOutcome::Completed(_)));
    }

    #[tokio::test]
    async fn test_empty_document_id_clears_selection() {
        let provider = Arc::new(
            MockProvider::new()
                .with_table("fin", financial_rows())
                .with_table("port", portfolio_rows()),
        );
        let controller = controller(&provider);
        controller.connect().await.unwrap();
        select(&controller, DatasetKind::Financial, "fin").await;

        let cleared = select(&controller, DatasetKind::Financial, "").await;
        assert!(cleared.is_empty());
        let snapshot = controller.snapshot();
        assert!(snapshot.selections.financial.is_none());
        assert!(!snapshot.columns.contains_key(&DatasetKind::Financial));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_sync_imports_periodically() {
        let provider = Arc::new(MockProvider::new().with_table("fin", financial_rows()));
        let controller = controller(&provider);
        controller.connect().await.unwrap();
        map_financial(&controller);
        select(&controller, DatasetKind::Financial, "fin").await;
        let header_fetches = provider.fetch_calls();

        assert!(controller.toggle_auto_sync(true));
        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(provider.fetch_calls(), header_fetches);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(provider.fetch_calls(), header_fetches + 1);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(provider.fetch_calls(), header_fetches + 2);

        assert!(!controller.toggle_auto_sync(false));
        tokio::time::sleep(Duration::from_secs(900)).await;
        assert_eq!(provider.fetch_calls(), header_fetches + 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_sync_toggles_keep_a_single_timer() {
        let provider = Arc::new(MockProvider::new().with_table("fin", financial_rows()));
        let controller = controller(&provider);
        controller.connect().await.unwrap();
        map_financial(&controller);
        select(&controller, DatasetKind::Financial, "fin").await;
        let header_fetches = provider.fetch_calls();

        controller.toggle_auto_sync(true);
        controller.toggle_auto_sync(true);
        controller.toggle_auto_sync(false);
        controller.toggle_auto_sync(true);

        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(provider.fetch_calls(), header_fetches + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_sync_needs_connection_and_stops_on_disconnect() {
        let provider = Arc::new(MockProvider::new().with_table("fin", financial_rows()));
        let controller = controller(&provider);

        assert!(!controller.toggle_auto_sync(true));
        controller.connect().await.unwrap();
        assert!(controller.is_auto_sync_running());

        controller.disconnect().await.unwrap();
        assert!(!controller.is_auto_sync_running());
        assert!(controller.snapshot().auto_sync);
        assert!(!controller.status().is_connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_auto_sync_interval_never_arms() {
        let provider = Arc::new(MockProvider::new().with_table("fin", financial_rows()));
        let controller = SyncController::new(
            provider.clone(),
            Arc::new(DashboardStore::seeded()),
            SyncSettings {
                auto_sync_interval: Duration::ZERO,
                ..SyncSettings::default()
            },
        );
        controller.connect().await.unwrap();
        map_financial(&controller);
        select(&controller, DatasetKind::Financial, "fin").await;
        let header_fetches = provider.fetch_calls();

        assert!(!controller.toggle_auto_sync(true));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(provider.fetch_calls(), header_fetches);
        assert!(controller.status().is_connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_message_decays() {
        let provider = Arc::new(MockProvider::new());
        let controller = controller(&provider);
        let _ = controller.import().await;
        assert!(controller.status().error.is_some());

        tokio::time::sleep(Duration::from_secs(6)).await;
        let status = controller.status();
        assert!(status.error.is_none());
        assert!(status.success.is_none());
    }
}
