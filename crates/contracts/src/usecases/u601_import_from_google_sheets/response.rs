use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::mapping::ColumnMapping;
use super::progress::{DialogState, ImportStatus, SyncPhase};
use super::validation::ImportReport;
use crate::enums::DatasetKind;
use crate::shared::SheetDocument;

/// Selected spreadsheet per dataset kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetSelections {
    pub financial: Option<String>,
    pub portfolio: Option<String>,
}

impl SheetSelections {
    pub fn get(&self, kind: DatasetKind) -> Option<&str> {
        match kind {
            DatasetKind::Financial => self.financial.as_deref(),
            DatasetKind::Portfolio => self.portfolio.as_deref(),
        }
    }

    pub fn set(&mut self, kind: DatasetKind, document_id: Option<String>) {
        match kind {
            DatasetKind::Financial => self.financial = document_id,
            DatasetKind::Portfolio => self.portfolio = document_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.financial.is_none() && self.portfolio.is_none()
    }
}

/// GET /api/u601/status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub status: ImportStatus,
    pub phase: SyncPhase,
    pub documents: Vec<SheetDocument>,
    pub selections: SheetSelections,
    /// Header labels discovered for the selected sheet of each kind
    pub columns: BTreeMap<DatasetKind, Vec<String>>,
    pub auto_sync: bool,
    pub dialogs: DialogState,
    /// Consent page the user has to visit to finish signing in
    pub consent_url: Option<String>,
    pub last_report: Option<ImportReport>,
}

/// POST /api/u601/connect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub documents: Vec<SheetDocument>,
    pub status: ImportStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcomeKind {
    Completed,
    /// Another import was already running
    Skipped,
}

/// POST /api/u601/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub outcome: ImportOutcomeKind,
    pub report: Option<ImportReport>,
    pub status: ImportStatus,
}

/// POST /api/u601/sheets/select
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetColumnsResponse {
    pub kind: DatasetKind,
    pub document_id: String,
    pub columns: Vec<String>,
}

/// GET|PUT /api/u601/mapping/:kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingResponse {
    pub kind: DatasetKind,
    pub mapping: ColumnMapping,
}
