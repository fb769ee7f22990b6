use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Import status shown in the dashboard header.
///
/// `error` and `success` never hold a value at the same time and are cleared
/// automatically a few seconds after being set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatus {
    pub is_connected: bool,
    pub is_loading: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Stage of the connect/import cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    Connecting,
    Connected,
    Importing,
    ImportSucceeded,
    ImportFailed,
}

impl SyncPhase {
    /// Phase shown once transient messages are gone
    pub fn neutral(is_connected: bool) -> Self {
        if is_connected {
            SyncPhase::Connected
        } else {
            SyncPhase::Idle
        }
    }
}

/// Configuration dialogs of the import flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigDialog {
    Connect,
    Mapping,
}

impl ConfigDialog {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "connect" => Some(ConfigDialog::Connect),
            "mapping" => Some(ConfigDialog::Mapping),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogState {
    pub connect_open: bool,
    pub mapping_open: bool,
}

impl DialogState {
    pub fn set(&mut self, dialog: ConfigDialog, open: bool) {
        match dialog {
            ConfigDialog::Connect => self.connect_open = open,
            ConfigDialog::Mapping => self.mapping_open = open,
        }
    }

    pub fn close_all(&mut self) {
        *self = DialogState::default();
    }
}
