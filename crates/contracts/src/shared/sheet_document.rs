use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spreadsheet document available to the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDocument {
    pub id: String,
    pub name: String,
    /// Link for opening the document in the provider's UI
    pub link: String,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
}
