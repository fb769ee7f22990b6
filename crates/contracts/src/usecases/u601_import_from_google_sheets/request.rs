use serde::{Deserialize, Serialize};

use crate::enums::DatasetKind;

/// POST /api/u601/sheets/select
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSheetRequest {
    pub kind: DatasetKind,
    /// Spreadsheet id; empty clears the selection
    #[serde(default)]
    pub document_id: String,
    /// Tab to read headers from, first tab when absent
    #[serde(default)]
    pub sheet_name: Option<String>,
}

/// PUT /api/u601/mapping/:kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMappingRequest {
    pub dashboard_field: String,
    #[serde(default)]
    pub sheet_column: String,
}

/// POST /api/u601/auto-sync
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToggleAutoSyncRequest {
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_sheet_request_uses_camel_case() {
        let request: SelectSheetRequest = serde_json::from_str(
            r#"{"kind":"portfolio","documentId":"sheet-1","sheetName":"Q1 Plan"}"#,
        )
        .unwrap();
        assert_eq!(request.kind, DatasetKind::Portfolio);
        assert_eq!(request.document_id, "sheet-1");
        assert_eq!(request.sheet_name.as_deref(), Some("Q1 Plan"));

        let cleared: SelectSheetRequest = serde_json::from_str(r#"{"kind":"financial"}"#).unwrap();
        assert!(cleared.document_id.is_empty());
    }
}
