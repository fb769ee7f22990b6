use axum::extract::{Path, Query};
use axum::response::Html;
use axum::Json;
use contracts::enums::DatasetKind;
use contracts::usecases::u601_import_from_google_sheets::{
    ColumnMapping, ConfigDialog, ConnectResponse, DialogState, ImportOutcomeKind, ImportResponse, ImportStatus,
    MappingResponse, SelectSheetRequest, SetMappingRequest, SheetColumnsResponse, SyncSnapshot,
    ToggleAutoSyncRequest,
};

use super::{app, ApiError};
use crate::shared::spreadsheets::oauth::CallbackParams;
use crate::usecases::u601_import_from_google_sheets::{ImportOutcome, SyncError};

// ============================================================================
// UseCase u601: Import from Google Sheets
// ============================================================================

fn parse_kind(kind: &str) -> Result<DatasetKind, ApiError> {
    kind.parse::<DatasetKind>()
        .map_err(|e| ApiError::from(SyncError::Validation(e.to_string())))
}

/// GET /api/u601/status
pub async fn status() -> Result<Json<SyncSnapshot>, ApiError> {
    Ok(Json(app()?.controller.snapshot()))
}

/// POST /api/u601/connect
pub async fn connect() -> Result<Json<ConnectResponse>, ApiError> {
    let response = app()?.controller.connect().await?;
    Ok(Json(response))
}

/// POST /api/u601/disconnect
pub async fn disconnect() -> Result<Json<ImportStatus>, ApiError> {
    let status = app()?.controller.disconnect().await?;
    Ok(Json(status))
}

/// POST /api/u601/import
pub async fn import() -> Result<Json<ImportResponse>, ApiError> {
    let controller = &app()?.controller;
    let (outcome, report) = match controller.import().await? {
        ImportOutcome::Completed(report) => (ImportOutcomeKind::Completed, Some(report)),
        ImportOutcome::Skipped => (ImportOutcomeKind::Skipped, None),
    };
    Ok(Json(ImportResponse {
        outcome,
        report,
        status: controller.status(),
    }))
}

/// POST /api/u601/sheets/select
pub async fn select_sheet(
    Json(request): Json<SelectSheetRequest>,
) -> Result<Json<SheetColumnsResponse>, ApiError> {
    let response = app()?.controller.select_sheet(request).await?;
    Ok(Json(response))
}

/// GET /api/u601/mapping/:kind
pub async fn get_mapping(Path(kind): Path<String>) -> Result<Json<MappingResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(MappingResponse {
        kind,
        mapping: app()?.controller.mapping(kind),
    }))
}

/// PUT /api/u601/mapping/:kind
pub async fn set_mapping(
    Path(kind): Path<String>,
    Json(request): Json<SetMappingRequest>,
) -> Result<Json<MappingResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mapping = app()?.controller.set_mapping(kind, &request)?;
    Ok(Json(MappingResponse { kind, mapping }))
}

/// POST /api/u601/mapping/:kind
///
/// Replaces the whole mapping; fields left out become unmapped
pub async fn replace_mapping(
    Path(kind): Path<String>,
    Json(mapping): Json<ColumnMapping>,
) -> Result<Json<MappingResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let mapping = app()?.controller.replace_mapping(kind, &mapping)?;
    Ok(Json(MappingResponse { kind, mapping }))
}

/// POST /api/u601/auto-sync
pub async fn toggle_auto_sync(
    Json(request): Json<ToggleAutoSyncRequest>,
) -> Result<Json<SyncSnapshot>, ApiError> {
    let controller = &app()?.controller;
    controller.toggle_auto_sync(request.enabled);
    Ok(Json(controller.snapshot()))
}

/// POST /api/u601/dialogs/:dialog/:action
pub async fn set_dialog(
    Path((dialog, action)): Path<(String, String)>,
) -> Result<Json<DialogState>, ApiError> {
    let dialog = ConfigDialog::from_code(&dialog)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown dialog '{}'", dialog)))?;
    let open = match action.as_str() {
        "open" => true,
        "close" => false,
        other => return Err(ApiError::bad_request(format!("Unknown dialog action '{}'", other))),
    };
    Ok(Json(app()?.controller.set_dialog(dialog, open)))
}

/// GET /oauth/callback
pub async fn oauth_callback(Query(params): Query<CallbackParams>) -> Result<Html<String>, ApiError> {
    match app()?.controller.complete_consent(params) {
        Ok(()) => Ok(Html(
            "<html><body><h3>Signed in.</h3><p>You can close this window.</p></body></html>"
                .to_string(),
        )),
        Err(message) => {
            tracing::warn!("OAuth callback rejected: {}", message);
            Err(ApiError::bad_request(message))
        }
    }
}
