pub mod d410_business_overview;
pub mod u601_import_from_google_sheets;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::dashboards::d410_business_overview::{DashboardError, DashboardStore};
use crate::usecases::u601_import_from_google_sheets::{SyncController, SyncError};

/// Shared services used by the HTTP handlers
pub struct AppContext {
    pub controller: Arc<SyncController>,
    pub dashboard: Arc<DashboardStore>,
}

static APP_CONTEXT: OnceCell<AppContext> = OnceCell::new();

/// Installs the services once at startup
pub fn install(context: AppContext) -> anyhow::Result<()> {
    APP_CONTEXT
        .set(context)
        .map_err(|_| anyhow::anyhow!("Application context is already installed"))
}

pub(crate) fn app() -> Result<&'static AppContext, ApiError> {
    APP_CONTEXT.get().ok_or_else(|| ApiError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        message: "Application context is not initialized".to_string(),
    })
}

/// JSON error body `{ "error": ... }` with a status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        let status = match &err {
            SyncError::Validation(_) => StatusCode::BAD_REQUEST,
            SyncError::NotConnected => StatusCode::CONFLICT,
            SyncError::Spreadsheet(_) => StatusCode::BAD_GATEWAY,
        };
        if status != StatusCode::BAD_REQUEST {
            tracing::error!("Sync request failed: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self::bad_request(err.to_string())
    }
}
