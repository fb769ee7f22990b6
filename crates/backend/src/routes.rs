use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// All application routes
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // U601 IMPORT FROM GOOGLE SHEETS
        // ========================================
        .route(
            "/api/u601/status",
            get(handlers::u601_import_from_google_sheets::status),
        )
        .route(
            "/api/u601/connect",
            post(handlers::u601_import_from_google_sheets::connect),
        )
        .route(
            "/api/u601/disconnect",
            post(handlers::u601_import_from_google_sheets::disconnect),
        )
        .route(
            "/api/u601/import",
            post(handlers::u601_import_from_google_sheets::import),
        )
        .route(
            "/api/u601/sheets/select",
            post(handlers::u601_import_from_google_sheets::select_sheet),
        )
        .route(
            "/api/u601/mapping/:kind",
            get(handlers::u601_import_from_google_sheets::get_mapping)
                .put(handlers::u601_import_from_google_sheets::set_mapping)
                .post(handlers::u601_import_from_google_sheets::replace_mapping),
        )
        .route(
            "/api/u601/auto-sync",
            post(handlers::u601_import_from_google_sheets::toggle_auto_sync),
        )
        .route(
            "/api/u601/dialogs/:dialog/:action",
            post(handlers::u601_import_from_google_sheets::set_dialog),
        )
        .route(
            "/oauth/callback",
            get(handlers::u601_import_from_google_sheets::oauth_callback),
        )
        // ========================================
        // D410 BUSINESS OVERVIEW
        // ========================================
        .route(
            "/api/d410/dashboard",
            get(handlers::d410_business_overview::dashboard),
        )
        .route(
            "/api/d410/companies",
            get(handlers::d410_business_overview::companies)
                .post(handlers::d410_business_overview::add_company),
        )
}
