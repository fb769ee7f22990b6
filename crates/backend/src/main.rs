use axum::http::{header, Method};
use axum::middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use backend::dashboards::d410_business_overview::DashboardStore;
use backend::handlers::{self, AppContext};
use backend::shared::{config, spreadsheets};
use backend::system;
use backend::usecases::u601_import_from_google_sheets::{SyncController, SyncSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = config::load_config()?;
    let provider = spreadsheets::build_provider(&config)?;
    tracing::info!("Spreadsheet provider: {}", provider.provider_name());

    let dashboard = Arc::new(DashboardStore::seeded());
    let controller = SyncController::new(
        provider,
        dashboard.clone(),
        SyncSettings::from_config(&config.sync),
    );
    handlers::install(AppContext {
        controller: controller.clone(),
        dashboard,
    })?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = backend::routes::configure_routes()
        .layer(middleware::from_fn(system::middleware::request_logger))
        .layer(cors);

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid [server] bind '{}': {}", config.server.bind, e))?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: {} is already in use. Please ensure no other process is using this port.",
                    addr
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Cannot listen for shutdown signal: {}", e);
            }
        })
        .await?;

    controller.shutdown();
    tracing::info!("Server stopped");
    Ok(())
}
