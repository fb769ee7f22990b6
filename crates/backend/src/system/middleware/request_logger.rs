use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Logs method, path, status and duration of every HTTP request
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    if status.is_server_error() {
        tracing::warn!("{} {} -> {} ({} ms)", method, path, status.as_u16(), elapsed_ms);
    } else {
        tracing::info!("{} {} -> {} ({} ms)", method, path, status.as_u16(), elapsed_ms);
    }
    response
}
