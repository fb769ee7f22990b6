use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Initializes tracing.
///
/// Logs go to:
/// - stdout (colored)
/// - logs/backend.log next to the executable, or target/logs (no colors)
pub fn initialize() -> anyhow::Result<()> {
    println!("========================================");
    println!("  LOGGING SYSTEM INITIALIZATION");
    println!("========================================\n");

    let log_dir = match std::env::current_exe() {
        Ok(exe_path) => match exe_path.parent() {
            Some(exe_dir) => {
                let dir = exe_dir.join("logs");
                println!("✓ Log directory (next to exe): {}", dir.display());
                dir
            }
            None => fallback_log_dir(),
        },
        Err(_) => fallback_log_dir(),
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        println!("✗ ERROR: Cannot create log directory: {}", e);
        println!("========================================\n");
        return Err(anyhow::anyhow!("Cannot create log directory: {}", e));
    }

    let log_file_path = log_dir.join("backend.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .map_err(|e| {
            println!("✗ ERROR: Cannot open log file {}: {}", log_file_path.display(), e);
            anyhow::anyhow!("Cannot open log file: {}", e)
        })?;
    println!("✓ Log file: {}", log_file_path.display());

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    println!("✓ Log level: {}", log_level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    println!("✓ Tracing subscriber initialized");
    println!("========================================\n");

    Ok(())
}

fn fallback_log_dir() -> std::path::PathBuf {
    let dir = std::path::Path::new("target").join("logs");
    println!("ℹ Using default log directory: {}", dir.display());
    dir
}
