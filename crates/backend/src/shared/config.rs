use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that may point to an explicit config file
pub const CONFIG_PATH_ENV: &str = "DASHBOARD_CONFIG";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub google: GoogleConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Endpoints and timings of the Google Sheets provider.
/// Secrets (API key, client id/secret, refresh token) come from the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct GoogleConfig {
    pub discovery_url: String,
    pub scopes: String,
    pub auth_url: String,
    pub token_url: String,
    pub revoke_url: String,
    pub drive_base_url: String,
    pub redirect_uri: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_sign_in_wait_secs")]
    pub sign_in_wait_secs: u64,
}

impl GoogleConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn sign_in_wait(&self) -> Duration {
        Duration::from_secs(self.sign_in_wait_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
    CsvDir,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    pub provider: ProviderKind,
    #[serde(default)]
    pub csv_dir: Option<String>,
    #[serde(default = "default_auto_sync_interval_secs")]
    pub auto_sync_interval_secs: u64,
    #[serde(default = "default_status_decay_secs")]
    pub status_decay_secs: u64,
}

impl SyncConfig {
    /// Rejects timings the sync controller cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auto_sync_interval_secs == 0 {
            anyhow::bail!("[sync] auto_sync_interval_secs must be at least 1");
        }
        Ok(())
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_http_timeout_secs() -> u64 {
    60
}

fn default_sign_in_wait_secs() -> u64 {
    180
}

fn default_auto_sync_interval_secs() -> u64 {
    300
}

fn default_status_decay_secs() -> u64 {
    5
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
bind = "0.0.0.0:3000"

[google]
discovery_url = "https://sheets.googleapis.com/$discovery/rest?version=v4"
scopes = "https://www.googleapis.com/auth/spreadsheets.readonly https://www.googleapis.com/auth/drive.readonly"
auth_url = "https://accounts.google.com/o/oauth2/v2/auth"
token_url = "https://oauth2.googleapis.com/token"
revoke_url = "https://oauth2.googleapis.com/revoke"
drive_base_url = "https://www.googleapis.com/drive/v3"
redirect_uri = "http://localhost:3000/oauth/callback"
http_timeout_secs = 60
sign_in_wait_secs = 180

[sync]
provider = "google"
auto_sync_interval_secs = 300
status_decay_secs = 5
"#;

fn read_config(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading config from: {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
    config
        .sync
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
    Ok(config)
}

/// Load configuration from config.toml
///
/// Search order:
/// 1. `DASHBOARD_CONFIG` environment variable
/// 2. Next to the executable (for production)
/// 3. Current working directory
/// 4. Embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        return read_config(Path::new(&explicit));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");
            if config_path.exists() {
                return read_config(&config_path);
            }
            tracing::debug!("config.toml not found at: {}", config_path.display());
        }
    }

    let cwd_path = PathBuf::from("config.toml");
    if cwd_path.exists() {
        return read_config(&cwd_path);
    }

    tracing::info!("Using default embedded configuration");
    default_config()
}

pub fn default_config() -> anyhow::Result<Config> {
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    config.sync.validate()?;
    Ok(config)
}

/// Resolves a relative csv directory against the executable directory,
/// falling back to the working directory
pub fn resolve_csv_dir(config: &SyncConfig) -> Option<PathBuf> {
    let raw = config.csv_dir.as_deref()?;
    let path = Path::new(raw);
    if path.is_absolute() || path.exists() {
        return Some(path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let resolved = exe_dir.join(path);
            if resolved.exists() {
                return Some(resolved);
            }
        }
    }

    Some(path.to_path_buf())
}
