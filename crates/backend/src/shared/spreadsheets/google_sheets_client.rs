use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::shared::{RawTable, SheetDocument};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use super::oauth::{self, CallbackParams, ConsentBroker, Pkce};
use super::{newest_first, SpreadsheetError, SpreadsheetProvider, DEFAULT_RANGE, DOCUMENT_PAGE_SIZE};
use crate::shared::config::GoogleConfig;

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
const DRIVE_FIELDS: &str = "files(id,name,webViewLink,modifiedTime)";
const VALUES_GET_POINTER: &str = "/resources/spreadsheets/resources/values/methods/get/path";
const DEFAULT_VALUES_GET_PATH: &str = "v4/spreadsheets/{spreadsheetId}/values/{range}";

/// Tokens are refreshed this long before they actually expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Secrets of the Google provider, read from the environment
#[derive(Debug, Clone, Default)]
pub struct GoogleCredentials {
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

impl GoogleCredentials {
    pub fn from_env() -> Self {
        fn var(name: &str) -> Option<String> {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            api_key: var("GOOGLE_API_KEY"),
            client_id: var("GOOGLE_CLIENT_ID"),
            client_secret: var("GOOGLE_CLIENT_SECRET"),
            refresh_token: var("GOOGLE_REFRESH_TOKEN"),
        }
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    refresh_token: Option<String>,
    expires_at: Option<Instant>,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() + EXPIRY_MARGIN < at,
            None => true,
        }
    }
}

// ============================================================================
// Wire models
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveryDocument {
    root_url: String,
    #[serde(default)]
    service_path: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    web_view_link: Option<String>,
    #[serde(default)]
    modified_time: Option<String>,
}

impl DriveFile {
    fn into_document(self) -> SheetDocument {
        let modified_time = self
            .modified_time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc));
        let link = self
            .web_view_link
            .unwrap_or_else(|| format!("https://docs.google.com/spreadsheets/d/{}", self.id));
        SheetDocument {
            id: self.id,
            name: self.name,
            link,
            modified_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    range: String,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Unformatted cell values arrive as JSON scalars
pub fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        other => other.to_string(),
    }
}

/// Absolute `values.get` URL template from the discovery document
fn values_template(discovery: &serde_json::Value) -> Result<String, SpreadsheetError> {
    let doc: DiscoveryDocument = serde_json::from_value(discovery.clone())
        .map_err(|e| SpreadsheetError::Initialization(format!("Invalid discovery document: {}", e)))?;
    let path = discovery
        .pointer(VALUES_GET_POINTER)
        .and_then(|p| p.as_str())
        .unwrap_or(DEFAULT_VALUES_GET_PATH);
    Ok(format!("{}{}{}", doc.root_url, doc.service_path, path))
}

fn values_url(template: &str, document_id: &str, range: &str) -> String {
    template
        .replace("{spreadsheetId}", &urlencoding::encode(document_id))
        .replace("{range}", &urlencoding::encode(range))
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(500) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for Google Sheets (values) and Google Drive (listing)
pub struct GoogleSheetsClient {
    config: GoogleConfig,
    credentials: GoogleCredentials,
    client: reqwest::Client,
    values_template: RwLock<Option<String>>,
    token: Mutex<Option<AccessToken>>,
    signed_in: AtomicBool,
    consent: ConsentBroker,
}

impl GoogleSheetsClient {
    pub fn new(config: GoogleConfig, credentials: GoogleCredentials) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self {
            config,
            credentials,
            client,
            values_template: RwLock::new(None),
            token: Mutex::new(None),
            signed_in: AtomicBool::new(false),
            consent: ConsentBroker::new(),
        })
    }

    fn ensure_signed_in(&self) -> Result<(), SpreadsheetError> {
        if self.is_signed_in() {
            Ok(())
        } else {
            Err(SpreadsheetError::NotAuthenticated)
        }
    }

    fn client_id(&self) -> Result<&str, SpreadsheetError> {
        self.credentials.client_id.as_deref().ok_or_else(|| {
            SpreadsheetError::Initialization("GOOGLE_CLIENT_ID is not set".to_string())
        })
    }

    fn api_key(&self) -> Result<&str, SpreadsheetError> {
        self.credentials.api_key.as_deref().ok_or_else(|| {
            SpreadsheetError::Initialization("GOOGLE_API_KEY is not set".to_string())
        })
    }

    fn store_token(&self, token: AccessToken) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn current_token(&self) -> Option<AccessToken> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reads the body as text first so that parse failures can be logged
    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        url: &str,
    ) -> Result<T, SpreadsheetError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SpreadsheetError::fetch(&format!("Failed to read response from {}", url), e))?;

        if !status.is_success() {
            tracing::error!("Google API returned {} for {}: {}", status, url, preview(&body));
            return Err(SpreadsheetError::Fetch(format!(
                "HTTP {} from {}: {}",
                status,
                url,
                preview(&body)
            )));
        }

        tracing::debug!("Google API response from {}: {}", url, preview(&body));
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse response from {}: {}", url, e);
            SpreadsheetError::fetch(&format!("Unexpected response from {}", url), e)
        })
    }

    async fn request_token(
        &self,
        form: &[(&str, &str)],
        previous_refresh: Option<String>,
    ) -> Result<AccessToken, SpreadsheetError> {
        let url = &self.config.token_url;
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| SpreadsheetError::Auth(format!("Token request failed: {}", e)))?;

        let parsed: TokenResponse = self
            .read_json(response, url)
            .await
            .map_err(|e| SpreadsheetError::Auth(e.to_string()))?;

        Ok(AccessToken {
            value: parsed.access_token,
            refresh_token: parsed.refresh_token.or(previous_refresh),
            expires_at: parsed
                .expires_in
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, SpreadsheetError> {
        let client_id = self.client_id()?;
        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
        ];
        if let Some(secret) = self.credentials.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }
        self.request_token(&form, Some(refresh_token.to_string()))
            .await
    }

    async fn exchange_code(&self, code: &str, pkce: &Pkce) -> Result<AccessToken, SpreadsheetError> {
        let client_id = self.client_id()?;
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", pkce.verifier.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", client_id),
        ];
        if let Some(secret) = self.credentials.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }
        self.request_token(&form, None).await
    }

    /// Waits for the user to grant access through the consent URL
    async fn interactive_sign_in(&self) -> Result<AccessToken, SpreadsheetError> {
        let pkce = Pkce::generate();
        let state = oauth::random_token(16);
        let url = oauth::consent_url(&self.config, self.client_id()?, &state, &pkce);
        let receiver = self.consent.begin(state, url.clone());
        tracing::info!("Waiting for Google sign-in consent: {}", url);

        let code = match tokio::time::timeout(self.config.sign_in_wait(), receiver).await {
            Err(_) => {
                self.consent.cancel();
                return Err(SpreadsheetError::Auth("Sign-in timed out".to_string()));
            }
            Ok(Err(_)) => return Err(SpreadsheetError::Auth("Sign-in was cancelled".to_string())),
            Ok(Ok(Err(reason))) => return Err(SpreadsheetError::Auth(reason)),
            Ok(Ok(Ok(code))) => code,
        };
        self.exchange_code(&code, &pkce).await
    }

    /// Current bearer token, refreshed when close to expiry
    async fn bearer(&self) -> Result<String, SpreadsheetError> {
        let token = self
            .current_token()
            .ok_or(SpreadsheetError::NotAuthenticated)?;
        if token.is_fresh() {
            return Ok(token.value);
        }

        let Some(refresh_token) = token.refresh_token.clone() else {
            return Err(SpreadsheetError::Fetch(
                "Access token expired; sign in again".to_string(),
            ));
        };
        tracing::info!("Refreshing Google access token");
        let refreshed = self
            .refresh(&refresh_token)
            .await
            .map_err(|e| SpreadsheetError::Fetch(e.to_string()))?;
        let value = refreshed.value.clone();
        self.store_token(refreshed);
        Ok(value)
    }

    async fn get_authorized<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SpreadsheetError> {
        let bearer = self.bearer().await?;
        tracing::info!("Google API: GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(bearer)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SpreadsheetError::fetch(&format!("Network error for {}", url), e))?;
        self.read_json(response, url).await
    }
}

#[async_trait]
impl SpreadsheetProvider for GoogleSheetsClient {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn initialize(&self) -> Result<(), SpreadsheetError> {
        if self
            .values_template
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
        {
            return Ok(());
        }
        let key = self.api_key()?;
        self.client_id()?;

        let url = &self.config.discovery_url;
        tracing::info!("Loading Sheets discovery document: {}", url);
        let response = self
            .client
            .get(url)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| SpreadsheetError::Initialization(format!("{}: {}", url, e)))?;
        let discovery: serde_json::Value = self
            .read_json(response, url)
            .await
            .map_err(|e| SpreadsheetError::Initialization(e.to_string()))?;

        let template = values_template(&discovery)?;
        tracing::info!("Sheets values endpoint: {}", template);
        *self
            .values_template
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(template);
        Ok(())
    }

    async fn sign_in(&self) -> Result<(), SpreadsheetError> {
        self.initialize().await?;

        let token = match self.credentials.refresh_token.clone() {
            Some(refresh_token) => {
                tracing::info!("Signing in to Google with the configured refresh token");
                self.refresh(&refresh_token).await?
            }
            None => self.interactive_sign_in().await?,
        };
        self.store_token(token);
        self.signed_in.store(true, Ordering::SeqCst);
        tracing::info!("Signed in to Google");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), SpreadsheetError> {
        self.signed_in.store(false, Ordering::SeqCst);
        self.consent.cancel();
        let token = self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        // Revocation is best effort; the local session is gone either way
        if let Some(token) = token {
            let revoke = self
                .client
                .post(&self.config.revoke_url)
                .form(&[("token", token.value.as_str())])
                .send()
                .await;
            if let Err(e) = revoke {
                tracing::warn!("Token revocation failed: {}", e);
            }
        }
        Ok(())
    }

    fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    async fn list_documents(&self) -> Result<Vec<SheetDocument>, SpreadsheetError> {
        self.ensure_signed_in()?;

        let url = format!("{}/files", self.config.drive_base_url.trim_end_matches('/'));
        let query = format!("mimeType='{}'", SPREADSHEET_MIME_TYPE);
        let page_size = DOCUMENT_PAGE_SIZE.to_string();
        let list: DriveFileList = self
            .get_authorized(
                &url,
                &[
                    ("q", query.as_str()),
                    ("fields", DRIVE_FIELDS),
                    ("orderBy", "modifiedTime desc"),
                    ("pageSize", page_size.as_str()),
                ],
            )
            .await?;

        tracing::info!("Google Drive: {} spreadsheets", list.files.len());
        Ok(newest_first(
            list.files.into_iter().map(DriveFile::into_document).collect(),
        ))
    }

    async fn fetch_range(
        &self,
        document_id: &str,
        range: Option<&str>,
    ) -> Result<RawTable, SpreadsheetError> {
        self.ensure_signed_in()?;
        let range = range.unwrap_or(DEFAULT_RANGE);
        let template = self
            .values_template
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| SpreadsheetError::Fetch("Client is not initialized".to_string()))?;

        let url = values_url(&template, document_id, range);
        let values: ValueRange = self
            .get_authorized(
                &url,
                &[
                    ("valueRenderOption", "UNFORMATTED_VALUE"),
                    ("dateTimeRenderOption", "FORMATTED_STRING"),
                ],
            )
            .await?;

        let rows: Vec<Vec<String>> = values
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        tracing::info!("Google Sheets: {} rows from {} ({})", rows.len(), document_id, range);

        let reported = if values.range.is_empty() {
            range.to_string()
        } else {
            values.range
        };
        Ok(RawTable::new(reported, rows))
    }

    fn pending_consent_url(&self) -> Option<String> {
        self.consent.pending_url()
    }

    fn complete_consent(&self, params: CallbackParams) -> Result<(), String> {
        self.consent.complete(params)
    }
}
