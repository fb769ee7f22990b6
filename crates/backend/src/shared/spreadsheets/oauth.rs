//! OAuth 2.0 authorization-code flow with PKCE for the interactive sign-in.
//!
//! The consent URL is published through [`ConsentBroker`]; the HTTP callback
//! route hands the redirect parameters back to the waiting sign-in.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

use crate::shared::config::GoogleConfig;

/// PKCE verifier and its S256 challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    pub fn generate() -> Self {
        Self::from_verifier(random_token(32))
    }

    pub fn from_verifier(verifier: String) -> Self {
        let digest = Sha256::digest(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(digest);
        Self {
            verifier,
            challenge,
        }
    }
}

/// URL-safe random token of `bytes` bytes of entropy
pub fn random_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

pub fn consent_url(config: &GoogleConfig, client_id: &str, state: &str, pkce: &Pkce) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}&code_challenge={}&code_challenge_method=S256&access_type=offline&prompt=consent",
        config.auth_url,
        urlencoding::encode(client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(&config.scopes),
        urlencoding::encode(state),
        pkce.challenge,
    )
}

/// Query parameters of the OAuth redirect
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Result delivered to the waiting sign-in: authorization code or denial reason
pub type ConsentOutcome = Result<String, String>;

struct PendingConsent {
    state: String,
    url: String,
    sender: oneshot::Sender<ConsentOutcome>,
}

/// Rendezvous between the sign-in waiting for consent and the callback route
#[derive(Default)]
pub struct ConsentBroker {
    pending: Mutex<Option<PendingConsent>>,
}

impl ConsentBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new consent request, replacing (and thereby cancelling)
    /// any previous one
    pub fn begin(&self, state: String, url: String) -> oneshot::Receiver<ConsentOutcome> {
        let (sender, receiver) = oneshot::channel();
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending = Some(PendingConsent { state, url, sender });
        receiver
    }

    pub fn pending_url(&self) -> Option<String> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|p| p.url.clone())
    }

    pub fn cancel(&self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Delivers the callback parameters. Rejected when nothing is pending or
    /// the `state` does not match the pending request.
    pub fn complete(&self, params: CallbackParams) -> Result<(), String> {
        let mut guard = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let matches = guard
            .as_ref()
            .is_some_and(|p| params.state.as_deref() == Some(p.state.as_str()));
        if !matches {
            return Err("No sign-in is waiting for this callback".to_string());
        }
        let Some(pending) = guard.take() else {
            return Err("No sign-in is waiting for this callback".to_string());
        };

        let outcome = match (params.code, params.error) {
            (_, Some(error)) => Err(error),
            (Some(code), None) if !code.is_empty() => Ok(code),
            _ => Err("Callback carried no authorization code".to_string()),
        };
        let delivered = outcome.is_ok();
        // The sign-in may already have timed out and dropped its receiver
        let _ = pending.sender.send(outcome);
        if delivered {
            Ok(())
        } else {
            Err("Sign-in was denied".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::default_config;

    #[test]
    fn test_pkce_challenge_is_s256_of_verifier() {
        let pkce = Pkce::from_verifier("dBjftJeZ4CVP-mJ0IqKOWrKDEvJKTBhvmHmd3pm4pNI".to_string());
        assert_eq!(pkce.challenge, "55Ccp_Z1aDoRRbQqLlGj4oU-VJRF88uhj_KXiKZzlO4");
    }

    #[test]
    fn test_generated_pkce_is_url_safe() {
        let pkce = Pkce::generate();
        assert_eq!(pkce.verifier.len(), 43);
        assert_eq!(pkce.challenge.len(), 43);
        assert!(pkce
            .verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(Pkce::generate().verifier, pkce.verifier);
    }

    #[test]
    fn test_consent_url_carries_flow_parameters() {
        let config = default_config().unwrap();
        let pkce = Pkce::from_verifier("verifier".to_string());
        let url = consent_url(&config.google, "client id", "st", &pkce);

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client%20id"));
        assert!(url.contains("state=st"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains(&format!("code_challenge={}", pkce.challenge)));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth%2Fcallback"));
    }

    #[tokio::test]
    async fn test_broker_delivers_code_for_matching_state() {
        let broker = ConsentBroker::new();
        let receiver = broker.begin("abc".into(), "https://consent".into());
        assert_eq!(broker.pending_url().as_deref(), Some("https://consent"));

        let result = broker.complete(CallbackParams {
            code: Some("the-code".into()),
            state: Some("abc".into()),
            error: None,
        });
        assert!(result.is_ok());
        assert_eq!(receiver.await.unwrap(), Ok("the-code".to_string()));
        assert!(broker.pending_url().is_none());
    }

    #[tokio::test]
    async fn test_broker_rejects_foreign_state_and_forwards_denial() {
        let broker = ConsentBroker::new();
        let receiver = broker.begin("abc".into(), "https://consent".into());

        let foreign = broker.complete(CallbackParams {
            code: Some("x".into()),
            state: Some("other".into()),
            error: None,
        });
        assert!(foreign.is_err());
        assert!(broker.pending_url().is_some());

        let denied = broker.complete(CallbackParams {
            code: None,
            state: Some("abc".into()),
            error: Some("access_denied".into()),
        });
        assert!(denied.is_err());
        assert_eq!(receiver.await.unwrap(), Err("access_denied".to_string()));
    }
}
