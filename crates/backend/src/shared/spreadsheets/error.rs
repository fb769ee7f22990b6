use thiserror::Error;

/// Failures of a remote spreadsheet provider
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpreadsheetError {
    /// Provider cannot be configured or reached
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Sign-in denied, cancelled or timed out
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not signed in to the spreadsheet provider")]
    NotAuthenticated,

    /// Transport or provider failure while reading data
    #[error("Fetch error: {0}")]
    Fetch(String),
}

impl SpreadsheetError {
    pub fn fetch(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Fetch(format!("{}: {}", context, err))
    }
}
