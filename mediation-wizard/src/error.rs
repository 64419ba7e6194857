// Error types shared across the wizard core, storage and HTTP layers.
//
// Binary entry points (`lib.rs`, the TUI loop) wrap these in `anyhow::Error`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Failed to (de)serialize form state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend answered with HTTP {0}")]
    Status(u16),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl WizardError {
    /// Whether a retry could plausibly succeed (transport errors and 5xx answers).
    pub fn is_transient(&self) -> bool {
        match self {
            WizardError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            WizardError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

pub type WizardResult<T> = std::result::Result<T, WizardError>;
