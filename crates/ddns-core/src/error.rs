//! Error types for the DDNS updater
//!
//! The variants mirror how a run reacts to a failure: configuration and
//! address-resolution failures abort the whole run, everything else aborts
//! only the mapping entry being processed.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed credentials, domain entries or settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failure, timeout or non-2xx HTTP status
    #[error("Transport error: {0}")]
    Transport(String),

    /// The registrar answered with a document we could not understand
    #[error("Decode error: {message}")]
    Decode {
        /// What went wrong
        message: String,
        /// The raw response, kept for diagnostics
        payload: String,
    },

    /// Well-formed registrar response reporting failure
    #[error("Registrar rejected the request: {}", format_errors(.errors))]
    Registrar {
        /// Error messages reported by the registrar
        errors: Vec<String>,
        /// The raw response, kept for diagnostics
        payload: String,
    },

    /// The public address could not be determined
    #[error("Address resolution error: {0}")]
    Resolution(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

fn format_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        "no error details returned".to_string()
    } else {
        errors.join("; ")
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error carrying the offending payload
    pub fn decode(message: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            payload: payload.into(),
        }
    }

    /// Create a registrar error
    pub fn registrar(errors: Vec<String>, payload: impl Into<String>) -> Self {
        Self::Registrar {
            errors,
            payload: payload.into(),
        }
    }

    /// Create an address resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Whether this error must abort the whole run rather than one entry
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Resolution(_))
    }

    /// The raw registrar payload attached to this error, if any
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Decode { payload, .. } | Self::Registrar { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
