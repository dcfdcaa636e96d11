//! Application layer errors

use thiserror::Error;

/// Top-level errors of the binary
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Marketplace error: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Errors that abort a run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Marketplace error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Malformed pickup timestamp: {value:?}")]
    MalformedTimestamp { value: String },

    #[error("Missing pickup interval for store {store_id} item {item_id}")]
    MissingPickupInterval { store_id: i64, item_id: i64 },
}

/// Reason a marketplace call failed, classified by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Credentials rejected or expired beyond refresh
    Unauthorized,
    Other,
}

/// Marketplace API errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind:?} (status {status:?}): {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn unauthorized(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            status,
            message: message.into(),
        }
    }

    pub fn other(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Other,
            status,
            message: message.into(),
        }
    }

    /// Classify a failed response from its status and body.
    ///
    /// A 403 alone is not enough: bot-protection blocks answer 403 with a captcha.
    pub fn from_response(status: u16, body: &str) -> Self {
        if status == 401 || body.to_uppercase().contains("UNAUTHORIZED") {
            Self::unauthorized(Some(status), body)
        } else {
            Self::other(Some(status), body)
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database connection lock poisoned")]
    Poisoned,
}

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rejected by {channel}: {message}")]
    Rejected { channel: String, message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
