//! Error types and handling.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed required field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Another department already uses this name
    #[error("Duplicate department name: {0}")]
    DuplicateName(String),

    /// Another collaborator already uses this email
    #[error("Duplicate email: {0}")]
    DuplicateEmail(String),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication service rejected the request
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Remote store call failed for another reason
    #[error("Remote operation failed: {0}")]
    Remote(String),

    /// Document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excel export error
    #[error("Export error: {0}")]
    Export(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a validation error with message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error with message
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a remote operation error with message
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Create an authentication error with message
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a config error with message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for failures of the store or auth service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Http(_) | Self::Remote(_) | Self::Serialization(_)
        )
    }

    /// Message suitable for the notification banner.
    ///
    /// Remote failures collapse to `fallback`; the detail is only logged.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(msg) | Self::Auth(msg) => msg.clone(),
            Self::DuplicateName(name) => format!("A department named '{name}' already exists"),
            Self::DuplicateEmail(email) => format!("A collaborator with email '{email}' already exists"),
            Self::NotFound(what) => format!("{what} not found"),
            _ => {
                tracing::error!("{fallback}: {self}");
                fallback.to_string()
            }
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(e.to_string())
    }
}
