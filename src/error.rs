//! Error types for the drive_tree crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to Google Drive or the operator.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Failed to read credentials file {path:?}: {source}")]
    CredentialsFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse credentials JSON: {0}")]
    CredentialsParse(#[from] serde_json::Error),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Failed to save token to {path:?}: {source}")]
    TokenSave {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid URL or ID: {0}")]
    InvalidUrlOrId(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Console I/O failed: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
