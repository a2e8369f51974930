//! Error types for buncli

use reqwest::StatusCode;
use std::process::ExitCode;
use thiserror::Error;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReturnCode {
    Success = 0,
    HelpPrinted = 1,
    ArgumentError = 2,
    OtherError = 3,
    Exception = 4,
}

impl From<ReturnCode> for ExitCode {
    fn from(code: ReturnCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Error types for buncli operations
#[derive(Debug, Error)]
pub enum BunError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration (direction, root, credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote listing returned a non-success status
    #[error("Could not complete listing: The API returned HTTP status {status}.")]
    InventoryFetch { status: StatusCode },

    /// A single get/put/delete returned a non-success status
    #[error("Could not complete {operation}: The API returned HTTP status {status}.")]
    Status {
        operation: &'static str,
        status: StatusCode,
    },

    /// The remove verb got a non-success status
    #[error("Could not delete file: The API returned HTTP status {status}.")]
    DeleteFailed { status: StatusCode },

    /// Shutdown was requested while a transfer was in flight
    #[error("Transfer cancelled")]
    Cancelled,
}

impl BunError {
    /// Check if this error is a configuration error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, BunError::Config(_))
    }

    /// Check if this error came from cooperative cancellation
    pub fn is_cancellation(&self) -> bool {
        matches!(self, BunError::Cancelled)
    }

    /// Errors that abort a sync run instead of being recorded per file
    pub fn is_fatal(&self) -> bool {
        matches!(self, BunError::Config(_) | BunError::InventoryFetch { .. })
    }

    /// Exit code the binary reports for this error
    pub fn return_code(&self) -> ReturnCode {
        match self {
            BunError::Config(_) => ReturnCode::ArgumentError,
            BunError::InventoryFetch { .. }
            | BunError::Status { .. }
            | BunError::DeleteFailed { .. } => ReturnCode::OtherError,
            BunError::Cancelled => ReturnCode::Success,
            BunError::Io(_) | BunError::Http(_) => ReturnCode::Exception,
        }
    }
}
