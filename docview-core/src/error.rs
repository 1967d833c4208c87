//! src/error.rs
//! ============================================================================
//! # AppError: Unified Error Type for the Documentation Viewer
//!
//! This module defines the error enums used across the application. Tree and
//! validation failures come from `doctree`; fetch and upload failures are local
//! to the content layer. None of them end the session.

use compact_str::CompactString;
use doctree::TreeError;
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
};
use thiserror::Error;

/// Failure to obtain the text behind a document path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Server answered with a non-2xx status.
    #[error("HTTP error! status: {status} for {path}")]
    Status { path: CompactString, status: u16 },

    /// Connection or protocol failure before a status was received.
    #[error("Network error for {path}: {message}")]
    Network {
        path: CompactString,
        message: CompactString,
    },

    /// Local document root could not be read.
    #[error("Failed to read {path}: {kind:?}")]
    Io { path: CompactString, kind: ErrorKind },

    /// Path escapes the document root or is otherwise unusable.
    #[error("Invalid document path: {0}")]
    InvalidPath(CompactString),

    /// Superseded by a newer request before completing.
    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn status(path: &str, status: u16) -> Self {
        Self::Status {
            path: path.into(),
            status,
        }
    }

    pub fn network(path: &str, message: impl Into<CompactString>) -> Self {
        Self::Network {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Failure while ingesting a local file into a new document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please select a file to upload.")]
    NoFileSelected,

    #[error("Please select a .md or .html file.")]
    UnsupportedExtension(PathBuf),

    #[error("Error reading file content.")]
    Read { path: PathBuf, kind: ErrorKind },
}

/// Unified error type for application operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serialization or deserialization error (e.g., JSON seed).
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Tree store or validation failure.
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Background task failure or join error.
    #[error("Async task failed: {0}")]
    Task(String),

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    /// Validation problems are reported to the user as-is, everything else is logged too.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Tree(err) => err.is_validation(),
            Self::Upload(UploadError::NoFileSelected | UploadError::UnsupportedExtension(_)) => {
                true
            }
            _ => false,
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}
