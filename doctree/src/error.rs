//! Error handling for tree store operations and document validation

use compact_str::CompactString;
use std::io::ErrorKind;
use thiserror::Error;

pub type TreeResult<T> = Result<T, TreeError>;

/// Errors raised by the tree store, seed loading and draft validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Cannot add to '{parent}': documents cannot hold children")]
    InvalidParent { parent: CompactString },

    #[error("Node not found: {0}")]
    NodeNotFound(CompactString),

    #[error("Duplicate node id: {0}")]
    DuplicateId(CompactString),

    #[error("{message}")]
    Validation {
        field: &'static str,
        message: CompactString,
    },

    #[error("Seed parse error: {0}")]
    SeedParse(CompactString),

    #[error("Failed to read seed file {path}: {kind:?}")]
    SeedIo { path: CompactString, kind: ErrorKind },
}

impl TreeError {
    /// Create a validation error for a named form field
    #[inline]
    pub fn validation(field: &'static str, message: impl Into<CompactString>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    #[inline]
    pub fn is_validation(&self) -> bool {
        matches!(self, TreeError::Validation { .. })
    }

    #[inline]
    pub fn invalid_parent(parent: impl Into<CompactString>) -> Self {
        Self::InvalidParent {
            parent: parent.into(),
        }
    }

    #[inline]
    pub fn seed_io(path: &std::path::Path, io_error: &std::io::Error) -> Self {
        Self::SeedIo {
            path: CompactString::from(path.to_string_lossy()),
            kind: io_error.kind(),
        }
    }
}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        TreeError::SeedParse(CompactString::from(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_displayed_verbatim() {
        let err = TreeError::validation("name", "Document name is required.");
        assert_eq!(err.to_string(), "Document name is required.");
        assert!(err.is_validation());
    }

    #[test]
    fn invalid_parent_names_the_parent() {
        let err = TreeError::invalid_parent("Introduction");
        assert!(err.to_string().contains("Introduction"));
        assert!(!err.is_validation());
    }
}
