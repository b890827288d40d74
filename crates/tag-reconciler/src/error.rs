//! Error types for tag reconciliation.

use crate::client::{ClientError, TagOperation};
use thiserror::Error;

/// Errors that can occur while reconciling tags.
#[derive(Debug, Error)]
pub enum TagSyncError {
    /// The remote delete-tags or create-tags call failed.
    ///
    /// The client's error is kept untouched as the source so callers can
    /// downcast it to the concrete client error type.
    #[error("{operation} failed for {identifier}: {source}")]
    RemoteCallFailure {
        operation: TagOperation,
        identifier: String,
        #[source]
        source: ClientError,
    },

    /// A tag value in a loosely typed map was not a string.
    #[error("Tag value for key '{key}' must be a string")]
    InvalidTagValue { key: String },
}

impl TagSyncError {
    /// Identifier the failed remote call was scoped to, if any.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::RemoteCallFailure { identifier, .. } => Some(identifier),
            Self::InvalidTagValue { .. } => None,
        }
    }
}

/// Result type alias using TagSyncError.
pub type TagSyncResult<T> = Result<T, TagSyncError>;
