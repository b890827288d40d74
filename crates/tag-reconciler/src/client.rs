//! Remote tag client seam.

use crate::types::Tag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned by a [`TagClient`] implementation.
pub type ClientError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The two mutating calls the reconciler issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOperation {
    Delete,
    Create,
}

impl TagOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete-tags",
            Self::Create => "create-tags",
        }
    }
}

impl fmt::Display for TagOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for remote inventory backends that can mutate resource tags.
///
/// Each call is blocking and scoped to exactly one identifier. Retries,
/// timeouts and cancellation belong to the implementation.
pub trait TagClient: Send + Sync {
    /// Remove the given tags from the resource.
    fn delete_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError>;

    /// Create (or overwrite) the given tags on the resource.
    fn create_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError>;
}

impl<T: TagClient + ?Sized> TagClient for &T {
    fn delete_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
        (**self).delete_tags(identifier, tags)
    }

    fn create_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
        (**self).create_tags(identifier, tags)
    }
}

impl<T: TagClient + ?Sized> TagClient for Box<T> {
    fn delete_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
        (**self).delete_tags(identifier, tags)
    }

    fn create_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
        (**self).create_tags(identifier, tags)
    }
}
