#![allow(dead_code)]

use std::sync::Mutex;
use tag_reconciler::{ClientError, Tag, TagClient, TagOperation, TagSet};

/// One remote call as seen by the recording client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: TagOperation,
    pub identifier: String,
    pub tags: Vec<Tag>,
}

/// Error returned by injected failures.
#[derive(Debug, thiserror::Error)]
#[error("injected {operation} failure for {identifier}")]
pub struct InjectedFailure {
    pub operation: TagOperation,
    pub identifier: String,
}

/// A fake tag client that records every call and can fail on demand.
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<RecordedCall>>,
    failures: Vec<(TagOperation, String)>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, operation: TagOperation, identifier: &str) -> Self {
        self.failures.push((operation, identifier.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.identifier).collect()
    }

    fn record(
        &self,
        operation: TagOperation,
        identifier: &str,
        tags: &[Tag],
    ) -> Result<(), ClientError> {
        if self
            .failures
            .iter()
            .any(|(op, id)| *op == operation && id == identifier)
        {
            return Err(Box::new(InjectedFailure {
                operation,
                identifier: identifier.to_string(),
            }));
        }
        self.calls.lock().expect("calls lock").push(RecordedCall {
            operation,
            identifier: identifier.to_string(),
            tags: tags.to_vec(),
        });
        Ok(())
    }
}

impl TagClient for RecordingClient {
    fn delete_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
        self.record(TagOperation::Delete, identifier, tags)
    }

    fn create_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
        self.record(TagOperation::Create, identifier, tags)
    }
}

pub fn tags(pairs: &[(&str, &str)]) -> TagSet {
    pairs.iter().copied().collect()
}
