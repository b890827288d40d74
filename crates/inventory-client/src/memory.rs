//! In-memory inventory used for dry runs and tests.

use crate::error::InventoryError;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use tag_reconciler::{ClientError, Tag, TagClient, TagOperation, TagSet};
use tracing::debug;

/// One call received by the in-memory inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryCall {
    pub operation: TagOperation,
    pub identifier: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Default)]
struct InventoryState {
    resources: BTreeMap<String, TagSet>,
    calls: Vec<InventoryCall>,
    failures: Vec<(TagOperation, String)>,
}

/// A tag inventory held in process memory.
///
/// Deleting a tag only removes it when the stored value matches, the same
/// rule the remote inventory applies. Every successful call is recorded in
/// order.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    state: Mutex<InventoryState>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a resource with its current tags.
    pub fn with_resource(self, identifier: impl Into<String>, tags: TagSet) -> Self {
        self.state.lock().resources.insert(identifier.into(), tags);
        self
    }

    /// Make every `operation` call against `identifier` fail.
    pub fn fail_on(&self, operation: TagOperation, identifier: impl Into<String>) {
        self.state
            .lock()
            .failures
            .push((operation, identifier.into()));
    }

    /// Current tags of a resource; empty when unknown.
    pub fn tags_for(&self, identifier: &str) -> TagSet {
        self.state
            .lock()
            .resources
            .get(identifier)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<InventoryCall> {
        self.state.lock().calls.clone()
    }

    fn mutate(
        &self,
        operation: TagOperation,
        identifier: &str,
        tags: &[Tag],
    ) -> Result<(), InventoryError> {
        let mut state = self.state.lock();

        if state
            .failures
            .iter()
            .any(|(op, id)| *op == operation && id == identifier)
        {
            return Err(InventoryError::Injected(format!(
                "{operation} rejected for {identifier}"
            )));
        }

        let current = state.resources.entry(identifier.to_string()).or_default();
        let mut updated: BTreeMap<String, String> = current
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        match operation {
            TagOperation::Delete => {
                for tag in tags {
                    if updated.get(&tag.key) == Some(&tag.value) {
                        updated.remove(&tag.key);
                    }
                }
            }
            TagOperation::Create => {
                for tag in tags {
                    updated.insert(tag.key.clone(), tag.value.clone());
                }
            }
        }
        *current = TagSet::from(updated);

        debug!(%operation, identifier, count = tags.len(), "In-memory inventory updated");
        state.calls.push(InventoryCall {
            operation,
            identifier: identifier.to_string(),
            tags: tags.to_vec(),
        });
        Ok(())
    }
}

impl TagClient for InMemoryInventory {
    fn delete_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
        self.mutate(TagOperation::Delete, identifier, tags)
            .map_err(Into::into)
    }

    fn create_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
        self.mutate(TagOperation::Create, identifier, tags)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> TagSet {
        pairs.iter().copied().collect()
    }

    #[test]
    fn create_overwrites_and_adds() {
        let inventory = InMemoryInventory::new().with_resource("i-456", tags(&[("env", "dev")]));

        inventory
            .create_tags("i-456", &[Tag::new("env", "prod"), Tag::new("team", "x")])
            .unwrap();

        assert_eq!(
            inventory.tags_for("i-456"),
            tags(&[("env", "prod"), ("team", "x")])
        );
    }

    #[test]
    fn delete_requires_matching_value() {
        let inventory = InMemoryInventory::new()
            .with_resource("i-456", tags(&[("env", "prod"), ("owner", "a")]));

        inventory
            .delete_tags("i-456", &[Tag::new("env", "dev"), Tag::new("owner", "a")])
            .unwrap();

        assert_eq!(inventory.tags_for("i-456"), tags(&[("env", "prod")]));
    }

    #[test]
    fn injected_failure_is_not_recorded() {
        let inventory = InMemoryInventory::new();
        inventory.fail_on(TagOperation::Create, "i-456");

        let err = inventory
            .create_tags("i-456", &[Tag::new("env", "prod")])
            .unwrap_err();
        assert!(err.to_string().contains("create-tags rejected for i-456"));
        assert!(inventory.calls().is_empty());
        assert!(inventory.tags_for("i-456").is_empty());
    }

    #[test]
    fn unknown_resource_has_no_tags() {
        let inventory = InMemoryInventory::new();
        assert!(inventory.tags_for("i-missing").is_empty());
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let inventory = InMemoryInventory::new();
        inventory.delete_tags("a", &[Tag::new("k", "v")]).unwrap();
        inventory.create_tags("b", &[Tag::new("k", "v")]).unwrap();

        let calls = inventory.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].operation, TagOperation::Delete);
        assert_eq!(calls[0].identifier, "a");
        assert_eq!(calls[1].operation, TagOperation::Create);
        assert_eq!(calls[1].identifier, "b");
    }
}
