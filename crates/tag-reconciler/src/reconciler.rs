//! Applying tag diffs to one or more remote identifiers.

use crate::client::{TagClient, TagOperation};
use crate::diff::diff_tags;
use crate::error::{TagSyncError, TagSyncResult};
use crate::identity::IdentityResolver;
use crate::types::{ResourceState, TagDiff, TagSet};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// What one `apply` did against a single identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub identifier: String,
    /// Number of tags sent in the delete-tags call (0 = call skipped).
    pub removed: usize,
    /// Number of tags sent in the create-tags call (0 = call skipped).
    pub created: usize,
}

impl ApplyOutcome {
    pub fn delete_issued(&self) -> bool {
        self.removed > 0
    }

    pub fn create_issued(&self) -> bool {
        self.created > 0
    }
}

/// Result of reconciling one resource across all of its identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub primary_id: String,
    /// The caller reported no tag change; no remote call was made.
    pub skipped: bool,
    /// A request-style resource had no derived identifier to mirror onto.
    pub fallback: bool,
    /// One entry per identifier, in the order they were reconciled.
    pub applied: Vec<ApplyOutcome>,
}

impl ReconcileReport {
    fn skipped(primary_id: &str) -> Self {
        Self {
            primary_id: primary_id.to_string(),
            skipped: true,
            fallback: false,
            applied: Vec::new(),
        }
    }

    /// Total number of remote calls issued.
    pub fn call_count(&self) -> usize {
        self.applied
            .iter()
            .map(|o| usize::from(o.delete_issued()) + usize::from(o.create_issued()))
            .sum()
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped {
            return write!(f, "{}: tags unchanged, nothing to do", self.primary_id);
        }
        write!(f, "{}:", self.primary_id)?;
        for outcome in &self.applied {
            write!(
                f,
                "\n  {} removed={} created={}",
                outcome.identifier, outcome.removed, outcome.created
            )?;
        }
        if self.fallback {
            write!(f, "\n  (no derived identifier, request tagged only)")?;
        }
        Ok(())
    }
}

/// Apply a diff to a single identifier.
///
/// Issues delete-tags for the removals and then create-tags for the
/// creations, skipping either call when its set is empty. A failed delete
/// stops before create is attempted.
pub fn apply_diff<C>(client: &C, identifier: &str, diff: &TagDiff) -> TagSyncResult<ApplyOutcome>
where
    C: TagClient + ?Sized,
{
    if !diff.remove.is_empty() {
        debug!(identifier, tags = ?diff.remove, "Removing tags");
        client
            .delete_tags(identifier, &diff.remove)
            .map_err(|source| TagSyncError::RemoteCallFailure {
                operation: TagOperation::Delete,
                identifier: identifier.to_string(),
                source,
            })?;
    }

    let create = diff.create.to_tags();
    if !create.is_empty() {
        debug!(identifier, tags = ?create, "Creating tags");
        client
            .create_tags(identifier, &create)
            .map_err(|source| TagSyncError::RemoteCallFailure {
                operation: TagOperation::Create,
                identifier: identifier.to_string(),
                source,
            })?;
    }

    Ok(ApplyOutcome {
        identifier: identifier.to_string(),
        removed: diff.remove.len(),
        created: create.len(),
    })
}

/// Diff and apply against a single identifier.
///
/// Returns `Ok(None)` without touching the client when `changed` is false.
pub fn reconcile<C>(
    client: &C,
    identifier: &str,
    old: &TagSet,
    new: &TagSet,
    changed: bool,
) -> TagSyncResult<Option<ApplyOutcome>>
where
    C: TagClient + ?Sized,
{
    if !changed {
        debug!(identifier, "Tags unchanged, skipping");
        return Ok(None);
    }
    let diff = diff_tags(old, new);
    apply_diff(client, identifier, &diff).map(Some)
}

/// Reconcile a resource's tags on every identifier it is known under,
/// using the default `sir-` request prefix.
pub fn reconcile_tags<C>(
    client: &C,
    primary: &str,
    secondary_field: Option<&str>,
    old: &TagSet,
    new: &TagSet,
    changed: bool,
) -> TagSyncResult<ReconcileReport>
where
    C: TagClient + ?Sized,
{
    reconcile_with(
        client,
        &IdentityResolver::default(),
        primary,
        secondary_field,
        old,
        new,
        changed,
    )
}

fn reconcile_with<C>(
    client: &C,
    resolver: &IdentityResolver,
    primary: &str,
    secondary_field: Option<&str>,
    old: &TagSet,
    new: &TagSet,
    changed: bool,
) -> TagSyncResult<ReconcileReport>
where
    C: TagClient + ?Sized,
{
    if !changed {
        debug!(primary, "Tags unchanged, skipping reconciliation");
        return Ok(ReconcileReport::skipped(primary));
    }

    let resolved = resolver.resolve(primary, secondary_field);
    let diff = diff_tags(old, new);

    // Derived identifier first; a failure there leaves the primary untouched.
    let mut applied = Vec::new();
    for identifier in resolved.targets() {
        applied.push(apply_diff(client, identifier, &diff)?);
    }

    info!(
        primary,
        targets = applied.len(),
        removed = diff.remove.len(),
        created = diff.create.len(),
        "Reconciled tags"
    );

    Ok(ReconcileReport {
        primary_id: primary.to_string(),
        skipped: false,
        fallback: resolved.is_fallback(),
        applied,
    })
}

/// A tag client bundled with the identity rules for one provider.
pub struct TagReconciler<C> {
    client: C,
    resolver: IdentityResolver,
}

impl<C: TagClient> TagReconciler<C> {
    pub fn new(client: C) -> Self {
        Self::with_resolver(client, IdentityResolver::default())
    }

    pub fn with_resolver(client: C, resolver: IdentityResolver) -> Self {
        Self { client, resolver }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// The single entry point a resource update lifecycle invokes.
    pub fn reconcile_tags(
        &self,
        primary: &str,
        secondary_field: Option<&str>,
        old: &TagSet,
        new: &TagSet,
        changed: bool,
    ) -> TagSyncResult<ReconcileReport> {
        reconcile_with(
            &self.client,
            &self.resolver,
            primary,
            secondary_field,
            old,
            new,
            changed,
        )
    }

    pub fn reconcile_resource(&self, state: &ResourceState) -> TagSyncResult<ReconcileReport> {
        self.reconcile_tags(
            &state.primary_id,
            state.spot_instance_id.as_deref(),
            &state.old_tags,
            &state.new_tags,
            state.tags_changed(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::types::Tag;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Delete(String, Vec<Tag>),
        Create(String, Vec<Tag>),
    }

    #[derive(Default)]
    struct MockClient {
        calls: Mutex<Vec<Call>>,
        fail_delete_on: Option<String>,
        fail_create_on: Option<String>,
    }

    impl MockClient {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TagClient for MockClient {
        fn delete_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
            if self.fail_delete_on.as_deref() == Some(identifier) {
                return Err("delete rejected".into());
            }
            self.calls
                .lock()
                .unwrap()
                .push(Call::Delete(identifier.to_string(), tags.to_vec()));
            Ok(())
        }

        fn create_tags(&self, identifier: &str, tags: &[Tag]) -> Result<(), ClientError> {
            if self.fail_create_on.as_deref() == Some(identifier) {
                return Err("create rejected".into());
            }
            self.calls
                .lock()
                .unwrap()
                .push(Call::Create(identifier.to_string(), tags.to_vec()));
            Ok(())
        }
    }

    fn set(pairs: &[(&str, &str)]) -> TagSet {
        pairs.iter().copied().collect()
    }

    #[test]
    fn apply_deletes_before_creating() {
        let client = MockClient::default();
        let diff = diff_tags(&set(&[("env", "dev")]), &set(&[("env", "prod")]));

        let outcome = apply_diff(&client, "i-456", &diff).unwrap();
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.created, 1);
        assert_eq!(
            client.calls(),
            vec![
                Call::Delete("i-456".into(), vec![Tag::new("env", "dev")]),
                Call::Create("i-456".into(), vec![Tag::new("env", "prod")]),
            ]
        );
    }

    #[test]
    fn apply_skips_empty_sets() {
        let client = MockClient::default();

        let outcome = apply_diff(&client, "i-456", &TagDiff::default()).unwrap();
        assert!(!outcome.delete_issued());
        assert!(!outcome.create_issued());
        assert!(client.calls().is_empty());
    }

    #[test]
    fn apply_failed_delete_prevents_create() {
        let client = MockClient {
            fail_delete_on: Some("i-456".to_string()),
            ..Default::default()
        };
        let diff = diff_tags(&set(&[("env", "dev")]), &set(&[("env", "prod")]));

        let err = apply_diff(&client, "i-456", &diff).unwrap_err();
        assert!(matches!(
            err,
            TagSyncError::RemoteCallFailure {
                operation: TagOperation::Delete,
                ..
            }
        ));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn reconcile_unchanged_never_calls_client() {
        let client = MockClient::default();
        let tags = set(&[("env", "prod")]);

        let outcome = reconcile(&client, "i-456", &tags, &tags, false).unwrap();
        assert!(outcome.is_none());
        assert!(client.calls().is_empty());
    }

    #[test]
    fn reconcile_reasserts_identical_tags_when_changed() {
        let client = MockClient::default();
        let tags = set(&[("env", "prod")]);

        let outcome = reconcile(&client, "i-456", &tags, &tags, true)
            .unwrap()
            .expect("applied");
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.created, 1);
        assert_eq!(
            client.calls(),
            vec![Call::Create("i-456".into(), vec![Tag::new("env", "prod")])]
        );
    }

    #[test]
    fn reconcile_tags_mirrors_onto_derived_identifier_first() {
        let client = MockClient::default();
        let old = set(&[("env", "dev")]);
        let new = set(&[("env", "prod")]);

        let report =
            reconcile_tags(&client, "sir-abc123", Some("i-456"), &old, &new, true).unwrap();
        let order: Vec<_> = report.applied.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(order, vec!["i-456", "sir-abc123"]);
        assert_eq!(report.call_count(), 4);

        let calls = client.calls();
        assert!(matches!(&calls[0], Call::Delete(id, _) if id == "i-456"));
        assert!(matches!(&calls[1], Call::Create(id, _) if id == "i-456"));
        assert!(matches!(&calls[2], Call::Delete(id, _) if id == "sir-abc123"));
        assert!(matches!(&calls[3], Call::Create(id, _) if id == "sir-abc123"));
    }

    #[test]
    fn reconcile_tags_secondary_create_failure_leaves_primary_alone() {
        let client = MockClient {
            fail_create_on: Some("i-456".to_string()),
            ..Default::default()
        };

        let err = reconcile_tags(
            &client,
            "sir-abc123",
            Some("i-456"),
            &set(&[("env", "dev")]),
            &set(&[("env", "prod")]),
            true,
        )
        .unwrap_err();

        assert_eq!(err.identifier(), Some("i-456"));
        assert!(client
            .calls()
            .iter()
            .all(|c| !matches!(c, Call::Delete(id, _) | Call::Create(id, _) if id == "sir-abc123")));
    }

    #[test]
    fn reconcile_tags_skipped_report() {
        let client = MockClient::default();
        let tags = set(&[("env", "prod")]);

        let report = reconcile_tags(&client, "sir-abc123", Some("i-456"), &tags, &tags, false)
            .unwrap();
        assert!(report.skipped);
        assert_eq!(report.call_count(), 0);
        assert!(report.to_string().contains("nothing to do"));
    }

    #[test]
    fn reconciler_uses_configured_prefix() {
        let reconciler =
            TagReconciler::with_resolver(MockClient::default(), IdentityResolver::new("req-"));
        let state = ResourceState {
            primary_id: "req-1".to_string(),
            spot_instance_id: Some("vm-9".to_string()),
            old_tags: TagSet::new(),
            new_tags: set(&[("env", "prod")]),
            changed: None,
        };

        let report = reconciler.reconcile_resource(&state).unwrap();
        let order: Vec<_> = report.applied.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(order, vec!["vm-9", "req-1"]);
        assert_eq!(reconciler.client().calls().len(), 2);
    }
}
