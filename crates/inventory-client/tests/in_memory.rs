use inventory_client::InMemoryInventory;
use tag_reconciler::{reconcile_tags, TagOperation, TagSet, TagSyncError};

fn tags(pairs: &[(&str, &str)]) -> TagSet {
    pairs.iter().copied().collect()
}

#[test]
fn reconcile_converges_both_identifiers() {
    let old = tags(&[("env", "dev"), ("owner", "a")]);
    let new = tags(&[("env", "prod"), ("team", "x")]);
    let inventory = InMemoryInventory::new()
        .with_resource("sir-abc123", old.clone())
        .with_resource("i-456", old.clone());

    reconcile_tags(&inventory, "sir-abc123", Some("i-456"), &old, &new, true).expect("reconcile");

    assert_eq!(inventory.tags_for("sir-abc123"), new);
    assert_eq!(inventory.tags_for("i-456"), new);
}

#[test]
fn secondary_failure_leaves_primary_untouched() {
    let old = tags(&[("env", "dev")]);
    let new = tags(&[("env", "prod")]);
    let inventory = InMemoryInventory::new()
        .with_resource("sir-abc123", old.clone())
        .with_resource("i-456", old.clone());
    inventory.fail_on(TagOperation::Delete, "i-456");

    let err = reconcile_tags(&inventory, "sir-abc123", Some("i-456"), &old, &new, true)
        .expect_err("should fail");

    assert!(matches!(err, TagSyncError::RemoteCallFailure { .. }));
    assert_eq!(inventory.tags_for("sir-abc123"), old);
    assert!(inventory.calls().is_empty());
}

#[test]
fn reconcile_with_identical_sets_reasserts_tags() {
    let same = tags(&[("env", "prod")]);
    let inventory = InMemoryInventory::new().with_resource("i-456", same.clone());

    reconcile_tags(&inventory, "i-456", None, &same, &same, true).expect("reconcile");

    let calls = inventory.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].operation, TagOperation::Create);
    assert_eq!(inventory.tags_for("i-456"), same);
}
