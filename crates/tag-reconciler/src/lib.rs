//! # Tag Reconciler
//!
//! Converges the tags attached to a cloud resource in a remote inventory
//! with the tags declared for it.
//!
//! ## Overview
//!
//! The crate computes a diff between the old (remote) and new (declared)
//! tag sets and applies it through an injected [`TagClient`]. Resources
//! whose identifier carries the spot request prefix (`sir-`) are also known
//! under a derived instance identifier; their tags are mirrored onto that
//! identifier first, then onto the request itself.
//!
//! ## Key Operations
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`diff_tags`] | Compute the create-set and remove-set for two tag sets |
//! | [`apply_diff`] | Issue delete-tags then create-tags against one identifier |
//! | [`reconcile`] | Diff and apply against one identifier, gated on a change flag |
//! | [`reconcile_tags`] | Resolve identifiers and reconcile each in order |
//! | [`resolve_targets`] | Decide which identifiers a resource's tags go to |
//!
//! ## Example Usage
//!
//! ```ignore
//! use tag_reconciler::{reconcile_tags, TagSet};
//!
//! let old: TagSet = [("env", "dev")].into_iter().collect();
//! let new: TagSet = [("env", "prod")].into_iter().collect();
//!
//! // Tags "i-456" first, then "sir-abc123".
//! let report = reconcile_tags(&client, "sir-abc123", Some("i-456"), &old, &new, true)?;
//! ```

mod client;
mod diff;
mod error;
mod identity;
mod reconciler;
mod types;

pub use client::{ClientError, TagClient, TagOperation};
pub use diff::diff_tags;
pub use error::{TagSyncError, TagSyncResult};
pub use identity::{
    resolve_targets, IdentityResolver, ResolvedTargets, SPOT_INSTANCE_ID_FIELD,
    SPOT_REQUEST_ID_PREFIX,
};
pub use reconciler::{
    apply_diff, reconcile, reconcile_tags, ApplyOutcome, ReconcileReport, TagReconciler,
};
pub use types::{ResourceState, Tag, TagDiff, TagSet};
