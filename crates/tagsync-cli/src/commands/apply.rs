//! `tagsync apply`: reconcile one resource's tags.

use super::read_json;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use inventory_client::{HttpInventoryClient, InMemoryInventory, InventoryCall};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tag_reconciler::{IdentityResolver, ReconcileReport, ResourceState, TagReconciler};
use tagsync_config_and_utils::Config;
use tracing::info;

/// What `apply` reports back to the user.
#[derive(Debug, Serialize)]
struct ApplySummary {
    dry_run: bool,
    report: ReconcileReport,
    /// Calls the in-memory inventory received; only filled on dry runs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    planned_calls: Vec<InventoryCall>,
}

impl fmt::Display for ApplySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            writeln!(f, "Dry run, no remote changes made")?;
        }
        write!(f, "{}", self.report)?;
        if !self.planned_calls.is_empty() {
            write!(f, "\nPlanned calls:")?;
            for call in &self.planned_calls {
                let tags = call
                    .tags
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "\n  {} {}: {}", call.operation, call.identifier, tags)?;
            }
        }
        Ok(())
    }
}

/// Reconcile the resource described in `request_path`.
pub fn apply(
    config: &Config,
    request_path: &Path,
    dry_run: bool,
    format: &OutputFormat,
) -> Result<()> {
    let state: ResourceState = read_json(request_path)?;
    let summary = run_apply(config, &state, dry_run)?;
    output::print(&summary, format);
    Ok(())
}

fn run_apply(config: &Config, state: &ResourceState, dry_run: bool) -> Result<ApplySummary> {
    let resolver = IdentityResolver::new(config.request_prefix.as_str());

    if dry_run {
        let inventory = seeded_inventory(state);
        let reconciler = TagReconciler::with_resolver(inventory, resolver);
        let report = reconciler.reconcile_resource(state)?;
        return Ok(ApplySummary {
            dry_run: true,
            report,
            planned_calls: reconciler.client().calls(),
        });
    }

    config.validate().context("invalid configuration")?;
    let client = HttpInventoryClient::new(
        &config.inventory_url,
        config.api_token.clone(),
        config.request_timeout(),
    )
    .context("failed to create inventory client")?;
    let reconciler = TagReconciler::with_resolver(client, resolver);
    let report = reconciler
        .reconcile_resource(state)
        .with_context(|| format!("failed to reconcile tags for {}", state.primary_id))?;

    info!(primary = %state.primary_id, calls = report.call_count(), "Tags applied");

    Ok(ApplySummary {
        dry_run: false,
        report,
        planned_calls: Vec::new(),
    })
}

/// An in-memory inventory where every identifier of the resource carries
/// the old tags.
fn seeded_inventory(state: &ResourceState) -> InMemoryInventory {
    let mut inventory =
        InMemoryInventory::new().with_resource(state.primary_id.as_str(), state.old_tags.clone());
    if let Some(secondary) = state.spot_instance_id.as_deref().filter(|id| !id.is_empty()) {
        inventory = inventory.with_resource(secondary, state.old_tags.clone());
    }
    inventory
}
