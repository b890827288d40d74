//! `tagsync diff`: show the tag mutation between two tag maps.

use super::read_json;
use crate::output::{self, OutputFormat};
use anyhow::{anyhow, Result};
use std::path::Path;
use tag_reconciler::{diff_tags, TagDiff, TagSet};

/// Print the diff between the tag maps stored in `old` and `new`.
pub fn diff(old: &Path, new: &Path, format: &OutputFormat) -> Result<()> {
    let diff = load_diff(old, new)?;

    match format {
        OutputFormat::Text if diff.is_empty() => println!("No tags on either side"),
        _ => output::print(&diff, format),
    }
    Ok(())
}

fn load_diff(old: &Path, new: &Path) -> Result<TagDiff> {
    let old = read_tag_file(old)?;
    let new = read_tag_file(new)?;
    Ok(diff_tags(&old, &new))
}

/// Read a file holding a JSON object of string tag values.
fn read_tag_file(path: &Path) -> Result<TagSet> {
    let value: serde_json::Value = read_json(path)?;
    let map = value
        .as_object()
        .ok_or_else(|| anyhow!("{} must contain a JSON object", path.display()))?;
    Ok(TagSet::from_json_map(map)?)
}
