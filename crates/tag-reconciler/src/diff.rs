//! Tag set diffing.

use crate::types::{Tag, TagDiff, TagSet};

/// Compute the tags to create and the tags to remove to go from `old` to `new`.
///
/// Everything in `new` is created, including tags that already exist
/// remotely. A tag from `old` is removed when its key is gone from `new` or
/// carries a different value there, so a changed key shows up on both sides.
pub fn diff_tags(old: &TagSet, new: &TagSet) -> TagDiff {
    let remove = old
        .iter()
        .filter(|(key, value)| new.get(key) != Some(*value))
        .map(|(key, value)| Tag::new(key, value))
        .collect();

    TagDiff {
        create: new.clone(),
        remove,
    }
}
