use crate::error::{TagSyncError, TagSyncResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A single key/value label attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// The complete set of tags on a resource at one point in time.
///
/// Backed by a `BTreeMap`, so iteration (and every list derived from it)
/// is ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.get(&tag.key) == Some(tag.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build a set from a tag list. A repeated key keeps its last value.
    pub fn from_tags<I>(tags: I) -> Self
    where
        I: IntoIterator<Item = Tag>,
    {
        tags.into_iter().map(|t| (t.key, t.value)).collect()
    }

    /// Expand the set into discrete tag entries, ordered by key.
    pub fn to_tags(&self) -> Vec<Tag> {
        self.0.iter().map(|(k, v)| Tag::new(k, v)).collect()
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Build a set from a loosely typed map, as handed over by a config
    /// layer. Every value must be a JSON string.
    pub fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> TagSyncResult<Self> {
        let mut set = Self::new();
        for (key, value) in map {
            let value = value
                .as_str()
                .ok_or_else(|| TagSyncError::InvalidTagValue { key: key.clone() })?;
            set.insert(key.clone(), value);
        }
        Ok(set)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<HashMap<String, String>> for TagSet {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for TagSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// The mutation needed to move a resource from one tag set to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDiff {
    /// Every tag of the new set. Unchanged tags are re-asserted.
    pub create: TagSet,
    /// Old tags whose key is gone or whose value changed, ordered by key.
    pub remove: Vec<Tag>,
}

impl TagDiff {
    /// True when applying the diff would issue no remote call.
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.remove.is_empty()
    }
}

impl fmt::Display for TagDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in &self.remove {
            writeln!(f, "- {}", tag)?;
        }
        for (key, value) in self.create.iter() {
            writeln!(f, "+ {}={}", key, value)?;
        }
        Ok(())
    }
}

/// The slice of a resource's state that tag reconciliation reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceState {
    /// The resource's own identifier.
    pub primary_id: String,
    /// Derived instance identifier, only set for request-style resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_instance_id: Option<String>,
    /// Absent or `null` means no tags.
    #[serde(default, deserialize_with = "nullable_tag_set")]
    pub old_tags: TagSet,
    #[serde(default, deserialize_with = "nullable_tag_set")]
    pub new_tags: TagSet,
    /// Explicit change signal from the state layer. Derived from the two
    /// tag sets when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
}

fn nullable_tag_set<'de, D>(deserializer: D) -> Result<TagSet, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<TagSet>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResourceState {
    pub fn tags_changed(&self) -> bool {
        self.changed
            .unwrap_or_else(|| self.old_tags != self.new_tags)
    }
}
