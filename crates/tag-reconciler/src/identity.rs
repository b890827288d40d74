//! Resolution of which remote identifiers receive tag operations.
//!
//! Spot instance requests are tagged under their own request id, but the
//! instance the request spawns lives under a second id stored in the
//! `spot_instance_id` field. Both must carry the same tags.

use serde::Serialize;
use tracing::warn;

/// Prefix of identifiers that denote a request-style resource.
pub const SPOT_REQUEST_ID_PREFIX: &str = "sir-";

/// Resource field holding the identifier derived from a request.
pub const SPOT_INSTANCE_ID_FIELD: &str = "spot_instance_id";

/// The identifiers a resource's tags must be written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedTargets {
    /// An ordinary resource: only its own identifier.
    Simple(String),
    /// A request-style resource. The derived identifier is tagged first when
    /// known; the primary identifier is always tagged.
    DualWithFallback {
        secondary: Option<String>,
        primary: String,
    },
}

impl ResolvedTargets {
    /// Identifiers in the order they must be reconciled.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Self::Simple(primary) => vec![primary.as_str()],
            Self::DualWithFallback { secondary, primary } => secondary
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(primary.as_str()))
                .collect(),
        }
    }

    pub fn primary(&self) -> &str {
        match self {
            Self::Simple(primary) | Self::DualWithFallback { primary, .. } => primary,
        }
    }

    /// True for a request-style resource whose derived identifier is unknown.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::DualWithFallback { secondary: None, .. })
    }
}

/// Decides from a primary identifier whether a derived identifier also
/// needs its tags synchronized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResolver {
    request_prefix: String,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(SPOT_REQUEST_ID_PREFIX)
    }
}

impl IdentityResolver {
    pub fn new(request_prefix: impl Into<String>) -> Self {
        Self {
            request_prefix: request_prefix.into(),
        }
    }

    pub fn request_prefix(&self) -> &str {
        &self.request_prefix
    }

    pub fn is_request_id(&self, primary: &str) -> bool {
        !self.request_prefix.is_empty() && primary.starts_with(&self.request_prefix)
    }

    /// Resolve the targets for `primary`.
    ///
    /// `secondary_field` is only consulted for request-style identifiers; an
    /// empty value is treated as absent.
    pub fn resolve(&self, primary: &str, secondary_field: Option<&str>) -> ResolvedTargets {
        if !self.is_request_id(primary) {
            return ResolvedTargets::Simple(primary.to_string());
        }

        let secondary = secondary_field
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        if secondary.is_none() {
            // Not yet fulfilled, or the field was never populated.
            warn!(
                primary,
                field = SPOT_INSTANCE_ID_FIELD,
                "Request has no derived identifier, tagging request only"
            );
        }

        ResolvedTargets::DualWithFallback {
            secondary,
            primary: primary.to_string(),
        }
    }
}

/// Resolve targets with the default `sir-` request prefix.
pub fn resolve_targets(primary: &str, secondary_field: Option<&str>) -> ResolvedTargets {
    IdentityResolver::default().resolve(primary, secondary_field)
}
