//! Bump source resolution.
//!
//! Which bump kind governs this run is decided by an ordered rule list,
//! first match wins:
//!
//! 1. operator override (no lookup is performed at all)
//! 2. selection discovered on the merge request (MR runs with a known id only)
//! 3. default `Patch`

use crate::domain::{BumpKind, RunContext};
use crate::sources::ManualBumpSource;
use serde::Serialize;
use std::fmt;

/// Bump kind used when nothing else decides
pub const DEFAULT_BUMP: BumpKind = BumpKind::Patch;

/// Where the winning bump kind came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BumpSource {
    Override,
    Discovered,
    Default,
}

impl fmt::Display for BumpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpSource::Override => write!(f, "override"),
            BumpSource::Discovered => write!(f, "merge request selection"),
            BumpSource::Default => write!(f, "default"),
        }
    }
}

/// The decision plus its provenance; the provenance is informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BumpResolution {
    pub kind: BumpKind,
    pub source: BumpSource,
}

/// Inputs every bump rule may look at
pub struct BumpInputs<'a> {
    pub override_kind: Option<BumpKind>,
    pub context: &'a RunContext,
    pub manual: Option<&'a dyn ManualBumpSource>,
}

/// One precedence rule
pub struct BumpRule {
    pub name: &'static str,
    pub decide: fn(&BumpInputs<'_>) -> Option<BumpResolution>,
}

fn from_override(inputs: &BumpInputs<'_>) -> Option<BumpResolution> {
    inputs.override_kind.map(|kind| BumpResolution {
        kind,
        source: BumpSource::Override,
    })
}

fn from_merge_request(inputs: &BumpInputs<'_>) -> Option<BumpResolution> {
    if !inputs.context.is_merge_request() {
        return None;
    }
    let mr_id = inputs.context.merge_request_id()?;
    let manual = inputs.manual?;
    let lookup = manual.bump_for(mr_id);
    if lookup.is_unavailable() {
        tracing::debug!(event = "bump.lookup_unavailable", merge_request = mr_id);
    }
    lookup.found().map(|kind| BumpResolution {
        kind,
        source: BumpSource::Discovered,
    })
}

fn from_default(_inputs: &BumpInputs<'_>) -> Option<BumpResolution> {
    Some(BumpResolution {
        kind: DEFAULT_BUMP,
        source: BumpSource::Default,
    })
}

/// Bump precedence, evaluated top-down
pub const BUMP_RULES: &[BumpRule] = &[
    BumpRule {
        name: "override",
        decide: from_override,
    },
    BumpRule {
        name: "merge-request",
        decide: from_merge_request,
    },
    BumpRule {
        name: "default",
        decide: from_default,
    },
];

/// Decide the bump kind for this run.
pub fn resolve_bump(
    override_kind: Option<BumpKind>,
    context: &RunContext,
    manual: Option<&dyn ManualBumpSource>,
) -> BumpResolution {
    let inputs = BumpInputs {
        override_kind,
        context,
        manual,
    };
    let resolution = BUMP_RULES
        .iter()
        .find_map(|rule| (rule.decide)(&inputs))
        .unwrap_or(BumpResolution {
            kind: DEFAULT_BUMP,
            source: BumpSource::Default,
        });

    tracing::info!(
        event = "bump.resolved",
        kind = %resolution.kind,
        source = %resolution.source,
    );
    resolution
}
