use crate::domain::RunContext;
use crate::error::{ReleasePlanError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Release flow of a pipeline run.
///
/// `Auto` is only meaningful as a classifier input; [`resolve_flow`] never returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Flow {
    #[default]
    Auto,
    Feature,
    MergeRequest,
    Default,
    Release,
}

impl FromStr for Flow {
    type Err = ReleasePlanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Flow::Auto),
            "feature" => Ok(Flow::Feature),
            "mr" | "merge-request" | "merge_request" => Ok(Flow::MergeRequest),
            "default" => Ok(Flow::Default),
            "release" => Ok(Flow::Release),
            _ => Err(ReleasePlanError::config(format!(
                "invalid flow '{}': must be one of auto, feature, mr, default, release",
                s
            ))),
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Auto => write!(f, "auto"),
            Flow::Feature => write!(f, "feature"),
            Flow::MergeRequest => write!(f, "mr"),
            Flow::Default => write!(f, "default"),
            Flow::Release => write!(f, "release"),
        }
    }
}

/// One classification rule: if `applies` holds for the context, the run is `flow`.
pub struct FlowRule {
    pub name: &'static str,
    pub applies: fn(&RunContext) -> bool,
    pub flow: Flow,
}

/// Classification rules, evaluated top-down, first match wins.
///
/// A tag build must win over everything else, so it stays first.
pub const FLOW_RULES: &[FlowRule] = &[
    FlowRule {
        name: "tag-build",
        applies: RunContext::is_tag,
        flow: Flow::Release,
    },
    FlowRule {
        name: "merge-request",
        applies: RunContext::is_merge_request,
        flow: Flow::MergeRequest,
    },
    FlowRule {
        name: "default-branch",
        applies: RunContext::is_default_branch,
        flow: Flow::Default,
    },
    FlowRule {
        name: "feature-branch",
        applies: RunContext::is_feature_branch,
        flow: Flow::Feature,
    },
];

/// Flow used when no rule matches.
pub const FALLBACK_FLOW: Flow = Flow::Default;

/// Name of the rule that classifies `ctx`, or `"fallback"`.
pub fn matching_rule(ctx: &RunContext) -> &'static str {
    FLOW_RULES
        .iter()
        .find(|rule| (rule.applies)(ctx))
        .map(|rule| rule.name)
        .unwrap_or("fallback")
}

/// Resolve the flow for a run. A forced (non-`Auto`) flow is returned unchanged.
pub fn resolve_flow(ctx: &RunContext, forced: Flow) -> Flow {
    if forced != Flow::Auto {
        tracing::debug!(event = "flow.forced", flow = %forced);
        return forced;
    }
    let flow = FLOW_RULES
        .iter()
        .find(|rule| (rule.applies)(ctx))
        .map(|rule| rule.flow)
        .unwrap_or(FALLBACK_FLOW);
    tracing::debug!(event = "flow.classified", flow = %flow, rule = matching_rule(ctx));
    flow
}
