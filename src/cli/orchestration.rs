//! Main release-plan workflow orchestration
//!
//! Keeps the business sequence out of `main.rs` so it can be driven
//! programmatically (and in tests) without clap or the process environment.

use crate::boundary::BoundaryWarning;
use crate::build_options::BuildOptions;
use crate::bump::{resolve_bump, BumpResolution};
use crate::config::{Config, RcIdentifier};
use crate::domain::flow::matching_rule;
use crate::domain::{resolve_flow, Flow, RunContext, RunFacts};
use crate::error::Result;
use crate::forecast::{Forecast, DEFAULT_RC_IDENTIFIER};
use crate::planner::{plan_build, Plan};
use crate::sources::{Lookup, ManualBumpSource, TagHistorySource};
use serde::Serialize;

/// External collaborators consulted during a run
pub struct ReleaseSources<'a> {
    /// Tag history of the project
    pub tag_history: &'a dyn TagHistorySource,

    /// Manual bump selection on the current merge request, if any source exists
    pub manual_bump: Option<&'a dyn ManualBumpSource>,

    /// Latest tag supplied verbatim by the operator; bypasses the tag history
    pub latest_tag: Option<String>,
}

/// Everything a run decided
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseOutcome {
    pub context: RunContext,
    pub flow: Flow,
    /// Rule that classified the run (`"forced"` when the operator chose the flow)
    pub flow_rule: String,
    pub bump: BumpResolution,
    pub forecast: Forecast,
    pub plan: Plan,
    pub build_options: BuildOptions,
    #[serde(skip)]
    pub warnings: Vec<BoundaryWarning>,
}

/// Run the release-plan workflow.
///
/// 1. Validate configuration and build the run context
/// 2. Resolve the bump kind
/// 3. Look up the latest tag and forecast next versions
/// 4. Classify the flow and plan image references
/// 5. Assemble build options for the executor
///
/// # Errors
///
/// Configuration errors (invalid bump/flow text, missing registry base or
/// application name, empty plan) abort the run. Lookup problems never do;
/// they are reported as [`BoundaryWarning`]s.
pub fn run_release_plan(
    facts: RunFacts,
    config: &Config,
    sources: &ReleaseSources<'_>,
) -> Result<ReleaseOutcome> {
    config.validate()?;
    let context = RunContext::new(facts);
    context.validate_for_planning()?;

    let mut warnings = Vec::new();

    let bump = resolve_bump(config.bump_override()?, &context, sources.manual_bump);

    let latest_tag = match &sources.latest_tag {
        Some(tag) => tag.trim().to_string(),
        None => match sources.tag_history.latest_semantic_tag() {
            Lookup::Found(tag) => tag,
            Lookup::NotFound => String::new(),
            Lookup::Unavailable(reason) => {
                warnings.push(BoundaryWarning::LatestTagUnavailable { reason });
                String::new()
            }
        },
    };

    let rc_identifier = match config.tags.rc_identifier {
        RcIdentifier::Rc => DEFAULT_RC_IDENTIFIER,
        RcIdentifier::ShortSha => context.short_sha(),
    };
    let forecast = Forecast::compute(&latest_tag, bump.kind, rc_identifier);
    if let Some(reason) = &forecast.error {
        warnings.push(BoundaryWarning::UnparsableLatestTag {
            tag: latest_tag.clone(),
            reason: reason.clone(),
        });
    }

    let forced = config.forced_flow()?;
    let flow = resolve_flow(&context, forced);
    let flow_rule = if forced == Flow::Auto {
        matching_rule(&context).to_string()
    } else {
        let detected = resolve_flow(&context, Flow::Auto);
        if detected != forced {
            warnings.push(BoundaryWarning::FlowForced {
                forced: forced.to_string(),
                detected: detected.to_string(),
            });
        }
        "forced".to_string()
    };
    tracing::info!(event = "flow.resolved", flow = %flow, rule = %flow_rule);

    let options = config.plan_options();
    let plan = plan_build(&context, flow, &forecast, &options);
    if flow == Flow::Feature && !plan.publish {
        let reason = if !context.source().is_direct_push() {
            format!("pipeline source is '{}', not a direct push", context.source())
        } else {
            "feature publishing is not enabled ([publish] feature)".to_string()
        };
        warnings.push(BoundaryWarning::FeatureNotPublished { reason });
    }

    let build_options = BuildOptions::from_plan(&context, &plan, &forecast, config)?;

    Ok(ReleaseOutcome {
        context,
        flow,
        flow_rule,
        bump,
        forecast,
        plan,
        build_options,
        warnings,
    })
}
