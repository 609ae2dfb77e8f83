//! Tag planner: turns a context + flow into image references and a publish decision.
//!
//! | flow     | tags                                   | opt-in     | publish                      |
//! |----------|----------------------------------------|------------|------------------------------|
//! | feature  | short sha                              | `latest`   | direct push and opted in     |
//! | mr       | short sha, rc version                  |            | always                       |
//! | default  | short sha, rc version, default branch  | `latest`   | always                       |
//! | release  | release tag                            | `latest`   | always                       |
//! | fallback | short sha, rc version, default branch* |            | always                       |
//!
//! `*` only when the run is on the default branch.

use crate::domain::tag::{dedup_preserving_order, sanitize_tag};
use crate::domain::{Flow, RunContext};
use crate::forecast::Forecast;
use serde::{Deserialize, Serialize};

/// Opt-in switches of the tag policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanOptions {
    /// Add `latest` on feature builds
    pub latest_on_feature: bool,
    /// Add `latest` on default-branch builds
    pub latest_on_default: bool,
    /// Add `latest` on release tag builds
    pub tag_latest: bool,
    /// Publish feature builds triggered by a direct push
    pub publish_feature: bool,
}

/// Output of the planner
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Plan {
    /// Fully-qualified `registry/app:tag` references, unique, in first-seen order
    pub refs: Vec<String>,
    pub publish: bool,
}

impl Plan {
    /// The fail-safe plan: nothing to tag, nothing to publish.
    pub fn empty() -> Self {
        Plan {
            refs: Vec::new(),
            publish: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// Accumulates cleaned candidate tags as full references.
struct RefBuilder {
    base: String,
    refs: Vec<String>,
}

impl RefBuilder {
    fn new(base: String) -> Self {
        RefBuilder {
            base,
            refs: Vec::new(),
        }
    }

    fn add(&mut self, candidate: &str) {
        match sanitize_tag(candidate) {
            Some(tag) => self.refs.push(format!("{}:{}", self.base, tag)),
            None => tracing::debug!(candidate, "dropping invalid image tag"),
        }
    }

    fn add_opt(&mut self, candidate: Option<&str>) {
        if let Some(candidate) = candidate {
            self.add(candidate);
        }
    }

    fn finish(self) -> Vec<String> {
        dedup_preserving_order(self.refs)
    }
}

/// Base reference: registry base without trailing `/`, then `/app`.
pub fn base_reference(ctx: &RunContext) -> Option<String> {
    let registry = ctx.registry_base().trim().trim_end_matches('/');
    let app = ctx.application_name().trim();
    if registry.is_empty() || app.is_empty() {
        return None;
    }
    Some(format!("{}/{}", registry, app))
}

/// Whether the artifacts of this flow get published.
pub fn publish_decision(ctx: &RunContext, flow: Flow, options: &PlanOptions) -> bool {
    match flow {
        Flow::Feature => ctx.source().is_direct_push() && options.publish_feature,
        Flow::MergeRequest | Flow::Default | Flow::Release | Flow::Auto => true,
    }
}

/// Plan image references and the publish decision for a run. Never fails.
///
/// Missing registry base or application name yields [`Plan::empty`]; callers
/// are expected to treat that as a configuration error. A forecast without an
/// RC version simply contributes no RC tag.
pub fn plan_build(
    ctx: &RunContext,
    flow: Flow,
    forecast: &Forecast,
    options: &PlanOptions,
) -> Plan {
    let Some(base) = base_reference(ctx) else {
        tracing::warn!(flow = %flow, "no registry base or application name; empty plan");
        return Plan::empty();
    };

    let rc = forecast.next_rc_version.as_deref();
    let mut refs = RefBuilder::new(base);

    match flow {
        Flow::Feature => {
            refs.add(ctx.short_sha());
            if options.latest_on_feature {
                refs.add("latest");
            }
        }
        Flow::MergeRequest => {
            refs.add(ctx.short_sha());
            refs.add_opt(rc);
        }
        Flow::Default => {
            refs.add(ctx.short_sha());
            refs.add_opt(rc);
            refs.add(ctx.default_branch());
            if options.latest_on_default {
                refs.add("latest");
            }
        }
        Flow::Release => {
            refs.add_opt(ctx.tag());
            if options.tag_latest {
                refs.add("latest");
            }
        }
        // Unresolved flow: like default, but the branch tag only on the default branch.
        Flow::Auto => {
            refs.add(ctx.short_sha());
            refs.add_opt(rc);
            if ctx.is_default_branch() && !ctx.default_branch().is_empty() {
                refs.add(ctx.default_branch());
            }
        }
    }

    let plan = Plan {
        refs: refs.finish(),
        publish: publish_decision(ctx, flow, options),
    };
    tracing::info!(
        event = "plan.built",
        flow = %flow,
        refs = plan.refs.len(),
        publish = plan.publish,
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BumpKind, PipelineSource, RunFacts};

    fn ctx(f: impl FnOnce(&mut RunFacts)) -> RunContext {
        let mut facts = RunFacts {
            source: PipelineSource::Push,
            ref_name: "main".to_string(),
            short_sha: "abc12345".to_string(),
            default_branch: "main".to_string(),
            feature_prefix: "feature/".to_string(),
            registry_base: "reg.io/group/".to_string(),
            application_name: "svc".to_string(),
            ..RunFacts::default()
        };
        f(&mut facts);
        RunContext::new(facts)
    }

    fn forecast() -> Forecast {
        Forecast::compute("1.2.3", BumpKind::Patch, "")
    }

    #[test]
    fn test_base_reference_strips_trailing_slash() {
        assert_eq!(
            base_reference(&ctx(|_| {})).as_deref(),
            Some("reg.io/group/svc")
        );
    }

    #[test]
    fn test_missing_registry_is_empty_plan() {
        let c = ctx(|f| {
            f.registry_base = String::new();
            f.application_name = String::new();
        });
        let plan = plan_build(&c, Flow::Default, &forecast(), &PlanOptions::default());
        assert_eq!(plan, Plan::empty());
        assert!(!plan.publish);
    }

    #[test]
    fn test_merge_request_flow() {
        let c = ctx(|f| f.merge_request_id = "4".to_string());
        let plan = plan_build(&c, Flow::MergeRequest, &forecast(), &PlanOptions::default());
        assert_eq!(
            plan.refs,
            vec!["reg.io/group/svc:abc12345", "reg.io/group/svc:1.2.4-rc.1"]
        );
        assert!(plan.publish);
    }

    #[test]
    fn test_default_flow_with_latest() {
        let options = PlanOptions {
            latest_on_default: true,
            ..PlanOptions::default()
        };
        let plan = plan_build(&ctx(|_| {}), Flow::Default, &forecast(), &options);
        assert_eq!(
            plan.refs,
            vec![
                "reg.io/group/svc:abc12345",
                "reg.io/group/svc:1.2.4-rc.1",
                "reg.io/group/svc:main",
                "reg.io/group/svc:latest",
            ]
        );
    }

    #[test]
    fn test_malformed_forecast_omits_rc() {
        let broken = Forecast::compute("garbage", BumpKind::Patch, "");
        let plan = plan_build(&ctx(|_| {}), Flow::Default, &broken, &PlanOptions::default());
        assert_eq!(
            plan.refs,
            vec!["reg.io/group/svc:abc12345", "reg.io/group/svc:main"]
        );
        assert!(plan.publish);
    }

    #[test]
    fn test_feature_publish_gate() {
        let feature = ctx(|f| f.ref_name = "feature/a".to_string());
        let off = PlanOptions::default();
        let on = PlanOptions {
            publish_feature: true,
            ..PlanOptions::default()
        };
        assert!(!plan_build(&feature, Flow::Feature, &forecast(), &off).publish);
        assert!(plan_build(&feature, Flow::Feature, &forecast(), &on).publish);

        let web = ctx(|f| {
            f.ref_name = "feature/a".to_string();
            f.source = PipelineSource::Web;
        });
        assert!(!plan_build(&web, Flow::Feature, &forecast(), &on).publish);
    }

    #[test]
    fn test_feature_latest_opt_in() {
        let feature = ctx(|f| f.ref_name = "feature/a".to_string());
        let options = PlanOptions {
            latest_on_feature: true,
            ..PlanOptions::default()
        };
        let plan = plan_build(&feature, Flow::Feature, &forecast(), &options);
        assert_eq!(
            plan.refs,
            vec!["reg.io/group/svc:abc12345", "reg.io/group/svc:latest"]
        );
    }

    #[test]
    fn test_release_flow_without_tag_is_empty() {
        let plan = plan_build(&ctx(|_| {}), Flow::Release, &forecast(), &PlanOptions::default());
        assert!(plan.is_empty());
        assert!(plan.publish);
    }

    #[test]
    fn test_fallback_branch_tag_only_on_default_branch() {
        let on_default = plan_build(&ctx(|_| {}), Flow::Auto, &forecast(), &PlanOptions::default());
        assert_eq!(on_default.refs.len(), 3);
        assert_eq!(on_default.refs[2], "reg.io/group/svc:main");

        let elsewhere = ctx(|f| f.ref_name = "hotfix/x".to_string());
        let plan = plan_build(&elsewhere, Flow::Auto, &forecast(), &PlanOptions::default());
        assert_eq!(
            plan.refs,
            vec!["reg.io/group/svc:abc12345", "reg.io/group/svc:1.2.4-rc.1"]
        );
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        // default branch named like the short sha
        let c = ctx(|f| {
            f.ref_name = "abc12345".to_string();
            f.default_branch = "abc12345".to_string();
        });
        let plan = plan_build(&c, Flow::Default, &forecast(), &PlanOptions::default());
        assert_eq!(
            plan.refs,
            vec!["reg.io/group/svc:abc12345", "reg.io/group/svc:1.2.4-rc.1"]
        );
    }

    #[test]
    fn test_candidates_are_cleaned() {
        let c = ctx(|f| {
            f.ref_name = "Release/Q3".to_string();
            f.default_branch = "Release/Q3".to_string();
        });
        let plan = plan_build(&c, Flow::Default, &forecast(), &PlanOptions::default());
        assert!(plan.refs.contains(&"reg.io/group/svc:release-q3".to_string()));
    }
}
