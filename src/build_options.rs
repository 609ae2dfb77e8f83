//! Hand-off to the external build/publish executor.
//!
//! [`BuildOptions`] is everything the executor needs to build, tag and
//! optionally push an image. It is serialised to JSON; this crate never runs
//! the container builder itself.

use crate::config::Config;
use crate::domain::RunContext;
use crate::error::{ReleasePlanError, Result};
use crate::forecast::Forecast;
use crate::planner::Plan;
use serde::Serialize;

/// A `KEY=value` pair kept in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    fn new(key: &str, value: &str) -> Self {
        KeyValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildOptions {
    pub dockerfile: String,
    pub context_path: String,
    pub build_args: Vec<KeyValue>,
    pub labels: Vec<KeyValue>,
    /// Fully-qualified references from the plan
    pub refs: Vec<String>,
    pub pull: bool,
    pub no_cache: bool,
    pub push: bool,
    pub dry_run: bool,
}

impl BuildOptions {
    /// Assemble executor options; an empty plan is a configuration error.
    pub fn from_plan(
        ctx: &RunContext,
        plan: &Plan,
        forecast: &Forecast,
        config: &Config,
    ) -> Result<Self> {
        if plan.is_empty() {
            return Err(ReleasePlanError::config(
                "no image refs produced by planner",
            ));
        }

        let branch = if ctx.effective_ref().is_empty() {
            ctx.ref_name()
        } else {
            ctx.effective_ref()
        };
        let build_args = vec![
            KeyValue::new("GIT_SHA", ctx.sha()),
            KeyValue::new("GIT_SHORT_SHA", ctx.short_sha()),
            KeyValue::new("CI_PROJECT_PATH", ctx.project_path()),
            KeyValue::new("CI_REF_NAME", branch),
            KeyValue::new("APP_NAME", ctx.application_name()),
        ];

        let version = ctx
            .tag()
            .or(forecast.next_version.as_deref())
            .unwrap_or_default();
        let labels = [
            ("org.opencontainers.image.revision", ctx.sha()),
            ("org.opencontainers.image.version", version),
            ("org.opencontainers.image.source", ctx.project_url()),
            ("org.opencontainers.image.ref.name", ctx.ref_name()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| KeyValue::new(key, value))
        .collect();

        Ok(BuildOptions {
            dockerfile: non_blank_or(&config.image.dockerfile, "Dockerfile"),
            context_path: non_blank_or(&config.image.context, "."),
            build_args,
            labels,
            refs: plan.refs.clone(),
            pull: config.image.pull,
            no_cache: config.image.no_cache,
            push: plan.publish,
            dry_run: config.dry_run,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.trim().to_string()
    }
}
