//! Immutable per-run fact sheet.
//!
//! [`RunFacts`] holds the raw values a collaborator gathered (usually from CI
//! environment variables, see [`crate::env`]). [`RunContext::new`] derives the
//! booleans once; nothing downstream can recompute or mutate them.

use crate::error::{ReleasePlanError, Result};
use serde::Serialize;
use std::fmt;

const SHORT_SHA_LEN: usize = 8;

/// What triggered the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub enum PipelineSource {
    Push,
    MergeRequestEvent,
    Web,
    Schedule,
    Api,
    Trigger,
    #[default]
    Unknown,
    Other(String),
}

impl PipelineSource {
    /// Map the CI provider's source string onto the enum (case-insensitive).
    pub fn from_ci(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => PipelineSource::Unknown,
            "push" => PipelineSource::Push,
            "merge_request_event" => PipelineSource::MergeRequestEvent,
            "web" => PipelineSource::Web,
            "schedule" => PipelineSource::Schedule,
            "api" => PipelineSource::Api,
            "trigger" => PipelineSource::Trigger,
            _ => PipelineSource::Other(trimmed.to_string()),
        }
    }

    pub fn is_direct_push(&self) -> bool {
        matches!(self, PipelineSource::Push)
    }
}

impl fmt::Display for PipelineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineSource::Push => write!(f, "push"),
            PipelineSource::MergeRequestEvent => write!(f, "merge_request_event"),
            PipelineSource::Web => write!(f, "web"),
            PipelineSource::Schedule => write!(f, "schedule"),
            PipelineSource::Api => write!(f, "api"),
            PipelineSource::Trigger => write!(f, "trigger"),
            PipelineSource::Unknown => write!(f, "unknown"),
            PipelineSource::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Raw facts about a pipeline run, as supplied by a collaborator.
///
/// Empty strings mean "not provided".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFacts {
    pub source: PipelineSource,
    pub ref_name: String,
    /// Most specific branch name available (MR source branch, then commit branch, then ref)
    pub effective_ref: String,
    pub sha: String,
    pub short_sha: String,
    pub merge_request_id: String,
    pub merge_request_target_branch: String,
    pub tag: String,
    pub default_branch: String,
    pub feature_prefix: String,
    pub registry_base: String,
    /// Explicit application name; falls back to the registry base's last segment
    pub application_name: String,
    pub project_path: String,
    pub project_id: String,
    pub project_url: String,
    pub pipeline_id: String,
    pub pipeline_url: String,
    pub job_id: String,
}

/// The read-only context threaded through classifier, resolver and planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunContext {
    source: PipelineSource,
    ref_name: String,
    effective_ref: String,
    sha: String,
    short_sha: String,
    merge_request_id: Option<String>,
    merge_request_target_branch: Option<String>,
    tag: Option<String>,
    default_branch: String,
    feature_prefix: String,
    registry_base: String,
    application_name: String,
    project_path: String,
    project_id: String,
    project_url: String,
    pipeline_id: String,
    pipeline_url: String,
    job_id: String,

    is_tag: bool,
    is_merge_request: bool,
    is_default_branch: bool,
    is_feature_branch: bool,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// First non-empty value, trimmed
pub fn first_non_empty<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Resolve the application name: explicit override, else the last path
/// segment of the registry base (trailing slashes ignored).
pub fn resolve_application_name(explicit: &str, registry_base: &str) -> String {
    if let Some(name) = non_empty(explicit) {
        return name;
    }
    registry_base
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Supplied short SHA, else the first 8 characters of the full SHA.
pub fn derive_short_sha(short_sha: &str, sha: &str) -> String {
    if let Some(short) = non_empty(short_sha) {
        return short;
    }
    sha.trim().chars().take(SHORT_SHA_LEN).collect()
}

impl RunContext {
    /// Build the context and derive its booleans exactly once.
    pub fn new(facts: RunFacts) -> Self {
        let tag = non_empty(&facts.tag);
        let merge_request_id = non_empty(&facts.merge_request_id);
        let ref_name = facts.ref_name.trim().to_string();
        let effective_ref = first_non_empty([facts.effective_ref.as_str(), ref_name.as_str()]);
        let default_branch = facts.default_branch.trim().to_string();
        let feature_prefix = facts.feature_prefix.trim().to_string();

        let is_tag = tag.is_some();
        let is_merge_request = merge_request_id.is_some()
            || facts.source == PipelineSource::MergeRequestEvent;
        let is_default_branch = !ref_name.is_empty() && ref_name == default_branch;
        // Tag builds take precedence over feature detection.
        let is_feature_branch = !is_tag
            && !feature_prefix.is_empty()
            && !effective_ref.is_empty()
            && effective_ref != default_branch
            && effective_ref.starts_with(&feature_prefix);

        RunContext {
            short_sha: derive_short_sha(&facts.short_sha, &facts.sha),
            application_name: resolve_application_name(
                &facts.application_name,
                &facts.registry_base,
            ),
            source: facts.source,
            ref_name,
            effective_ref,
            sha: facts.sha.trim().to_string(),
            merge_request_id,
            merge_request_target_branch: non_empty(&facts.merge_request_target_branch),
            tag,
            default_branch,
            feature_prefix,
            registry_base: facts.registry_base.trim().to_string(),
            project_path: facts.project_path,
            project_id: facts.project_id,
            project_url: facts.project_url,
            pipeline_id: facts.pipeline_id,
            pipeline_url: facts.pipeline_url,
            job_id: facts.job_id,
            is_tag,
            is_merge_request,
            is_default_branch,
            is_feature_branch,
        }
    }

    /// Check the inputs the planner cannot work without.
    pub fn validate_for_planning(&self) -> Result<()> {
        if self.registry_base.is_empty() {
            return Err(ReleasePlanError::config(
                "registry base is empty (set CI_REGISTRY_IMAGE)",
            ));
        }
        if self.application_name.is_empty() {
            return Err(ReleasePlanError::config(
                "application name is empty (set [image] application_name or use a registry base with a path)",
            ));
        }
        Ok(())
    }

    pub fn source(&self) -> &PipelineSource {
        &self.source
    }

    pub fn ref_name(&self) -> &str {
        &self.ref_name
    }

    pub fn effective_ref(&self) -> &str {
        &self.effective_ref
    }

    pub fn sha(&self) -> &str {
        &self.sha
    }

    pub fn short_sha(&self) -> &str {
        &self.short_sha
    }

    pub fn merge_request_id(&self) -> Option<&str> {
        self.merge_request_id.as_deref()
    }

    pub fn merge_request_target_branch(&self) -> Option<&str> {
        self.merge_request_target_branch.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn feature_prefix(&self) -> &str {
        &self.feature_prefix
    }

    pub fn registry_base(&self) -> &str {
        &self.registry_base
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn project_url(&self) -> &str {
        &self.project_url
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn pipeline_url(&self) -> &str {
        &self.pipeline_url
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn is_tag(&self) -> bool {
        self.is_tag
    }

    pub fn is_merge_request(&self) -> bool {
        self.is_merge_request
    }

    pub fn is_default_branch(&self) -> bool {
        self.is_default_branch
    }

    pub fn is_feature_branch(&self) -> bool {
        self.is_feature_branch
    }
}
