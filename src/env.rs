//! GitLab CI environment reader.
//!
//! Turns CI variables into [`RunFacts`]. The lookup is injected so tests can
//! feed a plain map instead of mutating the process environment.

use crate::config::Config;
use crate::domain::context::first_non_empty;
use crate::domain::{PipelineSource, RunFacts};

/// Variable holding the merge-request description on MR pipelines
pub const MERGE_REQUEST_DESCRIPTION_VAR: &str = "CI_MERGE_REQUEST_DESCRIPTION";

impl RunFacts {
    /// Read run facts through `lookup`, applying config-supplied prefix and app name.
    pub fn from_lookup<F>(lookup: F, config: &Config) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let mr_source_branch = var("CI_MERGE_REQUEST_SOURCE_BRANCH_NAME");
        let commit_branch = var("CI_COMMIT_BRANCH");
        let ref_name = var("CI_COMMIT_REF_NAME");

        RunFacts {
            source: PipelineSource::from_ci(&var("CI_PIPELINE_SOURCE")),
            effective_ref: first_non_empty([
                mr_source_branch.as_str(),
                commit_branch.as_str(),
                ref_name.as_str(),
            ]),
            ref_name: ref_name.trim().to_string(),
            sha: var("CI_COMMIT_SHA"),
            short_sha: var("CI_COMMIT_SHORT_SHA"),
            merge_request_id: var("CI_MERGE_REQUEST_IID"),
            merge_request_target_branch: var("CI_MERGE_REQUEST_TARGET_BRANCH_NAME"),
            tag: var("CI_COMMIT_TAG"),
            default_branch: var("CI_DEFAULT_BRANCH"),
            feature_prefix: config.flow.feature_prefix.clone(),
            registry_base: var("CI_REGISTRY_IMAGE"),
            application_name: config.image.application_name.clone().unwrap_or_default(),
            project_path: var("CI_PROJECT_PATH"),
            project_id: var("CI_PROJECT_ID"),
            project_url: var("CI_PROJECT_URL"),
            pipeline_id: var("CI_PIPELINE_ID"),
            pipeline_url: var("CI_PIPELINE_URL"),
            job_id: var("CI_JOB_ID"),
        }
    }

    /// Read run facts from the process environment.
    pub fn from_env(config: &Config) -> Self {
        RunFacts::from_lookup(|key| std::env::var(key).ok(), config)
    }
}

/// Merge-request description from the process environment, if non-blank.
pub fn merge_request_description() -> Option<String> {
    std::env::var(MERGE_REQUEST_DESCRIPTION_VAR)
        .ok()
        .filter(|text| !text.trim().is_empty())
}
