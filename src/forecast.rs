//! Next-version forecasting from the latest known tag.
//!
//! The `v` prefix is preserved exactly as it appears on the input. An empty
//! baseline means "never released" and bootstraps from `0.0.0`; a malformed
//! baseline is a [`ReleasePlanError::Format`] and is never defaulted.

use crate::domain::{BumpKind, SemanticVersion};
use crate::error::{ReleasePlanError, Result};
use serde::Serialize;

/// Pre-release identifier used when the caller supplies none
pub const DEFAULT_RC_IDENTIFIER: &str = "rc.1";

/// Compute the next release version for `latest_tag` ("v1.2.3", "1.2.3" or "").
pub fn forecast_next(latest_tag: &str, bump: BumpKind) -> Result<String> {
    let latest_tag = latest_tag.trim();
    let (prefix, core) = match latest_tag.strip_prefix('v') {
        Some(rest) => ("v", rest),
        None => ("", latest_tag),
    };

    let base = if core.is_empty() {
        SemanticVersion::default()
    } else {
        SemanticVersion::parse(core).map_err(|e| {
            ReleasePlanError::format(format!(
                "unable to parse latest tag '{}': {}",
                latest_tag, e
            ))
        })?
    };

    let next = base.increment(bump).map_err(|e| {
        ReleasePlanError::format(format!(
            "cannot forecast past latest tag '{}': {}",
            latest_tag, e
        ))
    })?;
    Ok(format!("{}{}", prefix, next))
}

/// Like [`forecast_next`] with `-<identifier>` appended; empty identifier means `rc.1`.
pub fn forecast_next_rc(latest_tag: &str, bump: BumpKind, identifier: &str) -> Result<String> {
    let next = forecast_next(latest_tag, bump)?;
    let identifier = if identifier.is_empty() {
        DEFAULT_RC_IDENTIFIER
    } else {
        identifier
    };
    Ok(format!("{}-{}", next, identifier))
}

/// One forecast shared by the summary and the planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Baseline tag; empty when the project has never been tagged
    pub latest_tag: String,
    pub bump: BumpKind,
    pub next_version: Option<String>,
    pub next_rc_version: Option<String>,
    /// Why the versions are missing, when the baseline could not be parsed
    pub error: Option<String>,
}

impl Forecast {
    /// Forecast both versions; a malformed baseline leaves them `None` and records the error.
    pub fn compute(latest_tag: &str, bump: BumpKind, rc_identifier: &str) -> Self {
        let next = forecast_next(latest_tag, bump);
        let rc = forecast_next_rc(latest_tag, bump, rc_identifier);
        let error = next.as_ref().err().map(ToString::to_string);

        let forecast = Forecast {
            latest_tag: latest_tag.trim().to_string(),
            bump,
            next_version: next.ok(),
            next_rc_version: rc.ok(),
            error,
        };
        match &forecast.error {
            Some(reason) => tracing::warn!(
                event = "forecast.failed",
                latest_tag = %forecast.latest_tag,
                reason = %reason,
            ),
            None => tracing::info!(
                event = "forecast.computed",
                latest_tag = %forecast.latest_tag,
                bump = %bump,
                next = forecast.next_version.as_deref().unwrap_or_default(),
                next_rc = forecast.next_rc_version.as_deref().unwrap_or_default(),
            ),
        }
        forecast
    }
}
