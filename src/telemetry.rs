//! Tracing initialisation for the `release-plan` binary.
//!
//! Log lines go to stderr. `RELEASE_PLAN_LOG` takes an `EnvFilter` directive
//! and wins over the level passed in; `RELEASE_PLAN_LOG_FORMAT=json` switches
//! to newline-delimited JSON.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILTER_VAR: &str = "RELEASE_PLAN_LOG";
pub const LOG_FORMAT_VAR: &str = "RELEASE_PLAN_LOG_FORMAT";

/// Whether `RELEASE_PLAN_LOG_FORMAT` asks for JSON
pub fn json_requested() -> bool {
    std::env::var(LOG_FORMAT_VAR)
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Install the global subscriber. Only the first call takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }
}
