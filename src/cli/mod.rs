//! Programmatic entry points behind the `release-plan` binary

pub mod orchestration;

pub use orchestration::{run_release_plan, ReleaseOutcome, ReleaseSources};
