use std::fmt;

/// Warnings raised while planning a run.
/// These are non-fatal: the run still produces a plan, but the user should know.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Tag history could not be consulted; forecasting bootstraps from 0.0.0
    LatestTagUnavailable { reason: String },
    /// Latest tag exists but is not `MAJOR.MINOR.PATCH`
    UnparsableLatestTag { tag: String, reason: String },
    /// Flow forced by the operator disagrees with what the pipeline looks like
    FlowForced { forced: String, detected: String },
    /// Feature build that will not be published
    FeatureNotPublished { reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::LatestTagUnavailable { reason } => {
                write!(
                    f,
                    "Tag history unavailable ({}); forecasting from 0.0.0",
                    reason
                )
            }
            BoundaryWarning::UnparsableLatestTag { tag, reason } => {
                write!(f, "Cannot parse latest tag '{}': {}", tag, reason)
            }
            BoundaryWarning::FlowForced { forced, detected } => {
                write!(
                    f,
                    "Flow forced to '{}' (pipeline looks like '{}')",
                    forced, detected
                )
            }
            BoundaryWarning::FeatureNotPublished { reason } => {
                write!(f, "Feature build will not be published: {}", reason)
            }
        }
    }
}
