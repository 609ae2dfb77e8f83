//! Domain logic - pure release-policy rules independent of CI or git I/O

pub mod context;
pub mod flow;
pub mod tag;
pub mod version;

pub use context::{PipelineSource, RunContext, RunFacts};
pub use flow::{resolve_flow, Flow};
pub use tag::{clean_tag, validate_tag};
pub use version::{BumpKind, SemanticVersion};
