//! External collaborator abstractions
//!
//! The engine needs two best-effort capabilities from the outside world:
//!
//! - [TagHistorySource]: the highest `MAJOR.MINOR.PATCH` tag of the project
//! - [ManualBumpSource]: a bump kind selected by hand on the current merge request
//!
//! Both answer with a [Lookup], which keeps "nothing there" apart from "could not
//! ask". The engine only ever branches on found-vs-not; implementations log the
//! transport detail of an `Unavailable` answer themselves.
//!
//! Implementations:
//!
//! - [repository::GitTagHistory]: tags of a local git repository via `git2`
//! - [merge_request::MergeRequestTextSource] / [merge_request::FileBumpSource]:
//!   checkbox selection embedded in merge-request text
//! - [mock::StaticTagHistory] / [mock::StaticBumpSource]: fixed answers for
//!   replay and tests

pub mod merge_request;
pub mod mock;
pub mod repository;

pub use merge_request::{parse_bump_selection, FileBumpSource, MergeRequestTextSource};
pub use mock::{StaticBumpSource, StaticTagHistory};
pub use repository::GitTagHistory;

use crate::domain::{BumpKind, SemanticVersion};

/// Outcome of a best-effort lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    /// The source could not be consulted; the text is for logs only
    Unavailable(String),
}

impl<T> Lookup<T> {
    /// Collapse to found-vs-not; `Unavailable` is treated as absent.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Unavailable(_) => None,
        }
    }

    /// True when the source could not be consulted at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Lookup::Unavailable(_))
    }
}

/// Source of the project's tag history.
pub trait TagHistorySource {
    /// Highest valid `MAJOR.MINOR.PATCH` tag, `NotFound` if the project was never tagged.
    ///
    /// Tags that do not parse strictly (including `v`-prefixed ones) are ignored.
    fn latest_semantic_tag(&self) -> Lookup<String>;
}

/// Source of a manually selected bump for a merge request.
pub trait ManualBumpSource {
    /// Bump kind chosen for merge request `merge_request_id`, if any.
    ///
    /// Must never fail hard: transport problems are `Lookup::Unavailable`.
    fn bump_for(&self, merge_request_id: &str) -> Lookup<BumpKind>;
}

/// Highest strictly-parsable semantic version among `names`.
pub fn highest_semantic_tag<I, S>(names: I) -> Option<SemanticVersion>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| SemanticVersion::parse(name.as_ref()).ok())
        .max()
}
