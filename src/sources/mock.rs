use crate::domain::BumpKind;
use crate::sources::{highest_semantic_tag, Lookup, ManualBumpSource, TagHistorySource};

/// Tag history backed by a fixed list of tag names
#[derive(Debug, Clone, Default)]
pub struct StaticTagHistory {
    tags: Vec<String>,
    unavailable: Option<String>,
}

impl StaticTagHistory {
    /// Create a history from tag names
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticTagHistory {
            tags: tags.into_iter().map(Into::into).collect(),
            unavailable: None,
        }
    }

    /// A history whose lookups always fail
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StaticTagHistory {
            tags: Vec::new(),
            unavailable: Some(reason.into()),
        }
    }
}

impl TagHistorySource for StaticTagHistory {
    fn latest_semantic_tag(&self) -> Lookup<String> {
        if let Some(reason) = &self.unavailable {
            return Lookup::Unavailable(reason.clone());
        }
        match highest_semantic_tag(&self.tags) {
            Some(version) => Lookup::Found(version.to_string()),
            None => Lookup::NotFound,
        }
    }
}

/// Manual bump source returning a fixed answer and counting calls
#[derive(Debug)]
pub struct StaticBumpSource {
    answer: Lookup<BumpKind>,
    calls: std::cell::Cell<usize>,
}

impl StaticBumpSource {
    pub fn new(answer: Lookup<BumpKind>) -> Self {
        StaticBumpSource {
            answer,
            calls: std::cell::Cell::new(0),
        }
    }

    /// How many times `bump_for` was called
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ManualBumpSource for StaticBumpSource {
    fn bump_for(&self, _merge_request_id: &str) -> Lookup<BumpKind> {
        self.calls.set(self.calls.get() + 1);
        self.answer.clone()
    }
}
