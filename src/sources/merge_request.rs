//! Manual bump selection embedded in merge-request text.
//!
//! Authors pick a release type by ticking one box in a block such as:
//!
//! ```text
//! <!-- release-plan:bump -->
//! - [ ] **Major**
//! - [x] **Minor**
//! - [ ] **Patch**
//! ```

use crate::domain::BumpKind;
use crate::sources::{Lookup, ManualBumpSource};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Marker identifying the bump-selection block in notes
pub const BUMP_BLOCK_MARKER: &str = "<!-- release-plan:bump -->";

fn checkbox_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*- \[[xX]\] \*\*(Patch|Minor|Major)\*\*").expect("static pattern is valid")
    })
}

/// First checked bump box in `text`, scanning line by line.
pub fn parse_bump_selection(text: &str) -> Option<BumpKind> {
    text.lines().find_map(|line| {
        checkbox_pattern()
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

/// Selection from notes first (newest marked note wins), then the description.
fn select_from(notes: &[String], description: Option<&str>) -> Option<BumpKind> {
    notes
        .iter()
        .rev()
        .filter(|note| note.contains(BUMP_BLOCK_MARKER))
        .find_map(|note| parse_bump_selection(note))
        .or_else(|| description.and_then(parse_bump_selection))
}

/// Merge-request description already in hand (e.g. `CI_MERGE_REQUEST_DESCRIPTION`).
#[derive(Debug, Clone, Default)]
pub struct MergeRequestTextSource {
    description: Option<String>,
}

impl MergeRequestTextSource {
    pub fn new(description: Option<String>) -> Self {
        MergeRequestTextSource { description }
    }
}

impl ManualBumpSource for MergeRequestTextSource {
    fn bump_for(&self, _merge_request_id: &str) -> Lookup<BumpKind> {
        match select_from(&[], self.description.as_deref()) {
            Some(kind) => Lookup::Found(kind),
            None => Lookup::NotFound,
        }
    }
}

/// Merge-request text exported to disk by an earlier CI job; read on demand.
///
/// The notes directory holds one file per note. File names sort oldest first,
/// so a numeric or timestamp prefix keeps the order. A description file, when
/// given, replaces the inline description.
#[derive(Debug, Clone, Default)]
pub struct FileBumpSource {
    description_file: Option<PathBuf>,
    inline_description: Option<String>,
    notes_dir: Option<PathBuf>,
}

impl FileBumpSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBumpSource::default().with_description_file(path)
    }

    pub fn with_description_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.description_file = Some(path.into());
        self
    }

    pub fn with_inline_description(mut self, description: Option<String>) -> Self {
        self.inline_description = description;
        self
    }

    pub fn with_notes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.notes_dir = Some(dir.into());
        self
    }

    fn description(&self) -> Result<Option<String>, String> {
        match &self.description_file {
            Some(path) => read_text(path).map(Some),
            None => Ok(self.inline_description.clone()),
        }
    }

    fn notes(&self) -> Result<Vec<String>, String> {
        let Some(dir) = &self.notes_dir else {
            return Ok(Vec::new());
        };
        let entries = fs::read_dir(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| format!("{}: {}", dir.display(), e))?
                .path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        paths.iter().map(|path| read_text(path)).collect()
    }
}

fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))
}

impl ManualBumpSource for FileBumpSource {
    fn bump_for(&self, merge_request_id: &str) -> Lookup<BumpKind> {
        let loaded = self
            .notes()
            .and_then(|notes| Ok((notes, self.description()?)));
        match loaded {
            Ok((notes, description)) => match select_from(&notes, description.as_deref()) {
                Some(kind) => Lookup::Found(kind),
                None => Lookup::NotFound,
            },
            Err(reason) => {
                tracing::warn!(
                    event = "lookup.unavailable",
                    lookup = "manual-bump",
                    merge_request = merge_request_id,
                    error = %reason,
                );
                Lookup::Unavailable(reason)
            }
        }
    }
}
