use crate::error::{ReleasePlanError, Result};
use crate::sources::{highest_semantic_tag, Lookup, TagHistorySource};
use git2::Repository as Git2Repo;
use std::path::Path;

/// Tag history read from a local git repository
pub struct GitTagHistory {
    repo: Git2Repo,
}

impl GitTagHistory {
    /// Open or discover a git repository at or above `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::discover(path).map_err(|e| {
            ReleasePlanError::lookup(format!(
                "cannot open repository at {}: {}",
                path.display(),
                e.message()
            ))
        })?;

        Ok(GitTagHistory { repo })
    }

    /// All tag names in the repository
    pub fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }
}

impl TagHistorySource for GitTagHistory {
    fn latest_semantic_tag(&self) -> Lookup<String> {
        let tags = match self.list_tags() {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!(event = "lookup.unavailable", lookup = "tag-history", error = %e);
                return Lookup::Unavailable(e.to_string());
            }
        };

        match highest_semantic_tag(&tags) {
            Some(version) => Lookup::Found(version.to_string()),
            None => Lookup::NotFound,
        }
    }
}
