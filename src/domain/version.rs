use crate::error::{ReleasePlanError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Semantic version representation (`MAJOR.MINOR.PATCH`, no prefix, no pre-release)
///
/// Field order matters: the derived `Ord` compares major, then minor, then patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
        }
    }

    /// Parse exactly three dot-separated non-negative integers (e.g. "1.2.3").
    ///
    /// Prefixes such as `v` are not accepted here; callers that tolerate them
    /// strip them first (see [`crate::forecast`]).
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() != 3 {
            return Err(ReleasePlanError::format(format!(
                "invalid version '{}': expected MAJOR.MINOR.PATCH",
                text
            )));
        }

        let major = parse_segment(text, "major", parts[0])?;
        let minor = parse_segment(text, "minor", parts[1])?;
        let patch = parse_segment(text, "patch", parts[2])?;

        Ok(SemanticVersion {
            major,
            minor,
            patch,
        })
    }

    /// Return the next version for the given bump; never mutates `self`.
    ///
    /// A component already at `u64::MAX` cannot be bumped and is a format error.
    pub fn increment(&self, kind: BumpKind) -> Result<Self> {
        let overflow = |name: &str| {
            ReleasePlanError::format(format!(
                "cannot increment {} segment of '{}': out of range",
                name, self
            ))
        };
        let next = match kind {
            BumpKind::Major => SemanticVersion {
                major: self.major.checked_add(1).ok_or_else(|| overflow("major"))?,
                minor: 0,
                patch: 0,
            },
            BumpKind::Minor => SemanticVersion {
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(|| overflow("minor"))?,
                patch: 0,
            },
            BumpKind::Patch => SemanticVersion {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1).ok_or_else(|| overflow("patch"))?,
            },
        };
        Ok(next)
    }
}

fn parse_segment(input: &str, name: &str, segment: &str) -> Result<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReleasePlanError::format(format!(
            "invalid {} segment '{}' in version '{}'",
            name, segment, input
        )));
    }
    segment.parse::<u64>().map_err(|_| {
        ReleasePlanError::format(format!(
            "{} segment '{}' in version '{}' is out of range",
            name, segment, input
        ))
    })
}

impl FromStr for SemanticVersion {
    type Err = ReleasePlanError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version bump level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

impl FromStr for BumpKind {
    type Err = ReleasePlanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            _ => Err(ReleasePlanError::config(format!(
                "invalid bump kind '{}': must be one of major, minor, patch",
                s
            ))),
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpKind::Major => write!(f, "Major"),
            BumpKind::Minor => write!(f, "Minor"),
            BumpKind::Patch => write!(f, "Patch"),
        }
    }
}
