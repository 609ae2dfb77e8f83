use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Maximum image tag length accepted by container registries
pub const MAX_TAG_LEN: usize = 128;

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9_.-]{1,128}$").expect("static tag pattern is valid")
    })
}

/// Normalize a candidate image tag.
///
/// Lower-cases, turns whitespace and path separators into `-`, collapses
/// repeated `-` and truncates to [`MAX_TAG_LEN`] characters. The result may
/// still be invalid (e.g. it contains `+`); check it with [`validate_tag`].
pub fn clean_tag(candidate: &str) -> String {
    let lowered = candidate.trim().to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        let c = if c.is_whitespace() || c == '/' || c == '\\' {
            '-'
        } else {
            c
        };
        if c == '-' && cleaned.ends_with('-') {
            continue;
        }
        cleaned.push(c);
    }
    cleaned.chars().take(MAX_TAG_LEN).collect()
}

/// True if `tag` is a valid image tag: `[a-z0-9_.-]{1,128}`.
pub fn validate_tag(tag: &str) -> bool {
    tag_pattern().is_match(tag)
}

/// Clean a candidate and return it only if the result is valid.
pub fn sanitize_tag(candidate: &str) -> Option<String> {
    let cleaned = clean_tag(candidate);
    if validate_tag(&cleaned) {
        Some(cleaned)
    } else {
        None
    }
}

/// Remove duplicates, keeping the first occurrence of each value in order.
pub fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Split a fully-qualified reference (`registry/app:tag`) into its tag segment.
///
/// The tag is whatever follows the last `:` after the last `/`, so registry ports
/// (`host:5000/app`) are not mistaken for tags.
pub fn tag_segment(reference: &str) -> Option<&str> {
    let name_start = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
    reference[name_start..]
        .rfind(':')
        .map(|i| &reference[name_start + i + 1..])
}
