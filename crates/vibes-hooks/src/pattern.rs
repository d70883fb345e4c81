//! Glob matching of project-relative paths.
//!
//! `*` stays within one path segment, `**` spans zero or more whole segments,
//! and a pattern always has to describe the full path.

use glob::{MatchOptions, Pattern, PatternError};

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Normalize a candidate path: forward slashes, no leading `./` or `/`,
/// `.` and `..` segments collapsed.
///
/// A `..` that climbs above the start is kept, so such paths only match
/// patterns that spell it out.
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." if segments.last().is_some_and(|last| *last != "..") => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// True if any pattern matches `path`. Invalid patterns never match.
pub fn matches<S: AsRef<str>>(path: &str, patterns: &[S]) -> bool {
    let path = normalize(path);
    patterns.iter().any(|p| {
        Pattern::new(p.as_ref())
            .map(|pattern| pattern.matches_with(&path, OPTIONS))
            .unwrap_or(false)
    })
}

/// A compiled, ordered set of patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile every pattern, failing on the first invalid one.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, (String, PatternError)> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()).map_err(|e| (p.as_ref().to_string(), e)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_match(&self, path: &str) -> bool {
        let path = normalize(path);
        self.patterns.iter().any(|p| p.matches_with(&path, OPTIONS))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
