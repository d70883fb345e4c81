//! Cross-reference validation for links between documents.
//!
//! A document's links are checked against the filesystem and, for links with
//! a `#fragment`, against the anchors of the target document's headings.
//! Missing files are errors; missing anchors are warnings.

use crate::document::Document;
use crate::error::DocsError;
use crate::heading::parse_heading;
use crate::toc::generate_anchor;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, error, info};
use vibes_common_config::DocumentConfig;
use walkdir::WalkDir;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[[^\]]*\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#)
        .expect("link pattern is a valid regex")
});

const EXTERNAL_SCHEMES: &[&str] = &["http://", "https://", "mailto:", "ftp://"];

/// One problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// 1-indexed line of the link.
    pub line: usize,
    /// Link target as written.
    pub target: String,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}: {} ({})", self.line, self.message, self.target)
    }
}

/// Result of checking one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceReport {
    pub file: PathBuf,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ReferenceReport {
    fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn unreadable(file: impl Into<PathBuf>, err: impl ToString) -> Self {
        let mut report = Self::new(file);
        report.errors.push(Issue {
            line: 0,
            target: String::new(),
            message: format!("cannot read document: {}", err.to_string()),
        });
        report
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Result of `check_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceBatch {
    /// True when no document has errors. Warnings do not count.
    pub success: bool,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<ReferenceReport>,
}

impl ReferenceBatch {
    pub fn from_results(results: Vec<ReferenceReport>) -> Self {
        let errors = results.iter().map(|r| r.errors.len()).sum();
        let warnings = results.iter().map(|r| r.warnings.len()).sum();
        Self {
            success: errors == 0,
            errors,
            warnings,
            results,
        }
    }
}

/// Validates links inside the document tree rooted at `doc_root`.
#[derive(Debug, Clone)]
pub struct ReferenceChecker {
    config: DocumentConfig,
    doc_root: PathBuf,
}

impl ReferenceChecker {
    pub fn new(config: DocumentConfig, doc_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            doc_root: doc_root.into(),
        }
    }

    /// Check every link in one document. Never fails; an unreadable document
    /// is reported as an error.
    pub fn check_file(&self, path: &Path) -> ReferenceReport {
        let document = Document::new(path);
        let text = match document.text() {
            Ok(text) => text,
            Err(err) => {
                error!(path = %path.display(), error = %err, "cannot read document for reference check");
                return ReferenceReport::unreadable(path, err);
            }
        };

        let mut report = ReferenceReport::new(path);
        let base = path.parent().unwrap_or(Path::new("."));
        let own_anchors = anchors(text);
        let mut target_anchors: HashMap<PathBuf, Option<HashSet<String>>> = HashMap::new();

        for (line, target) in links(text) {
            if EXTERNAL_SCHEMES.iter().any(|scheme| target.starts_with(scheme)) {
                continue;
            }

            let (file_part, fragment) = match target.split_once('#') {
                Some((file, fragment)) => (file, Some(fragment)),
                None => (target.as_str(), None),
            };

            let known = if file_part.is_empty() {
                Some(&own_anchors)
            } else {
                let resolved = self.resolve(base, file_part);
                if !resolved.exists() {
                    report.errors.push(Issue {
                        line,
                        target: target.clone(),
                        message: format!("broken link: {} does not exist", resolved.display()),
                    });
                    continue;
                }
                if fragment.is_none() {
                    continue;
                }
                target_anchors
                    .entry(resolved.clone())
                    .or_insert_with(|| self.anchors_of(&resolved))
                    .as_ref()
            };

            if let (Some(fragment), Some(known)) = (fragment, known) {
                if !fragment.is_empty() && !known.contains(fragment) {
                    report.warnings.push(Issue {
                        line,
                        target: target.clone(),
                        message: format!("no heading with anchor #{fragment}"),
                    });
                }
            }
        }

        debug!(
            path = %path.display(),
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "references checked"
        );
        report
    }

    /// Check every document below the document root, in file name order.
    pub fn check_all(&self) -> Result<ReferenceBatch, DocsError> {
        if !self.doc_root.is_dir() {
            return Err(DocsError::NotFound(self.doc_root.clone()));
        }

        let mut results = Vec::new();
        for entry in WalkDir::new(&self.doc_root).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() && self.is_target(entry.path()) => {
                    results.push(self.check_file(entry.path()));
                }
                Ok(_) => {}
                Err(err) => {
                    let path = err.path().unwrap_or(self.doc_root.as_path()).to_path_buf();
                    error!(path = %path.display(), error = %err, "failed to read directory entry");
                    results.push(ReferenceReport::unreadable(path, err));
                }
            }
        }

        let batch = ReferenceBatch::from_results(results);
        info!(
            files = batch.results.len(),
            errors = batch.errors,
            warnings = batch.warnings,
            "reference check finished"
        );
        Ok(batch)
    }

    /// `@vibes/...` links resolve under the document root, other relative
    /// links against the linking document's directory.
    fn resolve(&self, base: &Path, link: &str) -> PathBuf {
        match link.strip_prefix(self.config.link_prefix.as_str()) {
            Some(rest) if !self.config.link_prefix.is_empty() => {
                vibes_common_fs::path::resolve(&self.doc_root, rest)
            }
            _ => vibes_common_fs::path::resolve(base, link),
        }
    }

    /// Anchors of a linked document, `None` when it is not a text document.
    fn anchors_of(&self, path: &Path) -> Option<HashSet<String>> {
        let is_text = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext == self.config.primary_extension);
        if !is_text {
            return None;
        }
        Document::new(path).text().ok().map(anchors)
    }

    fn is_target(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext == self.config.primary_extension);
        let is_template = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&self.config.template_prefix));
        has_extension && !is_template
    }
}

/// Link targets with their line numbers, skipping fenced code blocks.
fn links(text: &str) -> Vec<(usize, String)> {
    let mut found = Vec::new();
    let mut in_fence = false;
    for (idx, line) in text.split('\n').enumerate() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        found.extend(
            LINK_RE
                .captures_iter(line)
                .filter_map(|caps| caps.get(1))
                .map(|m| (idx + 1, m.as_str().to_string())),
        );
    }
    found
}

/// Heading anchors of a document, with `-1`, `-2` suffixes for repeats.
fn anchors(text: &str) -> HashSet<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut result = HashSet::new();
    let mut in_fence = false;
    for line in text.split('\n') {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        let Some((_, title)) = parse_heading(line) else {
            continue;
        };
        let anchor = generate_anchor(title);
        let count = seen.entry(anchor.clone()).or_insert(0);
        if *count == 0 {
            result.insert(anchor);
        } else {
            result.insert(format!("{anchor}-{count}"));
        }
        *count += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use test_case::test_case;

    fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn checker(root: &Path) -> ReferenceChecker {
        ReferenceChecker::new(DocumentConfig::default(), root)
    }

    #[test]
    fn test_valid_links_are_clean() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "rules/design.md", b"# Design\n## Layers\n");
        let path = write(
            root,
            "specs/api.md",
            b"# API\n## TOC\n- [API](#api)\n\nSee [rules](@vibes/rules/design.md#layers) and [up](../rules/design.md).\n[site](https://example.com/x)\n",
        );

        let report = checker(root).check_file(&path);
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.md", b"# A\n\nsee [b](b.md)\nand [c](@vibes/rules/c.md)\n");

        let report = checker(dir.path()).check_file(&path);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].line, 3);
        assert_eq!(report.errors[0].target, "b.md");
        assert_eq!(report.errors[1].target, "@vibes/rules/c.md");
        assert!(report.warnings.is_empty());
    }

    #[test_case("#missing" ; "same document")]
    #[test_case("b.md#missing" ; "other document")]
    fn test_unknown_anchor_is_a_warning(target: &str) {
        let dir = tempdir().unwrap();
        write(dir.path(), "b.md", b"# B\n");
        let path = write(dir.path(), "a.md", format!("# A\n[x]({target})\n").as_bytes());

        let report = checker(dir.path()).check_file(&path);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].message, "no heading with anchor #missing");
    }

    #[test]
    fn test_repeated_headings_get_numbered_anchors() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "a.md",
            b"# Notes\n## Example\n## Example\n[first](#example) [second](#example-1) [third](#example-2)\n",
        );

        let report = checker(dir.path()).check_file(&path);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].target, "#example-2");
    }

    #[test]
    fn test_links_in_code_fences_are_ignored() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.md", b"# A\n```\n[x](nowhere.md)\n```\n");

        assert!(checker(dir.path()).check_file(&path).is_clean());
    }

    #[test]
    fn test_unreadable_document_is_reported() {
        let dir = tempdir().unwrap();
        let report = checker(dir.path()).check_file(&dir.path().join("gone.md"));
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.starts_with("cannot read document"));
    }

    #[test]
    fn test_check_all_counts_and_skips_templates() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "rules/good.md", b"# Good\n[self](#good)\n");
        write(root, "rules/bad.md", b"# Bad\n[gone](gone.md)\n[anchor](good.md#nope)\n");
        write(root, "rules/_template.md", b"# T\n[x](missing.md)\n");
        write(root, "rules/diagram.pu", b"[x](missing.md)\n");

        let batch = checker(root).check_all().unwrap();
        assert!(!batch.success);
        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.errors, 1);
        assert_eq!(batch.warnings, 1);
        assert!(batch.results[0].file.ends_with("rules/bad.md"));
    }

    #[test]
    fn test_warnings_alone_succeed() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.md", b"# A\n[x](#nope)\n");

        let batch = checker(dir.path()).check_all().unwrap();
        assert!(batch.success);
        assert_eq!(batch.warnings, 1);
    }

    #[test]
    fn test_check_all_missing_root() {
        let dir = tempdir().unwrap();
        let err = ReferenceChecker::new(DocumentConfig::default(), dir.path().join("missing"))
            .check_all()
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue {
            line: 4,
            target: "x.md".to_string(),
            message: "broken link".to_string(),
        };
        assert_eq!(issue.to_string(), "L4: broken link (x.md)");
    }
}
