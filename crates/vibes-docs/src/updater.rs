//! Single-file and whole-tree TOC updates.

use crate::document::Document;
use crate::error::DocsError;
use crate::heading::HeadingExtractor;
use crate::index::IndexBuilder;
use crate::toc::{self, TocSynthesizer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use vibes_common_config::DocumentConfig;
use walkdir::WalkDir;

/// Reason reported for documents without a TOC section.
pub const NO_TOC_REASON: &str =
    "no TOC section; add a `## TOC` (or `## 目次`) heading to enable updates";

/// Outcome of updating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    /// TOC rewritten from `headings_count` headings.
    Updated { headings_count: usize },
    /// Index file rebuilt from the directory tree.
    Regenerated,
    /// Nothing to do by policy.
    Skipped { reason: String },
    /// Read or write failure.
    Failed { error: String },
}

/// Per-file update result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub file: PathBuf,
    #[serde(flatten)]
    pub status: UpdateStatus,
}

impl UpdateResult {
    fn new(file: impl Into<PathBuf>, status: UpdateStatus) -> Self {
        Self { file: file.into(), status }
    }

    fn failed(file: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::new(file, UpdateStatus::Failed { error: error.to_string() })
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.status, UpdateStatus::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, UpdateStatus::Skipped { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            UpdateStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Result of `update_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// True when at least one document succeeded.
    pub success: bool,
    pub results: Vec<UpdateResult>,
    pub summary: Summary,
}

impl BatchReport {
    pub fn from_results(results: Vec<UpdateResult>) -> Self {
        let mut summary = Summary {
            total: results.len(),
            ..Summary::default()
        };
        for result in &results {
            match result.status {
                UpdateStatus::Updated { .. } | UpdateStatus::Regenerated => summary.updated += 1,
                UpdateStatus::Skipped { .. } => summary.skipped += 1,
                UpdateStatus::Failed { .. } => summary.failed += 1,
            }
        }

        Self {
            success: results.iter().any(UpdateResult::is_success),
            results,
            summary,
        }
    }
}

/// Keeps TOC sections and the root index current.
#[derive(Debug, Clone, Default)]
pub struct TocUpdater {
    config: DocumentConfig,
    extractor: HeadingExtractor,
    synthesizer: TocSynthesizer,
    index: IndexBuilder,
}

impl TocUpdater {
    pub fn new(config: DocumentConfig) -> Self {
        Self {
            extractor: HeadingExtractor::new(config.toc_markers.clone()),
            synthesizer: TocSynthesizer::new(config.toc_markers.clone()),
            index: IndexBuilder::new(config.clone()),
            config,
        }
    }

    pub fn index_builder(&self) -> &IndexBuilder {
        &self.index
    }

    /// Update one document. Never fails; errors become `UpdateStatus::Failed`.
    pub fn update_file(&self, path: &Path) -> UpdateResult {
        let mut document = Document::new(path);

        let outcome = if document.file_name() == self.config.index_file {
            let root = path.parent().unwrap_or(Path::new("."));
            self.index.write(root).map(|_| UpdateStatus::Regenerated)
        } else {
            self.update_document(&mut document)
        };

        match outcome {
            Ok(status) => {
                debug!(path = %path.display(), ?status, "document processed");
                UpdateResult::new(path, status)
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "document update failed");
                UpdateResult::failed(path, err)
            }
        }
    }

    fn update_document(&self, document: &mut Document) -> Result<UpdateStatus, DocsError> {
        let text = document.text()?;
        let headings = self.extractor.extract(text);
        let Some(updated) = self.synthesizer.splice_into(text, &toc::render(&headings)) else {
            return Ok(UpdateStatus::Skipped {
                reason: NO_TOC_REASON.to_string(),
            });
        };

        if updated != text {
            document.write(updated)?;
        }
        Ok(UpdateStatus::Updated {
            headings_count: headings.len(),
        })
    }

    /// Update every document under `root`, creating the index first if absent.
    ///
    /// Per-file failures are collected; only a missing root is an error.
    pub fn update_all(&self, root: &Path) -> Result<BatchReport, DocsError> {
        if !root.is_dir() {
            return Err(DocsError::NotFound(root.to_path_buf()));
        }

        let mut results = Vec::new();

        let index_path = root.join(&self.config.index_file);
        if !index_path.exists() {
            results.push(self.update_file(&index_path));
        }

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    error!(path = %path.display(), error = %err, "failed to read directory entry");
                    results.push(UpdateResult::failed(path, err));
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_target(entry.path()) {
                results.push(self.update_file(entry.path()));
            }
        }

        let report = BatchReport::from_results(results);
        info!(
            total = report.summary.total,
            updated = report.summary.updated,
            skipped = report.summary.skipped,
            failed = report.summary.failed,
            "batch update finished"
        );
        Ok(report)
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
