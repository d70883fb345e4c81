//! `vibes doc` subcommands.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Subcommand, ValueHint};
use serde::Serialize;
use tracing::info;
use vibes_docs::{
    BatchReport, DocumentGenerator, ReferenceBatch, ReferenceReport, UpdateResult, UpdateStatus,
};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, IconContext, StatusOutput};

/// Maintain document TOCs, the index and templates
#[derive(Debug, Subcommand)]
pub enum DocCommand {
    /// Refresh the TOC section of one document
    UpdateFile {
        /// Document to update
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Refresh every document under the document root
    UpdateAll,

    /// Rebuild the root index file
    Index,

    /// Check the links of one document
    CheckFile {
        /// Document to check
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Check the links of every document under the document root
    CheckAll,

    /// Create a document from its category template
    Generate {
        /// Category (rules, specs, tasks, logics, apis, temps)
        #[arg(long = "doc-type")]
        doc_type: String,

        /// File name without extension
        #[arg(long)]
        filename: String,

        /// Replaces every [TODO: ...] placeholder of the template
        #[arg(long)]
        title: Option<String>,
    },
}

impl DocCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<ExitCode, CliError> {
        match self {
            Self::UpdateFile { file } => update_file(ctx, file),
            Self::UpdateAll => update_all(ctx),
            Self::Index => {
                let path = ctx.updater().index_builder().write(&ctx.doc_root())?;
                print_output(ctx, &StatusOutput::success(format!("Rebuilt {}", path.display())))?;
                Ok(ExitCode::SUCCESS)
            }
            Self::CheckFile { file } => check_file(ctx, file),
            Self::CheckAll => {
                let batch = ctx.reference_checker().check_all()?;
                print_output(ctx, &batch)?;
                Ok(exit_for(batch.success))
            }
            Self::Generate {
                doc_type,
                filename,
                title,
            } => generate(ctx, doc_type, filename, title.as_deref()),
        }
    }
}

fn update_file(ctx: &CommandContext, file: &std::path::Path) -> Result<ExitCode, CliError> {
    let path = ctx.resolve(file);
    if !path.is_file() {
        return Err(CliError::not_found("file", path.display().to_string()));
    }

    let result = ctx.updater().update_file(&path);
    print_output(ctx, &result)?;
    Ok(exit_for(result.is_success()))
}

fn update_all(ctx: &CommandContext) -> Result<ExitCode, CliError> {
    let report = ctx.updater().update_all(&ctx.doc_root())?;
    print_output(ctx, &report)?;
    Ok(exit_for(report.success))
}

fn check_file(ctx: &CommandContext, file: &std::path::Path) -> Result<ExitCode, CliError> {
    let report = check_references(ctx, file)?;
    print_output(ctx, &report)?;
    Ok(exit_for(report.errors.is_empty()))
}

/// Check the links of a user-supplied path.
pub(crate) fn check_references(ctx: &CommandContext, file: &std::path::Path) -> Result<ReferenceReport, CliError> {
    let path = ctx.resolve(file);
    if !path.is_file() {
        return Err(CliError::not_found("file", path.display().to_string()));
    }
    Ok(ctx.reference_checker().check_file(&path))
}

fn exit_for(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Generated {
    path: PathBuf,
    toc: UpdateResult,
    references: ReferenceReport,
}

impl FormattedOutput for Generated {
    fn format_text(&self, icons: &IconContext) -> String {
        let mut text = format!("{} Created {}", icons.check(), self.path.display());
        if let Some(error) = self.toc.error() {
            text.push_str(&format!("\n{} TOC update failed: {error}", icons.warning()));
        }
        for issue in &self.references.errors {
            text.push_str(&format!("\n{} {issue}", icons.warning()));
        }
        text
    }

    fn format_quiet(&self) -> Option<String> {
        Some(self.path.display().to_string())
    }
}

fn generate(
    ctx: &CommandContext,
    category: &str,
    filename: &str,
    title: Option<&str>,
) -> Result<ExitCode, CliError> {
    print_output(ctx, &generate_document(ctx, category, filename, title)?)?;
    Ok(ExitCode::SUCCESS)
}

/// Create a document from its template, refresh its TOC and check its links.
pub(crate) fn generate_document(
    ctx: &CommandContext,
    category: &str,
    filename: &str,
    title: Option<&str>,
) -> Result<Generated, CliError> {
    let generator = DocumentGenerator::new(ctx.doc_root(), ctx.config.document.primary_extension.clone());
    let path = generator.generate(category, filename, title)?;
    info!(path = %path.display(), "document generated");

    let toc = ctx.updater().update_file(&path);
    let references = ctx.reference_checker().check_file(&path);
    Ok(Generated { path, toc, references })
}

impl FormattedOutput for UpdateResult {
    fn format_text(&self, icons: &IconContext) -> String {
        let file = self.file.display();
        match &self.status {
            UpdateStatus::Updated { headings_count } => {
                format!("{} Updated {file} ({headings_count} headings)", icons.check())
            }
            UpdateStatus::Regenerated => format!("{} Regenerated {file}", icons.check()),
            UpdateStatus::Skipped { reason } => format!("{} Skipped {file}: {reason}", icons.warning()),
            UpdateStatus::Failed { error } => format!("{} Failed {file}: {error}", icons.cross()),
        }
    }

    fn format_quiet(&self) -> Option<String> {
        match &self.status {
            UpdateStatus::Updated { .. } | UpdateStatus::Regenerated => Some("Updated 1 files".to_string()),
            UpdateStatus::Skipped { .. } => None,
            UpdateStatus::Failed { error } => Some(format!("Failed: {error}")),
        }
    }
}

impl FormattedOutput for BatchReport {
    fn format_text(&self, icons: &IconContext) -> String {
        let mut lines: Vec<String> = self.results.iter().map(|r| r.format_text(icons)).collect();
        let s = &self.summary;
        lines.push(String::new());
        lines.push(format!(
            "Total: {}  Updated: {}  Skipped: {}  Failed: {}",
            s.total, s.updated, s.skipped, s.failed
        ));
        lines.join("\n")
    }

    fn format_quiet(&self) -> Option<String> {
        let s = &self.summary;
        if s.failed > 0 {
            Some(format!("Updated {} files ({} failed)", s.updated, s.failed))
        } else {
            Some(format!("Updated {} files", s.updated))
        }
    }
}

impl FormattedOutput for ReferenceReport {
    fn format_text(&self, icons: &IconContext) -> String {
        let file = self.file.display();
        if self.is_clean() {
            return format!("{} {file}: no broken references", icons.check());
        }
        let mut lines = vec![format!(
            "{} {file}: {} errors, {} warnings",
            if self.errors.is_empty() { icons.warning() } else { icons.cross() },
            self.errors.len(),
            self.warnings.len()
        )];
        lines.extend(self.errors.iter().map(|e| format!("    error {e}")));
        lines.extend(self.warnings.iter().map(|w| format!("    warning {w}")));
        lines.join("\n")
    }

    fn format_quiet(&self) -> Option<String> {
        (!self.is_clean()).then(|| format!("{} errors, {} warnings", self.errors.len(), self.warnings.len()))
    }
}

impl FormattedOutput for ReferenceBatch {
    fn format_text(&self, icons: &IconContext) -> String {
        let mut lines: Vec<String> = self
            .results
            .iter()
            .filter(|r| !r.is_clean())
            .map(|r| r.format_text(icons))
            .collect();
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!(
            "Checked: {}  Errors: {}  Warnings: {}",
            self.results.len(),
            self.errors,
            self.warnings
        ));
        lines.join("\n")
    }

    fn format_quiet(&self) -> Option<String> {
        Some(format!("{} errors, {} warnings", self.errors, self.warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_update_result_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "# A\n\n## TOC\n\n## B\n").unwrap();

        let ctx = CommandContext::new(dir.path());
        let result = ctx.updater().update_file(&path);
        let text = result.format_text(&IconContext::ascii());
        assert!(text.starts_with("[ok] Updated"));
        assert!(text.ends_with("(2 headings)"));
        assert_eq!(result.format_quiet().as_deref(), Some("Updated 1 files"));
    }

    #[test]
    fn test_batch_quiet_summary() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(docs.join("rules")).unwrap();
        fs::write(docs.join("rules/a.md"), "# A\n\n## TOC\n\n## B\n").unwrap();
        fs::write(docs.join("rules/b.md"), "# B\n").unwrap();

        let ctx = CommandContext::new(dir.path());
        let report = ctx.updater().update_all(&ctx.doc_root()).unwrap();
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(report.format_quiet().unwrap(), format!("Updated {} files", report.summary.updated));
        assert!(report.format_text(&IconContext::ascii()).contains("Skipped"));
    }

    #[test]
    fn test_reference_report_text_lists_issues() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "# A\n[b](b.md)\n[c](#c)\n").unwrap();

        let ctx = CommandContext::new(dir.path());
        let report = ctx.reference_checker().check_file(&path);
        let text = report.format_text(&IconContext::ascii());
        assert!(text.starts_with("[err] "), "{text}");
        assert!(text.contains("1 errors, 1 warnings"));
        assert!(text.contains("    error L2: broken link"));
        assert!(text.contains("    warning L3: no heading with anchor #c (#c)"));
        assert_eq!(report.format_quiet().as_deref(), Some("1 errors, 1 warnings"));
    }

    #[test]
    fn test_reference_batch_text_hides_clean_files() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("clean.md"), "# Clean\n").unwrap();
        fs::write(docs.join("dirty.md"), "# Dirty\n[x](#nope)\n").unwrap();

        let ctx = CommandContext::new(dir.path());
        let batch = ctx.reference_checker().check_all().unwrap();
        let text = batch.format_text(&IconContext::ascii());
        assert!(!text.contains("clean.md"));
        assert!(text.contains("dirty.md"));
        assert!(text.ends_with("Checked: 2  Errors: 0  Warnings: 1"));
    }
}
