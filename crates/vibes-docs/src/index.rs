//! Root index regeneration.

use crate::error::DocsError;
use chrono::Local;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;
use vibes_common_config::DocumentConfig;
use walkdir::WalkDir;

static NUMERIC_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+_").expect("prefix pattern is a valid regex"));
static STARTUML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@startuml[ \t]+(.+)").expect("startuml pattern is a valid regex"));

/// Timestamp format written under the index preamble.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d/%H/%M";

/// Icon appended to links that point at diagram sources.
pub const DIAGRAM_ICON: &str = " 🔷";

/// Builds the index document listing every document under a root.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    config: DocumentConfig,
}

impl IndexBuilder {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    /// Render the index for `root` stamped with the current local time.
    pub fn rebuild(&self, root: &Path) -> Result<String, DocsError> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.render(root, &timestamp)
    }

    /// Rebuild and write the index file into `root`.
    pub fn write(&self, root: &Path) -> Result<PathBuf, DocsError> {
        let content = self.rebuild(root)?;
        let path = root.join(&self.config.index_file);
        vibes_common_fs::write_string_atomic(&path, &content)?;
        debug!(path = %path.display(), "index regenerated");
        Ok(path)
    }

    /// Render the index for `root` with a fixed timestamp line.
    pub fn render(&self, root: &Path, timestamp: &str) -> Result<String, DocsError> {
        let mut content = format!(
            "# Document Guide\n\
             \n\
             ## Document List\n\
             \n\
             {timestamp}\n\
             \n\
             This document is organized hierarchically. Follow each category below to reach the detailed documents.\n\
             \n\
             ## TOC\n\
             \n"
        );

        for category in &self.config.categories {
            let dir = root.join(&category.name);
            if !dir.is_dir() {
                continue;
            }
            content.push_str(&format!("### {} - {}\n", category.name, category.description));
            self.render_directory(root, &dir, 0, &mut content)?;
            content.push('\n');
        }

        Ok(content)
    }

    fn render_directory(
        &self,
        root: &Path,
        dir: &Path,
        depth: usize,
        out: &mut String,
    ) -> Result<(), DocsError> {
        let indent = "  ".repeat(depth);
        let (files, dirs) = self.list_entries(dir)?;

        for file in &files {
            let relative = vibes_common_fs::path::relative_to(file, root);
            let icon = if self.is_diagram(file) { DIAGRAM_ICON } else { "" };
            out.push_str(&format!(
                "{indent}- [{title}]({prefix}{path}){icon}\n",
                title = self.title_of(file),
                prefix = self.config.link_prefix,
                path = vibes_common_fs::path::to_unix_string(&relative),
            ));
        }

        for sub in &dirs {
            if !self.has_documents(sub) {
                continue;
            }
            let name = sub.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            out.push_str(&format!("{indent}- **{}**\n", format_directory_name(&name)));
            self.render_directory(root, sub, depth + 1, out)?;
        }

        Ok(())
    }

    /// Documents (sorted, index excluded) and visible subdirectories (sorted).
    fn list_entries(&self, dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), DocsError> {
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            if path.is_dir() {
                if !name.starts_with('.') {
                    dirs.push(path);
                }
            } else if self.is_document(&path) && name != self.config.index_file {
                files.push(path);
            }
        }

        files.sort();
        dirs.sort();
        Ok((files, dirs))
    }

    /// True for files with the primary or the diagram extension.
    pub fn is_document(&self, path: &Path) -> bool {
        path.is_file()
            && path.extension().and_then(|e| e.to_str()).is_some_and(|ext| {
                ext == self.config.primary_extension || ext == self.config.diagram_extension
            })
    }

    fn is_diagram(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.config.diagram_extension.as_str())
    }

    /// True if any document exists anywhere below `dir`.
    pub fn has_documents(&self, dir: &Path) -> bool {
        WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .any(|entry| self.is_document(entry.path()))
    }

    /// Display title: the diagram title, the first-line `# ` heading, or the
    /// formatted file name.
    pub fn title_of(&self, path: &Path) -> String {
        let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        let fallback = || format_file_name(&stem);

        let Ok(content) = vibes_common_fs::read_to_string(path, vibes_common_fs::DEFAULT_MAX_SIZE) else {
            return fallback();
        };

        if self.is_diagram(path) {
            return STARTUML_RE
                .captures(&content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(fallback);
        }

        let first_line = content.split('\n').next().unwrap_or_default().trim();
        match first_line.strip_prefix("# ") {
            Some(title) => title.to_string(),
            None => fallback(),
        }
    }
}

/// Strip a leading `NN_` ordering prefix from a directory name.
pub fn format_directory_name(name: &str) -> String {
    NUMERIC_PREFIX_RE.replace(name, "").into_owned()
}

/// Turn `01_api_design` into `Api Design`.
pub fn format_file_name(stem: &str) -> String {
    let name = NUMERIC_PREFIX_RE.replace(stem, "").replace('_', " ");
    name.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
