//! New documents from per-category templates.

use crate::error::DocsError;
use chrono::Local;
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

static TODO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[TODO: [^\]]+\]").expect("placeholder pattern is a valid regex"));

/// Categories a document can be generated into.
pub const CATEGORIES: &[&str] = &["rules", "specs", "tasks", "logics", "apis", "temps"];

/// Category whose documents are stamped with the creation time.
pub const TEMP_CATEGORY: &str = "temps";

/// Template file name inside each category directory.
pub const TEMPLATE_FILE: &str = "_template.md";

/// Creates documents from `<doc_root>/<category>/_template.md`.
#[derive(Debug, Clone)]
pub struct DocumentGenerator {
    doc_root: PathBuf,
    extension: String,
}

impl DocumentGenerator {
    pub fn new(doc_root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            doc_root: doc_root.into(),
            extension: extension.into(),
        }
    }

    /// Generate `<category>/<filename>.<ext>` and return its path.
    ///
    /// Every `[TODO: ...]` placeholder is replaced by `title` when one is given.
    pub fn generate(
        &self,
        category: &str,
        filename: &str,
        title: Option<&str>,
    ) -> Result<PathBuf, DocsError> {
        if !CATEGORIES.contains(&category) {
            return Err(DocsError::UnknownCategory(category.to_string()));
        }
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(DocsError::InvalidFileName(filename.to_string()));
        }

        let now = Local::now();
        let is_temp = category == TEMP_CATEGORY;
        let filename = if is_temp {
            format!("{}{}", now.format("%m%d%H%M_"), filename)
        } else {
            filename.to_string()
        };

        let category_dir = self.doc_root.join(category);
        let target = category_dir.join(format!("{}.{}", filename, self.extension));
        if target.exists() {
            return Err(DocsError::AlreadyExists(target));
        }

        let template = self.template_path(&category_dir);
        let mut content = vibes_common_fs::read_to_string(&template, vibes_common_fs::DEFAULT_MAX_SIZE)?;

        if let Some(title) = title.filter(|t| !t.is_empty()) {
            content = TODO_RE.replace_all(&content, NoExpand(title)).into_owned();
        }
        if is_temp {
            content = content.replace("${timestamp}", &now.format("%Y-%m-%d").to_string());
        }

        vibes_common_fs::write_string_atomic(&target, &content)?;
        info!(path = %target.display(), category, "document generated");
        Ok(target)
    }

    fn template_path(&self, category_dir: &Path) -> PathBuf {
        category_dir.join(TEMPLATE_FILE)
    }
}
