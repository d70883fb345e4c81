//! A document on disk with lazily loaded text.

use crate::error::DocsError;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// A text document identified by its path.
///
/// The content is read on first access and cached for the lifetime of the
/// value. Writes replace the whole file.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    content: OnceCell<String>,
}

impl Document {
    /// Create a handle without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name as UTF-8, empty when the path has none.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Document text, loaded on first call.
    pub fn text(&self) -> Result<&str, DocsError> {
        if let Some(text) = self.content.get() {
            return Ok(text);
        }
        let text = vibes_common_fs::read_to_string(&self.path, vibes_common_fs::DEFAULT_MAX_SIZE)?;
        Ok(self.content.get_or_init(|| text))
    }

    /// Replace the whole document.
    pub fn write(&mut self, text: String) -> Result<(), DocsError> {
        vibes_common_fs::write_string_atomic(&self.path, &text)?;
        self.content = OnceCell::from(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_text_is_loaded_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "# A\n").unwrap();

        let doc = Document::new(&path);
        assert_eq!(doc.text().unwrap(), "# A\n");

        fs::write(&path, "# B\n").unwrap();
        assert_eq!(doc.text().unwrap(), "# A\n");
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let dir = tempdir().unwrap();
        let doc = Document::new(dir.path().join("missing.md"));
        assert!(doc.text().unwrap_err().is_not_found());
    }

    #[test]
    fn test_write_replaces_content() {
        let dir = tempdir().unwrap();
        let mut doc = Document::new(dir.path().join("b.md"));
        doc.write("# New\n".to_string()).unwrap();

        assert_eq!(doc.text().unwrap(), "# New\n");
        assert_eq!(fs::read_to_string(doc.path()).unwrap(), "# New\n");
        assert_eq!(doc.file_name(), "b.md");
    }
}
