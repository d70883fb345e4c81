//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VibesConfig {
    /// Project layout.
    pub system: SystemConfig,
    /// Document tree settings.
    pub document: DocumentConfig,
    /// Convention checking settings.
    pub conventions: ConventionsConfig,
}

impl VibesConfig {
    /// Document root resolved against the project root.
    pub fn doc_root(&self, project_root: &Path) -> PathBuf {
        vibes_common_fs::path::resolve(project_root, &self.system.doc_root)
    }

    /// Editor settings directory resolved against the project root.
    pub fn claude_dir(&self, project_root: &Path) -> PathBuf {
        vibes_common_fs::path::resolve(project_root, &self.system.claude_dir)
    }

    /// Convention rules file resolved against the project root.
    pub fn rules_file(&self, project_root: &Path) -> PathBuf {
        vibes_common_fs::path::resolve(project_root, &self.conventions.rules_file)
    }

    /// Marker directory, falling back to the OS temp directory.
    pub fn marker_dir(&self, project_root: &Path) -> PathBuf {
        match &self.conventions.marker_dir {
            Some(dir) => vibes_common_fs::path::resolve(project_root, dir),
            None => std::env::temp_dir(),
        }
    }
}

/// Project layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Documentation root, relative to the project root.
    pub doc_root: PathBuf,
    /// Editor integration directory holding `settings.json`.
    pub claude_dir: PathBuf,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            doc_root: PathBuf::from("docs"),
            claude_dir: PathBuf::from(".claude"),
        }
    }
}

/// Document tree configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// File name of the generated index document.
    pub index_file: String,
    /// Extension of text documents (without dot).
    pub primary_extension: String,
    /// Extension of diagram sources (without dot).
    pub diagram_extension: String,
    /// File name prefix of templates, which are never processed.
    pub template_prefix: String,
    /// Symbolic prefix used for links in the index.
    pub link_prefix: String,
    /// Words identifying the table-of-contents heading.
    pub toc_markers: TocMarkers,
    /// Ordered top-level categories.
    pub categories: Vec<Category>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            index_file: "INDEX.md".to_string(),
            primary_extension: "md".to_string(),
            diagram_extension: "pu".to_string(),
            template_prefix: "_template".to_string(),
            link_prefix: "@vibes/".to_string(),
            toc_markers: TocMarkers::default(),
            categories: Category::defaults(),
        }
    }
}

/// Heading titles that mark the table-of-contents section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocMarkers {
    /// Titles that match when equal after trimming.
    pub exact: Vec<String>,
    /// Substrings that match anywhere in the title.
    pub contains: Vec<String>,
}

impl TocMarkers {
    /// Check whether a heading title is a TOC marker.
    pub fn is_marker(&self, title: &str) -> bool {
        let title = title.trim();
        self.exact.iter().any(|m| m == title) || self.contains.iter().any(|m| title.contains(m.as_str()))
    }
}

impl Default for TocMarkers {
    fn default() -> Self {
        Self {
            exact: vec!["TOC".to_string()],
            contains: vec!["目次".to_string()],
        }
    }
}

/// A top-level document category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Directory name under the document root.
    pub name: String,
    /// Human readable description used as the index heading.
    pub description: String,
}

impl Category {
    fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    /// The default category order.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("rules", "Project conventions"),
            Self::new("apis", "External integration specs"),
            Self::new("specs", "System specifications"),
            Self::new("logics", "Business logic"),
            Self::new("tasks", "Development task guides"),
        ]
    }
}

/// Convention checking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConventionsConfig {
    /// Rule specification file, relative to the project root.
    pub rules_file: PathBuf,
    /// Directory for session marker files. `None` uses the OS temp dir.
    pub marker_dir: Option<PathBuf>,
    /// Context growth (in tokens) after which a marker expires.
    pub valid_until_token_increase: u64,
}

impl Default for ConventionsConfig {
    fn default() -> Self {
        Self {
            rules_file: PathBuf::from(".vibes/conventions.yaml"),
            marker_dir: None,
            valid_until_token_increase: 50_000,
        }
    }
}
