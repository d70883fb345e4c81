//! Configuration types for vibes.
//!
//! This crate provides the configuration types used by the vibes
//! toolset for `.vibes/config.yaml` files, and the loader that reads them.

pub mod env;
pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_sensible_values() {
        let config = VibesConfig::default();

        assert_eq!(config.system.doc_root, std::path::PathBuf::from("docs"));
        assert_eq!(config.document.index_file, "INDEX.md");
        assert_eq!(config.document.link_prefix, "@vibes/");
        let names: Vec<_> = config.document.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["rules", "apis", "specs", "logics", "tasks"]);
        assert_eq!(config.conventions.valid_until_token_increase, 50_000);
        assert!(config.conventions.marker_dir.is_none());
    }

    #[test]
    fn test_partial_configs_merge_with_defaults() {
        let config: VibesConfig = serde_yaml::from_str("document:\n  index_file: README.md\n").unwrap();
        assert_eq!(config.document.index_file, "README.md");
        assert_eq!(config.document.diagram_extension, "pu");
        assert_eq!(config.system.claude_dir, std::path::PathBuf::from(".claude"));
    }

    #[test]
    fn test_toc_markers() {
        let markers = TocMarkers::default();
        assert!(markers.is_marker("TOC"));
        assert!(markers.is_marker(" TOC "));
        assert!(markers.is_marker("目次 (auto)"));
        assert!(!markers.is_marker("TOC notes"));
        assert!(!markers.is_marker("Intro"));
    }

    #[test]
    fn test_marker_dir_defaults_to_temp() {
        let config = VibesConfig::default();
        assert_eq!(config.marker_dir(std::path::Path::new("/p")), std::env::temp_dir());
        assert_eq!(
            config.rules_file(std::path::Path::new("/p")),
            std::path::PathBuf::from("/p/.vibes/conventions.yaml")
        );
    }
}
