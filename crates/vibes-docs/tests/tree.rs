use std::fs;
use std::path::Path;
use vibes_common_config::{DocumentConfig, TocMarkers};
use vibes_docs::{DocumentGenerator, ReferenceChecker, TocUpdater, UpdateStatus};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn generate_then_update_fills_toc() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "rules/_template.md",
        "# [TODO: title]\n\n## TOC\n\n## Rules\n- one\n\n## Examples\ncode\n",
    );

    let generator = DocumentGenerator::new(dir.path(), "md");
    let path = generator.generate("rules", "naming", Some("Naming")).unwrap();

    let updater = TocUpdater::default();
    let result = updater.update_file(&path);
    assert_eq!(result.status, UpdateStatus::Updated { headings_count: 3 });

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("## TOC\n- [Naming](#naming) (L1-L9)\n  - [Rules](#rules) (L5-L6)\n  - [Examples](#examples) (L8-L9)\n## Rules"));
}

#[test]
fn custom_markers_drive_detection() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.md", "## Contents\n\n# A\n");
    write(dir.path(), "b.md", "## TOC\n\n# B\n");

    let config = DocumentConfig {
        toc_markers: TocMarkers {
            exact: vec!["Contents".to_string()],
            contains: vec![],
        },
        ..DocumentConfig::default()
    };
    let updater = TocUpdater::new(config);

    assert!(matches!(updater.update_file(&dir.path().join("a.md")).status, UpdateStatus::Updated { .. }));
    assert!(updater.update_file(&dir.path().join("b.md")).is_skipped());
}

#[test]
fn whole_tree_update_writes_index_and_tocs() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "specs/01_core/engine.md", "# Engine\n\n## TOC\n\n## Design\ntext\n");
    write(dir.path(), "specs/flow.pu", "@startuml Request Flow\n@enduml\n");

    let report = TocUpdater::default().update_all(dir.path()).unwrap();
    assert!(report.success);
    assert_eq!(report.summary.failed, 0);

    let index = fs::read_to_string(dir.path().join("INDEX.md")).unwrap();
    assert!(index.contains("### specs - System specifications\n- [Request Flow](@vibes/specs/flow.pu) 🔷\n- **core**\n  - [Engine](@vibes/specs/01_core/engine.md)\n"));

    let engine = fs::read_to_string(dir.path().join("specs/01_core/engine.md")).unwrap();
    assert!(engine.contains("- [Engine](#engine) (L1-L6)\n  - [Design](#design) (L5-L6)"));
}

#[test]
fn updated_tree_has_no_broken_references() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "rules/naming.md", "# Naming\n\n## TOC\n\n## Files\nsee [engine](@vibes/specs/engine.md#design)\n");
    write(dir.path(), "specs/engine.md", "# Engine\n\n## TOC\n\n## Design\nback to [naming](../rules/naming.md#files)\n");
    write(dir.path(), "specs/flow.pu", "@startuml Request Flow\n@enduml\n");

    TocUpdater::default().update_all(dir.path()).unwrap();
    let batch = ReferenceChecker::new(DocumentConfig::default(), dir.path()).check_all().unwrap();

    assert!(batch.success, "{batch:?}");
    assert_eq!(batch.warnings, 0);
    // INDEX.md, naming.md and engine.md
    assert_eq!(batch.results.len(), 3);

    fs::remove_file(dir.path().join("specs/flow.pu")).unwrap();
    let batch = ReferenceChecker::new(DocumentConfig::default(), dir.path()).check_all().unwrap();
    assert!(!batch.success);
    assert_eq!(batch.errors, 1);
    assert!(batch.results[0].file.ends_with("INDEX.md"));
}
