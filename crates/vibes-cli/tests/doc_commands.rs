mod common;

use common::{json, OutputAssertions, TestContext};
use predicates::prelude::*;

#[test]
fn update_file_rewrites_toc() {
    let ctx = TestContext::new();
    ctx.write("docs/rules/a.md", "# Alpha\n\n## TOC\nstale\n\n## Usage\ntext\n");

    let output = ctx
        .command()
        .args(["doc", "update-file", "docs/rules/a.md"])
        .output()
        .unwrap();
    output.assert_success();
    output.assert_stdout_contains("Updated");

    let text = ctx.read("docs/rules/a.md");
    assert!(text.contains("- [Alpha](#alpha) (L1-L7)"));
    assert!(text.contains("  - [Usage](#usage) (L6-L7)"));
    assert!(!text.contains("stale"));
}

#[test]
fn update_file_missing_is_not_found() {
    let ctx = TestContext::new();
    ctx.command()
        .args(["doc", "update-file", "docs/none.md"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn update_all_quiet_prints_summary() {
    let ctx = TestContext::new();
    ctx.write("docs/rules/a.md", "# A\n\n## TOC\n\n## B\n");
    ctx.write("docs/specs/b.md", "# No toc here\n");

    ctx.command()
        .args(["-q", "doc", "update-all"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Updated ").and(predicate::str::contains("files")));

    let index = ctx.read("docs/INDEX.md");
    assert!(index.contains("### rules - Project conventions"));
    assert!(index.contains("[A](@vibes/rules/a.md)"));
    assert!(index.contains("[No toc here](@vibes/specs/b.md)"));
}

#[test]
fn update_all_json_report() {
    let ctx = TestContext::new();
    ctx.write("docs/rules/a.md", "# A\n\n## TOC\n\n## B\n");

    let output = ctx
        .command()
        .args(["--format", "json", "doc", "update-all"])
        .output()
        .unwrap();
    output.assert_success();

    let report = json::parse_output(&output.stdout);
    assert_eq!(report["success"], true);
    assert_eq!(report["summary"]["failed"], 0);
    assert!(report["results"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["status"] == "updated" && r["headings_count"] == 2));
}

#[test]
fn update_all_missing_root() {
    let ctx = TestContext::new();
    ctx.command().args(["doc", "update-all"]).assert().code(6);
}

#[test]
fn generate_from_template() {
    let ctx = TestContext::new();
    ctx.write("docs/specs/_template.md", "# [TODO: title]\n\n## TOC\n\n## Overview\n");

    ctx.command()
        .args(["doc", "generate", "--doc-type", "specs", "--filename", "billing", "--title", "Billing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let text = ctx.read("docs/specs/billing.md");
    assert!(text.starts_with("# Billing\n"));
    assert!(text.contains("  - [Overview](#overview)"));

    ctx.command()
        .args(["doc", "generate", "--doc-type", "specs", "--filename", "billing"])
        .assert()
        .code(5);
}

#[test]
fn generate_rejects_unknown_type() {
    let ctx = TestContext::new();
    ctx.command()
        .args(["doc", "generate", "--doc-type", "misc", "--filename", "x"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("unknown document type"));
}

#[test]
fn index_uses_configured_categories() {
    let ctx = TestContext::new();
    ctx.write(
        ".vibes/config.yaml",
        "document:\n  categories:\n    - { name: guides, description: How-to guides }\n",
    );
    ctx.write("docs/guides/01_setup/install.md", "# Install\n");
    ctx.write("docs/rules/ignored.md", "# Ignored\n");

    ctx.command().args(["doc", "index"]).assert().success();

    let index = ctx.read("docs/INDEX.md");
    assert!(index.contains("### guides - How-to guides"));
    assert!(index.contains("- **setup**"));
    assert!(index.contains("  - [Install](@vibes/guides/01_setup/install.md)"));
    assert!(!index.contains("Ignored"));
}

#[test]
fn check_file_reports_broken_links() {
    let ctx = TestContext::new();
    ctx.write("docs/rules/style.md", "# Style\n## Naming\n");
    ctx.write(
        "docs/rules/a.md",
        "# A\nsee [style](@vibes/rules/style.md#naming)\nand [gone](gone.md)\n",
    );

    let output = ctx
        .command()
        .args(["--format", "json", "doc", "check-file", "docs/rules/a.md"])
        .output()
        .unwrap();
    output.assert_exit_code(1);

    let report = json::parse_output(&output.stdout);
    assert_eq!(report["errors"].as_array().unwrap().len(), 1);
    assert_eq!(report["errors"][0]["line"], 3);
    assert_eq!(report["errors"][0]["target"], "gone.md");
    assert!(report["warnings"].as_array().unwrap().is_empty());

    ctx.command()
        .args(["doc", "check-file", "docs/rules/style.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no broken references"));
}

#[test]
fn check_all_fails_only_on_errors() {
    let ctx = TestContext::new();
    ctx.write("docs/rules/a.md", "# A\n[self](#missing-anchor)\n");

    ctx.command()
        .args(["doc", "check-all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Errors: 0  Warnings: 1"));

    ctx.write("docs/specs/b.md", "# B\n[a](../rules/nowhere.md)\n");
    ctx.command()
        .args(["-q", "doc", "check-all"])
        .assert()
        .code(1)
        .stdout("1 errors, 1 warnings\n");
}

#[test]
fn check_file_missing_is_not_found() {
    let ctx = TestContext::new();
    ctx.command()
        .args(["doc", "check-file", "docs/none.md"])
        .assert()
        .code(6);
}
