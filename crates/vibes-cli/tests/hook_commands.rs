mod common;

use common::{json, OutputAssertions, TestContext};
use predicates::prelude::*;

const RULES: &str = r#"
rules:
  - name: Design Doc
    patterns: ["**/design.pu"]
    convention_doc: "@vibes/rules/design.md"
    severity: block
    message: Follow the design conventions
  - name: Presenter
    patterns: ["app/presenters/**/*.rb"]
    convention_doc: "@vibes/rules/presenter.md"
    severity: warn
    message: Presenters stay thin
"#;

fn configured() -> TestContext {
    let ctx = TestContext::new().with_rules(RULES);
    let markers = ctx.path().join("markers");
    ctx.write(
        ".vibes/config.yaml",
        &format!("conventions:\n  marker_dir: {}\n", markers.display()),
    );
    ctx
}

#[test]
fn check_reports_matching_rule() {
    let ctx = configured();
    ctx.command()
        .args(["hook", "check", "docs/specs/design.pu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Follow the design conventions"));

    ctx.command()
        .args(["hook", "check", "lib/other.rb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no convention applies"));
}

#[test]
fn check_json_relativizes_absolute_paths() {
    let ctx = configured();
    let absolute = ctx.path().join("app/presenters/user.rb");
    let output = ctx
        .command()
        .args(["--format", "json", "hook", "check"])
        .arg(&absolute)
        .output()
        .unwrap();
    output.assert_success();

    let value = json::parse_output(&output.stdout);
    assert_eq!(value["path"], "app/presenters/user.rb");
    assert_eq!(value["kind"], "warn");
    assert_eq!(value["rule_name"], "Presenter");
}

#[test]
fn rules_lists_in_order() {
    let ctx = configured();
    let output = ctx
        .command()
        .args(["--format", "json", "hook", "rules"])
        .output()
        .unwrap();
    output.assert_success();

    let rules = json::parse_output(&output.stdout);
    assert_eq!(rules[0]["name"], "Design Doc");
    assert_eq!(rules[0]["severity"], "block");
    assert_eq!(rules[1]["patterns"][0], "app/presenters/**/*.rb");
}

#[test]
fn run_blocks_once_per_session() {
    let ctx = configured();
    let payload = r#"{"session_id":"s1","hook_event_name":"PreToolUse","tool_name":"Write","tool_input":{"file_path":"docs/design.pu"}}"#;

    let output = ctx
        .command()
        .args(["hook", "run"])
        .write_stdin(payload)
        .output()
        .unwrap();
    output.assert_success();
    let response = json::parse_output(&output.stdout);
    assert_eq!(response["decision"], "block");
    assert_eq!(response["hookEventName"], "PreToolUse");
    assert_eq!(response["permissionDecision"], "deny");

    ctx.command()
        .args(["hook", "run"])
        .write_stdin(payload)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn run_ignores_invalid_input() {
    let ctx = configured();
    ctx.command()
        .args(["hook", "run"])
        .write_stdin("invalid json")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn run_survives_broken_config() {
    let ctx = TestContext::new().with_rules(RULES);
    ctx.write(".vibes/config.yaml", "document: [unclosed");

    ctx.command()
        .args(["hook", "run"])
        .write_stdin(r#"{"session_id":"s","tool_input":{"file_path":"lib/plain.rb"}}"#)
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());

    ctx.command()
        .args(["hook", "run", "--config", "missing.yaml"])
        .write_stdin("{}")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());

    // Other commands still report the broken config.
    ctx.command().args(["hook", "rules"]).assert().failure();
}

#[test]
fn run_captures_raw_input() {
    let ctx = configured();
    ctx.command()
        .args(["hook", "run", "--capture", "captured"])
        .write_stdin("{}")
        .assert()
        .success();

    let captured = std::fs::read_dir(ctx.path().join("captured")).unwrap().count();
    assert_eq!(captured, 1);
}

#[test]
fn settings_add_list_remove() {
    let ctx = TestContext::new();

    ctx.command()
        .args(["hook", "add", "--event", "PreToolUse", "--matcher", "Edit|Write", "--command", "vibes hook run", "--timeout", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added PreToolUse hook"));

    ctx.command()
        .args(["hook", "add", "--event", "PreToolUse", "--matcher", "Edit|Write", "--command", "vibes hook run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already registered"));

    let output = ctx
        .command()
        .args(["--format", "json", "hook", "list"])
        .output()
        .unwrap();
    output.assert_success();
    let hooks = json::parse_output(&output.stdout);
    assert_eq!(hooks.as_array().unwrap().len(), 1);
    assert_eq!(hooks[0]["timeout"], 30);

    ctx.command()
        .args(["hook", "remove", "--event", "PreToolUse", "--matcher", "Edit|Write", "--command", "vibes hook run"])
        .assert()
        .success();
    ctx.command()
        .args(["hook", "remove", "--event", "PreToolUse", "--matcher", "Edit|Write", "--command", "vibes hook run"])
        .assert()
        .code(6);
}

#[test]
fn settings_local_import_and_clear() {
    let ctx = TestContext::new();
    ctx.write(
        "shared.json",
        r#"{"hooks":{"Stop":[{"matcher":"","hooks":[{"type":"command","command":"notify"}]}]}}"#,
    );

    ctx.command()
        .args(["hook", "import", "shared.json", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 hooks"));
    assert!(ctx.read(".claude/settings.local.json").contains("notify"));

    ctx.command()
        .args(["hook", "clear", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 hooks"));
}

#[test]
fn unknown_event_is_a_usage_error() {
    let ctx = TestContext::new();
    ctx.command()
        .args(["hook", "list", "--event", "Later"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown hook event"));
}

#[test]
fn menu_quits_on_selection() {
    let ctx = TestContext::new();
    let output = ctx.command().arg("menu").write_stdin("10\n").output().unwrap();
    output.assert_success();
    output.assert_stdout_contains("Update all TOCs");
}
