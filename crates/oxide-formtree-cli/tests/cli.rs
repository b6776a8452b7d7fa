//! Runs the `formtree` binary against definition files.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use serde_json::json;

fn write_json(dir: &TempDir, name: &str, value: &serde_json::Value) -> String {
    let file = dir.child(name);
    file.write_str(&serde_json::to_string_pretty(value).unwrap())
        .unwrap();
    file.path().display().to_string()
}

fn formtree() -> Command {
    Command::cargo_bin("formtree").unwrap()
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

fn stderr_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

fn signup(dir: &TempDir) -> String {
    write_json(
        dir,
        "signup.json",
        &json!({
            "id": "signup",
            "elements": [
                {"type": "text", "name": "user", "id": "user", "label": "User",
                 "rules": [{"type": "required", "message": "Pick a user name"},
                           {"type": "minlength", "message": "Too short", "config": {"min": 3}}]},
                {"type": "select", "name": "plan", "label": "Plan",
                 "options": {"free": "Free", "pro": "Pro"}},
                {"type": "submit", "name": "go", "attributes": {"value": "Sign up"}}
            ]
        }),
    )
}

#[test]
fn test_validate_reports_errors_and_exit_status() {
    let dir = TempDir::new().unwrap();
    let def = signup(&dir);
    let bad = write_json(&dir, "bad.json", &json!({"user": "ab", "plan": "pro"}));
    let good = write_json(&dir, "good.json", &json!({"user": "ann", "plan": "pro"}));

    let assert = formtree()
        .args(["validate", def.as_str(), "--data", bad.as_str()])
        .assert()
        .failure()
        .code(1);
    let stdout = stdout_of(&assert);
    assert!(stdout.starts_with("invalid"));
    assert!(stdout.contains("user: Too short"));

    let assert = formtree()
        .args(["validate", def.as_str(), "--data", good.as_str()])
        .assert()
        .success();
    let stdout = stdout_of(&assert);
    assert!(stdout.starts_with("valid"));
    assert!(stdout.contains(r#""plan": "pro""#));
}

#[test]
fn test_render_html_and_json() {
    let dir = TempDir::new().unwrap();
    let def = signup(&dir);
    let data = write_json(&dir, "data.json", &json!({"user": "", "plan": "free"}));

    let assert = formtree()
        .args(["render", def.as_str(), "--data", data.as_str()])
        .assert()
        .success();
    let html = stdout_of(&assert);
    assert!(html.contains("<form"));
    assert!(html.contains(r#"<label for="user">User</label>"#));
    assert!(html.contains("Pick a user name"));
    assert!(html.contains(r#"<option value="free" selected="selected">Free</option>"#));

    let assert = formtree()
        .args(["render", def.as_str(), "--format", "json"])
        .assert()
        .success();
    let array: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(array["id"], "signup");
    assert_eq!(array["elements"][0]["type"], "text");
    assert_eq!(array["elements"][1]["name"], "plan");
}

#[test]
fn test_broken_definitions_fail_with_context() {
    let dir = TempDir::new().unwrap();
    let def = write_json(
        &dir,
        "broken.json",
        &json!({"id": "x", "elements": [{"type": "slider", "name": "s"}]}),
    );
    let assert = formtree().args(["render", def.as_str()]).assert().failure();
    let stderr = stderr_of(&assert);
    assert!(stderr.contains("cannot build form"));
    assert!(stderr.contains("slider"));

    let missing = dir.child("missing.json");
    let missing = missing.path().display().to_string();
    let assert = formtree().args(["render", missing.as_str()]).assert().failure();
    assert!(stderr_of(&assert).contains("failed to read"));
}
