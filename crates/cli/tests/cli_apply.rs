use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const SOLUTION: &str = r#"{
  "name": "Shop",
  "projects": [
    {"id": "libs", "kind": "folder"},
    {"id": "core", "name": "Shop.Core", "parent": "libs"},
    {"id": "common", "name": "Shop.Common", "kind": "shared_project", "parent": "libs"},
    {"id": "api", "name": "Shop.Api", "dependencies": ["core", "common"]},
    {"id": "web", "name": "Web.Frontend", "loaded": true},
    {"id": "tests", "name": "Shop.Tests", "loaded": true, "dependencies": ["api"]}
  ]
}"#;

fn setup() -> (TempDir, PathBuf) {
    let temp = tempdir().unwrap();
    let path = temp.path().join("shop.json");
    fs::write(&path, SOLUTION).unwrap();
    (temp, path)
}

#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("project-filter").expect("binary");
    cmd.env_remove("PROJECT_FILTER_LOAD_DEPENDENCIES")
        .env_remove("PROJECT_FILTER_EXPAND_LOADED");
    cmd
}

fn run_json(solution: &Path, args: &[&str]) -> Value {
    let output = cli()
        .arg("apply")
        .arg(solution)
        .args(args)
        .arg("--json")
        .output()
        .expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn loaded(body: &Value) -> Vec<String> {
    body["projects"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["loaded"] == true)
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn apply_loads_dependencies_by_default() {
    let (_temp, solution) = setup();
    let body = run_json(&solution, &["--load", "api"]);

    assert_eq!(body["solution"], "Shop");
    assert_eq!(
        body["report"]["loaded"],
        serde_json::json!(["api", "core", "common"])
    );
    assert_eq!(body["report"]["cancelled"], false);
    assert_eq!(loaded(&body), vec!["core", "common", "api", "web", "tests"]);
}

#[test]
fn no_deps_loads_only_the_request() {
    let (_temp, solution) = setup();
    let body = run_json(&solution, &["--load", "api", "--no-deps"]);
    assert_eq!(body["report"]["loaded"], serde_json::json!(["api"]));
}

#[test]
fn env_default_is_overridden_by_flag() {
    let (_temp, solution) = setup();
    let output = cli()
        .env("PROJECT_FILTER_LOAD_DEPENDENCIES", "off")
        .args(["apply", solution.to_str().unwrap(), "--load", "api", "--json"])
        .output()
        .unwrap();
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["report"]["loaded"], serde_json::json!(["api"]));

    let output = cli()
        .env("PROJECT_FILTER_LOAD_DEPENDENCIES", "off")
        .args(["apply", solution.to_str().unwrap(), "--load", "api", "--deps", "--json"])
        .output()
        .unwrap();
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        body["report"]["loaded"],
        serde_json::json!(["api", "core", "common"])
    );
}

#[test]
fn unload_matching_uses_fuzzy_names() {
    let (_temp, solution) = setup();
    let body = run_json(&solution, &["--unload-matching", "frontend"]);
    assert_eq!(body["report"]["unloaded"], serde_json::json!(["web"]));
    assert_eq!(loaded(&body), vec!["tests"]);
}

#[test]
fn only_keeps_exactly_the_selection() {
    let (_temp, solution) = setup();
    let body = run_json(&solution, &["--only", "core,web", "--no-deps"]);
    assert_eq!(body["report"]["loaded"], serde_json::json!(["core"]));
    assert_eq!(body["report"]["unloaded"], serde_json::json!(["tests"]));
    assert_eq!(loaded(&body), vec!["core", "web"]);
}

#[test]
fn save_persists_load_state() {
    let (_temp, solution) = setup();
    run_json(&solution, &["--load", "core", "--unload", "web", "--save"]);

    let output = cli()
        .args(["tree", solution.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let entries: Value = serde_json::from_slice(&output.stdout).unwrap();
    let loaded: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["loaded"] == true)
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(loaded, vec!["core", "tests"]);
}

#[test]
fn empty_request_reports_nothing_to_do() {
    let (_temp, solution) = setup();
    cli()
        .args(["apply", solution.to_str().unwrap(), "--quiet"])
        .assert()
        .success()
        .stdout(contains("Nothing to do"))
        .stdout(contains("[x] Web.Frontend"));
}

#[test]
fn invalid_solution_fails_with_context() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(
        &path,
        r#"{"projects":[{"id":"a","dependencies":["missing"]}]}"#,
    )
    .unwrap();

    cli()
        .args(["apply", path.to_str().unwrap(), "--load", "a"])
        .assert()
        .failure()
        .stderr(contains("Invalid solution"));
}
