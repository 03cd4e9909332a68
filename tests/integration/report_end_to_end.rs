use predicates::prelude::*;
use test_support::{cmd_bin, Issues, Workspace, AUTHOR};

const ISSUES_ENV: &str = "GHR_TEST_ISSUES_JSON";

fn json_report(ws: &Workspace, issues: &str, extra: &[&str]) -> serde_json::Value {
  let out = cmd_bin()
    .arg("--root")
    .arg(ws.path())
    .args(["--author", AUTHOR, "--format", "json"])
    .args(extra)
    .env(ISSUES_ENV, issues)
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn splits_budget_across_repositories_by_commit_count() {
  let ws = Workspace::new();
  ws.repo("api").commits(&["abc: x", "abc: x", "Merge branch 'main'"]);
  ws.repo("web").commits(&["abc: x", "def: y"]);

  let issues = Issues::new()
    .issue("abc: x", "Login page", &["Reporter Rae", "Jo Dev", "Dana"])
    .issue("def: y", "Logout", &["Jo Dev"])
    .to_json();
  let v = json_report(&ws, &issues, &["--self-name", "Jo Dev"]);

  assert_eq!(v["status"], "complete");
  assert_eq!(v["repositories"], 2);
  assert_eq!(v["commits_matched"], 4);

  let entries = v["entries"].as_array().unwrap();
  assert_eq!(entries.len(), 2);
  let abc = entries.iter().find(|e| e["key"] == "abc: x").unwrap();
  let def = entries.iter().find(|e| e["key"] == "def: y").unwrap();
  assert_eq!(abc["hours"], 60.0);
  assert_eq!(def["hours"], 20.0);
  assert_eq!(abc["contacts"], serde_json::json!(["Reporter Rae", "Dana"]));
  assert_eq!(def["contacts"], serde_json::json!([]));
  assert_eq!(def["description"], "----");
  assert!(v["unresolved"].as_array().unwrap().is_empty());
}

#[test]
fn unresolved_keys_are_listed_and_excluded_from_allocation() {
  let ws = Workspace::new();
  ws.repo("svc").commits(&["abc: x", "abc: x", "abc: x", "def: y"]);

  let issues = Issues::new().issue("abc: x", "Login page", &["Reporter Rae"]).to_json();
  let v = json_report(&ws, &issues, &[]);

  let entries = v["entries"].as_array().unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0]["key"], "abc: x");
  assert_eq!(entries[0]["hours"], 80.0);
  assert_eq!(v["unresolved"], serde_json::json!(["def: y"]));
}

#[test]
fn prefix_grouping_merges_subjects_by_key() {
  let ws = Workspace::new();
  ws.repo("svc").commits(&["abc: one", "abc: two", "def: three"]);

  let issues = Issues::new().issue("abc", "Auth", &["R"]).issue("def", "Docs", &["R"]).to_json();
  let v = json_report(&ws, &issues, &["--group-by", "prefix", "--total-hours", "30", "--min-unit", "0.5"]);

  let entries = v["entries"].as_array().unwrap();
  let abc = entries.iter().find(|e| e["key"] == "abc").unwrap();
  assert_eq!(abc["commits"], 2);
  assert_eq!(abc["hours"], 20.0);
}

#[test]
fn commits_outside_window_or_by_others_are_ignored() {
  let ws = Workspace::new();
  ws.repo("svc")
    .commit_at("old: ancient", "2020-01-01T10:00:00")
    .commit_as("Someone Else", "other: theirs")
    .commits(&["abc: x"]);

  let issues = Issues::new()
    .issue("abc: x", "Login", &["R"])
    .issue("old: ancient", "Old", &["R"])
    .to_json();
  let v = json_report(&ws, &issues, &["--days", "7"]);

  assert_eq!(v["commits_matched"], 1);
  assert_eq!(v["entries"][0]["key"], "abc: x");
}

#[test]
fn repositories_inside_dependency_caches_are_skipped() {
  let ws = Workspace::new();
  ws.repo("app").commits(&["abc: x"]);
  ws.repo("app/node_modules/lib").commits(&["vendored: change"]);

  let issues = Issues::new()
    .issue("abc: x", "Login", &["R"])
    .issue("vendored: change", "Lib", &["R"])
    .to_json();
  let v = json_report(&ws, &issues, &[]);

  assert_eq!(v["repositories"], 1);
  assert_eq!(v["entries"].as_array().unwrap().len(), 1);
}

#[test]
fn empty_root_reports_no_repositories() {
  let ws = Workspace::new();
  let v = json_report(&ws, "{}", &[]);
  assert_eq!(v["status"], "no_repositories");
  assert!(v["entries"].as_array().unwrap().is_empty());
}

#[test]
fn text_output_lists_summary_and_unresolved() {
  let ws = Workspace::new();
  ws.repo("svc").commits(&["abc: x", "def: y", "not an issue"]);

  let issues = Issues::new().issue("abc: x", "Login page", &["Reporter Rae"]).to_json();
  cmd_bin()
    .arg("--root")
    .arg(ws.path())
    .args(["--author", AUTHOR])
    .env(ISSUES_ENV, issues)
    .assert()
    .success()
    .stdout(predicate::str::contains(
      "abc: x  Login page   contacts: Reporter Rae      hours: 80h",
    ))
    .stdout(predicate::str::contains("Unresolved (not found in tracker)"))
    .stdout(predicate::str::contains("- def: y"));
}

#[test]
fn writes_report_to_file_creating_parent_dirs() {
  let ws = Workspace::new();
  ws.repo("svc").commits(&["abc: x"]);
  let out = ws.path().join("reports/nested/hours.json");

  cmd_bin()
    .arg("--root")
    .arg(ws.path())
    .args(["--author", AUTHOR, "--format", "json", "--out"])
    .arg(&out)
    .env(ISSUES_ENV, Issues::new().issue("abc: x", "Login", &["R"]).to_json())
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  let v: serde_json::Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
  assert_eq!(v["entries"][0]["hours"], 80.0);
}

#[test]
fn author_can_come_from_environment() {
  let ws = Workspace::new();
  ws.repo("svc").commits(&["abc: x"]);

  cmd_bin()
    .arg("--root")
    .arg(ws.path())
    .args(["--format", "json"])
    .env("GHR_AUTHOR", AUTHOR)
    .env(ISSUES_ENV, Issues::new().issue("abc: x", "Login", &["R"]).to_json())
    .assert()
    .success()
    .stdout(predicate::str::contains("\"status\": \"complete\""));
}
