//! test-support: helpers for robust, nextest-friendly tests of `git-hours-report`.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support" }
//! ```
//!
//! Then in tests:
//! ```rust,ignore
//! use test_support::{cmd_bin, Workspace};
//!
//! #[test]
//! fn example() {
//!     let ws = Workspace::new();
//!     ws.repo("api").commits(&["abc: x"]);
//!     cmd_bin().arg("--root").arg(ws.path()).assert().success();
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const BIN: &str = "git-hours-report";
pub const AUTHOR: &str = "Jo Dev";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
  static INIT: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env()
      .or_else(|_| EnvFilter::try_new("warn,test=info"))
      .unwrap();
    // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
  });
  Lazy::force(&INIT);
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
  tempfile::tempdir().expect("create tempdir")
}

/// Set multiple environment variables for the duration of the returned guard.
pub fn with_env(vars: &[(&str, &str)]) -> EnvGuard {
  EnvGuard::set_many(vars)
}

/// The `git-hours-report` binary as a ready-to-run `assert_cmd::Command`.
///
/// The environment is scrubbed of `GHR_*` variables so a developer's shell
/// settings never leak into assertions.
pub fn cmd_bin() -> assert_cmd::Command {
  init_tracing();
  let mut cmd = assert_cmd::Command::cargo_bin(BIN).expect("binary target not found");
  for (k, _) in env::vars() {
    if k.starts_with("GHR_") {
      cmd.env_remove(k);
    }
  }
  cmd.env_remove("RUST_LOG");
  cmd
}

/// Builder for the issue double's JSON map (`GHR_TEST_ISSUES_JSON`), shaped like Jira's issue payload.
#[derive(Default)]
pub struct Issues {
  map: serde_json::Map<String, serde_json::Value>,
}

impl Issues {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add an issue; the first user is the reporter, the rest go in the contacts field.
  pub fn issue(mut self, key: &str, title: &str, users: &[&str]) -> Self {
    let reporter = users.first().copied().unwrap_or("Reporter");
    let linked: Vec<serde_json::Value> =
      users.iter().skip(1).map(|u| serde_json::json!({ "displayName": u })).collect();
    self.map.insert(
      key.to_string(),
      serde_json::json!({
        "fields": {
          "summary": title,
          "reporter": { "displayName": reporter },
          "customfield_10400": linked,
          "priority": { "name": "Major" },
        }
      }),
    );
    self
  }

  pub fn to_json(&self) -> String {
    serde_json::Value::Object(self.map.clone()).to_string()
  }
}

/// Guard for temporarily setting environment variables.
pub struct EnvGuard {
  prev: Vec<(String, Option<String>)>,
}

impl EnvGuard {
  pub fn set_many(kv: &[(&str, &str)]) -> Self {
    let mut prev = Vec::with_capacity(kv.len());
    for (k, v) in kv {
      prev.push((k.to_string(), env::var(k).ok()));
      env::set_var(k, v);
    }
    Self { prev }
  }
}

impl Drop for EnvGuard {
  fn drop(&mut self) {
    for (k, old) in self.prev.drain(..) {
      match old {
        Some(v) => env::set_var(&k, v),
        None => env::remove_var(&k),
      }
    }
  }
}

pub fn run(repo: &Path, args: &[&str]) {
  let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
  assert!(status.success(), "git {:?} failed", args);
}

/// A scan root holding any number of fixture repositories.
pub struct Workspace {
  dir: tempfile::TempDir,
}

impl Default for Workspace {
  fn default() -> Self {
    Self::new()
  }
}

impl Workspace {
  pub fn new() -> Self {
    Self { dir: tempdir() }
  }

  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  /// Initialize a repository at `rel` (created as needed) authored by [`AUTHOR`].
  pub fn repo(&self, rel: &str) -> FixtureRepo {
    FixtureRepo::init(self.dir.path().join(rel), AUTHOR)
  }
}

pub struct FixtureRepo {
  path: PathBuf,
}

impl FixtureRepo {
  pub fn init(path: PathBuf, author: &str) -> Self {
    std::fs::create_dir_all(&path).unwrap();
    run(&path, &["init", "-q"]);
    run(&path, &["config", "user.name", author]);
    run(&path, &["config", "user.email", "dev@example.com"]);
    run(&path, &["config", "commit.gpgsign", "false"]);
    Self { path }
  }

  /// Record one empty commit per subject, in order.
  pub fn commits(self, subjects: &[&str]) -> Self {
    for s in subjects {
      run(&self.path, &["commit", "-q", "--allow-empty", "-m", s]);
    }
    self
  }

  /// Record an empty commit with explicit author and committer dates.
  pub fn commit_at(self, subject: &str, date: &str) -> Self {
    let status = Command::new("git")
      .args(["commit", "-q", "--allow-empty", "-m", subject])
      .current_dir(&self.path)
      .env("GIT_AUTHOR_DATE", date)
      .env("GIT_COMMITTER_DATE", date)
      .status()
      .unwrap();
    assert!(status.success(), "git commit at {} failed", date);
    self
  }

  /// Record an empty commit under a different author identity.
  pub fn commit_as(self, name: &str, subject: &str) -> Self {
    let author = format!("{} <other@example.com>", name);
    run(&self.path, &["commit", "-q", "--allow-empty", "--author", author.as_str(), "-m", subject]);
    self
  }
}
