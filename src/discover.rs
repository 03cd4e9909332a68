// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Find Git repositories under a root directory
// role: discovery
// inputs: root directory
// outputs: repository paths in file-name-sorted walk order
// side_effects: Reads directory entries
// invariants:
// - a directory holding a `.git` entry (dir or file) is a repository; the walk does not descend into it
// - dependency caches (node_modules etc.) are never entered
// errors: Unreadable entries are logged and skipped; the walk continues with siblings
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

const DEPENDENCY_CACHES: &[&str] = &["node_modules", "bower_components", ".pnpm-store", ".yarn"];

fn is_dependency_cache(name: &OsStr) -> bool {
  name.to_str().map(|n| DEPENDENCY_CACHES.contains(&n)).unwrap_or(false)
}

pub fn discover_repos(root: &Path) -> Vec<PathBuf> {
  let mut repos = Vec::new();
  let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name().into_iter();

  while let Some(next) = walker.next() {
    let entry = match next {
      Ok(e) => e,
      Err(err) => {
        warn!(path = ?err.path(), error = %err, "skipping unreadable entry");
        continue;
      }
    };

    if !entry.file_type().is_dir() {
      continue;
    }

    if entry.depth() > 0 && is_dependency_cache(entry.file_name()) {
      debug!(path = %entry.path().display(), "pruning dependency cache");
      walker.skip_current_dir();
      continue;
    }

    if entry.path().join(".git").exists() {
      debug!(repo = %entry.path().display(), "found repository");
      repos.push(entry.path().to_path_buf());
      walker.skip_current_dir();
    }
  }

  repos
}
