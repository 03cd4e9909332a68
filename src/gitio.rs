use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::util::run_git;

/// Subject lines of commits by `author` since `since` (any Git approxidate) in `repo`.
pub fn commit_subjects(repo: &Path, author: &str, since: &str) -> Result<Vec<String>> {
  let args: Vec<String> = vec![
    "-c".into(),
    "log.showSignature=false".into(),
    "log".into(),
    format!("--since={}", since),
    format!("--author={}", author),
    "--pretty=format:%s".into(),
  ];
  let out = run_git(repo, &args)?;

  Ok(
    out
      .lines()
      .map(|l| l.trim_end_matches('\r'))
      .filter(|l| !l.trim().is_empty())
      .map(String::from)
      .collect(),
  )
}

/// Collect subjects from every repository in parallel, concatenated in repository order.
///
/// A repository whose `git log` fails contributes nothing.
pub fn collect_subjects(repos: &[PathBuf], author: &str, since: &str) -> Vec<String> {
  let per_repo: Vec<Vec<String>> = repos
    .par_iter()
    .map(|repo| match commit_subjects(repo, author, since) {
      Ok(lines) => {
        if lines.is_empty() {
          info!(repo = %repo.display(), "no commits in window");
        } else {
          info!(repo = %repo.display(), commits = lines.len(), "collected commit subjects");
        }
        lines
      }
      Err(err) => {
        warn!(repo = %repo.display(), error = %format!("{:#}", err), "skipping repository");
        Vec::new()
      }
    })
    .collect();

  per_repo.into_iter().flatten().collect()
}
