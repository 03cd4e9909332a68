// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Filter commit subjects to the "key: description" convention and tally occurrences per issue key
// role: parsing/aggregation
// inputs: raw commit subject lines (all repositories, all commits in the window); grouping mode
// outputs: CommitTally in first-observed key order
// invariants:
// - only lines matching ^[a-z]+:\s.+$ are counted; everything else is dropped silently
// - counts are exact and >= 1; keys are unique
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use clap::ValueEnum;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static ISSUE_LINE: Lazy<regex::Regex> = Lazy::new(|| regex::Regex::new(r"^([a-z]+):\s.+$").unwrap());

/// What part of a matching subject line identifies the issue.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum GroupBy {
  /// The whole subject line is the key; commits only group when subjects are identical.
  #[default]
  Line,
  /// Only the lowercase identifier before the colon is the key.
  Prefix,
}

/// Return the issue key for a subject line, or None when the line does not follow the convention.
pub fn issue_key(line: &str, group_by: GroupBy) -> Option<String> {
  let line = line.trim_end_matches('\r');
  let caps = ISSUE_LINE.captures(line)?;

  match group_by {
    GroupBy::Line => Some(line.to_string()),
    GroupBy::Prefix => caps.get(1).map(|m| m.as_str().to_string()),
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyEntry {
  pub key: String,
  pub count: u64,
}

/// Commit counts per issue key, iterated in the order keys were first seen.
#[derive(Debug, Clone, Default)]
pub struct CommitTally {
  entries: Vec<TallyEntry>,
  index: HashMap<String, usize>,
}

impl CommitTally {
  pub fn from_lines<I, S>(lines: I, group_by: GroupBy) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut tally = Self::default();

    for line in lines {
      if let Some(key) = issue_key(line.as_ref(), group_by) {
        tally.record(key);
      }
    }

    tally
  }

  pub fn record(&mut self, key: String) {
    if let Some(&i) = self.index.get(&key) {
      self.entries[i].count += 1;
      return;
    }

    self.index.insert(key.clone(), self.entries.len());
    self.entries.push(TallyEntry { key, count: 1 });
  }

  pub fn iter(&self) -> impl Iterator<Item = &TallyEntry> {
    self.entries.iter()
  }

  pub fn keys(&self) -> Vec<&str> {
    self.entries.iter().map(|e| e.key.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Number of matching commits across all keys.
  pub fn total_commits(&self) -> u64 {
    self.entries.iter().map(|e| e.count).sum()
  }
}
