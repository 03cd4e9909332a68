// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the report model (issue records, report entries, run report) shared by the pipeline and rendering
// role: model/types
// outputs: Serializable structs with stable field names; optional fields skipped when absent
// invariants: IssueRecord is immutable once fetched; Report.entries and Report.unresolved are disjoint by key
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

/// Issue metadata as returned by the tracker for one issue key.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct IssueRecord {
  pub title: String,
  /// Reporter first, then any additional linked users.
  pub linked_users: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReportEntry {
  pub key: String,
  pub title: String,
  pub contacts: Vec<String>,
  pub commits: u64,
  pub hours: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority: Option<String>,
  pub description: String,
}

/// Flattened, display-ready record for one entry (the "detailed report" shape).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EntryDetail {
  pub content: String,
  pub contacts: String,
  pub time: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority: Option<String>,
  pub description: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
  Complete,
  NoRepositories,
  NoMatchingCommits,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReportWindow {
  pub days: u32,
  pub since: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Report {
  pub generated_at: String,
  pub author: String,
  pub window: ReportWindow,
  pub total_hours: f64,
  pub min_unit: f64,
  pub repositories: usize,
  pub commits_matched: u64,
  pub status: RunStatus,
  pub entries: Vec<ReportEntry>,
  pub details: Vec<EntryDetail>,
  pub unresolved: Vec<String>,
}

impl Report {
  pub fn allocated_hours(&self) -> f64 {
    self.entries.iter().map(|e| e.hours).sum()
  }
}
