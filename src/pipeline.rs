// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one report run: discover repos, collect subjects, tally, fetch issues, allocate, assemble
// role: processing/orchestrator
// inputs: EffectiveConfig; an IssueTracker backend
// outputs: Report (entries, details, unresolved keys, status)
// side_effects: Reads the filesystem and runs git; network calls through the tracker
// invariants:
// - hours are allocated over resolved keys only; resolved hours sum to total_hours
// - zero repositories / zero matching commits produce an empty report with a status, never an error
// - per-repository and per-issue failures never abort the run
// errors: Only configuration errors (now override, allocation preconditions) propagate
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::allocate::allocate;
use crate::cli::EffectiveConfig;
use crate::discover::discover_repos;
use crate::gitio::collect_subjects;
use crate::model::{IssueRecord, Report, ReportWindow, RunStatus};
use crate::parser::CommitTally;
use crate::report::{assemble, detail_record, Assembled};
use crate::tracker::{fetch_all, IssueTracker};
use crate::util;

/// Allocate `total_hours` over the keys that resolved, then assemble entries.
pub fn summarize(
  tally: &CommitTally,
  fetched: &[Option<IssueRecord>],
  total_hours: f64,
  min_unit: f64,
  self_name: &str,
) -> Result<Assembled> {
  let weights = tally
    .iter()
    .zip(fetched.iter())
    .filter(|(_, record)| record.is_some())
    .map(|(e, _)| (e.key.as_str(), e.count));

  let allocation = allocate(weights, total_hours, min_unit)?;

  if allocation.is_empty() {
    warn!("no issue resolved; no hours allocated");
  }
  for (key, hours) in allocation.iter() {
    debug!(key, hours, "allocated");
  }
  debug!(keys = allocation.len(), hours = allocation.total(), "allocation complete");

  Ok(assemble(tally, fetched, &allocation, self_name))
}

pub fn run(cfg: &EffectiveConfig, tracker: &dyn IssueTracker) -> Result<Report> {
  let now = util::effective_now(util::parse_now(cfg.now_override.as_deref())?);
  let since = (now - chrono::Duration::days(i64::from(cfg.days)))
    .format("%Y-%m-%dT%H:%M:%S")
    .to_string();

  let mut report = Report {
    generated_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
    author: cfg.author.clone(),
    window: ReportWindow {
      days: cfg.days,
      since: since.clone(),
    },
    total_hours: cfg.total_hours,
    min_unit: cfg.min_unit,
    repositories: 0,
    commits_matched: 0,
    status: RunStatus::Complete,
    entries: Vec::new(),
    details: Vec::new(),
    unresolved: Vec::new(),
  };

  // Phase 1: discover repositories
  let repos = discover_repos(Path::new(&cfg.root));
  report.repositories = repos.len();

  if repos.is_empty() {
    warn!(root = %cfg.root, "no git repositories found");
    report.status = RunStatus::NoRepositories;
    return Ok(report);
  }
  info!(repositories = repos.len(), days = cfg.days, "collecting commit subjects");

  // Phase 2: collect subjects and tally issue references
  let subjects = collect_subjects(&repos, &cfg.author, &since);
  let tally = CommitTally::from_lines(&subjects, cfg.group_by);
  report.commits_matched = tally.total_commits();

  if tally.is_empty() {
    warn!(
      subjects = subjects.len(),
      "no commit subjects follow the `key: description` convention"
    );
    report.status = RunStatus::NoMatchingCommits;
    return Ok(report);
  }

  for entry in tally.iter() {
    debug!(key = %entry.key, commits = entry.count, "issue reference");
  }
  info!(issues = tally.len(), commits = tally.total_commits(), "fetching issue details");

  // Phase 3: fetch issue details (all settle before allocation)
  let keys = tally.keys();
  let fetched = fetch_all(tracker, &keys, cfg.fetch_parallelism);

  // Phase 4: allocate over resolved keys and assemble
  let assembled = summarize(&tally, &fetched, cfg.total_hours, cfg.min_unit, &cfg.self_name)?;

  info!(resolved = assembled.resolved.len(), "issues resolved");
  if !assembled.unresolved.is_empty() {
    warn!(unresolved = ?assembled.unresolved, "issues not found in tracker");
  }

  report.details = assembled
    .resolved
    .iter()
    .map(|e| detail_record(e, cfg.min_unit))
    .collect();
  report.entries = assembled.resolved;
  report.unresolved = assembled.unresolved;
  info!(entries = report.entries.len(), hours = report.allocated_hours(), "report assembled");

  Ok(report)
}
