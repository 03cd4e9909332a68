use anyhow::Result;
use std::fmt::Write as _;

use crate::cli::OutputFormat;
use crate::model::{Report, RunStatus};
use crate::report::summary_line;
use crate::util::format_hours;

pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
  match format {
    OutputFormat::Text => Ok(render_text(report)),
    OutputFormat::Json => render_json(report),
  }
}

pub fn render_json(report: &Report) -> Result<String> {
  let mut s = serde_json::to_string_pretty(report)?;
  s.push('\n');
  Ok(s)
}

fn status_message(report: &Report) -> Option<&'static str> {
  match report.status {
    RunStatus::Complete => None,
    RunStatus::NoRepositories => Some("No Git repositories found under the scan root."),
    RunStatus::NoMatchingCommits => Some("No commits in the window reference an issue (`key: description`)."),
  }
}

pub fn render_text(report: &Report) -> String {
  let mut out = String::new();

  let _ = writeln!(
    out,
    "Hours report for {} since {} ({} days, {}h budget)",
    report.author,
    report.window.since,
    report.window.days,
    format_hours(report.total_hours, report.min_unit)
  );
  let _ = writeln!(
    out,
    "{} repositories, {} matching commits",
    report.repositories, report.commits_matched
  );

  if let Some(msg) = status_message(report) {
    let _ = writeln!(out, "\n{}", msg);
    return out;
  }

  out.push_str("\nSummary\n");
  if report.entries.is_empty() {
    out.push_str("  (no issues resolved)\n");
  }
  for e in &report.entries {
    let _ = writeln!(out, "{}", summary_line(e, report.min_unit));
  }

  if !report.details.is_empty() {
    out.push_str("\nDetails\n");
    for d in &report.details {
      let _ = writeln!(out, "- {}", d.content);
      let _ = writeln!(out, "  contacts: {}", d.contacts);
      let _ = writeln!(out, "  time: {}", d.time);
      if let Some(p) = &d.priority {
        let _ = writeln!(out, "  priority: {}", p);
      }
      let _ = writeln!(out, "  description: {}", d.description);
    }
  }

  if !report.unresolved.is_empty() {
    out.push_str("\nUnresolved (not found in tracker)\n");
    for key in &report.unresolved {
      let _ = writeln!(out, "- {}", key);
    }
  }

  out
}
