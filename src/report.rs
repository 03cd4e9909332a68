// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Join tally, fetched issue records and allocated hours into report entries; split resolved from unresolved
// role: report/assembly
// inputs: CommitTally; one Option<IssueRecord> per tally key (same order); Allocation; self display name
// outputs: resolved ReportEntry list and unresolved key list (tally order); summary lines; detail records
// invariants:
// - every tally key lands in exactly one of resolved/unresolved
// - contacts never contain an entry that includes the self name (case-sensitive substring)
// - missing hours default to 0; missing description becomes the placeholder
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::allocate::Allocation;
use crate::model::{EntryDetail, IssueRecord, ReportEntry};
use crate::parser::CommitTally;
use crate::util::format_hours;

pub const DESCRIPTION_PLACEHOLDER: &str = "----";
pub const CONTACTS_PLACEHOLDER: &str = "---";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Assembled {
  pub resolved: Vec<ReportEntry>,
  pub unresolved: Vec<String>,
}

/// Linked users other than the report author. An empty self name filters nothing.
pub fn contacts_for(linked_users: &[String], self_name: &str) -> Vec<String> {
  linked_users
    .iter()
    .filter(|u| self_name.is_empty() || !u.contains(self_name))
    .cloned()
    .collect()
}

pub fn assemble(
  tally: &CommitTally,
  fetched: &[Option<IssueRecord>],
  allocation: &Allocation,
  self_name: &str,
) -> Assembled {
  let mut out = Assembled::default();

  for (i, entry) in tally.iter().enumerate() {
    let Some(record) = fetched.get(i).and_then(|r| r.as_ref()) else {
      out.unresolved.push(entry.key.clone());
      continue;
    };

    out.resolved.push(ReportEntry {
      key: entry.key.clone(),
      title: record.title.clone(),
      contacts: contacts_for(&record.linked_users, self_name),
      commits: entry.count,
      hours: allocation.get(&entry.key).unwrap_or(0.0),
      priority: record.priority.clone(),
      description: record
        .description
        .clone()
        .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
    });
  }

  out
}

fn contacts_text(entry: &ReportEntry) -> String {
  if entry.contacts.is_empty() {
    CONTACTS_PLACEHOLDER.to_string()
  } else {
    entry.contacts.join(", ")
  }
}

/// One-line summary, e.g. `abc: x  Login page   contacts: Dana      hours: 60h`.
pub fn summary_line(entry: &ReportEntry, min_unit: f64) -> String {
  format!(
    "{}  {}   contacts: {}      hours: {}h",
    entry.key,
    entry.title,
    contacts_text(entry),
    format_hours(entry.hours, min_unit)
  )
}

pub fn detail_record(entry: &ReportEntry, min_unit: f64) -> EntryDetail {
  EntryDetail {
    content: format!("{}  {}", entry.key, entry.title),
    contacts: contacts_text(entry),
    time: format!("{}h", format_hours(entry.hours, min_unit)),
    priority: entry.priority.clone(),
    description: entry.description.clone(),
  }
}
