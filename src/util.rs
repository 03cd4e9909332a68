// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, git subprocesses, time, hour formatting, output writing, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; DateTime; paths; clap CommandFactory
// outputs: Canonicalized paths, git stdout, formatted hours, man page text
// side_effects: run_git invokes subprocesses; write_output creates parent directories and files
// invariants:
// - format_hours never prints more decimals than the unit has; trailing zeros are trimmed
// - write_output("-") goes to stdout and never touches the filesystem
// errors: run_git surfaces command + stderr; IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::CommandFactory;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

pub fn run_git(repo: &Path, args: &[String]) -> Result<String> {
  let out = Command::new("git")
    .args(args)
    .current_dir(repo)
    .output()
    .with_context(|| format!("spawning git {:?} in {}", args, repo.display()))?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    anyhow::bail!("git {:?} failed in {}: {}", args, repo.display(), stderr.trim())
  }
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current local time is used.
pub fn effective_now(override_now: Option<DateTime<Local>>) -> DateTime<Local> {
  override_now.unwrap_or_else(Local::now)
}

/// Parse a `YYYY-MM-DDTHH:MM:SS` local timestamp (the hidden `--now-override` flag).
pub fn parse_now(s: Option<&str>) -> Result<Option<DateTime<Local>>> {
  let Some(s) = s else { return Ok(None) };
  let naive = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
    .with_context(|| format!("parsing now override {:?}, expected YYYY-MM-DDTHH:MM:SS", s))?;

  naive
    .and_local_timezone(Local)
    .earliest()
    .map(Some)
    .with_context(|| format!("now override {:?} does not exist in the local timezone", s))
}

/// Number of decimals needed to print multiples of `unit` (0.1 -> 1, 0.25 -> 2, 1 -> 0).
pub fn unit_decimals(unit: f64) -> usize {
  (0..6).find(|&d| {
    let scaled = unit * 10f64.powi(d as i32);
    (scaled - scaled.round()).abs() < 1e-9
  })
  .unwrap_or(6)
}

/// Format hours at the unit's precision with trailing zeros trimmed ("60", "20.5").
pub fn format_hours(hours: f64, unit: f64) -> String {
  let s = format!("{:.*}", unit_decimals(unit), hours);

  if s.contains('.') {
    s.trim_end_matches('0').trim_end_matches('.').to_string()
  } else {
    s
  }
}

/// Write rendered output to stdout ("-") or to a file, creating parent directories.
pub fn write_output(out: &str, content: &str) -> Result<()> {
  if out == "-" {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
      stdout.write_all(b"\n")?;
    }
    return Ok(());
  }

  let path = Path::new(out);
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;

  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
