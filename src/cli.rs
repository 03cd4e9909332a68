use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::allocate::MAX_UNITS;
use crate::parser::GroupBy;
use crate::tracker::TrackerConfig;
use crate::util;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
  Text,
  Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "git-hours-report",
    version,
    about = "Allocate a work-hour budget across tracker issues referenced by your recent Git commits",
    long_about = None
)]
pub struct Cli {
  /// Directory to scan recursively for Git repositories
  #[arg(long, default_value = ".")]
  pub root: PathBuf,

  /// Git author filter (matched against "Name <email>")
  #[arg(long, env = "GHR_AUTHOR")]
  pub author: Option<String>,

  /// Your display name in the issue tracker; removed from each issue's contact list
  #[arg(long, env = "GHR_SELF_NAME", default_value = "")]
  pub self_name: String,

  /// Issue tracker (Jira) base URL, e.g. https://jira.example.com
  #[arg(long, env = "GHR_TRACKER_URL")]
  pub tracker_url: Option<String>,

  /// Issue tracker user for HTTP Basic auth
  #[arg(long, env = "GHR_TRACKER_USER")]
  pub tracker_user: Option<String>,

  /// Issue tracker password for HTTP Basic auth
  #[arg(long, env = "GHR_TRACKER_PASSWORD", hide_env_values = true)]
  pub tracker_password: Option<String>,

  /// Jira field listing the users linked to an issue (reporter is always listed first)
  #[arg(long, default_value = "customfield_10400")]
  pub contacts_field: String,

  /// Hour budget to distribute
  #[arg(long, default_value_t = 80.0)]
  pub total_hours: f64,

  /// Trailing window, in days, of commits to consider
  #[arg(long, default_value_t = 14)]
  pub days: u32,

  /// Allocation granularity in hours
  #[arg(long, default_value_t = 0.1)]
  pub min_unit: f64,

  /// Which part of a `key: description` subject identifies the issue
  #[arg(long, value_enum, default_value_t = GroupBy::Line)]
  pub group_by: GroupBy,

  /// Per-issue fetch timeout in seconds; a timeout counts as "not found"
  #[arg(long, default_value_t = 10)]
  pub fetch_timeout_secs: u64,

  /// Maximum concurrent issue fetches (0 = one per issue)
  #[arg(long, default_value_t = 0)]
  pub fetch_parallelism: usize,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  pub format: OutputFormat,

  /// Output file path (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Verbose logging (debug level) unless RUST_LOG is set
  #[arg(short, long)]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant, YYYY-MM-DDTHH:MM:SS (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EffectiveConfig {
  pub root: String, // absolute path for stability
  pub author: String,
  pub self_name: String,
  pub tracker: TrackerConfig,
  pub total_hours: f64,
  pub days: u32,
  pub min_unit: f64,
  pub group_by: GroupBy,
  pub fetch_parallelism: usize,
  pub format: OutputFormat,
  pub out: String,
  pub now_override: Option<String>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let author = cli.author.as_deref().unwrap_or("").trim().to_string();
  if author.is_empty() {
    bail!("--author (or GHR_AUTHOR) must name the Git author whose commits are counted");
  }

  if !cli.min_unit.is_finite() || cli.min_unit <= 0.0 {
    bail!("--min-unit must be a positive number of hours, got {}", cli.min_unit);
  }

  if !cli.total_hours.is_finite() || cli.total_hours < 0.0 {
    bail!("--total-hours must be zero or more, got {}", cli.total_hours);
  }

  let units = cli.total_hours / cli.min_unit;
  if units > MAX_UNITS {
    bail!(
      "--total-hours ({}) is too large for --min-unit ({})",
      cli.total_hours,
      cli.min_unit
    );
  }

  if (units.round() - units).abs() > 1e-6 {
    bail!(
      "--total-hours ({}) must be a whole multiple of --min-unit ({})",
      cli.total_hours,
      cli.min_unit
    );
  }

  if cli.days == 0 {
    bail!("--days must be at least 1");
  }

  if cli.fetch_timeout_secs == 0 {
    bail!("--fetch-timeout-secs must be at least 1");
  }

  let tracker = TrackerConfig {
    base_url: cli.tracker_url.filter(|u| !u.trim().is_empty()),
    username: cli.tracker_user.filter(|u| !u.is_empty()),
    password: cli.tracker_password,
    contacts_field: cli.contacts_field,
    timeout: Duration::from_secs(cli.fetch_timeout_secs),
  };

  Ok(EffectiveConfig {
    root: util::canonicalize_lossy(&cli.root),
    author,
    self_name: cli.self_name,
    tracker,
    total_hours: cli.total_hours,
    days: cli.days,
    min_unit: cli.min_unit,
    group_by: cli.group_by,
    fetch_parallelism: cli.fetch_parallelism,
    format: cli.format,
    out: cli.out,
    now_override: cli.now_override,
  })
}
