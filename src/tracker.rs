// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Issue-tracker lookups (Jira REST v2) behind a trait seam, with per-run caching and parallel fan-out
// role: tracker/fetch
// inputs: issue keys; tracker base URL and static credentials; env GHR_TEST_ISSUES_JSON for the env-backed double
// outputs: Option<IssueRecord> per key, in key order
// side_effects: Network calls to the tracker; spawns a scoped thread pool for fetches
// invariants:
// - fetch_issue never panics or errors upward; every failure is "not found" for that key only
// - HTTP 200 with errorMessages, non-200, transport errors, timeouts and parse failures all map to None
// - fetch_all returns exactly one result per key, aligned with the input order
// errors: Swallowed and logged at warn; a pool that cannot be built falls back to the global pool
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use base64::Engine;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::ext::serde_json::JsonFetch;
use crate::model::IssueRecord;

pub const TEST_ISSUES_ENV: &str = "GHR_TEST_ISSUES_JSON";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
  pub base_url: Option<String>,
  pub username: Option<String>,
  pub password: Option<String>,
  pub contacts_field: String,
  pub timeout: Duration,
}

// --- Trait seam for issue lookups ---
pub trait IssueTracker: Send + Sync {
  fn fetch_issue(&self, key: &str) -> Option<IssueRecord>;
}

/// Map a Jira issue payload to an `IssueRecord`.
///
/// Returns None when the payload carries `errorMessages` or is not an object.
pub fn parse_issue_json(v: &serde_json::Value, contacts_field: &str) -> Option<IssueRecord> {
  v.as_object()?;

  if v.fetch("errorMessages").is_present() {
    return None;
  }

  let mut linked_users: Vec<String> = Vec::new();

  if let Some(reporter) = v.fetch("fields.reporter.displayName").to::<String>() {
    linked_users.push(reporter);
  }
  linked_users.extend(v.fetch(&format!("fields.{}", contacts_field)).pluck::<String>("displayName"));

  Some(IssueRecord {
    title: v.fetch("fields.summary").to_or_default::<String>(),
    linked_users,
    priority: v.fetch("fields.priority.name").to::<String>(),
    description: v.fetch("fields.description").to::<String>().filter(|d| !d.is_empty()),
  })
}

struct JiraHttpTracker {
  agent: ureq::Agent,
  base: url::Url,
  authorization: Option<String>,
  contacts_field: String,
}

impl JiraHttpTracker {
  fn new(base_url: &str, cfg: &TrackerConfig) -> Result<Self> {
    let base = url::Url::parse(base_url).with_context(|| format!("parsing tracker url {:?}", base_url))?;

    if base.cannot_be_a_base() {
      bail!("tracker url {:?} cannot carry a path", base_url);
    }

    let authorization = cfg.username.as_ref().map(|user| {
      let pair = format!("{}:{}", user, cfg.password.as_deref().unwrap_or(""));
      format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(pair))
    });

    let agent = ureq::AgentBuilder::new().timeout(cfg.timeout).build();

    Ok(Self {
      agent,
      base,
      authorization,
      contacts_field: cfg.contacts_field.clone(),
    })
  }

  fn issue_url(&self, key: &str) -> Result<url::Url> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| anyhow!("tracker url cannot carry a path"))?
      .pop_if_empty()
      .extend(["rest", "api", "2", "issue", key]);
    Ok(url)
  }
}

impl IssueTracker for JiraHttpTracker {
  fn fetch_issue(&self, key: &str) -> Option<IssueRecord> {
    let url = match self.issue_url(key) {
      Ok(u) => u,
      Err(err) => {
        warn!(key, error = %err, "cannot build issue url");
        return None;
      }
    };

    let mut req = self
      .agent
      .get(url.as_str())
      .set("Accept", "application/json")
      .set("User-Agent", "git-hours-report");

    if let Some(auth) = &self.authorization {
      req = req.set("Authorization", auth);
    }

    let resp = match req.call() {
      Ok(r) => r,
      Err(ureq::Error::Status(code, _)) => {
        warn!(key, status = code, "issue lookup failed");
        return None;
      }
      Err(ureq::Error::Transport(t)) => {
        warn!(key, error = %t, "issue lookup failed");
        return None;
      }
    };

    if resp.status() != 200 {
      warn!(key, status = resp.status(), "issue lookup returned non-200");
      return None;
    }

    let json: serde_json::Value = match resp.into_json() {
      Ok(v) => v,
      Err(err) => {
        warn!(key, error = %err, "issue payload is not JSON");
        return None;
      }
    };

    let record = parse_issue_json(&json, &self.contacts_field);
    if record.is_none() {
      warn!(key, "tracker reported an error for issue");
    }
    record
  }
}

/// Env-backed double: `GHR_TEST_ISSUES_JSON` holds `{ "<key>": <issue payload>, ... }`.
struct EnvTracker {
  issues: serde_json::Value,
  contacts_field: String,
}

impl EnvTracker {
  fn from_env(contacts_field: &str) -> Option<Self> {
    let raw = std::env::var(TEST_ISSUES_ENV).ok()?;
    let issues = match serde_json::from_str::<serde_json::Value>(&raw) {
      Ok(v) => v,
      Err(err) => {
        warn!(error = %err, "{} is not valid JSON; every issue will be unresolved", TEST_ISSUES_ENV);
        serde_json::json!({})
      }
    };

    Some(Self {
      issues,
      contacts_field: contacts_field.to_string(),
    })
  }
}

impl IssueTracker for EnvTracker {
  fn fetch_issue(&self, key: &str) -> Option<IssueRecord> {
    self.issues.get(key).and_then(|v| parse_issue_json(v, &self.contacts_field))
  }
}

// --- Per-run memoisation ---
struct CachedTracker {
  inner: Box<dyn IssueTracker>,
  cache: Mutex<HashMap<String, Option<IssueRecord>>>,
}

impl CachedTracker {
  fn new(inner: Box<dyn IssueTracker>) -> Self {
    Self {
      inner,
      cache: Mutex::new(HashMap::new()),
    }
  }
}

impl IssueTracker for CachedTracker {
  fn fetch_issue(&self, key: &str) -> Option<IssueRecord> {
    if let Some(hit) = self.cache.lock().ok().and_then(|m| m.get(key).cloned()) {
      debug!(key, "issue cache hit");
      return hit;
    }

    let v = self.inner.fetch_issue(key);
    if let Ok(mut m) = self.cache.lock() {
      m.insert(key.to_string(), v.clone());
    }

    v
  }
}

/// Pick the tracker backend: the env double when its variable is set, otherwise Jira over HTTP.
pub fn build_tracker(cfg: &TrackerConfig) -> Result<Box<dyn IssueTracker>> {
  let inner: Box<dyn IssueTracker> = if let Some(env) = EnvTracker::from_env(&cfg.contacts_field) {
    Box::new(env)
  } else if let Some(base) = &cfg.base_url {
    Box::new(JiraHttpTracker::new(base, cfg)?)
  } else {
    bail!("no issue tracker configured: pass --tracker-url or set GHR_TRACKER_URL");
  };

  Ok(Box::new(CachedTracker::new(inner)))
}

/// Fetch every key concurrently and wait for all of them to settle.
///
/// `parallelism == 0` runs one fetch per key, all in flight at once. If the
/// dedicated pool cannot be built the fetches run on rayon's global pool.
pub fn fetch_all(tracker: &dyn IssueTracker, keys: &[&str], parallelism: usize) -> Vec<Option<IssueRecord>> {
  if keys.is_empty() {
    return Vec::new();
  }

  let threads = if parallelism == 0 { keys.len() } else { parallelism.min(keys.len()) };
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(threads)
    .thread_name(|i| format!("issue-fetch-{}", i))
    .build();

  fetch_on(pool, tracker, keys)
}

fn fetch_on(
  pool: Result<rayon::ThreadPool, rayon::ThreadPoolBuildError>,
  tracker: &dyn IssueTracker,
  keys: &[&str],
) -> Vec<Option<IssueRecord>> {
  let fetch = || -> Vec<Option<IssueRecord>> { keys.par_iter().map(|k| tracker.fetch_issue(k)).collect() };

  match pool {
    Ok(pool) => pool.install(fetch),
    Err(err) => {
      warn!(
        error = %err,
        fallback_threads = rayon::current_num_threads(),
        "cannot build issue fetch pool; using the global pool"
      );
      fetch()
    }
  }
}
