// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Nested JSON fetching via dotted paths and safe typed extraction for serde_json::Value (tracker payloads)
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper for typed extraction, defaults, and plucking from arrays
// invariants: No panics; missing paths yield None; null is treated as missing; to_or_default returns T::default on failure
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;

/// Wrapper around a JSON location to allow typed extraction via a clear second step.
pub struct JsonFetched<'a> {
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  /// Attempt to deserialize the fetched value as `T`. JSON null counts as absent.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self
      .inner
      .filter(|v| !v.is_null())
      .and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Deserialize as `T`, returning `T::default()` on failure.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }

  /// When the fetched value is an array of objects, collect `field` from each element.
  /// Elements lacking the field (or with the wrong type) are skipped.
  pub fn pluck<T>(&self, field: &str) -> Vec<T>
  where
    T: DeserializeOwned,
  {
    let Some(arr) = self.inner.and_then(|v| v.as_array()) else {
      return Vec::new();
    };

    arr.iter().filter_map(|item| item.fetch(field).to::<T>()).collect()
  }

  pub fn is_present(&self) -> bool {
    self.inner.map(|v| !v.is_null()).unwrap_or(false)
  }
}

/// Extension to fetch nested values via dotted paths like "fields.reporter.displayName".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
