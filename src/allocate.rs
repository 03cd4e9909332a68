// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Distribute a fixed hour budget across issue keys in proportion to commit counts, quantized to a minimum unit
// role: allocation/core
// inputs: ordered (key, weight) pairs; total hours; minimum unit
// outputs: Allocation (key -> hours) covering exactly the input keys, in input order
// invariants:
// - sum of hours == total (within 1e-9) whenever at least one weight is nonzero
// - every value is a non-negative integer multiple of the unit
// - w1 > w2 implies h1 >= h2; identical input yields identical output
// errors: negative/non-finite total, non-positive unit, or a total that is not a multiple of the unit
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{bail, Result};

const EPSILON: f64 = 1e-9;

/// Largest unit count that survives the f64 -> i64 round trip exactly (2^53).
pub const MAX_UNITS: f64 = (1u64 << 53) as f64;

/// Hours per key, in the order the weights were supplied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Allocation {
  entries: Vec<(String, f64)>,
}

impl Allocation {
  pub fn get(&self, key: &str) -> Option<f64> {
    self.entries.iter().find(|(k, _)| k == key).map(|(_, h)| *h)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
    self.entries.iter().map(|(k, h)| (k.as_str(), *h))
  }

  pub fn total(&self) -> f64 {
    self.entries.iter().map(|(_, h)| h).sum()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Convert a total into whole units, rejecting totals the unit cannot express.
fn total_in_units(total_hours: f64, min_unit: f64) -> Result<i64> {
  let units = (total_hours / min_unit).round();

  if units > MAX_UNITS {
    bail!(
      "total hours ({}) is too large for a minimum unit of {}",
      total_hours,
      min_unit
    );
  }

  if (units * min_unit - total_hours).abs() > EPSILON * total_hours.max(1.0) {
    bail!(
      "total hours ({}) must be a whole multiple of the minimum unit ({})",
      total_hours,
      min_unit
    );
  }

  Ok(units as i64)
}

/// Convert whole units back to hours.
///
/// Divides by units-per-hour when the unit is an exact fraction of an hour
/// (0.1, 0.25, 0.5, ...) so that e.g. 600 units of 0.1 is exactly 60.0.
pub fn units_to_hours(units: i64, min_unit: f64) -> f64 {
  let per_hour = (1.0 / min_unit).round();

  if per_hour >= 1.0 && (per_hour * min_unit - 1.0).abs() < EPSILON {
    units as f64 / per_hour
  } else {
    units as f64 * min_unit
  }
}

/// Allocate `total_hours` across `weights` proportionally, quantized to `min_unit`.
///
/// Provisional shares are `round(w / S * T / u)` (half away from zero). The
/// leftover (positive or negative, in whole units) is then walked one unit at a
/// time: top-ups go to keys by descending weight with ties in supplied order,
/// deductions walk the same list backwards and never push a key below zero.
/// Keys with zero weight never receive a top-up.
pub fn allocate<'a, I>(weights: I, total_hours: f64, min_unit: f64) -> Result<Allocation>
where
  I: IntoIterator<Item = (&'a str, u64)>,
{
  // Phase 1: preconditions
  if !min_unit.is_finite() || min_unit <= 0.0 {
    bail!("minimum unit must be a positive number, got {}", min_unit);
  }

  if !total_hours.is_finite() || total_hours < 0.0 {
    bail!("total hours must be a non-negative number, got {}", total_hours);
  }

  let total_units = total_in_units(total_hours, min_unit)?;
  let weights: Vec<(&str, u64)> = weights.into_iter().collect();
  let weight_sum: u64 = weights.iter().map(|(_, w)| *w).sum();

  // Phase 2: degenerate inputs
  if weight_sum == 0 || total_units == 0 {
    let entries = weights.iter().map(|(k, _)| (k.to_string(), 0.0)).collect();
    return Ok(Allocation { entries });
  }

  // Phase 3: provisional shares in whole units
  let mut units: Vec<i64> = weights
    .iter()
    .map(|(_, w)| (*w as f64 * total_units as f64 / weight_sum as f64).round() as i64)
    .collect();

  // Phase 4: redistribute the rounding remainder
  let mut remainder = total_units - units.iter().sum::<i64>();

  let mut walk: Vec<usize> = (0..weights.len()).filter(|&i| weights[i].1 > 0).collect();
  walk.sort_by(|&a, &b| weights[b].1.cmp(&weights[a].1));

  while remainder > 0 {
    for &i in &walk {
      if remainder == 0 {
        break;
      }
      units[i] += 1;
      remainder -= 1;
    }
  }

  while remainder < 0 {
    let mut moved = false;

    for &i in walk.iter().rev() {
      if remainder == 0 {
        break;
      }
      if units[i] > 0 {
        units[i] -= 1;
        remainder += 1;
        moved = true;
      }
    }

    if !moved {
      break;
    }
  }

  let entries = weights
    .iter()
    .zip(units)
    .map(|((k, _), u)| (k.to_string(), units_to_hours(u, min_unit)))
    .collect();

  Ok(Allocation { entries })
}
