// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Result payload probing.
//!
//! IBM result payloads come in several shapes depending on the API and
//! primitive version. Known field paths are probed in a fixed order and the
//! first match wins:
//!
//! 1. `meas.quasi_dists`
//! 2. `quasi_dists`
//! 3. `dist`
//! 4. `counts`
//! 5. `meas.counts`
//! 6. `meas.samples`
//! 7. `samples`
//!
//! Each path is looked up under `results[0].data`, then `results[0]`, then
//! the payload root. A payload matching none of them is an
//! [`EvalError::UnrecognizedResponse`], never an empty distribution.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::EvalError;
use crate::outcome::OutcomeDistribution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Probabilities (possibly negative quasi-probabilities)
    Quasi,
    /// Integer counts
    Counts,
    /// One entry per shot
    Samples,
}

const PROBES: &[(&str, Shape)] = &[
    ("meas.quasi_dists", Shape::Quasi),
    ("quasi_dists", Shape::Quasi),
    ("dist", Shape::Quasi),
    ("counts", Shape::Counts),
    ("meas.counts", Shape::Counts),
    ("meas.samples", Shape::Samples),
    ("samples", Shape::Samples),
];

/// Extract an outcome distribution from a raw result payload.
///
/// Probabilities are scaled by `shots` and integerized so the total never
/// exceeds `shots`.
pub fn extract_distribution(
    payload: &Value,
    qubit_count: u32,
    shots: u32,
) -> Result<OutcomeDistribution, EvalError> {
    let first_result = payload
        .get("results")
        .and_then(Value::as_array)
        .and_then(|r| r.first());

    let mut containers = Vec::with_capacity(3);
    if let Some(result) = first_result {
        if let Some(data) = result.get("data") {
            containers.push(data);
        }
        containers.push(result);
    }
    containers.push(payload);

    for &(path, shape) in PROBES {
        for container in &containers {
            if let Some(value) = lookup(container, path) {
                return match shape {
                    Shape::Quasi => from_quasi(value, qubit_count, shots),
                    Shape::Counts => from_counts(value, qubit_count),
                    Shape::Samples => from_samples(value, qubit_count),
                };
            }
        }
    }

    Err(EvalError::UnrecognizedResponse(format!(
        "no known result field in payload (top-level keys: {})",
        describe_keys(payload)
    )))
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |v, key| v.get(key))
        .filter(|v| !v.is_null())
}

fn describe_keys(value: &Value) -> String {
    match value.as_object() {
        Some(map) if !map.is_empty() => map.keys().cloned().collect::<Vec<_>>().join(", "),
        Some(_) => "none".into(),
        None => format!("not an object: {}", type_name(value)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Lists hold one entry per circuit; only the first circuit is used.
fn first_entry(value: &Value) -> &Value {
    match value.as_array().and_then(|a| a.first()) {
        Some(first) => first,
        None => value,
    }
}

fn as_object<'a>(
    value: &'a Value,
    what: &str,
) -> Result<&'a serde_json::Map<String, Value>, EvalError> {
    value.as_object().ok_or_else(|| {
        EvalError::UnrecognizedResponse(format!(
            "{what} must be an object, got {}",
            type_name(value)
        ))
    })
}

fn from_quasi(value: &Value, qubit_count: u32, shots: u32) -> Result<OutcomeDistribution, EvalError> {
    let map = as_object(first_entry(value), "quasi distribution")?;

    let mut probs: BTreeMap<String, f64> = BTreeMap::new();
    for (key, p) in map {
        let p = p.as_f64().ok_or_else(|| {
            EvalError::UnrecognizedResponse(format!("probability for '{key}' is not a number"))
        })?;
        *probs.entry(normalize_key(key, qubit_count)?).or_insert(0.0) += p;
    }

    OutcomeDistribution::from_counts(qubit_count, quasi_to_counts(&probs, shots)?)
}

fn from_counts(value: &Value, qubit_count: u32) -> Result<OutcomeDistribution, EvalError> {
    let map = as_object(first_entry(value), "counts")?;

    let mut counts = Vec::with_capacity(map.len());
    for (key, c) in map {
        let count = c
            .as_u64()
            .or_else(|| c.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .ok_or_else(|| {
                EvalError::UnrecognizedResponse(format!(
                    "count for '{key}' is not a non-negative integer"
                ))
            })?;
        counts.push((normalize_key(key, qubit_count)?, count));
    }

    OutcomeDistribution::from_counts(qubit_count, counts)
}

fn from_samples(value: &Value, qubit_count: u32) -> Result<OutcomeDistribution, EvalError> {
    // a list of circuits holding lists of samples
    let samples = match value.as_array() {
        Some(list) if list.first().is_some_and(Value::is_array) => &list[0],
        _ => value,
    };
    let samples = samples.as_array().ok_or_else(|| {
        EvalError::UnrecognizedResponse("samples must be a list of strings".into())
    })?;

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for sample in samples {
        let s = sample.as_str().ok_or_else(|| {
            EvalError::UnrecognizedResponse("samples must be a list of strings".into())
        })?;
        *counts.entry(normalize_key(s, qubit_count)?).or_insert(0) += 1;
    }

    OutcomeDistribution::from_counts(qubit_count, counts)
}

/// Normalize an outcome key to a most-significant-first bit pattern.
///
/// Accepts `qubit_count`-wide binary (register spaces are ignored), `0x` hex,
/// and decimal. A key that is already exactly `qubit_count` binary digits is
/// always read as binary.
pub fn normalize_key(key: &str, qubit_count: u32) -> Result<String, EvalError> {
    let width = qubit_count as usize;
    let compact: String = key.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.len() == width && compact.bytes().all(|b| b == b'0' || b == b'1') {
        return Ok(compact);
    }

    let bits = if let Some(hex) = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
    {
        hex_to_bits(hex)
    } else if !compact.is_empty() && compact.bytes().all(|b| b.is_ascii_digit()) {
        compact
            .parse::<u128>()
            .ok()
            .map(|v| format!("{:b}", v))
    } else {
        None
    };

    let bits = bits.ok_or_else(|| {
        EvalError::UnrecognizedResponse(format!("cannot interpret outcome key '{key}'"))
    })?;

    let significant = bits.trim_start_matches('0');
    if significant.len() > width {
        return Err(EvalError::UnrecognizedResponse(format!(
            "outcome key '{key}' does not fit in {qubit_count} bits"
        )));
    }
    Ok(format!("{:0>width$}", significant, width = width))
}

fn hex_to_bits(hex: &str) -> Option<String> {
    if hex.is_empty() {
        return None;
    }
    let mut bits = String::with_capacity(hex.len() * 4);
    for c in hex.chars() {
        let nibble = c.to_digit(16)?;
        bits.push_str(&format!("{:04b}", nibble));
    }
    Some(bits)
}

/// Largest positive probability mass accepted from a quasi distribution.
///
/// Mitigated quasi distributions can sum slightly above 1 once negative
/// entries are clamped; anything beyond this is not a distribution.
pub const MAX_QUASI_MASS: f64 = 1.5;

/// Scale probabilities to integer counts summing to at most `shots`.
///
/// Negative and non-finite values count as zero. A positive mass above
/// [`MAX_QUASI_MASS`] is rejected; a mass between 1 and that bound is
/// renormalized to 1. Values are rounded to the nearest integer; if the
/// rounded total exceeds `shots`, entries that were rounded up the most are
/// decremented first (ties by key).
pub fn quasi_to_counts(
    probs: &BTreeMap<String, f64>,
    shots: u32,
) -> Result<Vec<(String, u64)>, EvalError> {
    let clamped: Vec<(&str, f64)> = probs
        .iter()
        .map(|(k, &p)| (k.as_str(), if p.is_finite() { p.max(0.0) } else { 0.0 }))
        .collect();

    let mass: f64 = clamped.iter().map(|e| e.1).sum();
    if !mass.is_finite() || mass > MAX_QUASI_MASS {
        return Err(EvalError::UnrecognizedResponse(format!(
            "quasi distribution has total probability {mass}, expected about 1"
        )));
    }
    let scale = if mass > 1.0 {
        f64::from(shots) / mass
    } else {
        f64::from(shots)
    };

    let mut entries: Vec<(&str, f64, u64)> = clamped
        .into_iter()
        .map(|(k, p)| {
            let raw = p * scale;
            (k, raw, raw.round() as u64)
        })
        .collect();

    // Each entry is rounded up by at most one, so the overshoot is at most
    // one per entry and a single pass in excess order removes it.
    let total: u64 = entries.iter().map(|e| e.2).sum();
    let mut overshoot = total.saturating_sub(u64::from(shots));
    if overshoot > 0 {
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.sort_by(|&a, &b| {
            let excess_a = entries[a].2 as f64 - entries[a].1;
            let excess_b = entries[b].2 as f64 - entries[b].1;
            excess_b
                .total_cmp(&excess_a)
                .then_with(|| entries[a].0.cmp(entries[b].0))
        });
        for i in order {
            if overshoot == 0 {
                break;
            }
            let take = entries[i].2.min(overshoot);
            entries[i].2 -= take;
            overshoot -= take;
        }
    }

    Ok(entries
        .into_iter()
        .filter(|e| e.2 > 0)
        .map(|(k, _, c)| (k.to_string(), c))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_v2_quasi_under_meas() {
        let payload = json!({
            "results": [ { "data": { "meas": { "quasi_dists": [ { "3": 0.75, "0": 0.25 } ] } } } ]
        });
        let dist = extract_distribution(&payload, 2, 100).unwrap();
        assert_eq!(dist.get("11"), 75);
        assert_eq!(dist.get("00"), 25);
    }

    #[test]
    fn test_root_level_quasi_dists() {
        let payload = json!({ "quasi_dists": [ { "1": 1.0 } ], "metadata": [ {} ] });
        let dist = extract_distribution(&payload, 3, 10).unwrap();
        assert_eq!(dist.get("001"), 10);
    }

    #[test]
    fn test_quasi_preferred_over_counts() {
        let payload = json!({
            "results": [ { "data": { "quasi_dists": { "0": 1.0 }, "counts": { "1": 7 } } } ]
        });
        let dist = extract_distribution(&payload, 1, 4).unwrap();
        assert_eq!(dist.get("0"), 4);
        assert_eq!(dist.get("1"), 0);
    }

    #[test]
    fn test_provider_counts_with_hex_keys() {
        let payload = json!({
            "results": [ { "data": { "counts": { "0x5": 60, "0x0": 40 } } } ]
        });
        let dist = extract_distribution(&payload, 3, 100).unwrap();
        assert_eq!(dist.get("101"), 60);
        assert_eq!(dist.get("000"), 40);
    }

    #[test]
    fn test_binary_counts_used_directly() {
        let payload = json!({ "results": [ { "counts": { "110": 9, "001": 1 } } ] });
        let dist = extract_distribution(&payload, 3, 10).unwrap();
        assert_eq!(dist.get("110"), 9);
        assert_eq!(dist.total(), 10);
    }

    #[test]
    fn test_samples_are_tallied() {
        let payload = json!({
            "results": [ { "data": { "meas": { "samples": ["0x1", "0x1", "0x2"] } } } ]
        });
        let dist = extract_distribution(&payload, 2, 3).unwrap();
        assert_eq!(dist.get("01"), 2);
        assert_eq!(dist.get("10"), 1);
    }

    #[test]
    fn test_unknown_shape_is_error() {
        let payload = json!({ "results": [ { "data": { "evs": [0.1] } } ] });
        let err = extract_distribution(&payload, 2, 10).unwrap_err();
        assert!(matches!(err, EvalError::UnrecognizedResponse(_)));

        let err = extract_distribution(&json!([]), 2, 10).unwrap_err();
        assert!(matches!(err, EvalError::UnrecognizedResponse(_)));
    }

    #[test]
    fn test_bad_counts_value_is_error() {
        let payload = json!({ "counts": { "01": "many" } });
        assert!(extract_distribution(&payload, 2, 10).is_err());
    }

    #[test]
    fn test_normalize_key_forms() {
        assert_eq!(normalize_key("0110", 4).unwrap(), "0110");
        assert_eq!(normalize_key("01 10", 4).unwrap(), "0110");
        assert_eq!(normalize_key("0xa", 4).unwrap(), "1010");
        assert_eq!(normalize_key("6", 4).unwrap(), "0110");
        assert_eq!(normalize_key("0", 3).unwrap(), "000");
        assert!(normalize_key("0x10", 4).is_err());
        assert!(normalize_key("abc", 4).is_err());
    }

    #[test]
    fn test_quasi_to_counts_clamps_and_caps() {
        let mut probs = BTreeMap::new();
        probs.insert("00".to_string(), 0.505);
        probs.insert("01".to_string(), 0.505);
        probs.insert("10".to_string(), -0.01);
        let counts = quasi_to_counts(&probs, 100).unwrap();
        // mass above 1 is renormalized before rounding
        let total: u64 = counts.iter().map(|c| c.1).sum();
        assert_eq!(total, 100);
        assert!(counts.iter().all(|(k, _)| k != "10"));
    }

    #[test]
    fn test_quasi_to_counts_never_exceeds_shots() {
        let mut probs = BTreeMap::new();
        for (i, p) in [0.3, 0.3, 0.3, 0.3].iter().enumerate() {
            probs.insert(format!("{i:02b}"), *p);
        }
        let counts = quasi_to_counts(&probs, 10).unwrap();
        let total: u64 = counts.iter().map(|c| c.1).sum();
        assert!(total <= 10);
        assert!(total >= 8);
    }

    #[test]
    fn test_quasi_rounding_overshoot_trimmed_by_excess() {
        // 3 x 1/3 of 2 shots rounds to 1 each; the tie goes to the lowest key
        let mut probs = BTreeMap::new();
        for key in ["00", "01", "10"] {
            probs.insert(key.to_string(), 1.0 / 3.0);
        }
        let counts = quasi_to_counts(&probs, 2).unwrap();
        assert_eq!(counts, vec![("01".to_string(), 1), ("10".to_string(), 1)]);
    }

    #[test]
    fn test_oversized_quasi_mass_is_rejected() {
        let payload = json!({ "quasi_dists": [ { "1": 1.0e12, "0": 0.0 } ] });
        let err = extract_distribution(&payload, 1, 1000).unwrap_err();
        assert!(matches!(err, EvalError::UnrecognizedResponse(_)));

        let mut probs = BTreeMap::new();
        probs.insert("0".to_string(), 0.9);
        probs.insert("1".to_string(), 0.9);
        assert!(quasi_to_counts(&probs, 100).is_err());
    }

    #[test]
    fn test_counts_overflow_is_rejected() {
        let payload = json!({ "counts": { "0": u64::MAX, "1": 5 } });
        let err = extract_distribution(&payload, 1, 1000).unwrap_err();
        assert!(matches!(err, EvalError::UnrecognizedResponse(_)));
    }
}
