// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sampled outcome distributions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EvalError;

/// Bit-pattern → shot count.
///
/// Keys are exactly `qubit_count` characters of `0`/`1`, most-significant
/// qubit first: character `i` is the value of qubit `qubit_count - 1 - i`.
/// Keys are kept sorted so iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeDistribution {
    counts: BTreeMap<String, u64>,
}

impl OutcomeDistribution {
    /// Empty distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw counts, checking every key against `qubit_count`.
    ///
    /// Repeated keys are summed and zero counts are dropped. A total that
    /// does not fit in a `u64` is rejected.
    pub fn from_counts<I, K>(qubit_count: u32, counts: I) -> Result<Self, EvalError>
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        let mut dist = Self::new();
        let mut total: u64 = 0;
        for (key, count) in counts {
            let key = key.into();
            if !is_bit_pattern(&key, qubit_count) {
                return Err(EvalError::UnrecognizedResponse(format!(
                    "outcome key '{}' is not a {}-bit pattern",
                    key, qubit_count
                )));
            }
            if count > 0 {
                total = total.checked_add(count).ok_or_else(|| {
                    EvalError::UnrecognizedResponse(format!(
                        "outcome counts overflow at '{}'",
                        key
                    ))
                })?;
                // bounded by `total`
                *dist.counts.entry(key).or_insert(0) += count;
            }
        }
        Ok(dist)
    }

    /// Count for a pattern (0 when absent).
    pub fn get(&self, pattern: &str) -> u64 {
        self.counts.get(pattern).copied().unwrap_or(0)
    }

    /// Number of distinct patterns observed.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |acc, &c| acc.saturating_add(c))
    }

    /// Iterate patterns in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// The `k` most frequent patterns, highest count first, ties by pattern.
    pub fn top(&self, k: usize) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(k);
        entries
    }

    /// Borrow the underlying map.
    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }
}

fn is_bit_pattern(key: &str, qubit_count: u32) -> bool {
    key.len() == qubit_count as usize && key.bytes().all(|b| b == b'0' || b == b'1')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_counts_validates_width() {
        let ok = OutcomeDistribution::from_counts(2, [("01", 3), ("10", 5)]).unwrap();
        assert_eq!(ok.total(), 8);
        assert_eq!(ok.get("10"), 5);
        assert_eq!(ok.get("11"), 0);

        let err = OutcomeDistribution::from_counts(3, [("01", 3)]).unwrap_err();
        assert!(matches!(err, EvalError::UnrecognizedResponse(_)));

        let err = OutcomeDistribution::from_counts(2, [("0x", 1)]).unwrap_err();
        assert!(matches!(err, EvalError::UnrecognizedResponse(_)));
    }

    #[test]
    fn test_from_counts_drops_zero_and_merges() {
        let dist =
            OutcomeDistribution::from_counts(1, vec![("0".to_string(), 0), ("1".into(), 2), ("1".into(), 3)])
                .unwrap();
        assert_eq!(dist.len(), 1);
        assert_eq!(dist.get("1"), 5);
    }

    #[test]
    fn test_from_counts_rejects_overflowing_total() {
        let err = OutcomeDistribution::from_counts(1, [("0", u64::MAX), ("1", 5)]).unwrap_err();
        assert!(matches!(err, EvalError::UnrecognizedResponse(_)));

        let err = OutcomeDistribution::from_counts(1, [("1", u64::MAX), ("1", 1)]).unwrap_err();
        assert!(matches!(err, EvalError::UnrecognizedResponse(_)));

        let max = OutcomeDistribution::from_counts(1, [("0", u64::MAX)]).unwrap();
        assert_eq!(max.total(), u64::MAX);
    }

    #[test]
    fn test_total_saturates() {
        let dist: OutcomeDistribution =
            serde_json::from_str(&format!(r#"{{"0":{},"1":7}}"#, u64::MAX)).unwrap();
        assert_eq!(dist.total(), u64::MAX);
    }

    #[test]
    fn test_top_orders_by_count_then_pattern() {
        let dist =
            OutcomeDistribution::from_counts(2, [("11", 4), ("00", 9), ("10", 4), ("01", 1)]).unwrap();
        assert_eq!(dist.top(3), vec![("00", 9), ("10", 4), ("11", 4)]);
        assert_eq!(dist.top(10).len(), 4);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let dist = OutcomeDistribution::from_counts(2, [("01", 3)]).unwrap();
        assert_eq!(serde_json::to_string(&dist).unwrap(), r#"{"01":3}"#);
    }
}
