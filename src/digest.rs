// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Distribution-to-digest collapse.
//!
//! The modal bit-pattern is reported most-significant-qubit first. The digest
//! reads it the other way round: the pattern is reversed and the result parsed
//! as a binary integer, so qubit 0 becomes the integer's lowest bit. The hex
//! rendering is zero-padded to `ceil(qubit_count / 4)` digits.

use crate::outcome::OutcomeDistribution;

/// Modal pattern and its digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collapsed {
    /// Most frequent pattern, most-significant qubit first
    pub bit_pattern: String,
    /// Lowercase hex digest
    pub digest: String,
}

/// Collapse a distribution to `(bit_pattern, digest)`.
///
/// Ties on the maximum count go to the lexicographically smallest pattern.
/// An empty distribution collapses to two empty strings.
pub fn collapse(dist: &OutcomeDistribution, qubit_count: u32) -> Collapsed {
    let Some(bit_pattern) = most_frequent(dist) else {
        return Collapsed::default();
    };
    let digest = to_hash_hex(bit_pattern, qubit_count);
    Collapsed {
        bit_pattern: bit_pattern.to_string(),
        digest,
    }
}

/// Most frequent pattern; ties resolved to the smallest pattern.
pub fn most_frequent(dist: &OutcomeDistribution) -> Option<&str> {
    let mut best: Option<(&str, u64)> = None;
    // iteration is ascending, so only a strictly larger count replaces
    for (pattern, count) in dist.iter() {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((pattern, count));
        }
    }
    best.map(|(pattern, _)| pattern)
}

/// Number of hex digits in a digest for `qubit_count` qubits.
pub fn digest_width(qubit_count: u32) -> usize {
    (qubit_count as usize).div_ceil(4)
}

/// Hex digest of a most-significant-first pattern read least-significant first.
///
/// Works for any width. Characters other than `1` count as zero bits.
pub fn to_hash_hex(bit_pattern: &str, qubit_count: u32) -> String {
    if bit_pattern.is_empty() {
        return String::new();
    }

    // After reversal, pattern[j] is bit j of the integer.
    let bits: Vec<bool> = bit_pattern.bytes().map(|b| b == b'1').collect();
    let nibbles: Vec<u8> = bits
        .chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | (u8::from(bit) << i))
        })
        .collect();

    let hex: String = nibbles
        .iter()
        .rev()
        .skip_while(|&&n| n == 0)
        .map(|&n| char::from_digit(u32::from(n), 16).unwrap_or('0'))
        .collect();

    let width = digest_width(qubit_count).max(1);
    format!("{:0>width$}", hex, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(n: u32, entries: &[(&str, u64)]) -> OutcomeDistribution {
        OutcomeDistribution::from_counts(n, entries.iter().map(|&(k, v)| (k, v))).unwrap()
    }

    #[test]
    fn test_asymmetric_pattern_reversal() {
        // "110" reversed is "011" = 3
        let c = collapse(&dist(3, &[("110", 10)]), 3);
        assert_eq!(c.bit_pattern, "110");
        assert_eq!(c.digest, "3");
    }

    #[test]
    fn test_palindrome_pattern() {
        let c = collapse(&dist(3, &[("101", 10)]), 3);
        assert_eq!(c.digest, "5");
    }

    #[test]
    fn test_empty_distribution() {
        let c = collapse(&OutcomeDistribution::new(), 5);
        assert_eq!(c, Collapsed::default());
        assert_eq!(c.bit_pattern, "");
        assert_eq!(c.digest, "");
    }

    #[test]
    fn test_modal_pattern_wins() {
        let c = collapse(&dist(2, &[("00", 3), ("01", 9), ("11", 4)]), 2);
        assert_eq!(c.bit_pattern, "01");
        // "01" reversed is "10" = 2
        assert_eq!(c.digest, "2");
    }

    #[test]
    fn test_tie_breaks_to_smallest_pattern() {
        let d = dist(3, &[("111", 7), ("010", 7), ("100", 7), ("000", 2)]);
        assert_eq!(most_frequent(&d), Some("010"));
        assert_eq!(collapse(&d, 3).bit_pattern, "010");
    }

    #[test]
    fn test_zero_padding() {
        // "10000000" reversed = "00000001" = 1, width 2
        assert_eq!(to_hash_hex("10000000", 8), "01");
        assert_eq!(to_hash_hex("000000", 6), "00");
        assert_eq!(to_hash_hex("0", 1), "0");
    }

    #[test]
    fn test_lowercase_and_full_width() {
        // qubit 0..3 set, 4..7 clear -> 0x0f; MSB-first pattern "00001111"
        assert_eq!(to_hash_hex("00001111", 8), "f0");
        assert_eq!(to_hash_hex("11110000", 8), "0f");
        assert_eq!(to_hash_hex("1111111111", 10), "3ff");
    }

    #[test]
    fn test_wide_pattern_does_not_overflow() {
        let pattern = "1".repeat(200);
        let hex = to_hash_hex(&pattern, 200);
        assert_eq!(hex.len(), 50);
        assert!(hex.chars().all(|c| c == 'f'));
    }

    #[test]
    fn test_matches_integer_reference() {
        // Reference: int(pattern[::-1], 2) formatted to width
        for value in 0u32..512 {
            let lsb_first: String = (0..9)
                .map(|i| if value >> (8 - i) & 1 == 1 { '1' } else { '0' })
                .collect();
            let pattern: String = lsb_first.chars().rev().collect();
            assert_eq!(to_hash_hex(&pattern, 9), format!("{:03x}", value));
        }
    }

    #[test]
    fn test_digest_width() {
        assert_eq!(digest_width(1), 1);
        assert_eq!(digest_width(4), 1);
        assert_eq!(digest_width(5), 2);
        assert_eq!(digest_width(127), 32);
    }
}
