// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Persisted result record.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::outcome::OutcomeDistribution;

/// One invocation's result, written as pretty-printed JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Provenance of the evaluator actually used
    pub mode: String,
    pub message: String,
    pub n_qubits: u32,
    pub depth: u32,
    pub seed: u64,
    pub shots: u32,
    pub top_bitstring: String,
    pub hash_hex: String,
    pub counts: OutcomeDistribution,
}

impl ResultRecord {
    /// Write the record, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
