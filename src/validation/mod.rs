// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for hash requests.
//!
//! Everything here runs before a circuit is built; a rejected request
//! never reaches an evaluator.

use crate::config::{ResourceLimits, MAX_RESILIENCE};
use crate::error::{Result, ValidationError};

/// Validate hash request parameters against resource limits.
pub fn validate_hash_request(
    n_qubits: u32,
    depth: u32,
    shots: u32,
    resilience: u8,
    limits: &ResourceLimits,
) -> Result<()> {
    if n_qubits == 0 {
        return Err(ValidationError::Field {
            field: "n_qubits".into(),
            message: "must be greater than 0".into(),
        }
        .into());
    }

    if n_qubits > limits.max_qubits {
        return Err(ValidationError::ResourceLimit {
            resource: "n_qubits".into(),
            limit: limits.max_qubits as u64,
            requested: n_qubits as u64,
        }
        .into());
    }

    if depth > limits.max_depth {
        return Err(ValidationError::ResourceLimit {
            resource: "depth".into(),
            limit: limits.max_depth as u64,
            requested: depth as u64,
        }
        .into());
    }

    if shots == 0 {
        return Err(ValidationError::Field {
            field: "shots".into(),
            message: "must be greater than 0".into(),
        }
        .into());
    }

    if shots > limits.max_shots {
        return Err(ValidationError::ResourceLimit {
            resource: "shots".into(),
            limit: limits.max_shots as u64,
            requested: shots as u64,
        }
        .into());
    }

    if resilience > MAX_RESILIENCE {
        return Err(ValidationError::Field {
            field: "resilience".into(),
            message: format!("must be in 0..={}, got {}", MAX_RESILIENCE, resilience),
        }
        .into());
    }

    Ok(())
}

/// Validate a remote backend name. Empty means local.
pub fn validate_backend_name(name: &str) -> Result<()> {
    if name.len() > 128 {
        return Err(ValidationError::Field {
            field: "backend".into(),
            message: "must be at most 128 characters".into(),
        }
        .into());
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(ValidationError::Field {
            field: "backend".into(),
            message: "must contain only alphanumeric characters, underscores, hyphens, or dots"
                .into(),
        }
        .into());
    }

    Ok(())
}
