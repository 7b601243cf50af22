// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! One hash invocation, end to end.

use tracing::{debug, info};

use crate::backend::fallback::{EvaluationRequest, EvaluatorAdapter, RuntimeMode};
use crate::circuit::CircuitSpec;
use crate::config::{HashDefaults, ResourceLimits};
use crate::digest::collapse;
use crate::error::Result;
use crate::outcome::OutcomeDistribution;
use crate::record::ResultRecord;
use crate::validation::{validate_backend_name, validate_hash_request};

/// Invocation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRequest {
    pub message: String,
    pub n_qubits: u32,
    pub depth: u32,
    pub seed: u64,
    pub shots: u32,
    /// Remote backend name; empty runs locally
    pub backend: String,
    pub runtime: RuntimeMode,
    pub resilience: u8,
}

impl HashRequest {
    /// Request built from configured defaults, targeting the local simulator.
    pub fn from_defaults(defaults: &HashDefaults) -> Self {
        Self {
            message: defaults.message.clone(),
            n_qubits: defaults.n_qubits,
            depth: defaults.depth,
            seed: defaults.seed,
            shots: defaults.shots,
            backend: String::new(),
            runtime: defaults.runtime,
            resilience: defaults.resilience,
        }
    }

    pub fn validate(&self, limits: &ResourceLimits) -> Result<()> {
        validate_hash_request(
            self.n_qubits,
            self.depth,
            self.shots,
            self.resilience,
            limits,
        )?;
        validate_backend_name(&self.backend)
    }

    /// Build the circuit for this request. The message is hashed as UTF-8 bytes.
    pub fn build_circuit(&self) -> Result<CircuitSpec> {
        Ok(CircuitSpec::build(
            self.n_qubits,
            self.depth,
            self.seed,
            self.message.as_bytes(),
        )?)
    }
}

/// Everything one invocation produced.
#[derive(Debug, Clone)]
pub struct HashOutcome {
    pub circuit: CircuitSpec,
    pub provenance: String,
    pub distribution: OutcomeDistribution,
    pub bit_pattern: String,
    pub digest: String,
}

impl HashOutcome {
    pub fn to_record(&self, request: &HashRequest) -> ResultRecord {
        ResultRecord {
            mode: self.provenance.clone(),
            message: request.message.clone(),
            n_qubits: request.n_qubits,
            depth: request.depth,
            seed: request.seed,
            shots: request.shots,
            top_bitstring: self.bit_pattern.clone(),
            hash_hex: self.digest.clone(),
            counts: self.distribution.clone(),
        }
    }
}

/// Validate, build, evaluate and collapse one request.
pub async fn run(
    request: &HashRequest,
    adapter: &EvaluatorAdapter,
    limits: &ResourceLimits,
) -> Result<HashOutcome> {
    request.validate(limits)?;

    let circuit = request.build_circuit()?;
    let stats = circuit.stats();
    debug!(
        circuit = %circuit.name(),
        operations = stats.total(),
        entangles = stats.entangles,
        "Circuit built"
    );

    let evaluation = adapter
        .evaluate(&EvaluationRequest {
            circuit: &circuit,
            shots: request.shots,
            backend: request.backend.clone(),
            mode: request.runtime,
            resilience: request.resilience,
        })
        .await?;

    let collapsed = collapse(&evaluation.distribution, request.n_qubits);
    info!(
        provenance = %evaluation.provenance,
        top = %collapsed.bit_pattern,
        digest = %collapsed.digest,
        "Hash computed"
    );

    Ok(HashOutcome {
        circuit,
        provenance: evaluation.provenance,
        distribution: evaluation.distribution,
        bit_pattern: collapsed.bit_pattern,
        digest: collapsed.digest,
    })
}
