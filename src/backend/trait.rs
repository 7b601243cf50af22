// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Evaluator trait definition.

use async_trait::async_trait;

use crate::circuit::CircuitSpec;
use crate::error::EvalError;
use crate::outcome::OutcomeDistribution;

/// Kind of evaluator (simulator or hardware).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorKind {
    /// Local or remote simulator
    Simulator,
    /// Real quantum hardware
    Hardware,
}

impl std::fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluatorKind::Simulator => write!(f, "simulator"),
            EvaluatorKind::Hardware => write!(f, "hardware"),
        }
    }
}

/// Per-run options passed alongside the circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Number of shots
    pub shots: u32,
    /// Error-mitigation level (Runtime sampler only)
    pub resilience: u8,
    /// Remote backend name, if any
    pub backend_name: Option<String>,
}

impl RunOptions {
    /// Options for a local run.
    pub fn local(shots: u32) -> Self {
        Self {
            shots,
            resilience: 0,
            backend_name: None,
        }
    }
}

/// The trait that all evaluators must implement.
///
/// An evaluator samples a circuit `shots` times and returns the observed
/// bit-pattern counts. Remote evaluators report every failure as an
/// [`EvalError`] so callers can fall through to the next strategy.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Get the evaluator name.
    fn name(&self) -> &str;

    /// Get the evaluator kind.
    fn kind(&self) -> EvaluatorKind;

    /// Sample the circuit and return its outcome distribution.
    async fn run(
        &self,
        circuit: &CircuitSpec,
        options: &RunOptions,
    ) -> Result<OutcomeDistribution, EvalError>;
}
