// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Circuit descriptions.
//!
//! A [`CircuitSpec`] is the full, immutable operation list evaluated for one
//! hash invocation:
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────┬────────────┐
//! │ message prefix   │ depth × (rotations, entangle) │ MeasureAll │
//! │ (encoder)        │ (generator)                   │            │
//! └──────────────────┴──────────────────────────────┴────────────┘
//! ```

pub mod encoder;
pub mod generator;
pub mod qasm;
pub mod rng;

use std::fmt;

use crate::error::ValidationError;

pub use encoder::encode;
pub use generator::generate;

/// A single operation in a circuit description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// Prepare a qubit in the given basis value (from |0⟩).
    SetBit { qubit: u32, value: bool },
    /// Rotation about the Z axis.
    RotateZ { qubit: u32, angle: f64 },
    /// Rotation about the X axis.
    RotateX { qubit: u32, angle: f64 },
    /// Controlled-NOT.
    Entangle { control: u32, target: u32 },
    /// Terminal measurement of every qubit.
    MeasureAll,
}

impl Operation {
    /// Highest qubit index the operation touches, if any.
    pub fn max_qubit(&self) -> Option<u32> {
        match *self {
            Operation::SetBit { qubit, .. }
            | Operation::RotateZ { qubit, .. }
            | Operation::RotateX { qubit, .. } => Some(qubit),
            Operation::Entangle { control, target } => Some(control.max(target)),
            Operation::MeasureAll => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::SetBit { qubit, value } => write!(f, "set(q{}, {})", qubit, *value as u8),
            Operation::RotateZ { qubit, angle } => write!(f, "rz({:.4}) q{}", angle, qubit),
            Operation::RotateX { qubit, angle } => write!(f, "rx({:.4}) q{}", angle, qubit),
            Operation::Entangle { control, target } => write!(f, "cx q{}, q{}", control, target),
            Operation::MeasureAll => write!(f, "measure_all"),
        }
    }
}

/// Operation counts for a circuit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CircuitStats {
    pub set_bits: usize,
    pub rotations_z: usize,
    pub rotations_x: usize,
    pub entangles: usize,
    pub measurements: usize,
}

impl CircuitStats {
    /// Total number of operations.
    pub fn total(&self) -> usize {
        self.set_bits + self.rotations_z + self.rotations_x + self.entangles + self.measurements
    }
}

/// Immutable circuit description.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitSpec {
    name: String,
    qubit_count: u32,
    depth: u32,
    seed: u64,
    operations: Vec<Operation>,
}

impl CircuitSpec {
    /// Build the full hash circuit: message prefix, generated layers, measurement.
    pub fn build(
        qubit_count: u32,
        depth: u32,
        seed: u64,
        message: &[u8],
    ) -> Result<Self, ValidationError> {
        if qubit_count == 0 {
            return Err(ValidationError::Field {
                field: "n_qubits".into(),
                message: "must be greater than 0".into(),
            });
        }

        let mut operations = encode(message, qubit_count);
        operations.extend(generate(qubit_count, depth, seed));
        operations.push(Operation::MeasureAll);

        Ok(Self {
            name: format!("RQC(n={},d={},seed={})", qubit_count, depth, seed),
            qubit_count,
            depth,
            seed,
            operations,
        })
    }

    /// Wrap an arbitrary operation list, checking qubit indices.
    pub fn from_operations(
        name: impl Into<String>,
        qubit_count: u32,
        operations: Vec<Operation>,
    ) -> Result<Self, ValidationError> {
        if qubit_count == 0 {
            return Err(ValidationError::Field {
                field: "n_qubits".into(),
                message: "must be greater than 0".into(),
            });
        }
        if let Some((index, op)) = operations
            .iter()
            .enumerate()
            .find(|(_, op)| op.max_qubit().is_some_and(|q| q >= qubit_count))
        {
            return Err(ValidationError::Field {
                field: "operations".into(),
                message: format!(
                    "operation {} ({}) references a qubit outside 0..{}",
                    index, op, qubit_count
                ),
            });
        }

        Ok(Self {
            name: name.into(),
            qubit_count,
            depth: 0,
            seed: 0,
            operations,
        })
    }

    /// Diagnostic name, e.g. `RQC(n=6,d=6,seed=12345)`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qubit_count(&self) -> u32 {
        self.qubit_count
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Operations in evaluation order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Count operations by kind.
    pub fn stats(&self) -> CircuitStats {
        let mut stats = CircuitStats::default();
        for op in &self.operations {
            match op {
                Operation::SetBit { .. } => stats.set_bits += 1,
                Operation::RotateZ { .. } => stats.rotations_z += 1,
                Operation::RotateX { .. } => stats.rotations_x += 1,
                Operation::Entangle { .. } => stats.entangles += 1,
                Operation::MeasureAll => stats.measurements += 1,
            }
        }
        stats
    }
}
