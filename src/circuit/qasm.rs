// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! OpenQASM 3.0 rendering.
//!
//! Remote evaluators receive circuits in this form. Classical bit `c[i]`
//! measures qubit `q[i]`, so reported bitstrings are `c[n-1]..c[0]`, the
//! same most-significant-qubit-first order the local simulator produces.

use std::fmt::Write as _;

use super::{CircuitSpec, Operation};

/// Render a circuit as an OpenQASM 3.0 program.
pub fn to_qasm3(spec: &CircuitSpec) -> String {
    let n = spec.qubit_count();
    let mut qasm = String::from("OPENQASM 3.0;\n");
    qasm.push_str("include \"stdgates.inc\";\n");
    let _ = writeln!(qasm, "// {}", spec.name());
    let _ = writeln!(qasm, "qubit[{n}] q;");
    let _ = writeln!(qasm, "bit[{n}] c;\n");

    for op in spec.operations() {
        match *op {
            Operation::SetBit { qubit, value } => {
                if value {
                    let _ = writeln!(qasm, "x q[{qubit}];");
                }
            }
            // `{}` on f64 prints the shortest string that round-trips
            Operation::RotateZ { qubit, angle } => {
                let _ = writeln!(qasm, "rz({angle}) q[{qubit}];");
            }
            Operation::RotateX { qubit, angle } => {
                let _ = writeln!(qasm, "rx({angle}) q[{qubit}];");
            }
            Operation::Entangle { control, target } => {
                let _ = writeln!(qasm, "cx q[{control}], q[{target}];");
            }
            Operation::MeasureAll => {
                for i in 0..n {
                    let _ = writeln!(qasm, "c[{i}] = measure q[{i}];");
                }
            }
        }
    }

    qasm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qasm_header_and_measure() {
        let spec = CircuitSpec::build(3, 1, 5, b"\x01").unwrap();
        let qasm = to_qasm3(&spec);

        assert!(qasm.starts_with("OPENQASM 3.0;"));
        assert!(qasm.contains("qubit[3] q;"));
        assert!(qasm.contains("x q[0];"));
        assert!(qasm.contains("cx q[2], q[0];"));
        assert!(qasm.contains("c[2] = measure q[2];"));
    }

    #[test]
    fn test_qasm_angles_round_trip() {
        let spec = CircuitSpec::build(1, 1, 42, b"").unwrap();
        let qasm = to_qasm3(&spec);
        let Operation::RotateZ { angle, .. } = spec.operations()[0] else {
            panic!("expected rz first");
        };
        let line = qasm.lines().find(|l| l.starts_with("rz(")).unwrap();
        let inner = &line[3..line.find(')').unwrap()];
        assert_eq!(inner.parse::<f64>().unwrap(), angle);
    }

    #[test]
    fn test_set_bit_false_emits_nothing() {
        let spec = CircuitSpec::from_operations(
            "clear",
            2,
            vec![Operation::SetBit { qubit: 1, value: false }],
        )
        .unwrap();
        assert!(!to_qasm3(&spec).contains("x q[1];"));
    }
}
