// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Seeded layer generator.

use super::rng::AngleStream;
use super::Operation;

/// Generate `depth` layers of random rotations and entanglers.
///
/// Each layer draws two angles per qubit in ascending qubit order (first Z,
/// then X). Entanglers follow: even pairs first, then odd pairs. With more
/// than two qubits the ring is closed with `(n-1, 0)`. The result depends
/// only on the three arguments.
pub fn generate(qubit_count: u32, depth: u32, seed: u64) -> Vec<Operation> {
    let mut stream = AngleStream::new(seed);
    let mut operations = Vec::with_capacity(layer_len(qubit_count) * depth as usize);

    for _ in 0..depth {
        for qubit in 0..qubit_count {
            let z_angle = stream.next_angle();
            let x_angle = stream.next_angle();
            operations.push(Operation::RotateZ {
                qubit,
                angle: z_angle,
            });
            operations.push(Operation::RotateX {
                qubit,
                angle: x_angle,
            });
        }
        push_entanglers(&mut operations, qubit_count);
    }

    operations
}

fn push_entanglers(operations: &mut Vec<Operation>, qubit_count: u32) {
    for control in (0..qubit_count.saturating_sub(1)).step_by(2) {
        operations.push(Operation::Entangle {
            control,
            target: control + 1,
        });
    }
    for control in (1..qubit_count.saturating_sub(1)).step_by(2) {
        operations.push(Operation::Entangle {
            control,
            target: control + 1,
        });
    }
    if qubit_count > 2 {
        operations.push(Operation::Entangle {
            control: qubit_count - 1,
            target: 0,
        });
    }
}

/// Operations per layer: two rotations per qubit plus the entanglers.
fn layer_len(qubit_count: u32) -> usize {
    let n = qubit_count as usize;
    let ring = usize::from(n > 2);
    2 * n + n.saturating_sub(1) + ring
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entangles(ops: &[Operation]) -> Vec<(u32, u32)> {
        ops.iter()
            .filter_map(|op| match *op {
                Operation::Entangle { control, target } => Some((control, target)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_deterministic() {
        for &(n, d, seed) in &[(1, 1, 0), (5, 6, 42), (8, 3, 12345), (13, 2, u64::MAX)] {
            assert_eq!(generate(n, d, seed), generate(n, d, seed));
        }
    }

    #[test]
    fn test_seed_changes_angles() {
        assert_ne!(generate(4, 2, 1), generate(4, 2, 2));
    }

    #[test]
    fn test_zero_depth_is_empty() {
        assert!(generate(5, 0, 9).is_empty());
    }

    #[test]
    fn test_two_qubits_single_even_pair() {
        let ops = generate(2, 1, 7);
        assert_eq!(entangles(&ops), vec![(0, 1)]);
    }

    #[test]
    fn test_three_qubits_pairs_then_wrap() {
        // even (0,1); odd (1,2) since 1 + 1 < 3; ring closes with (2,0)
        let ops = generate(3, 1, 7);
        assert_eq!(entangles(&ops), vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_one_qubit_has_no_entanglers() {
        let ops = generate(1, 3, 7);
        assert!(entangles(&ops).is_empty());
        assert_eq!(ops.len(), 6);
    }

    #[test]
    fn test_entangler_order_six_qubits() {
        let ops = generate(6, 1, 0);
        assert_eq!(
            entangles(&ops),
            vec![(0, 1), (2, 3), (4, 5), (1, 2), (3, 4), (5, 0)]
        );
    }

    #[test]
    fn test_rotation_order_and_draw_sequence() {
        let ops = generate(2, 1, 42);
        let mut stream = AngleStream::new(42);
        let expected = [
            Operation::RotateZ { qubit: 0, angle: stream.next_angle() },
            Operation::RotateX { qubit: 0, angle: stream.next_angle() },
            Operation::RotateZ { qubit: 1, angle: stream.next_angle() },
            Operation::RotateX { qubit: 1, angle: stream.next_angle() },
        ];
        assert_eq!(&ops[..4], &expected);
    }

    #[test]
    fn test_layer_len_matches_output() {
        for n in 1..=10 {
            assert_eq!(generate(n, 1, 3).len(), layer_len(n));
        }
    }
}
