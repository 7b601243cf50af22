// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Message encoding into the initial state.

use super::Operation;

/// Encode message bits onto the first `qubit_count` qubits.
///
/// Bytes are read in order, bits least-significant first. Bit `i` of the
/// stream lands on qubit `i`; only 1-bits emit an operation. Bits past
/// `qubit_count` are dropped.
pub fn encode(message: &[u8], qubit_count: u32) -> Vec<Operation> {
    message
        .iter()
        .flat_map(|&byte| (0..8).map(move |bit| (byte >> bit) & 1 == 1))
        .take(qubit_count as usize)
        .enumerate()
        .filter(|&(_, set)| set)
        .map(|(index, _)| Operation::SetBit {
            qubit: index as u32,
            value: true,
        })
        .collect()
}
