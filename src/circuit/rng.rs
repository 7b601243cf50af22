// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Seeded angle stream.
//!
//! The stream reproduces NumPy's `default_rng(seed).random()` sequence bit for
//! bit: the integer seed is expanded through `SeedSequence` entropy pooling
//! into a 128-bit state and increment for PCG64 (XSL-RR 128/64), and every
//! draw is the top 53 bits of the next 64-bit output scaled into `[0, 1)`.
//!
//! Keeping this exact is what lets a digest computed here match one computed
//! by any other implementation that seeds its circuits the same way.

use rand::RngCore;
use rand_pcg::Pcg64;

const POOL_SIZE: usize = 4;
const INIT_A: u32 = 0x43b0_d7e5;
const MULT_A: u32 = 0x931e_8875;
const INIT_B: u32 = 0x8b51_f9dd;
const MULT_B: u32 = 0x58f3_8ded;
const MIX_MULT_L: u32 = 0xca01_f9dd;
const MIX_MULT_R: u32 = 0x4973_f715;
const XSHIFT: u32 = 16;

/// 2^-53, the spacing of doubles in [0.5, 1).
const DOUBLE_UNIT: f64 = 1.0 / 9_007_199_254_740_992.0;

/// Entropy pool equivalent to NumPy's `SeedSequence` for a plain integer seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSequence {
    pool: [u32; POOL_SIZE],
}

impl SeedSequence {
    /// Mix an integer seed into a fresh pool.
    pub fn new(seed: u64) -> Self {
        let entropy = seed_words(seed);
        let mut pool = [0u32; POOL_SIZE];
        let mut hash_const = INIT_A;

        for (i, slot) in pool.iter_mut().enumerate() {
            let word = entropy.get(i).copied().unwrap_or(0);
            *slot = hashmix(word, &mut hash_const);
        }
        for src in 0..POOL_SIZE {
            for dst in 0..POOL_SIZE {
                if src != dst {
                    let hashed = hashmix(pool[src], &mut hash_const);
                    pool[dst] = mix(pool[dst], hashed);
                }
            }
        }
        for &word in entropy.iter().skip(POOL_SIZE) {
            for dst in 0..POOL_SIZE {
                let hashed = hashmix(word, &mut hash_const);
                pool[dst] = mix(pool[dst], hashed);
            }
        }

        Self { pool }
    }

    /// Draw `n_words` 64-bit words of generator state from the pool.
    pub fn generate_state(&self, n_words: usize) -> Vec<u64> {
        let mut hash_const = INIT_B;
        let words32: Vec<u32> = self
            .pool
            .iter()
            .cycle()
            .take(n_words * 2)
            .map(|&value| {
                let mut data = value ^ hash_const;
                hash_const = hash_const.wrapping_mul(MULT_B);
                data = data.wrapping_mul(hash_const);
                data ^ (data >> XSHIFT)
            })
            .collect();

        words32
            .chunks_exact(2)
            .map(|pair| u64::from(pair[0]) | (u64::from(pair[1]) << 32))
            .collect()
    }
}

/// Split a seed into little-endian 32-bit words; zero still yields one word.
fn seed_words(seed: u64) -> Vec<u32> {
    let low = seed as u32;
    let high = (seed >> 32) as u32;
    if high == 0 {
        vec![low]
    } else {
        vec![low, high]
    }
}

fn hashmix(value: u32, hash_const: &mut u32) -> u32 {
    let mut value = value ^ *hash_const;
    *hash_const = hash_const.wrapping_mul(MULT_A);
    value = value.wrapping_mul(*hash_const);
    value ^ (value >> XSHIFT)
}

fn mix(x: u32, y: u32) -> u32 {
    let result = MIX_MULT_L.wrapping_mul(x).wrapping_sub(MIX_MULT_R.wrapping_mul(y));
    result ^ (result >> XSHIFT)
}

/// Deterministic stream of uniform reals and rotation angles.
#[derive(Debug, Clone)]
pub struct AngleStream {
    rng: Pcg64,
}

impl AngleStream {
    /// Seed a new stream.
    pub fn new(seed: u64) -> Self {
        let words = SeedSequence::new(seed).generate_state(4);
        let state = (u128::from(words[0]) << 64) | u128::from(words[1]);
        let stream = (u128::from(words[2]) << 64) | u128::from(words[3]);
        Self {
            rng: Pcg64::new(state, stream),
        }
    }

    /// Next uniform real in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 * DOUBLE_UNIT
    }

    /// Next angle in `[0, 2π)`.
    pub fn next_angle(&mut self) -> f64 {
        self.next_unit() * 2.0 * std::f64::consts::PI
    }
}
