// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Local state-vector simulator.
//!
//! Evolves the full 2^n amplitude vector exactly and then draws shots from
//! the resulting probability distribution. Always available unless disabled
//! in config; it is the last strategy in every fallback chain.
//!
//! # Conventions
//!
//! Amplitude index bit `q` is the value of qubit `q`. Reported patterns are
//! formatted most-significant qubit first, so qubit 0 is the rightmost
//! character.
//!
//! # Security
//!
//! Simulation runs on the blocking pool under a timeout. When the timeout
//! fires a cancellation flag is raised; the blocking task checks it between
//! operations and before sampling, and stops early.

use async_trait::async_trait;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::r#trait::{Evaluator, EvaluatorKind, RunOptions};
use crate::circuit::{CircuitSpec, Operation};
use crate::config::LocalConfig;
use crate::error::EvalError;
use crate::outcome::OutcomeDistribution;

/// Name reported by the local simulator.
pub const LOCAL_SIMULATOR_NAME: &str = "local_statevector";

/// Local state-vector simulator.
pub struct LocalSimulator {
    max_qubits: u32,
    max_shots: u32,
    timeout: Duration,
    sampling_seed: Option<u64>,
}

impl LocalSimulator {
    /// Create from configuration.
    pub fn new(config: &LocalConfig) -> Result<Self, EvalError> {
        if !config.enabled {
            return Err(EvalError::Unavailable(
                "local simulator is disabled".into(),
            ));
        }
        Ok(Self {
            max_qubits: config.max_qubits,
            max_shots: config.max_shots,
            timeout: Duration::from_secs(config.timeout_sec),
            sampling_seed: config.sampling_seed,
        })
    }

    /// Override the simulation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fix the shot-sampling seed for reproducible counts.
    pub fn with_sampling_seed(mut self, seed: u64) -> Self {
        self.sampling_seed = Some(seed);
        self
    }

    /// Largest circuit this simulator accepts.
    pub fn max_qubits(&self) -> u32 {
        self.max_qubits
    }

    fn check_request(&self, circuit: &CircuitSpec, shots: u32) -> Result<(), EvalError> {
        if circuit.qubit_count() > self.max_qubits {
            return Err(EvalError::InvalidRequest(format!(
                "{} qubits exceeds local simulator limit of {}",
                circuit.qubit_count(),
                self.max_qubits
            )));
        }
        if shots == 0 {
            return Err(EvalError::InvalidRequest(
                "shots must be greater than 0".into(),
            ));
        }
        if shots > self.max_shots {
            return Err(EvalError::InvalidRequest(format!(
                "{} shots exceeds local simulator limit of {}",
                shots, self.max_shots
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Evaluator for LocalSimulator {
    fn name(&self) -> &str {
        LOCAL_SIMULATOR_NAME
    }

    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Simulator
    }

    async fn run(
        &self,
        circuit: &CircuitSpec,
        options: &RunOptions,
    ) -> Result<OutcomeDistribution, EvalError> {
        self.check_request(circuit, options.shots)?;

        debug!(
            circuit = %circuit.name(),
            qubits = circuit.qubit_count(),
            shots = options.shots,
            "Running local simulation"
        );

        let circuit = circuit.clone();
        let shots = options.shots;
        let seed = self.sampling_seed;

        let cancel = Arc::new(AtomicBool::new(false));
        let task_cancel = Arc::clone(&cancel);
        let task = tokio::task::spawn_blocking(move || {
            simulate_cancellable(&circuit, shots, seed, &task_cancel)
        });

        let dist = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_err)) => {
                return Err(EvalError::ExecutionFailed(format!(
                    "simulation task failed: {join_err}"
                )))
            }
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                return Err(EvalError::Timeout(format!(
                    "local simulation exceeded {}s",
                    self.timeout.as_secs()
                )))
            }
        };

        info!(
            outcomes = dist.len(),
            total = dist.total(),
            "Local simulation complete"
        );
        Ok(dist)
    }
}

/// Evolve and sample a circuit synchronously.
pub fn simulate(
    circuit: &CircuitSpec,
    shots: u32,
    sampling_seed: Option<u64>,
) -> Result<OutcomeDistribution, EvalError> {
    simulate_cancellable(circuit, shots, sampling_seed, &AtomicBool::new(false))
}

/// Like [`simulate`], but gives up with [`EvalError::Timeout`] once `cancel`
/// is set.
pub fn simulate_cancellable(
    circuit: &CircuitSpec,
    shots: u32,
    sampling_seed: Option<u64>,
    cancel: &AtomicBool,
) -> Result<OutcomeDistribution, EvalError> {
    let cancelled = || {
        if cancel.load(Ordering::Relaxed) {
            Err(EvalError::Timeout("local simulation cancelled".into()))
        } else {
            Ok(())
        }
    };

    let mut state = StateVector::new(circuit.qubit_count());
    for op in circuit.operations() {
        cancelled()?;
        state.apply(op);
    }
    cancelled()?;

    let mut rng = match sampling_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let samples = state.sample(shots, &mut rng);

    let width = circuit.qubit_count() as usize;
    OutcomeDistribution::from_counts(
        circuit.qubit_count(),
        samples
            .into_iter()
            .map(|(index, count)| (format!("{:0width$b}", index, width = width), count)),
    )
}

/// Dense state vector over `qubit_count` qubits.
#[derive(Debug, Clone)]
pub struct StateVector {
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// All qubits in |0>.
    pub fn new(qubit_count: u32) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1usize << qubit_count];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self { amplitudes }
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) {
        match *op {
            // Preparation acts on |0>, so setting a bit is a NOT.
            Operation::SetBit { qubit, value } => {
                if value {
                    self.apply_x(qubit);
                }
            }
            Operation::RotateZ { qubit, angle } => {
                let half = angle / 2.0;
                let m = [
                    [Complex64::from_polar(1.0, -half), Complex64::new(0.0, 0.0)],
                    [Complex64::new(0.0, 0.0), Complex64::from_polar(1.0, half)],
                ];
                self.apply_single(qubit, &m);
            }
            Operation::RotateX { qubit, angle } => {
                let (s, c) = (angle / 2.0).sin_cos();
                let m = [
                    [Complex64::new(c, 0.0), Complex64::new(0.0, -s)],
                    [Complex64::new(0.0, -s), Complex64::new(c, 0.0)],
                ];
                self.apply_single(qubit, &m);
            }
            Operation::Entangle { control, target } => self.apply_cx(control, target),
            Operation::MeasureAll => {}
        }
    }

    fn apply_single(&mut self, qubit: u32, m: &[[Complex64; 2]; 2]) {
        let step = 1usize << qubit;
        let n = self.amplitudes.len();
        let mut block = 0;
        while block < n {
            for i in block..block + step {
                let j = i + step;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
            block += step << 1;
        }
    }

    fn apply_x(&mut self, qubit: u32) {
        let bit = 1usize << qubit;
        for i in 0..self.amplitudes.len() {
            if i & bit == 0 {
                self.amplitudes.swap(i, i | bit);
            }
        }
    }

    fn apply_cx(&mut self, control: u32, target: u32) {
        let c = 1usize << control;
        let t = 1usize << target;
        for i in 0..self.amplitudes.len() {
            if i & c != 0 && i & t == 0 {
                self.amplitudes.swap(i, i | t);
            }
        }
    }

    /// Measurement probabilities per basis index.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Draw `shots` basis indices; returns index → count.
    pub fn sample<R: Rng>(&self, shots: u32, rng: &mut R) -> BTreeMap<usize, u64> {
        let mut cumulative = Vec::with_capacity(self.amplitudes.len());
        let mut acc = 0.0;
        for p in self.probabilities() {
            acc += p;
            cumulative.push(acc);
        }
        let last = cumulative.len() - 1;

        let mut counts = BTreeMap::new();
        for _ in 0..shots {
            let r: f64 = rng.gen::<f64>() * acc;
            let index = cumulative.partition_point(|&c| c <= r).min(last);
            *counts.entry(index).or_insert(0u64) += 1;
        }
        counts
    }
}
