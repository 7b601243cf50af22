// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities for evaluator tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::backend::r#trait::{Evaluator, EvaluatorKind, RunOptions};
use crate::circuit::CircuitSpec;
use crate::error::EvalError;
use crate::outcome::OutcomeDistribution;

/// Mock evaluator that returns the same counts for every circuit.
pub struct FixedEvaluator {
    pub name: String,
    pub counts: Vec<(String, u64)>,
}

impl FixedEvaluator {
    pub fn new(name: &str, counts: &[(&str, u64)]) -> Self {
        Self {
            name: name.to_string(),
            counts: counts.iter().map(|&(k, v)| (k.to_string(), v)).collect(),
        }
    }

    pub fn arc(name: &str, counts: &[(&str, u64)]) -> Arc<dyn Evaluator> {
        Arc::new(Self::new(name, counts))
    }
}

#[async_trait]
impl Evaluator for FixedEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Simulator
    }

    async fn run(
        &self,
        circuit: &CircuitSpec,
        _options: &RunOptions,
    ) -> Result<OutcomeDistribution, EvalError> {
        OutcomeDistribution::from_counts(circuit.qubit_count(), self.counts.clone())
    }
}

/// Mock evaluator that always returns errors.
pub struct FailingEvaluator {
    pub name: String,
}

impl FailingEvaluator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn arc(name: &str) -> Arc<dyn Evaluator> {
        Arc::new(Self::new(name))
    }
}

#[async_trait]
impl Evaluator for FailingEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Hardware
    }

    async fn run(
        &self,
        _circuit: &CircuitSpec,
        _options: &RunOptions,
    ) -> Result<OutcomeDistribution, EvalError> {
        Err(EvalError::ExecutionFailed(format!(
            "{}: mock execution failure",
            self.name
        )))
    }
}

/// Wraps an evaluator and records how it was called.
pub struct CountingEvaluator {
    inner: Arc<dyn Evaluator>,
    calls: Mutex<usize>,
    last_options: Mutex<Option<RunOptions>>,
}

impl CountingEvaluator {
    pub fn wrap(inner: Arc<dyn Evaluator>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: Mutex::new(0),
            last_options: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }

    pub fn last_options(&self) -> Option<RunOptions> {
        self.last_options.lock().clone()
    }
}

#[async_trait]
impl Evaluator for CountingEvaluator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> EvaluatorKind {
        self.inner.kind()
    }

    async fn run(
        &self,
        circuit: &CircuitSpec,
        options: &RunOptions,
    ) -> Result<OutcomeDistribution, EvalError> {
        *self.calls.lock() += 1;
        *self.last_options.lock() = Some(options.clone());
        self.inner.run(circuit, options).await
    }
}
