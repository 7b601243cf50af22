// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Evaluator implementations.
//!
//! This module provides the [`Evaluator`] trait and implementations for
//! the supported sampling paths:
//!
//! - `local::LocalSimulator`: exact state-vector simulator (always built)
//! - `ibm::RuntimeSampler`: IBM Runtime sampler in a managed session
//! - `ibm::DirectProvider`: IBM job API on a named backend
//!
//! [`EvaluatorAdapter`] orders them into a fallback chain.

pub mod fallback;
pub mod ibm;
pub mod local;
pub mod r#trait;

pub use fallback::{
    Capabilities, Evaluation, EvaluationRequest, EvaluatorAdapter, RuntimeMode, Strategy,
};
pub use local::LocalSimulator;
pub use r#trait::{Evaluator, EvaluatorKind, RunOptions};
