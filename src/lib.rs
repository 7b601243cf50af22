// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! RQC-Hash: message digests from sampled random circuits.
//!
//! A message is written into the initial state of a seeded random circuit,
//! the circuit is sampled, and the most frequent outcome becomes a
//! fixed-width hex digest.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐   ┌──────────────────┐
//! │ Message       │   │ Seeded Structure │
//! │ Encoder       │   │ Generator        │
//! └───────┬───────┘   └────────┬─────────┘
//!         └────── CircuitSpec ─┘
//!                     │
//! ┌───────────────────┴─────────────────────┐
//! │           Evaluator Adapter              │
//! ├──────────────┬──────────────┬───────────┤
//! │ IBM Runtime  │ IBM Provider │  Local    │
//! │ (session)    │ (job API)    │  (exact)  │
//! └──────────────┴──────────────┴───────────┘
//!                     │
//!              Digest Collapser
//! ```
//!
//! # Modules
//!
//! - [`circuit`]: Circuit description, generator, encoder, OpenQASM output
//! - [`backend`]: Evaluator trait, local simulator, IBM evaluators, fallback
//! - [`digest`]: Distribution-to-digest collapse
//! - [`pipeline`]: One invocation end to end
//! - [`config`]: Configuration management
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod backend;
pub mod circuit;
pub mod config;
pub mod digest;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod record;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
