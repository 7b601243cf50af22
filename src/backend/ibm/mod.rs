// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! IBM Quantum evaluators.
//!
//! Two remote paths share one HTTP client abstraction:
//!
//! - [`RuntimeSampler`]: opens a managed session and runs the Sampler
//!   primitive, passing the resilience level through. Results arrive as
//!   quasi-probability distributions.
//! - [`DirectProvider`]: submits the circuit as a plain job on a named
//!   backend without a session. Results arrive as integer counts.
//!
//! # Architecture
//!
//! Both evaluators are generic over [`IbmHttpClient`], enabling deterministic
//! testing with [`MockIbmClient`] while using [`ReqwestIbmClient`] in
//! production. Circuits travel as OpenQASM 3.0.

pub mod client;
pub mod provider;
pub mod response;
pub mod runtime;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::EvalError;

pub use client::{IbmHttpClient, MockIbmClient, ReqwestIbmClient};
pub use provider::DirectProvider;
pub use runtime::RuntimeSampler;

/// IBM job request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IbmJobRequest {
    /// Program ID ("sampler" for Runtime, "circuit-runner" for direct jobs).
    pub program_id: String,
    /// Backend name.
    pub backend: String,
    /// Session the job belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Input parameters.
    pub params: IbmJobParams,
}

/// IBM job input parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IbmJobParams {
    /// OpenQASM 3.0 circuits.
    pub circuits: Vec<String>,
    /// Number of shots.
    pub shots: u32,
    /// Transpiler optimization level (0–3).
    pub optimization_level: u8,
    /// Error-mitigation level (Runtime sampler only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resilience_level: Option<u8>,
}

/// Job creation response.
#[derive(Debug, Clone, Deserialize)]
pub struct IbmJobResponse {
    /// Job ID.
    pub id: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct IbmJobStatus {
    /// Job status, e.g. "Queued", "Running", "Completed".
    pub status: String,
}

/// Session creation response.
#[derive(Debug, Clone, Deserialize)]
pub struct IbmSessionResponse {
    /// Session ID.
    pub id: String,
}

/// Polling parameters for a submitted job.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Give up after this long (queue plus execution).
    pub timeout: Duration,
    /// Delay between status checks.
    pub interval: Duration,
}

impl PollSettings {
    pub fn from_config(config: &crate::config::IbmConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.job_timeout_sec),
            interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// Poll a job until it reaches a terminal status.
pub async fn wait_for_job<C>(client: &C, job_id: &str, poll: PollSettings) -> Result<(), EvalError>
where
    C: IbmHttpClient + ?Sized,
{
    let start = Instant::now();

    loop {
        let status = client.job_status(job_id).await?;

        match status.as_str() {
            "DONE" | "Completed" | "COMPLETED" => {
                info!(job_id = %job_id, elapsed_ms = start.elapsed().as_millis() as u64, "IBM job completed");
                return Ok(());
            }
            "FAILED" | "Failed" | "CANCELLED" | "Cancelled" | "ERROR" => {
                return Err(EvalError::ExecutionFailed(format!(
                    "IBM job {job_id} finished with status: {status}"
                )));
            }
            _ => {
                if start.elapsed() >= poll.timeout {
                    return Err(EvalError::Timeout(format!(
                        "IBM job {job_id} still '{status}' after {}s",
                        poll.timeout.as_secs()
                    )));
                }
                debug!(job_id = %job_id, status = %status, "IBM job still running");
                tokio::time::sleep(poll.interval).await;
            }
        }
    }
}
