// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Direct provider evaluator (plain job on a named backend).

use async_trait::async_trait;
use tracing::info;

use super::client::{IbmHttpClient, ReqwestIbmClient};
use super::response::extract_distribution;
use super::{wait_for_job, IbmJobParams, IbmJobRequest, PollSettings};
use crate::backend::r#trait::{Evaluator, EvaluatorKind, RunOptions};
use crate::circuit::{qasm::to_qasm3, CircuitSpec};
use crate::config::IbmConfig;
use crate::error::EvalError;
use crate::outcome::OutcomeDistribution;

/// Program that runs circuits and reports counts.
pub const CIRCUIT_RUNNER_PROGRAM: &str = "circuit-runner";

/// Direct provider job API. No session, no error mitigation.
pub struct DirectProvider<C: IbmHttpClient = ReqwestIbmClient> {
    client: C,
    optimization_level: u8,
    poll: PollSettings,
}

impl DirectProvider<ReqwestIbmClient> {
    /// Create from configuration.
    pub fn from_config(config: &IbmConfig) -> Result<Self, EvalError> {
        if !config.enabled {
            return Err(EvalError::Unavailable("IBM evaluators are disabled".into()));
        }
        let client = ReqwestIbmClient::new(&config.api_url, config)?;
        Ok(Self::with_client(config, client))
    }
}

impl<C: IbmHttpClient> DirectProvider<C> {
    /// Create with a custom HTTP client (for testing).
    pub fn with_client(config: &IbmConfig, client: C) -> Self {
        Self {
            client,
            optimization_level: config.provider_optimization_level,
            poll: PollSettings::from_config(config),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: IbmHttpClient> Evaluator for DirectProvider<C> {
    fn name(&self) -> &str {
        "ibm_provider"
    }

    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Hardware
    }

    async fn run(
        &self,
        circuit: &CircuitSpec,
        options: &RunOptions,
    ) -> Result<OutcomeDistribution, EvalError> {
        let backend = options.backend_name.as_deref().ok_or_else(|| {
            EvalError::InvalidRequest("direct provider needs a backend name".into())
        })?;

        let request = IbmJobRequest {
            program_id: CIRCUIT_RUNNER_PROGRAM.to_string(),
            backend: backend.to_string(),
            session_id: None,
            params: IbmJobParams {
                circuits: vec![to_qasm3(circuit)],
                shots: options.shots,
                optimization_level: self.optimization_level,
                resilience_level: None,
            },
        };

        let job_id = self.client.submit_job(&request).await?;
        info!(job_id = %job_id, backend = %backend, "IBM provider job submitted");

        wait_for_job(&self.client, &job_id, self.poll).await?;
        let payload = self.client.job_result(&job_id).await?;
        extract_distribution(&payload, circuit.qubit_count(), options.shots)
    }
}
