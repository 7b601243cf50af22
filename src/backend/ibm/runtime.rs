// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Managed-session evaluator (IBM Runtime Sampler primitive).

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::client::{IbmHttpClient, ReqwestIbmClient};
use super::response::extract_distribution;
use super::{wait_for_job, IbmJobParams, IbmJobRequest, PollSettings};
use crate::backend::r#trait::{Evaluator, EvaluatorKind, RunOptions};
use crate::circuit::{qasm::to_qasm3, CircuitSpec};
use crate::config::IbmConfig;
use crate::error::EvalError;
use crate::outcome::OutcomeDistribution;

/// Runtime program that samples circuits.
pub const SAMPLER_PROGRAM: &str = "sampler";

/// IBM Runtime sampler inside a managed session.
///
/// Each run opens a session on the requested backend, submits one sampler
/// job carrying the resilience level, and closes the session whether or not
/// the job succeeded.
pub struct RuntimeSampler<C: IbmHttpClient = ReqwestIbmClient> {
    client: C,
    optimization_level: u8,
    poll: PollSettings,
}

impl RuntimeSampler<ReqwestIbmClient> {
    /// Create from configuration.
    pub fn from_config(config: &IbmConfig) -> Result<Self, EvalError> {
        if !config.enabled {
            return Err(EvalError::Unavailable("IBM evaluators are disabled".into()));
        }
        let client = ReqwestIbmClient::new(&config.runtime_url, config)?;
        Ok(Self::with_client(config, client))
    }
}

impl<C: IbmHttpClient> RuntimeSampler<C> {
    /// Create with a custom HTTP client (for testing).
    pub fn with_client(config: &IbmConfig, client: C) -> Self {
        Self {
            client,
            optimization_level: config.runtime_optimization_level,
            poll: PollSettings::from_config(config),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn run_in_session(
        &self,
        session_id: &str,
        backend: &str,
        circuit: &CircuitSpec,
        options: &RunOptions,
    ) -> Result<OutcomeDistribution, EvalError> {
        let request = IbmJobRequest {
            program_id: SAMPLER_PROGRAM.to_string(),
            backend: backend.to_string(),
            session_id: Some(session_id.to_string()),
            params: IbmJobParams {
                circuits: vec![to_qasm3(circuit)],
                shots: options.shots,
                optimization_level: self.optimization_level,
                resilience_level: Some(options.resilience),
            },
        };

        let job_id = self.client.submit_job(&request).await?;
        info!(
            job_id = %job_id,
            session_id = %session_id,
            backend = %backend,
            resilience = options.resilience,
            "IBM Runtime sampler job submitted"
        );

        wait_for_job(&self.client, &job_id, self.poll).await?;
        let payload = self.client.job_result(&job_id).await?;
        extract_distribution(&payload, circuit.qubit_count(), options.shots)
    }
}

#[async_trait]
impl<C: IbmHttpClient> Evaluator for RuntimeSampler<C> {
    fn name(&self) -> &str {
        "ibm_runtime"
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
            EvalError::InvalidRequest("Runtime sampler needs a backend name".into())
        })?;

        let session_id = self.client.open_session(backend).await?;
        debug!(session_id = %session_id, backend = %backend, "Runtime session open");

        let result = self
            .run_in_session(&session_id, backend, circuit, options)
            .await;

        if let Err(e) = self.client.close_session(&session_id).await {
            warn!(session_id = %session_id, error = %e, "Failed to close Runtime session");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ibm::MockIbmClient;
    use serde_json::json;

    fn config() -> IbmConfig {
        IbmConfig {
            poll_interval_ms: 1,
            ..Default::default()
        }
    }

    fn options(resilience: u8) -> RunOptions {
        RunOptions {
            shots: 200,
            resilience,
            backend_name: Some("ibm_brisbane".into()),
        }
    }

    #[tokio::test]
    async fn test_runs_in_session_with_resilience() {
        let client = MockIbmClient::new()
            .with_statuses(["Queued", "Completed"])
            .with_result(json!({
                "results": [ { "data": { "meas": { "quasi_dists": [ { "5": 0.5, "2": 0.5 } ] } } } ]
            }));
        let sampler = RuntimeSampler::with_client(&config(), client);
        let circuit = CircuitSpec::build(3, 1, 1, b"a").unwrap();

        let dist = sampler.run(&circuit, &options(2)).await.unwrap();
        assert_eq!(dist.get("101"), 100);
        assert_eq!(dist.get("010"), 100);

        let client = sampler.client();
        assert_eq!(client.opened_sessions(), vec!["ibm_brisbane".to_string()]);
        assert_eq!(client.closed_sessions(), vec!["mock-session-id".to_string()]);

        let submitted = client.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].program_id, SAMPLER_PROGRAM);
        assert_eq!(submitted[0].session_id.as_deref(), Some("mock-session-id"));
        assert_eq!(submitted[0].params.resilience_level, Some(2));
        assert_eq!(submitted[0].params.optimization_level, 1);
        assert!(submitted[0].params.circuits[0].starts_with("OPENQASM 3.0;"));
    }

    #[tokio::test]
    async fn test_session_closed_on_failure() {
        let client = MockIbmClient::new().with_statuses(["Running", "Failed"]);
        let sampler = RuntimeSampler::with_client(&config(), client);
        let circuit = CircuitSpec::build(2, 1, 1, b"").unwrap();

        let err = sampler.run(&circuit, &options(0)).await.unwrap_err();
        assert!(matches!(err, EvalError::ExecutionFailed(_)));
        assert_eq!(sampler.client().closed_sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_session_error_propagates() {
        let client = MockIbmClient::new()
            .with_session_error(EvalError::AuthenticationFailed("bad token".into()));
        let sampler = RuntimeSampler::with_client(&config(), client);
        let circuit = CircuitSpec::build(2, 1, 1, b"").unwrap();

        let err = sampler.run(&circuit, &options(0)).await.unwrap_err();
        assert!(matches!(err, EvalError::AuthenticationFailed(_)));
        assert!(sampler.client().submitted().is_empty());
    }

    #[tokio::test]
    async fn test_requires_backend_name() {
        let sampler = RuntimeSampler::with_client(&config(), MockIbmClient::new());
        let circuit = CircuitSpec::build(2, 1, 1, b"").unwrap();
        let err = sampler
            .run(&circuit, &RunOptions::local(10))
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidRequest(_)));
    }

    #[test]
    fn test_from_config_disabled() {
        let cfg = IbmConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(matches!(
            RuntimeSampler::from_config(&cfg),
            Err(EvalError::Unavailable(_))
        ));
    }
}
