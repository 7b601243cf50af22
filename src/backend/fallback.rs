// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Evaluator selection with ordered fallback.
//!
//! A request is turned into an ordered list of [`Strategy`] values. Each is
//! attempted in turn and the first success wins. Remote failures are logged
//! and skipped; the local simulator always closes the list, so evaluation
//! only fails when the local simulator itself is missing or fails.
//!
//! | backend  | mode             | strategies                                   |
//! |----------|------------------|----------------------------------------------|
//! | empty    | any              | local                                        |
//! | set      | auto / cloud     | managed session, direct provider, local      |
//! | set      | provider         | direct provider, local                       |
//! | set      | unset            | local (with warning)                         |
//!
//! Remote strategies are only listed when the matching capability is present.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::ibm::{DirectProvider, RuntimeSampler};
use super::local::LocalSimulator;
use super::r#trait::{Evaluator, RunOptions};
use crate::circuit::CircuitSpec;
use crate::config::BackendsConfig;
use crate::error::EvalError;
use crate::outcome::OutcomeDistribution;

/// Remote connection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// No remote path; always local
    #[serde(rename = "", alias = "none")]
    Unset,
    /// Try the managed session, then the direct provider
    #[default]
    Auto,
    /// Direct provider only
    #[serde(alias = "local-remote-a")]
    Provider,
    /// Managed session, then direct provider
    #[serde(alias = "local-remote-b", alias = "runtime")]
    Cloud,
}

impl RuntimeMode {
    /// Whether the managed-session strategy may be tried.
    pub fn allows_managed_session(&self) -> bool {
        matches!(self, RuntimeMode::Auto | RuntimeMode::Cloud)
    }

    /// Whether the direct-provider strategy may be tried.
    pub fn allows_direct_provider(&self) -> bool {
        matches!(
            self,
            RuntimeMode::Auto | RuntimeMode::Provider | RuntimeMode::Cloud
        )
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeMode::Unset => write!(f, "none"),
            RuntimeMode::Auto => write!(f, "auto"),
            RuntimeMode::Provider => write!(f, "provider"),
            RuntimeMode::Cloud => write!(f, "cloud"),
        }
    }
}

impl FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(RuntimeMode::Unset),
            "auto" => Ok(RuntimeMode::Auto),
            "provider" | "local-remote-a" => Ok(RuntimeMode::Provider),
            "cloud" | "runtime" | "local-remote-b" => Ok(RuntimeMode::Cloud),
            other => Err(format!(
                "unknown runtime mode '{other}' (expected auto, provider, cloud or empty)"
            )),
        }
    }
}

/// Which evaluators this process can use. Computed once at start-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub local_simulator: bool,
    pub managed_session: bool,
    pub direct_provider: bool,
}

impl Capabilities {
    /// Derive capabilities from config and compiled features.
    pub fn detect(config: &BackendsConfig) -> Self {
        let ibm = cfg!(feature = "ibm") && config.ibm.enabled && config.ibm.has_credentials();
        Self {
            local_simulator: config.local.enabled,
            managed_session: ibm,
            direct_provider: ibm,
        }
    }
}

/// One evaluation request. Immutable per call.
#[derive(Debug, Clone)]
pub struct EvaluationRequest<'a> {
    pub circuit: &'a CircuitSpec,
    pub shots: u32,
    /// Remote backend name; empty means local
    pub backend: String,
    pub mode: RuntimeMode,
    /// Error-mitigation level, used by the managed session only
    pub resilience: u8,
}

/// One entry in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// IBM Runtime sampler inside a session
    ManagedSession,
    /// IBM job API without a session
    DirectProvider,
    /// Local simulator; `fallback` is set when a backend was requested
    Local { fallback: bool },
}

impl Strategy {
    /// Human-readable name of the evaluator path.
    pub fn provenance(&self, request: &EvaluationRequest<'_>) -> String {
        match self {
            Strategy::ManagedSession => format!(
                "IBM Runtime (backend={}, resilience={})",
                request.backend, request.resilience
            ),
            Strategy::DirectProvider => format!("IBM Provider (backend={})", request.backend),
            Strategy::Local { .. } => "Local simulator".to_string(),
        }
    }
}

/// Outcome of a successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub distribution: OutcomeDistribution,
    pub provenance: String,
    pub strategy: Strategy,
}

/// Uniform front over the available evaluators.
#[derive(Default)]
pub struct EvaluatorAdapter {
    local: Option<Arc<dyn Evaluator>>,
    managed_session: Option<Arc<dyn Evaluator>>,
    direct_provider: Option<Arc<dyn Evaluator>>,
}

impl EvaluatorAdapter {
    /// Adapter with no evaluators.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.local = Some(evaluator);
        self
    }

    pub fn with_managed_session(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.managed_session = Some(evaluator);
        self
    }

    pub fn with_direct_provider(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.direct_provider = Some(evaluator);
        self
    }

    /// Build every evaluator the detected capabilities allow.
    ///
    /// Evaluators that fail to initialize are logged and left out.
    pub fn from_config(config: &BackendsConfig) -> Self {
        let caps = Capabilities::detect(config);
        let mut adapter = Self::new();

        if caps.local_simulator {
            match LocalSimulator::new(&config.local) {
                Ok(sim) => adapter.local = Some(Arc::new(sim)),
                Err(e) => warn!(error = %e, "Local simulator unavailable"),
            }
        }
        if caps.managed_session {
            match RuntimeSampler::from_config(&config.ibm) {
                Ok(sampler) => adapter.managed_session = Some(Arc::new(sampler)),
                Err(e) => warn!(error = %e, "IBM Runtime sampler unavailable"),
            }
        }
        if caps.direct_provider {
            match DirectProvider::from_config(&config.ibm) {
                Ok(provider) => adapter.direct_provider = Some(Arc::new(provider)),
                Err(e) => warn!(error = %e, "IBM direct provider unavailable"),
            }
        }

        info!(
            local = adapter.local.is_some(),
            managed_session = adapter.managed_session.is_some(),
            direct_provider = adapter.direct_provider.is_some(),
            "Evaluators initialized"
        );
        adapter
    }

    /// Capabilities actually available after initialization.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            local_simulator: self.local.is_some(),
            managed_session: self.managed_session.is_some(),
            direct_provider: self.direct_provider.is_some(),
        }
    }

    /// Ordered strategies for a request.
    pub fn plan(&self, request: &EvaluationRequest<'_>) -> Vec<Strategy> {
        if request.backend.trim().is_empty() {
            return vec![Strategy::Local { fallback: false }];
        }

        let caps = self.capabilities();
        let mut plan = Vec::with_capacity(3);
        if request.mode.allows_managed_session() && caps.managed_session {
            plan.push(Strategy::ManagedSession);
        }
        if request.mode.allows_direct_provider() && caps.direct_provider {
            plan.push(Strategy::DirectProvider);
        }
        plan.push(Strategy::Local { fallback: true });
        plan
    }

    /// Evaluate a request, falling back until something succeeds.
    pub async fn evaluate(&self, request: &EvaluationRequest<'_>) -> Result<Evaluation, EvalError> {
        if self.local.is_none() {
            return Err(EvalError::Unavailable(
                "local simulator is not available".into(),
            ));
        }

        for strategy in self.plan(request) {
            match self.attempt(strategy, request).await {
                Ok(distribution) => {
                    let provenance = strategy.provenance(request);
                    info!(provenance = %provenance, outcomes = distribution.len(), "Evaluation succeeded");
                    return Ok(Evaluation {
                        distribution,
                        provenance,
                        strategy,
                    });
                }
                Err(e) if matches!(strategy, Strategy::Local { .. }) => return Err(e),
                Err(e) => {
                    warn!(
                        strategy = ?strategy,
                        backend = %request.backend,
                        error = %e,
                        "Remote evaluation failed, falling back"
                    );
                }
            }
        }

        Err(EvalError::Unavailable("no evaluator succeeded".into()))
    }

    async fn attempt(
        &self,
        strategy: Strategy,
        request: &EvaluationRequest<'_>,
    ) -> Result<OutcomeDistribution, EvalError> {
        let (evaluator, options) = match strategy {
            Strategy::ManagedSession => (
                self.managed_session.as_ref(),
                RunOptions {
                    shots: request.shots,
                    resilience: request.resilience,
                    backend_name: Some(request.backend.clone()),
                },
            ),
            Strategy::DirectProvider => (
                self.direct_provider.as_ref(),
                RunOptions {
                    shots: request.shots,
                    resilience: 0,
                    backend_name: Some(request.backend.clone()),
                },
            ),
            Strategy::Local { fallback } => {
                if fallback {
                    warn!(
                        backend = %request.backend,
                        mode = %request.mode,
                        "No remote evaluator succeeded, using local simulator"
                    );
                }
                (self.local.as_ref(), RunOptions::local(request.shots))
            }
        };

        let evaluator = evaluator
            .ok_or_else(|| EvalError::NotFound(format!("{strategy:?} evaluator")))?;
        debug!(evaluator = %evaluator.name(), kind = %evaluator.kind(), "Attempting evaluation");

        let distribution = evaluator.run(request.circuit, &options).await?;

        if distribution.total() > u64::from(request.shots) {
            return Err(EvalError::UnrecognizedResponse(format!(
                "{} returned {} outcomes for {} shots",
                evaluator.name(),
                distribution.total(),
                request.shots
            )));
        }
        Ok(distribution)
    }
}
