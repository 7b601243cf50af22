// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP client abstraction for the IBM Quantum APIs.
//!
//! Provides [`IbmHttpClient`] trait for abstracting HTTP operations and
//! [`ReqwestIbmClient`] for production use, plus [`MockIbmClient`] for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::error::EvalError;

use super::IbmJobRequest;

/// Trait for IBM Quantum HTTP operations.
///
/// This trait enables testing the evaluators without real HTTP calls.
#[async_trait]
pub trait IbmHttpClient: Send + Sync {
    /// Open a session on a backend and return its ID.
    async fn open_session(&self, backend: &str) -> Result<String, EvalError>;

    /// Close a previously opened session.
    async fn close_session(&self, session_id: &str) -> Result<(), EvalError>;

    /// Submit a job and return its ID.
    async fn submit_job(&self, request: &IbmJobRequest) -> Result<String, EvalError>;

    /// Current status string of a job.
    async fn job_status(&self, job_id: &str) -> Result<String, EvalError>;

    /// Raw result payload of a completed job.
    async fn job_result(&self, job_id: &str) -> Result<serde_json::Value, EvalError>;
}

#[cfg(feature = "ibm")]
pub use self::reqwest_client::ReqwestIbmClient;

#[cfg(feature = "ibm")]
mod reqwest_client {
    use super::*;
    use reqwest::StatusCode;
    use secrecy::{ExposeSecret, SecretString};
    use std::time::Duration;
    use tracing::{debug, warn};

    use crate::backend::ibm::{IbmJobResponse, IbmJobStatus, IbmSessionResponse};
    use crate::config::IbmConfig;

    /// Production HTTP client using reqwest with retry logic.
    pub struct ReqwestIbmClient {
        client: reqwest::Client,
        base_url: String,
        token: SecretString,
        instance: Option<String>,
        max_retries: u32,
        retry_base_delay_ms: u64,
    }

    impl std::fmt::Debug for ReqwestIbmClient {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ReqwestIbmClient")
                .field("base_url", &self.base_url)
                .field("token", &"[REDACTED]")
                .field("instance", &self.instance)
                .field("max_retries", &self.max_retries)
                .finish()
        }
    }

    impl ReqwestIbmClient {
        /// Create a client against `base_url` using credentials from config.
        pub fn new(base_url: &str, config: &IbmConfig) -> Result<Self, EvalError> {
            let token = config
                .auth_token
                .clone()
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| {
                    EvalError::AuthenticationFailed(
                        "IBM token not configured. Set QISKIT_IBM_TOKEN or \
                         backends.ibm.auth_token"
                            .to_string(),
                    )
                })?;

            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_sec))
                .build()
                .map_err(|e| EvalError::Http(format!("Failed to create HTTP client: {e}")))?;

            Ok(Self {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
                token: SecretString::from(token),
                instance: config.instance.clone(),
                max_retries: config.max_retries,
                retry_base_delay_ms: config.retry_base_delay_ms,
            })
        }

        fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
            let builder = builder.bearer_auth(self.token.expose_secret());
            match &self.instance {
                Some(instance) => builder.header("Service-CRN", instance),
                None => builder,
            }
        }

        /// Send a request with exponential backoff retry.
        ///
        /// Retries on: 429, 5xx, connect/timeout errors.
        /// Does not retry: 400, 401, 403, 404.
        /// Backoff: `min(base_delay * 2^attempt, 30_000ms)` plus jitter on odd attempts.
        async fn send_with_retry<F>(
            &self,
            operation: &str,
            make_request: F,
        ) -> Result<reqwest::Response, EvalError>
        where
            F: Fn() -> reqwest::RequestBuilder,
        {
            let mut last_error = None;

            for attempt in 0..=self.max_retries {
                match self.authorized(make_request()).send().await {
                    Ok(response) => {
                        let status = response.status();

                        if status.is_success() {
                            return Ok(response);
                        }

                        if matches!(
                            status,
                            StatusCode::BAD_REQUEST
                                | StatusCode::UNAUTHORIZED
                                | StatusCode::FORBIDDEN
                                | StatusCode::NOT_FOUND
                        ) {
                            let body = response.text().await.unwrap_or_default();
                            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
                            {
                                return Err(EvalError::AuthenticationFailed(format!(
                                    "{operation} auth failed ({status}): {body}"
                                )));
                            }
                            return Err(EvalError::Http(format!(
                                "{operation} failed ({status}): {body}"
                            )));
                        }

                        let body = response.text().await.unwrap_or_default();
                        last_error = Some(EvalError::Http(format!(
                            "{operation} failed ({status}): {body}"
                        )));
                    }
                    Err(e) => {
                        if e.is_connect() || e.is_timeout() {
                            last_error =
                                Some(EvalError::Http(format!("{operation} request error: {e}")));
                        } else {
                            return Err(EvalError::Http(format!(
                                "{operation} request error: {e}"
                            )));
                        }
                    }
                }

                if attempt < self.max_retries {
                    let base = self.retry_base_delay_ms * 2u64.saturating_pow(attempt);
                    let capped = base.min(30_000);
                    let jitter = capped / 4 * (u64::from(attempt) % 2);
                    let delay = capped + jitter;
                    warn!(
                        attempt = attempt + 1,
                        max = self.max_retries,
                        delay_ms = delay,
                        "{operation} failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }

            Err(last_error.unwrap_or_else(|| {
                EvalError::Http(format!(
                    "{operation} failed after {} retries",
                    self.max_retries
                ))
            }))
        }

        async fn request_json<T, F>(&self, operation: &str, make_request: F) -> Result<T, EvalError>
        where
            T: serde::de::DeserializeOwned,
            F: Fn() -> reqwest::RequestBuilder,
        {
            let response = self.send_with_retry(operation, make_request).await?;
            response.json::<T>().await.map_err(|e| {
                EvalError::UnrecognizedResponse(format!("Failed to parse {operation} response: {e}"))
            })
        }
    }

    #[async_trait]
    impl IbmHttpClient for ReqwestIbmClient {
        async fn open_session(&self, backend: &str) -> Result<String, EvalError> {
            let url = format!("{}/sessions", self.base_url);
            let body = serde_json::json!({ "backend": backend, "mode": "dedicated" });

            let session: IbmSessionResponse = self
                .request_json("open_session", || self.client.post(&url).json(&body))
                .await?;
            debug!(session_id = %session.id, backend = %backend, "IBM session opened");
            Ok(session.id)
        }

        async fn close_session(&self, session_id: &str) -> Result<(), EvalError> {
            let url = format!("{}/sessions/{}/close", self.base_url, session_id);
            self.send_with_retry("close_session", || self.client.delete(&url))
                .await?;
            Ok(())
        }

        async fn submit_job(&self, request: &IbmJobRequest) -> Result<String, EvalError> {
            let url = format!("{}/jobs", self.base_url);

            let response: IbmJobResponse = self
                .request_json("submit_job", || self.client.post(&url).json(request))
                .await?;
            debug!(job_id = %response.id, "Job submitted to IBM");
            Ok(response.id)
        }

        async fn job_status(&self, job_id: &str) -> Result<String, EvalError> {
            let url = format!("{}/jobs/{}", self.base_url, job_id);
            let status: IbmJobStatus = self
                .request_json("job_status", || self.client.get(&url))
                .await?;
            Ok(status.status)
        }

        async fn job_result(&self, job_id: &str) -> Result<serde_json::Value, EvalError> {
            let url = format!("{}/jobs/{}/results", self.base_url, job_id);
            self.request_json("job_result", || self.client.get(&url))
                .await
        }
    }
}

// Stub for when ibm feature is not enabled
#[cfg(not(feature = "ibm"))]
pub struct ReqwestIbmClient;

#[cfg(not(feature = "ibm"))]
impl ReqwestIbmClient {
    pub fn new(_base_url: &str, _config: &crate::config::IbmConfig) -> Result<Self, EvalError> {
        Err(EvalError::NotFound(
            "IBM evaluators require the 'ibm' feature flag".into(),
        ))
    }
}

#[cfg(not(feature = "ibm"))]
#[async_trait]
impl IbmHttpClient for ReqwestIbmClient {
    async fn open_session(&self, _backend: &str) -> Result<String, EvalError> {
        Err(EvalError::NotFound("IBM feature not enabled".into()))
    }
    async fn close_session(&self, _session_id: &str) -> Result<(), EvalError> {
        Err(EvalError::NotFound("IBM feature not enabled".into()))
    }
    async fn submit_job(&self, _request: &IbmJobRequest) -> Result<String, EvalError> {
        Err(EvalError::NotFound("IBM feature not enabled".into()))
    }
    async fn job_status(&self, _job_id: &str) -> Result<String, EvalError> {
        Err(EvalError::NotFound("IBM feature not enabled".into()))
    }
    async fn job_result(&self, _job_id: &str) -> Result<serde_json::Value, EvalError> {
        Err(EvalError::NotFound("IBM feature not enabled".into()))
    }
}

/// Mock IBM client for testing.
///
/// Status responses are served from a queue; the last one repeats.
/// Every submitted request and session call is recorded.
pub struct MockIbmClient {
    pub session_response: Result<String, EvalError>,
    pub submit_response: Result<String, EvalError>,
    pub result_response: Result<serde_json::Value, EvalError>,
    statuses: Mutex<VecDeque<String>>,
    status_calls: Mutex<usize>,
    submitted: Mutex<Vec<IbmJobRequest>>,
    opened: Mutex<Vec<String>>,
    closed: Mutex<Vec<String>>,
}

impl Default for MockIbmClient {
    fn default() -> Self {
        Self {
            session_response: Ok("mock-session-id".to_string()),
            submit_response: Ok("mock-job-id".to_string()),
            result_response: Ok(serde_json::json!({ "results": [ { "data": { "counts": {} } } ] })),
            statuses: Mutex::new(VecDeque::from(vec!["Completed".to_string()])),
            status_calls: Mutex::new(0),
            submitted: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
        }
    }
}

impl MockIbmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these statuses in order, repeating the last.
    pub fn with_statuses<I, S>(self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.statuses.lock() = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// Return this payload from `job_result`.
    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.result_response = Ok(result);
        self
    }

    pub fn with_submit_error(mut self, err: EvalError) -> Self {
        self.submit_response = Err(err);
        self
    }

    pub fn with_session_error(mut self, err: EvalError) -> Self {
        self.session_response = Err(err);
        self
    }

    /// Requests passed to `submit_job`, in order.
    pub fn submitted(&self) -> Vec<IbmJobRequest> {
        self.submitted.lock().clone()
    }

    /// Backends sessions were opened on.
    pub fn opened_sessions(&self) -> Vec<String> {
        self.opened.lock().clone()
    }

    /// Session IDs that were closed.
    pub fn closed_sessions(&self) -> Vec<String> {
        self.closed.lock().clone()
    }

    pub fn status_calls(&self) -> usize {
        *self.status_calls.lock()
    }
}

#[async_trait]
impl IbmHttpClient for MockIbmClient {
    async fn open_session(&self, backend: &str) -> Result<String, EvalError> {
        self.opened.lock().push(backend.to_string());
        self.session_response.clone()
    }

    async fn close_session(&self, session_id: &str) -> Result<(), EvalError> {
        self.closed.lock().push(session_id.to_string());
        Ok(())
    }

    async fn submit_job(&self, request: &IbmJobRequest) -> Result<String, EvalError> {
        self.submitted.lock().push(request.clone());
        self.submit_response.clone()
    }

    async fn job_status(&self, _job_id: &str) -> Result<String, EvalError> {
        *self.status_calls.lock() += 1;
        let mut statuses = self.statuses.lock();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        status.ok_or_else(|| EvalError::ExecutionFailed("mock has no status".into()))
    }

    async fn job_result(&self, _job_id: &str) -> Result<serde_json::Value, EvalError> {
        self.result_response.clone()
    }
}
