// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. rqc-hash.yaml file
//! 3. Environment variables (RQC_*, QISKIT_IBM_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::backend::fallback::RuntimeMode;
use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default hash parameters
    #[serde(default)]
    pub hash: HashDefaults,

    /// Evaluator configurations
    #[serde(default)]
    pub backends: BackendsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Result record output
    #[serde(default)]
    pub output: OutputConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &[
                "rqc-hash.yaml",
                "rqc-hash.yml",
                "/etc/rqc-hash/config.yaml",
            ] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("RQC_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("RQC_LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("RQC_OUTPUT") {
            self.output.record_path = val;
        }
        if let Ok(val) = env::var("RQC_RUNTIME") {
            if let Ok(mode) = val.parse() {
                self.hash.runtime = mode;
            }
        }
        if let Ok(val) = env::var("RQC_LOCAL_SAMPLING_SEED") {
            if let Ok(seed) = val.parse() {
                self.backends.local.sampling_seed = Some(seed);
            }
        }

        // IBM Quantum
        if let Ok(val) = env::var("QISKIT_IBM_TOKEN") {
            self.backends.ibm.auth_token = Some(val);
        }
        if let Ok(val) = env::var("QISKIT_IBM_INSTANCE") {
            self.backends.ibm.instance = Some(val);
        }
        if let Ok(val) = env::var("IBM_QUANTUM_API_URL") {
            self.backends.ibm.api_url = val;
        }
        if let Ok(val) = env::var("IBM_RUNTIME_URL") {
            self.backends.ibm.runtime_url = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.hash.n_qubits == 0 {
            return Err(Error::Config("hash.n_qubits must be greater than 0".into()));
        }
        if self.hash.shots == 0 {
            return Err(Error::Config("hash.shots must be greater than 0".into()));
        }
        if self.hash.resilience > MAX_RESILIENCE {
            return Err(Error::Config(format!(
                "hash.resilience must be in 0..={}",
                MAX_RESILIENCE
            )));
        }
        if self.backends.local.max_qubits == 0 {
            return Err(Error::Config(
                "backends.local.max_qubits cannot be 0".into(),
            ));
        }
        if self.backends.local.max_qubits > MAX_LOCAL_QUBITS {
            return Err(Error::Config(format!(
                "backends.local.max_qubits cannot exceed {}",
                MAX_LOCAL_QUBITS
            )));
        }
        if self.backends.ibm.poll_interval_ms == 0 {
            return Err(Error::Config(
                "backends.ibm.poll_interval_ms cannot be 0".into(),
            ));
        }
        if self.backends.ibm.provider_optimization_level > 3
            || self.backends.ibm.runtime_optimization_level > 3
        {
            return Err(Error::Config(
                "IBM optimization levels must be in 0..=3".into(),
            ));
        }
        if self.output.write_record && self.output.record_path.trim().is_empty() {
            return Err(Error::Config("output.record_path cannot be empty".into()));
        }
        if !self.backends.local.enabled {
            tracing::warn!(
                "Local simulator is disabled. Every invocation will fail once \
                 remote evaluators are exhausted."
            );
        }
        Ok(())
    }
}

/// Highest resilience level accepted by IBM Runtime.
pub const MAX_RESILIENCE: u8 = 3;

/// Hard ceiling for the local state-vector simulator (2^30 amplitudes).
pub const MAX_LOCAL_QUBITS: u32 = 30;

/// Default hash parameters, used when the caller does not supply them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashDefaults {
    /// Message to hash
    #[serde(default = "default_message")]
    pub message: String,

    /// Number of qubits
    #[serde(default = "default_n_qubits")]
    pub n_qubits: u32,

    /// Circuit depth (layers)
    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Seed for the circuit structure
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of shots
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Remote connection mode
    #[serde(default)]
    pub runtime: RuntimeMode,

    /// Runtime resilience level (0..=3)
    #[serde(default)]
    pub resilience: u8,
}

impl Default for HashDefaults {
    fn default() -> Self {
        Self {
            message: default_message(),
            n_qubits: default_n_qubits(),
            depth: default_depth(),
            seed: default_seed(),
            shots: default_shots(),
            runtime: RuntimeMode::default(),
            resilience: 0,
        }
    }
}

fn default_message() -> String {
    "hello".into()
}

fn default_n_qubits() -> u32 {
    6
}

fn default_depth() -> u32 {
    6
}

fn default_seed() -> u64 {
    12345
}

fn default_shots() -> u32 {
    2048
}

fn default_true() -> bool {
    true
}

/// Evaluator configurations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendsConfig {
    /// Local state-vector simulator
    #[serde(default)]
    pub local: LocalConfig,

    /// IBM Quantum (Runtime and direct provider)
    #[serde(default)]
    pub ibm: IbmConfig,
}

/// Local simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Whether the simulator is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum qubits to simulate
    #[serde(default = "default_local_max_qubits")]
    pub max_qubits: u32,

    /// Maximum shots per request
    #[serde(default = "default_max_shots")]
    pub max_shots: u32,

    /// Simulation timeout in seconds
    #[serde(default = "default_local_timeout")]
    pub timeout_sec: u64,

    /// Seed for shot sampling (random if unset)
    #[serde(default)]
    pub sampling_seed: Option<u64>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_qubits: default_local_max_qubits(),
            max_shots: default_max_shots(),
            timeout_sec: default_local_timeout(),
            sampling_seed: None,
        }
    }
}

fn default_local_max_qubits() -> u32 {
    24
}

fn default_max_shots() -> u32 {
    1_000_000
}

fn default_local_timeout() -> u64 {
    300
}

/// IBM Quantum configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbmConfig {
    /// Whether IBM evaluators may be used
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Direct provider API URL
    #[serde(default = "default_ibm_api_url")]
    pub api_url: String,

    /// Runtime (sessions + primitives) API URL
    #[serde(default = "default_ibm_runtime_url")]
    pub runtime_url: String,

    /// API token
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,

    /// Service instance (CRN or hub/group/project)
    #[serde(default)]
    pub instance: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_ibm_timeout")]
    pub timeout_sec: u64,

    /// Maximum number of retries for transient errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Overall job timeout in seconds (queue + execution)
    #[serde(default = "default_job_timeout")]
    pub job_timeout_sec: u64,

    /// Job status polling interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Transpiler optimization level for direct provider jobs
    #[serde(default = "default_provider_optimization_level")]
    pub provider_optimization_level: u8,

    /// Transpiler optimization level for Runtime sampler jobs
    #[serde(default = "default_runtime_optimization_level")]
    pub runtime_optimization_level: u8,
}

impl Default for IbmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: default_ibm_api_url(),
            runtime_url: default_ibm_runtime_url(),
            auth_token: None,
            instance: None,
            timeout_sec: default_ibm_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            job_timeout_sec: default_job_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
            provider_optimization_level: default_provider_optimization_level(),
            runtime_optimization_level: default_runtime_optimization_level(),
        }
    }
}

impl IbmConfig {
    /// Whether credentials are present.
    pub fn has_credentials(&self) -> bool {
        self.auth_token
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}

fn default_ibm_api_url() -> String {
    "https://api.quantum-computing.ibm.com/api".into()
}

fn default_ibm_runtime_url() -> String {
    "https://quantum.cloud.ibm.com/api/v1".into()
}

fn default_ibm_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_job_timeout() -> u64 {
    600
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_provider_optimization_level() -> u8 {
    3
}

fn default_runtime_optimization_level() -> u8 {
    1
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Result record output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where to write the JSON result record
    #[serde(default = "default_record_path")]
    pub record_path: String,

    /// Whether to write the record at all
    #[serde(default = "default_true")]
    pub write_record: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            record_path: default_record_path(),
            write_record: true,
        }
    }
}

fn default_record_path() -> String {
    "rqc_counts.json".into()
}

/// Validation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Resource limits
    #[serde(default)]
    pub limits: ResourceLimits,
}

/// Resource limits applied to every hash request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum qubits
    #[serde(default = "default_limit_max_qubits")]
    pub max_qubits: u32,

    /// Maximum circuit depth
    #[serde(default = "default_limit_max_depth")]
    pub max_depth: u32,

    /// Maximum shots
    #[serde(default = "default_max_shots")]
    pub max_shots: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_qubits: default_limit_max_qubits(),
            max_depth: default_limit_max_depth(),
            max_shots: default_max_shots(),
        }
    }
}

fn default_limit_max_qubits() -> u32 {
    156
}

fn default_limit_max_depth() -> u32 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    // Tests touching process environment run one at a time.
    static ENV_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.hash.n_qubits, 6);
        assert_eq!(config.hash.depth, 6);
        assert_eq!(config.hash.seed, 12345);
        assert_eq!(config.hash.shots, 2048);
        assert_eq!(config.hash.runtime, RuntimeMode::Auto);
        assert!(config.backends.local.enabled);
        assert!(config.backends.ibm.auth_token.is_none());
        assert_eq!(config.output.record_path, "rqc_counts.json");
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut bad = Config::default();
        bad.hash.n_qubits = 0;
        assert!(bad.validate().is_err());

        let mut bad = Config::default();
        bad.hash.shots = 0;
        assert!(bad.validate().is_err());

        let mut bad = Config::default();
        bad.hash.resilience = 4;
        let msg = bad.validate().unwrap_err().to_string();
        assert!(msg.contains("resilience"));
    }

    #[test]
    fn test_validate_local_limits() {
        let mut config = Config::default();
        config.backends.local.max_qubits = MAX_LOCAL_QUBITS + 1;
        assert!(config.validate().is_err());

        config.backends.local.max_qubits = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_disabled_local_still_passes() {
        let mut config = Config::default();
        config.backends.local.enabled = false;
        // Warns but stays valid
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let _guard = ENV_LOCK.lock();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
hash:
  n_qubits: 8
  depth: 4
  seed: 42
  runtime: provider
backends:
  local:
    sampling_seed: 7
output:
  record_path: "/tmp/out.json"
"#
        )
        .unwrap();

        let config = Config::load(Some(f.path())).unwrap();
        assert_eq!(config.hash.n_qubits, 8);
        assert_eq!(config.hash.depth, 4);
        assert_eq!(config.hash.seed, 42);
        assert_eq!(config.hash.runtime, RuntimeMode::Provider);
        assert_eq!(config.hash.shots, 2048);
        assert_eq!(config.backends.local.sampling_seed, Some(7));
        assert_eq!(config.output.record_path, "/tmp/out.json");
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let path = std::path::Path::new("/tmp/does_not_exist_rqc_hash_test.yaml");
        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.hash.n_qubits, 6);
    }

    #[test]
    fn test_config_load_invalid_yaml() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{{{{not: valid: yaml::::").unwrap();

        let result = Config::load(Some(f.path()));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_override_ibm_token() {
        let _guard = ENV_LOCK.lock();
        let mut config = Config::default();
        std::env::set_var("QISKIT_IBM_TOKEN", "secret-token");
        config.apply_env_overrides();
        assert!(config.backends.ibm.has_credentials());
        std::env::remove_var("QISKIT_IBM_TOKEN");
    }

    #[test]
    fn test_env_override_runtime_mode() {
        let _guard = ENV_LOCK.lock();
        let mut config = Config::default();
        std::env::set_var("RQC_RUNTIME", "cloud");
        config.apply_env_overrides();
        assert_eq!(config.hash.runtime, RuntimeMode::Cloud);
        std::env::remove_var("RQC_RUNTIME");
    }

    #[test]
    fn test_env_override_sampling_seed_ignores_garbage() {
        let _guard = ENV_LOCK.lock();
        let mut config = Config::default();
        std::env::set_var("RQC_LOCAL_SAMPLING_SEED", "not-a-number");
        config.apply_env_overrides();
        assert_eq!(config.backends.local.sampling_seed, None);
        std::env::remove_var("RQC_LOCAL_SAMPLING_SEED");
    }

    #[test]
    fn test_auth_token_not_serialized() {
        let mut config = Config::default();
        config.backends.ibm.auth_token = Some("do-not-leak".into());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("do-not-leak"));
    }

    #[test]
    fn test_blank_token_is_not_credentials() {
        let mut ibm = IbmConfig::default();
        ibm.auth_token = Some("   ".into());
        assert!(!ibm.has_credentials());
    }

    #[test]
    fn test_resource_limits_defaults() {
        let limits = ResourceLimits::default();
        assert_eq!(limits.max_qubits, 156);
        assert_eq!(limits.max_depth, 10_000);
        assert_eq!(limits.max_shots, 1_000_000);
    }
}
