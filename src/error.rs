// Copyright 2026 RQC-Hash Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for RQC-Hash.

use std::fmt;

/// Result type alias for RQC-Hash operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error types.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// Evaluator error
    Evaluation(EvalError),
    /// Validation error
    Validation(ValidationError),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Evaluation(e) => write!(f, "Evaluation error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Evaluation(e) => Some(e),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Evaluation(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Evaluator-specific errors.
///
/// Every remote failure is expressed as one of these so the fallback
/// chain can log it and move on to the next strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Evaluator not found or not compiled in
    NotFound(String),
    /// Evaluator unavailable
    Unavailable(String),
    /// Execution failed
    ExecutionFailed(String),
    /// Authentication failed
    AuthenticationFailed(String),
    /// Timeout
    Timeout(String),
    /// Invalid request
    InvalidRequest(String),
    /// HTTP transport error
    Http(String),
    /// Remote payload did not match any known result shape
    UnrecognizedResponse(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::NotFound(name) => write!(f, "Evaluator not found: {}", name),
            EvalError::Unavailable(msg) => write!(f, "Evaluator unavailable: {}", msg),
            EvalError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
            EvalError::AuthenticationFailed(msg) => write!(f, "Authentication failed: {}", msg),
            EvalError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            EvalError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            EvalError::Http(msg) => write!(f, "HTTP error: {}", msg),
            EvalError::UnrecognizedResponse(msg) => {
                write!(f, "Unrecognized response: {}", msg)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// Resource limit exceeded
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::ResourceLimit {
                resource,
                limit,
                requested,
            } => {
                write!(
                    f,
                    "Resource limit exceeded for {}: limit={}, requested={}",
                    resource, limit, requested
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    // =========================================================================
    // Display
    // =========================================================================

    #[test]
    fn test_error_display_config() {
        let e = Error::Config("no evaluators".into());
        assert_eq!(e.to_string(), "Configuration error: no evaluators");
    }

    #[test]
    fn test_error_display_evaluation() {
        let e = Error::Evaluation(EvalError::NotFound("ibm_runtime".into()));
        assert_eq!(
            e.to_string(),
            "Evaluation error: Evaluator not found: ibm_runtime"
        );
    }

    #[test]
    fn test_error_display_validation() {
        let e = Error::Validation(ValidationError::Field {
            field: "shots".into(),
            message: "must be greater than 0".into(),
        });
        assert_eq!(
            e.to_string(),
            "Validation error: Field 'shots': must be greater than 0"
        );
    }

    #[test]
    fn test_eval_error_display_variants() {
        assert_eq!(
            EvalError::Unavailable("offline".into()).to_string(),
            "Evaluator unavailable: offline"
        );
        assert_eq!(
            EvalError::AuthenticationFailed("bad token".into()).to_string(),
            "Authentication failed: bad token"
        );
        assert_eq!(EvalError::Timeout("600s".into()).to_string(), "Timeout: 600s");
        assert_eq!(EvalError::Http("503".into()).to_string(), "HTTP error: 503");
        assert_eq!(
            EvalError::UnrecognizedResponse("no quasi_dists".into()).to_string(),
            "Unrecognized response: no quasi_dists"
        );
    }

    #[test]
    fn test_validation_error_display_resource_limit() {
        let e = ValidationError::ResourceLimit {
            resource: "n_qubits".into(),
            limit: 24,
            requested: 30,
        };
        assert_eq!(
            e.to_string(),
            "Resource limit exceeded for n_qubits: limit=24, requested=30"
        );
    }

    // =========================================================================
    // source() and From impls
    // =========================================================================

    #[test]
    fn test_error_source() {
        assert!(Error::Io(std::io::Error::other("disk")).source().is_some());
        assert!(Error::Evaluation(EvalError::Timeout("slow".into()))
            .source()
            .is_some());
        assert!(Error::Config("x".into()).source().is_none());
        assert!(Error::Serialization("x".into()).source().is_none());
    }

    #[test]
    fn test_from_conversions() {
        let e: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(e, Error::Io(_)));

        let e: Error = EvalError::Http("x".into()).into();
        assert!(matches!(e, Error::Evaluation(EvalError::Http(_))));

        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("{{{{").unwrap_err();
        let e: Error = yaml_err.into();
        assert!(matches!(e, Error::Serialization(_)));

        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let e: Error = json_err.into();
        assert!(matches!(e, Error::Serialization(_)));
    }
}
