//! Error types for the Bedrock Pre-Check handler
//!
//! `PrecheckFailure` is the outcome of a failed check and becomes the
//! `Error` reported in the FAILED callback. `PrecheckError` covers the
//! plumbing around the checks: configuration, event parsing and callback
//! delivery.

use thiserror::Error;

use crate::client::ServiceError;
use crate::contracts::{ModelLifecycleStatus, ModelProvider};

/// Why a pre-check run failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrecheckFailure {
    /// Model listing failed outright
    #[error("Bedrock service not available in this region. Use us-east-1 or us-west-2.")]
    ServiceUnavailable { source: ServiceError },

    /// Requested model is not in the provider's listing
    #[error("Model {model_id} not found. Check model ID or region.")]
    ModelNotFound { model_id: String },

    /// Model is listed but not in ACTIVE state
    #[error("Model {model_id} is not enabled. Go to Bedrock Console → Model access → Enable this model.")]
    ModelNotEnabled {
        model_id: String,
        status: ModelLifecycleStatus,
    },

    /// Model reported a lifecycle status outside the known set
    #[error("Model {model_id} reported unrecognized lifecycle status {status}.")]
    UnknownModelStatus { model_id: String, status: String },

    /// Listed model belongs to a different provider than the one configured
    #[error("Model {model_id} is listed under provider {reported}, expected {expected}.")]
    ProviderMismatch {
        model_id: String,
        expected: ModelProvider,
        reported: String,
    },

    /// Listing failed while checking model access
    #[error("Failed to check model access: {0}")]
    ModelAccess(ServiceError),

    /// Smoke test invocation was rejected
    #[error("Model invocation failed: {0}. Check IAM permissions.")]
    InvocationFailed(ServiceError),

    /// Anything else
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PrecheckFailure {
    /// Create an unexpected failure
    pub fn unexpected(msg: impl Into<String>) -> Self {
        PrecheckFailure::Unexpected(msg.into())
    }

    /// Short machine-readable kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            PrecheckFailure::ServiceUnavailable { .. } => "service_unavailable",
            PrecheckFailure::ModelNotFound { .. } => "model_not_found",
            PrecheckFailure::ModelNotEnabled { .. } => "model_not_enabled",
            PrecheckFailure::UnknownModelStatus { .. } => "unknown_model_status",
            PrecheckFailure::ProviderMismatch { .. } => "provider_mismatch",
            PrecheckFailure::ModelAccess(_) => "model_access",
            PrecheckFailure::InvocationFailed(_) => "invocation_failed",
            PrecheckFailure::Unexpected(_) => "unexpected",
        }
    }
}

/// Errors outside the checks themselves
#[derive(Error, Debug)]
pub enum PrecheckError {
    /// Invalid environment configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inbound event could not be interpreted
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Callback could not be delivered
    #[error("Callback error: {0}")]
    Callback(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PrecheckError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        PrecheckError::Config(msg.into())
    }

    /// Create a callback error
    pub fn callback(msg: impl Into<String>) -> Self {
        PrecheckError::Callback(msg.into())
    }
}

impl From<reqwest::Error> for PrecheckError {
    fn from(err: reqwest::Error) -> Self {
        PrecheckError::Callback(err.to_string())
    }
}

/// Result type alias for handler plumbing
pub type Result<T> = std::result::Result<T, PrecheckError>;
