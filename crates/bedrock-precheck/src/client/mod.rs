//! Clients for the services a pre-check run talks to
//!
//! Each outbound dependency sits behind a trait so the engine and handler
//! can be driven without network access:
//!
//! - [`ModelCatalog`] lists foundation models (`bedrock` control plane)
//! - [`ModelInvoker`] invokes a model (`bedrock-runtime`)
//! - [`CallbackSender`] delivers the custom resource status document

mod bedrock;
mod callback;

pub use bedrock::{load_sdk_config, BedrockCatalog, BedrockInvoker};
pub use callback::ReqwestCallbackSender;

use async_trait::async_trait;
use std::fmt;

use crate::contracts::{CallbackResponse, FoundationModel, ModelProvider};
use crate::error::Result;

/// Error reported by the model hosting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// Service error code, e.g. `AccessDeniedException`. Absent for
    /// transport failures.
    pub code: Option<String>,

    /// Human readable message
    pub message: String,
}

impl ServiceError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Error without a service code
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Lists the models a provider offers in the current region
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(
        &self,
        provider: ModelProvider,
    ) -> std::result::Result<Vec<FoundationModel>, ServiceError>;
}

/// Invokes a model with a JSON request body and returns the raw response body
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke_model(
        &self,
        model_id: &str,
        body: Vec<u8>,
    ) -> std::result::Result<Vec<u8>, ServiceError>;
}

/// Delivers the custom resource status document
#[async_trait]
pub trait CallbackSender: Send + Sync {
    async fn send(&self, response_url: &str, response: &CallbackResponse) -> Result<()>;
}
