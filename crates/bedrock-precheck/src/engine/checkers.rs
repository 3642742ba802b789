//! Pre-check implementations
//!
//! Run in this order by the engine:
//! 1. service availability (catalog listing succeeds)
//! 2. model access (model listed under the configured provider and ACTIVE)
//! 3. invocation smoke test (a tiny real request succeeds)

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::{ModelCatalog, ModelInvoker};
use crate::contracts::*;
use crate::engine::Precheck;
use crate::error::PrecheckFailure;

/// Confirms the catalog can be listed in this region
pub struct ServiceAvailabilityCheck {
    catalog: Arc<dyn ModelCatalog>,
    provider: ModelProvider,
}

impl ServiceAvailabilityCheck {
    pub fn new(catalog: Arc<dyn ModelCatalog>, provider: ModelProvider) -> Self {
        Self { catalog, provider }
    }
}

#[async_trait]
impl Precheck for ServiceAvailabilityCheck {
    fn id(&self) -> &str {
        "service_availability"
    }

    fn description(&self) -> &str {
        "Bedrock service availability"
    }

    async fn run(&self, _model_id: &str, results: &mut CheckResults) -> Result<(), PrecheckFailure> {
        let models = self
            .catalog
            .list_models(self.provider)
            .await
            .map_err(|source| PrecheckFailure::ServiceUnavailable { source })?;

        tracing::debug!(
            provider = %self.provider,
            models = models.len(),
            "Foundation model listing succeeded"
        );
        results.service_available = true;
        Ok(())
    }
}

/// Confirms the requested model is listed under the configured provider
/// and ACTIVE
pub struct ModelAccessCheck {
    catalog: Arc<dyn ModelCatalog>,
    provider: ModelProvider,
}

impl ModelAccessCheck {
    pub fn new(catalog: Arc<dyn ModelCatalog>, provider: ModelProvider) -> Self {
        Self { catalog, provider }
    }
}

#[async_trait]
impl Precheck for ModelAccessCheck {
    fn id(&self) -> &str {
        "model_access"
    }

    fn description(&self) -> &str {
        "Model access and status"
    }

    async fn run(&self, model_id: &str, results: &mut CheckResults) -> Result<(), PrecheckFailure> {
        let models = self
            .catalog
            .list_models(self.provider)
            .await
            .map_err(PrecheckFailure::ModelAccess)?;

        let model = models
            .iter()
            .find(|m| m.model_id == model_id)
            .ok_or_else(|| PrecheckFailure::ModelNotFound {
                model_id: model_id.to_string(),
            })?;

        if let Some(reported) = &model.provider_name {
            if !reported.eq_ignore_ascii_case(self.provider.as_str()) {
                return Err(PrecheckFailure::ProviderMismatch {
                    model_id: model_id.to_string(),
                    expected: self.provider,
                    reported: reported.clone(),
                });
            }
        }

        match model.status() {
            ModelLifecycleStatus::Active => {
                results.model_status = Some(ModelLifecycleStatus::Active);
                Ok(())
            }
            ModelLifecycleStatus::Unrecognized(raw) => Err(PrecheckFailure::UnknownModelStatus {
                model_id: model_id.to_string(),
                status: raw,
            }),
            status => Err(PrecheckFailure::ModelNotEnabled {
                model_id: model_id.to_string(),
                status,
            }),
        }
    }
}

/// Sends a minimal request to the model to prove it can be invoked
pub struct InvocationSmokeTest {
    invoker: Arc<dyn ModelInvoker>,
}

impl InvocationSmokeTest {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { invoker }
    }
}

#[async_trait]
impl Precheck for InvocationSmokeTest {
    fn id(&self) -> &str {
        "invocation"
    }

    fn description(&self) -> &str {
        "Model invocation"
    }

    async fn run(&self, model_id: &str, results: &mut CheckResults) -> Result<(), PrecheckFailure> {
        let body = serde_json::to_vec(&SmokeTestRequest::default())
            .map_err(|e| PrecheckFailure::unexpected(format!("failed to encode request: {}", e)))?;

        let response = self
            .invoker
            .invoke_model(model_id, body)
            .await
            .map_err(PrecheckFailure::InvocationFailed)?;

        let decoded: serde_json::Value = serde_json::from_slice(&response).map_err(|e| {
            PrecheckFailure::unexpected(format!("failed to decode model response: {}", e))
        })?;

        let stop_reason = decoded
            .get("stop_reason")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        tracing::debug!(stop_reason = ?stop_reason, "Model responded");

        results.invocation = Some(InvocationOutcome { stop_reason });
        Ok(())
    }
}
