//! Bedrock implementations of the catalog and invoker traits

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_bedrock::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_bedrockruntime::primitives::Blob;

use super::{ModelCatalog, ModelInvoker, ServiceError};
use crate::contracts::{FoundationModel, ModelProvider};

/// Load the shared AWS configuration, optionally pinned to a region
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}

fn service_error<E>(err: &E) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(err).to_string());

    match err.code() {
        Some(code) => ServiceError::new(code, message),
        None => ServiceError::transport(message),
    }
}

/// Foundation model listing backed by the Bedrock control plane
#[derive(Clone)]
pub struct BedrockCatalog {
    client: aws_sdk_bedrock::Client,
}

impl BedrockCatalog {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrock::Client::new(config),
        }
    }
}

#[async_trait]
impl ModelCatalog for BedrockCatalog {
    async fn list_models(
        &self,
        provider: ModelProvider,
    ) -> Result<Vec<FoundationModel>, ServiceError> {
        let output = self
            .client
            .list_foundation_models()
            .by_provider(provider.as_str())
            .send()
            .await
            .map_err(|e| service_error(&e))?;

        let models = output
            .model_summaries()
            .iter()
            .map(|summary| FoundationModel {
                model_id: summary.model_id().to_string(),
                provider_name: summary.provider_name().map(str::to_string),
                lifecycle_status: summary
                    .model_lifecycle()
                    .map(|lifecycle| lifecycle.status().as_str().to_string()),
            })
            .collect();

        Ok(models)
    }
}

/// Model invocation backed by Bedrock Runtime
#[derive(Clone)]
pub struct BedrockInvoker {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockInvoker {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockruntime::Client::new(config),
        }
    }
}

#[async_trait]
impl ModelInvoker for BedrockInvoker {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, ServiceError> {
        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| service_error(&e))?;

        Ok(output.body().as_ref().to_vec())
    }
}
