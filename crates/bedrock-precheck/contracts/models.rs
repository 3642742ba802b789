//! Foundation model descriptors
//!
//! Values the model hosting service reports about its models. Lifecycle
//! status and provider are closed sets; anything the service reports outside
//! them is carried verbatim so it can be surfaced as its own failure.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Model used when the resource properties do not name one
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20241022-v2:0";

/// A model as returned by the catalog listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundationModel {
    /// Model identifier, e.g. `anthropic.claude-3-5-sonnet-20241022-v2:0`
    pub model_id: String,

    /// Provider name as reported by the service
    pub provider_name: Option<String>,

    /// Raw lifecycle status string, if the service reported one
    pub lifecycle_status: Option<String>,
}

impl FoundationModel {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            provider_name: None,
            lifecycle_status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.lifecycle_status = Some(status.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider_name = Some(provider.into());
        self
    }

    /// Interpret the reported lifecycle status
    pub fn status(&self) -> ModelLifecycleStatus {
        match self.lifecycle_status.as_deref() {
            Some(raw) => ModelLifecycleStatus::parse(raw),
            None => ModelLifecycleStatus::Unrecognized("UNKNOWN".to_string()),
        }
    }
}

/// Model lifecycle status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLifecycleStatus {
    /// Model is enabled and invocable
    Active,
    /// Model is deprecated and not enabled for new use
    Legacy,
    /// Anything outside the known set
    Unrecognized(String),
}

impl ModelLifecycleStatus {
    /// Parse a status string. Matching is exact: the service reports upper case.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ACTIVE" => ModelLifecycleStatus::Active,
            "LEGACY" => ModelLifecycleStatus::Legacy,
            other => ModelLifecycleStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ModelLifecycleStatus::Active => "ACTIVE",
            ModelLifecycleStatus::Legacy => "LEGACY",
            ModelLifecycleStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ModelLifecycleStatus::Active)
    }
}

impl fmt::Display for ModelLifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ModelLifecycleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Providers the catalog can be filtered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelProvider {
    #[default]
    Anthropic,
    Amazon,
    Meta,
    MistralAi,
    Cohere,
    Ai21Labs,
}

impl ModelProvider {
    /// Provider name exactly as the service expects it in `byProvider`
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::Anthropic => "Anthropic",
            ModelProvider::Amazon => "Amazon",
            ModelProvider::Meta => "Meta",
            ModelProvider::MistralAi => "Mistral AI",
            ModelProvider::Cohere => "Cohere",
            ModelProvider::Ai21Labs => "AI21 Labs",
        }
    }

    pub fn all() -> &'static [ModelProvider] {
        &[
            ModelProvider::Anthropic,
            ModelProvider::Amazon,
            ModelProvider::Meta,
            ModelProvider::MistralAi,
            ModelProvider::Cohere,
            ModelProvider::Ai21Labs,
        ]
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelProvider::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown model provider: {}", s))
    }
}

impl Serialize for ModelProvider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Minimal Anthropic messages request used for the smoke test
#[derive(Debug, Clone, Serialize)]
pub struct SmokeTestRequest {
    pub anthropic_version: &'static str,
    pub max_tokens: u32,
    pub messages: Vec<SmokeTestMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmokeTestMessage {
    pub role: &'static str,
    pub content: &'static str,
}

impl SmokeTestRequest {
    pub const ANTHROPIC_VERSION: &'static str = "bedrock-2023-05-31";
    pub const MAX_TOKENS: u32 = 10;
}

impl Default for SmokeTestRequest {
    fn default() -> Self {
        Self {
            anthropic_version: Self::ANTHROPIC_VERSION,
            max_tokens: Self::MAX_TOKENS,
            messages: vec![SmokeTestMessage {
                role: "user",
                content: "test",
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_status_parse() {
        assert_eq!(ModelLifecycleStatus::parse("ACTIVE"), ModelLifecycleStatus::Active);
        assert_eq!(ModelLifecycleStatus::parse("LEGACY"), ModelLifecycleStatus::Legacy);
        assert_eq!(
            ModelLifecycleStatus::parse("active"),
            ModelLifecycleStatus::Unrecognized("active".to_string())
        );
    }

    #[test]
    fn test_missing_status_is_unrecognized() {
        let model = FoundationModel::new("anthropic.claude-v2");
        assert_eq!(model.status(), ModelLifecycleStatus::Unrecognized("UNKNOWN".to_string()));
        assert!(!model.status().is_active());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Anthropic".parse::<ModelProvider>(), Ok(ModelProvider::Anthropic));
        assert_eq!("mistral ai".parse::<ModelProvider>(), Ok(ModelProvider::MistralAi));
        assert!("OpenAI".parse::<ModelProvider>().is_err());
    }

    #[test]
    fn test_smoke_test_body() {
        let body = serde_json::to_value(SmokeTestRequest::default()).unwrap();
        assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(body["max_tokens"], 10);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "test");
    }
}
