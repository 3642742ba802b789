//! Runtime configuration
//!
//! Everything is read from the environment; the Lambda function has no
//! configuration files.

use std::time::Duration;

use crate::contracts::{ModelProvider, DEFAULT_MODEL_ID};
use crate::error::{PrecheckError, Result};

pub const ENV_LOG_LEVEL: &str = "PRECHECK_LOG_LEVEL";
pub const ENV_DEFAULT_MODEL_ID: &str = "PRECHECK_DEFAULT_MODEL_ID";
pub const ENV_MODEL_PROVIDER: &str = "PRECHECK_MODEL_PROVIDER";
pub const ENV_CALLBACK_TIMEOUT_MS: &str = "PRECHECK_CALLBACK_TIMEOUT_MS";
pub const ENV_REGION: &str = "PRECHECK_REGION";

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_CALLBACK_TIMEOUT_MS: u64 = 10_000;

/// Handler configuration
#[derive(Debug, Clone)]
pub struct PrecheckConfig {
    /// Tracing filter directive, e.g. `info` or `bedrock_precheck=debug`
    pub log_level: String,

    /// Model validated when the resource properties omit `ModelId`
    pub default_model_id: String,

    /// Provider the catalog listing is filtered by
    pub provider: ModelProvider,

    /// Timeout for the callback PUT
    pub callback_timeout: Duration,

    /// Region override; `None` uses the AWS default provider chain
    pub region: Option<String>,
}

impl Default for PrecheckConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            default_model_id: DEFAULT_MODEL_ID.to_string(),
            provider: ModelProvider::default(),
            callback_timeout: Duration::from_millis(DEFAULT_CALLBACK_TIMEOUT_MS),
            region: None,
        }
    }
}

impl PrecheckConfig {
    /// Load from process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Log level alone, for when the rest of the configuration is invalid
    pub fn log_level_from_env() -> String {
        Self::log_level_from_lookup(|key| std::env::var(key).ok())
    }

    fn log_level_from_lookup<F>(lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        get(ENV_LOG_LEVEL)
            .or_else(|| get("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self {
            log_level: Self::log_level_from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(model_id) = lookup(ENV_DEFAULT_MODEL_ID) {
            let model_id = model_id.trim();
            if model_id.is_empty() {
                return Err(PrecheckError::config(format!("{} is empty", ENV_DEFAULT_MODEL_ID)));
            }
            config.default_model_id = model_id.to_string();
        }

        if let Some(provider) = get(ENV_MODEL_PROVIDER) {
            config.provider = provider
                .parse()
                .map_err(|e| PrecheckError::config(format!("{}: {}", ENV_MODEL_PROVIDER, e)))?;
        }

        if let Some(timeout) = get(ENV_CALLBACK_TIMEOUT_MS) {
            let ms: u64 = timeout.trim().parse().map_err(|_| {
                PrecheckError::config(format!(
                    "{} must be a number of milliseconds, got {:?}",
                    ENV_CALLBACK_TIMEOUT_MS, timeout
                ))
            })?;
            config.callback_timeout = Duration::from_millis(ms);
        }

        config.region = get(ENV_REGION);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PrecheckConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.default_model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.provider, ModelProvider::Anthropic);
        assert_eq!(config.callback_timeout, Duration::from_secs(10));
        assert!(config.region.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = PrecheckConfig::from_lookup(lookup_from(&[
            (ENV_LOG_LEVEL, "debug"),
            ("RUST_LOG", "warn"),
            (ENV_DEFAULT_MODEL_ID, "anthropic.claude-3-haiku-20240307-v1:0"),
            (ENV_MODEL_PROVIDER, "amazon"),
            (ENV_CALLBACK_TIMEOUT_MS, "2500"),
            (ENV_REGION, "us-west-2"),
        ]))
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.default_model_id, "anthropic.claude-3-haiku-20240307-v1:0");
        assert_eq!(config.provider, ModelProvider::Amazon);
        assert_eq!(config.callback_timeout, Duration::from_millis(2500));
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn test_rust_log_fallback() {
        let config = PrecheckConfig::from_lookup(lookup_from(&[("RUST_LOG", "warn")])).unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_log_level_survives_invalid_config() {
        let lookup = lookup_from(&[(ENV_LOG_LEVEL, ""), ("RUST_LOG", "debug"), (ENV_MODEL_PROVIDER, "OpenAI")]);
        assert!(PrecheckConfig::from_lookup(&lookup).is_err());
        assert_eq!(PrecheckConfig::log_level_from_lookup(&lookup), "debug");
    }

    #[test]
    fn test_invalid_values() {
        let err = PrecheckConfig::from_lookup(lookup_from(&[(ENV_MODEL_PROVIDER, "OpenAI")]));
        assert!(matches!(err, Err(PrecheckError::Config(_))));

        let err = PrecheckConfig::from_lookup(lookup_from(&[(ENV_CALLBACK_TIMEOUT_MS, "soon")]));
        assert!(matches!(err, Err(PrecheckError::Config(_))));

        let err = PrecheckConfig::from_lookup(lookup_from(&[(ENV_DEFAULT_MODEL_ID, " ")]));
        assert!(matches!(err, Err(PrecheckError::Config(_))));
    }
}
