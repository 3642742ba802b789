//! Pre-check engine
//!
//! Runs the checks in order against a shared [`CheckResults`]. The first
//! failure ends the run; later checks are never attempted and nothing is
//! retried.

mod checkers;

pub use checkers::*;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::client::{ModelCatalog, ModelInvoker};
use crate::contracts::*;
use crate::error::PrecheckFailure;

/// Ordered pre-check runner
pub struct PrecheckEngine {
    checks: Vec<Box<dyn Precheck>>,
}

impl PrecheckEngine {
    /// Engine with the standard three checks
    pub fn new(
        catalog: Arc<dyn ModelCatalog>,
        invoker: Arc<dyn ModelInvoker>,
        provider: ModelProvider,
    ) -> Self {
        Self::with_checks(vec![
            Box::new(ServiceAvailabilityCheck::new(catalog.clone(), provider)),
            Box::new(ModelAccessCheck::new(catalog, provider)),
            Box::new(InvocationSmokeTest::new(invoker)),
        ])
    }

    /// Engine with a custom check list
    pub fn with_checks(checks: Vec<Box<dyn Precheck>>) -> Self {
        Self { checks }
    }

    /// Run every check in order, stopping at the first failure
    pub async fn run(&self, model_id: &str) -> PrecheckReport {
        let mut results = CheckResults::new(model_id);
        let total = self.checks.len();

        for (index, check) in self.checks.iter().enumerate() {
            tracing::info!(
                check = check.id(),
                model_id = %model_id,
                "Check {}/{}: {}",
                index + 1,
                total,
                check.description()
            );

            match check.run(model_id, &mut results).await {
                Ok(()) => {
                    results.checks_passed += 1;
                    tracing::info!(check = check.id(), "✓ {} passed", check.description());
                }
                Err(failure) => {
                    results.checks_failed += 1;
                    tracing::error!(
                        check = check.id(),
                        kind = failure.kind(),
                        error = ?failure,
                        "✗ {} failed: {}",
                        check.description(),
                        failure
                    );
                    return PrecheckReport::failed(results, failure);
                }
            }
        }

        tracing::info!(
            checks_passed = results.checks_passed,
            duration_ms = results.elapsed_ms(),
            "✓ All checks passed"
        );
        PrecheckReport::passed(results)
    }
}

/// A single pre-check step
#[async_trait]
pub trait Precheck: Send + Sync {
    /// Check identifier
    fn id(&self) -> &str;

    /// Human readable description for logs
    fn description(&self) -> &str;

    /// Run the check, recording what it learned in `results`
    async fn run(&self, model_id: &str, results: &mut CheckResults) -> Result<(), PrecheckFailure>;
}

/// Result of a full pre-check run
#[derive(Debug, Clone)]
pub struct PrecheckReport {
    pub results: CheckResults,
    pub failure: Option<PrecheckFailure>,
}

impl PrecheckReport {
    pub const SUCCESS_MESSAGE: &'static str = "All pre-checks passed successfully";

    pub fn passed(results: CheckResults) -> Self {
        Self {
            results,
            failure: None,
        }
    }

    pub fn failed(results: CheckResults, failure: PrecheckFailure) -> Self {
        Self {
            results,
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn status(&self) -> CallbackStatus {
        if self.is_success() {
            CallbackStatus::Success
        } else {
            CallbackStatus::Failed
        }
    }

    /// `Data` object for the callback
    pub fn callback_data(&self) -> Map<String, Value> {
        let mut data = Map::new();

        match &self.failure {
            None => {
                data.insert("Message".to_string(), json!(Self::SUCCESS_MESSAGE));
                data.insert("ChecksPassed".to_string(), json!(self.results.checks_passed));
                data.insert("ModelId".to_string(), json!(self.results.model_id));
                if let Some(status) = &self.results.model_status {
                    data.insert("ModelStatus".to_string(), json!(status.as_str()));
                }
            }
            Some(failure) => {
                data.insert("Error".to_string(), json!(failure.to_string()));
                data.insert("ChecksPassed".to_string(), json!(self.results.checks_passed));
                data.insert("ChecksFailed".to_string(), json!(self.results.checks_failed));
            }
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockModelCatalog, MockModelInvoker, ServiceError};

    const MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20241022-v2:0";

    fn listing(status: &str) -> Vec<FoundationModel> {
        vec![
            FoundationModel::new("anthropic.claude-3-haiku-20240307-v1:0").with_status("ACTIVE"),
            FoundationModel::new(MODEL_ID)
                .with_provider("Anthropic")
                .with_status(status),
        ]
    }

    fn engine(catalog: MockModelCatalog, invoker: MockModelInvoker) -> PrecheckEngine {
        PrecheckEngine::new(Arc::new(catalog), Arc::new(invoker), ModelProvider::Anthropic)
    }

    fn untouched_invoker() -> MockModelInvoker {
        let mut invoker = MockModelInvoker::new();
        invoker.expect_invoke_model().times(0);
        invoker
    }

    #[tokio::test]
    async fn test_all_checks_pass() {
        let mut catalog = MockModelCatalog::new();
        catalog
            .expect_list_models()
            .withf(|provider| *provider == ModelProvider::Anthropic)
            .times(2)
            .returning(|_| Ok(listing("ACTIVE")));

        let mut invoker = MockModelInvoker::new();
        invoker
            .expect_invoke_model()
            .withf(|model_id, _| model_id == MODEL_ID)
            .times(1)
            .returning(|_, _| Ok(br#"{"id":"msg_1","stop_reason":"max_tokens"}"#.to_vec()));

        let report = engine(catalog, invoker).run(MODEL_ID).await;

        assert!(report.is_success());
        assert_eq!(report.status(), CallbackStatus::Success);
        assert_eq!(report.results.checks_passed, 3);
        assert_eq!(report.results.checks_failed, 0);
        assert!(report.results.service_available);
        assert_eq!(report.results.model_status, Some(ModelLifecycleStatus::Active));
        assert_eq!(
            report.results.invocation,
            Some(InvocationOutcome {
                stop_reason: Some("max_tokens".to_string())
            })
        );

        let data = report.callback_data();
        assert_eq!(data["Message"], "All pre-checks passed successfully");
        assert_eq!(data["ChecksPassed"], 3);
        assert_eq!(data["ModelId"], MODEL_ID);
        assert_eq!(data["ModelStatus"], "ACTIVE");
    }

    #[tokio::test]
    async fn test_service_unavailable_stops_run() {
        let mut catalog = MockModelCatalog::new();
        catalog
            .expect_list_models()
            .times(1)
            .returning(|_| Err(ServiceError::transport("dispatch failure: dns error")));

        let report = engine(catalog, untouched_invoker()).run(MODEL_ID).await;

        assert_eq!(report.status(), CallbackStatus::Failed);
        assert_eq!(report.results.checks_passed, 0);
        assert!(matches!(
            report.failure,
            Some(PrecheckFailure::ServiceUnavailable { .. })
        ));

        let data = report.callback_data();
        assert_eq!(data["ChecksPassed"], 0);
        assert_eq!(data["ChecksFailed"], 1);
        assert!(data["Error"].as_str().unwrap().contains("us-east-1 or us-west-2"));
    }

    #[tokio::test]
    async fn test_model_not_found() {
        let mut catalog = MockModelCatalog::new();
        catalog
            .expect_list_models()
            .times(2)
            .returning(|_| Ok(listing("ACTIVE")));

        let report = engine(catalog, untouched_invoker())
            .run("anthropic.claude-v9")
            .await;

        assert_eq!(report.results.checks_passed, 1);
        assert_eq!(
            report.failure,
            Some(PrecheckFailure::ModelNotFound {
                model_id: "anthropic.claude-v9".to_string()
            })
        );
        assert!(report.callback_data()["Error"]
            .as_str()
            .unwrap()
            .contains("not found"));
    }

    #[tokio::test]
    async fn test_model_id_matching_is_exact() {
        let mut catalog = MockModelCatalog::new();
        catalog
            .expect_list_models()
            .times(2)
            .returning(|_| Ok(listing("ACTIVE")));

        let report = engine(catalog, untouched_invoker())
            .run("anthropic.claude-3-5-sonnet-20241022-v2")
            .await;

        assert!(matches!(
            report.failure,
            Some(PrecheckFailure::ModelNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_legacy_model_not_enabled() {
        let mut catalog = MockModelCatalog::new();
        catalog
            .expect_list_models()
            .times(2)
            .returning(|_| Ok(listing("LEGACY")));

        let report = engine(catalog, untouched_invoker()).run(MODEL_ID).await;

        assert!(matches!(
            report.failure,
            Some(PrecheckFailure::ModelNotEnabled {
                status: ModelLifecycleStatus::Legacy,
                ..
            })
        ));
        assert!(report.callback_data()["Error"]
            .as_str()
            .unwrap()
            .contains("Enable this model"));
    }

    #[tokio::test]
    async fn test_unrecognized_status() {
        let mut catalog = MockModelCatalog::new();
        catalog
            .expect_list_models()
            .times(2)
            .returning(|_| Ok(listing("PREVIEW")));

        let report = engine(catalog, untouched_invoker()).run(MODEL_ID).await;

        assert_eq!(
            report.failure,
            Some(PrecheckFailure::UnknownModelStatus {
                model_id: MODEL_ID.to_string(),
                status: "PREVIEW".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_second_listing_error() {
        let mut catalog = MockModelCatalog::new();
        let mut seq = mockall::Sequence::new();
        catalog
            .expect_list_models()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(listing("ACTIVE")));
        catalog
            .expect_list_models()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ServiceError::new("ThrottlingException", "Rate exceeded")));

        let report = engine(catalog, untouched_invoker()).run(MODEL_ID).await;

        assert_eq!(report.results.checks_passed, 1);
        assert_eq!(
            report.callback_data()["Error"],
            "Failed to check model access: ThrottlingException: Rate exceeded"
        );
    }

    #[tokio::test]
    async fn test_invocation_denied() {
        let mut catalog = MockModelCatalog::new();
        catalog
            .expect_list_models()
            .times(2)
            .returning(|_| Ok(listing("ACTIVE")));

        let mut invoker = MockModelInvoker::new();
        invoker.expect_invoke_model().times(1).returning(|_, _| {
            Err(ServiceError::new(
                "AccessDeniedException",
                "You don't have access to the model with the specified model ID.",
            ))
        });

        let report = engine(catalog, invoker).run(MODEL_ID).await;

        assert_eq!(report.results.checks_passed, 2);
        assert_eq!(report.results.checks_failed, 1);
        let error = report.callback_data()["Error"].as_str().unwrap().to_string();
        assert!(error.contains("AccessDeniedException"));
        assert!(error.ends_with("Check IAM permissions."));
    }

    #[tokio::test]
    async fn test_undecodable_response_is_unexpected() {
        let mut catalog = MockModelCatalog::new();
        catalog
            .expect_list_models()
            .times(2)
            .returning(|_| Ok(listing("ACTIVE")));

        let mut invoker = MockModelInvoker::new();
        invoker
            .expect_invoke_model()
            .times(1)
            .returning(|_, _| Ok(b"not json".to_vec()));

        let report = engine(catalog, invoker).run(MODEL_ID).await;

        assert!(matches!(report.failure, Some(PrecheckFailure::Unexpected(_))));
        assert!(report.callback_data()["Error"]
            .as_str()
            .unwrap()
            .starts_with("Unexpected error:"));
    }
}
