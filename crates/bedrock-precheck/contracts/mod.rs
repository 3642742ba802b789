//! Bedrock Pre-Check Contracts
//!
//! Defines the custom resource wire format and the facts gathered while
//! validating a model.

mod custom_resource;
mod models;

pub use custom_resource::*;
pub use models::*;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Facts and counters accumulated while the checks run
#[derive(Debug, Clone, Serialize)]
pub struct CheckResults {
    /// Model under validation
    pub model_id: String,

    /// Checks that completed successfully
    pub checks_passed: u32,

    /// Checks that failed (at most one, the first failure stops the run)
    pub checks_failed: u32,

    /// Model listing succeeded
    pub service_available: bool,

    /// Lifecycle status reported for the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_status: Option<ModelLifecycleStatus>,

    /// Outcome of the smoke test invocation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation: Option<InvocationOutcome>,

    /// When the run started
    pub started_at: DateTime<Utc>,
}

impl CheckResults {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            checks_passed: 0,
            checks_failed: 0,
            service_available: false,
            model_status: None,
            invocation: None,
            started_at: Utc::now(),
        }
    }

    /// Milliseconds since the run started
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

/// What the smoke test invocation returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationOutcome {
    /// `stop_reason` from the model response, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}
