//! CloudFormation custom resource contract
//!
//! The inbound request document and the status document PUT back to the
//! presigned `ResponseURL`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::models::DEFAULT_MODEL_ID;

/// Lifecycle operation CloudFormation is performing on the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// Custom resource request event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,

    /// Presigned S3 URL the status document is PUT to
    #[serde(rename = "ResponseURL")]
    pub response_url: String,

    pub stack_id: String,

    pub request_id: String,

    pub logical_resource_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Present on Update and Delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,

    #[serde(default)]
    pub resource_properties: ResourceProperties,

    /// Present on Update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<ResourceProperties>,
}

impl CustomResourceEvent {
    /// Model to validate, falling back to `default_model_id` when the
    /// properties leave it out or empty. Non-empty ids are used as given.
    pub fn model_id_or<'a>(&'a self, default_model_id: &'a str) -> &'a str {
        self.resource_properties
            .model_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(default_model_id)
    }

    /// Model to validate, with the built-in default
    pub fn model_id(&self) -> &str {
        self.model_id_or(DEFAULT_MODEL_ID)
    }

    /// Where and with which correlation ids to answer this event
    pub fn target(&self) -> CallbackTarget {
        CallbackTarget {
            response_url: self.response_url.clone(),
            stack_id: self.stack_id.clone(),
            request_id: self.request_id.clone(),
            logical_resource_id: self.logical_resource_id.clone(),
        }
    }
}

/// Resource properties from the template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    /// `ServiceToken` and anything else the template passes through
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

/// Callback destination plus the identifiers that must be echoed back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackTarget {
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
}

impl CallbackTarget {
    /// Recover a callback target from an event that failed to deserialize.
    ///
    /// Returns `None` when there is no `ResponseURL` to answer to. Missing
    /// correlation ids are left empty.
    pub fn salvage(raw: &Value) -> Option<Self> {
        let field = |name: &str| {
            raw.get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let response_url = field("ResponseURL");
        if response_url.is_empty() {
            return None;
        }

        Some(Self {
            response_url,
            stack_id: field("StackId"),
            request_id: field("RequestId"),
            logical_resource_id: field("LogicalResourceId"),
        })
    }
}

/// Callback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallbackStatus {
    Success,
    Failed,
}

/// Status document PUT to the `ResponseURL`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackResponse {
    pub status: CallbackStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub data: Map<String, Value>,
}

impl CallbackResponse {
    pub fn new(
        target: &CallbackTarget,
        status: CallbackStatus,
        log_stream_name: &str,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            status,
            reason: format!("See CloudWatch Log Stream: {}", log_stream_name),
            physical_resource_id: log_stream_name.to_string(),
            stack_id: target.stack_id.clone(),
            request_id: target.request_id.clone(),
            logical_resource_id: target.logical_resource_id.clone(),
            data,
        }
    }
}
