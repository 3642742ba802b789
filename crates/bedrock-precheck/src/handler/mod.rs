//! Custom resource handler
//!
//! Turns one CloudFormation event into exactly one callback. Delete
//! requests are acknowledged without running any check.

use futures::FutureExt;
use lambda_runtime::LambdaEvent;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::client::{load_sdk_config, BedrockCatalog, BedrockInvoker, CallbackSender, ReqwestCallbackSender};
use crate::config::PrecheckConfig;
use crate::contracts::*;
use crate::engine::{PrecheckEngine, PrecheckReport};
use crate::error::{PrecheckError, PrecheckFailure, Result};

/// Handler state, shared across invocations
pub struct PrecheckHandler {
    /// `Err` holds the start-up error reported to every non-Delete event
    engine: std::result::Result<PrecheckEngine, String>,
    callback: Arc<dyn CallbackSender>,
    default_model_id: String,
}

impl PrecheckHandler {
    pub fn new(
        engine: PrecheckEngine,
        callback: Arc<dyn CallbackSender>,
        default_model_id: impl Into<String>,
    ) -> Self {
        Self {
            engine: Ok(engine),
            callback,
            default_model_id: default_model_id.into(),
        }
    }

    /// Handler that could not be configured. Delete requests still succeed;
    /// every other event fails with `error`.
    pub fn unavailable(callback: Arc<dyn CallbackSender>, error: &PrecheckError) -> Self {
        Self {
            engine: Err(error.to_string()),
            callback,
            default_model_id: DEFAULT_MODEL_ID.to_string(),
        }
    }

    /// [`PrecheckHandler::unavailable`] with an HTTP callback sender using
    /// the default timeout
    pub fn from_startup_error(error: PrecheckError) -> Result<Self> {
        tracing::error!(error = %error, "Handler configuration failed, answering events with FAILED");
        let callback = Arc::new(ReqwestCallbackSender::new(
            PrecheckConfig::default().callback_timeout,
        )?);
        Ok(Self::unavailable(callback, &error))
    }

    /// Handler wired to Bedrock and an HTTP callback sender
    pub async fn from_config(config: &PrecheckConfig) -> Result<Self> {
        let sdk_config = load_sdk_config(config.region.as_deref()).await;
        tracing::info!(
            region = ?sdk_config.region(),
            provider = %config.provider,
            "Initialized Bedrock clients"
        );

        let engine = PrecheckEngine::new(
            Arc::new(BedrockCatalog::new(&sdk_config)),
            Arc::new(BedrockInvoker::new(&sdk_config)),
            config.provider,
        );
        let callback = Arc::new(ReqwestCallbackSender::new(config.callback_timeout)?);

        Ok(Self::new(engine, callback, config.default_model_id.clone()))
    }

    /// Lambda entry point. Never fails: every outcome is reported through
    /// the callback.
    pub async fn handle_lambda(&self, event: LambdaEvent<Value>) -> std::result::Result<(), lambda_runtime::Error> {
        let (payload, context) = event.into_parts();
        tracing::info!(lambda_request_id = %context.request_id, "Invocation started");

        self.handle(payload, &context.env_config.log_stream).await;
        Ok(())
    }

    /// Process one raw event and send its callback.
    ///
    /// Returns the status sent, or `None` when the event carries no
    /// `ResponseURL` to answer to.
    pub async fn handle(&self, payload: Value, log_stream_name: &str) -> Option<CallbackStatus> {
        tracing::info!(event = %payload, "Received event");

        let event = match CustomResourceEvent::deserialize(&payload) {
            Ok(event) => event,
            Err(e) => {
                let Some(target) = CallbackTarget::salvage(&payload) else {
                    tracing::error!(error = %e, "Event has no ResponseURL, cannot send callback");
                    return None;
                };
                let failure =
                    PrecheckFailure::unexpected(PrecheckError::InvalidEvent(e.to_string()).to_string());
                tracing::error!(error = %e, "Unexpected error: invalid event");

                let responder = Responder::new(self.callback.as_ref(), target, log_stream_name);
                return Some(responder.send(CallbackStatus::Failed, error_data(&failure)).await);
            }
        };

        let responder = Responder::new(self.callback.as_ref(), event.target(), log_stream_name);

        if event.request_type == RequestType::Delete {
            tracing::info!(logical_resource_id = %event.logical_resource_id, "Delete request, nothing to check");
            let mut data = Map::new();
            data.insert("Message".to_string(), json!("Delete completed"));
            return Some(responder.send(CallbackStatus::Success, data).await);
        }

        let engine = match &self.engine {
            Ok(engine) => engine,
            Err(reason) => {
                let failure = PrecheckFailure::unexpected(reason.clone());
                tracing::error!(error = %failure, "Handler is not configured");
                return Some(responder.send(CallbackStatus::Failed, error_data(&failure)).await);
            }
        };

        let model_id = event.model_id_or(&self.default_model_id);

        let (status, data) = match AssertUnwindSafe(engine.run(model_id)).catch_unwind().await {
            Ok(report) => {
                log_report(&report);
                (report.status(), report.callback_data())
            }
            Err(panic) => {
                let failure = PrecheckFailure::unexpected(panic_message(panic.as_ref()));
                tracing::error!(error = %failure, "Pre-check run panicked");
                (CallbackStatus::Failed, error_data(&failure))
            }
        };

        Some(responder.send(status, data).await)
    }
}

/// Sends the one callback for an invocation. Consumed by `send`.
pub struct Responder<'a> {
    sender: &'a dyn CallbackSender,
    target: CallbackTarget,
    log_stream_name: &'a str,
}

impl<'a> Responder<'a> {
    pub fn new(sender: &'a dyn CallbackSender, target: CallbackTarget, log_stream_name: &'a str) -> Self {
        Self {
            sender,
            target,
            log_stream_name,
        }
    }

    /// Deliver the status document. Delivery failures are logged only.
    pub async fn send(self, status: CallbackStatus, data: Map<String, Value>) -> CallbackStatus {
        let response = CallbackResponse::new(&self.target, status, self.log_stream_name, data);
        tracing::info!(
            status = ?status,
            data = %serde_json::Value::Object(response.data.clone()),
            "Sending callback"
        );

        if let Err(e) = self.sender.send(&self.target.response_url, &response).await {
            tracing::error!(error = %e, "Failed to send response");
        }
        status
    }
}

fn error_data(failure: &PrecheckFailure) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("Error".to_string(), json!(failure.to_string()));
    data
}

fn log_report(report: &PrecheckReport) {
    match &report.failure {
        None => tracing::info!(
            model_id = %report.results.model_id,
            checks_passed = report.results.checks_passed,
            "Pre-checks passed"
        ),
        Some(failure) => tracing::warn!(
            model_id = %report.results.model_id,
            checks_passed = report.results.checks_passed,
            kind = failure.kind(),
            "Pre-checks failed"
        ),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
