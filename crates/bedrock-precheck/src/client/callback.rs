//! Custom resource callback over HTTP
//!
//! The status document is PUT to the presigned URL with an empty
//! content-type, which is what the presigned signature was computed over.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

use super::CallbackSender;
use crate::contracts::CallbackResponse;
use crate::error::{PrecheckError, Result};

/// reqwest-backed callback sender
#[derive(Clone)]
pub struct ReqwestCallbackSender {
    client: Client,
}

impl ReqwestCallbackSender {
    /// Create a sender whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Build the PUT request without sending it
    pub fn build_request(
        &self,
        response_url: &str,
        response: &CallbackResponse,
    ) -> Result<reqwest::Request> {
        let body = serde_json::to_vec(response)?;

        let request = self
            .client
            .put(response_url)
            .header(CONTENT_TYPE, "")
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .build()?;

        Ok(request)
    }
}

#[async_trait]
impl CallbackSender for ReqwestCallbackSender {
    async fn send(&self, response_url: &str, response: &CallbackResponse) -> Result<()> {
        let request = self.build_request(response_url, response)?;
        let reply = self.client.execute(request).await?;

        let status = reply.status();
        if status.is_success() {
            tracing::debug!(status = %status, "Callback delivered");
            Ok(())
        } else {
            let body = reply.text().await.unwrap_or_default();
            Err(PrecheckError::callback(format!(
                "callback rejected with status {}: {}",
                status, body
            )))
        }
    }
}
