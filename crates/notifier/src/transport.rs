use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::{Error, Result};

/// A single outbound webhook call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookRequest {
    pub url: String,
    pub http_method: String,
    pub body: String,
    pub content_type: String,
}

impl WebhookRequest {
    pub fn post_json(url: String, body: String) -> Self {
        Self {
            url,
            http_method: "POST".to_string(),
            body,
            content_type: "application/json".to_string(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send(&self, request: &WebhookRequest) -> Result<()>;
}

pub struct HttpWebhookSender {
    client: reqwest::Client,
}

impl HttpWebhookSender {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn send(&self, request: &WebhookRequest) -> Result<()> {
        let method = reqwest::Method::from_bytes(request.http_method.as_bytes())
            .map_err(|_| Error::Validation(format!("Invalid HTTP method: {}", request.http_method)))?;

        debug!("Sending webhook {} {}", method, request.url);

        let response = self
            .client
            .request(method, &request.url)
            .header(reqwest::header::CONTENT_TYPE, &request.content_type)
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Webhook {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
