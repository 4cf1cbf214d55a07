use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::error::{MediaError, Result};

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Parses the body as JSON, or returns the status and body verbatim for anything but 200.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        if !self.is_ok() {
            return Err(MediaError::HttpStatus {
                status: self.status,
                body: self.body,
            });
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Paths are relative to the server base URL, e.g. `/health`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, timeout: Duration) -> Result<HttpReply>;

    async fn post_json(&self, path: &str, body: &Value, timeout: Duration) -> Result<HttpReply>;
}

pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| MediaError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn finish(response: reqwest::Response) -> Result<HttpReply> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, path: &str, timeout: Duration) -> Result<HttpReply> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(timeout)
            .send()
            .await?;

        Self::finish(response).await
    }

    async fn post_json(&self, path: &str, body: &Value, timeout: Duration) -> Result<HttpReply> {
        log::debug!("POST {} payload: {}", path, body);

        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .timeout(timeout)
            .send()
            .await?;

        Self::finish(response).await
    }
}
