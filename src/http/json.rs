//! Generic JSON GET client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::UpstreamError;

const USER_AGENT: &str = concat!("slircbot/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// GET `url` and parse the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError>;
}

/// `reqwest`-backed fetcher. Dropping the returned future aborts the request.
pub struct HttpJsonFetcher {
    client: reqwest::Client,
}

impl HttpJsonFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl JsonFetcher for HttpJsonFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        debug!(url = %url, "HTTP GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(response.json::<Value>().await?)
    }
}

/// String at a JSON pointer (e.g. `/value/joke`).
pub fn json_str<'a>(value: &'a Value, pointer: &str) -> Result<&'a str, UpstreamError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| UpstreamError::Json(pointer.to_string()))
}

/// Number at a JSON pointer.
pub fn json_f64(value: &Value, pointer: &str) -> Result<f64, UpstreamError> {
    value
        .pointer(pointer)
        .and_then(Value::as_f64)
        .ok_or_else(|| UpstreamError::Json(pointer.to_string()))
}
