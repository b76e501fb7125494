use crate::branch::config::BranchConfig;
use crate::errors::{ApiError, ToolError};
use crate::services::logger::Logger;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ACCESS_TOKEN_HEADER: &str = "Access-Token";

/// Thin dispatcher over the Branch REST API. Builds the outbound call
/// from resolved credentials and normalizes every failure mode through
/// the ApiError taxonomy. Never retries; callers decide what a failure
/// means for their tool.
#[derive(Clone)]
pub struct BranchClient {
    logger: Logger,
    http: Client,
    base_url: Url,
}

pub struct BinaryResponse {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl BranchClient {
    pub fn new(logger: Logger, config: &BranchConfig) -> Result<Self, ToolError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        let base_url = Url::parse(config.api_host()).map_err(|_| {
            ToolError::internal(format!("Invalid Branch API host: {}", config.api_host()))
        })?;
        Ok(Self {
            logger: logger.child("branch"),
            http,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        access_token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|_| ApiError::caller(format!("Invalid Branch API path: {}", path)))?;
        let mut req = self.http.request(method, url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = access_token {
            req = req.header(ACCESS_TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(req)
    }

    /// Sends one request and returns the parsed JSON body (raw text when
    /// the body is not JSON). Non-2xx responses become `ApiError` with a
    /// status and the captured body; failures before any response arrived
    /// become `ApiError` without a status.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        access_token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let req = self.build(method.clone(), path, query, access_token, body)?;

        let started = Instant::now();
        let response = req.send().await?;
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let text = response.text().await?;
        let payload: Value =
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()));

        self.logger.debug(
            "request",
            Some(&serde_json::json!({
                "method": method.as_str(),
                "path": path,
                "status": status.as_u16(),
                "duration_ms": started.elapsed().as_millis(),
            })),
        );

        if !status.is_success() {
            return Err(ApiError::response(status.as_u16(), &status_text, payload));
        }
        Ok(payload)
    }

    /// Variant for endpoints that answer with binary content (QR code
    /// images). The error path is identical to `request`.
    pub async fn request_binary(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        access_token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<BinaryResponse, ApiError> {
        let req = self.build(method, path, query, access_token, body)?;

        let response = req.send().await?;
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let payload: Value = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
            return Err(ApiError::response(status.as_u16(), &status_text, payload));
        }
        Ok(BinaryResponse {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
