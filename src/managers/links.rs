use crate::branch::client::BranchClient;
use crate::branch::config::BranchConfig;
use crate::branch::credentials::{resolve, CallCredentials};
use crate::errors::{ApiError, ToolError};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_action_error;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const LINKS_ACTIONS: &[&str] = &["create", "read", "update", "bulk_create", "delete"];

// Optional deep link fields copied verbatim from args into the request body.
const LINK_FIELDS: &[&str] = &[
    "data", "alias", "channel", "campaign", "feature", "stage", "tags", "type", "duration",
    "identity",
];

/// Deep link CRUD against the `/v1/url` endpoint family.
#[derive(Clone)]
pub struct LinksManager {
    logger: Logger,
    config: Arc<BranchConfig>,
    client: Arc<BranchClient>,
}

fn require_url(args: &Value) -> Result<String, ToolError> {
    args.get("url")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::invalid_params("url is required"))
}

fn link_body(branch_key: &str, args: &Value) -> Value {
    let mut body = serde_json::Map::new();
    body.insert(
        "branch_key".to_string(),
        Value::String(branch_key.to_string()),
    );
    for field in LINK_FIELDS {
        if let Some(value) = args.get(*field) {
            if !value.is_null() {
                body.insert(field.to_string(), value.clone());
            }
        }
    }
    Value::Object(body)
}

impl LinksManager {
    pub fn new(logger: Logger, config: Arc<BranchConfig>, client: Arc<BranchClient>) -> Self {
        Self {
            logger: logger.child("links"),
            config,
            client,
        }
    }

    pub async fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "create" => self.create(&args).await,
            "read" => self.read(&args).await,
            "update" => self.update(&args).await,
            "bulk_create" => self.bulk_create(&args).await,
            "delete" => self.delete(&args).await,
            _ => Err(unknown_action_error("mcp_links", action, LINKS_ACTIONS)),
        }
    }

    async fn create(&self, args: &Value) -> Result<Value, ToolError> {
        let creds = resolve(&CallCredentials::from_args(args), &self.config);
        let branch_key = creds
            .branch_key
            .ok_or_else(|| ApiError::caller("Branch Key is not configured"))?;

        let body = link_body(&branch_key, args);
        let result = self
            .client
            .request(Method::POST, "/v1/url", &[], None, Some(&body))
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "url": result.get("url").cloned().unwrap_or(Value::Null),
            "data": result,
        }))
    }

    async fn read(&self, args: &Value) -> Result<Value, ToolError> {
        let creds = resolve(&CallCredentials::from_args(args), &self.config);
        let branch_key = creds
            .branch_key
            .ok_or_else(|| ApiError::caller("Branch Key is not configured"))?;
        let url = require_url(args)?;

        let query = [("url", url.clone()), ("branch_key", branch_key)];
        let result = self
            .client
            .request(Method::GET, "/v1/url", &query, None, None)
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "url": url,
            "data": result,
        }))
    }

    async fn update(&self, args: &Value) -> Result<Value, ToolError> {
        let creds = resolve(&CallCredentials::from_args(args), &self.config);
        let (branch_key, branch_secret) = match (creds.branch_key, creds.branch_secret) {
            (Some(key), Some(secret)) => (key, secret),
            _ => {
                return Err(
                    ApiError::caller("Branch Key and Secret are not configured").into(),
                )
            }
        };
        let url = require_url(args)?;

        let mut body = link_body(&branch_key, args);
        if let Value::Object(map) = &mut body {
            map.insert("branch_secret".to_string(), Value::String(branch_secret));
        }
        let query = [("url", url.clone())];
        let result = self
            .client
            .request(Method::PUT, "/v1/url", &query, None, Some(&body))
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "url": url,
            "data": result,
        }))
    }

    async fn bulk_create(&self, args: &Value) -> Result<Value, ToolError> {
        let creds = resolve(&CallCredentials::from_args(args), &self.config);
        let branch_key = creds
            .branch_key
            .ok_or_else(|| ApiError::caller("Branch Key is not configured"))?;
        let links = args
            .get("links")
            .and_then(|v| v.as_array())
            .cloned()
            .ok_or_else(|| ToolError::invalid_params("links must be a non-empty array"))?;
        if links.is_empty() {
            return Err(ToolError::invalid_params("links must be a non-empty array"));
        }

        self.logger.debug(
            "bulk_create",
            Some(&serde_json::json!({"count": links.len()})),
        );

        let path = format!("/v1/url/bulk/{}", branch_key);
        let result = self
            .client
            .request(Method::POST, &path, &[], None, Some(&Value::Array(links)))
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "data": result,
        }))
    }

    // Deletion is app-scoped and needs the app-level access token, not
    // just the branch key.
    async fn delete(&self, args: &Value) -> Result<Value, ToolError> {
        let creds = resolve(&CallCredentials::from_args(args), &self.config);
        let access_token = creds.api_key.ok_or_else(|| {
            ApiError::caller(
                "Access token is not configured (set BRANCH_API_KEY or pass api_key)",
            )
        })?;
        let app_id = creds.app_id.ok_or_else(|| {
            ApiError::caller("App ID is required to delete links (set BRANCH_APP_ID or pass app_id)")
        })?;
        let url = require_url(args)?;

        let query = [("url", url.clone()), ("app_id", app_id)];
        let result = self
            .client
            .request(Method::DELETE, "/v1/url", &query, Some(&access_token), None)
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "url": url,
            "data": result,
        }))
    }
}

#[async_trait::async_trait]
impl ToolHandler for LinksManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(args).await
    }
}
