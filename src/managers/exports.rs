use crate::branch::client::BranchClient;
use crate::branch::config::BranchConfig;
use crate::branch::credentials::{resolve, CallCredentials};
use crate::branch::scope::scope_params;
use crate::errors::{ApiError, ToolError};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_action_error;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const EXPORTS_ACTIONS: &[&str] = &["daily", "custom_create", "custom_status"];

// Request fields forwarded into a custom export request body.
const CUSTOM_EXPORT_FIELDS: &[&str] = &[
    "report_type",
    "start_date",
    "end_date",
    "fields",
    "filter",
    "limit",
    "timezone",
    "response_format",
];

/// Daily and custom log exports (`/v3/export`, `/v2/logs`).
#[derive(Clone)]
pub struct ExportsManager {
    logger: Logger,
    config: Arc<BranchConfig>,
    client: Arc<BranchClient>,
}

impl ExportsManager {
    pub fn new(logger: Logger, config: Arc<BranchConfig>, client: Arc<BranchClient>) -> Self {
        Self {
            logger: logger.child("exports"),
            config,
            client,
        }
    }

    pub async fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "daily" => self.daily(&args).await,
            "custom_create" => self.custom_create(&args).await,
            "custom_status" => self.custom_status(&args).await,
            _ => Err(unknown_action_error("mcp_exports", action, EXPORTS_ACTIONS)),
        }
    }

    async fn daily(&self, args: &Value) -> Result<Value, ToolError> {
        let creds = resolve(&CallCredentials::from_args(args), &self.config);
        let (branch_key, branch_secret) = match (creds.branch_key, creds.branch_secret) {
            (Some(key), Some(secret)) => (key, secret),
            _ => {
                return Err(
                    ApiError::caller("Branch Key and Secret are not configured").into(),
                )
            }
        };
        let export_date = args
            .get("export_date")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::invalid_params("export_date is required (YYYY-MM-DD)"))?;

        let body = serde_json::json!({
            "branch_key": branch_key,
            "branch_secret": branch_secret,
            "export_date": export_date,
        });
        let result = self
            .client
            .request(Method::POST, "/v3/export", &[], None, Some(&body))
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "export_date": export_date,
            "data": result,
        }))
    }

    async fn custom_create(&self, args: &Value) -> Result<Value, ToolError> {
        let creds = resolve(&CallCredentials::from_args(args), &self.config);
        let access_token = creds.api_key.ok_or_else(|| {
            ApiError::caller(
                "Access token is not configured (set BRANCH_API_KEY or pass api_key)",
            )
        })?;

        let scope = scope_params(
            creds.app_id.as_deref(),
            creds.organization_id.as_deref(),
            &self.config,
        );
        if scope.is_empty() {
            return Err(ApiError::caller(
                "An app_id or organization_id is required for custom exports",
            )
            .into());
        }

        let mut body = serde_json::Map::new();
        for field in CUSTOM_EXPORT_FIELDS {
            if let Some(value) = args.get(*field) {
                if !value.is_null() {
                    body.insert(field.to_string(), value.clone());
                }
            }
        }
        if !body.contains_key("report_type") {
            return Err(ToolError::invalid_params("report_type is required"));
        }

        let query = scope.query_pairs();
        let result = self
            .client
            .request(
                Method::POST,
                "/v2/logs",
                &query,
                Some(&access_token),
                Some(&Value::Object(body)),
            )
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "request_id": result.get("handle").cloned().unwrap_or(Value::Null),
            "data": result,
        }))
    }

    async fn custom_status(&self, args: &Value) -> Result<Value, ToolError> {
        let creds = resolve(&CallCredentials::from_args(args), &self.config);
        let access_token = creds.api_key.ok_or_else(|| {
            ApiError::caller(
                "Access token is not configured (set BRANCH_API_KEY or pass api_key)",
            )
        })?;
        let request_id = args
            .get("request_id")
            .and_then(|v| v.as_str())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ToolError::invalid_params("request_id is required"))?;

        let scope = scope_params(
            creds.app_id.as_deref(),
            creds.organization_id.as_deref(),
            &self.config,
        );

        self.logger
            .debug("custom_status", Some(&serde_json::json!({"request_id": request_id})));

        let path = format!("/v2/logs/{}", request_id);
        let query = scope.query_pairs();
        let result = self
            .client
            .request(Method::GET, &path, &query, Some(&access_token), None)
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "request_id": request_id,
            "data": result,
        }))
    }
}

#[async_trait::async_trait]
impl ToolHandler for ExportsManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(args).await
    }
}
