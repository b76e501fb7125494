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

const APPS_ACTIONS: &[&str] = &["read", "update"];

/// App configuration read/update (`/v1/app/{app_id}`).
#[derive(Clone)]
pub struct AppsManager {
    logger: Logger,
    config: Arc<BranchConfig>,
    client: Arc<BranchClient>,
}

impl AppsManager {
    pub fn new(logger: Logger, config: Arc<BranchConfig>, client: Arc<BranchClient>) -> Self {
        Self {
            logger: logger.child("apps"),
            config,
            client,
        }
    }

    pub async fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "read" => self.read(&args).await,
            "update" => self.update(&args).await,
            _ => Err(unknown_action_error("mcp_apps", action, APPS_ACTIONS)),
        }
    }

    fn authorize(&self, args: &Value) -> Result<(String, String), ToolError> {
        let creds = resolve(&CallCredentials::from_args(args), &self.config);
        let access_token = creds.api_key.ok_or_else(|| {
            ApiError::caller(
                "Access token is not configured (set BRANCH_API_KEY or pass api_key)",
            )
        })?;
        let app_id = creds.app_id.ok_or_else(|| {
            ApiError::caller("App ID is not configured (set BRANCH_APP_ID or pass app_id)")
        })?;
        Ok((access_token, app_id))
    }

    async fn read(&self, args: &Value) -> Result<Value, ToolError> {
        let (access_token, app_id) = self.authorize(args)?;

        let path = format!("/v1/app/{}", app_id);
        let result = self
            .client
            .request(Method::GET, &path, &[], Some(&access_token), None)
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "app_id": app_id,
            "data": result,
        }))
    }

    async fn update(&self, args: &Value) -> Result<Value, ToolError> {
        let (access_token, app_id) = self.authorize(args)?;
        let data = args
            .get("data")
            .and_then(|v| v.as_object())
            .cloned()
            .ok_or_else(|| ToolError::invalid_params("data must be an object"))?;
        if data.is_empty() {
            return Err(ToolError::invalid_params("data must not be empty"));
        }

        self.logger
            .debug("update", Some(&serde_json::json!({"fields": data.len()})));

        let path = format!("/v1/app/{}", app_id);
        let result = self
            .client
            .request(
                Method::PUT,
                &path,
                &[],
                Some(&access_token),
                Some(&Value::Object(data)),
            )
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "app_id": app_id,
            "data": result,
        }))
    }
}

#[async_trait::async_trait]
impl ToolHandler for AppsManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(args).await
    }
}
