use crate::branch::client::BranchClient;
use crate::branch::config::BranchConfig;
use crate::branch::credentials::{resolve, CallCredentials};
use crate::errors::{ApiError, ToolError};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_action_error;
use base64::Engine;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const QR_ACTIONS: &[&str] = &["create"];

/// QR code generation for deep links (`/v1/qr-code`). The endpoint
/// answers with image bytes, returned here base64-encoded.
#[derive(Clone)]
pub struct QrManager {
    logger: Logger,
    config: Arc<BranchConfig>,
    client: Arc<BranchClient>,
}

impl QrManager {
    pub fn new(logger: Logger, config: Arc<BranchConfig>, client: Arc<BranchClient>) -> Self {
        Self {
            logger: logger.child("qr"),
            config,
            client,
        }
    }

    pub async fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "create" => self.create(&args).await,
            _ => Err(unknown_action_error("mcp_qr", action, QR_ACTIONS)),
        }
    }

    async fn create(&self, args: &Value) -> Result<Value, ToolError> {
        let creds = resolve(&CallCredentials::from_args(args), &self.config);
        let branch_key = creds
            .branch_key
            .ok_or_else(|| ApiError::caller("Branch Key is not configured"))?;

        let mut body = serde_json::Map::new();
        body.insert("branch_key".to_string(), Value::String(branch_key));
        for field in ["data", "qr_code_settings"] {
            if let Some(value) = args.get(field) {
                if !value.is_null() {
                    body.insert(field.to_string(), value.clone());
                }
            }
        }

        let response = self
            .client
            .request_binary(
                Method::POST,
                "/v1/qr-code",
                &[],
                None,
                Some(&Value::Object(body)),
            )
            .await?;

        self.logger.debug(
            "create",
            Some(&serde_json::json!({
                "content_type": response.content_type,
                "bytes": response.bytes.len(),
            })),
        );

        let encoded = base64::engine::general_purpose::STANDARD.encode(&response.bytes);
        Ok(serde_json::json!({
            "success": true,
            "content_type": response.content_type,
            "image_base64": encoded,
            "bytes": response.bytes.len(),
        }))
    }
}

#[async_trait::async_trait]
impl ToolHandler for QrManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ToolErrorKind;

    fn manager(config: BranchConfig) -> QrManager {
        let logger = Logger::new("test");
        let config = Arc::new(config);
        let client = Arc::new(BranchClient::new(logger.clone(), &config).expect("client"));
        QrManager::new(logger, config, client)
    }

    #[tokio::test]
    async fn create_without_branch_key_fails_before_network() {
        let err = manager(BranchConfig::default())
            .handle_action(serde_json::json!({"action": "create"}))
            .await
            .expect_err("must fail");
        assert_eq!(err.kind, ToolErrorKind::InvalidParams);
        assert!(err.message.contains("Branch Key"));
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let err = manager(BranchConfig::default())
            .handle_action(serde_json::json!({"action": "generate"}))
            .await
            .expect_err("unknown action");
        assert!(err.message.contains("mcp_qr"));
    }
}
