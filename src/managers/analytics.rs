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

const ANALYTICS_ACTIONS: &[&str] = &["query", "cohort"];

const QUERY_FIELDS: &[&str] = &[
    "start_date",
    "end_date",
    "data_source",
    "dimensions",
    "filters",
    "aggregation",
    "granularity",
    "ordered",
    "ordered_by",
];

const COHORT_FIELDS: &[&str] = &[
    "start_date",
    "end_date",
    "data_source",
    "dimensions",
    "filters",
    "measures",
    "granularity_band_count",
    "per_user",
];

/// Aggregate and cohort analytics queries (`/v2/analytics`,
/// `/v1/query/cohort`). Both are Access-Token authenticated and scoped to
/// exactly one app or organization.
#[derive(Clone)]
pub struct AnalyticsManager {
    logger: Logger,
    config: Arc<BranchConfig>,
    client: Arc<BranchClient>,
}

impl AnalyticsManager {
    pub fn new(logger: Logger, config: Arc<BranchConfig>, client: Arc<BranchClient>) -> Self {
        Self {
            logger: logger.child("analytics"),
            config,
            client,
        }
    }

    pub async fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "query" => self.run_query(&args, "/v2/analytics", QUERY_FIELDS).await,
            "cohort" => self.run_query(&args, "/v1/query/cohort", COHORT_FIELDS).await,
            _ => Err(unknown_action_error(
                "mcp_analytics",
                action,
                ANALYTICS_ACTIONS,
            )),
        }
    }

    async fn run_query(
        &self,
        args: &Value,
        path: &str,
        fields: &[&str],
    ) -> Result<Value, ToolError> {
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
                "An app_id or organization_id is required for analytics queries",
            )
            .into());
        }

        let mut body = serde_json::Map::new();
        for field in fields {
            if let Some(value) = args.get(*field) {
                if !value.is_null() {
                    body.insert(field.to_string(), value.clone());
                }
            }
        }
        for field in ["start_date", "end_date"] {
            if !body.contains_key(field) {
                return Err(ToolError::invalid_params(format!(
                    "{} is required (YYYY-MM-DD)",
                    field
                )));
            }
        }

        let mut query = scope.query_pairs();
        if let Some(limit) = args.get("limit").and_then(|v| v.as_u64()) {
            query.push(("limit", limit.to_string()));
        }

        self.logger.debug(
            "query",
            Some(&serde_json::json!({"path": path, "scope": query.len()})),
        );

        let result = self
            .client
            .request(
                Method::POST,
                path,
                &query,
                Some(&access_token),
                Some(&Value::Object(body)),
            )
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "data": result,
        }))
    }
}

#[async_trait::async_trait]
impl ToolHandler for AnalyticsManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ToolErrorKind;

    fn manager(config: BranchConfig) -> AnalyticsManager {
        let logger = Logger::new("test");
        let config = Arc::new(config);
        let client = Arc::new(BranchClient::new(logger.clone(), &config).expect("client"));
        AnalyticsManager::new(logger, config, client)
    }

    #[tokio::test]
    async fn query_requires_access_token() {
        let config = BranchConfig {
            app_id: Some("12345".to_string()),
            ..Default::default()
        };
        let err = manager(config)
            .handle_action(serde_json::json!({
                "action": "query",
                "start_date": "2026-08-01",
                "end_date": "2026-08-07",
            }))
            .await
            .expect_err("token missing");
        assert_eq!(err.kind, ToolErrorKind::InvalidParams);
        assert!(err.message.contains("Access token"));
    }

    #[tokio::test]
    async fn query_requires_scope() {
        let config = BranchConfig {
            api_key: Some("tok".to_string()),
            ..Default::default()
        };
        let err = manager(config)
            .handle_action(serde_json::json!({
                "action": "query",
                "start_date": "2026-08-01",
                "end_date": "2026-08-07",
            }))
            .await
            .expect_err("scope missing");
        assert!(err.message.contains("app_id or organization_id"));
    }

    #[tokio::test]
    async fn query_requires_date_window() {
        let config = BranchConfig {
            api_key: Some("tok".to_string()),
            app_id: Some("12345".to_string()),
            ..Default::default()
        };
        let err = manager(config)
            .handle_action(serde_json::json!({"action": "cohort"}))
            .await
            .expect_err("dates missing");
        assert!(err.message.contains("start_date"));
    }
}
