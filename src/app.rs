use crate::branch::client::BranchClient;
use crate::branch::config::BranchConfig;
use crate::errors::ToolError;
use crate::managers;
use crate::mcp::catalog::tool_catalog;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: Arc<BranchConfig>,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(executor: &ToolExecutor) -> Result<(), ToolError> {
        let mut missing: Vec<String> = tool_catalog()
            .iter()
            .filter(|tool| !executor.has_handler(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("Every tool in tool_catalog.json must have a registered handler.")
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    pub fn initialize() -> Result<Self, ToolError> {
        let logger = Logger::new("branch-mcp");
        let config = Arc::new(BranchConfig::from_env());
        let client = Arc::new(BranchClient::new(logger.clone(), &config)?);

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert(
            "mcp_links".to_string(),
            Arc::new(managers::links::LinksManager::new(
                logger.clone(),
                config.clone(),
                client.clone(),
            )),
        );
        handlers.insert(
            "mcp_qr".to_string(),
            Arc::new(managers::qr::QrManager::new(
                logger.clone(),
                config.clone(),
                client.clone(),
            )),
        );
        handlers.insert(
            "mcp_exports".to_string(),
            Arc::new(managers::exports::ExportsManager::new(
                logger.clone(),
                config.clone(),
                client.clone(),
            )),
        );
        handlers.insert(
            "mcp_analytics".to_string(),
            Arc::new(managers::analytics::AnalyticsManager::new(
                logger.clone(),
                config.clone(),
                client.clone(),
            )),
        );
        handlers.insert(
            "mcp_apps".to_string(),
            Arc::new(managers::apps::AppsManager::new(
                logger.clone(),
                config.clone(),
                client.clone(),
            )),
        );

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));
        Self::validate_tool_wiring(&tool_executor)?;

        logger.info(
            "initialized",
            Some(&serde_json::json!({
                "tools": tool_executor.tool_names(),
                "api_host": config.api_host(),
            })),
        );

        Ok(Self {
            logger,
            config,
            tool_executor,
        })
    }
}
