use branch_mcp::branch::client::BranchClient;
use branch_mcp::branch::config::BranchConfig;
use branch_mcp::managers;
use branch_mcp::services::logger::Logger;
use branch_mcp::services::tool_executor::{ToolExecutor, ToolHandler};
use std::collections::HashMap;
use std::sync::Arc;

pub fn executor_with_config(config: BranchConfig) -> ToolExecutor {
    let logger = Logger::new("test");
    let config = Arc::new(config);
    let client = Arc::new(BranchClient::new(logger.clone(), &config).expect("client"));

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
            config,
            client,
        )),
    );
    ToolExecutor::new(logger, handlers)
}

pub fn meta() -> branch_mcp::services::tool_executor::ToolCallMeta {
    branch_mcp::services::tool_executor::ToolCallMeta {
        trace_id: "trace-test".to_string(),
        span_id: "span-test".to_string(),
    }
}
