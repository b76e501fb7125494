pub mod logger;
pub mod tool_executor;
