mod api_error;
mod mcp_error;
mod tool_error;

pub use api_error::{error_message, ApiError, ApiErrorKind, UNKNOWN_ERROR_MESSAGE};
pub use mcp_error::{ErrorCode, McpError};
pub use tool_error::{ToolError, ToolErrorKind};
