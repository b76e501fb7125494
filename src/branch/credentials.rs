use crate::branch::config::BranchConfig;
use serde_json::Value;

/// Credential fields a caller may supply on an individual tool call. Any
/// field left unset falls back to the service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCredentials {
    pub branch_key: Option<String>,
    pub branch_secret: Option<String>,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
    pub app_id: Option<String>,
    pub organization_id: Option<String>,
}

fn arg_string(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl CallCredentials {
    pub fn from_args(args: &Value) -> Self {
        Self {
            branch_key: arg_string(args, "branch_key"),
            branch_secret: arg_string(args, "branch_secret"),
            api_key: arg_string(args, "api_key"),
            auth_token: arg_string(args, "auth_token"),
            app_id: arg_string(args, "app_id"),
            organization_id: arg_string(args, "organization_id"),
        }
    }
}

/// Final credential set for one outbound request. `api_key` and
/// `auth_token` always hold the identical value so downstream code can
/// read either name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub branch_key: Option<String>,
    pub branch_secret: Option<String>,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
    pub app_id: Option<String>,
    pub organization_id: Option<String>,
}

/// Merges caller-supplied credentials with the service configuration.
/// Per field the caller value wins, then the configured default, then the
/// field stays absent. Never fails; required-field checks belong to the
/// tool handler that knows which fields its endpoint needs.
pub fn resolve(params: &CallCredentials, config: &BranchConfig) -> ResolvedCredentials {
    let access_token = params
        .api_key
        .clone()
        .or_else(|| params.auth_token.clone())
        .or_else(|| config.api_key.clone())
        .or_else(|| config.auth_token.clone());

    ResolvedCredentials {
        branch_key: params
            .branch_key
            .clone()
            .or_else(|| config.branch_key.clone()),
        branch_secret: params
            .branch_secret
            .clone()
            .or_else(|| config.branch_secret.clone()),
        api_key: access_token.clone(),
        auth_token: access_token,
        app_id: params.app_id.clone().or_else(|| config.app_id.clone()),
        organization_id: params
            .organization_id
            .clone()
            .or_else(|| config.organization_id.clone()),
    }
}
