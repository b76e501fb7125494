pub const DEFAULT_API_HOST: &str = "https://api2.branch.io";

/// Service-level Branch credentials, read once from the environment at
/// startup and shared read-only by every tool invocation. Every field is
/// optional; per-call parameters take precedence over these defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchConfig {
    pub branch_key: Option<String>,
    pub branch_secret: Option<String>,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
    pub app_id: Option<String>,
    pub organization_id: Option<String>,
    pub api_host: Option<String>,
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl BranchConfig {
    pub fn from_env() -> Self {
        Self {
            branch_key: env_string("BRANCH_KEY"),
            branch_secret: env_string("BRANCH_SECRET"),
            api_key: env_string("BRANCH_API_KEY"),
            auth_token: env_string("BRANCH_AUTH_TOKEN"),
            app_id: env_string("BRANCH_APP_ID"),
            organization_id: env_string("BRANCH_ORGANIZATION_ID"),
            api_host: env_string("BRANCH_API_HOST"),
        }
    }

    pub fn api_host(&self) -> &str {
        self.api_host.as_deref().unwrap_or(DEFAULT_API_HOST)
    }
}
