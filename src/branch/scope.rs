use crate::branch::config::BranchConfig;

/// Identifies which account's data a request targets. Holds at most one
/// of the two identifiers; an app id always wins over an organization id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeParams {
    pub app_id: Option<String>,
    pub organization_id: Option<String>,
}

impl ScopeParams {
    pub fn is_empty(&self) -> bool {
        self.app_id.is_none() && self.organization_id.is_none()
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        if let Some(app_id) = &self.app_id {
            return vec![("app_id", app_id.clone())];
        }
        if let Some(organization_id) = &self.organization_id {
            return vec![("organization_id", organization_id.clone())];
        }
        Vec::new()
    }
}

/// Derives the single discriminating identifier for an endpoint that
/// accepts either an app or an organization scope. Caller value falls
/// back to the configured default per identifier; when an app id is
/// resolvable the organization id is never included, even if supplied.
pub fn scope_params(
    app_id: Option<&str>,
    organization_id: Option<&str>,
    config: &BranchConfig,
) -> ScopeParams {
    if let Some(app_id) = app_id.or(config.app_id.as_deref()) {
        return ScopeParams {
            app_id: Some(app_id.to_string()),
            organization_id: None,
        };
    }
    ScopeParams {
        app_id: None,
        organization_id: organization_id
            .or(config.organization_id.as_deref())
            .map(|s| s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_id_wins_even_when_both_supplied() {
        let config = BranchConfig {
            app_id: Some("C".to_string()),
            ..Default::default()
        };
        let scope = scope_params(Some("A"), Some("B"), &config);
        assert_eq!(scope.app_id.as_deref(), Some("A"));
        assert!(scope.organization_id.is_none());
    }

    #[test]
    fn config_app_id_beats_caller_organization_id() {
        let config = BranchConfig {
            app_id: Some("C".to_string()),
            organization_id: Some("O".to_string()),
            ..Default::default()
        };
        let scope = scope_params(None, Some("B"), &config);
        assert_eq!(scope.app_id.as_deref(), Some("C"));
        assert!(scope.organization_id.is_none());
    }

    #[test]
    fn falls_back_to_config_organization_id() {
        let config = BranchConfig {
            organization_id: Some("Z".to_string()),
            ..Default::default()
        };
        let scope = scope_params(None, None, &config);
        assert!(scope.app_id.is_none());
        assert_eq!(scope.organization_id.as_deref(), Some("Z"));
    }

    #[test]
    fn empty_when_nothing_resolvable() {
        let scope = scope_params(None, None, &BranchConfig::default());
        assert!(scope.is_empty());
        assert!(scope.query_pairs().is_empty());
    }

    #[test]
    fn query_pairs_carry_exactly_one_key() {
        let config = BranchConfig::default();
        let scope = scope_params(Some("A"), Some("B"), &config);
        assert_eq!(scope.query_pairs(), vec![("app_id", "A".to_string())]);
    }
}
