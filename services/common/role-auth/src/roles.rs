use std::fmt;

use serde::Serialize;

use crate::claims::ClaimValue;
use crate::error::{BuildError, BuildResult};

/// Coarse authorization role derived for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Viewer,
    Operator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Operator => "operator",
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Role::Operator)
    }

    /// Maps a resolved claim to a role. Only a string equal to the sentinel,
    /// or a string array containing it, grants [`Role::Operator`].
    pub fn from_claim(value: Option<&ClaimValue>, sentinel: &OperatorSentinel) -> Self {
        let granted = match value {
            Some(ClaimValue::String(value)) => sentinel.matches(value),
            Some(ClaimValue::Strings(values)) => values.iter().any(|value| sentinel.matches(value)),
            _ => false,
        };

        if granted {
            Role::Operator
        } else {
            Role::Viewer
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim value that denotes the operator role, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSentinel {
    folded: String,
}

impl OperatorSentinel {
    pub fn new(value: &str) -> BuildResult<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(BuildError::InvalidConfig(
                "operator claim value must not be empty",
            ));
        }
        Ok(Self {
            folded: value.to_lowercase(),
        })
    }

    pub fn matches(&self, candidate: &str) -> bool {
        candidate.to_lowercase() == self.folded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sentinel() -> OperatorSentinel {
        OperatorSentinel::new("operator").expect("sentinel")
    }

    fn role_for(value: serde_json::Value) -> Role {
        let claim = ClaimValue::from(value);
        Role::from_claim(Some(&claim), &sentinel())
    }

    #[test]
    fn scalar_matches_case_insensitively() {
        assert_eq!(role_for(json!("operator")), Role::Operator);
        assert_eq!(role_for(json!("Operator")), Role::Operator);
        assert_eq!(role_for(json!("OPERATOR")), Role::Operator);
        assert_eq!(role_for(json!("viewer")), Role::Viewer);
        assert_eq!(role_for(json!("operators")), Role::Viewer);
        assert_eq!(role_for(json!("")), Role::Viewer);
    }

    #[test]
    fn array_membership_grants_operator() {
        assert_eq!(role_for(json!(["user", "operator"])), Role::Operator);
        assert_eq!(role_for(json!(["OPERATOR", "user"])), Role::Operator);
        assert_eq!(role_for(json!(["user"])), Role::Viewer);
        assert_eq!(role_for(json!([])), Role::Viewer);
    }

    #[test]
    fn other_shapes_fall_back_to_viewer() {
        assert_eq!(role_for(json!({"operator": true})), Role::Viewer);
        assert_eq!(role_for(json!(1)), Role::Viewer);
        assert_eq!(role_for(json!(true)), Role::Viewer);
        assert_eq!(role_for(json!(null)), Role::Viewer);
        assert_eq!(role_for(json!(["operator", 7])), Role::Viewer);
        assert_eq!(Role::from_claim(None, &sentinel()), Role::Viewer);
    }

    #[test]
    fn configured_sentinel_is_folded() {
        let sentinel = OperatorSentinel::new(" Admin ").expect("sentinel");
        assert!(sentinel.matches("admin"));
        assert!(sentinel.matches("ADMIN"));
        assert!(!sentinel.matches("operator"));
    }

    #[test]
    fn empty_sentinel_is_rejected() {
        let err = OperatorSentinel::new("   ").expect_err("empty sentinel");
        assert!(matches!(err, BuildError::InvalidConfig(_)));
    }

    #[test]
    fn default_role_is_viewer() {
        assert_eq!(Role::default(), Role::Viewer);
        assert_eq!(Role::Operator.to_string(), "operator");
        assert_eq!(
            serde_json::to_value(Role::Viewer).expect("serialize"),
            json!("viewer")
        );
    }
}
