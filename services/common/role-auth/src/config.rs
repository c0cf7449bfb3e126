use std::path::PathBuf;

pub const DEFAULT_CLAIM_PATH: &str = "role";
pub const DEFAULT_OPERATOR_VALUE: &str = "operator";
pub const DEFAULT_ALGORITHM: &str = "RS256";

/// Construction-time configuration for role derivation.
///
/// Leaving `public_key_path` unset selects trusted-proxy mode: token
/// signatures are not checked and an upstream component is assumed to have
/// authenticated the caller.
#[derive(Debug, Clone)]
pub struct RoleAuthConfig {
    /// Dot-delimited location of the role claim.
    pub claim_path: String,
    /// Claim value (or array member) that grants the operator role.
    pub operator_value: String,
    /// PEM encoded RSA public key used to verify token signatures.
    pub public_key_path: Option<PathBuf>,
    /// Expected issuer claim (iss).
    pub issuer: Option<String>,
    /// Expected audience claim (aud).
    pub audience: Option<String>,
    /// Accepted signing algorithms, by JOSE name. RSA family only.
    pub algorithms: Vec<String>,
    /// Allowable clock skew in seconds when validating exp/nbf.
    pub leeway_seconds: u32,
}

impl Default for RoleAuthConfig {
    fn default() -> Self {
        Self {
            claim_path: DEFAULT_CLAIM_PATH.to_string(),
            operator_value: DEFAULT_OPERATOR_VALUE.to_string(),
            public_key_path: None,
            issuer: None,
            audience: None,
            algorithms: vec![DEFAULT_ALGORITHM.to_string()],
            leeway_seconds: 30,
        }
    }
}

impl RoleAuthConfig {
    pub fn with_claim_path(mut self, path: impl Into<String>) -> Self {
        self.claim_path = path.into();
        self
    }

    pub fn with_operator_value(mut self, value: impl Into<String>) -> Self {
        self.operator_value = value.into();
        self
    }

    /// Enables signature verification against the key at `path`.
    pub fn with_public_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.public_key_path = Some(path.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_algorithms<I, A>(mut self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.algorithms = algorithms.into_iter().map(Into::into).collect();
        self
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn verifies_signatures(&self) -> bool {
        self.public_key_path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_trusted_proxy_mode() {
        let config = RoleAuthConfig::default();
        assert_eq!(config.claim_path, "role");
        assert_eq!(config.operator_value, "operator");
        assert_eq!(config.algorithms, vec!["RS256".to_string()]);
        assert!(!config.verifies_signatures());
        assert!(config.issuer.is_none());
        assert!(config.audience.is_none());
    }

    #[test]
    fn builder_overrides_fields() {
        let config = RoleAuthConfig::default()
            .with_claim_path("realm_access.roles")
            .with_operator_value("admin")
            .with_public_key_path("/etc/keys/jwt.pem")
            .with_issuer("https://idp.example")
            .with_audience("console")
            .with_algorithms(["RS256", "PS256"])
            .with_leeway(5);

        assert_eq!(config.claim_path, "realm_access.roles");
        assert_eq!(config.operator_value, "admin");
        assert!(config.verifies_signatures());
        assert_eq!(config.issuer.as_deref(), Some("https://idp.example"));
        assert_eq!(config.audience.as_deref(), Some("console"));
        assert_eq!(config.algorithms.len(), 2);
        assert_eq!(config.leeway_seconds, 5);
    }
}
