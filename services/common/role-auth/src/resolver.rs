use axum::http::{HeaderMap, Request};
use tracing::{debug, info, warn};

use crate::claims::{ClaimPath, ClaimSet};
use crate::config::RoleAuthConfig;
use crate::error::BuildResult;
use crate::extractors::bearer_token;
use crate::keys::load_public_key;
use crate::roles::{OperatorSentinel, Role};
use crate::verifier::{ClaimsParser, TokenParser};

/// Derives a [`Role`] for each request.
///
/// Built once at startup and never mutated afterwards, so a single instance
/// can be shared (usually behind an `Arc`) by every request handler.
#[derive(Debug, Clone)]
pub struct RoleResolver {
    claim_path: ClaimPath,
    sentinel: OperatorSentinel,
    parser: ClaimsParser,
}

impl RoleResolver {
    /// Builds the resolver, loading the public key when one is configured.
    /// Fails on unusable key material instead of falling back to trusting
    /// unverified tokens.
    pub fn from_config(config: &RoleAuthConfig) -> BuildResult<Self> {
        let claim_path = ClaimPath::parse(&config.claim_path)?;
        let sentinel = OperatorSentinel::new(&config.operator_value)?;

        let key = match &config.public_key_path {
            Some(path) => Some(load_public_key(path)?),
            None => None,
        };
        let parser = ClaimsParser::from_config(config, key)?;

        match &config.public_key_path {
            Some(path) => info!(
                key_path = %path.display(),
                claim_path = %claim_path,
                algorithms = ?config.algorithms,
                issuer_check = config.issuer.is_some(),
                audience_check = config.audience.is_some(),
                "bearer token signatures will be verified"
            ),
            None => warn!(
                claim_path = %claim_path,
                issuer_check = config.issuer.is_some(),
                audience_check = config.audience.is_some(),
                "no public key configured; trusting bearer tokens without signature verification"
            ),
        }

        Ok(Self {
            claim_path,
            sentinel,
            parser,
        })
    }

    pub fn verifies_signatures(&self) -> bool {
        self.parser.is_verifying()
    }

    /// Role for a request carrying `headers`. Total: every failure resolves
    /// to [`Role::Viewer`].
    pub fn role_for_headers(&self, headers: &HeaderMap) -> Role {
        let Some(token) = bearer_token(headers) else {
            debug!("no bearer token presented; resolving to viewer");
            return Role::Viewer;
        };

        match self.parser.parse(token) {
            Ok(claims) => self.role_for_claims(&claims),
            Err(err) => {
                debug!(error = %err, "bearer token rejected; resolving to viewer");
                Role::Viewer
            }
        }
    }

    pub fn role_for_request<B>(&self, request: &Request<B>) -> Role {
        self.role_for_headers(request.headers())
    }

    pub fn role_for_claims(&self, claims: &ClaimSet) -> Role {
        let value = claims.resolve(&self.claim_path);
        if value.is_none() {
            debug!(claim_path = %self.claim_path, "role claim not present; resolving to viewer");
        }
        Role::from_claim(value, &self.sentinel)
    }

    /// Consumes the resolver into the `(request headers) -> Role` hook a
    /// hosting server registers.
    pub fn hook(self) -> impl Fn(&HeaderMap) -> Role + Clone + Send + Sync + 'static {
        let resolver = std::sync::Arc::new(self);
        move |headers: &HeaderMap| resolver.role_for_headers(headers)
    }
}
