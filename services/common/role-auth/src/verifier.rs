use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::claims::{ClaimSet, ClaimValue};
use crate::config::RoleAuthConfig;
use crate::error::{BuildError, BuildResult, TokenError, TokenResult};

/// Turns a bearer token into claims, or refuses to.
pub trait TokenParser {
    fn parse(&self, token: &str) -> TokenResult<ClaimSet>;
}

/// Issuer and audience assertions. Applied the same way whether or not the
/// signature was verified.
#[derive(Debug, Clone, Default)]
pub struct AssertionChecks {
    issuer: Option<String>,
    audience: Option<String>,
}

impl AssertionChecks {
    pub fn new(issuer: Option<String>, audience: Option<String>) -> Self {
        Self { issuer, audience }
    }

    pub fn enforce(&self, claims: &ClaimSet) -> TokenResult<()> {
        if let Some(expected) = &self.issuer {
            let issuer = claims.get("iss").ok_or(TokenError::MissingClaim("iss"))?;
            if issuer.as_str() != Some(expected.as_str()) {
                return Err(TokenError::IssuerMismatch);
            }
        }

        if let Some(expected) = &self.audience {
            let audience = claims.get("aud").ok_or(TokenError::MissingClaim("aud"))?;
            let accepted = match audience {
                ClaimValue::String(value) => value == expected,
                ClaimValue::Strings(values) => values.iter().any(|value| value == expected),
                _ => false,
            };
            if !accepted {
                return Err(TokenError::AudienceMismatch);
            }
        }

        Ok(())
    }
}

/// Verifies the token signature against the configured RSA key before
/// trusting any claim.
#[derive(Clone)]
pub struct VerifyingParser {
    key: DecodingKey,
    validation: Validation,
    checks: AssertionChecks,
}

impl std::fmt::Debug for VerifyingParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("VerifyingParser")
            .field("algorithms", &self.validation.algorithms)
            .field("checks", &self.checks)
            .finish()
    }
}

impl VerifyingParser {
    pub fn new(
        key: DecodingKey,
        algorithms: Vec<Algorithm>,
        leeway_seconds: u32,
        checks: AssertionChecks,
    ) -> BuildResult<Self> {
        let Some(first) = algorithms.first().copied() else {
            return Err(BuildError::InvalidConfig(
                "at least one signing algorithm is required",
            ));
        };

        let mut validation = Validation::new(first);
        validation.algorithms = algorithms;
        validation.leeway = leeway_seconds.into();
        // exp/nbf are validated when present but not required; iss/aud are
        // handled by AssertionChecks.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;

        Ok(Self {
            key,
            validation,
            checks,
        })
    }
}

impl TokenParser for VerifyingParser {
    fn parse(&self, token: &str) -> TokenResult<ClaimSet> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation)?;
        let claims = ClaimSet::from(data.claims);
        self.checks.enforce(&claims)?;
        Ok(claims)
    }
}

/// Decodes the payload without checking the signature. Only suitable behind
/// a proxy that has already authenticated the caller.
#[derive(Debug, Clone, Default)]
pub struct TrustingParser {
    checks: AssertionChecks,
}

impl TrustingParser {
    pub fn new(checks: AssertionChecks) -> Self {
        Self { checks }
    }
}

impl TokenParser for TrustingParser {
    fn parse(&self, token: &str) -> TokenResult<ClaimSet> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed("expected three dot-separated segments"));
        };

        let header = decode_segment(header, "header")?;
        if !header.is_object() {
            return Err(TokenError::Malformed("header is not a JSON object"));
        }

        let claims = ClaimSet::try_from(decode_segment(payload, "payload")?)?;
        self.checks.enforce(&claims)?;
        Ok(claims)
    }
}

fn decode_segment(segment: &str, name: &'static str) -> TokenResult<Value> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|_| TokenError::Encoding(name))?;
    serde_json::from_slice(&bytes).map_err(|err| TokenError::Json(err.to_string()))
}

/// The parsing strategy, fixed when the resolver is built.
#[derive(Debug, Clone)]
pub enum ClaimsParser {
    Verifying(VerifyingParser),
    Trusting(TrustingParser),
}

impl ClaimsParser {
    /// Verifying when a key was loaded, trusting otherwise.
    pub fn from_config(config: &RoleAuthConfig, key: Option<DecodingKey>) -> BuildResult<Self> {
        let checks = AssertionChecks::new(config.issuer.clone(), config.audience.clone());
        let algorithms = parse_algorithms(&config.algorithms)?;

        Ok(match key {
            Some(key) => ClaimsParser::Verifying(VerifyingParser::new(
                key,
                algorithms,
                config.leeway_seconds,
                checks,
            )?),
            None => ClaimsParser::Trusting(TrustingParser::new(checks)),
        })
    }

    pub fn is_verifying(&self) -> bool {
        matches!(self, ClaimsParser::Verifying(_))
    }
}

impl TokenParser for ClaimsParser {
    fn parse(&self, token: &str) -> TokenResult<ClaimSet> {
        match self {
            ClaimsParser::Verifying(parser) => parser.parse(token),
            ClaimsParser::Trusting(parser) => parser.parse(token),
        }
    }
}

/// Parses JOSE algorithm names, accepting only the RSA family.
pub fn parse_algorithms(names: &[String]) -> BuildResult<Vec<Algorithm>> {
    if names.is_empty() {
        return Err(BuildError::InvalidConfig(
            "at least one signing algorithm is required",
        ));
    }

    names
        .iter()
        .map(|name| {
            let name = name.trim();
            match Algorithm::from_str(name) {
                Ok(
                    alg @ (Algorithm::RS256
                    | Algorithm::RS384
                    | Algorithm::RS512
                    | Algorithm::PS256
                    | Algorithm::PS384
                    | Algorithm::PS512),
                ) => Ok(alg),
                _ => Err(BuildError::UnsupportedAlgorithm(name.to_string())),
            }
        })
        .collect()
}
