use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use role_auth::config::{DEFAULT_ALGORITHM, DEFAULT_CLAIM_PATH, DEFAULT_OPERATOR_VALUE};
use role_auth::RoleAuthConfig;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub addr: SocketAddr,
    pub roles: RoleAuthConfig,
}

pub fn load_gateway_config() -> Result<GatewayConfig> {
    gateway_config_from(|key| env::var(key).ok())
}

/// Builds the configuration from any key lookup; blank values count as unset.
pub fn gateway_config_from<F>(lookup: F) -> Result<GatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).and_then(|value| normalize_optional(&value));

    let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("Failed to parse HOST '{host}'"))?;
    let port = match var("PORT") {
        Some(value) => value
            .parse::<u16>()
            .with_context(|| format!("Failed to parse PORT '{value}'"))?,
        None => 8080,
    };

    let mut roles = RoleAuthConfig::default()
        .with_claim_path(var("ROLE_CLAIM_PATH").unwrap_or_else(|| DEFAULT_CLAIM_PATH.to_string()))
        .with_operator_value(
            var("ROLE_OPERATOR_VALUE").unwrap_or_else(|| DEFAULT_OPERATOR_VALUE.to_string()),
        );

    if let Some(path) = var("JWT_PUBLIC_KEY_PATH") {
        roles = roles.with_public_key_path(PathBuf::from(path));
    }
    if let Some(issuer) = var("JWT_ISSUER") {
        roles = roles.with_issuer(issuer);
    }
    if let Some(audience) = var("JWT_AUDIENCE") {
        roles = roles.with_audience(audience);
    }

    let algorithms = var("JWT_ALGORITHMS")
        .map(|value| parse_list(&value))
        .unwrap_or_else(|| vec![DEFAULT_ALGORITHM.to_string()]);
    if algorithms.is_empty() {
        return Err(anyhow!("JWT_ALGORITHMS must name at least one algorithm"));
    }
    roles = roles.with_algorithms(algorithms);

    if let Some(value) = var("JWT_LEEWAY_SECONDS") {
        let leeway = value
            .parse::<u32>()
            .with_context(|| format!("Failed to parse JWT_LEEWAY_SECONDS '{value}'"))?;
        roles = roles.with_leeway(leeway);
    }

    Ok(GatewayConfig {
        addr: SocketAddr::from((ip, port)),
        roles,
    })
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
