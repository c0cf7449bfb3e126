use std::sync::Arc;

use anyhow::Context;
use role_auth::RoleResolver;
use role_gateway::config::load_gateway_config;
use role_gateway::{app, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_gateway_config()?;
    // Bad key material is fatal; never serve with a half-built resolver.
    let resolver = RoleResolver::from_config(&config.roles)
        .context("Failed to initialise role resolver")?;
    let state = AppState {
        roles: Arc::new(resolver),
    };

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!(addr = %config.addr, "starting role-gateway");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
