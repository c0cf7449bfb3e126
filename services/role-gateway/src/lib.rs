pub mod config;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::get;
use axum::{middleware, Json, Router};
use role_auth::{require_operator, resolve_role, Role, RoleResolver};
use serde::Serialize;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub roles: Arc<RoleResolver>,
}

impl FromRef<AppState> for Arc<RoleResolver> {
    fn from_ref(state: &AppState) -> Self {
        state.roles.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub role: Role,
}

async fn health() -> &'static str {
    "ok"
}

async fn whoami(role: Role) -> Json<WhoAmI> {
    Json(WhoAmI { role })
}

async fn operator_ping() -> &'static str {
    "pong"
}

pub fn app(state: AppState) -> Router {
    let operator_routes: Router<AppState> = Router::new()
        .route("/operator/ping", get(operator_ping))
        .route_layer(middleware::from_fn_with_state(
            state.roles.clone(),
            require_operator,
        ));

    Router::new()
        .route("/healthz", get(health))
        .route("/whoami", get(whoami))
        .merge(operator_routes)
        .layer(middleware::from_fn_with_state(
            state.roles.clone(),
            resolve_role,
        ))
        .with_state(state)
}
