mod auth_handlers;
mod store_handlers;

use axum::routing::{get, post};
use axum::Json;
use axum::Router;

use crate::state::AppState;

/// The login route, guarded by the per-IP limiter in `main`.
pub fn login_router() -> Router<AppState> {
    Router::new().route("/auth/login", post(auth_handlers::login))
}

/// Session routes that must not share the login route's rate limit: an
/// authenticated client polling `/auth/me` would exhaust it immediately.
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(auth_handlers::logout))
        .route("/auth/me", get(auth_handlers::me))
}

pub fn store_router() -> Router<AppState> {
    Router::new()
        .route("/store/quote", post(store_handlers::quote_order))
        .route("/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
