mod api;
mod auth;
mod config;
mod dto;
mod error;
mod middleware;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use lumera_core::{FixedWindowLimiter, LimitConfig};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lumera_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;
    let tls_config = config.tls.clone();
    let tls_enabled = tls_config.cert_path.is_some() && tls_config.key_path.is_some();
    let jwt_ttl = Duration::from_secs(config.auth.jwt_ttl_hours * 3600);

    let login_limiter = Arc::new(FixedWindowLimiter::new(LimitConfig {
        window_ms: config.rate_limit.login_window_ms,
        max: config.rate_limit.login_max_attempts,
        message: config.rate_limit.message.clone(),
    })?);

    let revoked_tokens = Arc::new(dashmap::DashMap::new());

    let state = AppState {
        config: Arc::new(config),
        login_limiter,
        revoked_tokens: revoked_tokens.clone(),
    };

    // Revoked tokens only matter until the token itself expires; prune the
    // rest periodically so the map stays bounded.
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            revoked_tokens.retain(|_, revoked_at: &mut std::time::Instant| {
                revoked_at.elapsed() < jwt_ttl
            });
        }
    });

    // CORS: same-origin only by default (no cross-origin requests allowed)
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Per-IP limiter on the login route only
    let login_routes = api::login_router().layer(from_fn_with_state(
        state.clone(),
        middleware::rate_limit::limit_login,
    ));

    let base_router = axum::Router::new().nest(
        "/api",
        login_routes
            .merge(api::auth_router())
            .merge(api::store_router()),
    );

    let app = if tls_enabled {
        base_router
            .layer(from_fn(middleware::security_headers::security_headers_with_hsts))
            .layer(RequestBodyLimitLayer::new(64 * 1024))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    } else {
        base_router
            .layer(from_fn(middleware::security_headers::security_headers))
            .layer(RequestBodyLimitLayer::new(64 * 1024))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    };

    if let (Some(cert), Some(key)) = (&tls_config.cert_path, &tls_config.key_path) {
        use axum_server::tls_rustls::RustlsConfig;
        let rustls_config = RustlsConfig::from_pem_file(cert, key).await?;
        tracing::info!("lumera-web listening on https://{}", bind_addr);
        axum_server::bind_rustls(bind_addr, rustls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        tracing::info!("lumera-web listening on http://{}", bind_addr);
        axum::serve(listener, app).await?;
    }

    Ok(())
}
