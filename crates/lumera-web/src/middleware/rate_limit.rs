//! Per-IP login throttling.
//!
//! Applied to the login route only. The client key comes from proxy
//! headers (`X-Forwarded-For`, then `X-Real-IP`); requests without either
//! land in the shared `"unknown"` bucket rather than being rejected, so a
//! deployment without a reverse proxy degrades to one global login
//! counter.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use lumera_core::{client_key, LimitDecision, UNKNOWN_CLIENT_KEY};

use crate::error::AppError;
use crate::state::AppState;

pub async fn limit_login(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let forwarded_for = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    let real_ip = req.headers().get("x-real-ip").and_then(|v| v.to_str().ok());

    let key = client_key(forwarded_for, real_ip);
    if key == UNKNOWN_CLIENT_KEY {
        tracing::debug!("No client IP headers present; throttling under the shared bucket");
    }

    match state.login_limiter.check(&key) {
        LimitDecision::Allowed { count, .. } => {
            tracing::debug!("Login attempt {count} in current window for {key}");
            Ok(next.run(req).await)
        }
        LimitDecision::Blocked {
            message,
            resets_at_ms,
        } => {
            tracing::warn!("Rate limited login attempt from {key} (resets at {resets_at_ms})");
            Err(AppError::RateLimited {
                message,
                resets_at_ms,
            })
        }
    }
}
