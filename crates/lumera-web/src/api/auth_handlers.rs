use std::time::Instant;

use axum::extract::State;
use axum::Json;

use crate::auth::jwt;
use crate::auth::middleware::AuthUser;
use crate::dto::*;
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state
        .config
        .find_user(&body.username)
        .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?
        .clone();

    let password = body.password;
    let hash = user.password_hash;

    let valid = tokio::task::spawn_blocking(move || {
        crate::auth::password::verify_password(&hash, &password)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if !valid {
        tracing::warn!("Failed login attempt for user: {}", user.username);
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    tracing::info!("Password verified successfully for user: {}", user.username);

    let (token, expires_at) = jwt::create_token(
        &state.config.auth.jwt_secret,
        state.config.auth.jwt_ttl_hours,
        &user.username,
    )?;

    Ok(Json(LoginResponse { token, expires_at }))
}

/// Logout handler that accepts the token from either the Authorization
/// header or the JSON body `{ "token": "..." }`, so it works from both
/// regular fetch and navigator.sendBeacon on tab close.
pub async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| {
            serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("token")?.as_str().map(String::from))
        });

    let token = match token {
        Some(t) => t,
        None => return Ok(Json(serde_json::json!({ "success": true }))),
    };

    if let Ok(claims) = jwt::verify_token(&state.config.auth.jwt_secret, &token) {
        state
            .revoked_tokens
            .insert(claims.jti.clone(), Instant::now());
        tracing::info!(
            "Token revoked for user: {} (jti: {})",
            claims.sub,
            claims.jti
        );
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn me(user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse { username: user.sub })
}
