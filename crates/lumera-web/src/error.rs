use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    Auth(String),
    BadRequest(String),
    /// Login attempts from this client exceeded the window limit. Carries
    /// the configured rejection message and the epoch-ms instant at which
    /// the client's window resets.
    RateLimited {
        message: String,
        resets_at_ms: u64,
    },
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resets_at_ms: Option<u64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, resets_at_ms) = match self {
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::RateLimited {
                message,
                resets_at_ms,
            } => (StatusCode::TOO_MANY_REQUESTS, message, Some(resets_at_ms)),
            AppError::Internal(msg) => {
                // Log the real error server-side, return generic message to client
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: message,
            resets_at_ms,
        };

        let mut response = (status, axum::Json(body)).into_response();

        if let Some(resets_at) = resets_at_ms {
            let retry_after_secs = retry_after_seconds(resets_at);
            if let Ok(value) = retry_after_secs.to_string().parse() {
                response.headers_mut().insert("retry-after", value);
            }
        }

        response
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:#}", e);
        AppError::Internal("Internal server error".to_string())
    }
}

/// Whole seconds (rounded up, at least 1) until the given epoch-ms instant.
fn retry_after_seconds(resets_at_ms: u64) -> u64 {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    resets_at_ms.saturating_sub(now_ms).div_ceil(1000).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn past_reset_still_advises_waiting_a_second() {
        assert_eq!(retry_after_seconds(0), 1);
    }
}
