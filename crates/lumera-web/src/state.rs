use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use lumera_core::FixedWindowLimiter;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Per-IP fixed-window limiter guarding the login route. Owns its own
    /// store; a second protected route would get its own limiter.
    pub login_limiter: Arc<FixedWindowLimiter>,
    /// Revoked JWT token IDs (jti). Tokens in this map are rejected by the
    /// auth extractor until they would have expired anyway.
    pub revoked_tokens: Arc<DashMap<String, Instant>>,
}
