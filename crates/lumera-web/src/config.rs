use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl_hours")]
    pub jwt_ttl_hours: u64,
}

/// Fixed-window limit applied to the login route, per client IP.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_login_window_ms")]
    pub login_window_ms: u64,
    #[serde(default = "default_login_max_attempts")]
    pub login_max_attempts: u32,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Discounted goods total (fils) at which delivery becomes free.
    /// Zero disables free shipping.
    #[serde(default = "default_free_shipping_threshold_fils")]
    pub free_shipping_threshold_fils: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_ttl_hours: default_jwt_ttl_hours(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_window_ms: default_login_window_ms(),
            login_max_attempts: default_login_max_attempts(),
            message: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold_fils: default_free_shipping_threshold_fils(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_jwt_ttl_hours() -> u64 { 24 }
// 5 attempts per 15 minutes.
fn default_login_window_ms() -> u64 { 900_000 }
fn default_login_max_attempts() -> u32 { 5 }
// AED 200.
fn default_free_shipping_threshold_fils() -> u64 { 20_000 }

impl ServerConfig {
    pub fn find_user(&self, username: &str) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("LUMERA_CONFIG").map(PathBuf::from).ok();

        let mut config = if let Some(path) = config_path {
            let contents = std::fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            ServerConfig {
                bind_addr: default_bind_addr(),
                auth: AuthConfig::default(),
                rate_limit: RateLimitConfig::default(),
                store: StoreConfig::default(),
                tls: TlsConfig::default(),
                users: Vec::new(),
            }
        };

        if let Ok(secret) = std::env::var("LUMERA_JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }
        if config.auth.jwt_secret.is_empty() {
            config.auth.jwt_secret = uuid::Uuid::new_v4().to_string();
            tracing::warn!(
                "No JWT secret configured. Generated random secret (will change on restart)."
            );
        }

        if let Ok(addr) = std::env::var("LUMERA_BIND_ADDR") {
            config.bind_addr = addr.parse()?;
        }

        if let Ok(cert) = std::env::var("LUMERA_TLS_CERT") {
            config.tls.cert_path = Some(cert);
        }
        if let Ok(key) = std::env::var("LUMERA_TLS_KEY") {
            config.tls.key_path = Some(key);
        }

        // Security: validate JWT secret strength when accounts exist
        if !config.users.is_empty() {
            const WEAK_SECRETS: &[&str] = &[
                "change-me-to-a-random-secret",
                "secret",
                "password",
                "jwt-secret",
            ];
            if WEAK_SECRETS.iter().any(|&w| config.auth.jwt_secret == w) {
                anyhow::bail!(
                    "JWT secret matches a known weak/placeholder value. \
                     Set a strong random secret via LUMERA_JWT_SECRET environment variable."
                );
            }
            if config.auth.jwt_secret.len() < 32 {
                tracing::warn!(
                    "JWT secret is shorter than 32 characters. \
                     Consider using a stronger secret via LUMERA_JWT_SECRET."
                );
            }
        } else {
            tracing::warn!(
                "No user accounts configured; the login endpoint will reject all credentials."
            );
        }

        if config.rate_limit.login_window_ms == 0 || config.rate_limit.login_max_attempts == 0 {
            anyhow::bail!(
                "rate_limit.login_window_ms and rate_limit.login_max_attempts must be non-zero"
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_login_policy() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.rate_limit.login_window_ms, 900_000);
        assert_eq!(config.rate_limit.login_max_attempts, 5);
        assert!(config.rate_limit.message.is_none());
        assert_eq!(config.store.free_shipping_threshold_fils, 20_000);
        assert!(config.users.is_empty());
    }

    #[test]
    fn parses_full_config() {
        let config: ServerConfig = toml::from_str(
            r#"
            bind_addr = "127.0.0.1:9000"

            [auth]
            jwt_secret = "0123456789abcdef0123456789abcdef"
            jwt_ttl_hours = 12

            [rate_limit]
            login_window_ms = 60000
            login_max_attempts = 3
            message = "Too many login attempts, please try again later."

            [store]
            free_shipping_threshold_fils = 50000

            [[users]]
            username = "amal"
            password_hash = "$argon2id$v=19$m=19456,t=2,p=1$abc$def"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.auth.jwt_ttl_hours, 12);
        assert_eq!(config.rate_limit.login_max_attempts, 3);
        assert_eq!(
            config.rate_limit.message.as_deref(),
            Some("Too many login attempts, please try again later.")
        );
        assert!(config.find_user("amal").is_some());
        assert!(config.find_user("nobody").is_none());
    }
}
