//! Source-identifier derivation for rate limiting.
//!
//! Callers are bucketed by the client IP reported by the reverse proxy:
//! the first `X-Forwarded-For` element, then `X-Real-IP`, then the shared
//! [`UNKNOWN_CLIENT_KEY`] bucket. The fallback is deliberately fail-open:
//! every caller without proxy headers shares one counter rather than
//! erroring out.

/// Shared bucket for callers whose source IP cannot be determined.
pub const UNKNOWN_CLIENT_KEY: &str = "unknown";

/// Derives the rate-limit key from raw proxy header values.
///
/// `forwarded_for` may hold a comma-separated chain
/// (`"client, proxy1, proxy2"`); only the first element identifies the
/// original client. Empty or whitespace-only values fall through to the
/// next source.
pub fn client_key(forwarded_for: Option<&str>, real_ip: Option<&str>) -> String {
    if let Some(forwarded) = forwarded_for {
        if let Some(first) = forwarded.split(',').next() {
            let trimmed = first.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    if let Some(real) = real_ip {
        let trimmed = real.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    UNKNOWN_CLIENT_KEY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_takes_first_element() {
        let key = client_key(Some("1.2.3.4, 10.0.0.1, 10.0.0.2"), Some("9.9.9.9"));
        assert_eq!(key, "1.2.3.4");
    }

    #[test]
    fn forwarded_for_is_trimmed() {
        assert_eq!(client_key(Some("  1.2.3.4  "), None), "1.2.3.4");
    }

    #[test]
    fn falls_back_to_real_ip() {
        assert_eq!(client_key(None, Some("5.6.7.8")), "5.6.7.8");
    }

    #[test]
    fn empty_forwarded_for_falls_through() {
        assert_eq!(client_key(Some("   "), Some("5.6.7.8")), "5.6.7.8");
    }

    #[test]
    fn missing_headers_share_unknown_bucket() {
        assert_eq!(client_key(None, None), UNKNOWN_CLIENT_KEY);
        assert_eq!(client_key(Some(""), Some("  ")), UNKNOWN_CLIENT_KEY);
    }
}
