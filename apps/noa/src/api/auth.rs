//! # Authentication Module
//!
//! Bearer API-key authentication for the Nôa HTTP API.
//!
//! Configured via `NOA_API_KEY`: when set, every endpoint except `/health`
//! requires `Authorization: Bearer <key>` (a raw `<key>` header is also
//! accepted). When unset, the API is open and a warning is logged at
//! router construction.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

// =============================================================================
// API KEY AUTHENTICATION
// =============================================================================

/// Get API key from environment variable.
///
/// Returns `Some(key)` if `NOA_API_KEY` is set and non-empty,
/// `None` otherwise (disabling authentication).
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("NOA_API_KEY").ok().filter(|k| !k.is_empty())
}

/// Constant-time key comparison.
///
/// Both keys are padded to a common length before `ct_eq` so the comparison
/// always covers the same number of bytes; the final length check cannot be
/// skipped early either. This keeps invalid-key responses timing-uniform.
fn key_matches(provided: &str, expected: &str) -> bool {
    let provided_bytes = provided.as_bytes();
    let expected_bytes = expected.as_bytes();

    let max_len = provided_bytes.len().max(expected_bytes.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided_bytes.len()].copy_from_slice(provided_bytes);
    padded_expected[..expected_bytes.len()].copy_from_slice(expected_bytes);

    let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_match && provided_bytes.len() == expected_bytes.len()
}

/// API key authentication middleware.
///
/// `/health` is always allowed so load balancers can probe the server
/// without credentials.
pub async fn api_key_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    // If no API key configured, allow all requests
    let Some(expected) = get_api_key_from_env() else {
        return Ok(next.run(request).await);
    };

    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));

    match provided {
        Some(key) if key_matches(key, &expected) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(
                event = "auth_failure",
                reason = "invalid_api_key",
                "Authentication failed: invalid API key"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                "Missing Authorization header"
            );
            Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_env_key_disables_auth() {
        // SAFETY: This is a unit test running in isolation.
        unsafe { std::env::remove_var("NOA_API_KEY") };
        assert!(get_api_key_from_env().is_none());
    }

    #[test]
    fn matching_keys_pass() {
        assert!(key_matches("segredo-123", "segredo-123"));
    }

    #[test]
    fn wrong_or_truncated_keys_fail() {
        assert!(!key_matches("segredo-124", "segredo-123"));
        assert!(!key_matches("segredo", "segredo-123"));
        assert!(!key_matches("segredo-123-extra", "segredo-123"));
        assert!(!key_matches("", "segredo-123"));
    }
}
