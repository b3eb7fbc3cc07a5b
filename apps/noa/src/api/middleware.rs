//! # Middleware Module
//!
//! Rate limiting for the Nôa HTTP API.
//!
//! One global quota guards the whole router; interview traffic is light and
//! per-client fairness is the reverse proxy's problem. Configured via
//! `NOA_RATE_LIMIT` (requests per second, default 100, `0` disables).

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Default rate limit: 100 requests per second.
const DEFAULT_RPS: NonZeroU32 = NonZeroU32::new(100).unwrap();

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Global rate limiter type alias.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a new global rate limiter allowing `requests_per_second`.
///
/// A zero value falls back to [`DEFAULT_RPS`]; callers that want rate
/// limiting off skip installing the middleware instead.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(DEFAULT_RPS);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Read `NOA_RATE_LIMIT`, defaulting to 100. An unparseable value logs a
/// warning rather than silently disabling the limiter.
pub fn get_rate_limit_from_env() -> u32 {
    match std::env::var("NOA_RATE_LIMIT") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("NOA_RATE_LIMIT '{}' is not a number, using 100", raw);
            100
        }),
        Err(_) => 100,
    }
}

/// Rate limiting middleware: 429 once the global quota is exhausted.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!("Rate limit exceeded");
            Err((StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
