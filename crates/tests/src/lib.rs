//! Shared fixtures for the HTTP integration tests.

use std::time::Duration;

use axum::Router;
use divider_api::{build_router, ApiState, WindowRateLimiter};
use divider_core::DividerSettings;

/// Router with default settings and a limiter allowing `max_requests` per minute.
pub fn test_app(max_requests: usize) -> Router {
    test_app_with(DividerSettings::default(), max_requests)
}

pub fn test_app_with(settings: DividerSettings, max_requests: usize) -> Router {
    let limiter = WindowRateLimiter::new(Duration::from_secs(60), max_requests);
    build_router(ApiState::new(settings, limiter))
}
