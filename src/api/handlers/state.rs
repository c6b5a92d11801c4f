//! Gate configuration and shared handler state.

use std::sync::Arc;

use crate::ratelimit::RateLimiter;

const DEFAULT_SESSION_COOKIE: &str = "session";
const DEFAULT_RESET_COOKIE: &str = "password_reset_session";

#[derive(Clone, Debug)]
pub struct GateConfig {
    frontend_base_url: String,
    session_cookie: String,
    reset_cookie: String,
}

impl GateConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            reset_cookie: DEFAULT_RESET_COOKIE.to_string(),
        }
    }

    #[must_use]
    pub fn with_session_cookie(mut self, name: String) -> Self {
        self.session_cookie = name;
        self
    }

    #[must_use]
    pub fn with_reset_cookie(mut self, name: String) -> Self {
        self.reset_cookie = name;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    #[must_use]
    pub fn reset_cookie(&self) -> &str {
        &self.reset_cookie
    }
}

pub struct GateState {
    config: GateConfig,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl GateState {
    pub fn new(config: GateConfig, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            config,
            rate_limiter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub(crate) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }
}
