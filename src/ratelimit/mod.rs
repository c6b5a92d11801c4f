//! Request rate limiting: one refilling token bucket per client IP, shared
//! by the read and write cost tiers.

mod bucket;

pub use bucket::RefillingTokenBucket;

use std::net::IpAddr;
use std::time::Duration;

/// Default bucket size per client IP.
pub const DEFAULT_MAX_TOKENS: u32 = 100;
/// Default refill interval: one token per second.
pub const DEFAULT_REFILL_INTERVAL: Duration = Duration::from_secs(1);

/// Cost tier for a checked request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitAction {
    /// GET/HEAD-class requests.
    Read,
    /// POST-class requests (and anything else that mutates).
    Write,
}

impl RateLimitAction {
    /// Tokens a request of this tier takes from the shared bucket.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Read => 1,
            Self::Write => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

/// What to do with a request whose client IP cannot be resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnresolvedClientPolicy {
    /// Admit the request (fail open). Matches the platform's historical
    /// behavior behind trusted proxies.
    #[default]
    Allow,
    /// Refuse the request (fail closed).
    Deny,
}

pub trait RateLimiter: Send + Sync {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision;
}

/// Test double that admits everything.
#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_ip(&self, _ip: Option<&str>, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

/// Per-IP limiter over a single shared bucket.
///
/// Both tiers drain the same bucket, so writes deplete a client's budget
/// three times as fast as reads. A missing or unparseable IP never touches
/// a bucket; it resolves through the configured policy.
#[derive(Debug)]
pub struct RequestRateLimiter {
    bucket: RefillingTokenBucket<IpAddr>,
    policy: UnresolvedClientPolicy,
}

impl RequestRateLimiter {
    #[must_use]
    pub fn new(max: u32, refill_interval: Duration, policy: UnresolvedClientPolicy) -> Self {
        Self {
            bucket: RefillingTokenBucket::new(max, refill_interval),
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> UnresolvedClientPolicy {
        self.policy
    }
}

impl Default for RequestRateLimiter {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_TOKENS,
            DEFAULT_REFILL_INTERVAL,
            UnresolvedClientPolicy::Allow,
        )
    }
}

impl RateLimiter for RequestRateLimiter {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision {
        let Some(addr) = ip.and_then(|value| value.trim().parse::<IpAddr>().ok()) else {
            return match self.policy {
                UnresolvedClientPolicy::Allow => RateLimitDecision::Allowed,
                UnresolvedClientPolicy::Deny => RateLimitDecision::Limited,
            };
        };
        if self.bucket.consume(addr, action.cost()) {
            RateLimitDecision::Allowed
        } else {
            RateLimitDecision::Limited
        }
    }
}
