//! Throttling for outbound embedding calls.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;

/// Gate awaited before every embedding request.
#[async_trait]
pub trait RequestThrottle: Send + Sync {
    /// Completes once a request may be sent.
    async fn acquire(&self);
}

/// Token bucket allowing `n` calls per minute with a burst of one.
pub struct GovernorThrottle {
    limiter: DefaultDirectRateLimiter,
}

impl GovernorThrottle {
    pub fn per_minute(calls: NonZeroU32) -> Self {
        let quota = Quota::per_minute(calls).allow_burst(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }
}

#[async_trait]
impl RequestThrottle for GovernorThrottle {
    async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

/// No pacing at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unthrottled;

#[async_trait]
impl RequestThrottle for Unthrottled {
    async fn acquire(&self) {}
}
