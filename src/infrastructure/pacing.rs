//! Request pacing policy
//!
//! The target site rejects bursts of requests, so every fetch waits a warm-up
//! delay and listing traversal waits between product pages. Both delays live
//! here instead of being scattered through the fetch code.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::infrastructure::config::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingPolicy {
    /// Wait before the first attempt of every fetch
    pub warmup: Duration,
    /// Wait between successive product page fetches in a listing
    pub between_products: Duration,
}

impl PacingPolicy {
    pub fn new(warmup: Duration, between_products: Duration) -> Self {
        Self {
            warmup,
            between_products,
        }
    }

    /// No delays at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn from_millis(warmup_ms: u64, between_products_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(warmup_ms),
            Duration::from_millis(between_products_ms),
        )
    }

    pub async fn wait_before_fetch(&self) {
        if !self.warmup.is_zero() {
            debug!("Warm-up delay {:?} before fetch", self.warmup);
            tokio::time::sleep(self.warmup).await;
        }
    }

    pub async fn wait_between_products(&self) {
        if !self.between_products.is_zero() {
            debug!("Waiting {:?} before next product page", self.between_products);
            tokio::time::sleep(self.between_products).await;
        }
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::from_millis(defaults::WARMUP_DELAY_MS, defaults::BETWEEN_PRODUCTS_DELAY_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_default_delays() {
        let policy = PacingPolicy::default();
        assert_eq!(policy.warmup, Duration::from_secs(6));
        assert_eq!(policy.between_products, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_advance_clock() {
        let policy = PacingPolicy::from_millis(6_000, 10_000);
        let start = Instant::now();

        policy.wait_before_fetch().await;
        assert_eq!(start.elapsed(), Duration::from_secs(6));

        policy.wait_between_products().await;
        assert_eq!(start.elapsed(), Duration::from_secs(16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_none_does_not_wait() {
        let start = Instant::now();
        PacingPolicy::none().wait_before_fetch().await;
        PacingPolicy::none().wait_between_products().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
