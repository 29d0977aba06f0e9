//! Per-client request rate limiting.

use std::time::Duration;

use governor::middleware::NoOpMiddleware;
use tower_governor::{
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::SmartIpKeyExtractor,
};

/// Rates at or above this turn the limiter off (load testing)
pub const RATE_LIMIT_DISABLED_AT: u32 = 100_000;

pub type RateLimitConfig = GovernorConfig<SmartIpKeyExtractor, NoOpMiddleware>;

/// Builds a per-IP quota: `burst_size` requests at once, refilled at
/// `requests_per_second`.
///
/// The governor builder takes the interval between replenished tokens, so the
/// rate is converted to a period here. Returns `None` for a zero rate or burst.
pub fn rate_limit_config(requests_per_second: u32, burst_size: u32) -> Option<RateLimitConfig> {
    if requests_per_second == 0 {
        return None;
    }
    GovernorConfigBuilder::default()
        .period(Duration::from_secs(1) / requests_per_second)
        .burst_size(burst_size)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
}
