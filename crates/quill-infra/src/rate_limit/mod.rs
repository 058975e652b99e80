//! Attempt limiting implementations.

mod memory;

pub use memory::{InMemoryRateLimiter, RateLimitConfig};
