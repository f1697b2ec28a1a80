//! Prelude module - commonly used types for convenient import.
//!
//! Use `use sentinel_ratelimit::prelude::*;` to import all essential types.

pub use crate::{ClassLimit, RateLimitDecision, RateLimiter, RateLimits};
