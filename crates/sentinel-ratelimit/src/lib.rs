//! Sentinel Ratelimit - Per-user, per-endpoint-class request limiting.
//!
//! Bounds request volume with fixed-window counters keyed by
//! `(user, endpoint class)`. A window opens on a key's first request
//! and expires a configured duration later; requests beyond the class
//! budget inside an open window are denied until the window resets.
//!
//! Endpoint classes are named budgets (`default`, `chat`, `agent`,
//! `shell`, `file_generation`); unknown classes silently use the
//! `default` budget rather than erroring.
//!
//! # Example
//!
//! ```
//! use sentinel_core::UserId;
//! use sentinel_ratelimit::{RateLimiter, RateLimits};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let limiter = RateLimiter::new(RateLimits::default());
//! let alice = UserId::new("alice");
//!
//! let decision = limiter.consume(&alice, "chat").await;
//! assert!(decision.allowed);
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod config;
mod limiter;

pub use config::{ClassLimit, RateLimits};
pub use limiter::{RateLimitDecision, RateLimiter};
