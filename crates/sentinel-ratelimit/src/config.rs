//! Rate limit configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Budget for one endpoint class: `requests` per `window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLimit {
    /// Requests allowed inside an open window.
    pub requests: u32,
    /// Window length in milliseconds.
    pub window_ms: u64,
}

impl ClassLimit {
    /// Create a budget.
    #[must_use]
    pub fn new(requests: u32, window_ms: u64) -> Self {
        Self {
            requests,
            window_ms,
        }
    }

    /// Budget of N requests per minute.
    #[must_use]
    pub fn per_minute(requests: u32) -> Self {
        Self::new(requests, 60_000)
    }

    /// The window as a duration.
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.window_ms).unwrap_or(i64::MAX))
    }
}

impl Default for ClassLimit {
    fn default() -> Self {
        Self::per_minute(60)
    }
}

/// The endpoint-class budget table.
///
/// Serde defaults mean a bare section deserializes to the production
/// table; individual classes can be overridden piecemeal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimits {
    /// Fallback budget for classes not named in `classes`.
    pub default: ClassLimit,
    /// Named endpoint-class budgets.
    pub classes: HashMap<String, ClassLimit>,
}

impl Default for RateLimits {
    fn default() -> Self {
        // Interactive and shell surfaces get tighter budgets than the
        // default API surface.
        let classes = HashMap::from([
            ("chat".to_owned(), ClassLimit::per_minute(30)),
            ("agent".to_owned(), ClassLimit::per_minute(20)),
            ("shell".to_owned(), ClassLimit::per_minute(10)),
            ("file_generation".to_owned(), ClassLimit::per_minute(15)),
        ]);
        Self {
            default: ClassLimit::per_minute(60),
            classes,
        }
    }
}

impl RateLimits {
    /// Permissive budgets (for testing or trusted environments).
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            default: ClassLimit::new(1_000, 60_000),
            classes: HashMap::new(),
        }
    }

    /// Strict budgets.
    #[must_use]
    pub fn strict() -> Self {
        let classes = HashMap::from([
            ("chat".to_owned(), ClassLimit::per_minute(10)),
            ("agent".to_owned(), ClassLimit::per_minute(5)),
            ("shell".to_owned(), ClassLimit::per_minute(3)),
            ("file_generation".to_owned(), ClassLimit::per_minute(5)),
        ]);
        Self {
            default: ClassLimit::per_minute(20),
            classes,
        }
    }

    /// The budget for an endpoint class, falling back to `default` for
    /// unknown classes.
    #[must_use]
    pub fn limit_for(&self, endpoint_class: &str) -> ClassLimit {
        self.classes
            .get(endpoint_class)
            .copied()
            .unwrap_or(self.default)
    }
}
