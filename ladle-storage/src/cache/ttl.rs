//! Expiry policy for recipe data.

use std::time::Duration;

pub use ladle_core::{RECIPE_DETAIL_TTL, SEARCH_RESULTS_TTL};

/// Expiry applied to each kind of cached recipe data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub search: Duration,
    pub detail: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            search: SEARCH_RESULTS_TTL,
            detail: RECIPE_DETAIL_TTL,
        }
    }
}

impl From<&ladle_core::CacheSettings> for TtlPolicy {
    fn from(settings: &ladle_core::CacheSettings) -> Self {
        Self {
            search: settings.search_ttl(),
            detail: settings.detail_ttl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.search, Duration::from_secs(3600));
        assert_eq!(policy.detail, Duration::from_secs(86_400));
        assert_eq!(
            TtlPolicy::from(&ladle_core::CacheSettings::default()),
            policy
        );
    }
}
