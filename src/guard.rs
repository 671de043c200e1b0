//! Total-step ceiling.
//!
//! A scan whose trajectory is larger than the configured limit is refused,
//! never truncated. The comparison is strict: a scan with exactly `limit`
//! steps is allowed.

use crate::error::{ScanError, ScanResult};

/// Default ceiling when no configuration overrides it.
pub const DEFAULT_STEPS_LIMIT: usize = 10_000;

/// `total > limit`.
pub fn exceeds(total: usize, limit: usize) -> bool {
    total > limit
}

/// Step-count ceiling consulted before a scan is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLimitGuard {
    limit: usize,
}

impl StepLimitGuard {
    /// Guard with the given ceiling.
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Configured ceiling.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether `total` is over the ceiling.
    pub fn exceeds(&self, total: usize) -> bool {
        exceeds(total, self.limit)
    }

    /// `Ok` when `total` may run, `StepLimitExceeded` otherwise.
    pub fn check(&self, total: usize) -> ScanResult<()> {
        if self.exceeds(total) {
            return Err(ScanError::StepLimitExceeded {
                total,
                limit: self.limit,
            });
        }
        Ok(())
    }
}

impl Default for StepLimitGuard {
    fn default() -> Self {
        Self::new(DEFAULT_STEPS_LIMIT)
    }
}
