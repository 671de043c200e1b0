//! Custom error types for the scan engine.
//!
//! This module defines `ScanError`, the single error type returned by every
//! fallible operation of the crate. It is built with `thiserror` so callers get
//! readable messages and can still match on the variant to decide how to react.
//!
//! ## Error Hierarchy
//!
//! - **`InvalidOrdering`**: a proposed axis permutation does not match the set of
//!   attached axes. The previous ordering is kept.
//! - **`IndexOutOfRange`**: a step index outside `[0, total_steps)`.
//! - **`StepLimitExceeded`**: the activation path refused a scan whose total
//!   step count is above the configured ceiling.
//! - **`ProviderFailure`**: a sub-scan provider could not produce positions.
//!   The affected axis keeps its previous sequence (or stays absent).
//! - **`UnknownAxis`**: an operation named an axis that is not attached.
//! - **`Config`** / **`Configuration`**: loading or validating `ScanConfig`.
//!
//! None of these leave the engine in an invalid state; every variant is a local,
//! recoverable condition reported to the caller.

use thiserror::Error;

/// Convenience alias for results using the scan error type.
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Primary error type for the scan coordinate engine.
#[derive(Error, Debug)]
pub enum ScanError {
    /// `set_order` received something that is not a permutation of the
    /// attached axis ids (wrong length, duplicate, or foreign id).
    ///
    /// **Recovery Strategy**: the engine keeps its prior ordering; the caller
    /// should re-offer one of `ordering_choices()`.
    #[error("Invalid ordering {got:?}: expected a permutation of {expected:?}")]
    InvalidOrdering {
        /// Currently attached ids, in their current order
        expected: Vec<String>,
        /// The rejected proposal
        got: Vec<String>,
    },

    /// A step index outside `[0, total)` was requested.
    #[error("Scan index {index} out of range (total steps: {total})")]
    IndexOutOfRange {
        /// Requested step index
        index: usize,
        /// Total number of steps in the trajectory
        total: usize,
    },

    /// The projected scan has more steps than the configured ceiling.
    ///
    /// **Recovery Strategy**: reduce the number of points on one of the axes or
    /// raise `scan.steps_limit`. The scan is never truncated.
    #[error("Too many steps: scan has {total} steps, limit is {limit}")]
    StepLimitExceeded {
        /// Total steps of the refused scan
        total: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// The sub-scan provider could not supply positions for an axis.
    #[error("Sub-scan provider failed for axis '{axis}': {reason}")]
    ProviderFailure {
        /// Axis whose provider failed
        axis: String,
        /// Provider-reported reason
        reason: String,
    },

    /// The named axis is not attached to the engine.
    #[error("Unknown axis '{0}'")]
    UnknownAxis(String),

    /// Configuration file or environment parsing failed.
    ///
    /// **Source**: Wraps `figment::Error` (boxed, it is large).
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Configuration values parsed but failed semantic validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),
}

impl From<figment::Error> for ScanError {
    fn from(err: figment::Error) -> Self {
        ScanError::Config(Box::new(err))
    }
}

impl ScanError {
    /// Whether this error came from the step ceiling check.
    pub fn is_step_limit(&self) -> bool {
        matches!(self, ScanError::StepLimitExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_limit_message_reports_both_numbers() {
        let err = ScanError::StepLimitExceeded {
            total: 12_000,
            limit: 10_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("12000"));
        assert!(msg.contains("10000"));
        assert!(err.is_step_limit());
    }

    #[test]
    fn test_index_out_of_range_message() {
        let err = ScanError::IndexOutOfRange { index: 6, total: 6 };
        assert_eq!(
            err.to_string(),
            "Scan index 6 out of range (total steps: 6)"
        );
        assert!(!err.is_step_limit());
    }

    #[test]
    fn test_figment_error_converts() {
        let err: ScanError = figment::Error::from("bad value".to_string()).into();
        assert!(matches!(err, ScanError::Config(_)));
        assert!(err.to_string().contains("bad value"));
    }
}
