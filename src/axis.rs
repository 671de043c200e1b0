//! Per-actuator 1D position sequence.

use std::sync::Arc;

/// One actuator's raw 1D positions, keyed by the actuator's stable id.
///
/// Immutable once built. Refreshing an axis builds a new `AxisSequence` and
/// swaps it in whole, so a reader never sees a half-updated sequence. The
/// positions live behind an `Arc` so clones handed to callers are cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSequence {
    id: String,
    positions: Arc<[f64]>,
}

impl AxisSequence {
    /// Create a sequence for `id` from the provider's positions.
    pub fn new(id: impl Into<String>, positions: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            positions: positions.into(),
        }
    }

    /// A zero-length sequence: the axis exists but has no sub-scan yet.
    pub fn unconfigured(id: impl Into<String>) -> Self {
        Self::new(id, Vec::new())
    }

    /// Stable identifier of the owning actuator.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw positions as supplied by the provider.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Number of points on this axis.
    pub fn step_count(&self) -> usize {
        self.positions.len()
    }

    /// True for the "unconfigured" state.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
