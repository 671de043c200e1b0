//! Scan coordinate engine.
//!
//! Holds one [`AxisSequence`] per attached actuator and combines them into the
//! N-dimensional trajectory a scan will visit.
//!
//! # Trajectory
//!
//! Axes are visited in the order held by the [`OrderingPolicy`]: the first id
//! is the outermost loop, the last id varies fastest. Before combination each
//! axis goes through its own [`AxisTransforms`] pipeline. The combination is
//! the usual nested-loop Cartesian product:
//!
//! ```text
//! A = [0, 10, 20], B = [100, 200], order [A, B]
//! (0,100) (0,200) (10,100) (10,200) (20,100) (20,200)
//! ```
//!
//! With no axis attached the trajectory is a single empty combination and
//! `total_steps()` is 1.
//!
//! # Traversal
//!
//! [`TraversalMode::Snake`] reflects the inner part of the trajectory on every
//! odd outer index, so consecutive steps differ in one axis only:
//!
//! ```text
//! order [A, B], snake: (0,100) (0,200) (10,200) (10,100) (20,100) (20,200)
//! ```
//!
//! # Notifications
//!
//! Every mutation that changes what a query would return bumps a revision
//! counter published on a `tokio::sync::watch` channel, once, after the
//! mutation has completed. Rejected and no-op calls leave it alone.
//!
//! # Threading
//!
//! The engine is meant to be driven from a single control thread. A host that
//! shares it should wrap it in one `RwLock`: mutations take the write lock,
//! queries the read lock.
//!
//! # Example
//!
//! ```
//! use daq_scan::engine::ScanCoordinateEngine;
//! use daq_scan::provider::TabularSubScan;
//! use std::sync::Arc;
//!
//! let mut engine = ScanCoordinateEngine::new();
//! engine.attach_actuator("A", Arc::new(TabularSubScan::new(vec![0.0, 10.0, 20.0])))?;
//! engine.attach_actuator("B", Arc::new(TabularSubScan::new(vec![100.0, 200.0])))?;
//!
//! assert_eq!(engine.total_steps(), 6);
//! assert_eq!(engine.position_at(1)?, vec![0.0, 200.0]);
//! # Ok::<(), daq_scan::error::ScanError>(())
//! ```

use crate::axis::AxisSequence;
use crate::config::ScanSettings;
use crate::error::{ScanError, ScanResult};
use crate::guard::{self, StepLimitGuard};
use crate::ordering::{enumerate_permutations, OrderingPolicy};
use crate::provider::SubScanProvider;
use crate::rng::ScanRng;
use crate::transform::{AxisTransforms, ROUND_DECIMALS};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// How the combined trajectory is walked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMode {
    /// Lexicographic product, last axis fastest
    #[default]
    Normal,
    /// Boustrophedon over the whole trajectory
    Snake,
}

/// Coarse engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No axis attached
    Empty,
    /// At least one axis attached, ordering consistent
    Configured,
}

/// Summary of a configured scan, handed to executors and viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanInfo {
    /// Total number of steps
    pub n_steps: usize,
    /// Dimension label, e.g. "2D"
    pub scan_dim: String,
    /// Step count per axis, in order
    pub shape: Vec<usize>,
    /// Axis ids, in order
    pub selected_actuators: Vec<String>,
    /// Traversal used for `positions` and `axes_indexes`
    pub traversal: TraversalMode,
    /// One row per step, one coordinate per axis
    pub positions: Vec<Vec<f64>>,
    /// Same shape as `positions`, holding per-axis indices
    pub axes_indexes: Vec<Vec<usize>>,
    /// Transformed positions of each axis, in order
    pub axes_unique: Vec<Vec<f64>>,
}

/// One attached axis and what the engine needs to rebuild it.
struct AxisEntry {
    sequence: AxisSequence,
    provider: Arc<dyn SubScanProvider>,
    transforms: AxisTransforms,
    /// Permutation drawn when randomization was switched on
    shuffle: Option<Vec<usize>>,
}

impl AxisEntry {
    fn effective_positions(&self, decimals: u32) -> Vec<f64> {
        self.transforms
            .apply(self.sequence.positions(), self.shuffle.as_deref(), decimals)
    }
}

/// Multi-axis scan coordinate engine.
pub struct ScanCoordinateEngine {
    /// Insertion order is the natural order
    axes: Vec<AxisEntry>,
    ordering: OrderingPolicy,
    traversal: TraversalMode,
    round_decimals: u32,
    rng: Arc<ScanRng>,
    revision: watch::Sender<u64>,
}

impl std::fmt::Debug for ScanCoordinateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCoordinateEngine")
            .field("order", &self.ordering.order())
            .field("shape", &self.scan_shape())
            .field("traversal", &self.traversal)
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}

impl Default for ScanCoordinateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanCoordinateEngine {
    /// Empty engine with an OS-seeded random source.
    pub fn new() -> Self {
        Self::with_rng(Arc::new(ScanRng::default()))
    }

    /// Empty engine drawing permutations from `rng`.
    pub fn with_rng(rng: Arc<ScanRng>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            axes: Vec::new(),
            ordering: OrderingPolicy::new(),
            traversal: TraversalMode::Normal,
            round_decimals: ROUND_DECIMALS,
            rng,
            revision,
        }
    }

    /// Empty engine set up from the `[scan]` configuration section.
    pub fn from_settings(settings: &ScanSettings) -> Self {
        let mut engine = Self::with_rng(Arc::new(ScanRng::new(settings.seed)));
        engine.traversal = settings.traversal;
        engine.round_decimals = settings.round_decimals;
        engine
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Receiver that sees the revision counter change after each mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision counter.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Register an axis and fetch its positions from `provider`.
    ///
    /// Returns `Ok(false)` without re-fetching when `id` is already attached.
    /// On provider failure nothing is stored.
    pub fn attach_actuator(
        &mut self,
        id: &str,
        provider: Arc<dyn SubScanProvider>,
    ) -> ScanResult<bool> {
        if self.entry_index(id).is_some() {
            return Ok(false);
        }
        let positions = fetch(id, provider.as_ref())?;
        let sequence = AxisSequence::new(id, positions);
        debug!(axis = id, steps = sequence.step_count(), "attaching axis");

        self.axes.push(AxisEntry {
            sequence,
            provider,
            transforms: AxisTransforms::default(),
            shuffle: None,
        });
        self.ordering.attach(id);
        self.resync_ordering();
        self.notify();
        debug!(axis = id, total_steps = self.total_steps(), "axis attached");
        Ok(true)
    }

    /// Remove an axis. Returns false when it was not attached.
    pub fn detach_actuator(&mut self, id: &str) -> bool {
        let Some(index) = self.entry_index(id) else {
            return false;
        };
        self.axes.remove(index);
        self.ordering.detach(id);
        self.resync_ordering();
        self.notify();
        debug!(axis = id, total_steps = self.total_steps(), "axis detached");
        true
    }

    /// Re-fetch one axis from its provider and swap the sequence in whole.
    ///
    /// On provider failure the previous sequence stays in place.
    pub fn refresh_axis(&mut self, id: &str) -> ScanResult<()> {
        let index = self
            .entry_index(id)
            .ok_or_else(|| ScanError::UnknownAxis(id.to_string()))?;
        let positions = fetch(id, self.axes[index].provider.as_ref())?;

        let entry = &self.axes[index];
        if entry.sequence.positions() == positions.as_slice() && !entry.transforms.randomize {
            debug!(axis = id, "refresh left positions unchanged");
            return Ok(());
        }

        let sequence = AxisSequence::new(id, positions);
        let shuffle = entry
            .transforms
            .randomize
            .then(|| self.rng.permutation(sequence.step_count()));
        let entry = &mut self.axes[index];
        entry.sequence = sequence;
        entry.shuffle = shuffle;
        self.notify();
        debug!(
            axis = id,
            steps = self.axes[index].sequence.step_count(),
            total_steps = self.total_steps(),
            "axis refreshed"
        );
        Ok(())
    }

    /// Replace the axis ordering.
    ///
    /// `InvalidOrdering` unless `new_order` is a permutation of the attached
    /// ids; the previous ordering is kept in that case.
    pub fn set_order(&mut self, new_order: Vec<String>) -> ScanResult<()> {
        if new_order.as_slice() == self.ordering.order() {
            return Ok(());
        }
        if let Err(err) = self.ordering.set_order(new_order) {
            warn!(error = %err, "ordering rejected");
            return Err(err);
        }
        self.notify();
        debug!(order = ?self.ordering.order(), "ordering changed");
        Ok(())
    }

    /// Set the transform toggles of one axis.
    ///
    /// Switching randomization on draws a fresh permutation; switching it off
    /// drops it.
    pub fn set_transforms(&mut self, id: &str, transforms: AxisTransforms) -> ScanResult<()> {
        let index = self
            .entry_index(id)
            .ok_or_else(|| ScanError::UnknownAxis(id.to_string()))?;
        let entry = &self.axes[index];
        if entry.transforms == transforms {
            return Ok(());
        }

        let shuffle = match (entry.transforms.randomize, transforms.randomize) {
            (_, false) => None,
            (true, true) => entry.shuffle.clone(),
            (false, true) => Some(self.rng.permutation(entry.sequence.step_count())),
        };
        let entry = &mut self.axes[index];
        entry.transforms = transforms;
        entry.shuffle = shuffle;
        self.notify();
        debug!(
            axis = id,
            randomize = transforms.randomize,
            back_and_forth = transforms.back_and_forth,
            "axis transforms changed"
        );
        Ok(())
    }

    /// Draw a new random visiting order for a randomized axis.
    ///
    /// No-op when randomization is off for that axis.
    pub fn reshuffle(&mut self, id: &str) -> ScanResult<()> {
        let index = self
            .entry_index(id)
            .ok_or_else(|| ScanError::UnknownAxis(id.to_string()))?;
        if !self.axes[index].transforms.randomize {
            return Ok(());
        }
        let shuffle = self.rng.permutation(self.axes[index].sequence.step_count());
        self.axes[index].shuffle = Some(shuffle);
        self.notify();
        debug!(axis = id, "axis reshuffled");
        Ok(())
    }

    /// Switch between lexicographic and snake traversal.
    pub fn set_traversal(&mut self, mode: TraversalMode) {
        if self.traversal != mode {
            self.traversal = mode;
            self.notify();
            debug!(traversal = ?mode, "traversal changed");
        }
    }

    fn resync_ordering(&mut self) {
        let ids: Vec<String> = self.natural_order();
        if self.ordering.normalize(&ids) {
            warn!(order = ?ids, "ordering out of sync with axes, reset to natural order");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current axis order, outermost first.
    pub fn order(&self) -> &[String] {
        self.ordering.order()
    }

    /// Axis ids in attachment order.
    pub fn natural_order(&self) -> Vec<String> {
        self.axes
            .iter()
            .map(|e| e.sequence.id().to_string())
            .collect()
    }

    /// Current traversal mode.
    pub fn traversal(&self) -> TraversalMode {
        self.traversal
    }

    /// Number of attached axes.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// True when no axis is attached.
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// `Empty` or `Configured`.
    pub fn state(&self) -> EngineState {
        if self.axes.is_empty() {
            EngineState::Empty
        } else {
            EngineState::Configured
        }
    }

    /// Raw sequence of an attached axis.
    pub fn axis(&self, id: &str) -> Option<&AxisSequence> {
        self.entry_index(id).map(|i| &self.axes[i].sequence)
    }

    /// Transform toggles of an attached axis.
    pub fn transforms(&self, id: &str) -> Option<AxisTransforms> {
        self.entry_index(id).map(|i| self.axes[i].transforms)
    }

    /// Product of all step counts; 1 for no axes.
    ///
    /// Saturates at `usize::MAX` so an absurd scan still trips the step limit
    /// instead of wrapping.
    pub fn total_steps(&self) -> usize {
        self.axes
            .iter()
            .map(|e| e.sequence.step_count())
            .fold(1usize, usize::saturating_mul)
    }

    /// Whether the scan is over `limit` steps.
    pub fn check_step_limit(&self, limit: usize) -> bool {
        guard::exceeds(self.total_steps(), limit)
    }

    /// Dimension label such as "2D".
    pub fn scan_dim(&self) -> String {
        format!("{}D", self.axes.len())
    }

    /// Step count of each axis, in order.
    pub fn scan_shape(&self) -> Vec<usize> {
        self.ordered_entries()
            .iter()
            .map(|e| e.sequence.step_count())
            .collect()
    }

    /// Transformed positions of each axis, in order.
    pub fn axes_unique(&self) -> Vec<Vec<f64>> {
        self.ordered_entries()
            .iter()
            .map(|e| e.effective_positions(self.round_decimals))
            .collect()
    }

    /// Provider labels, in order.
    pub fn axis_labels(&self) -> Vec<String> {
        self.ordered_entries()
            .iter()
            .map(|e| e.provider.label(e.sequence.id()))
            .collect()
    }

    /// Every ordering the user may pick from.
    pub fn ordering_choices(&self) -> Vec<Vec<String>> {
        enumerate_permutations(&self.natural_order())
    }

    /// Full trajectory, one row per step.
    ///
    /// Recomputed on every call. Check the step limit before calling this on
    /// a scan of unknown size.
    pub fn positions(&self) -> Vec<Vec<f64>> {
        let axes = self.axes_unique();
        match self.traversal {
            TraversalMode::Normal => cartesian_product(&axes),
            TraversalMode::Snake => self
                .indexes()
                .into_iter()
                .map(|row| lookup(&axes, &row))
                .collect(),
        }
    }

    /// Same shape as `positions()`, holding indices into each axis.
    pub fn indexes(&self) -> Vec<Vec<usize>> {
        match self.traversal {
            TraversalMode::Normal => {
                let ranges: Vec<Vec<usize>> =
                    self.scan_shape().into_iter().map(|n| (0..n).collect()).collect();
                cartesian_product(&ranges)
            }
            TraversalMode::Snake => {
                let shape = self.scan_shape();
                (0..self.total_steps())
                    .map(|s| decompose(s, &shape, TraversalMode::Snake))
                    .collect()
            }
        }
    }

    /// Per-axis indices of step `scan_index`.
    pub fn indexes_at(&self, scan_index: usize) -> ScanResult<Vec<usize>> {
        let total = self.total_steps();
        if scan_index >= total {
            return Err(ScanError::IndexOutOfRange {
                index: scan_index,
                total,
            });
        }
        Ok(decompose(scan_index, &self.scan_shape(), self.traversal))
    }

    /// Coordinates of step `scan_index`, without building the whole grid.
    pub fn position_at(&self, scan_index: usize) -> ScanResult<Vec<f64>> {
        let indices = self.indexes_at(scan_index)?;
        Ok(lookup(&self.axes_unique(), &indices))
    }

    /// Coordinates of step `scan_index` paired with their axis ids.
    pub fn named_positions_at(&self, scan_index: usize) -> ScanResult<Vec<(String, f64)>> {
        let values = self.position_at(scan_index)?;
        Ok(self.order().iter().cloned().zip(values).collect())
    }

    /// First `max_rows` steps as `(step, coordinates)`.
    pub fn preview(&self, max_rows: usize) -> Vec<(usize, Vec<f64>)> {
        let axes = self.axes_unique();
        let shape = self.scan_shape();
        let rows = self.total_steps().min(max_rows);
        (0..rows)
            .map(|s| (s, lookup(&axes, &decompose(s, &shape, self.traversal))))
            .collect()
    }

    /// Materialised summary of the scan.
    pub fn scan_info(&self) -> ScanInfo {
        ScanInfo {
            n_steps: self.total_steps(),
            scan_dim: self.scan_dim(),
            shape: self.scan_shape(),
            selected_actuators: self.order().to_vec(),
            traversal: self.traversal,
            positions: self.positions(),
            axes_indexes: self.indexes(),
            axes_unique: self.axes_unique(),
        }
    }

    /// `StepLimitExceeded` when the scan is over `limit`.
    ///
    /// Every caller about to materialise or run the scan goes through here.
    pub fn ensure_within_limit(&self, limit: usize) -> ScanResult<()> {
        let total = self.total_steps();
        StepLimitGuard::new(limit).check(total).inspect_err(|_| {
            warn!(total_steps = total, limit, "scan refused: too many steps");
        })
    }

    /// Commit step: refuse scans over `limit`, otherwise return the summary.
    pub fn activate(&self, limit: usize) -> ScanResult<ScanInfo> {
        self.ensure_within_limit(limit)?;
        let total = self.total_steps();
        info!(
            total_steps = total,
            scan_dim = %self.scan_dim(),
            order = ?self.order(),
            "scan activated"
        );
        Ok(self.scan_info())
    }

    fn entry_index(&self, id: &str) -> Option<usize> {
        self.axes.iter().position(|e| e.sequence.id() == id)
    }

    /// Entries in the current order. Falls back to natural order if the
    /// ordering does not match the attached axes.
    fn ordered_entries(&self) -> Vec<&AxisEntry> {
        let resolved: Option<Vec<&AxisEntry>> = self
            .ordering
            .order()
            .iter()
            .map(|id| self.entry_index(id).map(|i| &self.axes[i]))
            .collect();
        match resolved {
            Some(entries) if entries.len() == self.axes.len() => entries,
            _ => self.axes.iter().collect(),
        }
    }
}

fn fetch(id: &str, provider: &dyn SubScanProvider) -> ScanResult<Vec<f64>> {
    provider.provide_positions(id).map_err(|err| {
        warn!(axis = id, error = %err, "sub-scan provider failed");
        ScanError::ProviderFailure {
            axis: id.to_string(),
            reason: format!("{err:#}"),
        }
    })
}

/// Nested-loop product, last axis fastest. No axes gives one empty row.
fn cartesian_product<T: Copy>(axes: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut rows: Vec<Vec<T>> = vec![Vec::new()];
    for axis in axes {
        rows = rows
            .into_iter()
            .flat_map(|prefix| {
                axis.iter().map(move |&value| {
                    let mut row = prefix.clone();
                    row.push(value);
                    row
                })
            })
            .collect();
    }
    rows
}

/// Split a flat step index into one index per axis.
///
/// The first axis is the most significant digit. In snake mode the remainder
/// is reflected whenever the digit just taken is odd, recursively.
fn decompose(scan_index: usize, shape: &[usize], mode: TraversalMode) -> Vec<usize> {
    match mode {
        TraversalMode::Normal => {
            let mut indices = vec![0; shape.len()];
            let mut rem = scan_index;
            for (slot, &radix) in indices.iter_mut().zip(shape).rev() {
                *slot = rem % radix;
                rem /= radix;
            }
            indices
        }
        TraversalMode::Snake => {
            let mut indices = Vec::with_capacity(shape.len());
            let mut rem = scan_index;
            for k in 0..shape.len() {
                let inner = shape[k + 1..].iter().fold(1usize, |acc, &n| acc.saturating_mul(n));
                let digit = rem / inner;
                rem %= inner;
                if digit % 2 == 1 {
                    rem = inner - 1 - rem;
                }
                indices.push(digit);
            }
            indices
        }
    }
}

fn lookup(axes: &[Vec<f64>], indices: &[usize]) -> Vec<f64> {
    axes.iter().zip(indices).map(|(axis, &i)| axis[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TabularSubScan;
    use tracing_test::traced_test;

    fn table(values: &[f64]) -> Arc<dyn SubScanProvider> {
        Arc::new(TabularSubScan::new(values.to_vec()))
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn seeded() -> ScanCoordinateEngine {
        ScanCoordinateEngine::with_rng(Arc::new(ScanRng::new(Some(42))))
    }

    fn two_axis_engine() -> ScanCoordinateEngine {
        let mut engine = seeded();
        engine.attach_actuator("A", table(&[0.0, 10.0, 20.0])).unwrap();
        engine.attach_actuator("B", table(&[100.0, 200.0])).unwrap();
        engine
    }

    #[test]
    fn test_decompose_normal_mixed_radix() {
        let shape = [3, 2, 4];
        assert_eq!(decompose(0, &shape, TraversalMode::Normal), vec![0, 0, 0]);
        assert_eq!(decompose(5, &shape, TraversalMode::Normal), vec![0, 1, 1]);
        assert_eq!(decompose(23, &shape, TraversalMode::Normal), vec![2, 1, 3]);
    }

    #[test]
    fn test_decompose_snake_is_gray_like() {
        let shape = [2, 2, 2];
        let walk: Vec<Vec<usize>> = (0..8)
            .map(|s| decompose(s, &shape, TraversalMode::Snake))
            .collect();
        assert_eq!(
            walk,
            vec![
                vec![0, 0, 0],
                vec![0, 0, 1],
                vec![0, 1, 1],
                vec![0, 1, 0],
                vec![1, 1, 0],
                vec![1, 1, 1],
                vec![1, 0, 1],
                vec![1, 0, 0],
            ]
        );
    }

    #[test]
    fn test_cartesian_product_edges() {
        let none: Vec<Vec<f64>> = Vec::new();
        assert_eq!(cartesian_product(&none), vec![Vec::<f64>::new()]);
        assert!(cartesian_product(&[vec![1.0], Vec::new()]).is_empty());
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut engine = two_axis_engine();
        let rev = engine.revision();
        assert!(!engine.attach_actuator("A", table(&[1.0])).unwrap());
        assert_eq!(engine.axis("A").unwrap().step_count(), 3);
        assert_eq!(engine.revision(), rev);
    }

    #[test]
    fn test_set_transforms_unknown_axis() {
        let mut engine = two_axis_engine();
        let err = engine
            .set_transforms("Z", AxisTransforms::back_and_forth())
            .unwrap_err();
        assert!(matches!(err, ScanError::UnknownAxis(ref id) if id == "Z"));
    }

    #[test]
    fn test_randomized_axis_is_stable_between_reads() {
        let mut engine = seeded();
        engine
            .attach_actuator("A", table(&(0..20).map(f64::from).collect::<Vec<_>>()))
            .unwrap();
        engine.set_transforms("A", AxisTransforms::randomized()).unwrap();

        let first = engine.positions();
        assert_eq!(first, engine.positions());
        let mut values: Vec<f64> = first.iter().map(|row| row[0]).collect();
        assert_ne!(values, (0..20).map(f64::from).collect::<Vec<_>>());
        values.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(values, (0..20).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_reshuffle_only_when_randomized() {
        let mut engine = two_axis_engine();
        let rev = engine.revision();
        engine.reshuffle("A").unwrap();
        assert_eq!(engine.revision(), rev);

        engine.set_transforms("A", AxisTransforms::randomized()).unwrap();
        engine.reshuffle("A").unwrap();
        assert_eq!(engine.revision(), rev + 2);
    }

    #[test]
    fn test_ordered_entries_falls_back_to_natural_order() {
        let mut engine = two_axis_engine();
        engine.ordering = OrderingPolicy::new();
        assert_eq!(engine.scan_shape(), vec![3, 2]);
        engine.resync_ordering();
        assert_eq!(engine.order(), ids(&["A", "B"]).as_slice());
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScanCoordinateEngine>();
    }

    #[traced_test]
    #[test]
    fn test_rejected_ordering_is_logged() {
        let mut engine = two_axis_engine();
        assert!(engine.set_order(ids(&["A", "A"])).is_err());
        assert!(logs_contain("ordering rejected"));
    }

    #[traced_test]
    #[test]
    fn test_limit_check_logs_refusal() {
        let engine = two_axis_engine();
        assert!(engine.ensure_within_limit(6).is_ok());
        assert!(!logs_contain("too many steps"));
        let err = engine.ensure_within_limit(5).unwrap_err();
        assert!(err.is_step_limit());
        assert!(logs_contain("too many steps"));
    }

    #[traced_test]
    #[test]
    fn test_refused_activation_is_logged() {
        let engine = two_axis_engine();
        assert!(engine.activate(5).is_err());
        assert!(logs_contain("too many steps"));
    }
}
