//! Per-axis post-processing of 1D position sequences.
//!
//! Three pure operations, each usable on its own:
//!
//! - [`randomize`]: visit the same positions in a uniformly random order.
//! - [`back_and_forth`]: even-indexed points in order, then odd-indexed points
//!   reversed, so the scan ends near where it started.
//! - [`round_to`]: fixed-precision rounding to remove float jitter.
//!
//! [`AxisTransforms`] holds the per-axis toggles and applies them in the
//! pipeline order: randomize, then back-and-forth, then rounding (always).
//! Back-and-forth has to see the already-randomized visiting order.
//!
//! # Example
//!
//! ```
//! use daq_scan::transform::back_and_forth;
//!
//! let snake = back_and_forth(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
//! assert_eq!(snake, vec![0.0, 2.0, 4.0, 5.0, 3.0, 1.0]);
//! ```

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Number of fractional digits kept by the final rounding pass.
pub const ROUND_DECIMALS: u32 = 8;

/// Uniformly random permutation of the indices `0..len`.
pub fn random_permutation<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}

/// Reorder `positions` so that output `i` is `positions[order[i]]`.
///
/// `order` must be a permutation of `0..positions.len()`.
pub fn apply_permutation(positions: &[f64], order: &[usize]) -> Vec<f64> {
    debug_assert_eq!(positions.len(), order.len());
    order.iter().map(|&i| positions[i]).collect()
}

/// Random reordering of `positions` drawn from `rng`.
///
/// The output is a bijection of the input: same length, same values.
pub fn randomize<R: Rng + ?Sized>(positions: &[f64], rng: &mut R) -> Vec<f64> {
    let order = random_permutation(positions.len(), rng);
    apply_permutation(positions, &order)
}

/// `positions[0::2]` followed by `reverse(positions[1::2])`.
///
/// Inputs of length 0 or 1 come back unchanged.
pub fn back_and_forth(positions: &[f64]) -> Vec<f64> {
    let forward = positions.iter().step_by(2);
    let backward = positions.iter().skip(1).step_by(2).rev();
    forward.chain(backward).copied().collect()
}

/// Round every value to `decimals` fractional digits (ties to even).
///
/// Values whose scaled form is not finite are passed through untouched.
pub fn round_to(positions: &[f64], decimals: u32) -> Vec<f64> {
    let factor = 10f64.powi(decimals as i32);
    positions
        .iter()
        .map(|&x| {
            let scaled = x * factor;
            if scaled.is_finite() {
                scaled.round_ties_even() / factor
            } else {
                x
            }
        })
        .collect()
}

/// Per-axis transform toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisTransforms {
    /// Visit positions in a random order
    #[serde(default)]
    pub randomize: bool,
    /// Even points forward, odd points backward
    #[serde(default)]
    pub back_and_forth: bool,
}

impl AxisTransforms {
    /// Only the back-and-forth toggle set.
    pub fn back_and_forth() -> Self {
        Self {
            back_and_forth: true,
            ..Default::default()
        }
    }

    /// Only the randomize toggle set.
    pub fn randomized() -> Self {
        Self {
            randomize: true,
            ..Default::default()
        }
    }

    /// Run the pipeline on one axis.
    ///
    /// `shuffle` is the permutation drawn when randomization was enabled; it
    /// is ignored unless `self.randomize` is set and its length matches.
    pub fn apply(&self, positions: &[f64], shuffle: Option<&[usize]>, decimals: u32) -> Vec<f64> {
        let mut values = match shuffle {
            Some(order) if self.randomize && order.len() == positions.len() => {
                apply_permutation(positions, order)
            }
            _ => positions.to_vec(),
        };
        if self.back_and_forth {
            values = back_and_forth(&values);
        }
        round_to(&values, decimals)
    }
}
