//! Sub-scan providers: where an axis gets its 1D positions from.
//!
//! The engine never builds positions itself. Each attached axis carries an
//! `Arc<dyn SubScanProvider>` that it asks for positions on attach and again on
//! every `refresh_axis`. Providers keep their configuration behind a lock so a
//! UI can edit a sub-scan in place and then ask the engine to refresh.
//!
//! Two providers cover the usual 1D sub-scans:
//!
//! - [`LinearSubScan`]: evenly spaced points, given by step or by point count
//! - [`TabularSubScan`]: an explicit list of positions

use anyhow::{anyhow, bail, Result};
use parking_lot::RwLock;

/// Upper bound on the number of points a single linear sub-scan may generate.
pub const MAX_AXIS_POINTS: usize = 10_000_000;

/// Steps smaller than this are treated as zero.
const STEP_EPSILON: f64 = 1e-12;

/// Source of one actuator's 1D positions.
///
/// The returned sequence need not be sorted or evenly spaced.
pub trait SubScanProvider: Send + Sync {
    /// Current positions for the axis `id`.
    fn provide_positions(&self, id: &str) -> Result<Vec<f64>>;

    /// Human-readable label for display.
    fn label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// How a linear sub-scan is parameterised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinearSpec {
    /// From `start` towards `stop` in increments of `step`
    Step {
        /// First position
        start: f64,
        /// Last position (included when a step lands on it)
        stop: f64,
        /// Signed increment
        step: f64,
    },
    /// `num_points` evenly spaced points, both ends included
    Points {
        /// First position
        start: f64,
        /// Last position
        stop: f64,
        /// Number of points
        num_points: usize,
    },
}

impl LinearSpec {
    /// Expand to positions.
    pub fn positions(&self) -> Result<Vec<f64>> {
        match *self {
            LinearSpec::Step { start, stop, step } => linspace_step(start, stop, step),
            LinearSpec::Points {
                start,
                stop,
                num_points,
            } => linspace_points(start, stop, num_points),
        }
    }
}

/// Evenly spaced sub-scan.
#[derive(Debug)]
pub struct LinearSubScan {
    spec: RwLock<LinearSpec>,
    units: Option<String>,
}

impl LinearSubScan {
    /// Step-based range: `start, start + step, ...` up to `stop`.
    pub fn from_step(start: f64, stop: f64, step: f64) -> Self {
        Self::with_spec(LinearSpec::Step { start, stop, step })
    }

    /// `num_points` evenly spaced points from `start` to `stop`.
    pub fn from_points(start: f64, stop: f64, num_points: usize) -> Self {
        Self::with_spec(LinearSpec::Points {
            start,
            stop,
            num_points,
        })
    }

    fn with_spec(spec: LinearSpec) -> Self {
        Self {
            spec: RwLock::new(spec),
            units: None,
        }
    }

    /// Attach a unit string shown in the label.
    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    /// Current parameters.
    pub fn spec(&self) -> LinearSpec {
        *self.spec.read()
    }

    /// Replace the parameters. Call `refresh_axis` afterwards.
    pub fn set_spec(&self, spec: LinearSpec) {
        *self.spec.write() = spec;
    }
}

impl SubScanProvider for LinearSubScan {
    fn provide_positions(&self, _id: &str) -> Result<Vec<f64>> {
        self.spec().positions()
    }

    fn label(&self, id: &str) -> String {
        match &self.units {
            Some(units) => format!("{id} ({units})"),
            None => id.to_string(),
        }
    }
}

/// Explicit list of positions.
#[derive(Debug)]
pub struct TabularSubScan {
    values: RwLock<Vec<f64>>,
}

impl TabularSubScan {
    /// Provider returning `values` as given.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    /// Replace the list. Call `refresh_axis` afterwards.
    pub fn set_values(&self, values: Vec<f64>) {
        *self.values.write() = values;
    }
}

impl SubScanProvider for TabularSubScan {
    fn provide_positions(&self, _id: &str) -> Result<Vec<f64>> {
        let values = self.values.read();
        if values.is_empty() {
            bail!("position table is empty");
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            bail!("position table contains non-finite value {bad}");
        }
        Ok(values.clone())
    }
}

fn check_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(anyhow!("{name} must be finite, got {value}"))
    }
}

/// Step-based linear range.
///
/// The number of points is `ceil((stop - start) / step)`, plus one when the
/// following point would land on `stop`.
fn linspace_step(start: f64, stop: f64, step: f64) -> Result<Vec<f64>> {
    check_finite("start", start)?;
    check_finite("stop", stop)?;
    check_finite("step", step)?;
    if step.abs() < STEP_EPSILON || start == stop || (stop - start).signum() != step.signum() {
        bail!("invalid linear range: start={start}, stop={stop}, step={step}");
    }

    let span = ((stop - start) / step).ceil();
    if span >= MAX_AXIS_POINTS as f64 {
        bail!("linear range would exceed {MAX_AXIS_POINTS} points");
    }
    let mut num_points = span as usize;
    if (start + num_points as f64 * step - stop).abs() < STEP_EPSILON {
        num_points += 1;
    }
    Ok((0..num_points).map(|i| start + i as f64 * step).collect())
}

/// Inclusive evenly spaced points.
fn linspace_points(start: f64, stop: f64, num_points: usize) -> Result<Vec<f64>> {
    check_finite("start", start)?;
    check_finite("stop", stop)?;
    match num_points {
        0 => bail!("linear sub-scan needs at least one point"),
        1 => Ok(vec![start]),
        n if n > MAX_AXIS_POINTS => bail!("linear range would exceed {MAX_AXIS_POINTS} points"),
        n => {
            let step = (stop - start) / (n - 1) as f64;
            Ok((0..n).map(|i| start + step * i as f64).collect())
        }
    }
}
