//! # DAQ Scan Library
//!
//! This crate builds multi-axis scans out of independent single-actuator
//! sub-scans. Each attached actuator contributes a 1D sequence of positions;
//! the engine combines them into the full N-dimensional trajectory, applies
//! the user's axis ordering and per-axis transforms, and refuses scans that
//! exceed the configured step ceiling. Hardware, rendering and persistence
//! live elsewhere and call into this crate.
//!
//! ## Crate Structure
//!
//! - **`axis`**: `AxisSequence`, one actuator's immutable position array.
//! - **`transform`**: randomize, back-and-forth and rounding of a single axis,
//!   and the `AxisTransforms` pipeline that applies them in a fixed order.
//! - **`ordering`**: `OrderingPolicy`, the validated axis permutation, and
//!   `enumerate_permutations` for populating a selection list.
//! - **`provider`**: the `SubScanProvider` trait plus linear and tabular
//!   sub-scans.
//! - **`engine`**: `ScanCoordinateEngine`, which owns the axes and computes
//!   trajectories, indices, per-step lookups and scan summaries.
//! - **`guard`**: `StepLimitGuard`, the total-step ceiling.
//! - **`rng`**: `ScanRng`, the seedable random source.
//! - **`config`**: `ScanConfig`, loaded from TOML and environment via figment.
//! - **`tracing_setup`**: tracing-subscriber initialisation.
//! - **`error`**: `ScanError` for centralized error handling.

pub mod axis;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod ordering;
pub mod provider;
pub mod rng;
pub mod tracing_setup;
pub mod transform;

pub use axis::AxisSequence;
pub use config::ScanConfig;
pub use engine::{EngineState, ScanCoordinateEngine, ScanInfo, TraversalMode};
pub use error::{ScanError, ScanResult};
pub use guard::StepLimitGuard;
pub use ordering::{enumerate_permutations, OrderingPolicy, Permutations};
pub use provider::{LinearSubScan, SubScanProvider, TabularSubScan};
pub use rng::ScanRng;
pub use transform::AxisTransforms;
