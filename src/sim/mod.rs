//! Deterministic geometry and physics
//!
//! Everything the optimizer scores lives here. This module must stay pure:
//! - No rendering or platform dependencies
//! - No shared state; every call builds fresh values from its inputs
//! - Invariant violations are programmer errors and panic

pub mod backboard;
pub mod bspline;
pub mod grid;
pub mod hoop;
pub mod problem;
pub mod shot;

pub use backboard::Backboard;
pub use bspline::{Surface, SurfacePoint, evaluate, interpolate, pad_control_points};
pub use grid::Grid;
pub use hoop::{rim_center, rim_loop};
pub use problem::{Problem, objective_from_samples, shot_origins};
pub use shot::{Bounce, Sample, Shot, reflect};
