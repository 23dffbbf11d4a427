//! Backboard shape search
//!
//! Derivative-free minimization of the miss objective, run on its own thread
//! and feeding candidates to the render loop through a single-slot hand-off.

pub mod cancel;
pub mod driver;
pub mod error;
pub mod nelder_mead;
pub mod slot;

pub use cancel::CancelToken;
pub use driver::{ControlPointSlot, OptimizerDriver};
pub use error::{OptimizeError, OptimizeResult};
pub use nelder_mead::{MinimizeOptions, MinimizeResult, Termination, minimize};
pub use slot::CandidateSlot;
