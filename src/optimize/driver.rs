//! Optimizer thread: searches backboard shapes and publishes every candidate
//!
//! Each evaluation sleeps for the throttle, rebuilds the control grid from the
//! design vector, drops it into the shared slot for the render loop and then
//! scores it. Optimizer errors are logged and end the run; they never reach
//! the render thread.

use glam::DVec3;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::cancel::CancelToken;
use super::nelder_mead::{MinimizeOptions, MinimizeResult, minimize};
use super::slot::CandidateSlot;
use crate::settings::Settings;
use crate::sim::{Backboard, Grid, Problem};

/// Shared slot carrying candidate control grids to the render loop
pub type ControlPointSlot = CandidateSlot<Grid<DVec3>>;

#[derive(Debug, Clone)]
pub struct OptimizerDriver {
    pub problem: Problem,
    pub options: MinimizeOptions,
    /// Pause before every evaluation
    pub throttle: Duration,
}

impl OptimizerDriver {
    pub fn new(problem: Problem, options: MinimizeOptions, throttle: Duration) -> Self {
        Self {
            problem,
            options,
            throttle,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let backboard = Backboard::new(settings.nx, settings.ny);
        Self::new(
            Problem::new(backboard, settings.nu_obj, settings.nv_obj),
            settings.optimizer.minimize_options(),
            Duration::from_millis(settings.optimizer.throttle_ms),
        )
    }

    /// Run the whole optimization on the calling thread.
    ///
    /// Returns `None` if the optimizer failed; the failure is logged.
    pub fn run(&self, slot: &ControlPointSlot, cancel: &CancelToken) -> Option<MinimizeResult> {
        let backboard = self.problem.backboard;
        let x0 = backboard.from_control_points(&backboard.initialize());

        let objective = |x: &[f64]| {
            if !self.throttle.is_zero() {
                thread::sleep(self.throttle);
            }

            let control_points = backboard.to_control_points(x);
            // The render loop sees the candidate before it is scored.
            if slot.publish(control_points.clone()) {
                log::trace!("replaced an undrawn candidate");
            }

            let value = self.problem.objective_function(&control_points);
            log::debug!("objective {value:.9}");
            value
        };

        log::info!(
            "starting optimization over {} design variables ({} samples per evaluation)",
            x0.len(),
            self.problem.sample_count()
        );
        match minimize(objective, &x0, &self.options, cancel) {
            Ok(result) => {
                log::info!(
                    "found minimum {:.12} after {} evaluations, {} iterations ({:?})",
                    result.fun,
                    result.nfev,
                    result.iterations,
                    result.termination
                );
                log::info!(
                    "published {} candidates, {} never drawn",
                    slot.published(),
                    slot.dropped()
                );
                Some(result)
            }
            Err(e) => {
                log::error!("optimizer failed: {e}");
                None
            }
        }
    }

    /// Run on a dedicated thread named `optimizer`.
    pub fn spawn(
        self,
        slot: Arc<ControlPointSlot>,
        cancel: CancelToken,
    ) -> std::io::Result<JoinHandle<Option<MinimizeResult>>> {
        thread::Builder::new()
            .name("optimizer".to_string())
            .spawn(move || self.run(&slot, &cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{NU_OBJ, NV_OBJ, NX, NY};
    use crate::optimize::Termination;

    fn driver(max_evaluations: usize) -> OptimizerDriver {
        OptimizerDriver::new(
            Problem::new(Backboard::new(NX, NY), NU_OBJ, NV_OBJ),
            MinimizeOptions {
                max_evaluations: Some(max_evaluations),
                ..MinimizeOptions::default()
            },
            Duration::ZERO,
        )
    }

    #[test]
    fn test_run_publishes_every_candidate() {
        let driver = driver(40);
        let slot = ControlPointSlot::new();
        let result = driver.run(&slot, &CancelToken::new()).unwrap();

        assert_eq!(result.termination, Termination::MaxEvaluations);
        assert_eq!(slot.published(), result.nfev as u64);
        assert_eq!(slot.dropped(), result.nfev as u64 - 1);

        let latest = slot.take_latest().unwrap();
        assert_eq!((latest.nx(), latest.ny()), (NX, NY));
        assert!(slot.take_latest().is_none());

        let initial = driver.problem.objective_function(&driver.problem.backboard.initialize());
        assert!(result.fun <= initial);
        assert!(result.x.iter().all(|&v| (-10.0..=2.0).contains(&v)));
    }

    #[test]
    fn test_spawned_run_honours_cancel() {
        let slot = Arc::new(ControlPointSlot::new());
        let cancel = CancelToken::new();
        cancel.cancel();

        let handle = driver(1000).spawn(Arc::clone(&slot), cancel).unwrap();
        let result = handle.join().unwrap().unwrap();
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.nfev, 0);
        assert!(slot.take_latest().is_none());
    }

    #[test]
    fn test_optimizer_failure_is_contained() {
        let mut driver = driver(10);
        driver.options.initial_step = 0.0;
        let slot = ControlPointSlot::new();
        assert!(driver.run(&slot, &CancelToken::new()).is_none());
        assert_eq!(slot.published(), 0);
    }
}
