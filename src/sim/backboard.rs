//! Backboard control grid and its design-vector encoding
//!
//! Only the depth (y) of each control point is free. x and z come from the
//! procedural starting shape and never change.

use glam::DVec3;

use super::bspline::{self, Surface};
use super::grid::Grid;
use crate::consts::{BACKBOARD_BOTTOM, BACKBOARD_HEIGHT, BACKBOARD_WIDTH};

/// Backboard described by an `nx` × `ny` control grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backboard {
    pub nx: usize,
    pub ny: usize,
}

impl Backboard {
    pub fn new(nx: usize, ny: usize) -> Self {
        assert!(
            nx >= bspline::MIN_CONTROL_POINTS && ny >= bspline::MIN_CONTROL_POINTS,
            "backboard grid {nx}x{ny} is too small for a cubic surface"
        );
        Self { nx, ny }
    }

    /// Number of design variables
    pub fn dimension(&self) -> usize {
        self.nx * self.ny
    }

    /// Deterministic starting shape: a shallow bowl with a low-frequency ripple
    pub fn initialize(&self) -> Grid<DVec3> {
        let (nx, ny) = (self.nx, self.ny);
        Grid::from_fn(nx, ny, |kx, ky| {
            let su = kx as f64 / (nx - 1) as f64;
            let sv = ky as f64 / (ny - 1) as f64;

            let su_ = 2.0 * su - 1.0;
            let sv_ = 2.0 * sv - 1.0;

            let x = 0.5 * BACKBOARD_WIDTH * su_;
            let z = -BACKBOARD_BOTTOM - (1.0 - sv) * BACKBOARD_HEIGHT;
            let y = 0.3 * su_ * su_
                + 0.01 * sv_ * sv_
                + 0.5 * (3.0 * su_).sin() * (5.0 * sv_).cos();

            DVec3::new(x, y, z)
        })
    }

    /// Rebuild the control grid from a design vector in grid order.
    ///
    /// Regenerates the whole starting shape before overwriting depth, which
    /// is wasted work but keeps x and z tied to one definition.
    pub fn to_control_points(&self, design: &[f64]) -> Grid<DVec3> {
        assert_eq!(
            design.len(),
            self.dimension(),
            "design vector length does not match {}x{} backboard",
            self.nx,
            self.ny
        );
        let mut control_points = self.initialize();
        for (k, &y) in design.iter().enumerate() {
            control_points[(k / self.ny, k % self.ny)].y = y;
        }
        control_points
    }

    /// Extract the depth of every control point in grid order
    pub fn from_control_points(&self, control_points: &Grid<DVec3>) -> Vec<f64> {
        assert_eq!((control_points.nx(), control_points.ny()), (self.nx, self.ny));
        control_points.iter().map(|p| p.y).collect()
    }

    /// Sample the backboard surface at `nu` × `nv`
    pub fn interpolate(&self, control_points: &Grid<DVec3>, nu: usize, nv: usize) -> Surface {
        bspline::interpolate(control_points, nu, nv)
    }
}
