//! Rim geometry

use glam::DVec3;
use std::f64::consts::TAU;

use crate::consts::{RIM_BACKBOARD_OFFSET, RIM_DIAMETER, RIM_HEIGHT};

/// Distance of the rim center from the wall
pub const RIM_CENTER_Y: f64 = RIM_BACKBOARD_OFFSET + RIM_DIAMETER;

/// Center of the rim
#[inline]
pub fn rim_center() -> DVec3 {
    DVec3::new(0.0, RIM_CENTER_Y, -RIM_HEIGHT)
}

/// z of the plane the rim sits in
#[inline]
pub fn rim_plane_z() -> f64 {
    -RIM_HEIGHT
}

/// Closed loop of `num_points` points around the rim
pub fn rim_loop(num_points: usize) -> Vec<DVec3> {
    let radius = RIM_DIAMETER / 2.0;
    (0..num_points)
        .map(|k| {
            let theta = TAU * k as f64 / (num_points - 1).max(1) as f64;
            DVec3::new(
                radius * theta.sin(),
                RIM_CENTER_Y + radius * theta.cos(),
                -RIM_HEIGHT,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rim_loop_is_closed_circle() {
        let pts = rim_loop(24);
        assert_eq!(pts.len(), 24);
        assert!((pts[0] - pts[23]).length() < 1e-12);
        for p in &pts {
            let r = (*p - rim_center()).length();
            assert!((r - RIM_DIAMETER / 2.0).abs() < 1e-12);
        }
    }
}
