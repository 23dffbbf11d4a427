//! Shot sampling and the backboard objective
//!
//! A fixed grid of shot origins is crossed with every interior sample of the
//! backboard surface. The objective is the summed squared horizontal miss
//! distance of the rebounds from the rim center.

use glam::DVec3;

use super::backboard::Backboard;
use super::grid::Grid;
use super::shot::Sample;
use crate::consts::{SHOT_DEPTH, SHOT_HALF_WIDTH, SHOT_NEAR_Y, SHOTS_X, SHOTS_Y};

/// Fixed shot origins on the floor in front of the hoop, `SHOTS_X` × `SHOTS_Y`
pub fn shot_origins() -> Vec<DVec3> {
    let mut origins = Vec::with_capacity(SHOTS_X * SHOTS_Y);
    for kx in 0..SHOTS_X {
        let sx = kx as f64 / (SHOTS_X - 1) as f64;
        for ky in 0..SHOTS_Y {
            let sy = ky as f64 / (SHOTS_Y - 1) as f64;
            origins.push(DVec3::new(
                SHOT_HALF_WIDTH * (2.0 * sx - 1.0),
                SHOT_NEAR_Y + sy * SHOT_DEPTH,
                0.0,
            ));
        }
    }
    origins
}

/// Backboard sampling problem at a fixed surface resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Problem {
    pub backboard: Backboard,
    pub nu: usize,
    pub nv: usize,
}

impl Problem {
    pub fn new(backboard: Backboard, nu: usize, nv: usize) -> Self {
        // The outer ring is skipped, so at least one interior sample per axis.
        assert!(nu > 2 && nv > 2, "resolution {nu}x{nv} has no interior samples");
        Self { backboard, nu, nv }
    }

    /// Number of samples produced per [`Problem::compute_shots`] call
    pub fn sample_count(&self) -> usize {
        SHOTS_X * SHOTS_Y * (self.nu - 2) * (self.nv - 2)
    }

    /// Every shot origin against every interior backboard sample
    pub fn compute_shots(&self, control_points: &Grid<DVec3>) -> Vec<Sample> {
        let surface = self.backboard.interpolate(control_points, self.nu, self.nv);

        let mut samples = Vec::with_capacity(self.sample_count());
        for (origin_index, &shot_point) in shot_origins().iter().enumerate() {
            for ku in 1..self.nu - 1 {
                for kv in 1..self.nv - 1 {
                    samples.push(Sample::new(
                        origin_index,
                        (ku, kv),
                        shot_point,
                        surface.position[(ku, kv)],
                        surface.normal[(ku, kv)],
                    ));
                }
            }
        }
        samples
    }

    /// Sum of squared miss distances for a control grid
    pub fn objective_function(&self, control_points: &Grid<DVec3>) -> f64 {
        objective_from_samples(&self.compute_shots(control_points))
    }

    /// Objective for a design vector
    pub fn objective_for_design(&self, design: &[f64]) -> f64 {
        self.objective_function(&self.backboard.to_control_points(design))
    }
}

/// Sum of squared miss distances.
///
/// A rebound that starts below the rim is outside the objective's domain and
/// aborts rather than being penalized.
pub fn objective_from_samples(samples: &[Sample]) -> f64 {
    samples
        .iter()
        .map(|sample| {
            assert!(
                !sample.bounce.lower_than_hoop,
                "sample {:?} from origin {} bounced below the rim",
                sample.surface_index,
                sample.origin_index
            );
            let d = sample.bounce.xy_distance_from_hoop();
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BOUNCE_VZ, NU_OBJ, NV_OBJ, NX, NY, RIM_HEIGHT};
    use crate::sim::hoop::RIM_CENTER_Y;
    use crate::sim::shot::{Bounce, Shot};

    fn problem() -> Problem {
        Problem::new(Backboard::new(NX, NY), NU_OBJ, NV_OBJ)
    }

    #[test]
    fn test_shot_origins_cover_rectangle() {
        let origins = shot_origins();
        assert_eq!(origins.len(), 20);
        assert_eq!(origins[0], DVec3::new(-1.5, 3.0, 0.0));
        assert_eq!(origins[19], DVec3::new(1.5, 5.0, 0.0));
        assert!(origins.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_compute_shots_count_and_distances() {
        let p = problem();
        let samples = p.compute_shots(&p.backboard.initialize());

        // 20 origins x 12 x 6 interior samples
        assert_eq!(samples.len(), 20 * 12 * 6);
        assert_eq!(samples.len(), p.sample_count());
        for s in &samples {
            assert!(!s.bounce.lower_than_hoop);
            assert!(s.bounce.xy_distance_from_hoop() >= 0.0);
            assert!(s.surface_index.0 >= 1 && s.surface_index.0 <= NU_OBJ - 2);
            assert!(s.surface_index.1 >= 1 && s.surface_index.1 <= NV_OBJ - 2);
        }
    }

    #[test]
    fn test_objective_positive_for_initial_board() {
        let p = problem();
        let initial = p.backboard.initialize();
        let objective = p.objective_function(&initial);
        assert!(objective.is_finite());
        assert!(objective > 0.0);

        let design = p.backboard.from_control_points(&initial);
        assert_eq!(p.objective_for_design(&design), objective);
    }

    #[test]
    fn test_objective_zero_when_every_rebound_drops_into_hoop() {
        let bounce_point = DVec3::new(0.0, RIM_CENTER_Y, -4.0);
        let shot = Shot::new(DVec3::new(0.0, 4.0, 0.0), bounce_point);
        let bounce = Bounce::new(
            bounce_point,
            DVec3::new(0.0, 0.0, BOUNCE_VZ),
            DVec3::new(0.0, 1.0, 0.0),
        );
        let samples: Vec<Sample> = (0..5)
            .map(|k| Sample {
                shot,
                bounce,
                origin_index: k,
                surface_index: (1, 1),
            })
            .collect();

        assert_eq!(objective_from_samples(&samples), 0.0);
        assert_eq!(objective_from_samples(&[]), 0.0);
    }

    #[test]
    #[should_panic]
    fn test_objective_rejects_rebound_below_rim() {
        let shot = Shot::new(DVec3::new(0.0, 4.0, 0.0), DVec3::new(0.0, 0.2, -2.5));
        let bounce = Bounce::new(shot.bounce_point, shot.bounce_velocity(), DVec3::Y);
        assert!(bounce.lower_than_hoop);
        assert!(-bounce.bounce_point.z < RIM_HEIGHT);
        let _ = objective_from_samples(&[Sample {
            shot,
            bounce,
            origin_index: 0,
            surface_index: (1, 1),
        }]);
    }
}
