//! Closed-form ballistic arcs for the shot and the rebound off the backboard
//!
//! z points down, so gravity adds `+½ g t²` to z. Every shot reaches the
//! backboard with the same vertical velocity [`BOUNCE_VZ`], which picks a
//! single parabola out of the family through the two endpoints.

use glam::DVec3;

use super::hoop::{rim_center, rim_plane_z};
use crate::consts::{BOUNCE_VZ, G_ACCEL};

/// Floor plane, used as the landing plane when the bounce is below the rim
pub const FLOOR_Z: f64 = 0.0;

/// Tolerance for a landing point sitting on its reference plane
const PLANE_TOLERANCE: f64 = 1e-9;

/// Reflect velocity off a surface with given unit normal
#[inline]
pub fn reflect(vel: DVec3, normal: DVec3) -> DVec3 {
    vel - 2.0 * vel.dot(normal) * normal
}

#[inline]
fn ballistic(origin: DVec3, velocity: DVec3, t: f64) -> DVec3 {
    origin + velocity * t + DVec3::new(0.0, 0.0, 0.5 * G_ACCEL * t * t)
}

fn sample_arc(n: usize, duration: f64, at: impl Fn(f64) -> DVec3) -> Vec<DVec3> {
    (0..n)
        .map(|k| at(k as f64 * duration / (n - 1).max(1) as f64))
        .collect()
}

/// Flight from a shot origin to a point on the backboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub shot_point: DVec3,
    pub bounce_point: DVec3,
    /// Vertical velocity on arrival at the backboard
    pub vz_bounce: f64,
    /// Vertical velocity at release
    pub vz_shot: f64,
    pub vx: f64,
    pub vy: f64,
    /// Time from release to the backboard
    pub bounce_time: f64,
}

impl Shot {
    pub fn new(shot_point: DVec3, bounce_point: DVec3) -> Self {
        let pz_shot = shot_point.z;
        let pz_bounce = bounce_point.z;
        let vz_bounce = BOUNCE_VZ;
        assert!(
            pz_shot > pz_bounce,
            "shot origin z {pz_shot} must exceed bounce z {pz_bounce}"
        );

        // v² = v0² + 2a(p - p0), taking the root moving toward -z
        let vz_shot = -(vz_bounce * vz_bounce - 2.0 * G_ACCEL * (pz_bounce - pz_shot)).sqrt();
        // v = v0 + a t
        let bounce_time = (vz_bounce - vz_shot) / G_ACCEL;
        assert!(bounce_time > 0.0, "non-positive flight time {bounce_time}");

        let vx = (bounce_point.x - shot_point.x) / bounce_time;
        let vy = (bounce_point.y - shot_point.y) / bounce_time;

        Self {
            shot_point,
            bounce_point,
            vz_bounce,
            vz_shot,
            vx,
            vy,
            bounce_time,
        }
    }

    /// Velocity at release
    pub fn launch_velocity(&self) -> DVec3 {
        DVec3::new(self.vx, self.vy, self.vz_shot)
    }

    /// Velocity on arrival at the backboard
    pub fn bounce_velocity(&self) -> DVec3 {
        DVec3::new(self.vx, self.vy, self.vz_bounce)
    }

    pub fn position_at(&self, t: f64) -> DVec3 {
        ballistic(self.shot_point, self.launch_velocity(), t)
    }

    /// `n` evenly spaced points from release to the backboard
    pub fn arc(&self, n: usize) -> Vec<DVec3> {
        sample_arc(n, self.bounce_time, |t| self.position_at(t))
    }
}

/// Rebound from the backboard down to the rim plane (or the floor)
///
/// The miss is measured where the rebound crosses rim height. A bounce point
/// already below the rim has no such crossing, so it is solved against the
/// floor instead and flagged with `lower_than_hoop`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    pub bounce_point: DVec3,
    /// Velocity leaving the backboard
    pub velocity: DVec3,
    pub landing_point: DVec3,
    pub landing_time: f64,
    /// z of the plane the landing point was solved for
    pub landing_plane_z: f64,
    /// Bounce point is below the rim, so the landing was solved for the floor
    pub lower_than_hoop: bool,
}

impl Bounce {
    pub fn new(bounce_point: DVec3, incoming_velocity: DVec3, normal: DVec3) -> Self {
        let velocity = reflect(incoming_velocity, normal);

        let lower_than_hoop = bounce_point.z > rim_plane_z();
        let landing_plane_z = if lower_than_hoop { FLOOR_Z } else { rim_plane_z() };
        assert!(
            landing_plane_z > bounce_point.z,
            "landing plane z {landing_plane_z} is not below bounce z {}",
            bounce_point.z
        );

        // ½ g t² + vz t + (pz - plane) = 0; the constant term is negative,
        // so exactly one root is positive.
        let c = bounce_point.z - landing_plane_z;
        let vz = velocity.z;
        let landing_time = (-vz + (vz * vz - 2.0 * G_ACCEL * c).sqrt()) / G_ACCEL;
        let landing_point = ballistic(bounce_point, velocity, landing_time);

        Self {
            bounce_point,
            velocity,
            landing_point,
            landing_time,
            landing_plane_z,
            lower_than_hoop,
        }
    }

    pub fn position_at(&self, t: f64) -> DVec3 {
        ballistic(self.bounce_point, self.velocity, t)
    }

    /// `n` evenly spaced points from the backboard to the landing point
    pub fn arc(&self, n: usize) -> Vec<DVec3> {
        sample_arc(n, self.landing_time, |t| self.position_at(t))
    }

    /// Horizontal miss distance between the landing point and the rim center
    pub fn xy_distance_from_hoop(&self) -> f64 {
        let dz = self.landing_point.z - self.landing_plane_z;
        assert!(
            dz.abs() <= PLANE_TOLERANCE * (1.0 + self.landing_plane_z.abs()),
            "landing point is {dz} off its plane"
        );
        (self.landing_point.truncate() - rim_center().truncate()).length()
    }
}

/// One shot origin aimed at one backboard sample, and its rebound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub shot: Shot,
    pub bounce: Bounce,
    /// Index into the shot origin list
    pub origin_index: usize,
    /// `(ku, kv)` of the backboard sample
    pub surface_index: (usize, usize),
}

impl Sample {
    pub fn new(
        origin_index: usize,
        surface_index: (usize, usize),
        shot_point: DVec3,
        bounce_point: DVec3,
        normal: DVec3,
    ) -> Self {
        let shot = Shot::new(shot_point, bounce_point);
        let bounce = Bounce::new(bounce_point, shot.bounce_velocity(), normal);
        Self {
            shot,
            bounce,
            origin_index,
            surface_index,
        }
    }
}
