//! Orbit camera around a focus point
//!
//! The world is z-down, so the camera's up vector is -z and a positive
//! elevation looks at the scene from above.

use glam::{Mat4, Vec3};

const MIN_ELEVATION_DEG: f32 = -89.0;
const MAX_ELEVATION_DEG: f32 = 89.0;
const MIN_DISTANCE: f32 = 1e-3;
const MAX_DISTANCE: f32 = 1e3;
const SCROLL_FACTOR: f32 = 1.15;
/// Focus movement per unit of pointer motion, per meter of distance
const PAN_SCALE: f32 = 3e-3;

const FOV_Y_DEG: f32 = 45.0;
const NEAR_CLIP: f32 = 1e-3;
const FAR_CLIP: f32 = 1e4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub focus: Vec3,
    pub azimuth_deg: f32,
    pub elevation_deg: f32,
    pub distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            focus: Vec3::new(0.0, 0.0, -2.0),
            azimuth_deg: 60.0,
            elevation_deg: 30.0,
            distance: 10.0,
        }
    }
}

impl Camera {
    pub fn center(&self) -> Vec3 {
        self.focus
    }

    pub fn eye(&self) -> Vec3 {
        let elevation = self.elevation_deg.to_radians();
        let azimuth = self.azimuth_deg.to_radians();
        let horizontal = self.distance * elevation.cos();
        self.focus
            + Vec3::new(
                horizontal * azimuth.cos(),
                horizontal * azimuth.sin(),
                -self.distance * elevation.sin(),
            )
    }

    /// Orbit by pointer deltas in degrees; azimuth wraps, elevation clamps
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.azimuth_deg += delta_x;
        if self.azimuth_deg > 180.0 {
            self.azimuth_deg -= 360.0;
        }
        if self.azimuth_deg < -180.0 {
            self.azimuth_deg += 360.0;
        }
        self.elevation_deg =
            (self.elevation_deg - delta_y).clamp(MIN_ELEVATION_DEG, MAX_ELEVATION_DEG);
    }

    /// Slide the focus across the horizontal plane relative to the view direction
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let (sin_azi, cos_azi) = self.azimuth_deg.to_radians().sin_cos();
        let scale = self.distance * PAN_SCALE;
        self.focus.y += scale * (delta_x * cos_azi - delta_y * sin_azi);
        self.focus.x -= scale * (delta_x * sin_azi + delta_y * cos_azi);
    }

    /// Move the focus up or down
    pub fn lift(&mut self, delta: f32) {
        self.focus.z -= self.distance * PAN_SCALE * delta;
    }

    /// Zoom one notch; positive moves away
    pub fn scroll(&mut self, amount: f32) {
        if amount > 0.0 {
            self.distance = (self.distance * SCROLL_FACTOR).min(MAX_DISTANCE);
        } else if amount < 0.0 {
            self.distance = (self.distance / SCROLL_FACTOR).max(MIN_DISTANCE);
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.center(), Vec3::NEG_Z)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect, NEAR_CLIP, FAR_CLIP)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_distance_and_height() {
        let camera = Camera::default();
        let offset = camera.eye() - camera.center();
        assert!((offset.length() - camera.distance).abs() < 1e-4);
        // above the focus means more negative z
        assert!(offset.z < 0.0);
    }

    #[test]
    fn test_rotate_wraps_and_clamps() {
        let mut camera = Camera::default();
        camera.rotate(150.0, 0.0);
        assert!((camera.azimuth_deg - -150.0).abs() < 1e-4);
        camera.rotate(0.0, -500.0);
        assert_eq!(camera.elevation_deg, MAX_ELEVATION_DEG);
        camera.rotate(0.0, 500.0);
        assert_eq!(camera.elevation_deg, MIN_ELEVATION_DEG);
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut camera = Camera::default();
        for _ in 0..200 {
            camera.scroll(1.0);
        }
        assert_eq!(camera.distance, MAX_DISTANCE);
        for _ in 0..400 {
            camera.scroll(-1.0);
        }
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.scroll(0.0);
        assert_eq!(camera.distance, MIN_DISTANCE);
    }

    #[test]
    fn test_view_centers_focus() {
        let camera = Camera::default();
        let clip = camera.view_projection(16.0 / 9.0) * camera.center().extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    }
}
