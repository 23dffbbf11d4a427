//! bb3d - Backboard shape optimization
//!
//! Core modules:
//! - `sim`: Deterministic geometry and physics (B-spline surface, backboard, shots, objective)
//! - `optimize`: Nelder-Mead search over backboard shapes and the render hand-off
//! - `renderer`: Presentation-side geometry (meshes, polylines, camera, layer toggles)
//! - `settings`: Run configuration
//!
//! Coordinates: x runs across the backboard, y points from the wall toward the
//! court and z points *down*, so a height above the floor is `-z`.

pub mod optimize;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

/// Physical and sampling constants
pub mod consts {
    /// Gravitational acceleration (m/s², along +z)
    pub const G_ACCEL: f64 = 9.81;
    /// Vertical velocity of every shot when it reaches the backboard (m/s, +z is down)
    pub const BOUNCE_VZ: f64 = 0.5;

    /// Rim height above the floor (10 feet)
    pub const RIM_HEIGHT: f64 = 3.05;
    /// Rim inner diameter (18 inches)
    pub const RIM_DIAMETER: f64 = 0.4572;
    /// Gap between backboard and rim (6 inches)
    pub const RIM_BACKBOARD_OFFSET: f64 = 0.151;

    /// Backboard width (6 feet)
    pub const BACKBOARD_WIDTH: f64 = 1.83;
    /// Backboard height (3.5 feet)
    pub const BACKBOARD_HEIGHT: f64 = 1.07;
    /// Height of the bottom edge of the backboard, 12 inches above the rim
    pub const BACKBOARD_BOTTOM: f64 = RIM_HEIGHT + 0.305;

    /// Shot origins across the court (x)
    pub const SHOTS_X: usize = 5;
    /// Shot origins out from the wall (y)
    pub const SHOTS_Y: usize = 4;
    /// Half-width of the shot origin rectangle
    pub const SHOT_HALF_WIDTH: f64 = 1.5;
    /// Nearest shot origin distance from the wall
    pub const SHOT_NEAR_Y: f64 = 3.0;
    /// Depth of the shot origin rectangle
    pub const SHOT_DEPTH: f64 = 2.0;

    /// Control points across the backboard
    pub const NX: usize = 6;
    /// Control points up the backboard
    pub const NY: usize = 4;
    /// Surface resolution used by the objective
    pub const NU_OBJ: usize = 14;
    pub const NV_OBJ: usize = 8;
    /// Surface resolution used for drawing
    pub const NU_VIS: usize = 20;
    pub const NV_VIS: usize = 30;
}
