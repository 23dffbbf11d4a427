//! Run settings
//!
//! Loaded from an optional JSON file; any field left out keeps its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::consts::{NU_OBJ, NU_VIS, NV_OBJ, NV_VIS, NX, NY};
use crate::optimize::MinimizeOptions;
use crate::renderer::Layers;
use crate::sim::bspline::{MIN_CONTROL_POINTS, MIN_RESOLUTION};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Optimizer tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Lower bound on every control point depth (m)
    pub lower_bound: f64,
    /// Upper bound on every control point depth (m)
    pub upper_bound: f64,
    /// Initial simplex step per design variable (m)
    pub initial_step: f64,
    /// Relative tolerance on the design vector
    pub xtol_rel: f64,
    /// Stop after this many objective evaluations (unbounded if absent)
    pub max_evaluations: Option<usize>,
    /// Sleep before each evaluation so the render loop can keep up
    pub throttle_ms: u64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            lower_bound: -10.0,
            upper_bound: 2.0,
            initial_step: 0.1,
            xtol_rel: 1e-4,
            max_evaluations: None,
            throttle_ms: 10,
        }
    }
}

impl OptimizerSettings {
    pub fn minimize_options(&self) -> MinimizeOptions {
        MinimizeOptions {
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            initial_step: self.initial_step,
            xtol_rel: self.xtol_rel,
            max_evaluations: self.max_evaluations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Control points across the backboard
    pub nx: usize,
    /// Control points up the backboard
    pub ny: usize,
    /// Surface resolution scored by the objective
    pub nu_obj: usize,
    pub nv_obj: usize,
    /// Surface resolution drawn
    pub nu_vis: usize,
    pub nv_vis: usize,

    pub optimizer: OptimizerSettings,

    /// Render loop period
    pub frame_interval_ms: u64,
    /// Layers visible at startup
    pub layers: Layers,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nx: NX,
            ny: NY,
            nu_obj: NU_OBJ,
            nv_obj: NV_OBJ,
            nu_vis: NU_VIS,
            nv_vis: NV_VIS,
            optimizer: OptimizerSettings::default(),
            frame_interval_ms: 16,
            layers: Layers::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file and validate them
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Reject dimensions the core would assert on
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.nx < MIN_CONTROL_POINTS || self.ny < MIN_CONTROL_POINTS {
            return Err(SettingsError::Invalid(format!(
                "control grid {}x{} is smaller than {MIN_CONTROL_POINTS}x{MIN_CONTROL_POINTS}",
                self.nx, self.ny
            )));
        }
        // the objective skips the outer ring, so it needs one more than drawing does
        if self.nu_obj <= MIN_RESOLUTION || self.nv_obj <= MIN_RESOLUTION {
            return Err(SettingsError::Invalid(format!(
                "objective resolution {}x{} has no interior samples",
                self.nu_obj, self.nv_obj
            )));
        }
        if self.nu_vis < MIN_RESOLUTION || self.nv_vis < MIN_RESOLUTION {
            return Err(SettingsError::Invalid(format!(
                "visual resolution {}x{} is below {MIN_RESOLUTION}x{MIN_RESOLUTION}",
                self.nu_vis, self.nv_vis
            )));
        }
        let opt = &self.optimizer;
        if !(opt.lower_bound < opt.upper_bound) {
            return Err(SettingsError::Invalid(format!(
                "optimizer bounds [{}, {}] are empty",
                opt.lower_bound, opt.upper_bound
            )));
        }
        if !(opt.initial_step > 0.0 && opt.xtol_rel > 0.0) {
            return Err(SettingsError::Invalid(
                "optimizer step and tolerance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
