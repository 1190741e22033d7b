//! Tunables for the walkthrough.
//!
//! Every value has a default matching the stock scene, so a config file only
//! needs the fields it overrides. `validate` must pass before any controller
//! is built from the values.

use crate::scene::serialization;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("move speed must be finite and positive, got {0}")]
    InvalidSpeed(f32),
    #[error("pick range must be finite and positive, got {0}")]
    InvalidPickRange(f32),
    #[error("look sensitivity must be finite and positive, got {0}")]
    InvalidLookSensitivity(f32),
    #[error("vertical field of view must lie in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),
    #[error("clip planes must satisfy 0 < near < far, got near={near} far={far}")]
    InvalidClipPlanes { near: f32, far: f32 },
    #[error("max frame delta must be finite and positive, got {0}")]
    InvalidFrameDelta(f32),
    #[error("scatter half extent must be finite and positive, got {0}")]
    InvalidScatterExtent(f32),
    #[error("start position must be finite, got {0:?}")]
    InvalidStartPosition([f32; 3]),
    #[error("key binding for '{0}' is empty")]
    EmptyBinding(&'static str),
}

/// Key identifiers driving the four movement axes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MoveBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
}

impl Default for MoveBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
        }
    }
}

impl MoveBindings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, key) in [
            ("forward", &self.forward),
            ("backward", &self.backward),
            ("left", &self.left),
            ("right", &self.right),
        ] {
            if key.trim().is_empty() {
                return Err(ConfigError::EmptyBinding(name));
            }
        }
        Ok(())
    }

    /// Same bindings in the form key events are recorded under.
    pub fn normalized(&self) -> Self {
        Self {
            forward: normalize_binding(&self.forward),
            backward: normalize_binding(&self.backward),
            left: normalize_binding(&self.left),
            right: normalize_binding(&self.right),
        }
    }
}

/// Maps a configured key to its recorded identifier: single characters are
/// lowercased like typed keys, named keys ("Escape", "Space") pass through.
pub fn normalize_binding(key: &str) -> String {
    let key = key.trim();
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(_), None) => key.to_lowercase(),
        _ => key.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// World units per second.
    pub move_speed: f32,
    /// Farthest distance at which the aim ray still highlights an object.
    pub pick_range: f32,
    /// Radians of look rotation per pixel of raw pointer motion.
    pub look_sensitivity: f32,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub start_position: [f32; 3],
    /// Upper bound on a single frame's elapsed time, in seconds.
    pub max_frame_dt: f32,
    pub bindings: MoveBindings,
    /// Leaves the inspect view.
    pub exit_key: String,
    pub cube_count: usize,
    pub scatter_half_extent: f32,
    pub scene_seed: u64,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            pick_range: 100.0,
            look_sensitivity: 0.002,
            fov_y_deg: 75.0,
            near: 1.0,
            far: 20_000.0,
            start_position: [0.0, 0.0, 20.0],
            max_frame_dt: 0.1,
            bindings: MoveBindings::default(),
            exit_key: "Escape".to_string(),
            cube_count: 3,
            scatter_half_extent: 25.0,
            scene_seed: 0x5eed,
        }
    }
}

impl TourConfig {
    pub fn load(path: &Path) -> serialization::Result<Self> {
        serialization::load_json(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_speed(self.move_speed)?;
        validate_pick_range(self.pick_range)?;
        validate_look_sensitivity(self.look_sensitivity)?;
        if !(self.fov_y_deg > 0.0 && self.fov_y_deg < 180.0) {
            return Err(ConfigError::InvalidFieldOfView(self.fov_y_deg));
        }
        if !(self.near > 0.0 && self.near < self.far && self.far.is_finite()) {
            return Err(ConfigError::InvalidClipPlanes {
                near: self.near,
                far: self.far,
            });
        }
        validate_frame_delta(self.max_frame_dt)?;
        if !is_positive(self.scatter_half_extent) {
            return Err(ConfigError::InvalidScatterExtent(self.scatter_half_extent));
        }
        if !self.start_position.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::InvalidStartPosition(self.start_position));
        }
        self.bindings.validate()?;
        if self.exit_key.trim().is_empty() {
            return Err(ConfigError::EmptyBinding("exit"));
        }
        Ok(())
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

pub fn validate_speed(speed: f32) -> Result<(), ConfigError> {
    if is_positive(speed) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSpeed(speed))
    }
}

pub fn validate_pick_range(range: f32) -> Result<(), ConfigError> {
    if is_positive(range) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPickRange(range))
    }
}

pub fn validate_look_sensitivity(sensitivity: f32) -> Result<(), ConfigError> {
    if is_positive(sensitivity) {
        Ok(())
    } else {
        Err(ConfigError::InvalidLookSensitivity(sensitivity))
    }
}

pub fn validate_frame_delta(max_frame_dt: f32) -> Result<(), ConfigError> {
    if is_positive(max_frame_dt) {
        Ok(())
    } else {
        Err(ConfigError::InvalidFrameDelta(max_frame_dt))
    }
}
