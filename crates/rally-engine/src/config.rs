//! Game configuration.
//!
//! Every field has a default matching the classic court, so an empty JSON
//! object (or no file at all) yields a playable game.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::RendererSettings;

/// Tunables for the court, the simulation and the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Simulation to screen scale.
    pub pixels_per_unit: f32,
    /// Width of every debug line rectangle, in screen units.
    pub line_thickness: f32,
    /// Physics integration step per tick, in seconds.
    pub physics_dt: f32,
    /// Paddle travel speed, simulation units per second.
    pub paddle_speed: f32,
    /// Largest |y| a paddle centre may reach, in screen units.
    pub paddle_travel: f32,
    /// Initial horizontal ball velocity.
    pub ball_speed: f32,
    /// Half width and half height of the visible area.
    pub view_half_extent: f32,
    /// Window width in physical pixels.
    pub window_width: u32,
    /// Window height in physical pixels.
    pub window_height: u32,
    /// Framebuffer clear colour, RGBA.
    pub clear_color: [f32; 4],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pixels_per_unit: 1.0,
            line_thickness: 0.3,
            physics_dt: 1.0 / 60.0,
            paddle_speed: 20.0,
            paddle_travel: 12.5,
            ball_speed: 30.0,
            view_half_extent: 30.0,
            window_width: 800,
            window_height: 800,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON or unknown value types,
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Check every value is in range.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("pixels_per_unit", self.pixels_per_unit)?;
        positive("line_thickness", self.line_thickness)?;
        positive("physics_dt", self.physics_dt)?;
        positive("view_half_extent", self.view_half_extent)?;
        non_negative("paddle_speed", self.paddle_speed)?;
        non_negative("paddle_travel", self.paddle_travel)?;
        if !self.ball_speed.is_finite() {
            return Err(ConfigError::Invalid {
                field: "ball_speed",
                value: self.ball_speed,
                reason: "must be finite",
            });
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Invalid {
                field: "window_size",
                value: 0.0,
                reason: "must be non-zero",
            });
        }
        if let Some(&c) = self.clear_color.iter().find(|c| !(0.0..=1.0).contains(*c)) {
            return Err(ConfigError::Invalid {
                field: "clear_color",
                value: c,
                reason: "channels must be in [0, 1]",
            });
        }
        Ok(())
    }

    /// Renderer settings derived from this config.
    pub fn renderer_settings(&self) -> RendererSettings {
        RendererSettings {
            pixels_per_unit: self.pixels_per_unit,
            thickness: self.line_thickness,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            value,
            reason: "must be positive and finite",
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            value,
            reason: "must be non-negative and finite",
        })
    }
}
