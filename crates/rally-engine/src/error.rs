//! Error types for rendering, configuration and the frame driver.

use std::path::PathBuf;

use rally_physics::PhysicsError;

use crate::render::context::{AttribLocation, BufferId, ProgramId};

/// Failures reported by a [`GraphicsContext`](crate::render::GraphicsContext)
/// or by the [`SegmentRenderer`](crate::render::SegmentRenderer).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// The program handle is not known to the context.
    #[error("invalid shader program {0:?}")]
    InvalidProgram(ProgramId),

    /// The program declares no attribute with this name.
    #[error("attribute '{name}' not found in program {program:?}")]
    MissingAttribute {
        /// Program that was searched.
        program: ProgramId,
        /// Attribute name.
        name: String,
    },

    /// The program declares no uniform with this name.
    #[error("uniform '{name}' not found in program {program:?}")]
    MissingUniform {
        /// Program that was searched.
        program: ProgramId,
        /// Uniform name.
        name: String,
    },

    /// The backend could not build the program (shader compilation,
    /// unsupported attribute layout, oversized uniform block).
    #[error("program creation failed: {0}")]
    ProgramCreation(String),

    /// The backend refused to allocate a buffer.
    #[error("buffer allocation failed: {0}")]
    BufferAllocation(String),

    /// The buffer handle is not known to the context.
    #[error("unknown vertex buffer {0:?}")]
    UnknownBuffer(BufferId),

    /// An attribute was bound with a component count the program does not
    /// declare.
    #[error("attribute {attrib:?} expects {expected} components, got {actual}")]
    AttributeLayout {
        /// Attribute slot.
        attrib: AttribLocation,
        /// Declared component count.
        expected: u32,
        /// Requested component count.
        actual: u32,
    },

    /// A renderer setting is out of range.
    #[error("invalid renderer setting {name} = {value}")]
    InvalidSetting {
        /// Setting name.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },

    /// The physics world could not produce debug lines this frame.
    #[error("debug line query failed: {0}")]
    DebugLines(#[from] PhysicsError),
}

/// Failures while loading or validating a [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The JSON did not match the config schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range.
    #[error("invalid config value {field} = {value}: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f32,
        /// Constraint that failed.
        reason: &'static str,
    },
}

/// Errors surfaced by [`FrameDriver`](crate::frame::FrameDriver).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A physics query failed.
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
