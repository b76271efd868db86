//! Rally Engine -- debug-line pong on top of [`rally_physics`].
//!
//! The centrepiece is [`render::SegmentRenderer`], which turns every line
//! of the physics debug-render buffer into one oriented quad draw. Around it
//! sit the pieces needed to play: a [`court::Court`] of rapier colliders,
//! [`input::Keyboard`] state, the [`frame::FrameDriver`] tick, and
//! [`config::GameConfig`].
//!
//! Rendering goes through the [`render::GraphicsContext`] trait. The
//! [`render::HeadlessContext`] records calls and needs no GPU; the wgpu
//! backend and the windowed runner live behind the `renderer` feature.
//!
//! # Quick Start
//!
//! ```
//! use rally_engine::prelude::*;
//!
//! let mut ctx = HeadlessContext::new();
//! let program = ctx.add_program(&[("position", 2)], &["mvpMatrix", "color"]);
//! let mut driver = FrameDriver::new(GameConfig::default(), &mut ctx, program)?;
//!
//! let report = driver.advance(1.0 / 60.0, &mut ctx)?;
//! assert!(report.rendered);
//! assert_eq!(ctx.draws().len(), report.segments_drawn);
//! # Ok::<(), rally_engine::error::EngineError>(())
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod court;
pub mod error;
pub mod frame;
pub mod input;
pub mod render;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::GameConfig;
    pub use crate::court::{hit_factor, Court, Side};
    pub use crate::error::{ConfigError, EngineError, RenderError};
    pub use crate::frame::{ContactEvent, FrameDriver, FrameReport};
    pub use crate::input::{Key, Keyboard};
    pub use crate::render::{
        Camera2D, GraphicsContext, HeadlessContext, ProgramId, RenderTransform, RendererSettings,
        SegmentRenderer,
    };
    pub use rally_physics::prelude::*;
}
