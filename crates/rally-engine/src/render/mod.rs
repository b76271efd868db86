//! Segment rendering for physics debug lines.
//!
//! The backend-independent parts (transform math, the renderer, the camera
//! and the recording [`HeadlessContext`]) always compile. The wgpu backend
//! and the windowed runner are gated behind the `renderer` feature.

pub mod camera;
pub mod context;
pub mod headless;
pub mod renderer;
pub mod segment;

#[cfg(feature = "renderer")]
pub mod app;
#[cfg(feature = "renderer")]
pub mod wgpu_context;

pub use camera::Camera2D;
pub use context::{AttribLocation, BufferId, GraphicsContext, ProgramId, UniformLocation};
pub use headless::{DrawRecord, HeadlessContext, UniformValue};
pub use renderer::{RendererSettings, SegmentRenderer};
pub use segment::{RenderTransform, UNIT_QUAD};

#[cfg(feature = "renderer")]
pub use app::run_windowed;
#[cfg(feature = "renderer")]
pub use wgpu_context::{WgpuContext, COLOR_PROGRAM};
