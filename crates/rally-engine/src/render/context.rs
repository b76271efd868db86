//! Graphics-context boundary.
//!
//! The renderer never touches ambient GPU state. Everything it needs from a
//! graphics backend goes through a [`GraphicsContext`] handed in by the
//! caller, and every method on that trait mutates the context it is called
//! on: the bound program, the bound vertex buffer and the current uniform
//! values all live inside the context value.
//!
//! Handles are small opaque integers. Their meaning is private to the
//! context that issued them; passing a handle to a different context is a
//! logic error the context reports where it can.

use crate::error::RenderError;

/// A linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// A resolved vertex attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttribLocation(pub u32);

/// A resolved uniform slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub u32);

/// A vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// Immediate-mode drawing API consumed by
/// [`SegmentRenderer`](super::renderer::SegmentRenderer).
///
/// The call pattern mirrors a classic bind-then-draw API: select a program,
/// bind a vertex buffer to an attribute, set uniforms, draw. State persists
/// inside the context between calls until overwritten.
pub trait GraphicsContext {
    /// Make `program` current for subsequent uniform uploads and draws.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidProgram`] if the context does not know the
    /// program.
    fn use_program(&mut self, program: ProgramId) -> Result<(), RenderError>;

    /// Resolve a vertex attribute of `program` by name.
    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation>;

    /// Resolve a uniform of `program` by name.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Allocate an empty vertex buffer.
    ///
    /// # Errors
    ///
    /// [`RenderError::BufferAllocation`] if the backend cannot allocate.
    fn create_buffer(&mut self) -> Result<BufferId, RenderError>;

    /// Upload immutable vertex data into `buffer`.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownBuffer`] for a foreign or stale handle.
    fn upload_static(&mut self, buffer: BufferId, data: &[f32]) -> Result<(), RenderError>;

    /// Bind `buffer` as the source of `attrib`, reading `components` floats
    /// per vertex with no stride or offset, and enable the attribute.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownBuffer`] for a foreign or stale handle,
    /// [`RenderError::AttributeLayout`] if the program declares a different
    /// component count for the attribute.
    fn bind_vertex_buffer(
        &mut self,
        buffer: BufferId,
        attrib: AttribLocation,
        components: u32,
    ) -> Result<(), RenderError>;

    /// Set a 3-float uniform on the current program.
    fn set_uniform_vec3(&mut self, location: UniformLocation, value: [f32; 3]);

    /// Set a column-major 4x4 matrix uniform on the current program.
    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]);

    /// Draw `count` vertices starting at `first` from the bound buffer as a
    /// triangle strip, using the current program and uniform values.
    fn draw_triangle_strip(&mut self, first: u32, count: u32);
}
