//! Debug line renderer.
//!
//! Draws every line of a physics debug-render buffer as a thin rectangle.
//! The rectangle is the shared [`UNIT_QUAD`] placed by a per-segment model
//! matrix, so the only per-segment GPU traffic is two uniform uploads and
//! one 4-vertex triangle-strip draw.
//!
//! # Architecture
//!
//! The renderer does NOT own the graphics context or the physics world.
//! Each frame the driver calls [`SegmentRenderer::draw_all`] with both:
//!
//! 1. The debug buffer is queried and the program is bound.
//! 2. The unit quad is bound to the `position` attribute.
//! 3. For each segment, in buffer order: set `color`, derive the
//!    [`RenderTransform`], upload `mvpMatrix`, draw.
//!
//! Graphics state (program, buffer, uniforms) is left as the last segment
//! set it; callers must not assume it is preserved across `draw_all`.

use glam::Mat4;
use rally_physics::debug::{DebugLineSource, DebugRenderBuffer, LineSegment};

use super::context::{AttribLocation, BufferId, GraphicsContext, ProgramId, UniformLocation};
use super::segment::{RenderTransform, DEFAULT_LINE_THICKNESS, UNIT_QUAD, UNIT_QUAD_VERTICES};
use crate::error::RenderError;

/// Vertex attribute carrying the quad corner.
pub const POSITION_ATTRIBUTE: &str = "position";

/// Uniform holding the combined model-view-projection matrix.
pub const MVP_UNIFORM: &str = "mvpMatrix";

/// Uniform holding the segment's RGB colour.
pub const COLOR_UNIFORM: &str = "color";

/// Construction parameters for [`SegmentRenderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererSettings {
    /// Simulation-to-screen scale applied to every endpoint.
    pub pixels_per_unit: f32,
    /// Rectangle width in screen units, shared by all segments.
    pub thickness: f32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            pixels_per_unit: 1.0,
            thickness: DEFAULT_LINE_THICKNESS,
        }
    }
}

/// Per-segment working state, reused across draws.
///
/// Overwritten for every segment; its contents between calls are whatever
/// the last segment left behind.
#[derive(Debug, Clone, Copy, Default)]
struct Scratch {
    transform: RenderTransform,
    mvp: Mat4,
}

/// Renders physics debug lines as oriented quads.
///
/// Holds resolved locations and the static quad buffer of one context.
/// Not meant to be shared: `draw_all` takes `&mut self`.
#[derive(Debug)]
pub struct SegmentRenderer {
    program: ProgramId,
    position: AttribLocation,
    mvp_uniform: UniformLocation,
    color_uniform: UniformLocation,
    quad: BufferId,
    settings: RendererSettings,
    proj_view: Mat4,
    scratch: Scratch,
    skipped_segments: u64,
}

impl SegmentRenderer {
    /// Bind `program`, resolve its locations and upload the unit quad.
    ///
    /// The projection-view matrix starts as identity.
    ///
    /// # Errors
    ///
    /// Any failure is returned before a draw can happen:
    /// [`RenderError::InvalidSetting`] for a non-positive scale or thickness,
    /// [`RenderError::InvalidProgram`], [`RenderError::MissingAttribute`],
    /// [`RenderError::MissingUniform`], or a buffer error from the context.
    pub fn new<C>(
        ctx: &mut C,
        program: ProgramId,
        settings: RendererSettings,
    ) -> Result<Self, RenderError>
    where
        C: GraphicsContext + ?Sized,
    {
        check_setting("pixels_per_unit", settings.pixels_per_unit)?;
        check_setting("thickness", settings.thickness)?;

        ctx.use_program(program)?;
        let position = ctx.attrib_location(program, POSITION_ATTRIBUTE).ok_or_else(|| {
            RenderError::MissingAttribute {
                program,
                name: POSITION_ATTRIBUTE.to_owned(),
            }
        })?;
        let mvp_uniform = resolve_uniform(ctx, program, MVP_UNIFORM)?;
        let color_uniform = resolve_uniform(ctx, program, COLOR_UNIFORM)?;

        let quad = ctx.create_buffer()?;
        ctx.upload_static(quad, &UNIT_QUAD)?;

        tracing::debug!(
            ?program,
            ?position,
            ?mvp_uniform,
            ?color_uniform,
            ?quad,
            "segment renderer initialized"
        );

        Ok(Self {
            program,
            position,
            mvp_uniform,
            color_uniform,
            quad,
            settings,
            proj_view: Mat4::IDENTITY,
            scratch: Scratch::default(),
            skipped_segments: 0,
        })
    }

    /// Replace the projection-view matrix used by subsequent draws.
    pub fn set_projection_view(&mut self, proj_view: Mat4) {
        self.proj_view = proj_view;
    }

    /// Current projection-view matrix.
    pub fn projection_view(&self) -> Mat4 {
        self.proj_view
    }

    /// Settings the renderer was built with.
    pub fn settings(&self) -> RendererSettings {
        self.settings
    }

    /// Segments skipped so far because their transform was not finite.
    pub fn skipped_segments(&self) -> u64 {
        self.skipped_segments
    }

    /// Query `source` for this frame's lines and draw them all.
    ///
    /// Returns the number of draw calls issued. An empty buffer issues none.
    ///
    /// # Errors
    ///
    /// [`RenderError::DebugLines`] if the source fails, in which case nothing
    /// is drawn and no graphics state is touched. Otherwise a context error
    /// from binding the program or quad.
    pub fn draw_all<C, S>(&mut self, ctx: &mut C, source: &mut S) -> Result<usize, RenderError>
    where
        C: GraphicsContext + ?Sized,
        S: DebugLineSource + ?Sized,
    {
        let lines = source.debug_lines()?;
        self.draw_lines(ctx, lines)
    }

    /// Draw an already obtained buffer. Same contract as
    /// [`draw_all`](Self::draw_all) minus the query.
    pub fn draw_lines<C>(&mut self, ctx: &mut C, lines: &DebugRenderBuffer) -> Result<usize, RenderError>
    where
        C: GraphicsContext + ?Sized,
    {
        ctx.use_program(self.program)?;
        ctx.bind_vertex_buffer(self.quad, self.position, 2)?;

        let mut drawn = 0;
        for segment in lines.segments() {
            if self.draw_segment(ctx, &segment) {
                drawn += 1;
            }
        }
        Ok(drawn)
    }

    /// Draw one segment; `false` if it was skipped.
    fn draw_segment<C>(&mut self, ctx: &mut C, segment: &LineSegment) -> bool
    where
        C: GraphicsContext + ?Sized,
    {
        if !segment.from.is_finite() || !segment.to.is_finite() {
            self.skip(segment);
            return false;
        }

        let transform = RenderTransform::from_endpoints(
            segment.from,
            segment.to,
            self.settings.pixels_per_unit,
            self.settings.thickness,
        );
        let mvp = transform.mvp(&self.proj_view);
        if !mvp.is_finite() {
            self.skip(segment);
            return false;
        }
        self.scratch = Scratch { transform, mvp };

        ctx.set_uniform_vec3(self.color_uniform, segment.color);
        ctx.set_uniform_mat4(self.mvp_uniform, &self.scratch.mvp.to_cols_array());
        ctx.draw_triangle_strip(0, UNIT_QUAD_VERTICES);
        true
    }

    fn skip(&mut self, segment: &LineSegment) {
        self.skipped_segments += 1;
        tracing::warn!(
            from = ?segment.from,
            to = ?segment.to,
            "non-finite debug segment skipped"
        );
    }
}

fn resolve_uniform<C>(ctx: &C, program: ProgramId, name: &str) -> Result<UniformLocation, RenderError>
where
    C: GraphicsContext + ?Sized,
{
    ctx.uniform_location(program, name)
        .ok_or_else(|| RenderError::MissingUniform {
            program,
            name: name.to_owned(),
        })
}

fn check_setting(name: &'static str, value: f32) -> Result<(), RenderError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(RenderError::InvalidSetting { name, value })
    }
}
