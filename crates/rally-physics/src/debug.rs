//! Debug-render line buffers.
//!
//! rapier's debug-render pipeline reports collider outlines as individual
//! line segments. [`DebugLineCollector`] flattens those callbacks into a
//! [`DebugRenderBuffer`]: two parallel `f32` arrays laid out the way
//! renderers expect to stream them.
//!
//! # Layout
//!
//! | Buffer | Floats per segment | Contents |
//! |--------|--------------------|----------|
//! | `vertices` | 4 | `from.x, from.y, to.x, to.y` |
//! | `colors` | 8 | RGBA at `from`, RGBA at `to` |
//!
//! Consumers only read the first three colour floats of each segment.

use glam::Vec2;
use rapier2d::pipeline::{DebugRenderBackend, DebugRenderObject};
use rapier2d::prelude::{Point, Real};

use crate::error::PhysicsError;

/// Floats per segment in the vertex buffer.
pub const VERTEX_STRIDE: usize = 4;

/// Floats per segment in the colour buffer.
pub const COLOR_STRIDE: usize = 8;

// ---------------------------------------------------------------------------
// LineSegment
// ---------------------------------------------------------------------------

/// One debug line, in simulation units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Start point.
    pub from: Vec2,
    /// End point.
    pub to: Vec2,
    /// RGB colour in unit range.
    pub color: [f32; 3],
}

// ---------------------------------------------------------------------------
// DebugRenderBuffer
// ---------------------------------------------------------------------------

/// Flat endpoint and colour buffers for one frame of debug lines.
///
/// Construction through [`DebugRenderBuffer::new`] validates the strides, so
/// every index below [`segment_count`](Self::segment_count) is readable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugRenderBuffer {
    vertices: Vec<f32>,
    colors: Vec<f32>,
}

impl DebugRenderBuffer {
    /// Wrap raw buffers, checking that they describe the same segments.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::MisalignedVertices`] if `vertices` is not a multiple of
    /// 4 floats, [`PhysicsError::ColorMismatch`] if `colors` does not hold 8
    /// floats per segment.
    pub fn new(vertices: Vec<f32>, colors: Vec<f32>) -> Result<Self, PhysicsError> {
        if vertices.len() % VERTEX_STRIDE != 0 {
            return Err(PhysicsError::MisalignedVertices {
                len: vertices.len(),
            });
        }
        let segments = vertices.len() / VERTEX_STRIDE;
        let expected = segments * COLOR_STRIDE;
        if colors.len() != expected {
            return Err(PhysicsError::ColorMismatch {
                segments,
                colors: colors.len(),
                expected,
            });
        }
        Ok(Self { vertices, colors })
    }

    /// Build a buffer from segments, repeating each colour at both ends with
    /// full alpha.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a LineSegment>) -> Self {
        let mut buffer = Self::default();
        for seg in segments {
            buffer.push(seg.from, seg.to, [seg.color[0], seg.color[1], seg.color[2], 1.0]);
        }
        buffer
    }

    fn push(&mut self, from: Vec2, to: Vec2, rgba: [f32; 4]) {
        self.vertices.extend_from_slice(&[from.x, from.y, to.x, to.y]);
        self.colors.extend_from_slice(&rgba);
        self.colors.extend_from_slice(&rgba);
    }

    /// Number of line segments.
    pub fn segment_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    /// Whether the buffer holds no segments.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Segment `index`, or `None` past the end.
    pub fn segment(&self, index: usize) -> Option<LineSegment> {
        if index >= self.segment_count() {
            return None;
        }
        let v = self
            .vertices
            .get(index * VERTEX_STRIDE..(index + 1) * VERTEX_STRIDE)?;
        let c = self.colors.get(index * COLOR_STRIDE..index * COLOR_STRIDE + 3)?;
        Some(LineSegment {
            from: Vec2::new(v[0], v[1]),
            to: Vec2::new(v[2], v[3]),
            color: [c[0], c[1], c[2]],
        })
    }

    /// Segments in buffer order.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = LineSegment> + '_ {
        self.vertices
            .chunks_exact(VERTEX_STRIDE)
            .zip(self.colors.chunks_exact(COLOR_STRIDE))
            .map(|(v, c)| LineSegment {
                from: Vec2::new(v[0], v[1]),
                to: Vec2::new(v[2], v[3]),
                color: [c[0], c[1], c[2]],
            })
    }

    /// Raw endpoint buffer.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Raw colour buffer.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.colors.clear();
    }
}

// ---------------------------------------------------------------------------
// DebugLineSource
// ---------------------------------------------------------------------------

/// Anything that can hand out the current frame's debug lines.
///
/// Implemented by [`PhysicsWorld`](crate::world::PhysicsWorld), which runs
/// rapier's debug-render pipeline, and by [`DebugRenderBuffer`] itself for
/// fixed line sets. The buffer is borrowed from the source, so a source
/// that rebuilds its lines every frame can reuse the same allocation.
pub trait DebugLineSource {
    /// Produce the debug lines for the current state.
    ///
    /// # Errors
    ///
    /// Implementations report a [`PhysicsError`] when no consistent buffer
    /// can be produced this frame.
    fn debug_lines(&mut self) -> Result<&DebugRenderBuffer, PhysicsError>;
}

impl DebugLineSource for DebugRenderBuffer {
    fn debug_lines(&mut self) -> Result<&DebugRenderBuffer, PhysicsError> {
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// rapier backend
// ---------------------------------------------------------------------------

/// rapier debug-render backend that appends every line into a buffer.
#[derive(Debug, Default)]
pub(crate) struct DebugLineCollector {
    buffer: DebugRenderBuffer,
}

impl DebugLineCollector {
    pub(crate) fn reset(&mut self) {
        self.buffer.clear();
    }

    pub(crate) fn buffer(&self) -> &DebugRenderBuffer {
        &self.buffer
    }
}

impl DebugRenderBackend for DebugLineCollector {
    fn draw_line(
        &mut self,
        _object: DebugRenderObject,
        a: Point<Real>,
        b: Point<Real>,
        color: [f32; 4],
    ) {
        self.buffer
            .push(Vec2::new(a.x, a.y), Vec2::new(b.x, b.y), hsla_to_rgba(color));
    }
}

/// Convert rapier's HSLA debug colour (hue in degrees) to RGBA.
pub fn hsla_to_rgba([h, s, l, a]: [f32; 4]) -> [f32; 4] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [r + m, g + m, b + m, a]
}
