//! A [`GraphicsContext`] that records calls instead of drawing.
//!
//! Used for headless runs (no window, no GPU) and for verifying exactly what
//! the renderer asked the backend to do. Each draw call is captured as a
//! [`DrawRecord`] holding a snapshot of the current program's uniform values.

use std::collections::HashMap;

use super::context::{AttribLocation, BufferId, GraphicsContext, ProgramId, UniformLocation};
use crate::error::RenderError;

/// A uniform value as last uploaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// 3-float vector.
    Vec3([f32; 3]),
    /// Column-major 4x4 matrix.
    Mat4([f32; 16]),
}

/// One captured draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// Program current at draw time.
    pub program: ProgramId,
    /// Buffer bound at draw time.
    pub buffer: Option<BufferId>,
    /// First vertex.
    pub first: u32,
    /// Vertex count.
    pub count: u32,
    /// Uniform values of the program, by name.
    pub uniforms: Vec<(String, UniformValue)>,
}

impl DrawRecord {
    /// The 3-float uniform called `name`, if set.
    pub fn vec3(&self, name: &str) -> Option<[f32; 3]> {
        self.uniforms.iter().find_map(|(n, v)| match v {
            UniformValue::Vec3(x) if n == name => Some(*x),
            _ => None,
        })
    }

    /// The matrix uniform called `name`, if set.
    pub fn mat4(&self, name: &str) -> Option<[f32; 16]> {
        self.uniforms.iter().find_map(|(n, v)| match v {
            UniformValue::Mat4(x) if n == name => Some(*x),
            _ => None,
        })
    }
}

#[derive(Debug)]
struct HeadlessProgram {
    attributes: Vec<(String, u32)>,
}

#[derive(Debug)]
struct UniformSlot {
    program: ProgramId,
    name: String,
}

/// Recording graphics context.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    programs: Vec<HeadlessProgram>,
    uniform_slots: Vec<UniformSlot>,
    uniform_values: HashMap<UniformLocation, UniformValue>,
    buffers: Vec<Option<Vec<f32>>>,
    buffer_limit: Option<usize>,
    current_program: Option<ProgramId>,
    bound_buffer: Option<BufferId>,
    /// Attribute slot -> components, as last bound.
    enabled_attributes: HashMap<AttribLocation, u32>,
    draws: Vec<DrawRecord>,
    dropped_draws: usize,
}

impl HeadlessContext {
    /// An empty context with no programs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a program declaring the given attributes (name, component
    /// count) and uniform names.
    pub fn add_program(&mut self, attributes: &[(&str, u32)], uniforms: &[&str]) -> ProgramId {
        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(HeadlessProgram {
            attributes: attributes
                .iter()
                .map(|(name, components)| ((*name).to_owned(), *components))
                .collect(),
        });
        for name in uniforms {
            self.uniform_slots.push(UniformSlot {
                program: id,
                name: (*name).to_owned(),
            });
        }
        id
    }

    /// Fail allocations once `limit` buffers exist.
    pub fn set_buffer_limit(&mut self, limit: Option<usize>) {
        self.buffer_limit = limit;
    }

    /// Every draw recorded so far.
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Draws issued while no program or buffer was bound.
    pub fn dropped_draws(&self) -> usize {
        self.dropped_draws
    }

    /// Forget recorded draws, keeping programs, buffers and bindings.
    pub fn clear_draws(&mut self) {
        self.draws.clear();
        self.dropped_draws = 0;
    }

    /// Contents of a buffer, if it has been uploaded.
    pub fn buffer_data(&self, buffer: BufferId) -> Option<&[f32]> {
        self.buffers.get(buffer.0 as usize)?.as_deref()
    }

    /// Currently bound program.
    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }

    /// Currently bound vertex buffer.
    pub fn bound_buffer(&self) -> Option<BufferId> {
        self.bound_buffer
    }

    /// Component count an attribute was last enabled with.
    pub fn enabled_components(&self, attrib: AttribLocation) -> Option<u32> {
        self.enabled_attributes.get(&attrib).copied()
    }

    fn program(&self, program: ProgramId) -> Option<&HeadlessProgram> {
        self.programs.get(program.0 as usize)
    }

    fn declared_components(&self, attrib: AttribLocation) -> Option<u32> {
        let program = self.program(self.current_program?)?;
        program.attributes.get(attrib.0 as usize).map(|(_, c)| *c)
    }

    fn store_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        match self.uniform_slots.get(location.0 as usize) {
            Some(slot) if Some(slot.program) == self.current_program => {
                self.uniform_values.insert(location, value);
            }
            _ => tracing::warn!(?location, "uniform set outside its program -- ignored"),
        }
    }
}

impl GraphicsContext for HeadlessContext {
    fn use_program(&mut self, program: ProgramId) -> Result<(), RenderError> {
        if self.program(program).is_none() {
            return Err(RenderError::InvalidProgram(program));
        }
        self.current_program = Some(program);
        Ok(())
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        self.program(program)?
            .attributes
            .iter()
            .position(|(n, _)| n == name)
            .map(|i| AttribLocation(i as u32))
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.uniform_slots
            .iter()
            .position(|slot| slot.program == program && slot.name == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn create_buffer(&mut self) -> Result<BufferId, RenderError> {
        if let Some(limit) = self.buffer_limit {
            if self.buffers.len() >= limit {
                return Err(RenderError::BufferAllocation(format!(
                    "headless buffer limit of {limit} reached"
                )));
            }
        }
        self.buffers.push(None);
        Ok(BufferId(self.buffers.len() as u32 - 1))
    }

    fn upload_static(&mut self, buffer: BufferId, data: &[f32]) -> Result<(), RenderError> {
        let slot = self
            .buffers
            .get_mut(buffer.0 as usize)
            .ok_or(RenderError::UnknownBuffer(buffer))?;
        *slot = Some(data.to_vec());
        self.bound_buffer = Some(buffer);
        Ok(())
    }

    fn bind_vertex_buffer(
        &mut self,
        buffer: BufferId,
        attrib: AttribLocation,
        components: u32,
    ) -> Result<(), RenderError> {
        if self.buffers.get(buffer.0 as usize).is_none() {
            return Err(RenderError::UnknownBuffer(buffer));
        }
        if let Some(expected) = self.declared_components(attrib) {
            if expected != components {
                return Err(RenderError::AttributeLayout {
                    attrib,
                    expected,
                    actual: components,
                });
            }
        }
        self.bound_buffer = Some(buffer);
        self.enabled_attributes.insert(attrib, components);
        Ok(())
    }

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: [f32; 3]) {
        self.store_uniform(location, UniformValue::Vec3(value));
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]) {
        self.store_uniform(location, UniformValue::Mat4(*value));
    }

    fn draw_triangle_strip(&mut self, first: u32, count: u32) {
        let Some(program) = self.current_program else {
            self.dropped_draws += 1;
            return;
        };
        let uniforms = self
            .uniform_slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.program == program)
            .filter_map(|(i, slot)| {
                let value = self.uniform_values.get(&UniformLocation(i as u32))?;
                Some((slot.name.clone(), *value))
            })
            .collect();
        self.draws.push(DrawRecord {
            program,
            buffer: self.bound_buffer,
            first,
            count,
            uniforms,
        });
    }
}
