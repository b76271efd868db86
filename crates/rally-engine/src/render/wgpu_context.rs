//! [`GraphicsContext`] backed by wgpu.
//!
//! wgpu has no immediate-mode uniforms, so the context emulates them: each
//! program owns a CPU-side uniform block, `set_uniform_*` writes into it, and
//! every draw snapshots the block into a staging area at its own 256-byte
//! slot. [`WgpuContext::end_frame`] uploads the staging area once and replays
//! the recorded draws in a single render pass, binding each draw's slot with
//! a dynamic offset.
//!
//! Programs are WGSL modules plus a [`ProgramDescriptor`] naming their
//! attributes and uniform offsets; see [`COLOR_PROGRAM`].

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;

use super::context::{AttribLocation, BufferId, GraphicsContext, ProgramId, UniformLocation};
use crate::error::RenderError;

/// Bytes reserved per draw in the uniform staging buffer. Matches the
/// default `min_uniform_buffer_offset_alignment`.
pub const UNIFORM_STRIDE: u64 = 256;

/// Draws recorded per frame before further draws are dropped.
const MAX_DRAWS: usize = 4096;

/// Shape of a uniform inside a program's block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    /// `vec3<f32>`.
    Vec3,
    /// `mat4x4<f32>`, column-major.
    Mat4,
}

impl UniformKind {
    fn size(self) -> usize {
        match self {
            Self::Vec3 => 12,
            Self::Mat4 => 64,
        }
    }
}

/// A vertex attribute declared by a program.
#[derive(Debug, Clone, Copy)]
pub struct AttributeDesc {
    /// Name used by [`GraphicsContext::attrib_location`].
    pub name: &'static str,
    /// `@location` in the WGSL vertex stage.
    pub shader_location: u32,
    /// Floats per vertex (1 to 4).
    pub components: u32,
}

/// A uniform declared by a program.
#[derive(Debug, Clone, Copy)]
pub struct UniformDesc {
    /// Name used by [`GraphicsContext::uniform_location`].
    pub name: &'static str,
    /// Byte offset inside the WGSL uniform struct.
    pub offset: usize,
    /// Value shape.
    pub kind: UniformKind,
}

/// Everything needed to build a program.
#[derive(Debug, Clone, Copy)]
pub struct ProgramDescriptor<'a> {
    /// Debug label.
    pub label: &'a str,
    /// WGSL source. Uniforms live in one struct at `@group(0) @binding(0)`.
    pub source: &'a str,
    /// Vertex entry point.
    pub vertex_entry: &'a str,
    /// Fragment entry point.
    pub fragment_entry: &'a str,
    /// One vertex buffer slot per attribute, in slot order.
    pub attributes: &'a [AttributeDesc],
    /// Uniform layout.
    pub uniforms: &'a [UniformDesc],
}

/// The flat-colour segment program used by
/// [`SegmentRenderer`](super::renderer::SegmentRenderer).
pub const COLOR_PROGRAM: ProgramDescriptor<'static> = ProgramDescriptor {
    label: "segment_color",
    source: include_str!("color.wgsl"),
    vertex_entry: "vs_main",
    fragment_entry: "fs_main",
    attributes: &[AttributeDesc {
        name: super::renderer::POSITION_ATTRIBUTE,
        shader_location: 0,
        components: 2,
    }],
    uniforms: &[
        UniformDesc {
            name: super::renderer::MVP_UNIFORM,
            offset: 0,
            kind: UniformKind::Mat4,
        },
        UniformDesc {
            name: super::renderer::COLOR_UNIFORM,
            offset: 64,
            kind: UniformKind::Vec3,
        },
    ],
};

struct WgpuProgram {
    pipeline: wgpu::RenderPipeline,
    attributes: Vec<AttributeDesc>,
    block: Vec<u8>,
}

struct UniformSlot {
    program: ProgramId,
    name: &'static str,
    offset: usize,
    kind: UniformKind,
}

struct PendingDraw {
    program: ProgramId,
    vertex_buffers: Vec<BufferId>,
    first: u32,
    count: u32,
    uniform_offset: u32,
}

/// Window surface plus the emulated immediate-mode state.
pub struct WgpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    window: Arc<winit::window::Window>,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    programs: Vec<WgpuProgram>,
    uniform_slots: Vec<UniformSlot>,
    buffers: Vec<Option<wgpu::Buffer>>,
    current_program: Option<ProgramId>,
    vertex_bindings: HashMap<AttribLocation, BufferId>,
    staged_uniforms: Vec<u8>,
    pending: Vec<PendingDraw>,
    dropped_draws: usize,
}

impl WgpuContext {
    /// Create a surface for `window` and the shared uniform resources.
    ///
    /// # Errors
    ///
    /// Returns an error if no adapter or device is available or the surface
    /// cannot be created.
    pub async fn new(window: Arc<winit::window::Window>) -> Result<Self, anyhow::Error> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("no suitable GPU adapter found"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("rally_segment_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("segment_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("segment_uniform_staging"),
            size: MAX_DRAWS as u64 * UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("segment_uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_STRIDE),
                }),
            }],
        });

        tracing::info!(
            width,
            height,
            format = ?surface_format,
            "wgpu graphics context created"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            window,
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            programs: Vec::new(),
            uniform_slots: Vec::new(),
            buffers: Vec::new(),
            current_program: None,
            vertex_bindings: HashMap::new(),
            staged_uniforms: Vec::new(),
            pending: Vec::new(),
            dropped_draws: 0,
        })
    }

    /// Compile `desc` into a render pipeline drawing triangle strips.
    ///
    /// # Errors
    ///
    /// [`RenderError::ProgramCreation`] if an attribute has an unsupported
    /// component count, the uniform block does not fit [`UNIFORM_STRIDE`],
    /// or wgpu rejects the shader or pipeline.
    pub fn create_program(&mut self, desc: &ProgramDescriptor<'_>) -> Result<ProgramId, RenderError> {
        let block_size = desc
            .uniforms
            .iter()
            .map(|u| u.offset + u.kind.size())
            .max()
            .unwrap_or(0);
        if block_size as u64 > UNIFORM_STRIDE {
            return Err(RenderError::ProgramCreation(format!(
                "{}: uniform block of {block_size} bytes exceeds {UNIFORM_STRIDE}",
                desc.label
            )));
        }

        let formats = desc
            .attributes
            .iter()
            .map(|a| vertex_format(a.components).map(|f| (a, f)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|components| {
                RenderError::ProgramCreation(format!(
                    "{}: unsupported attribute width {components}",
                    desc.label
                ))
            })?;
        let attribute_sets: Vec<[wgpu::VertexAttribute; 1]> = formats
            .iter()
            .map(|(a, format)| {
                [wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: a.shader_location,
                    format: *format,
                }]
            })
            .collect();
        let buffer_layouts: Vec<wgpu::VertexBufferLayout<'_>> = formats
            .iter()
            .zip(&attribute_sets)
            .map(|((a, _), attributes)| wgpu::VertexBufferLayout {
                array_stride: u64::from(a.components) * 4,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            })
            .collect();

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.source.into()),
        });

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(desc.label),
            bind_group_layouts: &[&self.uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(desc.vertex_entry),
                buffers: &buffer_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(desc.fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::ProgramCreation(format!("{}: {err}", desc.label)));
        }

        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(WgpuProgram {
            pipeline,
            attributes: desc.attributes.to_vec(),
            block: vec![0; UNIFORM_STRIDE as usize],
        });
        for uniform in desc.uniforms {
            self.uniform_slots.push(UniformSlot {
                program: id,
                name: uniform.name,
                offset: uniform.offset,
                kind: uniform.kind,
            });
        }
        tracing::debug!(label = desc.label, ?id, block_size, "program created");
        Ok(id)
    }

    /// Discard anything recorded since the last frame.
    pub fn begin_frame(&mut self) {
        self.pending.clear();
        self.staged_uniforms.clear();
        self.dropped_draws = 0;
    }

    /// Upload staged uniforms, replay recorded draws over a cleared surface
    /// and present. Returns the number of draws submitted.
    ///
    /// # Errors
    ///
    /// The surface error if the next texture cannot be acquired.
    pub fn end_frame(&mut self, clear: wgpu::Color) -> Result<usize, wgpu::SurfaceError> {
        if self.dropped_draws > 0 {
            tracing::warn!(
                dropped = self.dropped_draws,
                limit = MAX_DRAWS,
                "draws dropped this frame"
            );
        }
        if !self.staged_uniforms.is_empty() {
            self.queue
                .write_buffer(&self.uniform_buffer, 0, &self.staged_uniforms);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("segment_frame_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("segment_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &self.pending {
                let Some(program) = self.programs.get(draw.program.0 as usize) else {
                    continue;
                };
                pass.set_pipeline(&program.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[draw.uniform_offset]);
                for (slot, buffer) in draw.vertex_buffers.iter().enumerate() {
                    if let Some(Some(buffer)) = self.buffers.get(buffer.0 as usize) {
                        pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                    }
                }
                pass.draw(draw.first..draw.first + draw.count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        let submitted = self.pending.len();
        self.begin_frame();
        Ok(submitted)
    }

    /// Reconfigure the surface after a window resize. Zero sizes are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// The window this context presents to.
    pub fn window(&self) -> &winit::window::Window {
        &self.window
    }

    fn write_uniform(&mut self, location: UniformLocation, kind: UniformKind, bytes: &[u8]) {
        let Some(slot) = self.uniform_slots.get(location.0 as usize) else {
            tracing::warn!(?location, "unknown uniform location");
            return;
        };
        if Some(slot.program) != self.current_program || slot.kind != kind {
            tracing::warn!(?location, name = slot.name, "uniform set outside its program -- ignored");
            return;
        }
        let offset = slot.offset;
        if let Some(program) = self.programs.get_mut(slot.program.0 as usize) {
            program.block[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
    }
}

impl GraphicsContext for WgpuContext {
    fn use_program(&mut self, program: ProgramId) -> Result<(), RenderError> {
        if self.programs.get(program.0 as usize).is_none() {
            return Err(RenderError::InvalidProgram(program));
        }
        self.current_program = Some(program);
        Ok(())
    }

    fn attrib_location(&self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        self.programs
            .get(program.0 as usize)?
            .attributes
            .iter()
            .position(|a| a.name == name)
            .map(|i| AttribLocation(i as u32))
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.uniform_slots
            .iter()
            .position(|slot| slot.program == program && slot.name == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn create_buffer(&mut self) -> Result<BufferId, RenderError> {
        self.buffers.push(None);
        Ok(BufferId(self.buffers.len() as u32 - 1))
    }

    fn upload_static(&mut self, buffer: BufferId, data: &[f32]) -> Result<(), RenderError> {
        let slot = self
            .buffers
            .get_mut(buffer.0 as usize)
            .ok_or(RenderError::UnknownBuffer(buffer))?;
        *slot = Some(
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("static_vertex_buffer"),
                    contents: bytemuck::cast_slice(data),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
        );
        Ok(())
    }

    fn bind_vertex_buffer(
        &mut self,
        buffer: BufferId,
        attrib: AttribLocation,
        components: u32,
    ) -> Result<(), RenderError> {
        if !matches!(self.buffers.get(buffer.0 as usize), Some(Some(_))) {
            return Err(RenderError::UnknownBuffer(buffer));
        }
        let declared = self
            .current_program
            .and_then(|p| self.programs.get(p.0 as usize))
            .and_then(|p| p.attributes.get(attrib.0 as usize));
        if let Some(declared) = declared {
            if declared.components != components {
                return Err(RenderError::AttributeLayout {
                    attrib,
                    expected: declared.components,
                    actual: components,
                });
            }
        }
        self.vertex_bindings.insert(attrib, buffer);
        Ok(())
    }

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: [f32; 3]) {
        self.write_uniform(location, UniformKind::Vec3, bytemuck::cast_slice(&value));
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]) {
        self.write_uniform(location, UniformKind::Mat4, bytemuck::cast_slice(value));
    }

    fn draw_triangle_strip(&mut self, first: u32, count: u32) {
        let Some(id) = self.current_program else {
            self.dropped_draws += 1;
            return;
        };
        if self.pending.len() >= MAX_DRAWS {
            self.dropped_draws += 1;
            return;
        }
        let Some(program) = self.programs.get(id.0 as usize) else {
            self.dropped_draws += 1;
            return;
        };
        let vertex_buffers: Option<Vec<BufferId>> = (0..program.attributes.len())
            .map(|i| self.vertex_bindings.get(&AttribLocation(i as u32)).copied())
            .collect();
        let Some(vertex_buffers) = vertex_buffers else {
            self.dropped_draws += 1;
            return;
        };

        let uniform_offset = (self.pending.len() as u64 * UNIFORM_STRIDE) as u32;
        self.staged_uniforms.extend_from_slice(&program.block);
        self.pending.push(PendingDraw {
            program: id,
            vertex_buffers,
            first,
            count,
            uniform_offset,
        });
    }
}

/// Vertex format for an attribute of `components` floats, or the rejected
/// count.
fn vertex_format(components: u32) -> Result<wgpu::VertexFormat, u32> {
    match components {
        1 => Ok(wgpu::VertexFormat::Float32),
        2 => Ok(wgpu::VertexFormat::Float32x2),
        3 => Ok(wgpu::VertexFormat::Float32x3),
        4 => Ok(wgpu::VertexFormat::Float32x4),
        other => Err(other),
    }
}
