//! wgpu Device
//!
//! [`WgpuDevice`] is the real [`GraphicsDevice`]: it owns the core GPU handles
//! (device, queue, surface, config), the depth buffer, and the id-keyed tables
//! of shader modules, pipelines, textures and vertex buffers the handle types
//! point into.
//!
//! Draws recorded between `begin_frame` and `present` are replayed inside a
//! single clear-load render pass. Per-draw uniform blocks are packed into one
//! shared arena buffer and addressed with dynamic offsets, so a frame costs
//! one buffer write and one pass regardless of draw count.

use core::ops::Range;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use rustc_hash::FxHashMap;

use crate::errors::{RenderError, Result};

use super::mipmap::MipmapGenerator;
use super::settings::RenderSettings;
use super::{
    BufferHandle, GraphicsDevice, ProgramDesc, ProgramHandle, ShaderHandle, ShaderStage,
    TextureDesc, TextureHandle, UniformDecl, UniformKind, UniformSlot, UniformValue,
};

/// Capacity of the per-frame uniform arena. 256 draws at the usual 256-byte
/// dynamic-offset alignment.
const UNIFORM_ARENA_SIZE: u64 = 64 * 1024;

/// All textures the harness creates are plain RGBA8.
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

// ============================================================================
// Internal records
// ============================================================================

struct ShaderRecord {
    module: wgpu::ShaderModule,
    stage: ShaderStage,
}

/// One declared uniform with its byte offset inside the program's block.
/// Samplers occupy no block space and carry `offset: None`.
struct UniformMember {
    decl: UniformDecl,
    offset: Option<u32>,
}

struct ProgramRecord {
    pipeline: wgpu::RenderPipeline,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: Option<wgpu::BindGroupLayout>,
    members: Vec<UniformMember>,
    /// CPU staging copy of the uniform block, snapshotted per draw.
    block: Vec<u8>,
    sampler_unit: Option<u32>,
    label: String,
}

struct TextureRecord {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    mip_level_count: u32,
}

struct FrameDraw {
    program: u64,
    buffer: u64,
    vertices: Range<u32>,
    uniform_offset: u32,
    texture: Option<u64>,
}

// ============================================================================
// WgpuDevice
// ============================================================================

/// The wgpu-backed [`GraphicsDevice`].
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,

    depth_format: wgpu::TextureFormat,
    depth_texture_view: wgpu::TextureView,

    clear_color: wgpu::Color,
    depth_test: bool,

    next_id: u64,
    shaders: FxHashMap<u64, ShaderRecord>,
    programs: FxHashMap<u64, ProgramRecord>,
    textures: FxHashMap<u64, TextureRecord>,
    buffers: FxHashMap<u64, wgpu::Buffer>,

    active_program: Option<ProgramHandle>,
    bound_units: FxHashMap<u32, TextureHandle>,

    /// Shared dynamic-offset uniform buffer, rewritten once per frame.
    uniform_buffer: wgpu::Buffer,
    uniform_alignment: u32,
    uniform_arena: Vec<u8>,
    frame_draws: Vec<FrameDraw>,
    frame_open: bool,

    default_sampler: wgpu::Sampler,
    /// (program id, texture id) -> group 1 bind group.
    texture_bind_groups: FxHashMap<(u64, u64), wgpu::BindGroup>,
    mipmap_generator: MipmapGenerator,
}

impl WgpuDevice {
    /// Brings up adapter, device, queue and surface for `window`.
    pub async fn new<W>(window: W, settings: &RenderSettings, width: u32, height: u32) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::SurfaceCreateFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width, height)
            .ok_or_else(|| {
                RenderError::SurfaceCreateFailed("Surface not supported by adapter".to_string())
            })?;
        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        let depth_texture_view = Self::create_depth_texture(&device, &config, settings.depth_format);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Arena"),
            size: UNIFORM_ARENA_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment;

        let default_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Default Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let mipmap_generator = MipmapGenerator::new(&device);

        log::info!(
            "GPU device ready: {} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_format: settings.depth_format,
            depth_texture_view,
            clear_color: wgpu::Color::BLACK,
            depth_test: true,
            next_id: 1,
            shaders: FxHashMap::default(),
            programs: FxHashMap::default(),
            textures: FxHashMap::default(),
            buffers: FxHashMap::default(),
            active_program: None,
            bound_units: FxHashMap::default(),
            uniform_buffer,
            uniform_alignment,
            uniform_arena: Vec::new(),
            frame_draws: Vec::new(),
            frame_open: false,
            default_sampler,
            texture_bind_groups: FxHashMap::default(),
            mipmap_generator,
        })
    }

    /// Returns the current surface dimensions.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn mint_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        format: wgpu::TextureFormat,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        };
        let texture = device.create_texture(&desc);
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Lays out the block members of a uniform interface: mat4 is 64 bytes at
    /// 16-byte alignment, vec3 occupies 16, scalars 4, matching the WGSL
    /// struct written field-by-field in declaration order.
    fn block_layout(decls: &[UniformDecl]) -> (Vec<UniformMember>, u32) {
        let mut offset = 0u32;
        let mut members = Vec::with_capacity(decls.len());
        for decl in decls {
            let slot_size = match decl.kind {
                UniformKind::Mat4 => {
                    offset = offset.next_multiple_of(16);
                    Some(64)
                }
                UniformKind::Vec3 => {
                    offset = offset.next_multiple_of(16);
                    Some(16)
                }
                UniformKind::Int | UniformKind::Float => Some(4),
                UniformKind::Sampler2D => None,
            };
            match slot_size {
                Some(size) => {
                    members.push(UniformMember {
                        decl: *decl,
                        offset: Some(offset),
                    });
                    offset += size;
                }
                None => members.push(UniformMember {
                    decl: *decl,
                    offset: None,
                }),
            }
        }
        (members, offset.next_multiple_of(16))
    }

    /// Creates the group-1 bind group for every (program, texture) pair drawn
    /// this frame that does not have one cached yet.
    fn prepare_texture_bind_groups(&mut self, draws: &[FrameDraw]) {
        for draw in draws {
            let Some(texture_id) = draw.texture else {
                continue;
            };
            let key = (draw.program, texture_id);
            if self.texture_bind_groups.contains_key(&key) {
                continue;
            }
            let (Some(program), Some(texture)) =
                (self.programs.get(&draw.program), self.textures.get(&texture_id))
            else {
                continue;
            };
            let Some(layout) = program.texture_layout.as_ref() else {
                continue;
            };
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} Texture", program.label)),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.default_sampler),
                    },
                ],
            });
            self.texture_bind_groups.insert(key, bind_group);
        }
    }
}

impl GraphicsDevice for WgpuDevice {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str, label: &str) -> Result<ShaderHandle> {
        let error_scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(error) = pollster::block_on(error_scope.pop()) {
            return Err(RenderError::ShaderCompile {
                stage,
                log: error.to_string(),
            });
        }
        let id = self.mint_id();
        self.shaders.insert(id, ShaderRecord { module, stage });
        Ok(ShaderHandle(id))
    }

    fn link_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle> {
        let (Some(vertex), Some(fragment)) = (
            self.shaders.get(&desc.vertex.0),
            self.shaders.get(&desc.fragment.0),
        ) else {
            return Err(RenderError::ShaderLink {
                log: format!("{}: stage handle is not alive", desc.label),
            });
        };
        debug_assert_eq!(vertex.stage, ShaderStage::Vertex);
        debug_assert_eq!(fragment.stage, ShaderStage::Fragment);

        let (members, block_size) = Self::block_layout(desc.uniforms);
        // Group 0 always exists; a program without block uniforms still gets
        // a 16-byte slot.
        let block_size = block_size.max(16);
        let has_sampler = members.iter().any(|m| m.decl.kind == UniformKind::Sampler2D);

        let error_scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let uniform_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{} Uniform Layout", desc.label)),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(u64::from(block_size)),
                    },
                    count: None,
                }],
            });

        let texture_layout = has_sampler.then(|| {
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{} Texture Layout", desc.label)),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                })
        });

        let mut bind_group_layouts: Vec<&wgpu::BindGroupLayout> = vec![&uniform_layout];
        if let Some(layout) = texture_layout.as_ref() {
            bind_group_layouts.push(layout);
        }
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} Pipeline Layout", desc.label)),
                bind_group_layouts: &bind_group_layouts,
                immediate_size: 0,
            });

        let attributes: Vec<wgpu::VertexAttribute> = desc
            .vertex_layout
            .attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: a.format,
                offset: a.offset,
                shader_location: a.shader_location,
            })
            .collect();
        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: desc.vertex_layout.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some("vs_main"),
                    buffers: &vertex_buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: self.depth_format,
                    depth_write_enabled: self.depth_test,
                    depth_compare: if self.depth_test {
                        wgpu::CompareFunction::Less
                    } else {
                        wgpu::CompareFunction::Always
                    },
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        if let Some(error) = pollster::block_on(error_scope.pop()) {
            return Err(RenderError::ShaderLink {
                log: error.to_string(),
            });
        }

        let uniform_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Uniforms", desc.label)),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &self.uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(u64::from(block_size)),
                }),
            }],
        });

        let id = self.mint_id();
        self.programs.insert(
            id,
            ProgramRecord {
                pipeline,
                uniform_bind_group,
                texture_layout,
                members,
                block: vec![0u8; block_size as usize],
                sampler_unit: None,
                label: desc.label.to_string(),
            },
        );
        Ok(ProgramHandle(id))
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader.0);
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program.0);
        self.texture_bind_groups.retain(|(p, _), _| *p != program.0);
        if self.active_program == Some(program) {
            self.active_program = None;
        }
    }

    fn use_program(&mut self, program: ProgramHandle) {
        if self.active_program == Some(program) {
            return;
        }
        if self.programs.contains_key(&program.0) {
            self.active_program = Some(program);
        } else {
            log::error!("use_program on dead handle {program:?}");
        }
    }

    fn uniform_slot(&mut self, program: ProgramHandle, name: &str) -> Option<UniformSlot> {
        let record = self.programs.get(&program.0)?;
        record
            .members
            .iter()
            .position(|m| m.decl.name == name)
            .map(|index| UniformSlot(index as u32))
    }

    fn set_uniform(&mut self, program: ProgramHandle, slot: UniformSlot, value: UniformValue) {
        let Some(record) = self.programs.get_mut(&program.0) else {
            return;
        };
        let Some(member) = record.members.get(slot.0 as usize) else {
            debug_assert!(false, "uniform slot {} out of range", slot.0);
            return;
        };
        if member.decl.kind == UniformKind::Sampler2D {
            if let UniformValue::Int(unit) = value {
                record.sampler_unit = Some(unit as u32);
            }
            return;
        }
        let Some(offset) = member.offset.map(|o| o as usize) else {
            return;
        };
        match (member.decl.kind, value) {
            (UniformKind::Int, UniformValue::Int(v)) => {
                record.block[offset..offset + 4].copy_from_slice(bytemuck::bytes_of(&v));
            }
            (UniformKind::Float, UniformValue::Float(v)) => {
                record.block[offset..offset + 4].copy_from_slice(bytemuck::bytes_of(&v));
            }
            (UniformKind::Vec3, UniformValue::Vec3(v)) => {
                record.block[offset..offset + 12].copy_from_slice(bytemuck::bytes_of(&v));
            }
            (UniformKind::Mat4, UniformValue::Mat4(v)) => {
                record.block[offset..offset + 64].copy_from_slice(bytemuck::bytes_of(&v));
            }
            (kind, value) => {
                debug_assert!(false, "{value:?} written to uniform declared as {kind:?}");
            }
        }
    }

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> TextureHandle {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: desc.mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = self.mint_id();
        self.textures.insert(
            id,
            TextureRecord {
                texture,
                view,
                width: desc.width,
                height: desc.height,
                mip_level_count: desc.mip_level_count,
            },
        );
        TextureHandle(id)
    }

    fn upload_texture(&mut self, texture: TextureHandle, pixels: &[u8]) {
        let Some(record) = self.textures.get(&texture.0) else {
            log::error!("upload_texture on dead handle {texture:?}");
            return;
        };
        debug_assert_eq!(pixels.len(), record.width as usize * record.height as usize * 4);
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &record.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(record.width * 4),
                rows_per_image: Some(record.height),
            },
            wgpu::Extent3d {
                width: record.width,
                height: record.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) {
        let Some(record) = self.textures.get(&texture.0) else {
            log::error!("generate_mipmaps on dead handle {texture:?}");
            return;
        };
        if record.mip_level_count < 2 {
            return;
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mipmap Encoder"),
            });
        self.mipmap_generator
            .generate(&self.device, &mut encoder, &record.texture, record.mip_level_count);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        if self.textures.contains_key(&texture.0) {
            self.bound_units.insert(unit, texture);
        } else {
            log::error!("bind_texture on dead handle {texture:?}");
        }
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture.0);
        self.texture_bind_groups.retain(|(_, t), _| *t != texture.0);
        self.bound_units.retain(|_, bound| *bound != texture);
    }

    fn create_vertex_buffer(&mut self, contents: &[u8], label: &str) -> BufferHandle {
        use wgpu::util::DeviceExt;
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let id = self.mint_id();
        self.buffers.insert(id, buffer);
        BufferHandle(id)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if let Some(buffer) = self.buffers.remove(&buffer.0) {
            buffer.destroy();
        }
    }

    fn draw(&mut self, buffer: BufferHandle, vertices: Range<u32>) {
        if !self.frame_open {
            log::warn!("draw outside begin_frame/present, skipped");
            return;
        }
        let Some(program) = self.active_program else {
            log::warn!("draw without an active program, skipped");
            return;
        };
        let Some(record) = self.programs.get(&program.0) else {
            return;
        };

        let offset = self.uniform_arena.len();
        assert!(
            offset + record.block.len() <= UNIFORM_ARENA_SIZE as usize,
            "per-frame uniform arena overflow"
        );
        self.uniform_arena.extend_from_slice(&record.block);
        let aligned = self
            .uniform_arena
            .len()
            .next_multiple_of(self.uniform_alignment as usize);
        self.uniform_arena.resize(aligned, 0);

        let texture = record
            .sampler_unit
            .and_then(|unit| self.bound_units.get(&unit))
            .map(|t| t.0);
        self.frame_draws.push(FrameDraw {
            program: program.0,
            buffer: buffer.0,
            vertices,
            uniform_offset: offset as u32,
            texture,
        });
    }

    fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture_view =
                Self::create_depth_texture(&self.device, &self.config, self.depth_format);
        }
    }

    fn begin_frame(&mut self) {
        self.frame_open = true;
        self.frame_draws.clear();
        self.uniform_arena.clear();
    }

    fn present(&mut self) {
        if !self.frame_open {
            log::warn!("present without begin_frame, skipped");
            return;
        }
        self.frame_open = false;

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) => return, // Resize is handled by the event loop
            Err(e) => {
                log::error!("dropped frame: {e:?}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draws = std::mem::take(&mut self.frame_draws);
        self.prepare_texture_bind_groups(&draws);
        if !self.uniform_arena.is_empty() {
            self.queue
                .write_buffer(&self.uniform_buffer, 0, &self.uniform_arena);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &draws {
                let Some(program) = self.programs.get(&draw.program) else {
                    continue;
                };
                let Some(buffer) = self.buffers.get(&draw.buffer) else {
                    continue;
                };
                pass.set_pipeline(&program.pipeline);
                pass.set_bind_group(0, &program.uniform_bind_group, &[draw.uniform_offset]);
                if let Some(texture_id) = draw.texture {
                    if let Some(bind_group) = self.texture_bind_groups.get(&(draw.program, texture_id)) {
                        pass.set_bind_group(1, bind_group, &[]);
                    }
                }
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(draw.vertices.clone(), 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}
