//! Headless Recording Device
//!
//! [`NullDevice`] implements [`GraphicsDevice`] without touching a GPU. Every
//! call is validated against the device protocol and recorded, so integration
//! tests can load scenes, tick them, and then assert on the exact stream of
//! draws, uniform writes and resource lifetimes that reached the device.
//!
//! Protocol misuse (double delete, draw without an active program, mipmap
//! generation before upload, ...) does not panic; it is appended to
//! [`NullDevice::violations`] so a test failure names the misuse instead of
//! dying mid-frame.

use core::ops::Range;

use rustc_hash::FxHashMap;

use crate::errors::{RenderError, Result};

use super::{
    BufferHandle, GraphicsDevice, ProgramDesc, ProgramHandle, ShaderHandle, ShaderStage,
    TextureDesc, TextureHandle, UniformDecl, UniformKind, UniformSlot, UniformValue,
};

// ============================================================================
// Recorded frame data
// ============================================================================

/// One draw call as the device saw it, uniforms snapshotted at submission.
#[derive(Debug, Clone)]
pub struct RecordedDraw {
    pub program: ProgramHandle,
    pub buffer: BufferHandle,
    pub vertices: Range<u32>,
    /// Value of every block uniform at the moment of the draw, by name.
    pub uniforms: FxHashMap<&'static str, UniformValue>,
    /// Texture resolved through the program's sampler unit, if any.
    pub texture: Option<TextureHandle>,
}

/// Everything submitted between one `begin_frame` and its `present`.
#[derive(Debug, Clone)]
pub struct RecordedFrame {
    pub clear_color: wgpu::Color,
    pub draws: Vec<RecordedDraw>,
}

// ============================================================================
// Internal tables
// ============================================================================

struct NullProgram {
    label: String,
    uniforms: Vec<UniformDecl>,
    values: FxHashMap<&'static str, UniformValue>,
    sampler_unit: Option<u32>,
}

struct NullTexture {
    width: u32,
    height: u32,
    mip_level_count: u32,
    uploaded: bool,
    mipmaps_generated: bool,
}

struct NullBuffer {
    len: usize,
}

// ============================================================================
// NullDevice
// ============================================================================

/// In-memory [`GraphicsDevice`] for tests and CI.
pub struct NullDevice {
    next_id: u64,

    shaders: FxHashMap<u64, ShaderStage>,
    programs: FxHashMap<u64, NullProgram>,
    textures: FxHashMap<u64, NullTexture>,
    buffers: FxHashMap<u64, NullBuffer>,

    active_program: Option<ProgramHandle>,
    program_switches: usize,
    bound_units: FxHashMap<u32, TextureHandle>,

    clear_color: wgpu::Color,
    depth_test: bool,
    viewport: (u32, u32),

    current_frame: Option<RecordedFrame>,
    frames: Vec<RecordedFrame>,

    violations: Vec<String>,
    forced_compile_error: Option<(ShaderStage, String)>,
    forced_link_error: Option<String>,
}

impl Default for NullDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl NullDevice {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            shaders: FxHashMap::default(),
            programs: FxHashMap::default(),
            textures: FxHashMap::default(),
            buffers: FxHashMap::default(),
            active_program: None,
            program_switches: 0,
            bound_units: FxHashMap::default(),
            clear_color: wgpu::Color::BLACK,
            depth_test: false,
            viewport: (0, 0),
            current_frame: None,
            frames: Vec::new(),
            violations: Vec::new(),
            forced_compile_error: None,
            forced_link_error: None,
        }
    }

    fn mint_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn violation(&mut self, message: String) {
        self.violations.push(message);
    }

    // --- fault injection ----------------------------------------------------

    /// Makes the next `compile_shader` call for `stage` fail with `log`.
    pub fn fail_next_compile(&mut self, stage: ShaderStage, log: impl Into<String>) {
        self.forced_compile_error = Some((stage, log.into()));
    }

    /// Makes the next `link_program` call fail with `log`.
    pub fn fail_next_link(&mut self, log: impl Into<String>) {
        self.forced_link_error = Some(log.into());
    }

    // --- inspection ---------------------------------------------------------

    /// Protocol misuses observed so far. A healthy run leaves this empty.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Frames presented so far, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }

    #[must_use]
    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    #[must_use]
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn is_program_alive(&self, program: ProgramHandle) -> bool {
        self.programs.contains_key(&program.0)
    }

    #[must_use]
    pub fn is_texture_alive(&self, texture: TextureHandle) -> bool {
        self.textures.contains_key(&texture.0)
    }

    #[must_use]
    pub fn is_buffer_alive(&self, buffer: BufferHandle) -> bool {
        self.buffers.contains_key(&buffer.0)
    }

    /// Byte length of a vertex buffer's contents.
    #[must_use]
    pub fn buffer_len(&self, buffer: BufferHandle) -> Option<usize> {
        self.buffers.get(&buffer.0).map(|b| b.len)
    }

    /// How many times the active program actually changed.
    #[must_use]
    pub fn program_switch_count(&self) -> usize {
        self.program_switches
    }

    /// Current value of a block uniform, by name.
    #[must_use]
    pub fn uniform_value(&self, program: ProgramHandle, name: &str) -> Option<UniformValue> {
        let record = self.programs.get(&program.0)?;
        record.values.get(name).copied()
    }

    /// Texture unit the program's sampler reads from, once assigned.
    #[must_use]
    pub fn sampler_unit(&self, program: ProgramHandle) -> Option<u32> {
        self.programs.get(&program.0)?.sampler_unit
    }

    #[must_use]
    pub fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.bound_units.get(&unit).copied()
    }

    #[must_use]
    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&texture.0).map(|t| (t.width, t.height))
    }

    #[must_use]
    pub fn texture_mip_count(&self, texture: TextureHandle) -> Option<u32> {
        self.textures.get(&texture.0).map(|t| t.mip_level_count)
    }

    #[must_use]
    pub fn texture_has_mipmaps(&self, texture: TextureHandle) -> bool {
        self.textures
            .get(&texture.0)
            .is_some_and(|t| t.mipmaps_generated)
    }

    #[must_use]
    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    #[must_use]
    pub fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

impl GraphicsDevice for NullDevice {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str, label: &str) -> Result<ShaderHandle> {
        if let Some((failing_stage, log)) = self.forced_compile_error.take() {
            if failing_stage == stage {
                return Err(RenderError::ShaderCompile { stage, log });
            }
            self.forced_compile_error = Some((failing_stage, log));
        }
        if source.trim().is_empty() {
            return Err(RenderError::ShaderCompile {
                stage,
                log: format!("{label}: empty shader source"),
            });
        }
        let id = self.mint_id();
        self.shaders.insert(id, stage);
        Ok(ShaderHandle(id))
    }

    fn link_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle> {
        if let Some(log) = self.forced_link_error.take() {
            return Err(RenderError::ShaderLink { log });
        }
        if !self.shaders.contains_key(&desc.vertex.0) || !self.shaders.contains_key(&desc.fragment.0) {
            self.violation(format!("link_program({}): stage handle is not alive", desc.label));
        }
        let id = self.mint_id();
        self.programs.insert(
            id,
            NullProgram {
                label: desc.label.to_string(),
                uniforms: desc.uniforms.to_vec(),
                values: FxHashMap::default(),
                sampler_unit: None,
            },
        );
        Ok(ProgramHandle(id))
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.remove(&shader.0).is_none() {
            self.violation(format!("delete_shader on dead handle {shader:?}"));
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program.0).is_none() {
            self.violation(format!("delete_program on dead handle {program:?}"));
        }
        if self.active_program == Some(program) {
            self.active_program = None;
        }
    }

    fn use_program(&mut self, program: ProgramHandle) {
        if !self.programs.contains_key(&program.0) {
            self.violation(format!("use_program on dead handle {program:?}"));
            return;
        }
        if self.active_program != Some(program) {
            self.active_program = Some(program);
            self.program_switches += 1;
        }
    }

    fn uniform_slot(&mut self, program: ProgramHandle, name: &str) -> Option<UniformSlot> {
        let record = self.programs.get(&program.0)?;
        record
            .uniforms
            .iter()
            .position(|decl| decl.name == name)
            .map(|index| UniformSlot(index as u32))
    }

    fn set_uniform(&mut self, program: ProgramHandle, slot: UniformSlot, value: UniformValue) {
        let Some(record) = self.programs.get_mut(&program.0) else {
            self.violation(format!("set_uniform on dead handle {program:?}"));
            return;
        };
        let Some(decl) = record.uniforms.get(slot.0 as usize).copied() else {
            let message = format!(
                "set_uniform: slot {} out of range for '{}'",
                slot.0, record.label
            );
            self.violation(message);
            return;
        };
        let matches = matches!(
            (decl.kind, &value),
            (UniformKind::Int | UniformKind::Sampler2D, UniformValue::Int(_))
                | (UniformKind::Float, UniformValue::Float(_))
                | (UniformKind::Vec3, UniformValue::Vec3(_))
                | (UniformKind::Mat4, UniformValue::Mat4(_))
        );
        if !matches {
            self.violation(format!(
                "set_uniform: {:?} written to '{}' declared as {:?}",
                value, decl.name, decl.kind
            ));
            return;
        }
        if decl.kind == UniformKind::Sampler2D {
            if let UniformValue::Int(unit) = value {
                record.sampler_unit = Some(unit as u32);
            }
        } else {
            record.values.insert(decl.name, value);
        }
    }

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> TextureHandle {
        if desc.width == 0 || desc.height == 0 {
            self.violation(format!("create_texture({}): zero-sized texture", desc.label));
        }
        let id = self.mint_id();
        self.textures.insert(
            id,
            NullTexture {
                width: desc.width,
                height: desc.height,
                mip_level_count: desc.mip_level_count,
                uploaded: false,
                mipmaps_generated: false,
            },
        );
        TextureHandle(id)
    }

    fn upload_texture(&mut self, texture: TextureHandle, pixels: &[u8]) {
        let Some(record) = self.textures.get_mut(&texture.0) else {
            self.violation(format!("upload_texture on dead handle {texture:?}"));
            return;
        };
        let expected = record.width as usize * record.height as usize * 4;
        if pixels.len() != expected {
            let message = format!(
                "upload_texture: {} bytes for a {}x{} RGBA8 texture (expected {expected})",
                pixels.len(),
                record.width,
                record.height
            );
            self.violation(message);
            return;
        }
        record.uploaded = true;
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) {
        let Some(record) = self.textures.get_mut(&texture.0) else {
            self.violation(format!("generate_mipmaps on dead handle {texture:?}"));
            return;
        };
        if !record.uploaded {
            self.violation(format!("generate_mipmaps before upload on {texture:?}"));
            return;
        }
        record.mipmaps_generated = true;
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        if !self.textures.contains_key(&texture.0) {
            self.violation(format!("bind_texture on dead handle {texture:?}"));
            return;
        }
        self.bound_units.insert(unit, texture);
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture.0).is_none() {
            self.violation(format!("delete_texture on dead handle {texture:?}"));
        }
        self.bound_units.retain(|_, bound| *bound != texture);
    }

    fn create_vertex_buffer(&mut self, contents: &[u8], _label: &str) -> BufferHandle {
        let id = self.mint_id();
        self.buffers.insert(id, NullBuffer { len: contents.len() });
        BufferHandle(id)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer.0).is_none() {
            self.violation(format!("delete_buffer on dead handle {buffer:?}"));
        }
    }

    fn draw(&mut self, buffer: BufferHandle, vertices: Range<u32>) {
        let Some(program) = self.active_program else {
            self.violation("draw without an active program".to_string());
            return;
        };
        if !self.buffers.contains_key(&buffer.0) {
            self.violation(format!("draw with dead buffer {buffer:?}"));
            return;
        }
        let Some(record) = self.programs.get(&program.0) else {
            self.violation(format!("draw with dead program {program:?}"));
            return;
        };
        let texture = record
            .sampler_unit
            .and_then(|unit| self.bound_units.get(&unit).copied());
        let draw = RecordedDraw {
            program,
            buffer,
            vertices,
            uniforms: record.values.clone(),
            texture,
        };
        match self.current_frame.as_mut() {
            Some(frame) => frame.draws.push(draw),
            None => self.violation("draw outside begin_frame/present".to_string()),
        }
    }

    fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
    }

    fn begin_frame(&mut self) {
        if self.current_frame.is_some() {
            self.violation("begin_frame while a frame was already open".to_string());
        }
        self.current_frame = Some(RecordedFrame {
            clear_color: self.clear_color,
            draws: Vec::new(),
        });
    }

    fn present(&mut self) {
        match self.current_frame.take() {
            Some(frame) => self.frames.push(frame),
            None => self.violation("present without begin_frame".to_string()),
        }
    }
}
