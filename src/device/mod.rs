//! Graphics Device Abstraction
//!
//! The rest of the harness talks to the GPU through the [`GraphicsDevice`]
//! trait: a small set of primitive operations (compile, link, upload, bind,
//! draw, present) over opaque handles. Two implementations exist:
//!
//! - [`WgpuDevice`](context::WgpuDevice) renders through wgpu onto a winit
//!   surface.
//! - [`NullDevice`](null::NullDevice) records every call in memory so scenes
//!   and resource wrappers can run headless in tests and CI.
//!
//! Handles are plain ids minted by the device. They carry no lifetime or
//! liveness information; the resource wrappers in [`crate::resources`] are
//! responsible for releasing each handle exactly once.

mod context;
mod mipmap;
mod null;
mod settings;

pub use context::WgpuDevice;
pub use null::{NullDevice, RecordedDraw, RecordedFrame};
pub use settings::RenderSettings;

use core::fmt;
use core::ops::Range;

use glam::{Mat4, Vec3};

use crate::errors::Result;

// ============================================================================
// Handles
// ============================================================================

/// Identifies a compiled shader stage until it is consumed by a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub(crate) u64);

/// Identifies a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub(crate) u64);

/// Identifies a 2D texture living on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// Identifies an immutable vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// A resolved uniform location inside one program's interface.
///
/// Slots are only meaningful for the program they were resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformSlot(pub(crate) u32);

// ============================================================================
// Shader interface description
// ============================================================================

/// The two programmable stages a program links from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Data kind of one declared uniform.
///
/// `Sampler2D` is special: it does not occupy space in the uniform block.
/// Writing an `Int` to it selects which texture unit the program samples
/// from at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Int,
    Float,
    Vec3,
    Mat4,
    Sampler2D,
}

/// One named uniform in a program's interface.
#[derive(Debug, Clone, Copy)]
pub struct UniformDecl {
    pub name: &'static str,
    pub kind: UniformKind,
}

/// A value written through [`GraphicsDevice::set_uniform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

/// Everything a device needs to link two compiled stages into a program.
///
/// `uniforms` declares the program's uniform interface in the same order as
/// the fields of the shader's uniform block; the device derives each
/// member's byte offset from that order (std140-style: mat4 is 64 bytes,
/// vec3 occupies 16, scalars 4).
pub struct ProgramDesc<'a> {
    pub label: &'a str,
    pub vertex: ShaderHandle,
    pub fragment: ShaderHandle,
    pub vertex_layout: &'a VertexLayout,
    pub uniforms: &'a [UniformDecl],
}

// ============================================================================
// Vertex & texture descriptions
// ============================================================================

/// One vertex attribute: where it sits in the stride and which shader
/// location reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttribute {
    pub format: wgpu::VertexFormat,
    pub offset: u64,
    pub shader_location: u32,
}

/// Immutable description of a vertex buffer's memory layout.
///
/// Built once next to the vertex data and shared with program creation, so
/// the pipeline and the buffer can never disagree about the stride.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

/// Description of a 2D RGBA8 texture allocation.
///
/// `mip_level_count` covers the full chain when mipmaps are wanted; level 0
/// is filled by [`GraphicsDevice::upload_texture`] and the remaining levels
/// by [`GraphicsDevice::generate_mipmaps`].
#[derive(Debug, Clone, Copy)]
pub struct TextureDesc<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub mip_level_count: u32,
}

// ============================================================================
// The device trait
// ============================================================================

/// Primitive GPU operations, in dependency order of a frame.
///
/// All operations are synchronous from the caller's point of view. Handles
/// returned by `create_*`/`compile_*`/`link_*` stay valid until the matching
/// `delete_*`; using a deleted handle is a caller bug and devices are free to
/// panic on it.
pub trait GraphicsDevice {
    // --- shaders & programs -------------------------------------------------

    /// Compiles one stage. The source language is WGSL.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str, label: &str) -> Result<ShaderHandle>;

    /// Links two compiled stages into a program.
    fn link_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle>;

    fn delete_shader(&mut self, shader: ShaderHandle);

    fn delete_program(&mut self, program: ProgramHandle);

    /// Makes `program` current for subsequent uniform writes and draws.
    /// Activating the already-current program is a no-op.
    fn use_program(&mut self, program: ProgramHandle);

    /// Resolves a uniform name against the program's declared interface.
    /// Returns `None` for names the program does not declare.
    fn uniform_slot(&mut self, program: ProgramHandle, name: &str) -> Option<UniformSlot>;

    /// Writes one uniform value. Affects only `program`'s state.
    fn set_uniform(&mut self, program: ProgramHandle, slot: UniformSlot, value: UniformValue);

    // --- textures -----------------------------------------------------------

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> TextureHandle;

    /// Fills mip level 0 with tightly packed RGBA8 rows. Row order is the
    /// caller's concern; decoded image files arrive already flipped to the
    /// sampling convention the shaders assume.
    fn upload_texture(&mut self, texture: TextureHandle, pixels: &[u8]);

    /// Derives every mip level below 0. Must run after `upload_texture`.
    fn generate_mipmaps(&mut self, texture: TextureHandle);

    /// Binds `texture` to a texture unit for the next draws.
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    fn delete_texture(&mut self, texture: TextureHandle);

    // --- buffers & draws ----------------------------------------------------

    fn create_vertex_buffer(&mut self, contents: &[u8], label: &str) -> BufferHandle;

    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Draws `vertices` from `buffer` as a non-indexed triangle list with the
    /// current program and its current uniform state.
    fn draw(&mut self, buffer: BufferHandle, vertices: Range<u32>);

    // --- frame & fixed state ------------------------------------------------

    fn set_clear_color(&mut self, color: wgpu::Color);

    /// Enables or disables depth testing for programs linked afterwards.
    fn set_depth_test(&mut self, enabled: bool);

    /// Resizes the drawable area. Zero dimensions are ignored.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Opens a new frame; the color and depth targets are cleared when the
    /// frame is presented.
    fn begin_frame(&mut self);

    /// Submits every draw recorded since `begin_frame` and presents.
    fn present(&mut self);
}
