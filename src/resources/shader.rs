//! Shader Program Wrapper
//!
//! [`ShaderProgram`] owns one linked program on the device. Construction
//! compiles the vertex and fragment sources independently so a failure names
//! the offending stage, links them, and deletes the per-stage objects right
//! away; only the linked program survives.
//!
//! Uniform setters go through a lazy name-to-slot cache: each name costs one
//! device lookup ever, and names the program does not declare are cached as
//! misses so later writes to them are free no-ops. Shaders evolve separately
//! from scene code, so a stale uniform name must degrade to nothing visible,
//! not a crash.

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;

use crate::device::{GraphicsDevice, ProgramDesc, ProgramHandle, ShaderStage, UniformDecl, UniformSlot, UniformValue, VertexLayout};
use crate::errors::Result;

#[derive(Debug)]
pub struct ShaderProgram {
    program: ProgramHandle,
    /// Name-to-slot cache. `None` records a miss, so unresolved names are
    /// looked up on the device exactly once.
    slots: FxHashMap<String, Option<UniformSlot>>,
    released: bool,
    label: String,
}

impl ShaderProgram {
    /// Compiles both stages and links them into a program.
    ///
    /// `uniforms` declares the program's uniform interface in block order;
    /// see [`ProgramDesc`]. Fails with
    /// [`ShaderCompile`](crate::errors::RenderError::ShaderCompile) or
    /// [`ShaderLink`](crate::errors::RenderError::ShaderLink), both fatal.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
        vertex_layout: &VertexLayout,
        uniforms: &[UniformDecl],
    ) -> Result<Self> {
        let vertex = device.compile_shader(ShaderStage::Vertex, vertex_source, label)?;
        let fragment = match device.compile_shader(ShaderStage::Fragment, fragment_source, label) {
            Ok(handle) => handle,
            Err(e) => {
                device.delete_shader(vertex);
                return Err(e);
            }
        };

        let linked = device.link_program(&ProgramDesc {
            label,
            vertex,
            fragment,
            vertex_layout,
            uniforms,
        });

        // Stage objects are dead weight once the link has been attempted,
        // successful or not.
        device.delete_shader(vertex);
        device.delete_shader(fragment);

        let program = linked?;
        log::debug!("shader program '{label}' linked");
        Ok(Self {
            program,
            slots: FxHashMap::default(),
            released: false,
            label: label.to_string(),
        })
    }

    /// Makes this program current. Binding the already-current program is
    /// free.
    pub fn bind(&self, device: &mut dyn GraphicsDevice) {
        assert!(!self.released, "shader program '{}' used after release", self.label);
        device.use_program(self.program);
    }

    pub fn set_int(&mut self, device: &mut dyn GraphicsDevice, name: &str, value: i32) {
        if let Some(slot) = self.slot(device, name) {
            device.set_uniform(self.program, slot, UniformValue::Int(value));
        }
    }

    pub fn set_float(&mut self, device: &mut dyn GraphicsDevice, name: &str, value: f32) {
        if let Some(slot) = self.slot(device, name) {
            device.set_uniform(self.program, slot, UniformValue::Float(value));
        }
    }

    pub fn set_vec3(&mut self, device: &mut dyn GraphicsDevice, name: &str, value: Vec3) {
        if let Some(slot) = self.slot(device, name) {
            device.set_uniform(self.program, slot, UniformValue::Vec3(value));
        }
    }

    pub fn set_mat4(&mut self, device: &mut dyn GraphicsDevice, name: &str, value: Mat4) {
        if let Some(slot) = self.slot(device, name) {
            device.set_uniform(self.program, slot, UniformValue::Mat4(value));
        }
    }

    /// Deletes the program on the device. Safe to call more than once; only
    /// the first call reaches the device.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if self.released {
            return;
        }
        self.released = true;
        device.delete_program(self.program);
        log::debug!("shader program '{}' released", self.label);
    }

    #[must_use]
    pub fn handle(&self) -> ProgramHandle {
        self.program
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    fn slot(&mut self, device: &mut dyn GraphicsDevice, name: &str) -> Option<UniformSlot> {
        assert!(!self.released, "shader program '{}' used after release", self.label);
        if let Some(cached) = self.slots.get(name) {
            return *cached;
        }
        let resolved = device.uniform_slot(self.program, name);
        if resolved.is_none() {
            log::debug!("uniform '{name}' not declared by program '{}', writes ignored", self.label);
        }
        self.slots.insert(name.to_string(), resolved);
        resolved
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if !self.released {
            log::warn!(
                "GPU resource leak: shader program '{}' dropped without release()",
                self.label
            );
        }
    }
}
