//! Cube Mesh
//!
//! [`CubeMesh`] owns the vertex buffer for one unit cube: 36 vertices, six
//! faces of two triangles each, no index buffer. Two mutually exclusive
//! vertex layouts exist, one per cube variant:
//!
//! - [`LitVertex`]: position + outward face normal, for the Phong-lit cube
//! - [`TexturedVertex`]: position + UV, for the textured cube
//!
//! Faces are emitted back, front, left, right, bottom, top, each quad
//! expanded into triangles with the corner pattern a-b-c, c-d-a. The mesh's
//! [`VertexLayout`] is built next to the data and handed to program creation,
//! so the pipeline and the buffer cannot disagree about the stride.

use bytemuck::{Pod, Zeroable};

use crate::device::{BufferHandle, GraphicsDevice, VertexAttribute, VertexLayout};

/// Vertex of the lit cube: position and outward unit normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LitVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Vertex of the textured cube: position and texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl LitVertex {
    #[must_use]
    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: size_of::<LitVertex>() as u64,
            attributes: vec![
                VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        }
    }
}

impl TexturedVertex {
    #[must_use]
    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: size_of::<TexturedVertex>() as u64,
            attributes: vec![
                VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        }
    }
}

// ============================================================================
// Face tables
// ============================================================================

struct Face {
    normal: [f32; 3],
    /// Quad corners in winding order; expanded a-b-c, c-d-a.
    corners: [[f32; 3]; 4],
    uvs: [[f32; 2]; 4],
}

const QUAD: [usize; 6] = [0, 1, 2, 2, 3, 0];

const FACES: [Face; 6] = [
    // back
    Face {
        normal: [0.0, 0.0, -1.0],
        corners: [
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, 0.5, -0.5],
        ],
        uvs: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
    },
    // front
    Face {
        normal: [0.0, 0.0, 1.0],
        corners: [
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ],
        uvs: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
    },
    // left
    Face {
        normal: [-1.0, 0.0, 0.0],
        corners: [
            [-0.5, 0.5, 0.5],
            [-0.5, 0.5, -0.5],
            [-0.5, -0.5, -0.5],
            [-0.5, -0.5, 0.5],
        ],
        uvs: [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
    },
    // right
    Face {
        normal: [1.0, 0.0, 0.0],
        corners: [
            [0.5, 0.5, 0.5],
            [0.5, 0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, -0.5, 0.5],
        ],
        uvs: [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
    },
    // bottom
    Face {
        normal: [0.0, -1.0, 0.0],
        corners: [
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, -0.5, 0.5],
            [-0.5, -0.5, 0.5],
        ],
        uvs: [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
    },
    // top
    Face {
        normal: [0.0, 1.0, 0.0],
        corners: [
            [-0.5, 0.5, -0.5],
            [0.5, 0.5, -0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ],
        uvs: [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
    },
];

/// The 36 vertices of the lit cube, face by face.
#[must_use]
pub fn lit_vertices() -> Vec<LitVertex> {
    FACES
        .iter()
        .flat_map(|face| {
            QUAD.iter().map(|&corner| LitVertex {
                position: face.corners[corner],
                normal: face.normal,
            })
        })
        .collect()
}

/// The 36 vertices of the textured cube, face by face.
#[must_use]
pub fn textured_vertices() -> Vec<TexturedVertex> {
    FACES
        .iter()
        .flat_map(|face| {
            QUAD.iter().map(|&corner| TexturedVertex {
                position: face.corners[corner],
                uv: face.uvs[corner],
            })
        })
        .collect()
}

// ============================================================================
// CubeMesh
// ============================================================================

pub struct CubeMesh {
    buffer: BufferHandle,
    vertex_count: u32,
    layout: VertexLayout,
    released: bool,
    label: String,
}

impl CubeMesh {
    /// Builds the position+normal cube for the lit variant.
    pub fn lit(device: &mut dyn GraphicsDevice) -> Self {
        let vertices = lit_vertices();
        Self::upload(device, bytemuck::cast_slice(&vertices), vertices.len() as u32, LitVertex::layout(), "Lit Cube")
    }

    /// Builds the position+uv cube for the textured variant.
    pub fn textured(device: &mut dyn GraphicsDevice) -> Self {
        let vertices = textured_vertices();
        Self::upload(device, bytemuck::cast_slice(&vertices), vertices.len() as u32, TexturedVertex::layout(), "Textured Cube")
    }

    fn upload(
        device: &mut dyn GraphicsDevice,
        bytes: &[u8],
        vertex_count: u32,
        layout: VertexLayout,
        label: &str,
    ) -> Self {
        let buffer = device.create_vertex_buffer(bytes, label);
        log::debug!("mesh '{label}' uploaded: {vertex_count} vertices");
        Self {
            buffer,
            vertex_count,
            layout,
            released: false,
            label: label.to_string(),
        }
    }

    /// The layout this mesh's buffer was built with; programs rendering the
    /// mesh must link against it.
    #[must_use]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Submits one non-indexed draw of all 36 vertices.
    pub fn draw(&self, device: &mut dyn GraphicsDevice) {
        assert!(!self.released, "mesh '{}' used after release", self.label);
        device.draw(self.buffer, 0..self.vertex_count);
    }

    /// Deletes the vertex buffer on the device. Safe to call more than once;
    /// only the first call reaches the device.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if self.released {
            return;
        }
        self.released = true;
        device.delete_buffer(self.buffer);
        log::debug!("mesh '{}' released", self.label);
    }

    #[must_use]
    pub fn handle(&self) -> BufferHandle {
        self.buffer
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for CubeMesh {
    fn drop(&mut self) {
        if !self.released {
            log::warn!(
                "GPU resource leak: mesh '{}' dropped without release()",
                self.label
            );
        }
    }
}
