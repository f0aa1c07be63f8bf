//! GPU Resource Wrappers
//!
//! CPU-side owners of device handles, one type per resource kind:
//!
//! - [`ShaderProgram`]: two-stage compile + link, typed uniform setters over
//!   a name-to-slot cache
//! - [`Texture2D`]: file-backed or procedural image data with a full mipmap
//!   chain
//! - [`CubeMesh`]: the 36-vertex unit cube in its lit and textured layouts
//!
//! Every wrapper releases its handle exactly once: `release` is idempotent,
//! use after release is a caller bug and fails fast, and dropping a wrapper
//! that was never released logs a leak warning instead of touching the
//! device from `Drop`.

pub mod mesh;
pub mod shader;
pub mod texture;

pub use mesh::{CubeMesh, LitVertex, TexturedVertex, lit_vertices, textured_vertices};
pub use shader::ShaderProgram;
pub use texture::{
    CHECKER_DARK, CHECKER_SIZE, CHECKER_TILE, CHECKER_WHITE, Texture2D, TextureSource,
    checkerboard_pixels,
};
