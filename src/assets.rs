//! Embedded shader sources and their uniform interfaces.
//!
//! Each cube variant ships a vertex/fragment WGSL pair compiled into the
//! binary. A scene may point at a directory of override files with the same
//! names; a missing override is not an error, the embedded source is used
//! and the miss is logged. Only an unreadable or undecodable *existing*
//! file propagates.
//!
//! The uniform tables here are the single source of truth for each
//! program's block layout: the WGSL `Uniforms` structs list the same fields
//! in the same order.

use std::borrow::Cow;
use std::path::Path;

use crate::device::{UniformDecl, UniformKind};
use crate::errors::Result;

pub const TEXTURED_VERTEX_WGSL: &str = include_str!("shaders/textured.vert.wgsl");
pub const TEXTURED_FRAGMENT_WGSL: &str = include_str!("shaders/textured.frag.wgsl");
pub const LIT_VERTEX_WGSL: &str = include_str!("shaders/lit.vert.wgsl");
pub const LIT_FRAGMENT_WGSL: &str = include_str!("shaders/lit.frag.wgsl");

/// Uniform interface of the textured program. `texture0` is a sampler
/// selector, it occupies no block space.
pub const TEXTURED_UNIFORMS: &[UniformDecl] = &[
    UniformDecl {
        name: "model",
        kind: UniformKind::Mat4,
    },
    UniformDecl {
        name: "view",
        kind: UniformKind::Mat4,
    },
    UniformDecl {
        name: "projection",
        kind: UniformKind::Mat4,
    },
    UniformDecl {
        name: "texture0",
        kind: UniformKind::Sampler2D,
    },
];

/// Uniform interface of the Phong-lit program.
pub const LIT_UNIFORMS: &[UniformDecl] = &[
    UniformDecl {
        name: "model",
        kind: UniformKind::Mat4,
    },
    UniformDecl {
        name: "view",
        kind: UniformKind::Mat4,
    },
    UniformDecl {
        name: "projection",
        kind: UniformKind::Mat4,
    },
    UniformDecl {
        name: "lightPos",
        kind: UniformKind::Vec3,
    },
    UniformDecl {
        name: "viewPos",
        kind: UniformKind::Vec3,
    },
    UniformDecl {
        name: "lightColor",
        kind: UniformKind::Vec3,
    },
    UniformDecl {
        name: "objectColor",
        kind: UniformKind::Vec3,
    },
];

/// A resolved vertex/fragment source pair, borrowed from the embedded
/// constants unless an on-disk override was found.
pub struct ShaderSources {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl ShaderSources {
    /// Sources for the textured cube program.
    ///
    /// # Errors
    ///
    /// Fails only when an existing override file cannot be read.
    pub fn textured(override_dir: Option<&Path>) -> Result<Self> {
        Ok(Self {
            vertex: load_or_embedded(override_dir, "textured.vert.wgsl", TEXTURED_VERTEX_WGSL)?,
            fragment: load_or_embedded(override_dir, "textured.frag.wgsl", TEXTURED_FRAGMENT_WGSL)?,
        })
    }

    /// Sources for the Phong-lit cube program.
    ///
    /// # Errors
    ///
    /// Fails only when an existing override file cannot be read.
    pub fn lit(override_dir: Option<&Path>) -> Result<Self> {
        Ok(Self {
            vertex: load_or_embedded(override_dir, "lit.vert.wgsl", LIT_VERTEX_WGSL)?,
            fragment: load_or_embedded(override_dir, "lit.frag.wgsl", LIT_FRAGMENT_WGSL)?,
        })
    }
}

fn load_or_embedded(
    dir: Option<&Path>,
    file_name: &str,
    embedded: &'static str,
) -> Result<Cow<'static, str>> {
    let Some(dir) = dir else {
        return Ok(Cow::Borrowed(embedded));
    };

    let path = dir.join(file_name);
    match std::fs::read_to_string(&path) {
        Ok(source) => {
            log::info!("loaded shader override {}", path.display());
            Ok(Cow::Owned(source))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!(
                "shader file {} not found, using the embedded source",
                path.display()
            );
            Ok(Cow::Borrowed(embedded))
        }
        Err(e) => Err(e.into()),
    }
}
