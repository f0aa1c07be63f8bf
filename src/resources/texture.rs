//! 2D Texture Wrapper
//!
//! [`Texture2D`] owns one RGBA8 texture on the device, filled either from an
//! image file or from the procedural checkerboard fallback. A missing file is
//! not an error: the scene still comes up, visibly textured with the
//! checkerboard, and the substitution is reported through the log. A file
//! that exists but cannot be read or decoded is fatal.
//!
//! Decoded files are flipped vertically before upload so row 0 is the bottom
//! of the picture, the sampling convention the cube's UV table assumes.
//! Upload always precedes mipmap generation; every texture carries the full
//! chain down to 1x1.

use std::path::Path;

use crate::device::{GraphicsDevice, TextureDesc, TextureHandle};
use crate::errors::Result;

/// Edge length of the procedural checkerboard, in pixels.
pub const CHECKER_SIZE: u32 = 256;
/// Edge length of one checkerboard tile, in pixels.
pub const CHECKER_TILE: u32 = 32;
/// Tile color at (0, 0) and every even tile: white with a cold tint.
pub const CHECKER_WHITE: [u8; 4] = [240, 240, 255, 255];
/// The alternating tile color: dark blue.
pub const CHECKER_DARK: [u8; 4] = [40, 40, 80, 255];

/// Where a texture's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// Raw bytes of an image file, still to be decoded.
    FileBacked(Vec<u8>),
    /// The deterministic checkerboard.
    Procedural,
}

impl TextureSource {
    /// Reads `path` if it exists; resolves to [`Procedural`](Self::Procedural)
    /// if it does not. Any other I/O failure is propagated.
    pub fn resolve(path: &Path) -> Result<Self> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Self::FileBacked(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "texture file '{}' not found, falling back to procedural checkerboard",
                    path.display()
                );
                Ok(Self::Procedural)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Generates the checkerboard pixel buffer: `CHECKER_SIZE` squared RGBA8
/// pixels, `CHECKER_TILE` tiles, tile (0, 0) white.
#[must_use]
pub fn checkerboard_pixels() -> Vec<u8> {
    let mut pixels = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let white = ((x / CHECKER_TILE) + (y / CHECKER_TILE)) % 2 == 0;
            let color = if white { CHECKER_WHITE } else { CHECKER_DARK };
            pixels.extend_from_slice(&color);
        }
    }
    pixels
}

#[derive(Debug)]
pub struct Texture2D {
    texture: TextureHandle,
    width: u32,
    height: u32,
    mip_level_count: u32,
    procedural: bool,
    released: bool,
    label: String,
}

impl Texture2D {
    /// Loads `path`, or builds the checkerboard when the file is absent.
    pub fn from_path(device: &mut dyn GraphicsDevice, path: &Path, label: &str) -> Result<Self> {
        Self::from_source(device, TextureSource::resolve(path)?, label)
    }

    /// Decodes (or generates) the pixels, uploads level 0 and generates the
    /// remaining mip levels.
    pub fn from_source(
        device: &mut dyn GraphicsDevice,
        source: TextureSource,
        label: &str,
    ) -> Result<Self> {
        let (width, height, pixels, procedural) = match source {
            TextureSource::FileBacked(bytes) => {
                let image = image::load_from_memory(&bytes)?.flipv().into_rgba8();
                let (width, height) = image.dimensions();
                (width, height, image.into_raw(), false)
            }
            TextureSource::Procedural => {
                (CHECKER_SIZE, CHECKER_SIZE, checkerboard_pixels(), true)
            }
        };
        debug_assert!(width > 0 && height > 0, "decoded image has a zero dimension");
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);

        // Full chain down to 1x1.
        let mip_level_count = width.max(height).ilog2() + 1;
        let texture = device.create_texture(&TextureDesc {
            label,
            width,
            height,
            mip_level_count,
        });
        device.upload_texture(texture, &pixels);
        device.generate_mipmaps(texture);

        log::info!(
            "texture '{label}' ready: {width}x{height}, {mip_level_count} mip levels{}",
            if procedural { ", procedural" } else { "" }
        );
        Ok(Self {
            texture,
            width,
            height,
            mip_level_count,
            procedural,
            released: false,
            label: label.to_string(),
        })
    }

    /// Binds this texture to `unit` for the next draws. Unit 0 is the
    /// conventional slot for a program's single sampler.
    pub fn bind(&self, device: &mut dyn GraphicsDevice, unit: u32) {
        assert!(!self.released, "texture '{}' used after release", self.label);
        device.bind_texture(unit, self.texture);
    }

    /// Deletes the texture on the device. Safe to call more than once; only
    /// the first call reaches the device.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if self.released {
            return;
        }
        self.released = true;
        device.delete_texture(self.texture);
        log::debug!("texture '{}' released", self.label);
    }

    #[must_use]
    pub fn handle(&self) -> TextureHandle {
        self.texture
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    /// Whether this texture came from the checkerboard fallback rather than a
    /// file.
    #[must_use]
    pub fn is_procedural(&self) -> bool {
        self.procedural
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        if !self.released {
            log::warn!(
                "GPU resource leak: texture '{}' dropped without release()",
                self.label
            );
        }
    }
}
