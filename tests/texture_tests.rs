//! Texture Tests
//!
//! Tests for:
//! - Procedural checkerboard pixel layout
//! - Missing-file fallback to the checkerboard
//! - Decode failure propagation without device-side residue
//! - Mip chain length down to one texel
//! - Decoded image dimensions
//! - Upload size validation

use std::path::Path;

use ixion::device::TextureDesc;
use ixion::resources::{
    checkerboard_pixels, CHECKER_DARK, CHECKER_SIZE, CHECKER_TILE, CHECKER_WHITE,
};
use ixion::{GraphicsDevice, NullDevice, RenderError, Texture2D, TextureSource};

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * CHECKER_SIZE + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

// ============================================================================
// Checkerboard generation
// ============================================================================

#[test]
fn checkerboard_has_one_rgba_pixel_per_texel() {
    let pixels = checkerboard_pixels();
    assert_eq!(pixels.len(), (CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
}

#[test]
fn checkerboard_tiles_alternate_from_a_light_origin() {
    let pixels = checkerboard_pixels();

    assert_eq!(
        pixel(&pixels, 0, 0),
        CHECKER_WHITE,
        "the origin tile should be the light color"
    );
    assert_eq!(pixel(&pixels, CHECKER_TILE, 0), CHECKER_DARK);
    assert_eq!(pixel(&pixels, 0, CHECKER_TILE), CHECKER_DARK);
    assert_eq!(pixel(&pixels, CHECKER_TILE, CHECKER_TILE), CHECKER_WHITE);
    assert_eq!(
        pixel(&pixels, CHECKER_SIZE - 1, CHECKER_SIZE - 1),
        CHECKER_WHITE,
        "an even number of tiles puts the far corner back on the light color"
    );
}

#[test]
fn checkerboard_tiles_are_uniform_inside() {
    let pixels = checkerboard_pixels();

    assert_eq!(pixel(&pixels, 5, 17), CHECKER_WHITE);
    assert_eq!(pixel(&pixels, CHECKER_TILE - 1, CHECKER_TILE - 1), CHECKER_WHITE);
    assert_eq!(pixel(&pixels, CHECKER_TILE, CHECKER_TILE - 1), CHECKER_DARK);
}

// ============================================================================
// Sources and fallback
// ============================================================================

#[test]
fn missing_file_falls_back_to_the_checkerboard() {
    let mut device = NullDevice::new();
    let texture = Texture2D::from_path(&mut device, Path::new("no/such/file.png"), "fallback")
        .expect("a missing file is not an error");

    assert!(texture.is_procedural());
    assert_eq!((texture.width(), texture.height()), (CHECKER_SIZE, CHECKER_SIZE));
    assert_eq!(
        device.texture_size(texture.handle()),
        Some((CHECKER_SIZE, CHECKER_SIZE))
    );
    assert!(device.violations().is_empty(), "{:?}", device.violations());
}

#[test]
fn resolve_prefers_the_file_when_it_exists() {
    let path = std::env::temp_dir().join(format!("ixion_resolve_{}.bin", std::process::id()));
    std::fs::write(&path, b"raw bytes").expect("temp file should be writable");

    let source = TextureSource::resolve(&path).expect("an existing file should resolve");
    std::fs::remove_file(&path).ok();

    match source {
        TextureSource::FileBacked(bytes) => assert_eq!(bytes, b"raw bytes"),
        TextureSource::Procedural => panic!("existing file should resolve to its bytes"),
    }
}

#[test]
fn corrupt_bytes_report_a_decode_error() {
    let mut device = NullDevice::new();
    let err = Texture2D::from_source(
        &mut device,
        TextureSource::FileBacked(b"plainly not an image".to_vec()),
        "corrupt",
    )
    .unwrap_err();

    assert!(matches!(err, RenderError::ImageDecodeError(_)), "got {err}");
    assert_eq!(
        device.texture_count(),
        0,
        "no device texture may exist for undecodable bytes"
    );
}

#[test]
fn decoded_image_keeps_its_dimensions() {
    let image = image::RgbaImage::from_pixel(4, 8, image::Rgba([10, 20, 30, 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("in-memory PNG encode");

    let mut device = NullDevice::new();
    let texture = Texture2D::from_source(&mut device, TextureSource::FileBacked(bytes), "png")
        .expect("a valid PNG should decode");

    assert!(!texture.is_procedural());
    assert_eq!((texture.width(), texture.height()), (4, 8));
    assert_eq!(
        texture.mip_level_count(),
        4,
        "an 8-texel edge needs levels 8, 4, 2, 1"
    );
}

// ============================================================================
// Mip chain
// ============================================================================

#[test]
fn full_mip_chain_reaches_one_texel() {
    let mut device = NullDevice::new();
    let texture = Texture2D::from_source(&mut device, TextureSource::Procedural, "checker")
        .expect("the procedural source cannot fail");

    assert_eq!(
        texture.mip_level_count(),
        9,
        "a 256 edge needs levels 256 down to 1"
    );
    assert_eq!(device.texture_mip_count(texture.handle()), Some(9));
    assert!(
        device.texture_has_mipmaps(texture.handle()),
        "mip generation should run right after the level-0 upload"
    );
}

// ============================================================================
// Upload validation
// ============================================================================

#[test]
fn short_upload_is_flagged_by_the_device() {
    let mut device = NullDevice::new();
    let handle = device.create_texture(&TextureDesc {
        label: "short",
        width: 4,
        height: 4,
        mip_level_count: 1,
    });

    device.upload_texture(handle, &[0u8; 8]);

    assert_eq!(device.violations().len(), 1);
    assert!(
        device.violations()[0].contains("8 bytes"),
        "the violation should name the bad length, got {:?}",
        device.violations()[0]
    );
}
