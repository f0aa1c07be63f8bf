//! Spinning textured cube with an orbit camera.
//!
//! Probes a few conventional texture locations; when none exists the scene
//! falls back to the procedural checkerboard. Space pauses the spin,
//! dragging with the left mouse button orbits, Escape quits.

use ixion::app::App;
use ixion::scene::SceneConfig;

const TEXTURE_CANDIDATES: &[&str] = &[
    "texture.jpg",
    "texture.png",
    "textures/texture.jpg",
    "textures/texture.png",
];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let texture_path = std::env::args().nth(1).unwrap_or_else(|| {
        TEXTURE_CANDIDATES
            .iter()
            .find(|path| std::path::Path::new(path).exists())
            .unwrap_or(&TEXTURE_CANDIDATES[0])
            .to_string()
    });

    App::new(SceneConfig::textured(texture_path))
        .with_title("texture mapping demo")
        .run()?;
    Ok(())
}
