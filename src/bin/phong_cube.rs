//! Phong-lit cube with a free-look camera.
//!
//! W/A/S/D walk, E/Q fly, the cursor steers, arrow keys slide the light in
//! the XY plane. Space starts and stops the spin, Escape quits.

use ixion::app::App;
use ixion::scene::SceneConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    App::new(SceneConfig::lit())
        .with_title("phong lighting demo")
        .run()?;
    Ok(())
}
