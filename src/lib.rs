#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod app;
pub mod assets;
pub mod device;
pub mod errors;
pub mod resources;
pub mod scene;
pub mod utils;

pub use app::App;
pub use device::{GraphicsDevice, NullDevice, RenderSettings, WgpuDevice};
pub use errors::{RenderError, Result};
pub use resources::{CubeMesh, ShaderProgram, Texture2D, TextureSource};
pub use scene::{Camera, CameraMode, CubeVariant, Scene, SceneConfig, ScenePhase};
