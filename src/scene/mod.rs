//! Scene lifecycle and the per-frame update/render sequence.
//!
//! # Overview
//!
//! One [`Scene`] owns the camera and the three GPU resource wrappers and
//! walks the phase machine:
//!
//! ```text
//! Uninitialized --load--> Running <--Space--> Paused --unload--> Unloaded
//! ```
//!
//! `Running` and `Paused` are the two loaded phases; which one `load`
//! enters is the config's choice. The runner drives one `update(dt, input)`
//! and one `render(device)` per frame, strictly in that order, on a single
//! thread. `update` never blocks and never touches the device; `render`
//! performs exactly one draw between `begin_frame` and `present`.
//!
//! The cube variant and the camera steering style are data
//! ([`SceneConfig`]), not subtypes, so both demos share every code path
//! here.

pub mod camera;

pub use camera::Camera;

use std::path::PathBuf;

use glam::{Mat4, Vec2, Vec3};

use crate::app::input::{Input, Key, MouseButton};
use crate::assets::{self, ShaderSources};
use crate::device::GraphicsDevice;
use crate::errors::Result;
use crate::resources::{CubeMesh, LitVertex, ShaderProgram, Texture2D, TexturedVertex};

/// Arrow keys slide the light at this rate, units per second.
const LIGHT_SPEED: f32 = 1.0;

// ============================================================================
// Configuration
// ============================================================================

/// Which cube the scene renders and what feeds its fragment stage.
#[derive(Debug, Clone)]
pub enum CubeVariant {
    /// Phong-lit solid-color cube.
    Lit {
        light_position: Vec3,
        light_color: Vec3,
        object_color: Vec3,
    },
    /// Image-mapped cube. A missing file at `texture_path` falls back to
    /// the procedural checkerboard.
    Textured { texture_path: PathBuf },
}

/// How the camera consumes input each tick.
#[derive(Debug, Clone, Copy)]
pub enum CameraMode {
    /// The eye rides a sphere around the target; dragging with the left
    /// mouse button held turns it. `rotate_speed` 1.0 means one full turn
    /// per screen height of drag.
    Orbit { rotate_speed: f32 },
    /// First-person walk: W/A/S/D planar, E/Q vertical, cursor steers.
    /// `speed` is units per second, `sensitivity` degrees per cursor pixel.
    FreeLook { speed: f32, sensitivity: f32 },
}

/// Everything a scene needs up front. Passed into [`Scene::new`], no
/// global toggles.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub variant: CubeVariant,
    pub camera_mode: CameraMode,
    pub camera_position: Vec3,
    pub clear_color: wgpu::Color,
    pub depth_test: bool,
    /// Degrees per second added to the spin while animating.
    pub spin_rate: f32,
    /// Whether the cube is animating right after load.
    pub animate: bool,
    /// Optional directory of WGSL files overriding the embedded sources.
    pub shader_dir: Option<PathBuf>,
}

impl SceneConfig {
    /// The textured demo: checkerboard-or-file cube, orbit camera,
    /// spinning from the start.
    #[must_use]
    pub fn textured(texture_path: impl Into<PathBuf>) -> Self {
        Self {
            variant: CubeVariant::Textured {
                texture_path: texture_path.into(),
            },
            camera_mode: CameraMode::Orbit { rotate_speed: 1.0 },
            camera_position: Vec3::new(0.0, 0.0, 3.0),
            clear_color: wgpu::Color {
                r: 0.2,
                g: 0.3,
                b: 0.3,
                a: 1.0,
            },
            depth_test: true,
            spin_rate: 45.0,
            animate: true,
            shader_dir: None,
        }
    }

    /// The Phong demo: lit cube, free-look camera, static until Space.
    #[must_use]
    pub fn lit() -> Self {
        Self {
            variant: CubeVariant::Lit {
                light_position: Vec3::new(2.0, 2.0, 2.0),
                light_color: Vec3::ONE,
                object_color: Vec3::new(1.0, 0.5, 0.31),
            },
            camera_mode: CameraMode::FreeLook {
                speed: 1.5,
                sensitivity: 0.2,
            },
            camera_position: Vec3::new(0.0, 0.0, 3.0),
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
            depth_test: true,
            spin_rate: 45.0,
            animate: false,
            shader_dir: None,
        }
    }
}

// ============================================================================
// Scene
// ============================================================================

/// Lifecycle phase. `Running` and `Paused` both mean "resources resident".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Uninitialized,
    Running,
    Paused,
    Unloaded,
}

struct SceneResources {
    shader: ShaderProgram,
    texture: Option<Texture2D>,
    mesh: CubeMesh,
}

pub struct Scene {
    config: SceneConfig,
    phase: ScenePhase,
    camera: Camera,
    resources: Option<SceneResources>,

    /// Accumulated spin in degrees. Kept in degrees so `rate * dt` stays
    /// exact for decimal rates; converted to radians only at render.
    spin_degrees: f32,
    /// Live light position for the lit variant; arrows move it.
    light_position: Vec3,

    // Orbit accumulators, radians. Zero puts the eye on +Z, which is
    // where the default camera starts.
    orbit_yaw: f32,
    orbit_pitch: f32,

    exit_requested: bool,
}

impl Scene {
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        let light_position = match config.variant {
            CubeVariant::Lit { light_position, .. } => light_position,
            CubeVariant::Textured { .. } => Vec3::ZERO,
        };
        // Aspect is provisional until load() sees the real surface size.
        let camera = Camera::new(config.camera_position, 4.0 / 3.0);

        Self {
            config,
            phase: ScenePhase::Uninitialized,
            camera,
            resources: None,
            spin_degrees: 0.0,
            light_position,
            orbit_yaw: 0.0,
            orbit_pitch: 0.0,
            exit_requested: false,
        }
    }

    /// Acquires every GPU resource the config calls for, in a fixed order:
    /// device state, shader (plus its sampler-unit uniform, set once right
    /// after link), texture, mesh.
    ///
    /// On any failure everything already constructed is released before
    /// the error propagates; a scene is either fully loaded or untouched.
    ///
    /// # Errors
    ///
    /// Shader compile/link failures, texture decode failures, and I/O
    /// errors on existing override files.
    ///
    /// # Panics
    ///
    /// If the scene has already been loaded.
    pub fn load(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
    ) -> Result<()> {
        assert!(
            self.phase == ScenePhase::Uninitialized,
            "load() requires an uninitialized scene"
        );

        // Depth state bakes into pipelines at link, so device state goes
        // first.
        device.set_clear_color(self.config.clear_color);
        device.set_depth_test(self.config.depth_test);
        if width > 0 && height > 0 {
            self.camera.set_aspect(width as f32 / height as f32);
        }

        let shader_dir = self.config.shader_dir.as_deref();
        let mut shader = match &self.config.variant {
            CubeVariant::Textured { .. } => {
                let sources = ShaderSources::textured(shader_dir)?;
                ShaderProgram::new(
                    device,
                    "textured cube",
                    &sources.vertex,
                    &sources.fragment,
                    &TexturedVertex::layout(),
                    assets::TEXTURED_UNIFORMS,
                )?
            }
            CubeVariant::Lit { .. } => {
                let sources = ShaderSources::lit(shader_dir)?;
                ShaderProgram::new(
                    device,
                    "lit cube",
                    &sources.vertex,
                    &sources.fragment,
                    &LitVertex::layout(),
                    assets::LIT_UNIFORMS,
                )?
            }
        };

        let texture = match &self.config.variant {
            CubeVariant::Textured { texture_path } => {
                // Pin the sampler to unit 0 once; render() binds the
                // texture to the same unit every frame.
                shader.bind(device);
                shader.set_int(device, "texture0", 0);

                match Texture2D::from_path(device, texture_path, "cube texture") {
                    Ok(texture) => Some(texture),
                    Err(e) => {
                        shader.release(device);
                        return Err(e);
                    }
                }
            }
            CubeVariant::Lit { .. } => None,
        };

        let mesh = match &self.config.variant {
            CubeVariant::Textured { .. } => CubeMesh::textured(device),
            CubeVariant::Lit { .. } => CubeMesh::lit(device),
        };

        self.resources = Some(SceneResources {
            shader,
            texture,
            mesh,
        });
        self.phase = if self.config.animate {
            ScenePhase::Running
        } else {
            ScenePhase::Paused
        };
        log::info!("scene loaded, phase {:?}", self.phase);
        Ok(())
    }

    /// One simulation tick. Polls the exit key, the animation toggle, the
    /// camera steering for the configured mode, and the light keys on the
    /// lit variant. Ignored outside the loaded phases.
    pub fn update(&mut self, dt: f32, input: &Input) {
        if !self.is_loaded() {
            return;
        }

        if input.get_key(Key::Escape) {
            self.exit_requested = true;
        }

        if input.get_key_down(Key::Space) {
            self.phase = match self.phase {
                ScenePhase::Running => ScenePhase::Paused,
                ScenePhase::Paused => ScenePhase::Running,
                other => other,
            };
        }

        if self.phase == ScenePhase::Running {
            self.spin_degrees += self.config.spin_rate * dt;
        }

        self.steer_camera(dt, input);

        if matches!(self.config.variant, CubeVariant::Lit { .. }) {
            let step = LIGHT_SPEED * dt;
            if input.get_key(Key::ArrowUp) {
                self.light_position.y += step;
            }
            if input.get_key(Key::ArrowDown) {
                self.light_position.y -= step;
            }
            if input.get_key(Key::ArrowLeft) {
                self.light_position.x -= step;
            }
            if input.get_key(Key::ArrowRight) {
                self.light_position.x += step;
            }
        }
    }

    fn steer_camera(&mut self, dt: f32, input: &Input) {
        match self.config.camera_mode {
            CameraMode::Orbit { rotate_speed } => {
                if !input.get_mouse_button(MouseButton::Left) {
                    return;
                }
                let delta = input.mouse_delta();
                if delta == Vec2::ZERO {
                    return;
                }

                let step =
                    std::f32::consts::TAU / input.screen_size().y.max(1.0) * rotate_speed;
                self.orbit_yaw -= delta.x * step;
                self.orbit_pitch += delta.y * step;

                let limit = camera::PITCH_LIMIT_DEG.to_radians();
                self.orbit_pitch = self.orbit_pitch.clamp(-limit, limit);

                self.camera.orbit(self.orbit_yaw, self.orbit_pitch);
            }
            CameraMode::FreeLook { speed, sensitivity } => {
                let delta = input.mouse_delta();
                if delta != Vec2::ZERO {
                    self.camera.apply_look_delta(delta, sensitivity);
                }

                // Keys add raw basis vectors; diagonals run faster, as in
                // every first-person demo of this lineage.
                let front = self.camera.front();
                let right = self.camera.right();
                let mut movement = Vec3::ZERO;
                if input.get_key(Key::W) {
                    movement += front;
                }
                if input.get_key(Key::S) {
                    movement -= front;
                }
                if input.get_key(Key::A) {
                    movement -= right;
                }
                if input.get_key(Key::D) {
                    movement += right;
                }
                if input.get_key(Key::E) {
                    movement += self.camera.up;
                }
                if input.get_key(Key::Q) {
                    movement -= self.camera.up;
                }
                if movement != Vec3::ZERO {
                    self.camera.translate(movement * speed * dt);
                }
            }
        }
    }

    /// Submits the frame: one draw of the cube between `begin_frame` and
    /// `present`. Paused scenes still render, only the spin is frozen.
    pub fn render(&mut self, device: &mut dyn GraphicsDevice) {
        let Some(resources) = &mut self.resources else {
            return;
        };

        device.begin_frame();

        resources.shader.bind(device);

        let spin = self.spin_degrees;
        let model = Mat4::from_rotation_y(spin.to_radians())
            * Mat4::from_rotation_x((spin * 0.5).to_radians());
        resources.shader.set_mat4(device, "model", model);
        resources.shader.set_mat4(device, "view", self.camera.view_matrix());
        resources
            .shader
            .set_mat4(device, "projection", self.camera.projection_matrix());

        match &self.config.variant {
            CubeVariant::Lit {
                light_color,
                object_color,
                ..
            } => {
                resources
                    .shader
                    .set_vec3(device, "lightPos", self.light_position);
                resources
                    .shader
                    .set_vec3(device, "viewPos", self.camera.position);
                resources.shader.set_vec3(device, "lightColor", *light_color);
                resources
                    .shader
                    .set_vec3(device, "objectColor", *object_color);
            }
            CubeVariant::Textured { .. } => {
                if let Some(texture) = &resources.texture {
                    texture.bind(device, 0);
                }
            }
        }

        resources.mesh.draw(device);

        device.present();
    }

    /// Propagates a viewport resize to the device and the camera together.
    /// Zero-sized dimensions (minimized window) are ignored.
    pub fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        device.set_viewport(width, height);
        self.camera.set_aspect(width as f32 / height as f32);
    }

    /// Releases every GPU resource. Re-entrant: each wrapper release is
    /// idempotent and the resource set is taken on the first call.
    pub fn unload(&mut self, device: &mut dyn GraphicsDevice) {
        let Some(mut resources) = self.resources.take() else {
            return;
        };

        resources.mesh.release(device);
        resources.shader.release(device);
        if let Some(texture) = &mut resources.texture {
            texture.release(device);
        }

        self.phase = ScenePhase::Unloaded;
        log::info!("scene unloaded");
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    /// Whether resources are resident (`Running` or `Paused`).
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.phase, ScenePhase::Running | ScenePhase::Paused)
    }

    /// Set once Escape is seen; the runner polls it after each update.
    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    #[must_use]
    pub fn spin_degrees(&self) -> f32 {
        self.spin_degrees
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    #[must_use]
    pub fn light_position(&self) -> Vec3 {
        self.light_position
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}
