//! Scene Tests
//!
//! Tests for:
//! - Lifecycle phases from load through unload
//! - Spin accumulation and the Space pause toggle
//! - The recorded frame of each demo preset
//! - Orbit and free-look camera steering from input
//! - Arrow-key light control on the lit variant
//! - Failed loads leaving no device residue
//! - Shader override resolution and viewport resizes

use glam::{Mat4, Vec3};

use ixion::app::input::{ButtonState, Input, Key, MouseButton};
use ixion::assets::{self, ShaderSources};
use ixion::device::{ShaderStage, UniformValue};
use ixion::resources::CHECKER_SIZE;
use ixion::{NullDevice, RenderError, Scene, SceneConfig, ScenePhase};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

fn assert_mat4_approx(a: Mat4, b: Mat4, what: &str) {
    let a = a.to_cols_array();
    let b = b.to_cols_array();
    for i in 0..16 {
        assert!(
            approx(a[i], b[i]),
            "{what}: element {i} differs, {} vs {}",
            a[i],
            b[i]
        );
    }
}

/// A textured scene whose image file never exists, so every load takes the
/// checkerboard fallback.
fn textured_scene() -> Scene {
    Scene::new(SceneConfig::textured("no/such/texture.png"))
}

fn loaded_textured() -> (NullDevice, Scene) {
    let mut device = NullDevice::new();
    let mut scene = textured_scene();
    scene
        .load(&mut device, 800, 600)
        .expect("the fallback load should succeed");
    (device, scene)
}

fn loaded_lit() -> (NullDevice, Scene) {
    let mut device = NullDevice::new();
    let mut scene = Scene::new(SceneConfig::lit());
    scene
        .load(&mut device, 800, 600)
        .expect("the lit load should succeed");
    (device, scene)
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn scenes_start_uninitialized() {
    let scene = textured_scene();

    assert_eq!(scene.phase(), ScenePhase::Uninitialized);
    assert!(!scene.is_loaded());
    assert!(!scene.exit_requested());
    assert!(approx(scene.spin_degrees(), 0.0));
}

#[test]
fn textured_load_enters_running() {
    let (device, scene) = loaded_textured();

    assert_eq!(scene.phase(), ScenePhase::Running);
    assert!(scene.is_loaded());
    assert!(device.depth_test());
    assert_eq!(device.program_count(), 1);
    assert_eq!(device.texture_count(), 1);
    assert_eq!(device.buffer_count(), 1);
    assert!(device.violations().is_empty(), "{:?}", device.violations());
}

#[test]
fn lit_load_enters_paused() {
    let (device, scene) = loaded_lit();

    assert_eq!(
        scene.phase(),
        ScenePhase::Paused,
        "the Phong demo stands still until Space"
    );
    assert!(scene.is_loaded());
    assert_eq!(device.texture_count(), 0, "the lit variant owns no texture");
}

#[test]
fn updates_and_renders_before_load_are_ignored() {
    let mut device = NullDevice::new();
    let mut scene = textured_scene();
    let mut input = Input::new();
    input.inject_key(Key::Escape, ButtonState::Pressed);

    scene.update(1.0, &input);
    scene.render(&mut device);

    assert!(approx(scene.spin_degrees(), 0.0));
    assert!(
        !scene.exit_requested(),
        "input is ignored until the scene is loaded"
    );
    assert!(device.frames().is_empty());
    assert!(device.violations().is_empty());
}

#[test]
#[should_panic(expected = "uninitialized scene")]
fn loading_twice_panics() {
    let mut device = NullDevice::new();
    let mut scene = textured_scene();
    scene.load(&mut device, 800, 600).expect("first load");
    let _ = scene.load(&mut device, 800, 600);
}

#[test]
fn unload_releases_every_resource_exactly_once() {
    let (mut device, mut scene) = loaded_textured();

    scene.unload(&mut device);
    assert_eq!(scene.phase(), ScenePhase::Unloaded);
    assert!(!scene.is_loaded());
    assert_eq!(device.program_count(), 0);
    assert_eq!(device.texture_count(), 0);
    assert_eq!(device.buffer_count(), 0);

    scene.unload(&mut device);
    assert!(
        device.violations().is_empty(),
        "a second unload must not double-delete: {:?}",
        device.violations()
    );
}

#[test]
fn unload_before_load_keeps_the_scene_loadable() {
    let mut device = NullDevice::new();
    let mut scene = textured_scene();

    scene.unload(&mut device);
    assert_eq!(
        scene.phase(),
        ScenePhase::Uninitialized,
        "nothing to release, nothing changes"
    );

    scene
        .load(&mut device, 800, 600)
        .expect("the scene should still load");
    assert_eq!(scene.phase(), ScenePhase::Running);
}

#[test]
fn unloaded_scenes_are_inert() {
    let (mut device, mut scene) = loaded_textured();
    scene.render(&mut device);
    scene.unload(&mut device);

    let frames_before = device.frames().len();
    let spin_before = scene.spin_degrees();

    scene.update(1.0, &Input::new());
    scene.render(&mut device);

    assert_eq!(device.frames().len(), frames_before, "no draw after unload");
    assert!(approx(scene.spin_degrees(), spin_before));
    assert!(device.violations().is_empty(), "{:?}", device.violations());
}

// ============================================================================
// Animation and the pause toggle
// ============================================================================

#[test]
fn running_scene_accumulates_spin_by_rate_times_dt() {
    let (_device, mut scene) = loaded_textured();
    let input = Input::new();

    scene.update(1.0, &input);
    assert!(
        approx(scene.spin_degrees(), 45.0),
        "one second at 45 deg/s, got {}",
        scene.spin_degrees()
    );

    scene.update(0.5, &input);
    assert!(
        approx(scene.spin_degrees(), 67.5),
        "got {}",
        scene.spin_degrees()
    );
}

#[test]
fn space_edge_toggles_between_running_and_paused() {
    let (_device, mut scene) = loaded_textured();
    let mut input = Input::new();

    scene.update(1.0, &input);
    assert!(approx(scene.spin_degrees(), 45.0));

    // The toggle lands before the spin step, so the pausing frame adds
    // nothing.
    input.inject_key(Key::Space, ButtonState::Pressed);
    scene.update(1.0, &input);
    assert_eq!(scene.phase(), ScenePhase::Paused);
    assert!(
        approx(scene.spin_degrees(), 45.0),
        "the pausing frame must not spin"
    );
    input.end_frame();

    scene.update(1.0, &input);
    assert!(
        approx(scene.spin_degrees(), 45.0),
        "paused scenes never spin"
    );

    // Same edge rule on resume: the resuming frame spins again.
    input.inject_key(Key::Space, ButtonState::Released);
    input.end_frame();
    input.inject_key(Key::Space, ButtonState::Pressed);
    scene.update(1.0, &input);
    assert_eq!(scene.phase(), ScenePhase::Running);
    assert!(approx(scene.spin_degrees(), 90.0));
}

#[test]
fn holding_space_toggles_only_once() {
    let (_device, mut scene) = loaded_textured();
    let mut input = Input::new();

    input.inject_key(Key::Space, ButtonState::Pressed);
    scene.update(0.1, &input);
    input.end_frame();
    assert_eq!(scene.phase(), ScenePhase::Paused);

    // Still held next frame; the OS may even repeat the press event.
    input.inject_key(Key::Space, ButtonState::Pressed);
    scene.update(0.1, &input);
    assert_eq!(
        scene.phase(),
        ScenePhase::Paused,
        "a held key is not a new press"
    );
}

#[test]
fn escape_requests_exit_and_latches() {
    let (_device, mut scene) = loaded_textured();
    let mut input = Input::new();
    input.inject_key(Key::Escape, ButtonState::Pressed);

    assert!(!scene.exit_requested());
    scene.update(0.016, &input);
    assert!(scene.exit_requested());

    input.inject_key(Key::Escape, ButtonState::Released);
    input.end_frame();
    scene.update(0.016, &input);
    assert!(scene.exit_requested(), "the exit flag never clears");
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn textured_scene_records_the_expected_frame() {
    let (mut device, mut scene) = loaded_textured();
    let input = Input::new();

    let mut spin = 0.0_f32;
    for _ in 0..3 {
        scene.update(0.016, &input);
        spin += 45.0 * 0.016;
    }
    scene.render(&mut device);

    assert_eq!(device.frames().len(), 1, "one render, one presented frame");
    let frame = device.last_frame().expect("one presented frame");
    assert_eq!(frame.draws.len(), 1, "the scene draws exactly one cube");

    let draw = &frame.draws[0];
    assert_eq!(draw.vertices, 0..36);

    let Some(UniformValue::Mat4(model)) = draw.uniforms.get("model").copied() else {
        panic!("the draw should carry a model matrix");
    };
    let expected_model = Mat4::from_rotation_y(spin.to_radians())
        * Mat4::from_rotation_x((spin * 0.5).to_radians());
    assert_mat4_approx(model, expected_model, "model");

    let Some(UniformValue::Mat4(view)) = draw.uniforms.get("view").copied() else {
        panic!("the draw should carry a view matrix");
    };
    assert_mat4_approx(view, scene.camera().view_matrix(), "view");

    let Some(UniformValue::Mat4(projection)) = draw.uniforms.get("projection").copied() else {
        panic!("the draw should carry a projection matrix");
    };
    assert_mat4_approx(projection, scene.camera().projection_matrix(), "projection");

    let texture = draw.texture.expect("the textured draw should resolve a texture");
    assert_eq!(
        device.sampler_unit(draw.program),
        Some(0),
        "the sampler is pinned to unit 0 at load"
    );
    assert_eq!(device.bound_texture(0), Some(texture));
    assert_eq!(
        device.texture_size(texture),
        Some((CHECKER_SIZE, CHECKER_SIZE)),
        "the missing file should have fallen back to the checkerboard"
    );
    assert!(device.violations().is_empty(), "{:?}", device.violations());
}

#[test]
fn lit_render_publishes_the_phong_uniforms() {
    let (mut device, mut scene) = loaded_lit();
    scene.render(&mut device);

    let frame = device.last_frame().expect("one frame");
    let draw = &frame.draws[0];

    assert_eq!(
        draw.uniforms.get("lightPos").copied(),
        Some(UniformValue::Vec3(Vec3::new(2.0, 2.0, 2.0)))
    );
    assert_eq!(
        draw.uniforms.get("viewPos").copied(),
        Some(UniformValue::Vec3(Vec3::new(0.0, 0.0, 3.0))),
        "viewPos is the camera eye"
    );
    assert_eq!(
        draw.uniforms.get("lightColor").copied(),
        Some(UniformValue::Vec3(Vec3::ONE))
    );
    assert_eq!(
        draw.uniforms.get("objectColor").copied(),
        Some(UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.31)))
    );
    assert!(
        draw.texture.is_none(),
        "the lit cube does not sample a texture"
    );
}

#[test]
fn paused_scenes_render_with_a_frozen_spin() {
    let (mut device, mut scene) = loaded_lit();
    assert_eq!(scene.phase(), ScenePhase::Paused);

    scene.update(1.0, &Input::new());
    scene.render(&mut device);

    let frame = device.last_frame().expect("paused scenes still present");
    let Some(UniformValue::Mat4(model)) = frame.draws[0].uniforms.get("model").copied() else {
        panic!("the draw should carry a model matrix");
    };
    assert_mat4_approx(model, Mat4::IDENTITY, "model");
}

#[test]
fn rebinding_the_same_program_is_free() {
    let (mut device, mut scene) = loaded_textured();

    scene.render(&mut device);
    scene.render(&mut device);
    scene.render(&mut device);

    assert_eq!(device.frames().len(), 3);
    assert_eq!(
        device.program_switch_count(),
        1,
        "load binds once for the sampler pin; later binds hit the active program"
    );
}

#[test]
fn clear_color_follows_the_preset() {
    let (mut device, mut scene) = loaded_textured();
    scene.render(&mut device);
    assert_eq!(
        device.last_frame().expect("frame").clear_color,
        scene.config().clear_color
    );

    let (mut device, mut scene) = loaded_lit();
    scene.render(&mut device);
    assert_eq!(
        device.last_frame().expect("frame").clear_color,
        wgpu::Color {
            r: 0.1,
            g: 0.1,
            b: 0.1,
            a: 1.0
        },
        "the Phong demo clears darker"
    );
}

// ============================================================================
// Camera steering
// ============================================================================

#[test]
fn orbit_drag_turns_the_camera() {
    let (_device, mut scene) = loaded_textured();
    let mut input = Input::new();
    input.inject_resize(800, 600);
    input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
    input.inject_mouse_position(400.0, 300.0);
    input.inject_mouse_position(410.0, 300.0);

    scene.update(0.016, &input);

    // 10 px of a 600 px screen at rotate speed 1.0.
    let yaw = -10.0 * std::f32::consts::TAU / 600.0;
    let expected = Vec3::new(3.0 * yaw.sin(), 0.0, 3.0 * yaw.cos());
    assert!(
        approx_vec3(scene.camera().position, expected),
        "got {}",
        scene.camera().position
    );
    assert!(approx(
        (scene.camera().position - scene.camera().target).length(),
        3.0
    ));
}

#[test]
fn orbit_ignores_drag_without_the_left_button() {
    let (_device, mut scene) = loaded_textured();
    let mut input = Input::new();
    input.inject_resize(800, 600);
    input.inject_mouse_position(400.0, 300.0);
    input.inject_mouse_position(410.0, 300.0);

    scene.update(0.016, &input);

    assert!(
        approx_vec3(scene.camera().position, Vec3::new(0.0, 0.0, 3.0)),
        "the eye should not move, got {}",
        scene.camera().position
    );
}

#[test]
fn orbit_pitch_stops_at_the_pole() {
    let (_device, mut scene) = loaded_textured();
    let mut input = Input::new();
    input.inject_resize(800, 600);
    input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
    input.inject_mouse_position(400.0, 300.0);
    input.inject_mouse_position(400.0, 10_300.0);

    scene.update(0.016, &input);

    let ceiling = 3.0 * 89.0_f32.to_radians().sin();
    assert!(
        approx(scene.camera().position.y, ceiling),
        "a huge vertical drag should clamp at 89 degrees, got y = {}",
        scene.camera().position.y
    );
}

#[test]
fn free_look_w_walks_forward() {
    let (_device, mut scene) = loaded_lit();
    let mut input = Input::new();
    input.inject_key(Key::W, ButtonState::Pressed);

    scene.update(1.0, &input);

    assert!(
        approx_vec3(scene.camera().position, Vec3::new(0.0, 0.0, 1.5)),
        "one second of W at speed 1.5 should close 1.5 units, got {}",
        scene.camera().position
    );
}

#[test]
fn free_look_diagonal_is_the_raw_basis_sum() {
    let (_device, mut scene) = loaded_lit();
    let mut input = Input::new();
    input.inject_key(Key::W, ButtonState::Pressed);
    input.inject_key(Key::D, ButtonState::Pressed);

    scene.update(1.0, &input);

    let moved = (scene.camera().position - Vec3::new(0.0, 0.0, 3.0)).length();
    assert!(
        approx(moved, 1.5 * std::f32::consts::SQRT_2),
        "diagonals add the raw basis vectors, got {moved}"
    );
}

#[test]
fn free_look_vertical_keys_use_world_up() {
    let (_device, mut scene) = loaded_lit();
    let mut input = Input::new();

    input.inject_key(Key::E, ButtonState::Pressed);
    scene.update(1.0, &input);
    assert!(
        approx(scene.camera().position.y, 1.5),
        "E should climb, got y = {}",
        scene.camera().position.y
    );

    input.inject_key(Key::E, ButtonState::Released);
    input.inject_key(Key::Q, ButtonState::Pressed);
    scene.update(2.0, &input);
    assert!(
        approx(scene.camera().position.y, -1.5),
        "Q should descend, got y = {}",
        scene.camera().position.y
    );
}

#[test]
fn free_look_cursor_turns_the_camera() {
    let (_device, mut scene) = loaded_lit();
    let mut input = Input::new();
    input.inject_mouse_position(400.0, 300.0);
    input.inject_mouse_position(410.0, 300.0);

    scene.update(0.016, &input);

    assert!(
        approx(scene.camera().yaw, (-88.0_f32).to_radians()),
        "10 px at 0.2 deg/px should yaw 2 degrees, got {}",
        scene.camera().yaw.to_degrees()
    );
    assert!(approx(scene.camera().pitch, 0.0));
}

// ============================================================================
// Light control
// ============================================================================

#[test]
fn arrow_keys_steer_the_light_even_while_paused() {
    let (mut device, mut scene) = loaded_lit();
    assert_eq!(scene.phase(), ScenePhase::Paused);

    let mut input = Input::new();
    input.inject_key(Key::ArrowUp, ButtonState::Pressed);
    input.inject_key(Key::ArrowRight, ButtonState::Pressed);
    scene.update(0.5, &input);
    assert!(
        approx_vec3(scene.light_position(), Vec3::new(2.5, 2.5, 2.0)),
        "got {}",
        scene.light_position()
    );

    input.end_frame();
    input.inject_key(Key::ArrowUp, ButtonState::Released);
    input.inject_key(Key::ArrowRight, ButtonState::Released);
    input.inject_key(Key::ArrowDown, ButtonState::Pressed);
    input.inject_key(Key::ArrowLeft, ButtonState::Pressed);
    scene.update(0.25, &input);
    assert!(
        approx_vec3(scene.light_position(), Vec3::new(2.25, 2.25, 2.0)),
        "got {}",
        scene.light_position()
    );

    scene.render(&mut device);
    let frame = device.last_frame().expect("one frame");
    assert_eq!(
        frame.draws[0].uniforms.get("lightPos").copied(),
        Some(UniformValue::Vec3(scene.light_position())),
        "the moved light should reach the next draw"
    );
}

// ============================================================================
// Failure paths
// ============================================================================

#[test]
fn corrupt_texture_file_fails_load_and_cleans_up() {
    let path = std::env::temp_dir().join(format!("ixion_corrupt_{}.png", std::process::id()));
    std::fs::write(&path, b"this is not a png").expect("temp file should be writable");

    let mut device = NullDevice::new();
    let mut scene = Scene::new(SceneConfig::textured(&path));
    let err = scene.load(&mut device, 800, 600).unwrap_err();
    std::fs::remove_file(&path).ok();

    assert!(matches!(err, RenderError::ImageDecodeError(_)), "got {err}");
    assert_eq!(
        device.program_count(),
        0,
        "the linked program must be released when the texture fails"
    );
    assert_eq!(device.texture_count(), 0);
    assert_eq!(device.buffer_count(), 0);
    assert_eq!(
        scene.phase(),
        ScenePhase::Uninitialized,
        "a failed load leaves the scene untouched"
    );
    assert!(device.violations().is_empty(), "{:?}", device.violations());
}

#[test]
fn empty_shader_override_fails_the_matching_stage() {
    let dir = std::env::temp_dir().join(format!("ixion_empty_override_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    std::fs::write(dir.join("textured.vert.wgsl"), "").expect("override file");

    let mut device = NullDevice::new();
    let mut config = SceneConfig::textured("no/such/texture.png");
    config.shader_dir = Some(dir.clone());
    let mut scene = Scene::new(config);

    let err = scene.load(&mut device, 800, 600).unwrap_err();
    std::fs::remove_dir_all(&dir).ok();

    match err {
        RenderError::ShaderCompile { stage, .. } => assert_eq!(stage, ShaderStage::Vertex),
        other => panic!("expected a compile error, got {other}"),
    }
    assert_eq!(device.program_count(), 0);
    assert_eq!(device.shader_count(), 0);
    assert_eq!(scene.phase(), ScenePhase::Uninitialized);
}

// ============================================================================
// Shader overrides
// ============================================================================

#[test]
fn override_directory_wins_over_the_embedded_sources() {
    let dir = std::env::temp_dir().join(format!("ixion_override_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    std::fs::write(dir.join("textured.vert.wgsl"), "// override marker\n")
        .expect("override file");

    let sources = ShaderSources::textured(Some(dir.as_path())).expect("resolution should succeed");
    std::fs::remove_dir_all(&dir).ok();

    assert!(
        sources.vertex.contains("override marker"),
        "the on-disk file should replace the embedded vertex source"
    );
    assert_eq!(
        &*sources.fragment,
        assets::TEXTURED_FRAGMENT_WGSL,
        "a missing override falls back to the embedded source"
    );
}

// ============================================================================
// Resizing
// ============================================================================

#[test]
fn resize_updates_viewport_and_aspect_together() {
    let (mut device, mut scene) = loaded_textured();

    scene.resize(&mut device, 1024, 768);

    assert_eq!(device.viewport(), (1024, 768));
    assert!(approx(scene.camera().aspect, 1024.0 / 768.0));
}

#[test]
fn zero_sized_resize_is_ignored() {
    let (mut device, mut scene) = loaded_textured();
    scene.resize(&mut device, 1024, 768);

    scene.resize(&mut device, 0, 600);
    scene.resize(&mut device, 800, 0);

    assert_eq!(
        device.viewport(),
        (1024, 768),
        "a minimized window must not poison the state"
    );
    assert!(approx(scene.camera().aspect, 1024.0 / 768.0));
}
