//! Input Snapshot Tests
//!
//! Tests for:
//! - Held vs just-pressed vs just-released key states
//! - OS key-repeat suppression
//! - Frame-boundary clearing of transient state
//! - Cursor position, accumulated deltas and the first-move guard
//! - Scroll accumulation and screen size tracking

use glam::Vec2;

use ixion::app::input::{ButtonState, Input, Key, MouseButton};

// ============================================================================
// Keys
// ============================================================================

#[test]
fn press_sets_held_and_just_pressed() {
    let mut input = Input::new();
    input.inject_key(Key::W, ButtonState::Pressed);

    assert!(input.get_key(Key::W));
    assert!(input.get_key_down(Key::W));
    assert!(!input.get_key_up(Key::W));
    assert!(!input.get_key(Key::S), "other keys stay untouched");
}

#[test]
fn end_frame_clears_edges_but_not_held_state() {
    let mut input = Input::new();
    input.inject_key(Key::W, ButtonState::Pressed);
    input.end_frame();

    assert!(input.get_key(Key::W), "held state persists across frames");
    assert!(!input.get_key_down(Key::W), "the press edge is one frame only");
}

#[test]
fn os_key_repeat_is_not_a_new_press() {
    let mut input = Input::new();
    input.inject_key(Key::Space, ButtonState::Pressed);
    input.end_frame();

    // Holding a key makes the OS deliver Pressed again and again.
    input.inject_key(Key::Space, ButtonState::Pressed);

    assert!(input.get_key(Key::Space));
    assert!(
        !input.get_key_down(Key::Space),
        "a repeat of a held key must not retrigger the edge"
    );
}

#[test]
fn release_reports_just_released_for_one_frame() {
    let mut input = Input::new();
    input.inject_key(Key::W, ButtonState::Pressed);
    input.end_frame();

    input.inject_key(Key::W, ButtonState::Released);
    assert!(!input.get_key(Key::W));
    assert!(input.get_key_up(Key::W));

    input.end_frame();
    assert!(!input.get_key_up(Key::W));
}

#[test]
fn releasing_an_unheld_key_is_not_an_edge() {
    let mut input = Input::new();
    input.inject_key(Key::W, ButtonState::Released);

    assert!(!input.get_key_up(Key::W), "no press, no release edge");
}

// ============================================================================
// Mouse buttons
// ============================================================================

#[test]
fn mouse_buttons_follow_the_same_edge_rules() {
    let mut input = Input::new();
    input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);

    assert!(input.get_mouse_button(MouseButton::Left));
    assert!(input.get_mouse_button_down(MouseButton::Left));
    assert!(!input.get_mouse_button(MouseButton::Right));

    input.end_frame();
    assert!(input.get_mouse_button(MouseButton::Left));
    assert!(!input.get_mouse_button_down(MouseButton::Left));

    input.inject_mouse_button(MouseButton::Left, ButtonState::Released);
    assert!(!input.get_mouse_button(MouseButton::Left));
}

// ============================================================================
// Cursor
// ============================================================================

#[test]
fn first_mouse_move_sets_position_without_a_delta() {
    let mut input = Input::new();
    input.inject_mouse_position(400.0, 300.0);

    assert_eq!(input.mouse_position(), Vec2::new(400.0, 300.0));
    assert_eq!(
        input.mouse_delta(),
        Vec2::ZERO,
        "the first report has nothing to diff against"
    );
}

#[test]
fn mouse_deltas_accumulate_until_end_frame() {
    let mut input = Input::new();
    input.inject_mouse_position(400.0, 300.0);
    input.inject_mouse_position(410.0, 305.0);
    input.inject_mouse_position(415.0, 307.0);

    assert_eq!(input.mouse_delta(), Vec2::new(15.0, 7.0));
    assert_eq!(input.mouse_position(), Vec2::new(415.0, 307.0));

    input.end_frame();
    assert_eq!(input.mouse_delta(), Vec2::ZERO);
    assert_eq!(
        input.mouse_position(),
        Vec2::new(415.0, 307.0),
        "the position survives the frame boundary"
    );
}

#[test]
fn deltas_resume_after_the_frame_boundary() {
    let mut input = Input::new();
    input.inject_mouse_position(400.0, 300.0);
    input.end_frame();

    input.inject_mouse_position(390.0, 310.0);
    assert_eq!(
        input.mouse_delta(),
        Vec2::new(-10.0, 10.0),
        "the second frame diffs against the kept position"
    );
}

// ============================================================================
// Scroll and screen size
// ============================================================================

#[test]
fn scroll_accumulates_and_clears() {
    let mut input = Input::new();
    input.inject_scroll(0.0, 1.0);
    input.inject_scroll(0.5, -3.0);

    assert_eq!(input.scroll_delta(), Vec2::new(0.5, -2.0));

    input.end_frame();
    assert_eq!(input.scroll_delta(), Vec2::ZERO);
}

#[test]
fn screen_size_tracks_resizes() {
    let mut input = Input::new();
    assert_eq!(input.screen_size(), Vec2::ZERO, "unknown until the first resize");

    input.inject_resize(800, 600);
    assert_eq!(input.screen_size(), Vec2::new(800.0, 600.0));

    input.inject_resize(1024, 768);
    assert_eq!(input.screen_size(), Vec2::new(1024.0, 768.0));
}
