//! Perspective camera with two steering styles.
//!
//! The same [`Camera`] serves both demo scenes. Orbit steering keeps the
//! target fixed and moves the eye on a sphere around it; free-look steering
//! keeps the eye authoritative and re-derives the target from yaw/pitch
//! angles. Matrices are recomputed from the current state on every call, so
//! a field write is visible in the very next `view_matrix()` /
//! `projection_matrix()` without an explicit update step.

use glam::{Mat4, Vec2, Vec3};

/// Default vertical field of view, degrees.
const DEFAULT_FOV_DEG: f32 = 45.0;
/// Near clip plane distance.
const DEFAULT_NEAR: f32 = 0.1;
/// Far clip plane distance.
const DEFAULT_FAR: f32 = 100.0;
/// Free-look pitch is clamped short of the poles so the view basis never
/// collapses onto the up axis.
pub(crate) const PITCH_LIMIT_DEG: f32 = 89.0;

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,

    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    /// Free-look heading in radians. -90 degrees faces -Z.
    pub yaw: f32,
    /// Free-look elevation in radians, kept within +/-89 degrees.
    pub pitch: f32,

    // Captured once at construction; orbit() moves the eye on this sphere
    // even after look_at() re-anchors the target.
    orbit_radius: f32,
}

impl Camera {
    /// Camera at `position` looking toward the origin, +Y up, 45 degree
    /// vertical field of view. The orbit radius is the construction-time
    /// distance to the target.
    pub fn new(position: Vec3, aspect: f32) -> Self {
        let target = Vec3::ZERO;
        Self {
            position,
            target,
            up: Vec3::Y,
            fov: DEFAULT_FOV_DEG.to_radians(),
            aspect,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            yaw: (-90.0_f32).to_radians(),
            pitch: 0.0,
            orbit_radius: (position - target).length(),
        }
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// glam's `perspective_rh` maps depth to the [0, 1] range wgpu expects.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Takes effect on the next `projection_matrix()` call, mid-frame
    /// resizes included.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    // ========================================================================
    // Orbit steering
    // ========================================================================

    /// Repositions the eye on the orbit sphere. `yaw` and `pitch` are
    /// absolute angles in radians; `orbit(0, 0)` puts the eye on the +Z
    /// axis at the captured radius. Pitch at exactly +/-90 degrees would
    /// align the view direction with `up`, so callers clamp before calling.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let (sin_yaw, cos_yaw) = yaw.sin_cos();
        let (sin_pitch, cos_pitch) = pitch.sin_cos();
        self.position = self.target
            + self.orbit_radius * Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch);
    }

    /// Re-aims the camera at a new anchor point. The orbit radius is left
    /// as captured at construction.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    #[must_use]
    pub fn orbit_radius(&self) -> f32 {
        self.orbit_radius
    }

    // ========================================================================
    // Free-look steering
    // ========================================================================

    /// Moves eye and target together, preserving the view direction.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.target += offset;
    }

    /// Applies a cursor delta in pixels. `sensitivity` is degrees per
    /// pixel; positive `delta.y` (cursor moving down) pitches the view
    /// down. The target is re-derived so `view_matrix()` follows the new
    /// heading immediately.
    pub fn apply_look_delta(&mut self, delta: Vec2, sensitivity: f32) {
        self.yaw += (delta.x * sensitivity).to_radians();
        self.pitch -= (delta.y * sensitivity).to_radians();

        let limit = PITCH_LIMIT_DEG.to_radians();
        self.pitch = self.pitch.clamp(-limit, limit);

        self.target = self.position + self.front();
    }

    /// Unit view direction derived from yaw and pitch.
    #[must_use]
    pub fn front(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Unit right vector, perpendicular to `front` and `up`.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.front().cross(self.up).normalize()
    }
}
