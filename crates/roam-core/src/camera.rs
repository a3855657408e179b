//! Camera and view management.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::Frustum;

/// Kind of camera a patch can be seen by; each kind keeps its own
/// visibility stamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraKind {
    /// The main player view.
    Player,
    /// The light's view while rendering shadow maps.
    Shadow,
    /// Mirrored view used for water reflections.
    Reflection,
}

impl CameraKind {
    /// Number of camera kinds.
    pub const COUNT: usize = 3;

    /// All camera kinds, in index order.
    pub const ALL: [Self; Self::COUNT] = [Self::Player, Self::Shadow, Self::Reflection];

    /// Index into per-kind arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Camera for rendering.
#[derive(Debug, Clone)]
pub struct Camera {
    pub kind: CameraKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            kind: CameraKind::Player,
            position: Vec3::new(0.0, 500.0, 0.0),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 20000.0,
        }
    }
}

impl Camera {
    /// Create a new player camera looking at `target`.
    pub fn new(position: Vec3, target: Vec3, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            kind: CameraKind::Player,
            position,
            direction: (target - position).normalize(),
            up: Vec3::Y,
            fov,
            aspect,
            near,
            far,
        }
    }

    /// The same view, stamped as a different kind of camera.
    #[must_use]
    pub const fn with_kind(mut self, kind: CameraKind) -> Self {
        self.kind = kind;
        self
    }

    /// Look at a target position.
    pub fn look_at(&mut self, target: Vec3) {
        self.direction = (target - self.position).normalize();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.direction, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get the view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Extract frustum planes from the current camera state.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(self.view_projection_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Aabb;
    use approx::assert_relative_eq;

    #[test]
    fn look_at_normalizes_direction() {
        let mut camera = Camera {
            position: Vec3::ZERO,
            ..Default::default()
        };
        camera.look_at(Vec3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(camera.direction.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.direction.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn frustum_sees_ground_below_looking_down() {
        let camera = Camera::new(
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
            std::f32::consts::FRAC_PI_3,
            1.0,
            1.0,
            1000.0,
        );
        let frustum = camera.frustum();
        let below = Aabb::new(Vec3::new(-10.0, -1.0, -11.0), Vec3::new(10.0, 1.0, 9.0));
        let above = Aabb::new(Vec3::new(-10.0, 300.0, -10.0), Vec3::new(10.0, 310.0, 10.0));
        assert!(frustum.test_aabb(&below));
        assert!(!frustum.test_aabb(&above));
    }

    #[test]
    fn with_kind_keeps_the_view() {
        let camera = Camera::default().with_kind(CameraKind::Reflection);
        assert_eq!(camera.kind, CameraKind::Reflection);
        assert_eq!(camera.position, Camera::default().position);
    }

    #[test]
    fn camera_kind_indices_are_dense() {
        for (i, kind) in CameraKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
