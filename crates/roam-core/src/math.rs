//! Bounding boxes and view frustum culling.

use glam::{Mat4, Vec3, Vec4};

/// World-space axis-aligned box, used for patch culling.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Corner furthest along `normal`.
    #[inline]
    fn positive_vertex(&self, normal: Vec3) -> Vec3 {
        Vec3::select(normal.cmpge(Vec3::ZERO), self.max, self.min)
    }
}

/// The six clip planes of a camera, as `(normal, distance)` with normals
/// pointing inward.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far.
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the planes of a right-handed view-projection with a `0..1`
    /// depth range.
    pub fn from_view_projection(vp: Mat4) -> Self {
        let [x, y, z, w] = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];
        Self {
            planes: [w + x, w - x, w + y, w - y, z, w - z].map(normalize_plane),
        }
    }

    /// Conservative test: true if any part of `aabb` may be inside.
    pub fn test_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            normal.dot(aabb.positive_vertex(normal)) + plane.w >= 0.0
        })
    }
}

#[inline]
fn normalize_plane(plane: Vec4) -> Vec4 {
    let len = plane.truncate().length();
    if len > 0.0 {
        plane / len
    } else {
        plane
    }
}
