//! Coordinates on the height-map corner grid.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Position on the corner grid (x east, z south), in cells.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct GridPos {
    pub x: i32,
    pub z: i32,
}

impl GridPos {
    /// Create a new grid position
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Midpoint between two grid positions, rounded towards negative infinity.
    #[inline]
    pub const fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) >> 1,
            z: (self.z + other.z) >> 1,
        }
    }

    /// Absolute per-axis distance to another position.
    #[inline]
    pub const fn span(self, other: Self) -> (u32, u32) {
        (self.x.abs_diff(other.x), self.z.abs_diff(other.z))
    }

    /// Translate by another position.
    #[inline]
    pub const fn offset(self, by: Self) -> Self {
        Self {
            x: self.x + by.x,
            z: self.z + by.z,
        }
    }

    /// Linear index into a row-major grid with `stride` columns.
    #[inline]
    pub const fn to_index(self, stride: u32) -> usize {
        self.x as usize + self.z as usize * stride as usize
    }

    /// World-space position of this corner at the given height, with cells
    /// `square_size` world units wide.
    #[inline]
    pub fn to_world(self, height: f32, square_size: f32) -> Vec3 {
        Vec3::new(
            self.x as f32 * square_size,
            height,
            self.z as f32 * square_size,
        )
    }
}

/// Inclusive rectangle of corner-grid positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x1: i32,
    pub z1: i32,
    pub x2: i32,
    pub z2: i32,
}

impl GridRect {
    /// Create a rectangle from its inclusive corners.
    #[inline]
    pub const fn new(x1: i32, z1: i32, x2: i32, z2: i32) -> Self {
        Self { x1, z1, x2, z2 }
    }

    /// Rectangle covering `size` cells (so `size + 1` corners) from `origin`.
    #[inline]
    pub const fn from_origin(origin: GridPos, size: u32) -> Self {
        Self {
            x1: origin.x,
            z1: origin.z,
            x2: origin.x + size as i32,
            z2: origin.z + size as i32,
        }
    }

    /// Check if the rectangle contains no positions.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x2 < self.x1 || self.z2 < self.z1
    }

    /// Check if a position lies inside the rectangle.
    #[inline]
    pub const fn contains(&self, pos: GridPos) -> bool {
        pos.x >= self.x1 && pos.x <= self.x2 && pos.z >= self.z1 && pos.z <= self.z2
    }

    /// Intersection of two rectangles, `None` if they do not overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let rect = Self {
            x1: self.x1.max(other.x1),
            z1: self.z1.max(other.z1),
            x2: self.x2.min(other.x2),
            z2: self.z2.min(other.z2),
        };
        (!rect.is_empty()).then_some(rect)
    }

    /// Translate the rectangle so that `origin` becomes (0, 0).
    #[inline]
    pub const fn relative_to(&self, origin: GridPos) -> Self {
        Self {
            x1: self.x1 - origin.x,
            z1: self.z1 - origin.z,
            x2: self.x2 - origin.x,
            z2: self.z2 - origin.z,
        }
    }

    /// Iterate over every position in the rectangle, row by row.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let (x1, x2) = (self.x1, self.x2);
        (self.z1..=self.z2).flat_map(move |z| (x1..=x2).map(move |x| GridPos::new(x, z)))
    }
}
