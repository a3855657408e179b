//! Index and border extraction from a finished tree.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use roam_core::GridPos;

use crate::node::{NodeId, TriNode};
use crate::pool::TriNodePool;
use crate::tree::resolve;

/// Colour of the skirt's top edge.
pub const BORDER_TOP_COLOR: [u8; 4] = [255, 255, 255, 255];
/// Colour of the skirt's bottom edge, faded out.
pub const BORDER_BOTTOM_COLOR: [u8; 4] = [255, 255, 255, 0];

/// Vertex of the border skirt mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BorderVertex {
    pub position: Vec3,
    pub color: [u8; 4],
}

impl BorderVertex {
    #[inline]
    pub const fn new(position: Vec3, color: [u8; 4]) -> Self {
        Self { position, color }
    }
}

/// Read-only walk over a patch's tree and its vertex grid.
pub(crate) struct TreeWalk<'a> {
    pub roots: &'a [TriNode; 2],
    pub pool: &'a TriNodePool,
    pub vertices: &'a [Vec3],
    pub stride: u32,
}

impl TreeWalk<'_> {
    #[inline]
    fn node(&self, id: NodeId) -> &TriNode {
        resolve(self.roots, self.pool, id)
    }

    #[inline]
    fn vertex(&self, pos: GridPos) -> Vec3 {
        self.vertices[pos.to_index(self.stride)]
    }

    /// Emit `apex, left, right` vertex indices for every leaf below `id`.
    pub fn indices(
        &self,
        id: NodeId,
        left: GridPos,
        right: GridPos,
        apex: GridPos,
        out: &mut Vec<u32>,
    ) {
        let Some(pair) = self.node(id).children else {
            out.extend(
                [apex, left, right]
                    .into_iter()
                    .map(|pos| pos.to_index(self.stride) as u32),
            );
            return;
        };

        let center = left.midpoint(right);
        self.indices(pair.left(), apex, left, center, out);
        self.indices(pair.right(), right, apex, center, out);
    }

    /// Emit skirt triangles for the leaves of `id` lying on one patch edge.
    ///
    /// At even depths the edge runs along the hypotenuse and both children
    /// touch it; at odd depths it is one leg and only the child on that side
    /// does. `left_child` tracks which leg that is.
    #[allow(clippy::too_many_arguments)]
    pub fn border(
        &self,
        id: NodeId,
        left: GridPos,
        right: GridPos,
        apex: GridPos,
        depth: u32,
        left_child: bool,
        bottom: f32,
        out: &mut Vec<BorderVertex>,
    ) {
        let Some(pair) = self.node(id).children else {
            let (a, b) = if depth % 2 == 0 {
                (left, right)
            } else if left_child {
                (apex, left)
            } else {
                (right, apex)
            };
            Self::push_skirt(self.vertex(a), self.vertex(b), bottom, out);
            return;
        };

        let center = left.midpoint(right);
        if depth % 2 == 0 {
            self.border(pair.left(), apex, left, center, depth + 1, !left_child, bottom, out);
            self.border(pair.right(), right, apex, center, depth + 1, left_child, bottom, out);
        } else if left_child {
            self.border(pair.left(), apex, left, center, depth + 1, true, bottom, out);
        } else {
            self.border(pair.right(), right, apex, center, depth + 1, true, bottom, out);
        }
    }

    /// Two triangles hanging from the edge `a`-`b` down to `bottom`.
    fn push_skirt(a: Vec3, b: Vec3, bottom: f32, out: &mut Vec<BorderVertex>) {
        let a_low = Vec3::new(a.x, bottom, a.z);
        let b_low = Vec3::new(b.x, bottom, b.z);
        out.extend([
            BorderVertex::new(a, BORDER_TOP_COLOR),
            BorderVertex::new(a_low, BORDER_BOTTOM_COLOR),
            BorderVertex::new(b, BORDER_TOP_COLOR),
            BorderVertex::new(b, BORDER_TOP_COLOR),
            BorderVertex::new(a_low, BORDER_BOTTOM_COLOR),
            BorderVertex::new(b_low, BORDER_BOTTOM_COLOR),
        ]);
    }
}
