//! Per-frame tessellation walk.

use glam::Vec3;
use roam_core::GridPos;

use crate::node::NodeId;
use crate::tree::TriTree;
use crate::variance::VarianceTable;

/// Camera distance is scaled by `LOD_FALLOFF_DIVIDEND / view_radius`; raise it
/// to drop detail faster with distance.
pub const LOD_FALLOFF_DIVIDEND: f32 = 300.0;
/// Variances are clamped to `view_radius * VARIANCE_LIMIT_SCALE`, which caps
/// how much detail distant cliffs can demand.
pub const VARIANCE_LIMIT_SCALE: f32 = 0.35;
/// Variance assumed for triangles deeper than the stored table.
pub const UNSTORED_VARIANCE: f32 = 10.0;
/// A triangle splits when its weighted variance exceeds this.
pub const SPLIT_THRESHOLD: f32 = 1.0;

/// Camera dependent LOD inputs of one patch for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodParams {
    /// Inverse scaled camera distance, in `(0, 1]`.
    pub distance_factor: f32,
    /// Upper bound applied to stored variances.
    pub variance_limit: f32,
}

impl LodParams {
    /// LOD inputs for a patch centred at `patch_mid` seen from `camera`.
    pub fn new(patch_mid: Vec3, camera: Vec3, view_radius: f32) -> Self {
        let scaled = patch_mid.distance(camera) * (LOD_FALLOFF_DIVIDEND / view_radius);
        Self {
            distance_factor: 1.0 / scaled.max(1.0),
            variance_limit: view_radius * VARIANCE_LIMIT_SCALE,
        }
    }
}

/// Walks one base triangle's footprint in lock-step with its live tree,
/// splitting wherever the weighted variance asks for more detail.
pub(crate) struct Tessellator<'t, 'a> {
    pub tree: &'t mut TriTree<'a>,
    pub variance: &'t VarianceTable,
    pub lod: LodParams,
    pub patch_size: f32,
}

impl Tessellator<'_, '_> {
    /// Refine the subtree at `id`. Returns `false` once the pool runs out,
    /// after which the caller must stop walking the patch.
    pub fn refine(
        &mut self,
        id: NodeId,
        left: GridPos,
        right: GridPos,
        apex: GridPos,
        node: usize,
    ) -> bool {
        let (span_x, span_z) = left.span(right);
        if span_x <= 1 && span_z <= 1 {
            return true;
        }

        let weighted = self.variance.get(node).map_or(UNSTORED_VARIANCE, |variance| {
            let size = span_x.max(span_z) as f32;
            variance.min(self.lod.variance_limit)
                * self.patch_size
                * size
                * self.lod.distance_factor
        });
        if weighted <= SPLIT_THRESHOLD {
            return true;
        }

        if !self.tree.split(id) {
            return false;
        }

        let Some(pair) = self.tree.node(id).children else {
            return true;
        };
        let center = left.midpoint(right);
        self.refine(pair.left(), apex, left, center, node << 1)
            && self.refine(pair.right(), right, apex, center, (node << 1) | 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn near_camera_gets_full_factor() {
        let lod = LodParams::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 1000.0);
        assert_relative_eq!(lod.distance_factor, 1.0);
        assert_relative_eq!(lod.variance_limit, 350.0);
    }

    #[test]
    fn factor_falls_off_with_distance() {
        let lod = LodParams::new(Vec3::ZERO, Vec3::new(0.0, 400.0, 0.0), 1000.0);
        assert_relative_eq!(lod.distance_factor, 1.0 / 120.0);

        // Larger view radius keeps more detail at the same distance.
        let wide = LodParams::new(Vec3::ZERO, Vec3::new(0.0, 400.0, 0.0), 4000.0);
        assert!(wide.distance_factor > lod.distance_factor);
    }
}
