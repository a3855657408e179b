//! Variance tables.
//!
//! A variance table stores, per triangle of a fixed-depth heap, the largest
//! height error found anywhere in that triangle's footprint. The walk follows
//! the geometric bisection only and never looks at the live tree.

use roam_core::GridPos;

/// Error multiplier for triangles crossing the shoreline (height sign change).
pub const SHORE_VARIANCE_SCALE: f32 = 1.5;
/// Minimum error for triangles crossing the shoreline.
pub const SHORE_VARIANCE_FLOOR: f32 = 20.0;
/// Stored variances never drop below this.
pub const MIN_VARIANCE: f32 = 0.001;
/// Recursion continues while the hypotenuse spans at least this many cells
/// along some axis.
pub const MIN_VARIANCE_SPAN: u32 = 4;

/// Fixed-depth heap of variances for one base triangle, indexed from 1.
#[derive(Clone, Debug, PartialEq)]
pub struct VarianceTable {
    values: Vec<f32>,
}

impl VarianceTable {
    /// A table of `1 << depth` entries, all at the floor.
    pub fn new(depth: u32) -> Self {
        Self {
            values: vec![MIN_VARIANCE; 1 << depth],
        }
    }

    /// Stored variance of heap node `node`, if the table reaches that deep.
    #[inline]
    pub fn get(&self, node: usize) -> Option<f32> {
        self.values.get(node).copied().filter(|_| node > 0)
    }

    /// Number of slots, including the unused slot 0.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.len() <= 1
    }

    /// Rebuild the table for the triangle `(left, right, apex)`, sampling
    /// heights through `height`. Returns the root variance.
    pub fn compute<F>(&mut self, left: GridPos, right: GridPos, apex: GridPos, height: F) -> f32
    where
        F: Fn(GridPos) -> f32,
    {
        let heights = [height(left), height(right), height(apex)];
        let mut walk = VarianceWalk {
            values: &mut self.values,
            height: &height,
        };
        walk.recurse(left, right, apex, heights, 1)
    }
}

struct VarianceWalk<'a, F> {
    values: &'a mut [f32],
    height: &'a F,
}

impl<F> VarianceWalk<'_, F>
where
    F: Fn(GridPos) -> f32,
{
    /// `heights` holds the heights at left, right and apex.
    fn recurse(
        &mut self,
        left: GridPos,
        right: GridPos,
        apex: GridPos,
        heights: [f32; 3],
        node: usize,
    ) -> f32 {
        let [left_h, right_h, apex_h] = heights;
        let center = left.midpoint(right);
        let center_h = (self.height)(center);

        let mut variance = (center_h - (left_h + right_h) * 0.5).abs();

        if left_h * right_h < 0.0 || left_h * center_h < 0.0 || right_h * center_h < 0.0 {
            variance = (variance * SHORE_VARIANCE_SCALE).max(SHORE_VARIANCE_FLOOR);
        }

        let (span_x, span_z) = left.span(right);
        if span_x >= MIN_VARIANCE_SPAN || span_z >= MIN_VARIANCE_SPAN {
            let left_child =
                self.recurse(apex, left, center, [apex_h, left_h, center_h], node << 1);
            let right_child = self.recurse(
                right,
                apex,
                center,
                [right_h, apex_h, center_h],
                (node << 1) | 1,
            );
            variance = variance.max(left_child).max(right_child);
        }

        let variance = variance.max(MIN_VARIANCE);
        if let Some(slot) = self.values.get_mut(node) {
            *slot = variance;
        }
        variance
    }
}
