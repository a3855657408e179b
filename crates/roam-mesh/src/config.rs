//! Mesh engine configuration.

use roam_core::constants::{PATCH_SIZE, SQUARE_SIZE, VARIANCE_DEPTH};
use roam_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default node budget per render pass, split over all workers.
pub const DEFAULT_POOL_SIZE: usize = 1 << 19;

/// Configuration for patch layout, node pools and tessellation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Patch edge length in cells. Must be a power of two.
    pub patch_size: u32,
    /// Depth of the stored variance tree; tables hold `1 << depth` entries.
    pub variance_depth: u32,
    /// World units per grid cell.
    pub square_size: f32,
    /// Node budget per pass at startup, split over all workers.
    pub initial_pool_size: usize,
    /// Ceiling the pool set may grow to after running out of nodes.
    pub max_pool_size: usize,
    /// Number of node pools (workers) per pass. 0 = rayon's thread count.
    pub worker_threads: usize,
    /// Elevation the border skirt extends down to.
    pub border_depth: f32,
    /// Camera movement (world units) that triggers re-tessellation.
    /// 0 re-tessellates every frame.
    pub retessellate_distance: f32,
}

impl MeshConfig {
    /// Check that the configuration describes a usable mesh.
    pub fn validate(&self) -> Result<()> {
        if !self.patch_size.is_power_of_two() || self.patch_size < 4 {
            return Err(Error::InvalidConfig(format!(
                "patch size must be a power of two >= 4, got {}",
                self.patch_size
            )));
        }
        if self.variance_depth == 0 || self.variance_depth > 24 {
            return Err(Error::InvalidConfig(format!(
                "variance depth must be within 1..=24, got {}",
                self.variance_depth
            )));
        }
        if self.square_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "square size must be positive, got {}",
                self.square_size
            )));
        }
        if self.max_pool_size < self.initial_pool_size {
            return Err(Error::InvalidConfig(format!(
                "max pool size {} is below initial pool size {}",
                self.max_pool_size, self.initial_pool_size
            )));
        }
        Ok(())
    }

    /// Number of vertices along one patch edge.
    #[inline]
    pub const fn vertices_per_side(&self) -> u32 {
        self.patch_size + 1
    }

    /// Deepest recursion any tree walk reaches: two levels per halving of
    /// the patch edge, plus the root.
    #[inline]
    pub const fn max_tree_depth(&self) -> u32 {
        2 * self.patch_size.trailing_zeros() + 1
    }

    /// Resolve the number of node pools per pass.
    pub fn resolved_workers(&self) -> usize {
        if self.worker_threads == 0 {
            rayon::current_num_threads().max(1)
        } else {
            self.worker_threads
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            patch_size: PATCH_SIZE,
            variance_depth: VARIANCE_DEPTH,
            square_size: SQUARE_SIZE,
            initial_pool_size: DEFAULT_POOL_SIZE,
            max_pool_size: DEFAULT_POOL_SIZE * 8,
            worker_threads: 0,
            border_depth: -400.0,
            retessellate_distance: 0.0,
        }
    }
}
