//! Height sources: the elevation grid the mesh engine samples.
//!
//! Heights are stored per grid *corner*, so a map of `W x H` cells has
//! `(W + 1) x (H + 1)` samples.

use crate::coords::{GridPos, GridRect};
use crate::error::{Error, Result};

/// Read-only access to corner elevations addressed by absolute grid position.
pub trait HeightSource {
    /// Number of cells along x.
    fn cells_x(&self) -> u32;

    /// Number of cells along z.
    fn cells_z(&self) -> u32;

    /// Elevation at a corner. Positions outside the grid are clamped.
    fn corner_height(&self, pos: GridPos) -> f32;

    /// Current lowest elevation on the map.
    fn min_height(&self) -> f32;

    /// Current highest elevation on the map.
    fn max_height(&self) -> f32;

    /// Rectangle of valid corner positions.
    fn corner_rect(&self) -> GridRect {
        GridRect::new(0, 0, self.cells_x() as i32, self.cells_z() as i32)
    }
}

/// Dense row-major grid of corner heights.
#[derive(Clone, Debug)]
pub struct HeightMap {
    cells_x: u32,
    cells_z: u32,
    heights: Vec<f32>,
    min_height: f32,
    max_height: f32,
}

impl HeightMap {
    /// Create a flat map of `cells_x x cells_z` cells at height `level`.
    pub fn flat(cells_x: u32, cells_z: u32, level: f32) -> Self {
        let len = (cells_x as usize + 1) * (cells_z as usize + 1);
        Self {
            cells_x,
            cells_z,
            heights: vec![level; len],
            min_height: level,
            max_height: level,
        }
    }

    /// Build a map from an existing corner-height buffer.
    pub fn from_heights(cells_x: u32, cells_z: u32, heights: Vec<f32>) -> Result<Self> {
        let expected = (cells_x as usize + 1) * (cells_z as usize + 1);
        if heights.len() != expected {
            return Err(Error::InvalidData(format!(
                "height buffer holds {} samples, a {cells_x}x{cells_z} map needs {expected}",
                heights.len()
            )));
        }

        let mut map = Self {
            cells_x,
            cells_z,
            heights,
            min_height: 0.0,
            max_height: 0.0,
        };
        map.recompute_bounds();
        Ok(map)
    }

    /// Number of corner samples per row.
    #[inline]
    pub const fn stride(&self) -> u32 {
        self.cells_x + 1
    }

    /// Set the elevation of a single corner.
    ///
    /// Min/max bounds are widened immediately; call
    /// [`HeightMap::recompute_bounds`] after lowering peaks.
    pub fn set_height(&mut self, pos: GridPos, height: f32) -> Result<()> {
        if !self.corner_rect().contains(pos) {
            return Err(Error::OutOfBounds(format!(
                "corner ({}, {}) outside {}x{} map",
                pos.x, pos.z, self.cells_x, self.cells_z
            )));
        }
        let index = pos.to_index(self.stride());
        self.heights[index] = height;
        self.min_height = self.min_height.min(height);
        self.max_height = self.max_height.max(height);
        Ok(())
    }

    /// Recompute the cached min/max elevation from all samples.
    pub fn recompute_bounds(&mut self) {
        let (min, max) = self
            .heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            });
        if min <= max {
            self.min_height = min;
            self.max_height = max;
        }
    }
}

impl HeightSource for HeightMap {
    fn cells_x(&self) -> u32 {
        self.cells_x
    }

    fn cells_z(&self) -> u32 {
        self.cells_z
    }

    fn corner_height(&self, pos: GridPos) -> f32 {
        let x = pos.x.clamp(0, self.cells_x as i32);
        let z = pos.z.clamp(0, self.cells_z as i32);
        self.heights[GridPos::new(x, z).to_index(self.stride())]
    }

    fn min_height(&self) -> f32 {
        self.min_height
    }

    fn max_height(&self) -> f32 {
        self.max_height
    }
}
