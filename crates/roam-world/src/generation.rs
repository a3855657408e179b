//! Procedural height map generation.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rayon::prelude::*;
use roam_core::{HeightMap, HeightSource, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::WorldSeed;

/// Terrain generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Seed for noise generation.
    pub seed: WorldSeed,
    /// Map size along x, in cells.
    pub cells_x: u32,
    /// Map size along z, in cells.
    pub cells_z: u32,
    /// Elevation of the noise midpoint. Below zero is water.
    pub base_height: f64,
    /// Maximum deviation from the base height.
    pub relief: f64,
    /// Horizontal scale of terrain features, in cells.
    pub terrain_scale: f64,
    /// Number of noise octaves for detail.
    pub octaves: usize,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            cells_x: 512,
            cells_z: 512,
            base_height: 40.0,
            relief: 200.0,
            terrain_scale: 160.0,
            octaves: 5,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

/// Procedural height map generator using fractal noise.
pub struct TerrainGenerator {
    config: TerrainConfig,
    height_noise: Fbm<Perlin>,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given configuration.
    pub fn new(config: TerrainConfig) -> Self {
        let height_noise = Fbm::<Perlin>::new(config.seed as u32)
            .set_octaves(config.octaves)
            .set_lacunarity(config.lacunarity)
            .set_persistence(config.persistence);

        Self {
            config,
            height_noise,
        }
    }

    /// Create a terrain generator with default configuration.
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self::new(TerrainConfig {
            seed,
            ..Default::default()
        })
    }

    /// Get the terrain configuration.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Elevation at a map corner.
    pub fn height_at(&self, x: i64, z: i64) -> f32 {
        let nx = x as f64 / self.config.terrain_scale;
        let nz = z as f64 / self.config.terrain_scale;

        // Noise returns roughly [-1, 1]
        let noise_value = self.height_noise.get([nx, nz]);
        (self.config.base_height + noise_value * self.config.relief) as f32
    }

    /// Generate the full corner grid, one row per rayon task.
    pub fn generate(&self) -> Result<HeightMap> {
        let (cells_x, cells_z) = (self.config.cells_x, self.config.cells_z);
        let stride = cells_x as usize + 1;

        let mut heights = vec![0.0; stride * (cells_z as usize + 1)];
        heights
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(z, row)| {
                for (x, height) in row.iter_mut().enumerate() {
                    *height = self.height_at(x as i64, z as i64);
                }
            });

        let map = HeightMap::from_heights(cells_x, cells_z, heights)?;
        info!(
            "Generated {}x{} height map (seed {}), heights {:.1}..{:.1}",
            cells_x,
            cells_z,
            self.config.seed,
            map.min_height(),
            map.max_height()
        );
        Ok(map)
    }
}
