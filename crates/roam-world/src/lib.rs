//! Height map generation and deformation for the ROAM terrain engine.

pub mod deform;
pub mod generation;

pub use deform::dig_crater;
pub use generation::{TerrainConfig, TerrainGenerator};

/// World seed for procedural generation.
pub type WorldSeed = u64;
