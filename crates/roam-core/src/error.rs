//! Error types shared by the terrain crates.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value the mesh cannot work with.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Height data of the wrong shape.
    #[error("Invalid height data: {0}")]
    InvalidData(String),

    /// A grid position outside the map.
    #[error("Grid position out of bounds: {0}")]
    OutOfBounds(String),

    /// Not even a minimal triangle node pool could be allocated.
    #[error("Triangle node pool allocation failed ({requested} nodes requested)")]
    PoolAllocation { requested: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
