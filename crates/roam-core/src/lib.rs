//! Core types, math, and traits for the ROAM terrain engine.
//!
//! This crate provides the foundational types used throughout the engine:
//! - Grid coordinates and rectangles on the height-map corner grid
//! - Math utilities (bounding boxes, frustum tests)
//! - The camera used to drive level-of-detail and visibility
//! - The height-source interface and a dense height map
//! - Common error types

pub mod camera;
pub mod coords;
pub mod error;
pub mod heightmap;
pub mod math;

pub use camera::{Camera, CameraKind};
pub use coords::{GridPos, GridRect};
pub use error::{Error, Result};
pub use heightmap::{HeightMap, HeightSource};

/// Engine-wide constants
pub mod constants {
    /// World units per height-map cell.
    pub const SQUARE_SIZE: f32 = 8.0;
    /// Default patch edge length in cells.
    pub const PATCH_SIZE: u32 = 128;
    /// Default depth of the stored variance tree.
    pub const VARIANCE_DEPTH: u32 = 12;
}
