//! Adaptive ROAM terrain mesh engine.
//!
//! The map is cut into square patches. Each patch holds two binary triangle
//! trees that are split every frame according to precomputed height error
//! (variance) and camera distance, then flattened into index and border
//! lists for a renderer.
//!
//! Tree nodes come from per-worker [`TriNodePool`]s that are cleared in bulk
//! once per frame, one set per [`MeshPass`]. [`TerrainMesh`] drives a whole
//! map: variance rebuilds, pool growth, parallel tessellation and upload.

pub mod config;
pub mod extract;
pub mod node;
pub mod patch;
pub mod pool;
pub mod render;
pub mod terrain;
pub mod tessellate;
pub mod tree;
pub mod variance;

pub use config::MeshConfig;
pub use extract::BorderVertex;
pub use node::{BaseTriangle, Link, NodeId, TriNode};
pub use patch::{Patch, PatchEdges, ViewParams};
pub use pool::{TriNodePool, TriNodePools};
pub use render::{MeshPass, PatchRenderer, RenderMode};
pub use terrain::{FrameStats, TerrainMesh};
pub use tree::TriTree;
pub use variance::VarianceTable;
