//! Host world seam and an in-memory grid host.
#![forbid(unsafe_code)]

pub mod grid;
pub mod host;
pub mod terrain;

pub use grid::{Block, VoxelGrid};
pub use host::{BlockQuery, LightChannel, PlayerSource, QueryError, SharedPlayer};
pub use terrain::TerrainParams;
