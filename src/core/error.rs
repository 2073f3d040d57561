//! Error types for the brick store

use glam::{IVec3, UVec3};
use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("voxel position {position} is outside the grid ({dimensions} bricks)")]
    OutOfRange { position: IVec3, dimensions: UVec3 },

    #[error("brick coordinate {coord} is outside the grid ({dimensions} bricks)")]
    BrickOutOfRange { coord: IVec3, dimensions: UVec3 },

    #[error("invalid grid dimensions {0}")]
    InvalidDimensions(UVec3),

    #[error("unknown material ordinal {0}")]
    UnknownMaterial(u32),

    #[error("buffer decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
