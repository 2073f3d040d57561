//! Brickgrid - sparse voxel brick store
//!
//! A bounded grid of 8x8x8 bricks. Each brick keeps a 512-bit occupancy mask
//! and an offset into one globally compacted material array, which together
//! with a dense brick index form the three buffers a ray marcher consumes.

pub mod core;
pub mod config;
pub mod voxel;
pub mod terrain;
