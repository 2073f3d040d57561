//! Voxel data structures and operations

pub mod coord;
pub mod material;
pub mod brick;
pub mod brick_index;
pub mod material_store;
pub mod offset_ledger;
mod staging;
pub mod brick_store;
pub mod gpu;
pub mod grid;
pub mod shared;

pub use brick::{Brick, BRICK_RECORD_SIZE};
pub use brick_index::{BrickIndex, NO_BRICK};
pub use brick_store::BrickStore;
pub use coord::{BRICK_SIZE, VOXELS_PER_BRICK};
pub use gpu::GpuBuffers;
pub use grid::{Grid, GridType, VoxelGrid};
pub use material::{material_palette, Material, MaterialInfo};
pub use material_store::MaterialStore;
pub use offset_ledger::OffsetLedger;
pub use shared::SharedBrickStore;
