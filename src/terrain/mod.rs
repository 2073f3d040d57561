//! Procedural terrain generation

pub mod generator;
pub use generator::{plan_brick, HeightSource, HeightmapGenerator, TerrainParams};
