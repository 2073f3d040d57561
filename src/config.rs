//! Store configuration loaded from JSON

use std::path::Path;

use glam::UVec3;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::terrain::{HeightmapGenerator, TerrainParams};
use crate::voxel::brick_store::BrickStore;
use crate::voxel::coord::BRICK_SIZE;

/// Grid and terrain settings for a store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Grid size in bricks (x, y, z)
    pub grid_dimensions: [u32; 3],
    /// Terrain noise parameters
    pub terrain: TerrainParams,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            grid_dimensions: [64, 32, 64],
            terrain: TerrainParams::default(),
        }
    }
}

impl StoreConfig {
    pub fn dimensions(&self) -> UVec3 {
        UVec3::from_array(self.grid_dimensions)
    }

    /// Create an empty store with these dimensions
    pub fn build_store(&self) -> Result<BrickStore> {
        BrickStore::new(self.dimensions())
    }

    /// Heightmap generator scaled to the grid height
    pub fn height_source(&self) -> HeightmapGenerator {
        let world_height = (self.grid_dimensions[1] as i64 * BRICK_SIZE as i64).min(i32::MAX as i64) as i32;
        HeightmapGenerator::new(self.terrain.clone(), world_height)
    }

    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        log::debug!("Loaded store config from {}", path.display());
        Ok(config)
    }

    /// Save as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}
