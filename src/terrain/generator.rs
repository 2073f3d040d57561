//! Noise-based heightmap terrain

use glam::IVec3;
use noise::{NoiseFn, OpenSimplex};
use serde::{Deserialize, Serialize};

use crate::voxel::coord::{local_index, BRICK_SIZE};
use crate::voxel::material::Material;

/// Surface height provider consumed by chunk generation.
///
/// Must be safe to sample from several worker threads at once.
pub trait HeightSource: Sync {
    /// Voxel y of the grass surface for column (x, z)
    fn surface_height(&self, x: i32, z: i32) -> i32;
}

impl<F> HeightSource for F
where
    F: Fn(i32, i32) -> i32 + Sync,
{
    fn surface_height(&self, x: i32, z: i32) -> i32 {
        self(x, z)
    }
}

/// Parameters controlling terrain generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub seed: u32,
    pub frequency: f64,        // Noise samples per voxel (smaller = smoother)
    pub surface_fraction: f64, // Share of world height the surface may span
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 0,
            frequency: 0.01,
            surface_fraction: 0.25,
        }
    }
}

/// OpenSimplex heightmap scaled to the world height
pub struct HeightmapGenerator {
    params: TerrainParams,
    world_height: i32,
    noise: OpenSimplex,
}

impl HeightmapGenerator {
    /// `world_height` is the grid height in voxels
    pub fn new(params: TerrainParams, world_height: i32) -> Self {
        let noise = OpenSimplex::new(params.seed);
        Self {
            params,
            world_height,
            noise,
        }
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Highest surface value this generator can produce
    pub fn max_height(&self) -> i32 {
        (self.world_height as f64 * self.params.surface_fraction + 1.0) as i32
    }
}

impl HeightSource for HeightmapGenerator {
    fn surface_height(&self, x: i32, z: i32) -> i32 {
        let n = self
            .noise
            .get([x as f64 * self.params.frequency, z as f64 * self.params.frequency])
            .clamp(-1.0, 1.0);
        let normalized = (n + 1.0) / 2.0;
        (normalized * self.world_height as f64 * self.params.surface_fraction + 1.0) as i32
    }
}

/// Voxel writes that fill one brick from a heightmap.
///
/// Per column: stone for every in-brick voxel below the surface, grass at the
/// surface when it falls inside the brick. Returns (local index, material)
/// pairs; empty when the brick lies fully above the surface.
pub fn plan_brick<S: HeightSource + ?Sized>(coord: IVec3, source: &S) -> Vec<(u32, Material)> {
    let base = coord * BRICK_SIZE;
    let mut writes = Vec::new();

    for z in 0..BRICK_SIZE {
        for x in 0..BRICK_SIZE {
            let top = source.surface_height(base.x + x, base.z + z);
            if top < base.y {
                continue;
            }

            if top < base.y + BRICK_SIZE {
                let position = IVec3::new(base.x + x, top, base.z + z);
                writes.push((local_index(position), Material::Grass));
            }

            let local_top = (top - base.y).min(BRICK_SIZE);
            for y in 0..local_top {
                let position = IVec3::new(base.x + x, base.y + y, base.z + z);
                writes.push((local_index(position), Material::Stone));
            }
        }
    }

    writes
}
