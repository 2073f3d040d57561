//! Storage backend abstraction over voxel grids

use glam::{IVec3, UVec3};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::terrain::HeightSource;
use super::brick_store::BrickStore;
use super::gpu::GpuBuffers;
use super::material::Material;

/// Operations every grid backend provides
pub trait VoxelGrid {
    fn set_voxel(&mut self, position: IVec3, material: Material) -> Result<()>;
    fn get_voxel(&self, position: IVec3) -> Result<Option<Material>>;
    fn fill_region(&mut self, origin: IVec3, extents: IVec3, material: Material) -> Result<()>;
    fn generate_chunk(&mut self, coord: IVec3, source: &dyn HeightSource) -> bool;
    fn export_gpu_buffers(&mut self) -> GpuBuffers;
    /// Number of storage units (bricks for the brick map)
    fn size(&self) -> usize;
    fn size_in_bytes(&self) -> usize;
}

/// Available grid backends
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridType {
    #[default]
    BrickMap,
}

/// A grid of one of the available backends
#[derive(Debug)]
pub enum Grid {
    BrickMap(BrickStore),
}

impl Grid {
    /// Create an empty grid. `dimensions` is in bricks.
    pub fn new(kind: GridType, dimensions: UVec3) -> Result<Self> {
        match kind {
            GridType::BrickMap => Ok(Grid::BrickMap(BrickStore::new(dimensions)?)),
        }
    }

    pub fn kind(&self) -> GridType {
        match self {
            Grid::BrickMap(_) => GridType::BrickMap,
        }
    }

    fn backend(&self) -> &dyn VoxelGrid {
        match self {
            Grid::BrickMap(store) => store,
        }
    }

    fn backend_mut(&mut self) -> &mut dyn VoxelGrid {
        match self {
            Grid::BrickMap(store) => store,
        }
    }
}

impl VoxelGrid for Grid {
    fn set_voxel(&mut self, position: IVec3, material: Material) -> Result<()> {
        self.backend_mut().set_voxel(position, material)
    }

    fn get_voxel(&self, position: IVec3) -> Result<Option<Material>> {
        self.backend().get_voxel(position)
    }

    fn fill_region(&mut self, origin: IVec3, extents: IVec3, material: Material) -> Result<()> {
        self.backend_mut().fill_region(origin, extents, material)
    }

    fn generate_chunk(&mut self, coord: IVec3, source: &dyn HeightSource) -> bool {
        self.backend_mut().generate_chunk(coord, source)
    }

    fn export_gpu_buffers(&mut self) -> GpuBuffers {
        self.backend_mut().export_gpu_buffers()
    }

    fn size(&self) -> usize {
        self.backend().size()
    }

    fn size_in_bytes(&self) -> usize {
        self.backend().size_in_bytes()
    }
}

impl VoxelGrid for BrickStore {
    fn set_voxel(&mut self, position: IVec3, material: Material) -> Result<()> {
        BrickStore::set_voxel(self, position, material)
    }

    fn get_voxel(&self, position: IVec3) -> Result<Option<Material>> {
        BrickStore::get_voxel(self, position)
    }

    fn fill_region(&mut self, origin: IVec3, extents: IVec3, material: Material) -> Result<()> {
        BrickStore::fill_region(self, origin, extents, material)
    }

    fn generate_chunk(&mut self, coord: IVec3, source: &dyn HeightSource) -> bool {
        BrickStore::generate_chunk(self, coord, source)
    }

    fn export_gpu_buffers(&mut self) -> GpuBuffers {
        BrickStore::export_gpu_buffers(self)
    }

    fn size(&self) -> usize {
        self.brick_count()
    }

    fn size_in_bytes(&self) -> usize {
        BrickStore::size_in_bytes(self)
    }
}
