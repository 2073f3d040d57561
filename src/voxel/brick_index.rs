//! BrickIndex - dense brick coordinate to brick slot lookup.

use glam::{IVec3, UVec3};

use crate::core::{Error, Result};
use super::coord::{brick_in_bounds, BRICK_SIZE};

/// Sentinel value indicating no brick is allocated at a coordinate
pub const NO_BRICK: u32 = u32::MAX;

/// Dense index over the bounded brick grid.
///
/// Flattened as `x + y*dim_x + z*dim_x*dim_y`. Slots are only ever assigned,
/// never cleared.
#[derive(Clone, Debug)]
pub struct BrickIndex {
    dimensions: UVec3,
    slots: Vec<u32>,
}

impl BrickIndex {
    /// Create an index with every slot unallocated.
    pub fn new(dimensions: UVec3) -> Result<Self> {
        let cells = validate_dimensions(dimensions)?;
        Ok(Self {
            dimensions,
            slots: vec![NO_BRICK; cells],
        })
    }

    /// Grid dimensions in bricks.
    pub fn dimensions(&self) -> UVec3 {
        self.dimensions
    }

    /// Flattened slot index for a brick coordinate, if in bounds.
    pub fn linearize(&self, coord: IVec3) -> Option<usize> {
        if !brick_in_bounds(coord, self.dimensions) {
            return None;
        }
        let c = coord.as_uvec3();
        let d = self.dimensions;
        Some(c.x as usize + c.y as usize * d.x as usize + c.z as usize * d.x as usize * d.y as usize)
    }

    /// Brick slot at a coordinate, `None` if out of bounds or unallocated.
    pub fn get(&self, coord: IVec3) -> Option<u32> {
        self.linearize(coord)
            .map(|i| self.slots[i])
            .filter(|&slot| slot != NO_BRICK)
    }

    /// Record `slot` as the brick for `coord`.
    pub fn assign(&mut self, coord: IVec3, slot: u32) -> Result<()> {
        let i = self.linearize(coord).ok_or(Error::BrickOutOfRange {
            coord,
            dimensions: self.dimensions,
        })?;
        debug_assert_eq!(self.slots[i], NO_BRICK, "brick slot reassigned at {coord}");
        self.slots[i] = slot;
        Ok(())
    }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Raw slot array, sentinel for unallocated.
    pub fn as_slice(&self) -> &[u32] {
        &self.slots
    }
}

/// Checks dimensions and returns the cell count.
///
/// Every axis must be non-zero, the voxel extent must fit `i32`, and the brick
/// count must stay below the sentinel so every slot index is representable.
pub fn validate_dimensions(dimensions: UVec3) -> Result<usize> {
    let invalid = Error::InvalidDimensions(dimensions);
    if dimensions.cmpeq(UVec3::ZERO).any() {
        return Err(invalid);
    }
    if dimensions.max_element() > (i32::MAX / BRICK_SIZE) as u32 {
        return Err(invalid);
    }
    let cells = (dimensions.x as u64)
        .checked_mul(dimensions.y as u64)
        .and_then(|c| c.checked_mul(dimensions.z as u64))
        .filter(|&c| c < NO_BRICK as u64)
        .ok_or(invalid)?;
    usize::try_from(cells).map_err(|_| Error::InvalidDimensions(dimensions))
}
