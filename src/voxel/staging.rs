//! Dense per-brick staging for bulk writes
//!
//! While a batch is open, every brick it touches is expanded into a full
//! 512-cell array. The committed material store and committed offsets stay
//! untouched until the next rebuild folds the staged bricks back in.

use std::collections::HashMap;

use super::brick::Brick;
use super::coord::VOXELS_PER_BRICK;
use super::material::Material;
use super::material_store::MaterialStore;

type Cells = Box<[Material; VOXELS_PER_BRICK]>;

#[derive(Debug, Default)]
pub struct Staging {
    bricks: HashMap<u32, Cells>,
}

impl Staging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    /// Number of staged bricks
    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    /// Cells for `slot`, expanding the committed run on first touch.
    ///
    /// `brick` must still describe the committed state of the slot.
    pub fn cells_mut(&mut self, slot: u32, brick: &Brick, committed: &MaterialStore) -> &mut [Material; VOXELS_PER_BRICK] {
        self.bricks.entry(slot).or_insert_with(|| {
            let mut cells: Cells = Box::new([Material::Air; VOXELS_PER_BRICK]);
            let offset = brick.material_offset as usize;
            for (rank, local) in brick.occupied().enumerate() {
                if let Some(material) = committed.get(offset + rank) {
                    cells[local as usize] = material;
                }
            }
            cells
        })
    }

    pub fn get(&self, slot: u32, local: u32) -> Option<Material> {
        self.bricks.get(&slot).map(|cells| cells[local as usize])
    }

    pub fn contains(&self, slot: u32) -> bool {
        self.bricks.contains_key(&slot)
    }

    /// Append the occupied cells of a staged brick to `out` in bit order
    pub fn drain_into(&self, slot: u32, brick: &Brick, out: &mut MaterialStore) -> bool {
        match self.bricks.get(&slot) {
            Some(cells) => {
                for local in brick.occupied() {
                    out.push(cells[local as usize]);
                }
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.bricks.clear();
    }
}
