//! Globally compacted material array
//!
//! One entry per occupied voxel across all bricks. Each brick owns a
//! contiguous run starting at its `material_offset`, ordered by in-brick bit
//! order.

use super::material::Material;

/// Number of 64-bit words in a brick occupancy bitmask
pub const WORDS_PER_BRICK: usize = super::coord::VOXELS_PER_BRICK / 64;

/// Count set bits strictly below `local` across a brick bitmask.
///
/// This is the rank of a local voxel inside its brick's material run.
pub fn prefix_popcount(bitmask: &[u64; WORDS_PER_BRICK], local: u32) -> u32 {
    let word = local as usize / 64;
    let bit = local % 64;
    let full: u32 = bitmask[..word].iter().map(|w| w.count_ones()).sum();
    let partial = (bitmask[word] & ((1u64 << bit) - 1)).count_ones();
    full + partial
}

/// Densely packed material values
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialStore {
    values: Vec<Material>,
}

impl MaterialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Material> {
        self.values.get(index).copied()
    }

    /// Append a value, returning its index
    pub fn push(&mut self, material: Material) -> usize {
        self.values.push(material);
        self.values.len() - 1
    }

    /// Overwrite the value at `index` in place
    pub fn overwrite(&mut self, index: usize, material: Material) {
        self.values[index] = material;
    }

    /// Insert at `index`, shifting every later entry right by one
    pub fn insert(&mut self, index: usize, material: Material) {
        self.values.insert(index, material);
    }

    /// Append a run copied from another store
    pub fn extend_from(&mut self, other: &MaterialStore, start: usize, len: usize) {
        self.values.extend_from_slice(&other.values[start..start + len]);
    }

    pub fn as_slice(&self) -> &[Material] {
        &self.values
    }

    /// Material ordinals in storage order
    pub fn ordinals(&self) -> Vec<u32> {
        self.values.iter().map(|m| m.ordinal()).collect()
    }
}
