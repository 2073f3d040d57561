//! 8x8x8 occupancy brick with an offset into the material store

use bytemuck::{Pod, Zeroable};

use super::material_store::{prefix_popcount, WORDS_PER_BRICK};

/// Size of one brick record in the GPU brick buffer
pub const BRICK_RECORD_SIZE: usize = std::mem::size_of::<Brick>();

/// Occupancy bitmask plus material offset - 72 bytes
///
/// Word `i` of the bitmask covers local indices `[64*i, 64*i + 64)`. The
/// trailing padding keeps the record 8-byte aligned for the shader side.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Brick {
    pub bitmask: [u64; WORDS_PER_BRICK],
    pub material_offset: u32,
    _padding: u32,
}

impl Brick {
    /// Brick with no occupied voxels
    pub const EMPTY: Brick = Brick {
        bitmask: [0; WORDS_PER_BRICK],
        material_offset: 0,
        _padding: 0,
    };

    pub fn new(bitmask: [u64; WORDS_PER_BRICK], material_offset: u32) -> Self {
        Self {
            bitmask,
            material_offset,
            _padding: 0,
        }
    }

    /// Check if the voxel at `local` is occupied
    pub fn is_set(&self, local: u32) -> bool {
        self.bitmask[local as usize / 64] & (1u64 << (local % 64)) != 0
    }

    /// Mark `local` occupied. Returns true if the bit was previously clear.
    pub fn set(&mut self, local: u32) -> bool {
        let word = &mut self.bitmask[local as usize / 64];
        let bit = 1u64 << (local % 64);
        let was_clear = *word & bit == 0;
        *word |= bit;
        was_clear
    }

    /// Position of `local` within this brick's material run
    pub fn rank(&self, local: u32) -> u32 {
        prefix_popcount(&self.bitmask, local)
    }

    /// Number of occupied voxels
    pub fn voxel_count(&self) -> u32 {
        self.bitmask.iter().map(|w| w.count_ones()).sum()
    }

    /// Iterate occupied local indices in ascending order
    pub fn occupied(&self) -> impl Iterator<Item = u32> + '_ {
        self.bitmask.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros();
                bits &= bits - 1;
                Some(w as u32 * 64 + bit)
            })
        })
    }
}
