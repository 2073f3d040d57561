//! Brick slots ordered by material offset
//!
//! Inserting a value into the material store moves every later brick run one
//! slot right. Because the ledger is sorted by offset, those bricks form a
//! suffix found by binary search, and a uniform +1 keeps the order intact.

use super::brick::Brick;

#[derive(Clone, Debug, Default)]
pub struct OffsetLedger {
    slots: Vec<u32>,
}

impl OffsetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// First ledger position whose brick offset is `>= offset`
    fn lower_bound(&self, bricks: &[Brick], offset: u32) -> usize {
        self.slots
            .partition_point(|&slot| bricks[slot as usize].material_offset < offset)
    }

    /// Insert a brick slot at its sorted position
    pub fn insert(&mut self, slot: u32, bricks: &[Brick]) {
        let offset = bricks[slot as usize].material_offset;
        let at = self.lower_bound(bricks, offset);
        self.slots.insert(at, slot);
    }

    /// Shift every brick other than `owner` whose run starts at or after
    /// `insertion_point` by one. Returns the number of bricks moved.
    ///
    /// Offsets are unique since each brick owns at least one voxel, so
    /// `owner` can only appear at the first position of the suffix.
    pub fn shift_from(&self, insertion_point: u32, owner: u32, bricks: &mut [Brick]) -> usize {
        let mut start = self.lower_bound(bricks, insertion_point);
        if self.slots.get(start) == Some(&owner) {
            start += 1;
        }
        for &slot in &self.slots[start..] {
            bricks[slot as usize].material_offset += 1;
        }
        self.slots.len() - start
    }

    /// Reset to brick-array order, which is offset order after a linear rebuild
    pub fn reset(&mut self, brick_count: usize) {
        self.slots.clear();
        self.slots.extend(0..brick_count as u32);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    /// Check the ledger is sorted by the current offsets
    pub fn is_sorted(&self, bricks: &[Brick]) -> bool {
        self.slots
            .windows(2)
            .all(|w| bricks[w[0] as usize].material_offset < bricks[w[1] as usize].material_offset)
    }
}
