//! BrickStore - sparse voxel grid packed as bricks plus a compacted material array.
//!
//! Point writes keep every brick offset exact by shifting the ledger suffix
//! after an insertion. Bulk writes (region fills, chunk generation) stage the
//! bricks they touch and mark the offsets stale; the next
//! [`BrickStore::ensure_offsets_valid`] folds everything back in one linear
//! pass.

use glam::{I64Vec3, IVec3, UVec3};
use rayon::prelude::*;

use crate::core::{Error, Result};
use crate::terrain::{plan_brick, HeightSource};
use super::brick::{Brick, BRICK_RECORD_SIZE};
use super::brick_index::BrickIndex;
use super::coord::{brick_in_bounds, split, BRICK_SIZE};
use super::gpu::GpuBuffers;
use super::material::Material;
use super::material_store::MaterialStore;
use super::offset_ledger::OffsetLedger;
use super::staging::Staging;

/// Sparse voxel store over a bounded grid of 8x8x8 bricks
#[derive(Debug)]
pub struct BrickStore {
    /// Bricks in allocation order
    bricks: Vec<Brick>,
    index: BrickIndex,
    materials: MaterialStore,
    ledger: OffsetLedger,
    /// Bricks touched by bulk writes since the last rebuild
    staging: Staging,
    offsets_stale: bool,
    /// Total occupied voxels across all bricks
    voxel_count: usize,
    changed: bool,
}

impl BrickStore {
    /// Create an empty store. `dimensions` is the grid size in bricks.
    pub fn new(dimensions: UVec3) -> Result<Self> {
        let index = BrickIndex::new(dimensions)?;
        log::debug!("Created brick store: {} bricks grid, {} index cells", dimensions, index.len());
        Ok(Self {
            bricks: Vec::new(),
            index,
            materials: MaterialStore::new(),
            ledger: OffsetLedger::new(),
            staging: Staging::new(),
            offsets_stale: false,
            voxel_count: 0,
            changed: false,
        })
    }

    /// Grid dimensions in bricks
    pub fn dimensions(&self) -> UVec3 {
        self.index.dimensions()
    }

    /// Grid dimensions in voxels
    pub fn voxel_dimensions(&self) -> UVec3 {
        self.dimensions() * BRICK_SIZE as u32
    }

    /// Number of allocated bricks
    pub fn brick_count(&self) -> usize {
        self.bricks.len()
    }

    /// Number of occupied voxels
    pub fn voxel_count(&self) -> usize {
        self.voxel_count
    }

    /// Whether bulk writes are waiting for an offset rebuild
    pub fn offsets_stale(&self) -> bool {
        self.offsets_stale
    }

    /// Approximate memory held by the packed representation
    pub fn size_in_bytes(&self) -> usize {
        self.bricks.len() * BRICK_RECORD_SIZE
            + self.index.len() * std::mem::size_of::<u32>()
            + self.voxel_count * std::mem::size_of::<u32>()
    }

    /// Returns true if the store was mutated since the last call
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn check_position(&self, position: IVec3) -> Result<(IVec3, u32)> {
        let (coord, local) = split(position);
        if brick_in_bounds(coord, self.dimensions()) {
            Ok((coord, local))
        } else {
            Err(Error::OutOfRange {
                position,
                dimensions: self.dimensions(),
            })
        }
    }

    fn allocate_brick(&mut self, coord: IVec3) -> Result<u32> {
        let slot = self.bricks.len() as u32;
        self.index.assign(coord, slot)?;
        let mut brick = Brick::EMPTY;
        brick.material_offset = self.materials.len() as u32;
        self.bricks.push(brick);
        log::trace!("Allocated brick {} at {}", slot, coord);
        Ok(slot)
    }

    /// Write one voxel, keeping every brick offset exact.
    pub fn set_voxel(&mut self, position: IVec3, material: Material) -> Result<()> {
        let (coord, local) = self.check_position(position).inspect_err(|e| {
            log::warn!("Rejected voxel write: {}", e);
        })?;

        // Incremental repair assumes committed offsets
        self.ensure_offsets_valid();

        let Some(slot) = self.index.get(coord) else {
            let slot = self.allocate_brick(coord)?;
            self.bricks[slot as usize].set(local);
            self.materials.push(material);
            self.ledger.insert(slot, &self.bricks);
            self.voxel_count += 1;
            self.changed = true;
            return Ok(());
        };

        let brick = &mut self.bricks[slot as usize];
        let target = brick.material_offset + brick.rank(local);

        if brick.set(local) {
            self.materials.insert(target as usize, material);
            self.ledger.shift_from(target, slot, &mut self.bricks);
            self.voxel_count += 1;
        } else {
            self.materials.overwrite(target as usize, material);
        }
        self.changed = true;
        Ok(())
    }

    /// Read the last material written at a position, `None` if never written.
    pub fn get_voxel(&self, position: IVec3) -> Result<Option<Material>> {
        let (coord, local) = self.check_position(position)?;
        let Some(slot) = self.index.get(coord) else {
            return Ok(None);
        };
        let brick = &self.bricks[slot as usize];
        if !brick.is_set(local) {
            return Ok(None);
        }
        if let Some(material) = self.staging.get(slot, local) {
            return Ok(Some(material));
        }
        let at = brick.material_offset as usize + brick.rank(local) as usize;
        Ok(self.materials.get(at))
    }

    /// Bulk-path write: no offset propagation, position must be validated.
    fn stage_voxel(&mut self, coord: IVec3, local: u32, material: Material) -> Result<()> {
        let slot = match self.index.get(coord) {
            Some(slot) => slot,
            None => self.allocate_brick(coord)?,
        };

        // Expand before the bitmask changes so the committed run is read correctly
        let cells = self.staging.cells_mut(slot, &self.bricks[slot as usize], &self.materials);
        cells[local as usize] = material;

        if self.bricks[slot as usize].set(local) {
            self.voxel_count += 1;
        }
        self.offsets_stale = true;
        Ok(())
    }

    /// Fill the box `[origin, origin + extents)` with one material.
    ///
    /// The whole box is validated first; a rejected fill changes nothing.
    /// Extents with a non-positive axis are an empty fill.
    pub fn fill_region(&mut self, origin: IVec3, extents: IVec3, material: Material) -> Result<()> {
        if extents.cmple(IVec3::ZERO).any() {
            return Ok(());
        }
        let last = origin.as_i64vec3() + extents.as_i64vec3() - I64Vec3::ONE;
        let limit = self.voxel_dimensions().as_i64vec3();
        if origin.cmplt(IVec3::ZERO).any() || last.cmpge(limit).any() {
            let e = Error::OutOfRange {
                position: origin,
                dimensions: self.dimensions(),
            };
            log::warn!("Rejected region fill: {}", e);
            return Err(e);
        }
        let last = last.as_ivec3();

        for z in origin.z..=last.z {
            for y in origin.y..=last.y {
                for x in origin.x..=last.x {
                    let (coord, local) = split(IVec3::new(x, y, z));
                    self.stage_voxel(coord, local, material)?;
                }
            }
        }

        self.changed = true;
        log::debug!("Filled region {} + {} with {:?}", origin, extents, material);
        Ok(())
    }

    /// Fill all 512 voxels of one brick.
    pub fn fill_brick(&mut self, coord: IVec3, material: Material) -> Result<()> {
        if !brick_in_bounds(coord, self.dimensions()) {
            return Err(Error::BrickOutOfRange {
                coord,
                dimensions: self.dimensions(),
            });
        }
        self.fill_region(coord * BRICK_SIZE, IVec3::splat(BRICK_SIZE), material)
    }

    /// Generate terrain for one brick from a height source.
    ///
    /// Returns false, changing nothing, when `coord` is outside the grid.
    pub fn generate_chunk<S: HeightSource + ?Sized>(&mut self, coord: IVec3, source: &S) -> bool {
        if !brick_in_bounds(coord, self.dimensions()) {
            return false;
        }
        let writes = plan_brick(coord, source);
        self.apply_chunk(coord, &writes)
    }

    /// Generate many bricks, sampling the height source in parallel.
    ///
    /// Returns the number of coordinates inside the grid.
    pub fn generate_chunks<S: HeightSource + ?Sized>(&mut self, coords: &[IVec3], source: &S) -> usize {
        let dimensions = self.dimensions();
        let plans: Vec<(IVec3, Vec<(u32, Material)>)> = coords
            .par_iter()
            .filter(|&&coord| brick_in_bounds(coord, dimensions))
            .map(|&coord| (coord, plan_brick(coord, source)))
            .collect();

        for (coord, writes) in &plans {
            self.apply_chunk(*coord, writes);
        }
        log::debug!("Generated {} of {} requested bricks", plans.len(), coords.len());
        plans.len()
    }

    /// Apply planned writes for an in-bounds brick.
    pub(crate) fn apply_chunk(&mut self, coord: IVec3, writes: &[(u32, Material)]) -> bool {
        debug_assert!(brick_in_bounds(coord, self.dimensions()));
        for &(local, material) in writes {
            if let Err(e) = self.stage_voxel(coord, local, material) {
                log::warn!("Chunk generation at {} failed: {}", coord, e);
                return false;
            }
        }
        if !writes.is_empty() {
            self.changed = true;
        }
        log::trace!("Generated brick {} ({} voxels)", coord, writes.len());
        true
    }

    /// Rebuild the material array and every brick offset if bulk writes are pending.
    ///
    /// One pass in brick-array order: each brick's offset is the running
    /// count of occupied voxels before it.
    pub fn ensure_offsets_valid(&mut self) {
        if !self.offsets_stale {
            return;
        }

        let mut rebuilt = MaterialStore::with_capacity(self.voxel_count);
        for (slot, brick) in self.bricks.iter_mut().enumerate() {
            let offset = rebuilt.len() as u32;
            if !self.staging.drain_into(slot as u32, brick, &mut rebuilt) {
                rebuilt.extend_from(&self.materials, brick.material_offset as usize, brick.voxel_count() as usize);
            }
            brick.material_offset = offset;
        }

        log::debug!(
            "Rebuilt material offsets: {} bricks, {} staged, {} voxels",
            self.bricks.len(),
            self.staging.len(),
            rebuilt.len()
        );
        debug_assert_eq!(rebuilt.len(), self.voxel_count);

        self.materials = rebuilt;
        self.staging.clear();
        self.ledger.reset(self.bricks.len());
        self.offsets_stale = false;
    }

    /// Snapshot the bricks, index and materials for upload.
    ///
    /// Bricks are in allocation order. The buffers are copies; later writes
    /// do not affect them.
    pub fn export_gpu_buffers(&mut self) -> GpuBuffers {
        self.ensure_offsets_valid();
        GpuBuffers {
            dimensions: self.dimensions(),
            bricks: self.bricks.clone(),
            index: self.index.as_slice().to_vec(),
            materials: self.materials.ordinals(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(x: u32, y: u32, z: u32) -> BrickStore {
        BrickStore::new(UVec3::new(x, y, z)).unwrap()
    }

    /// Every invariant that must hold once offsets are committed
    fn assert_consistent(store: &BrickStore) {
        assert!(!store.offsets_stale);
        let total: u32 = store.bricks.iter().map(|b| b.voxel_count()).sum();
        assert_eq!(store.materials.len(), total as usize);
        assert_eq!(store.voxel_count, total as usize);

        let mut ranges: Vec<(u32, u32)> = store
            .bricks
            .iter()
            .map(|b| (b.material_offset, b.material_offset + b.voxel_count()))
            .collect();
        ranges.sort();
        for w in ranges.windows(2) {
            assert!(w[0].1 <= w[1].0, "overlapping runs {:?} and {:?}", w[0], w[1]);
        }
        assert_eq!(store.ledger.len(), store.bricks.len());
        assert!(store.ledger.is_sorted(&store.bricks));
    }

    fn offsets(store: &BrickStore) -> Vec<u32> {
        store.bricks.iter().map(|b| b.material_offset).collect()
    }

    #[test]
    fn test_two_voxels_then_overwrite() {
        let mut s = store(1, 1, 1);
        s.set_voxel(IVec3::new(0, 0, 0), Material::Stone).unwrap();
        s.set_voxel(IVec3::new(1, 0, 0), Material::Grass).unwrap();
        s.set_voxel(IVec3::new(0, 0, 0), Material::Grass).unwrap();

        assert_consistent(&s);
        assert_eq!(s.materials.len(), 2);
        assert_eq!(s.bricks[0].material_offset, 0);
        assert!(s.bricks[0].is_set(0));
        assert!(s.bricks[0].is_set(1));
        assert_eq!(s.materials.as_slice(), &[Material::Grass, Material::Grass]);
    }

    #[test]
    fn test_overwrite_changes_one_slot() {
        let mut s = store(2, 1, 1);
        s.set_voxel(IVec3::new(3, 0, 0), Material::Stone).unwrap();
        s.set_voxel(IVec3::new(9, 0, 0), Material::Stone).unwrap();
        s.set_voxel(IVec3::new(2, 0, 0), Material::Stone).unwrap();
        let before_offsets = offsets(&s);
        let before = s.materials.clone();

        s.set_voxel(IVec3::new(3, 0, 0), Material::Grass).unwrap();

        assert_eq!(offsets(&s), before_offsets);
        assert_eq!(s.materials.len(), before.len());
        let diffs: Vec<usize> = (0..before.len())
            .filter(|&i| before.get(i) != s.materials.get(i))
            .collect();
        assert_eq!(diffs, vec![1]);
        assert_consistent(&s);
    }

    #[test]
    fn test_insert_shifts_later_bricks_only() {
        let mut s = store(3, 1, 1);
        s.set_voxel(IVec3::new(4, 0, 0), Material::Stone).unwrap();
        s.set_voxel(IVec3::new(12, 0, 0), Material::Stone).unwrap();
        s.set_voxel(IVec3::new(20, 0, 0), Material::Stone).unwrap();
        assert_eq!(offsets(&s), vec![0, 1, 2]);

        // New voxel after the middle brick's only voxel
        s.set_voxel(IVec3::new(13, 0, 0), Material::Grass).unwrap();
        assert_eq!(offsets(&s), vec![0, 1, 3]);
        assert_eq!(s.materials.len(), 4);

        // New voxel before the last brick's first voxel keeps that brick's offset
        s.set_voxel(IVec3::new(16, 0, 0), Material::Grass).unwrap();
        assert_eq!(offsets(&s), vec![0, 1, 3]);
        assert_eq!(s.materials.len(), 5);

        // Same in the first brick: it stays, every later brick moves
        s.set_voxel(IVec3::new(0, 0, 0), Material::Grass).unwrap();
        assert_eq!(offsets(&s), vec![0, 2, 4]);
        assert_eq!(
            s.materials.as_slice(),
            &[Material::Grass, Material::Stone, Material::Stone, Material::Grass, Material::Grass, Material::Stone]
        );
        assert_consistent(&s);
    }

    #[test]
    fn test_invariants_after_each_write() {
        let mut s = store(2, 2, 2);
        let mut seed = 0x2545_F491u32;
        for i in 0..300 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let p = IVec3::new((seed % 16) as i32, ((seed >> 8) % 16) as i32, ((seed >> 16) % 16) as i32);
            let m = if i % 3 == 0 { Material::Grass } else { Material::Stone };
            let before = s.voxel_count();
            let was_set = s.get_voxel(p).unwrap().is_some();
            s.set_voxel(p, m).unwrap();
            assert_eq!(s.voxel_count(), before + usize::from(!was_set));
            assert_eq!(s.get_voxel(p).unwrap(), Some(m));
            assert_consistent(&s);
        }
    }

    #[test]
    fn test_out_of_range_write_rejected() {
        let mut s = store(1, 1, 1);
        s.set_voxel(IVec3::new(1, 1, 1), Material::Stone).unwrap();
        let before = s.export_gpu_buffers();

        for p in [IVec3::new(8, 0, 0), IVec3::new(-1, 0, 0), IVec3::new(0, 0, 100)] {
            assert!(matches!(s.set_voxel(p, Material::Grass), Err(Error::OutOfRange { .. })));
        }
        assert!(s.fill_region(IVec3::new(4, 4, 4), IVec3::splat(8), Material::Grass).is_err());
        assert!(s.fill_region(IVec3::new(i32::MAX, 0, 0), IVec3::splat(8), Material::Grass).is_err());
        assert!(s.fill_brick(IVec3::new(0, 1, 0), Material::Grass).is_err());

        assert!(!s.offsets_stale());
        assert_eq!(s.export_gpu_buffers(), before);
        assert_consistent(&s);
    }

    #[test]
    fn test_air_write_keeps_occupancy() {
        let mut s = store(1, 1, 1);
        s.set_voxel(IVec3::new(2, 2, 2), Material::Stone).unwrap();
        s.set_voxel(IVec3::new(2, 2, 2), Material::Air).unwrap();
        assert_eq!(s.voxel_count(), 1);
        assert_eq!(s.get_voxel(IVec3::new(2, 2, 2)).unwrap(), Some(Material::Air));
    }

    #[test]
    fn test_fill_region_marks_stale_and_rebuilds() {
        let mut s = store(2, 1, 1);
        s.fill_region(IVec3::new(6, 0, 0), IVec3::new(4, 2, 1), Material::Stone).unwrap();
        assert!(s.offsets_stale());
        assert_eq!(s.voxel_count(), 8);
        assert_eq!(s.brick_count(), 2);
        assert_eq!(s.get_voxel(IVec3::new(9, 1, 0)).unwrap(), Some(Material::Stone));

        s.ensure_offsets_valid();
        assert_consistent(&s);
        assert_eq!(offsets(&s), vec![0, 4]);
    }

    #[test]
    fn test_empty_fill_is_noop() {
        let mut s = store(1, 1, 1);
        s.fill_region(IVec3::ZERO, IVec3::new(0, 4, 4), Material::Stone).unwrap();
        s.fill_region(IVec3::new(100, 0, 0), IVec3::new(-1, 1, 1), Material::Stone).unwrap();
        assert_eq!(s.brick_count(), 0);
        assert!(!s.offsets_stale());
        assert!(!s.take_changed());
    }

    #[test]
    fn test_bulk_matches_point_writes() {
        let ops: Vec<(IVec3, IVec3, Material)> = vec![
            (IVec3::new(8, 0, 0), IVec3::new(3, 3, 3), Material::Stone),
            (IVec3::new(0, 0, 0), IVec3::new(10, 1, 2), Material::Grass),
            (IVec3::new(9, 1, 1), IVec3::new(2, 2, 2), Material::Grass),
            (IVec3::new(0, 8, 8), IVec3::new(1, 1, 8), Material::Stone),
        ];

        let mut bulk = store(2, 2, 2);
        for &(origin, extents, material) in &ops {
            bulk.fill_region(origin, extents, material).unwrap();
        }
        bulk.ensure_offsets_valid();
        assert_consistent(&bulk);

        let mut point = store(2, 2, 2);
        for &(origin, extents, material) in &ops {
            for z in origin.z..origin.z + extents.z {
                for y in origin.y..origin.y + extents.y {
                    for x in origin.x..origin.x + extents.x {
                        point.set_voxel(IVec3::new(x, y, z), material).unwrap();
                    }
                }
            }
        }
        assert_consistent(&point);

        assert_eq!(offsets(&bulk), offsets(&point));
        assert_eq!(bulk.materials, point.materials);
        assert_eq!(bulk.export_gpu_buffers(), point.export_gpu_buffers());
    }

    #[test]
    fn test_point_write_after_bulk() {
        let mut s = store(2, 1, 1);
        s.fill_region(IVec3::ZERO, IVec3::new(2, 1, 1), Material::Stone).unwrap();
        s.fill_region(IVec3::new(8, 0, 0), IVec3::new(2, 1, 1), Material::Stone).unwrap();
        // Grows the first brick while the second brick's offset is stale
        s.fill_region(IVec3::new(0, 1, 0), IVec3::new(1, 1, 1), Material::Grass).unwrap();
        s.set_voxel(IVec3::new(9, 0, 0), Material::Grass).unwrap();

        assert_consistent(&s);
        assert_eq!(offsets(&s), vec![0, 3]);
        assert_eq!(
            s.materials.as_slice(),
            &[Material::Stone, Material::Stone, Material::Grass, Material::Stone, Material::Grass]
        );
    }

    #[test]
    fn test_rebuild_follows_brick_order_not_ledger() {
        let mut s = store(2, 1, 1);
        s.set_voxel(IVec3::new(8, 0, 0), Material::Grass).unwrap();
        s.set_voxel(IVec3::new(0, 0, 0), Material::Stone).unwrap();
        s.fill_region(IVec3::new(8, 1, 0), IVec3::new(1, 1, 1), Material::Stone).unwrap();

        let buffers = s.export_gpu_buffers();
        // Brick 0 is at x=8 (allocated first)
        assert_eq!(buffers.index, vec![1, 0]);
        assert_eq!(offsets(&s), vec![0, 2]);
        assert_eq!(buffers.materials, vec![1, 2, 2]);
    }

    #[test]
    fn test_fill_brick() {
        let mut s = store(1, 2, 1);
        s.set_voxel(IVec3::new(0, 12, 0), Material::Grass).unwrap();
        s.fill_brick(IVec3::new(0, 1, 0), Material::Stone).unwrap();
        s.ensure_offsets_valid();
        assert_eq!(s.voxel_count(), 512);
        assert_eq!(s.bricks[0].bitmask, [u64::MAX; 8]);
        assert!(s.materials.as_slice().iter().all(|&m| m == Material::Stone));
    }

    #[test]
    fn test_generate_chunk_out_of_bounds() {
        let mut s = store(2, 2, 2);
        s.set_voxel(IVec3::new(1, 1, 1), Material::Stone).unwrap();
        let flat = |_x: i32, _z: i32| 4;
        let before = s.export_gpu_buffers();

        for coord in [IVec3::new(-1, 0, 0), IVec3::new(2, 0, 0), IVec3::new(0, 0, 5)] {
            assert!(!s.generate_chunk(coord, &flat));
        }
        assert!(!s.offsets_stale());
        let after = s.export_gpu_buffers();
        assert_eq!(after.index_bytes(), before.index_bytes());
        assert_eq!(after.material_bytes(), before.material_bytes());
    }

    #[test]
    fn test_generate_chunk_flat() {
        let mut s = store(1, 2, 1);
        let flat = |_x: i32, _z: i32| 10;
        assert!(s.generate_chunk(IVec3::new(0, 0, 0), &flat));
        assert!(s.generate_chunk(IVec3::new(0, 1, 0), &flat));

        assert_eq!(s.voxel_count(), 64 * 11);
        assert_eq!(s.get_voxel(IVec3::new(3, 10, 4)).unwrap(), Some(Material::Grass));
        assert_eq!(s.get_voxel(IVec3::new(3, 9, 4)).unwrap(), Some(Material::Stone));
        assert_eq!(s.get_voxel(IVec3::new(3, 11, 4)).unwrap(), None);

        s.ensure_offsets_valid();
        assert_consistent(&s);
    }

    #[test]
    fn test_generate_chunks_parallel_matches_serial() {
        let wavy = |x: i32, z: i32| 2 + (x * 3 + z * 5).rem_euclid(19);
        let coords: Vec<IVec3> = (0..2)
            .flat_map(|z| (0..4).flat_map(move |y| (0..2).map(move |x| IVec3::new(x, y, z))))
            .chain([IVec3::new(9, 0, 0)])
            .collect();

        let mut parallel = store(2, 4, 2);
        assert_eq!(parallel.generate_chunks(&coords, &wavy), coords.len() - 1);

        let mut serial = store(2, 4, 2);
        for &coord in &coords {
            serial.generate_chunk(coord, &wavy);
        }

        assert_eq!(parallel.export_gpu_buffers(), serial.export_gpu_buffers());
        assert_consistent(&parallel);
    }

    #[test]
    fn test_export_round_trip() {
        let mut s = store(2, 2, 2);
        let mut expected = std::collections::HashMap::new();
        let wavy = |x: i32, z: i32| 3 + (x + 2 * z) % 6;
        s.generate_chunk(IVec3::new(1, 0, 1), &wavy);
        for z in 8..16 {
            for x in 8..16 {
                let top = wavy(x, z);
                // Surfaces at y == 8 fall in the ungenerated brick above
                if top < 8 {
                    expected.insert(IVec3::new(x, top, z), Material::Grass);
                }
                for y in 0..top.min(8) {
                    expected.insert(IVec3::new(x, y, z), Material::Stone);
                }
            }
        }
        for (p, m) in [
            (IVec3::new(9, 0, 9), Material::Grass),
            (IVec3::new(0, 15, 0), Material::Stone),
            (IVec3::new(15, 15, 15), Material::Grass),
        ] {
            s.set_voxel(p, m).unwrap();
            expected.insert(p, m);
        }
        s.fill_region(IVec3::new(2, 2, 2), IVec3::new(3, 1, 2), Material::Grass).unwrap();
        for z in 2..4 {
            for x in 2..5 {
                expected.insert(IVec3::new(x, 2, z), Material::Grass);
            }
        }

        let buffers = s.export_gpu_buffers();
        let decoded = GpuBuffers::from_le_bytes(
            s.dimensions(),
            &buffers.brick_bytes(),
            &buffers.index_bytes(),
            &buffers.material_bytes(),
        )
        .unwrap();

        assert_eq!(decoded.materials.len(), expected.len());
        for (p, m) in &expected {
            assert_eq!(decoded.material_at(*p).unwrap(), Some(*m), "mismatch at {p}");
        }
    }

    #[test]
    fn test_export_idempotent() {
        let mut s = store(2, 2, 2);
        s.fill_region(IVec3::new(1, 1, 1), IVec3::splat(10), Material::Stone).unwrap();
        s.set_voxel(IVec3::new(0, 0, 0), Material::Grass).unwrap();

        let a = s.export_gpu_buffers();
        let b = s.export_gpu_buffers();
        assert_eq!(a.brick_bytes(), b.brick_bytes());
        assert_eq!(a.index_bytes(), b.index_bytes());
        assert_eq!(a.material_bytes(), b.material_bytes());
    }

    #[test]
    fn test_export_is_a_snapshot() {
        let mut s = store(1, 1, 1);
        s.set_voxel(IVec3::new(0, 0, 0), Material::Stone).unwrap();
        let snapshot = s.export_gpu_buffers();
        s.set_voxel(IVec3::new(1, 0, 0), Material::Grass).unwrap();
        assert_eq!(snapshot.materials, vec![2]);
        assert_eq!(s.export_gpu_buffers().materials, vec![2, 1]);
    }

    #[test]
    fn test_size_and_change_tracking() {
        let mut s = store(2, 1, 1);
        assert_eq!(s.size_in_bytes(), 8);
        assert!(!s.take_changed());

        s.set_voxel(IVec3::new(0, 0, 0), Material::Stone).unwrap();
        assert!(s.take_changed());
        assert!(!s.take_changed());
        assert_eq!(s.size_in_bytes(), 72 + 8 + 4);
        assert_eq!(s.voxel_dimensions(), UVec3::new(16, 8, 8));
    }
}
