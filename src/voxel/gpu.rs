//! GPU buffer snapshot of a brick store
//!
//! Three buffers captured together:
//! - bricks: 72-byte records, 8 little-endian u64 bitmask words, a u32
//!   material offset and 4 bytes of zero padding
//! - index: one u32 per grid cell, `NO_BRICK` for unallocated
//! - materials: one u32 material ordinal per occupied voxel
//!
//! They are only consistent with each other as a triple.

use std::borrow::Cow;

use glam::{IVec3, UVec3};

use crate::core::{Error, Result};
use super::brick::{Brick, BRICK_RECORD_SIZE};
use super::brick_index::{validate_dimensions, NO_BRICK};
use super::coord::{brick_in_bounds, split};
use super::material::Material;
use super::material_store::WORDS_PER_BRICK;

/// Snapshot of the packed store, ready for upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GpuBuffers {
    pub dimensions: UVec3,
    pub bricks: Vec<Brick>,
    pub index: Vec<u32>,
    pub materials: Vec<u32>,
}

impl GpuBuffers {
    /// Brick buffer bytes
    pub fn brick_bytes(&self) -> Cow<'_, [u8]> {
        if cfg!(target_endian = "little") {
            Cow::Borrowed(bytemuck::cast_slice(&self.bricks))
        } else {
            let mut out = Vec::with_capacity(self.bricks.len() * BRICK_RECORD_SIZE);
            for brick in &self.bricks {
                for word in brick.bitmask {
                    out.extend_from_slice(&word.to_le_bytes());
                }
                out.extend_from_slice(&brick.material_offset.to_le_bytes());
                out.extend_from_slice(&[0u8; 4]);
            }
            Cow::Owned(out)
        }
    }

    /// Brick index buffer bytes
    pub fn index_bytes(&self) -> Cow<'_, [u8]> {
        u32_le_bytes(&self.index)
    }

    /// Material buffer bytes
    pub fn material_bytes(&self) -> Cow<'_, [u8]> {
        u32_le_bytes(&self.materials)
    }

    /// Total size of the three buffers
    pub fn byte_len(&self) -> usize {
        self.bricks.len() * BRICK_RECORD_SIZE + (self.index.len() + self.materials.len()) * 4
    }

    /// Parse the three byte buffers back into a snapshot
    pub fn from_le_bytes(dimensions: UVec3, bricks: &[u8], index: &[u8], materials: &[u8]) -> Result<Self> {
        let cells = validate_dimensions(dimensions)?;

        if bricks.len() % BRICK_RECORD_SIZE != 0 {
            return Err(Error::Decode(format!(
                "brick buffer length {} is not a multiple of {}",
                bricks.len(),
                BRICK_RECORD_SIZE
            )));
        }
        let bricks: Vec<Brick> = bricks
            .chunks_exact(BRICK_RECORD_SIZE)
            .map(|record| {
                let mut bitmask = [0u64; WORDS_PER_BRICK];
                for (w, word) in bitmask.iter_mut().enumerate() {
                    *word = u64::from_le_bytes(le_array(&record[w * 8..w * 8 + 8]));
                }
                let offset = u32::from_le_bytes(le_array(&record[64..68]));
                Brick::new(bitmask, offset)
            })
            .collect();

        let index = parse_u32s(index, "index")?;
        if index.len() != cells {
            return Err(Error::Decode(format!(
                "index buffer has {} entries, grid {} needs {}",
                index.len(),
                dimensions,
                cells
            )));
        }
        if let Some(&bad) = index.iter().find(|&&s| s != NO_BRICK && s as usize >= bricks.len()) {
            return Err(Error::Decode(format!("index references missing brick {bad}")));
        }

        let materials = parse_u32s(materials, "material")?;
        for brick in &bricks {
            let end = brick.material_offset as usize + brick.voxel_count() as usize;
            if end > materials.len() {
                return Err(Error::Decode(format!(
                    "brick run ends at {end}, material buffer has {} entries",
                    materials.len()
                )));
            }
        }

        Ok(Self {
            dimensions,
            bricks,
            index,
            materials,
        })
    }

    /// Resolve a voxel from the buffers. `None` if never written.
    pub fn material_at(&self, position: IVec3) -> Result<Option<Material>> {
        let (coord, local) = split(position);
        if !brick_in_bounds(coord, self.dimensions) {
            return Err(Error::OutOfRange {
                position,
                dimensions: self.dimensions,
            });
        }
        let c = coord.as_uvec3();
        let d = self.dimensions;
        let cell = c.x as usize + c.y as usize * d.x as usize + c.z as usize * d.x as usize * d.y as usize;

        let slot = *self.index.get(cell).ok_or_else(|| {
            Error::Decode(format!("index buffer has {} entries, cell {cell} missing", self.index.len()))
        })?;
        if slot == NO_BRICK {
            return Ok(None);
        }
        let brick = self
            .bricks
            .get(slot as usize)
            .ok_or_else(|| Error::Decode(format!("index references missing brick {slot}")))?;
        if !brick.is_set(local) {
            return Ok(None);
        }
        let at = brick.material_offset as usize + brick.rank(local) as usize;
        let ordinal = *self.materials.get(at).ok_or_else(|| {
            Error::Decode(format!(
                "material {at} past the end of a {}-entry buffer",
                self.materials.len()
            ))
        })?;
        Material::try_from(ordinal).map(Some)
    }
}

fn u32_le_bytes(values: &[u32]) -> Cow<'_, [u8]> {
    if cfg!(target_endian = "little") {
        Cow::Borrowed(bytemuck::cast_slice(values))
    } else {
        Cow::Owned(values.iter().flat_map(|v| v.to_le_bytes()).collect())
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

fn parse_u32s(bytes: &[u8], what: &str) -> Result<Vec<u32>> {
    if bytes.len() % 4 != 0 {
        return Err(Error::Decode(format!(
            "{what} buffer length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes(le_array(b)))
        .collect())
}
