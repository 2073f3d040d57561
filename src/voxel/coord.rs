//! Voxel and brick coordinate conversions

use glam::{IVec3, UVec3};

/// Voxels per brick side
pub const BRICK_SIZE: i32 = 8;

/// Voxels per brick (8x8x8)
pub const VOXELS_PER_BRICK: usize = (BRICK_SIZE * BRICK_SIZE * BRICK_SIZE) as usize;

/// Brick coordinate containing a voxel position (floor division by 8)
pub fn brick_coord(position: IVec3) -> IVec3 {
    position.div_euclid(IVec3::splat(BRICK_SIZE))
}

/// Linear index of a voxel inside its brick: `x + y*8 + z*64`
pub fn local_index(position: IVec3) -> u32 {
    let local = position.rem_euclid(IVec3::splat(BRICK_SIZE));
    (local.x + local.y * BRICK_SIZE + local.z * BRICK_SIZE * BRICK_SIZE) as u32
}

/// Split a voxel position into (brick coordinate, local index)
pub fn split(position: IVec3) -> (IVec3, u32) {
    (brick_coord(position), local_index(position))
}

/// Inverse of [`split`]
pub fn join(brick: IVec3, local: u32) -> IVec3 {
    let local = local as i32;
    brick * BRICK_SIZE
        + IVec3::new(
            local % BRICK_SIZE,
            (local / BRICK_SIZE) % BRICK_SIZE,
            local / (BRICK_SIZE * BRICK_SIZE),
        )
}

/// Check a brick coordinate against grid dimensions (in bricks)
pub fn brick_in_bounds(coord: IVec3, dimensions: UVec3) -> bool {
    coord.cmpge(IVec3::ZERO).all() && coord.as_uvec3().cmplt(dimensions).all()
}
