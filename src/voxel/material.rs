//! Voxel material values and their render palette

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::core::Error;

/// Material stored per occupied voxel.
///
/// Stored as one byte; the material buffer widens the ordinal to u32.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Material {
    #[default]
    Air = 0,
    Grass = 1,
    Stone = 2,
}

impl Material {
    /// All materials in ordinal order
    pub const ALL: [Material; 3] = [Material::Air, Material::Grass, Material::Stone];

    /// Ordinal written into the material buffer
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Check if this is the empty material
    pub fn is_air(self) -> bool {
        self == Material::Air
    }

    /// Shading parameters for this material
    pub fn info(self) -> MaterialInfo {
        match self {
            Material::Air => MaterialInfo::new([0.0, 0.0, 0.0, 0.0], 0.0, 0.0),
            Material::Grass => MaterialInfo::new([0.0, 1.0, 0.0, 1.0], 0.0, 0.2),
            Material::Stone => MaterialInfo::new([0.5, 0.5, 0.5, 1.0], 0.2, 0.7),
        }
    }
}

impl TryFrom<u32> for Material {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Material::Air),
            1 => Ok(Material::Grass),
            2 => Ok(Material::Stone),
            other => Err(Error::UnknownMaterial(other)),
        }
    }
}

impl From<Material> for u32 {
    fn from(material: Material) -> Self {
        material.ordinal()
    }
}

/// Per-material shading record - 32 bytes, 16-byte aligned for std430
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MaterialInfo {
    pub albedo: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    _padding: [f32; 2],
}

impl MaterialInfo {
    pub fn new(albedo: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            albedo,
            metallic,
            roughness,
            _padding: [0.0; 2],
        }
    }
}

/// Shading records for every material, indexed by ordinal
pub fn material_palette() -> Vec<MaterialInfo> {
    Material::ALL.iter().map(|m| m.info()).collect()
}
