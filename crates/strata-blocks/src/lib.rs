//! Block types, materials, and the owned block registry.
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod material;
pub mod registry;

pub use error::RegistryError;
pub use material::{MaterialCatalog, MaterialId};
pub use registry::{BlockRegistry, BlockType, FaceMaterials, Growth};

/// Dense numeric block id. Id 0 is always air.
pub type BlockId = u16;

pub const AIR: BlockId = 0;

/// Which material slot a face samples.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FaceRole {
    Top,
    Bottom,
    Side,
}

/// How a block type turns into geometry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RenderStrategy {
    None,
    Cube,
    Cross,
    Model { prototype: String },
}

/// Light-passing class. Declaration order is the total order used for face
/// culling: `Opaque < Cutout < Transparent`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {
    #[default]
    Opaque,
    Cutout,
    Transparent,
}

impl Transparency {
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// Faces that receive the climate tint.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TintMode {
    #[default]
    None,
    Top,
    All,
}
