use std::collections::HashMap;

use strata_blocks::{BlockId, MaterialId};
use strata_geom::{Aabb, Vec3};
use strata_world::ChunkCoord;

use crate::mesh_build::MeshBuild;

/// A model block, instantiated from a shared prototype by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelInstance {
    pub prototype: String,
    pub block: BlockId,
    /// Linear chunk index of the owning cell.
    pub cell: u32,
    /// World position of the cell's min corner.
    pub origin: Vec3,
    /// Collision proxy in world space.
    pub proxy: Aabb,
}

#[derive(Clone, Debug, Default)]
pub struct ChunkMeshCPU {
    pub coord: ChunkCoord,
    pub bbox: Aabb,
    pub parts: HashMap<MaterialId, MeshBuild>,
    pub models: Vec<ModelInstance>,
    /// Chunk revision this mesh reflects.
    pub revision: u64,
}

impl ChunkMeshCPU {
    pub fn quad_count(&self) -> usize {
        self.parts.values().map(MeshBuild::quad_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.models.is_empty()
    }

    pub(crate) fn drop_empty_parts(&mut self) {
        self.parts.retain(|_, mb| !mb.is_empty());
    }
}
