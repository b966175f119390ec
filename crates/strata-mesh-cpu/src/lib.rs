//! CPU meshing: per-material quad batches, model instances, and partial rebuilds.
#![forbid(unsafe_code)]

mod build;
mod chunk;
mod emit;
mod face;
mod mesh_build;
mod neighbors;
mod visibility;

pub use build::{build_chunk_mesh, edit_footprint, rebuild_cells};
pub use chunk::{ChunkMeshCPU, ModelInstance};
pub use emit::{BuildSink, tint_color};
pub use face::Face;
pub use mesh_build::MeshBuild;
pub use neighbors::{NeighborBlocks, NoNeighbors};
pub use visibility::face_visible;
