use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, OnceLock};

use strata_blocks::{AIR, BlockId, BlockRegistry, BlockType, FaceRole, MaterialId, RenderStrategy};
use strata_chunk::Chunk;
use strata_geom::{Aabb, Vec3};

use crate::chunk::{ChunkMeshCPU, ModelInstance};
use crate::emit::{BuildSink, face_color};
use crate::face::Face;
use crate::mesh_build::MeshBuild;
use crate::neighbors::NeighborBlocks;
use crate::visibility::face_visible;

/// Meshes `chunk`. With a `filter`, only the listed cells (linear chunk
/// indices) emit geometry.
pub fn build_chunk_mesh(
    chunk: &Chunk,
    reg: &BlockRegistry,
    lookup: &impl NeighborBlocks,
    filter: Option<&BTreeSet<u32>>,
) -> ChunkMeshCPU {
    let (ox, oz) = chunk.origin();
    let min = Vec3::from_cell(ox, 0, oz);
    let size = chunk.size() as f32;
    let mut mesh = ChunkMeshCPU {
        coord: chunk.coord,
        bbox: Aabb::new(min, min + Vec3::new(size, chunk.height() as f32, size)),
        parts: HashMap::new(),
        models: Vec::new(),
        revision: chunk.revision(),
    };
    let cells: Box<dyn Iterator<Item = u32>> = match filter {
        Some(f) => Box::new(f.iter().copied().filter(|c| chunk.surface().contains(c))),
        None => Box::new(chunk.surface().iter().copied()),
    };
    emit_cells(chunk, reg, lookup, cells, &mut mesh.parts, &mut mesh.models);
    mesh.drop_empty_parts();
    mesh
}

/// Replaces the geometry owned by `cells` with freshly emitted geometry.
pub fn rebuild_cells(
    mesh: &mut ChunkMeshCPU,
    chunk: &Chunk,
    reg: &BlockRegistry,
    lookup: &impl NeighborBlocks,
    cells: &BTreeSet<u32>,
) {
    for part in mesh.parts.values_mut() {
        part.retain_quads(|owner| !cells.contains(&owner));
    }
    mesh.models.retain(|m| !cells.contains(&m.cell));
    let todo = cells
        .iter()
        .copied()
        .filter(|c| chunk.surface().contains(c));
    emit_cells(chunk, reg, lookup, todo, &mut mesh.parts, &mut mesh.models);
    mesh.drop_empty_parts();
    mesh.revision = chunk.revision();
}

/// Cells of `chunk` whose geometry depends on the block at world `(wx, wy, wz)`:
/// that cell and its six face neighbors, clipped to the chunk.
pub fn edit_footprint(chunk: &Chunk, wx: i32, wy: i32, wz: i32) -> BTreeSet<u32> {
    let (ox, oz) = chunk.origin();
    let blocks = chunk.blocks();
    let mut out = BTreeSet::new();
    let mut visit = |dx: i32, dy: i32, dz: i32| {
        let (lx, ly, lz) = (wx + dx - ox, wy + dy, wz + dz - oz);
        if blocks.contains(lx, ly, lz) {
            out.insert(blocks.idx(lx as usize, ly as usize, lz as usize) as u32);
        }
    };
    visit(0, 0, 0);
    for face in Face::ALL {
        let (dx, dy, dz) = face.delta();
        visit(dx, dy, dz);
    }
    out
}

fn emit_cells(
    chunk: &Chunk,
    reg: &BlockRegistry,
    lookup: &impl NeighborBlocks,
    cells: impl Iterator<Item = u32>,
    parts: &mut HashMap<MaterialId, MeshBuild>,
    models: &mut Vec<ModelInstance>,
) {
    let (ox, oz) = chunk.origin();
    let blocks = chunk.blocks();
    for cell in cells {
        let (x, y, z) = blocks.pos(cell as usize);
        let id = chunk.get(x, y, z);
        if id == AIR {
            continue;
        }
        let Some(ty) = known_block(reg, id) else {
            continue;
        };
        let (wx, wy, wz) = (ox + x as i32, y as i32, oz + z as i32);
        let corner = Vec3::from_cell(wx, wy, wz);
        let climate = chunk.climate_at(x, z);
        match &ty.render {
            RenderStrategy::None => {}
            RenderStrategy::Cube => {
                for face in Face::ALL {
                    let nb = neighbor(chunk, reg, lookup, (x, y, z), face);
                    if !face_visible(ty, nb) {
                        continue;
                    }
                    let Some(mid) = ty.material_for(face.role()) else {
                        continue;
                    };
                    let rgba = face_color(ty.is_tinted(face.role()), climate);
                    parts.get_build_mut(mid).add_face_rect(
                        face,
                        face.rect_origin(corner),
                        1.0,
                        1.0,
                        rgba,
                        cell,
                    );
                }
            }
            RenderStrategy::Cross => {
                let Some(mid) = ty.material_for(FaceRole::Side) else {
                    continue;
                };
                let rgba = face_color(ty.is_tinted(FaceRole::Side), climate);
                emit_cross(parts.get_build_mut(mid), corner, rgba, cell);
            }
            RenderStrategy::Model { prototype } => models.push(ModelInstance {
                prototype: prototype.clone(),
                block: id,
                cell,
                origin: corner,
                proxy: Aabb::cell(wx, wy, wz),
            }),
        }
    }
}

/// Two vertical quads along the cell diagonals.
fn emit_cross(mb: &mut MeshBuild, corner: Vec3, rgba: [u8; 4], cell: u32) {
    let up = Vec3::new(0.0, 1.0, 0.0);
    let uvs = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
    let diagonals = [
        (Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 1.0)),
        (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
    ];
    for (from, to) in diagonals {
        let a = corner + from;
        let b = corner + to;
        let n = (b - a).cross(up);
        let len = n.dot(n).sqrt();
        let n = n * (1.0 / len);
        mb.add_quad_uv(a, a + up, b + up, b, n, uvs, rgba, cell);
    }
}

fn neighbor<'r>(
    chunk: &Chunk,
    reg: &'r BlockRegistry,
    lookup: &impl NeighborBlocks,
    (x, y, z): (usize, usize, usize),
    face: Face,
) -> Option<&'r BlockType> {
    let (dx, dy, dz) = face.delta();
    let (nx, ny, nz) = (x as i32 + dx, y as i32 + dy, z as i32 + dz);
    if ny < 0 {
        return None;
    }
    if ny >= chunk.height() as i32 {
        return reg.get(AIR);
    }
    if let Some(id) = chunk.get_checked(nx, ny, nz) {
        return known_block(reg, id);
    }
    if face.cardinal().is_some_and(|dir| chunk.edges().contains(dir)) {
        return None;
    }
    let (ox, oz) = chunk.origin();
    let id = lookup.block_at(ox + nx, ny, oz + nz)?;
    known_block(reg, id)
}

fn known_block(reg: &BlockRegistry, id: BlockId) -> Option<&BlockType> {
    let ty = reg.get(id);
    if ty.is_none() {
        warn_unknown_once(id);
    }
    ty
}

fn warn_unknown_once(id: BlockId) {
    static WARNED: OnceLock<Mutex<HashSet<BlockId>>> = OnceLock::new();
    let warned = WARNED.get_or_init(|| Mutex::new(HashSet::new()));
    if let Ok(mut set) = warned.lock() {
        if set.insert(id) {
            log::warn!(target: "mesh", "unknown block id {id}; rendering nothing for it");
        }
    }
}
