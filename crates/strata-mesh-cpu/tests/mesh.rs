use std::collections::BTreeSet;

use strata_blocks::{AIR, BlockId, BlockRegistry, FaceRole};
use strata_chunk::{Chunk, Edges, generate_chunk};
use strata_grid::{Grid2, Grid3};
use strata_mesh_cpu::{
    ChunkMeshCPU, NoNeighbors, build_chunk_mesh, edit_footprint, rebuild_cells, tint_color,
};
use strata_world::{ChunkCoord, Climate, World};

fn load_registry() -> BlockRegistry {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    BlockRegistry::load_from_path(root.join("../../assets/voxels/blocks.toml")).unwrap()
}

fn id(reg: &BlockRegistry, name: &str) -> BlockId {
    reg.id_by_name(name).unwrap()
}

/// 4x8x4 chunk at the origin holding only `cells`.
fn sparse_chunk(reg: &BlockRegistry, cells: &[((usize, usize, usize), BlockId)]) -> Chunk {
    let mut blocks = Grid3::new(4, 8, 4, AIR);
    for &((x, y, z), b) in cells {
        blocks.set(x, y, z, b);
    }
    Chunk::new(
        ChunkCoord::new(0, 0),
        blocks,
        Grid2::new(4, 4, Climate::new(9, 3)),
        reg,
    )
}

/// Order-independent view of a mesh: sorted (material, corners, color) per quad.
fn canonical(mesh: &ChunkMeshCPU) -> Vec<(u16, [u32; 12], [u8; 4])> {
    let mut out = Vec::new();
    for (mid, part) in &mesh.parts {
        for q in 0..part.quad_count() {
            let c = part.quad_corners(q);
            let mut bits = [0u32; 12];
            for (i, v) in c.iter().flatten().enumerate() {
                bits[i] = v.to_bits();
            }
            let col = [
                part.col[q * 16],
                part.col[q * 16 + 1],
                part.col[q * 16 + 2],
                part.col[q * 16 + 3],
            ];
            out.push((mid.0, bits, col));
        }
    }
    out.sort();
    out
}

#[test]
fn lone_cube_emits_six_faces() {
    let reg = load_registry();
    let chunk = sparse_chunk(&reg, &[((1, 3, 1), id(&reg, "stone"))]);
    let mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);
    assert_eq!(mesh.quad_count(), 6);
    assert_eq!(mesh.parts.len(), 1);
}

#[test]
fn shared_face_between_same_cubes_is_hidden() {
    let reg = load_registry();
    let stone = id(&reg, "stone");
    let chunk = sparse_chunk(&reg, &[((1, 3, 1), stone), ((2, 3, 1), stone)]);
    let mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);
    assert_eq!(mesh.quad_count(), 10);
}

#[test]
fn glass_next_to_stone_keeps_the_stone_face() {
    let reg = load_registry();
    let chunk = sparse_chunk(
        &reg,
        &[((1, 3, 1), id(&reg, "stone")), ((2, 3, 1), id(&reg, "glass"))],
    );
    let mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);
    let stone_mid = reg.by_name("stone").unwrap().material_for(FaceRole::Side).unwrap();
    let glass_mid = reg.by_name("glass").unwrap().material_for(FaceRole::Side).unwrap();
    assert_eq!(mesh.parts[&stone_mid].quad_count(), 6);
    assert_eq!(mesh.parts[&glass_mid].quad_count(), 5);
}

#[test]
fn chunk_edge_faces_follow_edges_and_lookup() {
    let reg = load_registry();
    let stone = id(&reg, "stone");
    let mut chunk = sparse_chunk(&reg, &[((0, 3, 1), stone)]);

    // unloaded neighbor: always drawn
    let mesh = build_chunk_mesh(&chunk, &reg, &|_: i32, _: i32, _: i32| Some(stone), None);
    assert_eq!(mesh.quad_count(), 6);

    // loaded neighbor holding stone: culled
    chunk.set_edges(Edges::NONE);
    let mesh = build_chunk_mesh(&chunk, &reg, &|_: i32, _: i32, _: i32| Some(stone), None);
    assert_eq!(mesh.quad_count(), 5);

    // loaded side but the lookup knows nothing: drawn
    let mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);
    assert_eq!(mesh.quad_count(), 6);
}

#[test]
fn cross_and_model_strategies() {
    let reg = load_registry();
    let chunk = sparse_chunk(
        &reg,
        &[
            ((1, 1, 1), id(&reg, "tall_grass")),
            ((2, 1, 2), id(&reg, "cactus")),
        ],
    );
    let mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);
    let grass_mid = reg.by_name("tall_grass").unwrap().material_for(FaceRole::Side).unwrap();
    let part = &mesh.parts[&grass_mid];
    assert_eq!(part.quad_count(), 2);
    assert!(part.col.chunks(4).all(|c| c == tint_color(Climate::new(9, 3))));

    assert_eq!(mesh.models.len(), 1);
    let model = &mesh.models[0];
    assert_eq!(model.prototype, "cactus");
    assert_eq!(model.cell, chunk.blocks().idx(2, 1, 2) as u32);
    assert_eq!(model.proxy, strata_geom::Aabb::cell(2, 1, 2));
}

#[test]
fn grass_tints_only_its_top() {
    let reg = load_registry();
    let chunk = sparse_chunk(&reg, &[((1, 1, 1), id(&reg, "grass"))]);
    let mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);
    let grass = reg.by_name("grass").unwrap();
    let top = &mesh.parts[&grass.material_for(FaceRole::Top).unwrap()];
    assert_eq!(&top.col[..4], &tint_color(Climate::new(9, 3)));
    let side = &mesh.parts[&grass.material_for(FaceRole::Side).unwrap()];
    assert!(side.col.iter().all(|&c| c == 255));
}

#[test]
fn unknown_ids_render_nothing() {
    let reg = load_registry();
    let chunk = sparse_chunk(&reg, &[((1, 1, 1), 999), ((2, 1, 1), id(&reg, "stone"))]);
    let mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);
    // the stone's face toward the unknown cell stays visible
    assert_eq!(mesh.quad_count(), 6);
}

#[test]
fn removing_the_last_block_drops_its_batch() {
    let reg = load_registry();
    let mut chunk = sparse_chunk(&reg, &[((1, 3, 1), id(&reg, "stone"))]);
    let mut mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);
    chunk.set_block(1, 3, 1, AIR, &reg);
    let cells = edit_footprint(&chunk, 1, 3, 1);
    rebuild_cells(&mut mesh, &chunk, &reg, &NoNeighbors, &cells);
    assert!(mesh.parts.is_empty());
    assert!(mesh.is_empty());
    assert_eq!(mesh.revision, chunk.revision());
}

#[test]
fn filtered_build_only_emits_listed_cells() {
    let reg = load_registry();
    let stone = id(&reg, "stone");
    let chunk = sparse_chunk(&reg, &[((1, 3, 1), stone), ((3, 3, 3), stone)]);
    let filter = BTreeSet::from([chunk.blocks().idx(3, 3, 3) as u32]);
    let mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, Some(&filter));
    assert_eq!(mesh.quad_count(), 6);
    assert!(
        mesh.parts
            .values()
            .all(|p| p.owner.iter().all(|o| filter.contains(o)))
    );
}

#[test]
fn partial_rebuild_matches_full_rebuild() {
    let reg = load_registry();
    let world = World::with_default_params(1234);
    let mut ctx = world.make_gen_ctx();
    let mut chunk = generate_chunk(&world, &reg, &mut ctx, ChunkCoord::new(0, 0), 16, 128).unwrap();
    let mut mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);

    let top = chunk.column_height(6, 9) as usize;
    let edits = [
        ((6, top - 1, 9), AIR),
        ((6, top - 2, 9), AIR),
        ((3, (top + 3).min(127), 12), id(&reg, "glass")),
        ((0, 40, 0), AIR),
    ];
    for ((x, y, z), b) in edits {
        chunk.set_block(x, y, z, b, &reg);
        let cells = edit_footprint(&chunk, x as i32, y as i32, z as i32);
        rebuild_cells(&mut mesh, &chunk, &reg, &NoNeighbors, &cells);
    }

    let full = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);
    assert_eq!(canonical(&mesh), canonical(&full));
    assert_eq!(mesh.models.len(), full.models.len());
    assert_eq!(mesh.revision, full.revision);
}
