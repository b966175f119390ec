use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use strata_blocks::{AIR, BlockRegistry};
use strata_chunk::generate_chunk;
use strata_mesh_cpu::{NoNeighbors, build_chunk_mesh, edit_footprint, rebuild_cells};
use strata_world::{ChunkCoord, World};

fn load_registry() -> BlockRegistry {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    BlockRegistry::load_from_path(root.join("../../assets/voxels/blocks.toml")).unwrap()
}

fn bench_generate_terrain(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_terrain");
    let reg = load_registry();
    let world = World::with_default_params(1337);
    let mut ctx = world.make_gen_ctx();
    group.bench_function("16x256x16", |b| {
        b.iter(|| {
            let out = world
                .generate_terrain(&reg, &mut ctx, 0, 0, 16, 256)
                .unwrap();
            black_box(out);
        })
    });
    group.finish();
}

fn bench_build_chunk_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chunk_mesh");
    let reg = load_registry();
    let world = World::with_default_params(1337);
    let mut ctx = world.make_gen_ctx();
    let chunk = generate_chunk(&world, &reg, &mut ctx, ChunkCoord::new(0, 0), 16, 256).unwrap();
    group.bench_function("full_16x256x16", |b| {
        b.iter(|| black_box(build_chunk_mesh(&chunk, &reg, &NoNeighbors, None)))
    });
    group.finish();
}

fn bench_rebuild_cells(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild_cells");
    let reg = load_registry();
    let world = World::with_default_params(1337);
    let mut ctx = world.make_gen_ctx();
    let mut chunk = generate_chunk(&world, &reg, &mut ctx, ChunkCoord::new(0, 0), 16, 256).unwrap();
    let mesh = build_chunk_mesh(&chunk, &reg, &NoNeighbors, None);
    let top = chunk.column_height(8, 8) as usize;
    chunk.set_block(8, top - 1, 8, AIR, &reg);
    let cells = edit_footprint(&chunk, 8, top as i32 - 1, 8);
    group.bench_function("single_edit", |b| {
        b.iter(|| {
            let mut m = mesh.clone();
            rebuild_cells(&mut m, &chunk, &reg, &NoNeighbors, &cells);
            black_box(m);
        })
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = bench_generate_terrain, bench_build_chunk_mesh, bench_rebuild_cells
}
criterion_main!(benches);
