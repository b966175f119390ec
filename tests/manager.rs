use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use strata::blocks::{AIR, BlockRegistry};
use strata::chunk::{Edges, generate_chunk_payload};
use strata::mesh::{ChunkMeshCPU, build_chunk_mesh};
use strata::runtime::{BatchResult, ChunkSource, GenRuntime, LocalSource, SourceError};
use strata::world::{Cardinal, ChunkCoord, World};
use strata::{ChunkManager, EditError, StreamConfig, StreamEvent};

const SEED: i32 = 42;
const WAIT: Duration = Duration::from_secs(60);

fn registry() -> Arc<BlockRegistry> {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    Arc::new(BlockRegistry::load_from_path(root.join("assets/voxels/blocks.toml")).unwrap())
}

fn config() -> StreamConfig {
    StreamConfig {
        chunk_size: 16,
        chunk_height: 128,
        view_radius: 1,
        load_radius: 2,
        unload_radius: 3,
        render_slice: 3,
        workers: 1,
        cache_capacity: 0,
    }
}

fn local(reg: &Arc<BlockRegistry>) -> LocalSource {
    let cfg = config();
    let world = Arc::new(World::with_default_params(SEED));
    LocalSource::new(world, reg.clone(), cfg.chunk_size, cfg.chunk_height)
}

fn manager() -> ChunkManager<LocalSource> {
    let reg = registry();
    let source = local(&reg);
    ChunkManager::new(config(), reg, source).unwrap()
}

fn record(mgr: &mut ChunkManager<impl ChunkSource>) -> Rc<RefCell<Vec<StreamEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    mgr.subscribe(move |ev| sink.borrow_mut().push(*ev));
    log
}

/// Center of chunk `(cx, cz)` in world space.
fn center_of(cx: i32, cz: i32) -> (f32, f32) {
    (cx as f32 * 16.0 + 8.0, cz as f32 * 16.0 + 8.0)
}

fn settle(mgr: &mut ChunkManager<impl ChunkSource>, cx: i32, cz: i32) {
    let (x, z) = center_of(cx, cz);
    assert!(mgr.update_chunks_around(x, z));
    assert!(mgr.run_until_idle(WAIT));
}

type Quad = (u32, [[i64; 3]; 4]);

fn canonical(mesh: &ChunkMeshCPU) -> (BTreeMap<u16, Vec<Quad>>, Vec<(u32, u16)>) {
    let parts = mesh
        .parts
        .iter()
        .map(|(mid, mb)| {
            let mut quads: Vec<Quad> = (0..mb.quad_count())
                .map(|q| {
                    let corners = mb
                        .quad_corners(q)
                        .map(|c| c.map(|v| (v * 1000.0).round() as i64));
                    (mb.owner[q], corners)
                })
                .collect();
            quads.sort();
            (mid.0, quads)
        })
        .collect();
    let mut models: Vec<(u32, u16)> = mesh.models.iter().map(|m| (m.cell, m.block)).collect();
    models.sort();
    (parts, models)
}

fn fresh_mesh(mgr: &ChunkManager<impl ChunkSource>, coord: ChunkCoord) -> ChunkMeshCPU {
    let chunk = mgr.chunk(coord).unwrap();
    let lookup = |x: i32, y: i32, z: i32| mgr.get_block(x, y, z);
    build_chunk_mesh(chunk, mgr.registry(), &lookup, None)
}

fn expected_edges(mgr: &ChunkManager<impl ChunkSource>, coord: ChunkCoord) -> Edges {
    Cardinal::ALL
        .into_iter()
        .filter(|&d| !mgr.is_loaded(coord.neighbor(d)))
        .collect()
}

fn assert_consistent(mgr: &ChunkManager<impl ChunkSource>) {
    for coord in mgr.loaded_coords() {
        let chunk = mgr.chunk(coord).unwrap();
        assert_eq!(chunk.edges(), expected_edges(mgr, coord), "edges of {coord:?}");
        let mesh = mgr.mesh(coord).unwrap();
        assert_eq!(mesh.revision, chunk.revision());
        assert_eq!(canonical(mesh), canonical(&fresh_mesh(mgr, coord)), "mesh of {coord:?}");
    }
}

/// Top solid block of a column inside chunk (0, 0).
fn top_of(mgr: &ChunkManager<impl ChunkSource>, x: i32, z: i32) -> i32 {
    mgr.get_column_height(x, z).unwrap() - 1
}

#[test]
fn initial_pass_loads_and_meshes_the_load_square() {
    let mut mgr = manager();
    let events = record(&mut mgr);
    settle(&mut mgr, 0, 0);

    let stats = mgr.stats();
    assert_eq!(stats.loaded, 25);
    assert_eq!(stats.meshes, 25);
    assert_eq!(stats.visible, 9);
    assert_eq!(stats.passes, 1);
    for coord in ChunkCoord::new(0, 0).square(2) {
        let chunk = mgr.chunk(coord).unwrap();
        assert_eq!(chunk.is_visible, coord.chebyshev(ChunkCoord::new(0, 0)) <= 1);
        assert!(!chunk.is_dirty);
    }

    let events = events.borrow();
    assert_eq!(events.len(), 26);
    assert!(events[..25].iter().all(|e| matches!(e, StreamEvent::Loaded(_))));
    assert_eq!(events[25], StreamEvent::Updated { initial: true });
    // nearest chunks are requested first
    assert_eq!(events[0], StreamEvent::Loaded(ChunkCoord::new(0, 0)));
}

#[test]
fn later_passes_are_not_initial() {
    let mut mgr = manager();
    let events = record(&mut mgr);
    settle(&mut mgr, 0, 0);
    settle(&mut mgr, 0, 0);
    let events = events.borrow();
    assert_eq!(events.len(), 27);
    assert_eq!(events[26], StreamEvent::Updated { initial: false });
}

#[test]
fn overlapping_updates_are_dropped() {
    let mut mgr = manager();
    let events = record(&mut mgr);
    assert!(mgr.update_chunks_around(8.0, 8.0));
    assert!(mgr.is_updating());
    assert!(!mgr.update_chunks_around(500.0, 500.0));
    assert!(mgr.run_until_idle(WAIT));
    assert!(!mgr.is_updating());
    let updates = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, StreamEvent::Updated { .. }))
        .count();
    assert_eq!(updates, 1);
    // the dropped call does not move the pass
    assert_eq!(mgr.stats().loaded, 25);
    assert!(mgr.is_loaded(ChunkCoord::new(0, 0)));
}

#[test]
fn visibility_follows_the_pass_center_despite_dropped_calls() {
    let mut mgr = manager();
    settle(&mut mgr, -1, 0);

    let (x, z) = center_of(1, 0);
    assert!(mgr.update_chunks_around(x, z));
    let (lx, lz) = center_of(2, 0);
    assert!(!mgr.update_chunks_around(lx, lz));
    assert!(mgr.run_until_idle(WAIT));

    let center = ChunkCoord::new(1, 0);
    for coord in center.square(2) {
        assert!(mgr.is_loaded(coord), "{coord:?}");
    }
    for coord in mgr.loaded_coords() {
        let chunk = mgr.chunk(coord).unwrap();
        assert_eq!(
            chunk.is_visible,
            coord.chebyshev(center) <= 1,
            "visibility of {coord:?}"
        );
    }
    assert_eq!(mgr.stats().visible, 9);
}

#[test]
fn rendering_is_spread_over_ticks() {
    let mut mgr = manager();
    assert!(mgr.update_chunks_around(8.0, 8.0));
    let mut prev = 0;
    let mut ticks = 0;
    while mgr.tick() {
        let meshes = mgr.stats().meshes;
        assert!(meshes - prev <= 3, "{prev} -> {meshes}");
        prev = meshes;
        ticks += 1;
        assert!(ticks < 1000);
    }
    assert_eq!(mgr.stats().meshes, 25);
    // one tick to receive the batch, then 25 chunks at 3 per tick
    assert!(ticks >= 9);
    assert!(!mgr.tick());
}

#[test]
fn moving_unloads_far_chunks_and_keeps_edges_consistent() {
    let mut mgr = manager();
    let events = record(&mut mgr);
    settle(&mut mgr, 0, 0);
    assert_consistent(&mgr);

    settle(&mut mgr, 2, 0);
    let center = ChunkCoord::new(2, 0);
    for coord in mgr.loaded_coords() {
        assert!(coord.chebyshev(center) <= 3, "{coord:?} should be unloaded");
    }
    for coord in center.square(2) {
        assert!(mgr.is_loaded(coord));
    }
    // x = -2 is now at distance 4
    assert!(!mgr.is_loaded(ChunkCoord::new(-2, 0)));
    assert!(mgr.is_loaded(ChunkCoord::new(-1, 0)));
    assert!(mgr.mesh(ChunkCoord::new(-2, 0)).is_none());
    assert!(!mgr.chunk(ChunkCoord::new(-1, 0)).unwrap().is_visible);
    assert!(mgr.chunk(ChunkCoord::new(1, 0)).unwrap().is_visible);

    let unloaded: Vec<_> = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Unloaded(c) => Some(*c),
            _ => None,
        })
        .collect();
    assert_eq!(unloaded.len(), 5);
    assert!(unloaded.iter().all(|c| c.cx == -2));
    assert_consistent(&mgr);
}

#[test]
fn block_access_and_typed_errors() {
    let mut mgr = manager();
    let reg = registry();
    let stone = reg.id_by_name("stone").unwrap();
    settle(&mut mgr, 0, 0);

    assert_eq!(mgr.get_block(3, -1, 3), None);
    assert_eq!(mgr.get_block(3, 128, 3), None);
    assert_eq!(mgr.get_block(16 * 10, 5, 0), None);
    assert_eq!(mgr.get_column_height(16 * 10, 0), None);
    assert!(mgr.get_block(-5, 0, -5).is_some());

    assert_eq!(mgr.set_block(3, 128, 3, stone), Err(EditError::OutOfRange { y: 128 }));
    assert_eq!(mgr.set_block(3, -1, 3, stone), Err(EditError::OutOfRange { y: -1 }));
    assert_eq!(mgr.set_block(3, 10, 3, 999), Err(EditError::UnknownBlock(999)));
    assert_eq!(
        mgr.set_block(16 * 10, 10, 0, stone),
        Err(EditError::ChunkNotLoaded(ChunkCoord::new(10, 0)))
    );

    let y = mgr.get_column_height(-5, -5).unwrap();
    mgr.set_block(-5, y, -5, stone).unwrap();
    assert_eq!(mgr.get_block(-5, y, -5), Some(stone));
    assert_eq!(mgr.get_column_height(-5, -5), Some(y + 1));
    let owner = ChunkCoord::new(-1, -1);
    assert_eq!(mgr.chunk(owner).unwrap().dirty_blocks().len(), 1);

    let rev = mgr.chunk(owner).unwrap().revision();
    mgr.set_block(-5, y, -5, stone).unwrap();
    assert_eq!(mgr.chunk(owner).unwrap().revision(), rev);
}

#[test]
fn border_edits_rebuild_both_chunks() {
    let mut mgr = manager();
    let reg = registry();
    let glass = reg.id_by_name("glass").unwrap();
    settle(&mut mgr, 0, 0);

    // carve a hole right at the x = 15 | 16 border
    let top = top_of(&mgr, 15, 7);
    mgr.set_block(15, top, 7, AIR).unwrap();
    mgr.set_block(15, top - 1, 7, glass).unwrap();
    let top = top_of(&mgr, 16, 7);
    mgr.set_block(16, top, 7, AIR).unwrap();

    // and one at a corner shared by four chunks
    let top = top_of(&mgr, -1, -1);
    mgr.set_block(-1, top, -1, AIR).unwrap();

    for coord in [
        ChunkCoord::new(0, 0),
        ChunkCoord::new(1, 0),
        ChunkCoord::new(-1, -1),
        ChunkCoord::new(-1, 0),
        ChunkCoord::new(0, -1),
    ] {
        let mesh = mgr.mesh(coord).unwrap();
        assert_eq!(
            canonical(mesh),
            canonical(&fresh_mesh(&mgr, coord)),
            "partial rebuild of {coord:?}"
        );
    }
    assert_consistent(&mgr);
}

#[test]
fn edits_survive_unload_and_reload() {
    let mut mgr = manager();
    let reg = registry();
    let stone = reg.id_by_name("stone").unwrap();
    settle(&mut mgr, 0, 0);

    let y = mgr.get_column_height(4, 4).unwrap();
    mgr.set_block(4, y, 4, stone).unwrap();
    mgr.set_block(4, 0, 4, AIR).unwrap();

    settle(&mut mgr, 10, 0);
    assert!(!mgr.is_loaded(ChunkCoord::new(0, 0)));
    assert!(mgr.deltas().contains(ChunkCoord::new(0, 0)));
    assert_eq!(mgr.deltas().stats().block_edits, 2);

    settle(&mut mgr, 0, 0);
    assert_eq!(mgr.get_block(4, y, 4), Some(stone));
    assert_eq!(mgr.get_block(4, 0, 4), Some(AIR));
    assert!(!mgr.deltas().contains(ChunkCoord::new(0, 0)));
    assert_eq!(mgr.chunk(ChunkCoord::new(0, 0)).unwrap().dirty_blocks().len(), 2);
    assert_consistent(&mgr);
}

#[test]
fn growth_entities_tick_into_models() {
    let mut mgr = manager();
    let reg = registry();
    let sapling = reg.id_by_name("sapling").unwrap();
    let shrub = reg.id_by_name("shrub").unwrap();
    settle(&mut mgr, 0, 0);

    let y = mgr.get_column_height(6, 9).unwrap();
    mgr.set_block(6, y, 9, sapling).unwrap();
    let before = mgr.tick_block_entities();
    assert_eq!(mgr.get_block(6, y, 9), Some(sapling));

    let mut grown = before;
    for _ in 0..2 {
        grown += mgr.tick_block_entities();
    }
    assert!(grown >= 1);
    assert_eq!(mgr.get_block(6, y, 9), Some(shrub));
    let mesh = mgr.mesh(ChunkCoord::new(0, 0)).unwrap();
    assert!(mesh.models.iter().any(|m| m.block == shrub && m.origin.y == y as f32));
    assert_consistent(&mgr);
}

/// Wraps a `LocalSource`, letting a test tamper with results and inject
/// unrelated batches.
struct Scripted {
    inner: LocalSource,
    prelude: VecDeque<BatchResult>,
    hook: Box<dyn FnMut(&mut BatchResult)>,
}

impl Scripted {
    fn new(hook: impl FnMut(&mut BatchResult) + 'static) -> Self {
        Self {
            inner: local(&registry()),
            prelude: VecDeque::new(),
            hook: Box::new(hook),
        }
    }

    fn next(&mut self) -> Option<BatchResult> {
        if let Some(res) = self.prelude.pop_front() {
            return Some(res);
        }
        let mut res = self.inner.try_recv()?;
        (self.hook)(&mut res);
        Some(res)
    }
}

impl ChunkSource for Scripted {
    fn request(&mut self, batch_id: u64, coords: Vec<ChunkCoord>) {
        self.inner.request(batch_id, coords);
    }

    fn try_recv(&mut self) -> Option<BatchResult> {
        self.next()
    }

    fn recv_timeout(&mut self, _timeout: Duration) -> Option<BatchResult> {
        self.next()
    }
}

#[test]
fn failed_chunks_are_retried_next_pass() {
    let flaky = ChunkCoord::new(1, 1);
    let mut tripped = false;
    let source = Scripted::new(move |res| {
        if tripped {
            return;
        }
        for (coord, result) in res.chunks.iter_mut() {
            if *coord == flaky {
                *result = Err(SourceError::Unavailable("flaky".into()));
                tripped = true;
            }
        }
    });
    let mut mgr = ChunkManager::new(config(), registry(), source).unwrap();
    let events = record(&mut mgr);

    settle(&mut mgr, 0, 0);
    assert!(!mgr.is_loaded(flaky));
    assert_eq!(mgr.stats().loaded, 24);
    assert_eq!(events.borrow().last(), Some(&StreamEvent::Updated { initial: true }));
    assert_consistent(&mgr);

    settle(&mut mgr, 0, 0);
    assert!(mgr.is_loaded(flaky));
    assert_eq!(mgr.stats().loaded, 25);
    assert_consistent(&mgr);
}

#[test]
fn malformed_payloads_are_rejected() {
    let bad = ChunkCoord::new(0, 1);
    let mut once = true;
    let source = Scripted::new(move |res| {
        if !once {
            return;
        }
        once = false;
        for (coord, result) in res.chunks.iter_mut() {
            if let Ok(payload) = result {
                if *coord == bad {
                    payload.position = ChunkCoord::new(9, 9);
                }
                if *coord == ChunkCoord::new(-1, 0) {
                    payload.height = 64;
                }
            }
        }
    });
    let mut mgr = ChunkManager::new(config(), registry(), source).unwrap();
    settle(&mut mgr, 0, 0);
    assert!(!mgr.is_loaded(bad));
    assert!(!mgr.is_loaded(ChunkCoord::new(9, 9)));
    assert!(!mgr.is_loaded(ChunkCoord::new(-1, 0)));
    assert_eq!(mgr.stats().loaded, 23);

    settle(&mut mgr, 0, 0);
    assert_eq!(mgr.stats().loaded, 25);
}

#[test]
fn stale_batches_are_discarded() {
    let reg = registry();
    let world = World::with_default_params(SEED);
    let mut ctx = world.make_gen_ctx();
    let far = ChunkCoord::new(40, 40);
    let payload = generate_chunk_payload(&world, &reg, &mut ctx, far, 16, 128)
        .unwrap()
        .payload;

    let mut source = Scripted::new(|_| {});
    source.prelude.push_back(BatchResult {
        id: 999,
        chunks: vec![(far, Ok(payload))],
    });
    let mut mgr = ChunkManager::new(config(), reg, source).unwrap();
    settle(&mut mgr, 0, 0);
    assert!(!mgr.is_loaded(far));
    assert_eq!(mgr.stats().loaded, 25);
}

#[test]
fn worker_runtime_streams_the_same_world() {
    let reg = registry();
    let cfg = config();
    let world = Arc::new(World::with_default_params(SEED));
    let rt = GenRuntime::new(world, reg.clone(), cfg.chunk_size, cfg.chunk_height, 2, 16).unwrap();
    let mut threaded = ChunkManager::new(cfg, reg, rt).unwrap();
    let mut inline = manager();
    settle(&mut threaded, 0, 0);
    settle(&mut inline, 0, 0);

    assert_eq!(threaded.stats().loaded, 25);
    for coord in ChunkCoord::new(0, 0).square(2) {
        let a = threaded.chunk(coord).unwrap();
        let b = inline.chunk(coord).unwrap();
        assert_eq!(a.blocks(), b.blocks());
        assert_eq!(a.edges(), b.edges());
        assert_eq!(
            canonical(threaded.mesh(coord).unwrap()),
            canonical(inline.mesh(coord).unwrap())
        );
    }
    assert_eq!(threaded.source().queue_debug_counts(), (0, 0));
}

#[test]
fn invalid_config_is_refused() {
    let mut cfg = config();
    cfg.view_radius = 5;
    let reg = registry();
    let source = local(&reg);
    assert!(ChunkManager::new(cfg, reg, source).is_err());
}
