use std::sync::Arc;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use strata_blocks::{BlockId, BlockRegistry};
use strata_chunk::{Chunk, ChunkPayload, DeltaStore, DeltaStoreStats, Edges, affected_chunks};
use strata_mesh_cpu::{ChunkMeshCPU, build_chunk_mesh, edit_footprint, rebuild_cells};
use strata_runtime::{BatchResult, ChunkSource, SourceError};
use strata_world::{Cardinal, ChunkCoord, ConfigError};

use crate::{EditError, StreamConfig, StreamEvent, TaskQueue};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RenderCause {
    Load,
    Stale,
    Edges,
}

struct RenderTask {
    coord: ChunkCoord,
    cause: RenderCause,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Loading { batch: u64 },
    Rendering,
    Finalizing,
}

struct Pass {
    center: ChunkCoord,
    phase: Phase,
    started: Instant,
    loaded: usize,
    failed: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManagerStats {
    pub loaded: usize,
    pub visible: usize,
    pub meshes: usize,
    pub quads: usize,
    pub models: usize,
    pub passes: u64,
    pub pending_renders: usize,
    pub deltas: DeltaStoreStats,
}

type Observer = Box<dyn FnMut(&StreamEvent)>;

/// Owns every loaded chunk and its mesh, and streams chunks in and out
/// around a moving reference point.
pub struct ChunkManager<S: ChunkSource> {
    cfg: StreamConfig,
    reg: Arc<BlockRegistry>,
    source: S,
    chunks: HashMap<ChunkCoord, Chunk>,
    meshes: HashMap<ChunkCoord, ChunkMeshCPU>,
    deltas: DeltaStore,
    renders: TaskQueue<RenderTask>,
    observers: Vec<Observer>,
    pass: Option<Pass>,
    next_batch: u64,
    passes: u64,
}

impl<S: ChunkSource> ChunkManager<S> {
    pub fn new(cfg: StreamConfig, reg: Arc<BlockRegistry>, source: S) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let renders = TaskQueue::new(cfg.render_slice);
        Ok(Self {
            cfg,
            reg,
            source,
            chunks: HashMap::new(),
            meshes: HashMap::new(),
            deltas: DeltaStore::new(),
            renders,
            observers: Vec::new(),
            pass: None,
            next_batch: 1,
            passes: 0,
        })
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&StreamEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Starts a streaming pass around world position `(x, z)`. Returns false
    /// when a pass is already running; the call is dropped, not queued.
    pub fn update_chunks_around(&mut self, x: f32, z: f32) -> bool {
        if self.pass.is_some() {
            log::debug!(target: "stream", "pass in flight; dropping update at ({x:.1}, {z:.1})");
            return false;
        }
        let center = ChunkCoord::from_world(x, z, self.cfg.chunk_size);

        let mut gone = Vec::new();
        for (&coord, chunk) in self.chunks.iter_mut() {
            let d = coord.chebyshev(center);
            if d > self.cfg.unload_radius {
                gone.push(coord);
            } else {
                chunk.is_visible = d <= self.cfg.view_radius;
            }
        }
        gone.sort();
        for coord in gone {
            self.unload(coord);
        }

        let mut missing: Vec<ChunkCoord> = center
            .square(self.cfg.load_radius)
            .filter(|c| !self.chunks.contains_key(c))
            .collect();
        missing.sort_by_key(|c| (c.distance_sq(center), *c));

        let batch = self.next_batch;
        self.next_batch += 1;
        self.pass = Some(Pass {
            center,
            phase: Phase::Loading { batch },
            started: Instant::now(),
            loaded: 0,
            failed: 0,
        });
        log::debug!(
            target: "stream",
            "pass around ({}, {}): {} resident, requesting {} in batch {batch}",
            center.cx,
            center.cz,
            self.chunks.len(),
            missing.len()
        );
        if missing.is_empty() {
            self.begin_render();
        } else {
            self.source.request(batch, missing);
        }
        true
    }

    /// Advances the running pass by one slice of work. Returns true while a
    /// pass is still in progress.
    pub fn tick(&mut self) -> bool {
        let Some(phase) = self.pass.as_ref().map(|p| p.phase) else {
            return false;
        };
        match phase {
            Phase::Loading { .. } => {
                while let Some(res) = self.source.try_recv() {
                    self.on_batch(res);
                    if !self.is_loading() {
                        break;
                    }
                }
            }
            Phase::Rendering | Phase::Finalizing => {
                for task in self.renders.take_slice() {
                    let RenderTask { coord, cause } = task.kind;
                    if self.render_chunk(coord) {
                        log::trace!(
                            target: "stream",
                            "task {}: meshed ({}, {}) for {cause:?}, queued at tick {}",
                            task.id,
                            coord.cx,
                            coord.cz,
                            task.tick
                        );
                    }
                }
                if self.renders.is_empty() {
                    self.after_render();
                }
            }
        }
        self.pass.is_some()
    }

    /// Drives the current pass to completion. Returns false if `timeout`
    /// elapsed or the source stopped answering first.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pass.is_some() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            if self.is_loading() {
                match self.source.recv_timeout(deadline - now) {
                    Some(res) => self.on_batch(res),
                    None => return false,
                }
            } else {
                self.tick();
            }
        }
        true
    }

    pub fn is_updating(&self) -> bool {
        self.pass.is_some()
    }

    fn is_loading(&self) -> bool {
        matches!(
            self.pass,
            Some(Pass {
                phase: Phase::Loading { .. },
                ..
            })
        )
    }

    fn on_batch(&mut self, res: BatchResult) {
        let expected = match &self.pass {
            Some(Pass {
                phase: Phase::Loading { batch },
                ..
            }) => *batch,
            _ => {
                log::debug!(target: "stream", "discarding batch {} outside a load phase", res.id);
                return;
            }
        };
        if res.id != expected {
            log::debug!(target: "stream", "discarding stale batch {} (want {expected})", res.id);
            return;
        }
        let (mut loaded, mut failed) = (0, 0);
        for (coord, result) in res.chunks {
            match self.accept(coord, result) {
                Some(true) => loaded += 1,
                Some(false) => {}
                None => failed += 1,
            }
        }
        if let Some(pass) = self.pass.as_mut() {
            pass.loaded += loaded;
            pass.failed += failed;
        }
        self.begin_render();
    }

    /// Some(true) when inserted, Some(false) when discarded, None on failure.
    fn accept(
        &mut self,
        coord: ChunkCoord,
        result: Result<ChunkPayload, SourceError>,
    ) -> Option<bool> {
        let mut payload = match result {
            Ok(p) => p,
            Err(e) => {
                log::warn!(target: "stream", "chunk ({}, {}) failed to generate: {e}", coord.cx, coord.cz);
                return None;
            }
        };
        let center = self.pass.as_ref()?.center;
        if coord.chebyshev(center) > self.cfg.load_radius {
            log::debug!(target: "stream", "chunk ({}, {}) scrolled out of range; discarded", coord.cx, coord.cz);
            return Some(false);
        }
        if self.chunks.contains_key(&coord) {
            return Some(false);
        }
        if let Err(e) = payload.check(coord, self.cfg.chunk_size, self.cfg.chunk_height) {
            log::warn!(target: "stream", "rejecting payload for ({}, {}): {e}", coord.cx, coord.cz);
            return None;
        }
        if let Some(delta) = self.deltas.get(coord) {
            payload
                .dirty_blocks
                .extend(delta.iter().map(|(&cell, &id)| (cell, id)));
        }
        match Chunk::from_payload(payload, &self.reg) {
            Ok(mut chunk) => {
                self.deltas.take(coord);
                chunk.is_visible = coord.chebyshev(center) <= self.cfg.view_radius;
                self.chunks.insert(coord, chunk);
                self.emit(StreamEvent::Loaded(coord));
                Some(true)
            }
            Err(e) => {
                log::warn!(target: "stream", "malformed payload for ({}, {}): {e}", coord.cx, coord.cz);
                None
            }
        }
    }

    /// Queues every chunk whose mesh is missing or stale, nearest first.
    fn begin_render(&mut self) {
        let Some(center) = self.pass.as_ref().map(|p| p.center) else {
            return;
        };
        let fresh: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .filter(|c| !self.meshes.contains_key(*c))
            .copied()
            .collect();
        for coord in fresh {
            let edges = self.open_edges(coord);
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.set_edges(edges);
            }
        }

        let mut todo: Vec<(ChunkCoord, RenderCause)> = self
            .chunks
            .iter()
            .filter_map(|(&coord, chunk)| match self.meshes.get(&coord) {
                None => Some((coord, RenderCause::Load)),
                Some(m) if m.revision != chunk.revision() || chunk.is_dirty => {
                    Some((coord, RenderCause::Stale))
                }
                Some(_) => None,
            })
            .collect();
        todo.sort_by_key(|(c, _)| (c.distance_sq(center), *c));
        for (coord, cause) in todo {
            self.renders.push(RenderTask { coord, cause });
        }
        if let Some(pass) = self.pass.as_mut() {
            pass.phase = Phase::Rendering;
        }
    }

    fn after_render(&mut self) {
        let Some(phase) = self.pass.as_ref().map(|p| p.phase) else {
            return;
        };
        if phase != Phase::Rendering {
            self.complete_pass();
            return;
        }
        let changed = self.finalize_edges();
        if changed.is_empty() {
            self.complete_pass();
            return;
        }
        log::debug!(target: "stream", "{} chunks changed edges; re-meshing", changed.len());
        for coord in changed {
            self.renders.push(RenderTask {
                coord,
                cause: RenderCause::Edges,
            });
        }
        if let Some(pass) = self.pass.as_mut() {
            pass.phase = Phase::Finalizing;
        }
    }

    fn complete_pass(&mut self) {
        let Some(pass) = self.pass.take() else {
            return;
        };
        let initial = self.passes == 0;
        self.passes += 1;
        log::info!(
            target: "stream",
            "pass {} around ({}, {}) done in {:.1}ms: {} loaded, {} failed, {} resident",
            self.passes,
            pass.center.cx,
            pass.center.cz,
            pass.started.elapsed().as_secs_f64() * 1000.0,
            pass.loaded,
            pass.failed,
            self.chunks.len()
        );
        self.emit(StreamEvent::Updated { initial });
    }

    fn unload(&mut self, coord: ChunkCoord) {
        if let Some(chunk) = self.chunks.remove(&coord) {
            self.deltas.stash(coord, chunk.dirty_blocks());
        }
        self.meshes.remove(&coord);
        self.renders.retain(|t| t.coord != coord);
        self.emit(StreamEvent::Unloaded(coord));
    }

    fn open_edges(&self, coord: ChunkCoord) -> Edges {
        Cardinal::ALL
            .into_iter()
            .filter(|&dir| !self.chunks.contains_key(&coord.neighbor(dir)))
            .collect()
    }

    /// Recomputes every chunk's edge set; returns meshed chunks whose set changed.
    fn finalize_edges(&mut self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        coords.sort();
        let mut changed = Vec::new();
        for coord in coords {
            let edges = self.open_edges(coord);
            let Some(chunk) = self.chunks.get_mut(&coord) else {
                continue;
            };
            if chunk.set_edges(edges) && self.meshes.contains_key(&coord) {
                changed.push(coord);
            }
        }
        changed
    }

    fn render_chunk(&mut self, coord: ChunkCoord) -> bool {
        let size = self.cfg.chunk_size;
        let chunks = &self.chunks;
        let Some(chunk) = chunks.get(&coord) else {
            return false;
        };
        let lookup = |wx: i32, wy: i32, wz: i32| block_in(chunks, size, wx, wy, wz);
        let mesh = build_chunk_mesh(chunk, &self.reg, &lookup, None);
        self.meshes.insert(coord, mesh);
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.is_dirty = false;
        }
        true
    }

    /// Partial rebuild of every meshed chunk that can see the block at
    /// `(wx, wy, wz)`.
    fn remesh_around(&mut self, wx: i32, wy: i32, wz: i32) {
        let size = self.cfg.chunk_size;
        for coord in affected_chunks(wx, wz, size) {
            let chunks = &self.chunks;
            let Some(chunk) = chunks.get(&coord) else {
                continue;
            };
            let Some(mesh) = self.meshes.get_mut(&coord) else {
                continue;
            };
            let cells = edit_footprint(chunk, wx, wy, wz);
            let lookup = |ax: i32, ay: i32, az: i32| block_in(chunks, size, ax, ay, az);
            rebuild_cells(mesh, chunk, &self.reg, &lookup, &cells);
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.is_dirty = false;
            }
        }
    }

    /// Block at world `(x, y, z)`, or None when its chunk is not loaded or
    /// `y` is outside the column.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        block_in(&self.chunks, self.cfg.chunk_size, x, y, z)
    }

    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId) -> Result<(), EditError> {
        if y < 0 || y >= self.cfg.chunk_height as i32 {
            return Err(EditError::OutOfRange { y });
        }
        if self.reg.get(id).is_none() {
            return Err(EditError::UnknownBlock(id));
        }
        let size = self.cfg.chunk_size;
        let coord = ChunkCoord::from_block(x, z, size);
        let (ox, oz) = coord.origin(size);
        let chunk = self
            .chunks
            .get_mut(&coord)
            .ok_or(EditError::ChunkNotLoaded(coord))?;
        let (lx, lz) = ((x - ox) as usize, (z - oz) as usize);
        if chunk.set_block(lx, y as usize, lz, id, &self.reg) {
            self.remesh_around(x, y, z);
        }
        Ok(())
    }

    /// Topmost non-air `y + 1` of world column `(x, z)`.
    pub fn get_column_height(&self, x: i32, z: i32) -> Option<i32> {
        let size = self.cfg.chunk_size;
        let coord = ChunkCoord::from_block(x, z, size);
        let (ox, oz) = coord.origin(size);
        let chunk = self.chunks.get(&coord)?;
        Some(chunk.column_height((x - ox) as usize, (z - oz) as usize))
    }

    /// Advances block entities in every loaded chunk and re-meshes what
    /// changed. Returns the number of blocks replaced.
    pub fn tick_block_entities(&mut self) -> usize {
        let mut coords: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        coords.sort();
        let mut changed = Vec::new();
        for coord in coords {
            let Some(chunk) = self.chunks.get_mut(&coord) else {
                continue;
            };
            let cells = chunk.tick_entities(&self.reg);
            let (ox, oz) = chunk.origin();
            for cell in cells {
                let (x, y, z) = chunk.blocks().pos(cell as usize);
                changed.push((ox + x as i32, y as i32, oz + z as i32));
            }
        }
        for &(x, y, z) in &changed {
            self.remesh_around(x, y, z);
        }
        if !changed.is_empty() {
            log::debug!(target: "stream", "block entities replaced {} blocks", changed.len());
        }
        changed.len()
    }

    fn emit(&mut self, event: StreamEvent) {
        log::debug!(target: "stream", "{event:?}");
        for observer in self.observers.iter_mut() {
            observer(&event);
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.cfg
    }

    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.reg
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn mesh(&self, coord: ChunkCoord) -> Option<&ChunkMeshCPU> {
        self.meshes.get(&coord)
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn loaded_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    pub fn deltas(&self) -> &DeltaStore {
        &self.deltas
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            loaded: self.chunks.len(),
            visible: self.chunks.values().filter(|c| c.is_visible).count(),
            meshes: self.meshes.len(),
            quads: self.meshes.values().map(ChunkMeshCPU::quad_count).sum(),
            models: self.meshes.values().map(|m| m.models.len()).sum(),
            passes: self.passes,
            pending_renders: self.renders.len(),
            deltas: self.deltas.stats(),
        }
    }
}

fn block_in(
    chunks: &HashMap<ChunkCoord, Chunk>,
    size: usize,
    wx: i32,
    wy: i32,
    wz: i32,
) -> Option<BlockId> {
    let coord = ChunkCoord::from_block(wx, wz, size);
    let (ox, oz) = coord.origin(size);
    chunks.get(&coord)?.get_checked(wx - ox, wy, wz - oz)
}
