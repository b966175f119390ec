use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use strata_blocks::BlockRegistry;
use strata_chunk::{ChunkPayload, generate_chunk_payload};
use strata_world::{ChunkCoord, GenCtx, GenError, World};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("terrain generation failed: {0}")]
    Generation(#[from] GenError),
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("chunk source unavailable: {0}")]
    Unavailable(String),
}

/// Reply to one `request` call. Every requested coordinate appears exactly once.
#[derive(Debug)]
pub struct BatchResult {
    pub id: u64,
    pub chunks: Vec<(ChunkCoord, Result<ChunkPayload, SourceError>)>,
}

impl BatchResult {
    pub fn failures(&self) -> usize {
        self.chunks.iter().filter(|(_, r)| r.is_err()).count()
    }
}

/// Anything that turns chunk coordinates into payloads. Replies arrive
/// asynchronously and are matched to requests by batch id.
pub trait ChunkSource {
    fn request(&mut self, batch_id: u64, coords: Vec<ChunkCoord>);

    /// Returns a finished batch if one is ready.
    fn try_recv(&mut self) -> Option<BatchResult>;

    /// Waits up to `timeout` for a finished batch.
    fn recv_timeout(&mut self, timeout: Duration) -> Option<BatchResult>;
}

/// Generates on the calling thread during `request`.
pub struct LocalSource {
    world: Arc<World>,
    reg: Arc<BlockRegistry>,
    ctx: GenCtx,
    size: usize,
    height: usize,
    ready: VecDeque<BatchResult>,
}

impl LocalSource {
    pub fn new(world: Arc<World>, reg: Arc<BlockRegistry>, size: usize, height: usize) -> Self {
        let ctx = world.make_gen_ctx();
        Self {
            world,
            reg,
            ctx,
            size,
            height,
            ready: VecDeque::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.ready.len()
    }
}

impl ChunkSource for LocalSource {
    fn request(&mut self, batch_id: u64, coords: Vec<ChunkCoord>) {
        let chunks = coords
            .into_iter()
            .map(|coord| {
                let res = generate_chunk_payload(
                    &self.world,
                    &self.reg,
                    &mut self.ctx,
                    coord,
                    self.size,
                    self.height,
                )
                .map(|g| g.payload)
                .map_err(SourceError::from);
                (coord, res)
            })
            .collect();
        self.ready.push_back(BatchResult { id: batch_id, chunks });
    }

    fn try_recv(&mut self) -> Option<BatchResult> {
        self.ready.pop_front()
    }

    fn recv_timeout(&mut self, _timeout: Duration) -> Option<BatchResult> {
        self.ready.pop_front()
    }
}
