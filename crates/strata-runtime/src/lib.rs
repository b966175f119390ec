//! Background chunk generation: a rayon worker pool fed over crossbeam
//! channels, with batch aggregation for the streaming manager.
#![forbid(unsafe_code)]

mod gen_ctx_pool;
mod payload_cache;
mod source;

pub use gen_ctx_pool::GenCtxPool;
pub use payload_cache::{PayloadCache, PayloadCacheStats};
pub use source::{BatchResult, ChunkSource, LocalSource, SourceError};

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashMap;
use strata_blocks::BlockRegistry;
use strata_chunk::{ChunkPayload, generate_chunk_payload};
use strata_world::{ChunkCoord, World};

struct GenJob {
    batch: u64,
    coord: ChunkCoord,
}

struct JobOut {
    batch: u64,
    coord: ChunkCoord,
    result: Result<ChunkPayload, SourceError>,
}

struct PendingBatch {
    expected: usize,
    chunks: Vec<(ChunkCoord, Result<ChunkPayload, SourceError>)>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub queued: usize,
    pub inflight: usize,
    pub pending_batches: usize,
    pub cache: PayloadCacheStats,
}

/// Multi-threaded `ChunkSource`. Each coordinate is one job; results are
/// regrouped into their batch before being handed out.
pub struct GenRuntime {
    _pool: Arc<rayon::ThreadPool>,
    job_tx: Sender<GenJob>,
    res_rx: Receiver<JobOut>,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    cache: Arc<PayloadCache>,
    pending: HashMap<u64, PendingBatch>,
    completed: VecDeque<BatchResult>,
    workers: usize,
}

impl GenRuntime {
    /// Starts `workers` generator threads (0 picks the available parallelism).
    pub fn new(
        world: Arc<World>,
        reg: Arc<BlockRegistry>,
        size: usize,
        height: usize,
        workers: usize,
        cache_capacity: usize,
    ) -> Result<Self, SourceError> {
        let workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            workers
        };
        let (job_tx, job_rx) = unbounded::<GenJob>();
        let (res_tx, res_rx) = unbounded::<JobOut>();
        let pool = Arc::new(
            rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("strata-gen-{i}"))
                .build()?,
        );
        let ctx_pool = Arc::new(GenCtxPool::for_workers(workers));
        let cache = Arc::new(PayloadCache::new(cache_capacity));
        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));

        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let world = world.clone();
            let reg = reg.clone();
            let ctx_pool = ctx_pool.clone();
            let cache = cache.clone();
            let queued = queued.clone();
            let inflight = inflight.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    queued.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    let result = match cache.get(job.coord) {
                        Some(hit) => Ok(ChunkPayload::clone(&hit)),
                        None => ctx_pool.with_ctx(&world, |ctx| {
                            let t0 = Instant::now();
                            let res =
                                generate_chunk_payload(&world, &reg, ctx, job.coord, size, height);
                            match res {
                                Ok(generated) => {
                                    log::debug!(
                                        target: "runtime",
                                        "generated chunk ({}, {}) in {:.2}ms (terrain {}us)",
                                        job.coord.cx,
                                        job.coord.cz,
                                        t0.elapsed().as_secs_f64() * 1000.0,
                                        generated.metrics.total_us()
                                    );
                                    cache.insert(Arc::new(generated.payload.clone()));
                                    Ok(generated.payload)
                                }
                                Err(e) => Err(SourceError::from(e)),
                            }
                        }),
                    };
                    inflight.fetch_sub(1, Ordering::Relaxed);
                    let out = JobOut {
                        batch: job.batch,
                        coord: job.coord,
                        result,
                    };
                    if tx.send(out).is_err() {
                        break;
                    }
                }
            });
        }
        log::info!(target: "runtime", "started {workers} generator threads");

        Ok(Self {
            _pool: pool,
            job_tx,
            res_rx,
            queued,
            inflight,
            cache,
            pending: HashMap::new(),
            completed: VecDeque::new(),
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns (queued, inflight) job counts.
    pub fn queue_debug_counts(&self) -> (usize, usize) {
        (
            self.queued.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
        )
    }

    pub fn stats(&self) -> RuntimeStats {
        let (queued, inflight) = self.queue_debug_counts();
        RuntimeStats {
            queued,
            inflight,
            pending_batches: self.pending.len(),
            cache: self.cache.stats(),
        }
    }

    fn absorb(&mut self, out: JobOut) {
        let Some(batch) = self.pending.get_mut(&out.batch) else {
            log::warn!(target: "runtime", "result for unknown batch {}", out.batch);
            return;
        };
        batch.chunks.push((out.coord, out.result));
        if batch.chunks.len() >= batch.expected {
            if let Some(done) = self.pending.remove(&out.batch) {
                self.completed.push_back(BatchResult {
                    id: out.batch,
                    chunks: done.chunks,
                });
            }
        }
    }

    fn drain_worker_results(&mut self) {
        let outs: Vec<JobOut> = self.res_rx.try_iter().collect();
        for out in outs {
            self.absorb(out);
        }
    }
}

impl ChunkSource for GenRuntime {
    fn request(&mut self, batch_id: u64, coords: Vec<ChunkCoord>) {
        if coords.is_empty() {
            self.completed.push_back(BatchResult {
                id: batch_id,
                chunks: Vec::new(),
            });
            return;
        }
        self.pending.insert(
            batch_id,
            PendingBatch {
                expected: coords.len(),
                chunks: Vec::with_capacity(coords.len()),
            },
        );
        for coord in coords {
            self.queued.fetch_add(1, Ordering::Relaxed);
            let job = GenJob {
                batch: batch_id,
                coord,
            };
            if self.job_tx.send(job).is_err() {
                self.queued.fetch_sub(1, Ordering::Relaxed);
                self.absorb(JobOut {
                    batch: batch_id,
                    coord,
                    result: Err(SourceError::Unavailable(
                        "generator workers have shut down".into(),
                    )),
                });
            }
        }
    }

    fn try_recv(&mut self) -> Option<BatchResult> {
        self.drain_worker_results();
        self.completed.pop_front()
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Option<BatchResult> {
        let deadline = Instant::now() + timeout;
        loop {
            self.drain_worker_results();
            if let Some(done) = self.completed.pop_front() {
                return Some(done);
            }
            if self.pending.is_empty() {
                return None;
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return None;
            }
            match self.res_rx.recv_timeout(left) {
                Ok(out) => self.absorb(out),
                Err(_) => return None,
            }
        }
    }
}
