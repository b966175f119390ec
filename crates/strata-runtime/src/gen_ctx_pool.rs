use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use strata_world::{GenCtx, World};

/// Lock-free pool for reusing `GenCtx` instances across worker jobs.
pub struct GenCtxPool {
    available_tx: Sender<GenCtx>,
    available_rx: Receiver<GenCtx>,
    allocated: AtomicUsize,
    max_contexts: usize,
}

impl GenCtxPool {
    pub fn new(max_contexts: usize) -> Self {
        let max_contexts = max_contexts.max(1);
        let (tx, rx) = bounded(max_contexts);
        Self {
            available_tx: tx,
            available_rx: rx,
            allocated: AtomicUsize::new(0),
            max_contexts,
        }
    }

    pub fn for_workers(worker_count: usize) -> Self {
        Self::new(worker_count.max(1) * 2)
    }

    /// Runs `f` with a context from the pool, creating one if under capacity
    /// and blocking for a free one otherwise.
    pub fn with_ctx<R>(&self, world: &World, f: impl FnOnce(&mut GenCtx) -> R) -> R {
        let mut ctx = self.acquire(world);
        ctx.metrics.reset();
        let out = f(&mut ctx);
        let _ = self.available_tx.send(ctx);
        out
    }

    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    fn acquire(&self, world: &World) -> GenCtx {
        if let Ok(ctx) = self.available_rx.try_recv() {
            return ctx;
        }
        loop {
            let current = self.allocated.load(Ordering::Acquire);
            if current < self.max_contexts {
                let prev = self.allocated.fetch_add(1, Ordering::AcqRel);
                if prev < self.max_contexts {
                    return world.make_gen_ctx();
                }
                self.allocated.fetch_sub(1, Ordering::AcqRel);
            }
            // The pool holds its own sender, so this only fails if it is being torn down.
            if let Ok(ctx) = self.available_rx.recv() {
                return ctx;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts_are_reused() {
        let world = World::with_default_params(5);
        let pool = GenCtxPool::new(2);
        for _ in 0..8 {
            pool.with_ctx(&world, |ctx| ctx.metrics.columns += 1);
        }
        assert_eq!(pool.allocated(), 1);
        // metrics are cleared between uses
        pool.with_ctx(&world, |ctx| assert_eq!(ctx.metrics.columns, 0));
    }
}
