use strata_blocks::BlockId;

/// Block lookup outside the chunk being meshed, in world coordinates.
/// `None` means nothing is known there (unloaded).
pub trait NeighborBlocks {
    fn block_at(&self, wx: i32, wy: i32, wz: i32) -> Option<BlockId>;
}

/// Every outside cell is unknown.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoNeighbors;

impl NeighborBlocks for NoNeighbors {
    #[inline]
    fn block_at(&self, _wx: i32, _wy: i32, _wz: i32) -> Option<BlockId> {
        None
    }
}

impl<F> NeighborBlocks for F
where
    F: Fn(i32, i32, i32) -> Option<BlockId>,
{
    #[inline]
    fn block_at(&self, wx: i32, wy: i32, wz: i32) -> Option<BlockId> {
        self(wx, wy, wz)
    }
}
