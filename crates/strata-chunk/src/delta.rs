use std::collections::BTreeMap;
use std::collections::HashMap;

use strata_blocks::BlockId;
use strata_world::ChunkCoord;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaStoreStats {
    pub chunk_entries: usize,
    pub block_edits: usize,
}

/// Dirty-block deltas of chunks that are not currently loaded, keyed by
/// chunk. Regenerating a chunk and re-applying its delta reproduces the
/// edited chunk.
#[derive(Default, Debug)]
pub struct DeltaStore {
    inner: HashMap<ChunkCoord, BTreeMap<u32, BlockId>>,
}

impl DeltaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> DeltaStoreStats {
        DeltaStoreStats {
            chunk_entries: self.inner.len(),
            block_edits: self.inner.values().map(|m| m.len()).sum(),
        }
    }

    /// Keeps `delta` for `coord`, merging over anything already stored.
    /// Empty deltas are ignored.
    pub fn stash(&mut self, coord: ChunkCoord, delta: &BTreeMap<u32, BlockId>) {
        if delta.is_empty() {
            return;
        }
        let entry = self.inner.entry(coord).or_default();
        entry.extend(delta.iter().map(|(&k, &v)| (k, v)));
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&BTreeMap<u32, BlockId>> {
        self.inner.get(&coord)
    }

    pub fn take(&mut self, coord: ChunkCoord) -> Option<BTreeMap<u32, BlockId>> {
        self.inner.remove(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.inner.contains_key(&coord)
    }
}

/// Chunks whose meshes depend on the block at world column `(wx, wz)`: the
/// owning chunk first, then any neighbor across a border the block touches.
pub fn affected_chunks(wx: i32, wz: i32, size: usize) -> Vec<ChunkCoord> {
    let s = size as i32;
    let owner = ChunkCoord::from_block(wx, wz, size);
    let (x0, z0) = owner.origin(size);
    let lx = wx - x0;
    let lz = wz - z0;

    let mut affected = vec![owner];
    if lx == 0 {
        affected.push(owner.offset(-1, 0));
    }
    if lx == s - 1 {
        affected.push(owner.offset(1, 0));
    }
    if lz == 0 {
        affected.push(owner.offset(0, -1));
    }
    if lz == s - 1 {
        affected.push(owner.offset(0, 1));
    }
    affected.dedup();
    affected
}
