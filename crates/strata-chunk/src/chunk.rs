use std::collections::{BTreeMap, BTreeSet};

use strata_blocks::{AIR, BlockId, BlockRegistry};
use strata_grid::{Grid2, Grid3};
use strata_world::{ChunkCoord, Climate, TerrainOutput};

use crate::payload::{BlockData, BlockEncoding, ChunkPayload, ClimatePayload};
use crate::{Edges, PayloadError};

const FACE_OFFSETS: [(i32, i32, i32); 6] = [
    (0, 1, 0),
    (0, -1, 0),
    (1, 0, 0),
    (-1, 0, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Stateful per-cell behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockEntity {
    /// Replaced by `into` once `ticks_left` reaches zero.
    Growth { into: BlockId, ticks_left: u32 },
}

/// A `size x height x size` column of blocks. Owned by the chunk manager.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    blocks: Grid3<BlockId>,
    climate: Grid2<Climate>,
    dirty_blocks: BTreeMap<u32, BlockId>,
    block_entities: BTreeMap<u32, BlockEntity>,
    surface: BTreeSet<u32>,
    edges: Edges,
    /// Set on edit; cleared by whoever rebuilds the mesh.
    pub is_dirty: bool,
    pub is_visible: bool,
    revision: u64,
}

impl Chunk {
    /// Wraps generated blocks, deriving the surface set and block entities.
    pub fn new(
        coord: ChunkCoord,
        blocks: Grid3<BlockId>,
        climate: Grid2<Climate>,
        reg: &BlockRegistry,
    ) -> Self {
        let mut chunk = Self::bare(coord, blocks, climate);
        chunk.surface = chunk.compute_surface(reg);
        chunk.block_entities = chunk.derive_entities(reg);
        chunk
    }

    /// Same as [`Chunk::new`], reusing the generator's surface set.
    pub fn from_terrain(coord: ChunkCoord, out: TerrainOutput, reg: &BlockRegistry) -> Self {
        let mut chunk = Self::bare(coord, out.blocks, out.climate);
        chunk.surface = out.surface.into_iter().collect();
        chunk.block_entities = chunk.derive_entities(reg);
        chunk
    }

    /// Restores a chunk from plain data. The payload's dirty cells are applied
    /// over its block array and kept as this chunk's delta.
    pub fn from_payload(payload: ChunkPayload, reg: &BlockRegistry) -> Result<Self, PayloadError> {
        let decoded = payload.decode_blocks()?;
        let mut chunk = Self::new(decoded.position, decoded.blocks, decoded.climate, reg);
        chunk.dirty_blocks = decoded.dirty_blocks;
        Ok(chunk)
    }

    fn bare(coord: ChunkCoord, blocks: Grid3<BlockId>, climate: Grid2<Climate>) -> Self {
        Self {
            coord,
            blocks,
            climate,
            dirty_blocks: BTreeMap::new(),
            block_entities: BTreeMap::new(),
            surface: BTreeSet::new(),
            edges: Edges::ALL,
            is_dirty: true,
            is_visible: false,
            revision: 0,
        }
    }

    pub fn to_payload(&self, encoding: BlockEncoding) -> ChunkPayload {
        ChunkPayload {
            position: self.coord,
            size: self.size(),
            height: self.height(),
            blocks: BlockData::encode(self.blocks.as_slice(), encoding),
            dirty_blocks: self.dirty_blocks.clone(),
            climate: ClimatePayload::from_grid(&self.climate),
        }
    }

    /// Run-length encoded JSON snapshot.
    pub fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(&self.to_payload(BlockEncoding::Rle))?)
    }

    pub fn from_json(s: &str, reg: &BlockRegistry) -> Result<Self, PayloadError> {
        let payload: ChunkPayload = serde_json::from_str(s)?;
        Self::from_payload(payload, reg)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.blocks.sx()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.blocks.sy()
    }

    /// World block coordinates of the minimum corner.
    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        self.coord.origin(self.size())
    }

    #[inline]
    pub fn blocks(&self) -> &Grid3<BlockId> {
        &self.blocks
    }

    #[inline]
    pub fn climate(&self) -> &Grid2<Climate> {
        &self.climate
    }

    #[inline]
    pub fn climate_at(&self, x: usize, z: usize) -> Climate {
        *self.climate.get(x, z)
    }

    pub fn dirty_blocks(&self) -> &BTreeMap<u32, BlockId> {
        &self.dirty_blocks
    }

    pub fn block_entities(&self) -> &BTreeMap<u32, BlockEntity> {
        &self.block_entities
    }

    pub fn surface(&self) -> &BTreeSet<u32> {
        &self.surface
    }

    #[inline]
    pub fn is_surface(&self, x: usize, y: usize, z: usize) -> bool {
        self.surface.contains(&(self.blocks.idx(x, y, z) as u32))
    }

    #[inline]
    pub fn edges(&self) -> Edges {
        self.edges
    }

    /// Returns true when the edge set actually changed.
    pub fn set_edges(&mut self, edges: Edges) -> bool {
        if self.edges == edges {
            return false;
        }
        self.edges = edges;
        true
    }

    /// Incremented on every block change.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        *self.blocks.get(x, y, z)
    }

    #[inline]
    pub fn get_checked(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        self.blocks.get_checked(x, y, z).copied()
    }

    /// Topmost non-air `y + 1`, or 0 for an empty column.
    pub fn column_height(&self, x: usize, z: usize) -> i32 {
        self.blocks
            .column(x, z)
            .iter()
            .rposition(|&id| id != AIR)
            .map_or(0, |y| y as i32 + 1)
    }

    /// Writes one cell and records it as a delta. Returns false when the cell
    /// already held `id`.
    pub fn set_block(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        id: BlockId,
        reg: &BlockRegistry,
    ) -> bool {
        let idx = self.blocks.idx(x, y, z);
        if self.blocks.as_slice()[idx] == id {
            return false;
        }
        self.blocks.set(x, y, z, id);
        self.dirty_blocks.insert(idx as u32, id);
        self.revision += 1;
        self.is_dirty = true;

        match reg.get(id).and_then(|b| b.growth) {
            Some(g) => {
                self.block_entities.insert(
                    idx as u32,
                    BlockEntity::Growth {
                        into: g.into,
                        ticks_left: g.ticks,
                    },
                );
            }
            None => {
                self.block_entities.remove(&(idx as u32));
            }
        }

        self.refresh_surface(x, y, z, reg);
        for (dx, dy, dz) in FACE_OFFSETS {
            let (nx, ny, nz) = (x as i32 + dx, y as i32 + dy, z as i32 + dz);
            if self.blocks.contains(nx, ny, nz) {
                self.refresh_surface(nx as usize, ny as usize, nz as usize, reg);
            }
        }
        true
    }

    /// Advances every block entity by one tick and returns the cells whose
    /// block changed.
    pub fn tick_entities(&mut self, reg: &BlockRegistry) -> Vec<u32> {
        let mut ready = Vec::new();
        for (&cell, entity) in self.block_entities.iter_mut() {
            match entity {
                BlockEntity::Growth { into, ticks_left } => {
                    *ticks_left = ticks_left.saturating_sub(1);
                    if *ticks_left == 0 {
                        ready.push((cell, *into));
                    }
                }
            }
        }
        let mut changed = Vec::with_capacity(ready.len());
        for (cell, into) in ready {
            self.block_entities.remove(&cell);
            let (x, y, z) = self.blocks.pos(cell as usize);
            if self.set_block(x, y, z, into, reg) {
                changed.push(cell);
            }
        }
        changed
    }

    fn exposed(&self, x: usize, y: usize, z: usize, reg: &BlockRegistry) -> bool {
        let id = self.get(x, y, z);
        if id == AIR {
            return false;
        }
        if !reg.occludes(id) {
            return true;
        }
        FACE_OFFSETS.iter().any(|&(dx, dy, dz)| {
            match self.get_checked(x as i32 + dx, y as i32 + dy, z as i32 + dz) {
                Some(nb) => !reg.occludes(nb),
                None => true,
            }
        })
    }

    fn refresh_surface(&mut self, x: usize, y: usize, z: usize, reg: &BlockRegistry) {
        let idx = self.blocks.idx(x, y, z) as u32;
        if self.exposed(x, y, z, reg) {
            self.surface.insert(idx);
        } else {
            self.surface.remove(&idx);
        }
    }

    fn compute_surface(&self, reg: &BlockRegistry) -> BTreeSet<u32> {
        let (sx, sy, sz) = self.blocks.dims();
        let mut out = BTreeSet::new();
        for z in 0..sz {
            for x in 0..sx {
                for y in 0..sy {
                    if self.exposed(x, y, z, reg) {
                        out.insert(self.blocks.idx(x, y, z) as u32);
                    }
                }
            }
        }
        out
    }

    fn derive_entities(&self, reg: &BlockRegistry) -> BTreeMap<u32, BlockEntity> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(i, &id)| {
                let g = reg.get(id)?.growth?;
                Some((
                    i as u32,
                    BlockEntity::Growth {
                        into: g.into,
                        ticks_left: g.ticks,
                    },
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BlockRegistry {
        BlockRegistry::builtin().unwrap()
    }

    fn flat_chunk(reg: &BlockRegistry) -> Chunk {
        let stone = reg.id_by_name("stone").unwrap();
        let blocks = Grid3::from_fn(4, 8, 4, |_, y, _| if y < 3 { stone } else { AIR });
        Chunk::new(ChunkCoord::new(0, 0), blocks, Grid2::new(4, 4, Climate::default()), reg)
    }

    #[test]
    fn surface_skips_buried_cells() {
        let reg = registry();
        let chunk = flat_chunk(&reg);
        // interior cell: neighbors all stone
        assert!(!chunk.is_surface(1, 1, 1));
        // top layer touches air
        assert!(chunk.is_surface(1, 2, 1));
        // chunk boundary is exposed
        assert!(chunk.is_surface(0, 1, 1));
        assert!(!chunk.is_surface(1, 5, 1));
    }

    #[test]
    fn set_block_tracks_delta_revision_and_surface() {
        let reg = registry();
        let mut chunk = flat_chunk(&reg);
        chunk.is_dirty = false;
        assert!(chunk.set_block(1, 2, 1, AIR, &reg));
        assert!(!chunk.set_block(1, 2, 1, AIR, &reg));
        assert_eq!(chunk.revision(), 1);
        assert!(chunk.is_dirty);
        let idx = chunk.blocks().idx(1, 2, 1) as u32;
        assert_eq!(chunk.dirty_blocks().get(&idx), Some(&AIR));
        assert!(!chunk.is_surface(1, 2, 1));
        // the cell below is now exposed
        assert!(chunk.is_surface(1, 1, 1));
        assert_eq!(chunk.column_height(1, 1), 2);
        assert_eq!(chunk.column_height(2, 2), 3);
    }

    #[test]
    fn sapling_grows_after_its_ticks() {
        let reg = registry();
        let sapling = reg.id_by_name("sapling").unwrap();
        let shrub = reg.id_by_name("shrub").unwrap();
        let ticks = reg.get(sapling).unwrap().growth.unwrap().ticks;
        let mut chunk = flat_chunk(&reg);
        chunk.set_block(2, 3, 2, sapling, &reg);
        assert_eq!(chunk.block_entities().len(), 1);
        for _ in 1..ticks {
            assert!(chunk.tick_entities(&reg).is_empty());
        }
        let changed = chunk.tick_entities(&reg);
        assert_eq!(changed, vec![chunk.blocks().idx(2, 3, 2) as u32]);
        assert_eq!(chunk.get(2, 3, 2), shrub);
        assert!(chunk.block_entities().is_empty());
    }

    #[test]
    fn edges_start_full() {
        let reg = registry();
        let mut chunk = flat_chunk(&reg);
        assert_eq!(chunk.edges(), Edges::ALL);
        assert!(chunk.set_edges(Edges::NONE));
        assert!(!chunk.set_edges(Edges::NONE));
    }
}
