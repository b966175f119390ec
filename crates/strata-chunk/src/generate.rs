use strata_blocks::BlockRegistry;
use strata_world::{ChunkCoord, GenCtx, GenError, TerrainMetrics, World};

use crate::payload::{BlockEncoding, ChunkPayload};
use crate::Chunk;

#[derive(Clone, Debug)]
pub struct GeneratedChunk {
    pub payload: ChunkPayload,
    pub metrics: TerrainMetrics,
}

/// Generates the chunk at `coord` as plain data, ready to cross a thread boundary.
pub fn generate_chunk_payload(
    world: &World,
    reg: &BlockRegistry,
    ctx: &mut GenCtx,
    coord: ChunkCoord,
    size: usize,
    height: usize,
) -> Result<GeneratedChunk, GenError> {
    let (ox, oz) = coord.origin(size);
    let out = world.generate_terrain(reg, ctx, ox, oz, size, height)?;
    Ok(GeneratedChunk {
        payload: ChunkPayload::from_terrain(coord, &out, BlockEncoding::Dense),
        metrics: out.metrics,
    })
}

/// Generates and wraps the chunk at `coord` in one step.
pub fn generate_chunk(
    world: &World,
    reg: &BlockRegistry,
    ctx: &mut GenCtx,
    coord: ChunkCoord,
    size: usize,
    height: usize,
) -> Result<Chunk, GenError> {
    let (ox, oz) = coord.origin(size);
    let out = world.generate_terrain(reg, ctx, ox, oz, size, height)?;
    Ok(Chunk::from_terrain(coord, out, reg))
}
