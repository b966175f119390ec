use strata_blocks::BlockId;
use strata_world::ChunkCoord;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("chunk ({}, {}) is not loaded", .0.cx, .0.cz)]
    ChunkNotLoaded(ChunkCoord),
    #[error("y = {y} is outside the world column")]
    OutOfRange { y: i32 },
    #[error("unknown block id {0}")]
    UnknownBlock(BlockId),
}
