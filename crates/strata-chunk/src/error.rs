use strata_world::ChunkCoord;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RleError {
    #[error("run {index} has zero length")]
    EmptyRun { index: usize },
    #[error("runs decode past the expected {expected} cells")]
    Overflow { expected: usize },
    #[error("runs decode to {actual} cells, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("block array has {actual} cells, expected {expected}")]
    BlockLength { expected: usize, actual: usize },
    #[error("climate arrays have {temperature}/{humidity} columns, expected {expected}")]
    ClimateLength {
        expected: usize,
        temperature: usize,
        humidity: usize,
    },
    #[error("bad run-length data: {0}")]
    Rle(#[from] RleError),
    #[error("payload for {actual:?} delivered for {expected:?}")]
    PositionMismatch {
        expected: ChunkCoord,
        actual: ChunkCoord,
    },
    #[error("payload is {actual_size}x{actual_height}, session uses {size}x{height}")]
    DimensionMismatch {
        size: usize,
        height: usize,
        actual_size: usize,
        actual_height: usize,
    },
    #[error("chunk dimensions {size}x{height} are outside 1..={max_size}x1..={max_height}")]
    DimensionsOutOfRange {
        size: usize,
        height: usize,
        max_size: usize,
        max_height: usize,
    },
    #[error("dirty block at cell {cell} is outside the {len} cell chunk")]
    DirtyOutOfRange { cell: u32, len: usize },
    #[error("malformed chunk json: {0}")]
    Json(#[from] serde_json::Error),
}
