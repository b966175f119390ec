//! Chunk storage, wire payloads, and dirty-block deltas.
#![forbid(unsafe_code)]

mod chunk;
mod delta;
mod edges;
mod error;
mod generate;
mod payload;
pub mod rle;

pub use chunk::{BlockEntity, Chunk};
pub use delta::{DeltaStore, DeltaStoreStats, affected_chunks};
pub use edges::Edges;
pub use error::{PayloadError, RleError};
pub use generate::{GeneratedChunk, generate_chunk, generate_chunk_payload};
pub use payload::{
    BlockData, BlockEncoding, ChunkPayload, ClimatePayload, MAX_CHUNK_HEIGHT, MAX_CHUNK_SIZE,
};
