//! World seed, worldgen parameters, and the density-field terrain generator.
#![forbid(unsafe_code)]

mod chunk_coord;
mod climate;
mod error;
mod gen_ctx;
mod noise;
mod terrain;
mod world;
pub mod worldgen;

pub use chunk_coord::{Cardinal, ChunkCoord};
pub use climate::{CLIMATE_MAX, Climate};
pub use error::{ConfigError, GenError};
pub use gen_ctx::{GenCtx, TERRAIN_STAGE_COUNT, TERRAIN_STAGE_LABELS, TerrainMetrics, TerrainStage};
pub use noise::smoothstep;
pub use terrain::{COARSE_XZ, COARSE_Y, TerrainOutput};
pub use world::World;
pub use worldgen::{WorldGenConfig, WorldGenParams, load_params_from_path};
