//! Voxel terrain streaming: keeps the chunks around a moving reference
//! point generated, meshed, and editable.
#![forbid(unsafe_code)]

mod config;
mod error;
mod events;
mod manager;
mod scheduler;

pub use config::{StreamConfig, load_stream_config_from_path};
pub use error::EditError;
pub use events::StreamEvent;
pub use manager::{ChunkManager, ManagerStats};
pub use scheduler::{Task, TaskQueue};

pub use strata_blocks as blocks;
pub use strata_chunk as chunk;
pub use strata_mesh_cpu as mesh;
pub use strata_runtime as runtime;
pub use strata_world as world;
