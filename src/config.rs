use serde::Deserialize;
use std::fs;
use std::path::Path;

use strata_world::{COARSE_XZ, COARSE_Y, ConfigError};

/// Streaming constants, fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "d_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "d_chunk_height")]
    pub chunk_height: usize,
    /// Chebyshev radius (chunks) inside which loaded chunks are shown.
    #[serde(default = "d_view_radius")]
    pub view_radius: i32,
    #[serde(default = "d_load_radius")]
    pub load_radius: i32,
    #[serde(default = "d_unload_radius")]
    pub unload_radius: i32,
    /// Chunks meshed per `tick`.
    #[serde(default = "d_render_slice")]
    pub render_slice: usize,
    /// Generator threads; 0 uses the available parallelism.
    #[serde(default)]
    pub workers: usize,
    #[serde(default = "d_cache_capacity")]
    pub cache_capacity: usize,
}
fn d_chunk_size() -> usize {
    16
}
fn d_chunk_height() -> usize {
    256
}
fn d_view_radius() -> i32 {
    4
}
fn d_load_radius() -> i32 {
    5
}
fn d_unload_radius() -> i32 {
    7
}
fn d_render_slice() -> usize {
    4
}
fn d_cache_capacity() -> usize {
    256
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: d_chunk_size(),
            chunk_height: d_chunk_height(),
            view_radius: d_view_radius(),
            load_radius: d_load_radius(),
            unload_radius: d_unload_radius(),
            render_slice: d_render_slice(),
            workers: 0,
            cache_capacity: d_cache_capacity(),
        }
    }
}

impl StreamConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 || self.chunk_size % COARSE_XZ != 0 {
            return Err(ConfigError::Invalid(format!(
                "chunk_size {} must be a positive multiple of {COARSE_XZ}",
                self.chunk_size
            )));
        }
        if self.chunk_height == 0 || self.chunk_height % COARSE_Y != 0 {
            return Err(ConfigError::Invalid(format!(
                "chunk_height {} must be a positive multiple of {COARSE_Y}",
                self.chunk_height
            )));
        }
        if self.view_radius < 0
            || self.view_radius > self.load_radius
            || self.load_radius > self.unload_radius
        {
            return Err(ConfigError::Invalid(format!(
                "radii must satisfy 0 <= view ({}) <= load ({}) <= unload ({})",
                self.view_radius, self.load_radius, self.unload_radius
            )));
        }
        if self.render_slice == 0 {
            return Err(ConfigError::Invalid("render_slice must be at least 1".into()));
        }
        Ok(())
    }
}

pub fn load_stream_config_from_path(path: &Path) -> Result<StreamConfig, ConfigError> {
    let s = fs::read_to_string(path)?;
    StreamConfig::from_toml_str(&s)
}
