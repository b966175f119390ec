use std::sync::Arc;
use std::time::Duration;

use fastnoise_lite::FastNoiseLite;

use crate::worldgen::WorldGenParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerrainStage {
    Climate = 0,
    Shape = 1,
    Height = 2,
    Density = 3,
    Populate = 4,
    Surface = 5,
}

pub const TERRAIN_STAGE_COUNT: usize = 6;

pub const TERRAIN_STAGE_LABELS: [&str; TERRAIN_STAGE_COUNT] =
    ["climate", "shape", "height", "density", "populate", "surface"];

impl TerrainStage {
    pub const ALL: [TerrainStage; TERRAIN_STAGE_COUNT] = [
        TerrainStage::Climate,
        TerrainStage::Shape,
        TerrainStage::Height,
        TerrainStage::Density,
        TerrainStage::Populate,
        TerrainStage::Surface,
    ];

    #[inline]
    pub fn label(self) -> &'static str {
        TERRAIN_STAGE_LABELS[self as usize]
    }
}

/// Per-stage timings of one `generate_terrain` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainMetrics {
    pub stage_us: [u32; TERRAIN_STAGE_COUNT],
    pub columns: u32,
    pub coarse_samples: u32,
}

impl TerrainMetrics {
    pub fn record(&mut self, stage: TerrainStage, elapsed: Duration) {
        let us = elapsed.as_micros().min(u128::from(u32::MAX)) as u32;
        let slot = &mut self.stage_us[stage as usize];
        *slot = slot.saturating_add(us);
    }

    #[inline]
    pub fn stage_us(&self, stage: TerrainStage) -> u32 {
        self.stage_us[stage as usize]
    }

    pub fn total_us(&self) -> u64 {
        self.stage_us.iter().map(|&v| u64::from(v)).sum()
    }

    pub fn reset(&mut self) {
        *self = TerrainMetrics::default();
    }
}

/// Seed-derived sample offsets, in blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct NoiseOffsets {
    pub temperature: (f32, f32),
    pub humidity: (f32, f32),
    pub shore: (f32, f32),
    pub warp_x: (f32, f32),
    pub warp_z: (f32, f32),
    pub mountains: (f32, f32),
    pub elevation: (f32, f32),
    pub hills: (f32, f32),
    pub rivers: (f32, f32),
    pub turbulence: (f32, f32),
}

/// Worker-local generation state. Never shared between threads.
pub struct GenCtx {
    pub params: Arc<WorldGenParams>,
    pub metrics: TerrainMetrics,
    pub(crate) temperature: FastNoiseLite,
    pub(crate) humidity: FastNoiseLite,
    pub(crate) shore: FastNoiseLite,
    pub(crate) warp: FastNoiseLite,
    pub(crate) mountains: FastNoiseLite,
    pub(crate) elevation: FastNoiseLite,
    pub(crate) hills: FastNoiseLite,
    pub(crate) rivers: FastNoiseLite,
    pub(crate) turbulence: FastNoiseLite,
    pub(crate) offsets: NoiseOffsets,
}
