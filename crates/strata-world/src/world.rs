use std::sync::Arc;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::gen_ctx::{GenCtx, NoiseOffsets, TerrainMetrics};
use crate::worldgen::WorldGenParams;

/// Seed plus the worldgen parameters fixed for a session.
pub struct World {
    pub seed: i32,
    params: Arc<WorldGenParams>,
}

impl World {
    pub fn new(seed: i32, params: WorldGenParams) -> Self {
        Self {
            seed,
            params: Arc::new(params),
        }
    }

    pub fn with_default_params(seed: i32) -> Self {
        Self::new(seed, WorldGenParams::default())
    }

    #[inline]
    pub fn params(&self) -> &Arc<WorldGenParams> {
        &self.params
    }

    #[inline]
    pub fn sea_level(&self) -> i32 {
        self.params.sea_level
    }

    pub fn make_gen_ctx(&self) -> GenCtx {
        let noise = |salt: u32| {
            let mut n = FastNoiseLite::with_seed(((self.seed as u32) ^ salt) as i32);
            n.set_noise_type(Some(NoiseType::OpenSimplex2));
            // Fractal helpers scale coordinates themselves.
            n.set_frequency(Some(1.0));
            n
        };
        GenCtx {
            params: Arc::clone(&self.params),
            metrics: TerrainMetrics::default(),
            temperature: noise(0x1203_5F31),
            humidity: noise(0x92E3_A1B2),
            shore: noise(0x5EA5_1DE0),
            warp: noise(0x0001_8343),
            mountains: noise(0x00A1_9E55),
            elevation: noise(0x3C6E_F372),
            hills: noise(0x7F4A_7C15),
            rivers: noise(0x2545_F491),
            turbulence: noise(0x0000_A137),
            offsets: self.noise_offsets(),
        }
    }

    fn noise_offsets(&self) -> NoiseOffsets {
        let range = self.params.random_offset_range;
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(self.seed as u32));
        let mut pair = || {
            let a: f32 = rng.r#gen();
            let b: f32 = rng.r#gen();
            ((a * 2.0 - 1.0) * range, (b * 2.0 - 1.0) * range)
        };
        NoiseOffsets {
            temperature: pair(),
            humidity: pair(),
            shore: pair(),
            warp_x: pair(),
            warp_z: pair(),
            mountains: pair(),
            elevation: pair(),
            hills: pair(),
            rivers: pair(),
            turbulence: pair(),
        }
    }
}
