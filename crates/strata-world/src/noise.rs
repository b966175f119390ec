use fastnoise_lite::FastNoiseLite;

use crate::worldgen::Fractal;

pub(crate) fn fractal2(noise: &FastNoiseLite, x: f32, z: f32, fractal: &Fractal) -> f32 {
    let mut amp = 1.0_f32;
    let mut freq = 1.0_f32 / fractal.scale.max(0.0001);
    let mut sum = 0.0_f32;
    let mut max_amp = 0.0_f32;
    for _ in 0..fractal.octaves.max(1) {
        sum += noise.get_noise_2d(x * freq, z * freq) * amp;
        max_amp += amp;
        amp *= fractal.persistence;
        freq *= fractal.lacunarity;
    }
    if max_amp > 0.0 { sum / max_amp } else { sum }
}

pub(crate) fn fractal3(noise: &FastNoiseLite, x: f32, y: f32, z: f32, fractal: &Fractal) -> f32 {
    let mut amp = 1.0_f32;
    let mut freq = 1.0_f32 / fractal.scale.max(0.0001);
    let mut sum = 0.0_f32;
    let mut max_amp = 0.0_f32;
    for _ in 0..fractal.octaves.max(1) {
        sum += noise.get_noise_3d(x * freq, y * freq, z * freq) * amp;
        max_amp += amp;
        amp *= fractal.persistence;
        freq *= fractal.lacunarity;
    }
    if max_amp > 0.0 { sum / max_amp } else { sum }
}

/// `[-1, 1]` noise to `[0, 1]`.
#[inline]
pub(crate) fn unit(n: f32) -> f32 {
    (n * 0.5 + 0.5).clamp(0.0, 1.0)
}

/// Ridge transform `1 - |2u - 1|` of a unit value; peaks where the noise crosses zero.
#[inline]
pub(crate) fn ridge(n: f32) -> f32 {
    1.0 - (2.0 * unit(n) - 1.0).abs()
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Stable per-column hash in `[0, 1)`.
pub(crate) fn hash01(seed: i32, x: i32, z: i32, salt: u64) -> f32 {
    let mut h = (seed as u32 as u64) ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= (x as u32 as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = h.rotate_left(31);
    h ^= (z as u32 as u64).wrapping_mul(0x94D0_49BB_1331_11EB);
    // splitmix64 finalizer
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 31;
    (h >> 40) as f32 / (1u64 << 24) as f32
}
