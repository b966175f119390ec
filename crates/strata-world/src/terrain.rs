use std::sync::Arc;
use std::time::Instant;

use fastnoise_lite::FastNoiseLite;
use strata_blocks::{BlockId, BlockRegistry};
use strata_grid::{Grid2, Grid3};

use crate::climate::Climate;
use crate::gen_ctx::{GenCtx, TerrainMetrics, TerrainStage};
use crate::noise::{fractal2, fractal3, hash01, lerp, ridge, smoothstep, unit};
use crate::worldgen::{ClimateField, WorldGenParams};
use crate::{GenError, World};

/// Horizontal spacing of the coarse density lattice, in blocks.
pub const COARSE_XZ: usize = 4;
/// Vertical spacing of the coarse density lattice, in blocks.
pub const COARSE_Y: usize = 8;

const SALT_FOLIAGE: u64 = 0xF011_A6E0;
const SALT_CACTUS: u64 = 0xCAC7_0005;

/// Everything one region generation produces.
#[derive(Clone, Debug)]
pub struct TerrainOutput {
    pub origin_x: i32,
    pub origin_z: i32,
    pub climate: Grid2<Climate>,
    pub blocks: Grid3<BlockId>,
    /// Sorted linear indices (see [`Grid3::idx`]) of surface cells.
    pub surface: Vec<u32>,
    /// One above the topmost block that is neither air nor water, per
    /// column; 0 for an empty column. Decorations count.
    pub heights: Grid2<i32>,
    pub metrics: TerrainMetrics,
}

struct Palette {
    air: BlockId,
    stone: BlockId,
    grass: BlockId,
    dirt: BlockId,
    sand: BlockId,
    sandstone: BlockId,
    snow: BlockId,
    bedrock: BlockId,
    water: BlockId,
    foliage: Option<BlockId>,
    sapling: Option<BlockId>,
    cactus: Option<BlockId>,
}

impl Palette {
    fn resolve(reg: &BlockRegistry, params: &WorldGenParams) -> Result<Self, GenError> {
        let need = |name: &str| {
            reg.id_by_name(name)
                .ok_or_else(|| GenError::MissingBlock(name.to_string()))
        };
        let b = &params.blocks;
        Ok(Self {
            air: need(&b.air)?,
            stone: need(&b.stone)?,
            grass: need(&b.grass)?,
            dirt: need(&b.dirt)?,
            sand: need(&b.sand)?,
            sandstone: need(&b.sandstone)?,
            snow: need(&b.snow)?,
            bedrock: need(&b.bedrock)?,
            water: need(&b.water)?,
            foliage: reg.id_by_name(&params.foliage),
            sapling: reg.id_by_name(&params.sapling),
            cactus: reg.id_by_name(&params.cactus),
        })
    }
}

/// Shape fields sampled on the coarse lattice.
#[derive(Clone, Copy, Debug, Default)]
struct ShapeSample {
    shore: f32,
    mountain: f32,
    height: f32,
}

/// Per-column values interpolated from the coarse lattice.
#[derive(Clone, Copy, Debug)]
struct ColumnInfo {
    height: f32,
    shore: f32,
    mountain: f32,
    climate: Climate,
}

impl World {
    /// Generates `size x height x size` blocks whose minimum corner sits at
    /// world column `(origin_x, origin_z)`. All noise is sampled at world
    /// coordinates and the coarse lattice is anchored to the world, so
    /// adjacent regions agree cell for cell.
    pub fn generate_terrain(
        &self,
        reg: &BlockRegistry,
        ctx: &mut GenCtx,
        origin_x: i32,
        origin_z: i32,
        size: usize,
        height: usize,
    ) -> Result<TerrainOutput, GenError> {
        if size == 0 || size % COARSE_XZ != 0 || height == 0 || height % COARSE_Y != 0 {
            return Err(GenError::InvalidDimensions { size, height });
        }
        let step = COARSE_XZ as i32;
        if origin_x.rem_euclid(step) != 0 || origin_z.rem_euclid(step) != 0 {
            return Err(GenError::Misaligned { origin_x, origin_z });
        }
        let params = Arc::clone(&ctx.params);
        let params = params.as_ref();
        let palette = Palette::resolve(reg, params)?;
        ctx.metrics.reset();

        // 1. climate per column
        let t0 = Instant::now();
        let climate = Grid2::from_fn(size, size, |x, z| {
            sample_climate(ctx, params, origin_x + x as i32, origin_z + z as i32)
        });
        ctx.metrics.record(TerrainStage::Climate, t0.elapsed());

        // 2. shape fields on lattice corners
        let t0 = Instant::now();
        let cn = size / COARSE_XZ + 1;
        let cy = height / COARSE_Y + 1;
        let mut shape = Grid2::from_fn(cn, cn, |i, k| {
            let wx = origin_x + (i * COARSE_XZ) as i32;
            let wz = origin_z + (k * COARSE_XZ) as i32;
            let shore = shore_distance(ctx, params, wx as f32, wz as f32);
            let mountain = mountain_factor(ctx, params, wx as f32, wz as f32, shore);
            ShapeSample {
                shore,
                mountain,
                height: 0.0,
            }
        });
        ctx.metrics.record(TerrainStage::Shape, t0.elapsed());

        // 3. height field on lattice corners
        let t0 = Instant::now();
        let max_h = (height as f32 - 2.0).max(1.0);
        for k in 0..cn {
            for i in 0..cn {
                let wx = (origin_x + (i * COARSE_XZ) as i32) as f32;
                let wz = (origin_z + (k * COARSE_XZ) as i32) as f32;
                let s = *shape.get(i, k);
                let h = column_height(ctx, params, wx, wz, s.shore, s.mountain);
                shape.get_mut(i, k).height = h.clamp(1.0, max_h);
            }
        }
        ctx.metrics.record(TerrainStage::Height, t0.elapsed());

        // 4. coarse density lattice
        let t0 = Instant::now();
        let mut density = Grid3::new(cn, cy, cn, 0.0f32);
        for k in 0..cn {
            for i in 0..cn {
                let s = *shape.get(i, k);
                let wx = (origin_x + (i * COARSE_XZ) as i32) as f32;
                let wz = (origin_z + (k * COARSE_XZ) as i32) as f32;
                let strength = params.turbulence_base + s.mountain * params.turbulence_mountain;
                for j in 0..cy {
                    let y = (j * COARSE_Y) as f32;
                    let (ox, oz) = ctx.offsets.turbulence;
                    let mut t = fractal3(&ctx.turbulence, wx + ox, y, wz + oz, &params.turbulence)
                        * strength;
                    if y <= s.height {
                        // below the surface turbulence may only add material
                        t = t.max(0.0);
                    } else {
                        t *= (1.0 - (y - s.height) / params.turbulence_attenuation).max(0.0);
                    }
                    density.set(i, j, k, s.height - y + t);
                }
            }
        }
        ctx.metrics.coarse_samples = (cn * cn * cy) as u32;
        ctx.metrics.record(TerrainStage::Density, t0.elapsed());

        // 5. fine population and classification
        let t0 = Instant::now();
        let mut blocks = Grid3::new(size, height, size, palette.air);
        let mut heights = Grid2::new(size, size, 0i32);
        let mut solid = vec![false; height];
        for z in 0..size {
            for x in 0..size {
                let col = column_info(&shape, &climate, x, z);
                for (y, cell) in solid.iter_mut().enumerate() {
                    let mut d = trilinear(&density, x, y, z);
                    let fy = y as f32;
                    if fy < col.height {
                        d = d.max(col.height - fy);
                    }
                    *cell = d > 0.0;
                }
                populate_column(
                    &mut blocks,
                    &palette,
                    params,
                    &solid,
                    &col,
                    x,
                    z,
                    self.seed,
                    origin_x + x as i32,
                    origin_z + z as i32,
                );
                // everything at or above the height is air or water
                let top = blocks
                    .column(x, z)
                    .iter()
                    .rposition(|&id| id != palette.air && id != palette.water);
                heights.set(x, z, top.map_or(0, |t| t as i32 + 1));
            }
        }
        ctx.metrics.columns = (size * size) as u32;
        ctx.metrics.record(TerrainStage::Populate, t0.elapsed());

        // 6. surface marking
        let t0 = Instant::now();
        let occludes: Vec<bool> = reg.blocks.iter().map(|b| b.occludes()).collect();
        let surface = mark_surface(&blocks, palette.air, &occludes);
        ctx.metrics.record(TerrainStage::Surface, t0.elapsed());

        log::debug!(
            target: "worldgen",
            "generated region ({origin_x}, {origin_z}) {size}x{height}x{size} in {}us ({} surface cells)",
            ctx.metrics.total_us(),
            surface.len()
        );

        Ok(TerrainOutput {
            origin_x,
            origin_z,
            climate,
            blocks,
            surface,
            heights,
            metrics: ctx.metrics,
        })
    }

    /// Climate at a single world column.
    pub fn climate_at(&self, ctx: &GenCtx, wx: i32, wz: i32) -> Climate {
        sample_climate(ctx, &ctx.params, wx, wz)
    }
}

fn sample_climate(ctx: &GenCtx, params: &WorldGenParams, wx: i32, wz: i32) -> Climate {
    let [mx, mz] = params.climate_offset;
    let sample = |noise: &FastNoiseLite, field: &ClimateField, (ox, oz): (f32, f32)| {
        let n = fractal2(noise, wx as f32 + ox + mx, wz as f32 + oz + mz, &field.noise);
        Climate::quantize(field.bias + field.contrast * unit(n))
    };
    Climate {
        temperature: sample(&ctx.temperature, &params.temperature, ctx.offsets.temperature),
        humidity: sample(&ctx.humidity, &params.humidity, ctx.offsets.humidity),
    }
}

/// Signed distance to the coastline in blocks; positive on land.
fn shore_distance(ctx: &GenCtx, params: &WorldGenParams, wx: f32, wz: f32) -> f32 {
    let (ax, az) = ctx.offsets.warp_x;
    let (bx, bz) = ctx.offsets.warp_z;
    let dx = fractal2(&ctx.warp, wx + ax, wz + az, &params.shore_warp);
    let dz = fractal2(&ctx.warp, wx + bx, wz + bz, &params.shore_warp);
    let px = wx + dx * params.shore_warp_strength;
    let pz = wz + dz * params.shore_warp_strength;
    let (ox, oz) = ctx.offsets.shore;
    let n = fractal2(&ctx.shore, px + ox, pz + oz, &params.shore_noise);
    (n - params.land_bias) * params.shore_distance_scale
}

fn mountain_factor(ctx: &GenCtx, params: &WorldGenParams, wx: f32, wz: f32, shore: f32) -> f32 {
    let (ox, oz) = ctx.offsets.mountains;
    let r = ridge(fractal2(&ctx.mountains, wx + ox, wz + oz, &params.mountain_noise));
    let squished = smoothstep(
        params.mountain_threshold - params.mountain_softness,
        params.mountain_threshold + params.mountain_softness,
        r,
    );
    squished * smoothstep(0.0, params.shore_blend, shore)
}

fn column_height(
    ctx: &GenCtx,
    params: &WorldGenParams,
    wx: f32,
    wz: f32,
    shore: f32,
    mountain: f32,
) -> f32 {
    let sea = params.sea_level as f32;
    let base = if shore >= 0.0 {
        sea + 1.0 + params.land_rise * smoothstep(0.0, params.shore_blend, shore)
    } else {
        sea - params.ocean_depth * smoothstep(0.0, params.shore_blend, -shore)
    };
    let land = smoothstep(-0.5 * params.shore_blend, 0.5 * params.shore_blend, shore);

    let (ex, ez) = ctx.offsets.elevation;
    let elevation = fractal2(&ctx.elevation, wx + ex, wz + ez, &params.elevation)
        * params.elevation_amplitude
        * (0.35 + 0.65 * land);
    let (hx, hz) = ctx.offsets.hills;
    let hills = fractal2(&ctx.hills, wx + hx, wz + hz, &params.hills) * params.hills_amplitude * land;

    let mut h = base + elevation + hills + mountain * params.mountain_lift;

    if params.rivers_enable && params.river_width > 0.0 {
        let (rx, rz) = ctx.offsets.rivers;
        let r = ridge(fractal2(&ctx.rivers, wx + rx, wz + rz, &params.river_noise));
        let edge = 1.0 - params.river_width;
        let bed = sea - params.river_depth;
        if r > edge && h > bed {
            let t = smoothstep(0.0, 1.0, (r - edge) / params.river_width);
            h = lerp(h, bed, t);
        }
    }
    h
}

fn column_info(shape: &Grid2<ShapeSample>, climate: &Grid2<Climate>, x: usize, z: usize) -> ColumnInfo {
    let i = x / COARSE_XZ;
    let k = z / COARSE_XZ;
    let fx = (x % COARSE_XZ) as f32 / COARSE_XZ as f32;
    let fz = (z % COARSE_XZ) as f32 / COARSE_XZ as f32;
    let s00 = shape.get(i, k);
    let s10 = shape.get(i + 1, k);
    let s01 = shape.get(i, k + 1);
    let s11 = shape.get(i + 1, k + 1);
    let bilerp = |f: fn(&ShapeSample) -> f32| {
        lerp(lerp(f(s00), f(s10), fx), lerp(f(s01), f(s11), fx), fz)
    };
    ColumnInfo {
        height: bilerp(|s| s.height),
        shore: bilerp(|s| s.shore),
        mountain: bilerp(|s| s.mountain),
        climate: *climate.get(x, z),
    }
}

fn trilinear(density: &Grid3<f32>, x: usize, y: usize, z: usize) -> f32 {
    let i = x / COARSE_XZ;
    let j = y / COARSE_Y;
    let k = z / COARSE_XZ;
    let fx = (x % COARSE_XZ) as f32 / COARSE_XZ as f32;
    let fy = (y % COARSE_Y) as f32 / COARSE_Y as f32;
    let fz = (z % COARSE_XZ) as f32 / COARSE_XZ as f32;
    let c = |di: usize, dj: usize, dk: usize| *density.get(i + di, j + dj, k + dk);
    let x00 = lerp(c(0, 0, 0), c(1, 0, 0), fx);
    let x10 = lerp(c(0, 1, 0), c(1, 1, 0), fx);
    let x01 = lerp(c(0, 0, 1), c(1, 0, 1), fx);
    let x11 = lerp(c(0, 1, 1), c(1, 1, 1), fx);
    lerp(lerp(x00, x10, fy), lerp(x01, x11, fy), fz)
}

#[allow(clippy::too_many_arguments)]
fn populate_column(
    blocks: &mut Grid3<BlockId>,
    palette: &Palette,
    params: &WorldGenParams,
    solid: &[bool],
    col: &ColumnInfo,
    x: usize,
    z: usize,
    seed: i32,
    wx: i32,
    wz: i32,
) {
    let height = solid.len();
    let sea = params.sea_level;
    let desert = col.climate.temperature >= params.desert_min_temperature
        && col.climate.humidity <= params.desert_max_humidity
        && col.mountain <= params.desert_max_mountain
        && col.shore > params.beach_width;
    let near_shore = col.shore.abs() <= params.beach_width;

    // Solid cells stacked directly above the current one.
    let mut run: i32 = 0;
    let mut top_solid: Option<usize> = None;
    for y in (0..height).rev() {
        let yi = y as i32;
        let id = if yi < params.bedrock_depth {
            palette.bedrock
        } else if solid[y] {
            let above_water = y + 1 < height && !solid[y + 1] && (yi + 1) < sea;
            if run == 0 {
                if above_water {
                    if near_shore || desert { palette.sand } else { palette.dirt }
                } else if yi >= params.snow_line {
                    palette.snow
                } else if desert || (near_shore && yi <= sea + params.beach_height) {
                    palette.sand
                } else {
                    palette.grass
                }
            } else if run <= params.topsoil_depth {
                if desert {
                    palette.sandstone
                } else if near_shore && yi <= sea + params.beach_height {
                    palette.sand
                } else {
                    palette.dirt
                }
            } else {
                palette.stone
            }
        } else if yi < sea {
            palette.water
        } else {
            palette.air
        };
        if solid[y] || yi < params.bedrock_depth {
            run += 1;
            if top_solid.is_none() {
                top_solid = Some(y);
            }
        } else {
            run = 0;
        }
        blocks.set(x, y, z, id);
    }

    let Some(top) = top_solid else { return };
    if top + 1 >= height || *blocks.get(x, top + 1, z) != palette.air {
        return;
    }
    let top_id = *blocks.get(x, top, z);
    if top_id == palette.grass {
        let r = hash01(seed, wx, wz, SALT_FOLIAGE);
        let deco = if r < params.sapling_chance {
            palette.sapling
        } else if r < params.sapling_chance + params.foliage_chance {
            palette.foliage
        } else {
            None
        };
        if let Some(id) = deco {
            blocks.set(x, top + 1, z, id);
        }
    } else if top_id == palette.sand && desert && top as i32 >= sea {
        if let Some(cactus) = palette.cactus {
            if hash01(seed, wx, wz, SALT_CACTUS) < params.cactus_chance {
                blocks.set(x, top + 1, z, cactus);
            }
        }
    }
}

/// Non-air cells that can be seen: not an opaque cube themselves, or touching
/// air, a non-occluding block, or the region boundary.
fn mark_surface(blocks: &Grid3<BlockId>, air: BlockId, occludes: &[bool]) -> Vec<u32> {
    let (sx, sy, sz) = blocks.dims();
    let occ = |id: BlockId| occludes.get(id as usize).copied().unwrap_or(false);
    let mut out = Vec::new();
    // Linear index order, so the output is sorted.
    for z in 0..sz {
        for x in 0..sx {
            for y in 0..sy {
                let id = *blocks.get(x, y, z);
                if id == air {
                    continue;
                }
                let exposed = !occ(id)
                    || [
                        (-1, 0, 0),
                        (1, 0, 0),
                        (0, -1, 0),
                        (0, 1, 0),
                        (0, 0, -1),
                        (0, 0, 1),
                    ]
                    .iter()
                    .any(|&(dx, dy, dz)| {
                        match blocks.get_checked(x as i32 + dx, y as i32 + dy, z as i32 + dz) {
                            Some(&nb) => !occ(nb),
                            None => true,
                        }
                    });
                if exposed {
                    out.push(blocks.idx(x, y, z) as u32);
                }
            }
        }
    }
    out
}
