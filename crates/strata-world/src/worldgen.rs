use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::ConfigError;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub climate: ClimateCfg,
    #[serde(default)]
    pub shoreline: Shoreline,
    #[serde(default)]
    pub mountains: Mountains,
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub rivers: Rivers,
    #[serde(default)]
    pub turbulence: Turbulence,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub decoration: Decoration,
}

impl WorldGenConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Fractal {
    #[serde(default = "d_oct")]
    pub octaves: i32,
    #[serde(default = "d_pers")]
    pub persistence: f32,
    #[serde(default = "d_lac")]
    pub lacunarity: f32,
    #[serde(default = "d_scale")]
    pub scale: f32,
}
fn d_oct() -> i32 {
    4
}
fn d_pers() -> f32 {
    0.5
}
fn d_lac() -> f32 {
    2.0
}
fn d_scale() -> f32 {
    256.0
}
impl Default for Fractal {
    fn default() -> Self {
        Self {
            octaves: d_oct(),
            persistence: d_pers(),
            lacunarity: d_lac(),
            scale: d_scale(),
        }
    }
}
impl Fractal {
    fn new(octaves: i32, scale: f32) -> Self {
        Self {
            octaves,
            scale,
            ..Self::default()
        }
    }
}

// --- Climate ---

#[derive(Clone, Debug, Deserialize)]
pub struct ClimateCfg {
    #[serde(default = "default_temperature")]
    pub temperature: ClimateField,
    #[serde(default = "default_humidity")]
    pub humidity: ClimateField,
    /// Manual offset added to climate sample positions, in blocks.
    #[serde(default)]
    pub offset: [f32; 2],
    /// Half-width of the seed-derived random offsets applied to every field.
    #[serde(default = "default_random_offset_range")]
    pub random_offset_range: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClimateField {
    #[serde(default = "default_climate_bias")]
    pub bias: f32,
    #[serde(default = "default_climate_contrast")]
    pub contrast: f32,
    #[serde(default)]
    pub noise: Fractal,
}
fn default_climate_bias() -> f32 {
    -0.15
}
fn default_climate_contrast() -> f32 {
    1.3
}
fn default_temperature() -> ClimateField {
    ClimateField {
        bias: default_climate_bias(),
        contrast: default_climate_contrast(),
        noise: Fractal::new(3, 512.0),
    }
}
fn default_humidity() -> ClimateField {
    ClimateField {
        bias: default_climate_bias(),
        contrast: default_climate_contrast(),
        noise: Fractal::new(3, 384.0),
    }
}
fn default_random_offset_range() -> f32 {
    10_000.0
}
impl Default for ClimateCfg {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            humidity: default_humidity(),
            offset: [0.0, 0.0],
            random_offset_range: default_random_offset_range(),
        }
    }
}

// --- Shape ---

#[derive(Clone, Debug, Deserialize)]
pub struct Shoreline {
    #[serde(default = "default_shore_noise")]
    pub noise: Fractal,
    #[serde(default = "default_shore_warp")]
    pub warp: Fractal,
    #[serde(default = "default_warp_strength")]
    pub warp_strength: f32,
    /// Noise level of the coastline; higher values mean more ocean.
    #[serde(default = "default_land_bias")]
    pub land_bias: f32,
    /// Blocks per unit of noise when converting to a signed distance.
    #[serde(default = "default_distance_scale")]
    pub distance_scale: f32,
}
fn default_shore_noise() -> Fractal {
    Fractal::new(4, 420.0)
}
fn default_shore_warp() -> Fractal {
    Fractal::new(2, 160.0)
}
fn default_warp_strength() -> f32 {
    48.0
}
fn default_land_bias() -> f32 {
    -0.05
}
fn default_distance_scale() -> f32 {
    160.0
}
impl Default for Shoreline {
    fn default() -> Self {
        Self {
            noise: default_shore_noise(),
            warp: default_shore_warp(),
            warp_strength: default_warp_strength(),
            land_bias: default_land_bias(),
            distance_scale: default_distance_scale(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Mountains {
    #[serde(default = "default_mountain_noise")]
    pub noise: Fractal,
    #[serde(default = "default_mountain_threshold")]
    pub threshold: f32,
    #[serde(default = "default_mountain_softness")]
    pub softness: f32,
    #[serde(default = "default_mountain_lift")]
    pub lift: f32,
}
fn default_mountain_noise() -> Fractal {
    Fractal::new(3, 520.0)
}
fn default_mountain_threshold() -> f32 {
    0.62
}
fn default_mountain_softness() -> f32 {
    0.12
}
fn default_mountain_lift() -> f32 {
    72.0
}
impl Default for Mountains {
    fn default() -> Self {
        Self {
            noise: default_mountain_noise(),
            threshold: default_mountain_threshold(),
            softness: default_mountain_softness(),
            lift: default_mountain_lift(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Height {
    #[serde(default = "default_sea_level")]
    pub sea_level: i32,
    #[serde(default = "default_land_rise")]
    pub land_rise: f32,
    #[serde(default = "default_ocean_depth")]
    pub ocean_depth: f32,
    /// Shore distance over which land and ocean profiles blend.
    #[serde(default = "default_shore_blend")]
    pub shore_blend: f32,
    #[serde(default = "default_elevation_noise")]
    pub elevation: Fractal,
    #[serde(default = "default_elevation_amplitude")]
    pub elevation_amplitude: f32,
    #[serde(default = "default_hills_noise")]
    pub hills: Fractal,
    #[serde(default = "default_hills_amplitude")]
    pub hills_amplitude: f32,
}
fn default_sea_level() -> i32 {
    64
}
fn default_land_rise() -> f32 {
    10.0
}
fn default_ocean_depth() -> f32 {
    22.0
}
fn default_shore_blend() -> f32 {
    48.0
}
fn default_elevation_noise() -> Fractal {
    Fractal::new(4, 220.0)
}
fn default_elevation_amplitude() -> f32 {
    12.0
}
fn default_hills_noise() -> Fractal {
    Fractal::new(2, 56.0)
}
fn default_hills_amplitude() -> f32 {
    4.0
}
impl Default for Height {
    fn default() -> Self {
        Self {
            sea_level: default_sea_level(),
            land_rise: default_land_rise(),
            ocean_depth: default_ocean_depth(),
            shore_blend: default_shore_blend(),
            elevation: default_elevation_noise(),
            elevation_amplitude: default_elevation_amplitude(),
            hills: default_hills_noise(),
            hills_amplitude: default_hills_amplitude(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Rivers {
    #[serde(default = "default_rivers_enable")]
    pub enable: bool,
    #[serde(default = "default_river_noise")]
    pub noise: Fractal,
    /// Fraction of the ridge range carved into river beds.
    #[serde(default = "default_river_width")]
    pub width: f32,
    /// River bed depth below sea level.
    #[serde(default = "default_river_depth")]
    pub depth: f32,
}
fn default_rivers_enable() -> bool {
    true
}
fn default_river_noise() -> Fractal {
    Fractal::new(2, 380.0)
}
fn default_river_width() -> f32 {
    0.04
}
fn default_river_depth() -> f32 {
    3.0
}
impl Default for Rivers {
    fn default() -> Self {
        Self {
            enable: default_rivers_enable(),
            noise: default_river_noise(),
            width: default_river_width(),
            depth: default_river_depth(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Turbulence {
    #[serde(default = "default_turbulence_noise")]
    pub noise: Fractal,
    #[serde(default = "default_turbulence_base")]
    pub base: f32,
    #[serde(default = "default_mountain_strength")]
    pub mountain_strength: f32,
    /// Blocks above the local height over which turbulence fades out.
    #[serde(default = "default_attenuation")]
    pub attenuation: f32,
}
fn default_turbulence_noise() -> Fractal {
    Fractal::new(3, 36.0)
}
fn default_turbulence_base() -> f32 {
    5.0
}
fn default_mountain_strength() -> f32 {
    26.0
}
fn default_attenuation() -> f32 {
    20.0
}
impl Default for Turbulence {
    fn default() -> Self {
        Self {
            noise: default_turbulence_noise(),
            base: default_turbulence_base(),
            mountain_strength: default_mountain_strength(),
            attenuation: default_attenuation(),
        }
    }
}

// --- Classification ---

#[derive(Clone, Debug, Deserialize)]
pub struct Surface {
    #[serde(default = "default_topsoil")]
    pub topsoil_depth: i32,
    #[serde(default = "default_bedrock_depth")]
    pub bedrock_depth: i32,
    #[serde(default = "default_beach_width")]
    pub beach_width: f32,
    #[serde(default = "default_beach_height")]
    pub beach_height: i32,
    #[serde(default = "default_snow_line")]
    pub snow_line: i32,
    #[serde(default = "default_desert_temperature")]
    pub desert_min_temperature: u8,
    #[serde(default = "default_desert_humidity")]
    pub desert_max_humidity: u8,
    #[serde(default = "default_desert_mountain")]
    pub desert_max_mountain: f32,
    #[serde(default)]
    pub blocks: SurfaceBlocks,
}
fn default_topsoil() -> i32 {
    3
}
fn default_bedrock_depth() -> i32 {
    1
}
fn default_beach_width() -> f32 {
    6.0
}
fn default_beach_height() -> i32 {
    2
}
fn default_snow_line() -> i32 {
    150
}
fn default_desert_temperature() -> u8 {
    10
}
fn default_desert_humidity() -> u8 {
    5
}
fn default_desert_mountain() -> f32 {
    0.35
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            topsoil_depth: default_topsoil(),
            bedrock_depth: default_bedrock_depth(),
            beach_width: default_beach_width(),
            beach_height: default_beach_height(),
            snow_line: default_snow_line(),
            desert_min_temperature: default_desert_temperature(),
            desert_max_humidity: default_desert_humidity(),
            desert_max_mountain: default_desert_mountain(),
            blocks: SurfaceBlocks::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SurfaceBlocks {
    pub air: String,
    pub stone: String,
    pub grass: String,
    pub dirt: String,
    pub sand: String,
    pub sandstone: String,
    pub snow: String,
    pub bedrock: String,
    pub water: String,
}
impl Default for SurfaceBlocks {
    fn default() -> Self {
        Self {
            air: "air".into(),
            stone: "stone".into(),
            grass: "grass".into(),
            dirt: "dirt".into(),
            sand: "sand".into(),
            sandstone: "sandstone".into(),
            snow: "snow".into(),
            bedrock: "bedrock".into(),
            water: "water".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Decoration {
    #[serde(default = "default_foliage_chance")]
    pub foliage_chance: f32,
    #[serde(default = "default_sapling_chance")]
    pub sapling_chance: f32,
    #[serde(default = "default_cactus_chance")]
    pub cactus_chance: f32,
    #[serde(default = "default_foliage")]
    pub foliage: String,
    #[serde(default = "default_sapling")]
    pub sapling: String,
    #[serde(default = "default_cactus")]
    pub cactus: String,
}
fn default_foliage_chance() -> f32 {
    0.12
}
fn default_sapling_chance() -> f32 {
    0.01
}
fn default_cactus_chance() -> f32 {
    0.006
}
fn default_foliage() -> String {
    "tall_grass".into()
}
fn default_sapling() -> String {
    "sapling".into()
}
fn default_cactus() -> String {
    "cactus".into()
}
impl Default for Decoration {
    fn default() -> Self {
        Self {
            foliage_chance: default_foliage_chance(),
            sapling_chance: default_sapling_chance(),
            cactus_chance: default_cactus_chance(),
            foliage: default_foliage(),
            sapling: default_sapling(),
            cactus: default_cactus(),
        }
    }
}

// Flattened params used in tight loops (snapshot of config)
#[derive(Clone, Debug)]
pub struct WorldGenParams {
    pub temperature: ClimateField,
    pub humidity: ClimateField,
    pub climate_offset: [f32; 2],
    pub random_offset_range: f32,
    pub shore_noise: Fractal,
    pub shore_warp: Fractal,
    pub shore_warp_strength: f32,
    pub land_bias: f32,
    pub shore_distance_scale: f32,
    pub mountain_noise: Fractal,
    pub mountain_threshold: f32,
    pub mountain_softness: f32,
    pub mountain_lift: f32,
    pub sea_level: i32,
    pub land_rise: f32,
    pub ocean_depth: f32,
    pub shore_blend: f32,
    pub elevation: Fractal,
    pub elevation_amplitude: f32,
    pub hills: Fractal,
    pub hills_amplitude: f32,
    pub rivers_enable: bool,
    pub river_noise: Fractal,
    pub river_width: f32,
    pub river_depth: f32,
    pub turbulence: Fractal,
    pub turbulence_base: f32,
    pub turbulence_mountain: f32,
    pub turbulence_attenuation: f32,
    pub topsoil_depth: i32,
    pub bedrock_depth: i32,
    pub beach_width: f32,
    pub beach_height: i32,
    pub snow_line: i32,
    pub desert_min_temperature: u8,
    pub desert_max_humidity: u8,
    pub desert_max_mountain: f32,
    pub blocks: SurfaceBlocks,
    pub foliage_chance: f32,
    pub sapling_chance: f32,
    pub cactus_chance: f32,
    pub foliage: String,
    pub sapling: String,
    pub cactus: String,
}

impl Default for WorldGenParams {
    fn default() -> Self {
        Self::from_config(&WorldGenConfig::default())
    }
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig) -> Self {
        Self {
            temperature: cfg.climate.temperature.clone(),
            humidity: cfg.climate.humidity.clone(),
            climate_offset: cfg.climate.offset,
            random_offset_range: cfg.climate.random_offset_range.max(0.0),
            shore_noise: cfg.shoreline.noise.clone(),
            shore_warp: cfg.shoreline.warp.clone(),
            shore_warp_strength: cfg.shoreline.warp_strength,
            land_bias: cfg.shoreline.land_bias,
            shore_distance_scale: cfg.shoreline.distance_scale,
            mountain_noise: cfg.mountains.noise.clone(),
            mountain_threshold: cfg.mountains.threshold,
            mountain_softness: cfg.mountains.softness.max(1e-4),
            mountain_lift: cfg.mountains.lift,
            sea_level: cfg.height.sea_level,
            land_rise: cfg.height.land_rise,
            ocean_depth: cfg.height.ocean_depth,
            shore_blend: cfg.height.shore_blend.max(1.0),
            elevation: cfg.height.elevation.clone(),
            elevation_amplitude: cfg.height.elevation_amplitude,
            hills: cfg.height.hills.clone(),
            hills_amplitude: cfg.height.hills_amplitude,
            rivers_enable: cfg.rivers.enable,
            river_noise: cfg.rivers.noise.clone(),
            river_width: cfg.rivers.width.clamp(0.0, 1.0),
            river_depth: cfg.rivers.depth,
            turbulence: cfg.turbulence.noise.clone(),
            turbulence_base: cfg.turbulence.base,
            turbulence_mountain: cfg.turbulence.mountain_strength,
            turbulence_attenuation: cfg.turbulence.attenuation.max(1.0),
            topsoil_depth: cfg.surface.topsoil_depth.max(0),
            bedrock_depth: cfg.surface.bedrock_depth.max(0),
            beach_width: cfg.surface.beach_width,
            beach_height: cfg.surface.beach_height,
            snow_line: cfg.surface.snow_line,
            desert_min_temperature: cfg.surface.desert_min_temperature,
            desert_max_humidity: cfg.surface.desert_max_humidity,
            desert_max_mountain: cfg.surface.desert_max_mountain,
            blocks: cfg.surface.blocks.clone(),
            foliage_chance: cfg.decoration.foliage_chance.clamp(0.0, 1.0),
            sapling_chance: cfg.decoration.sapling_chance.clamp(0.0, 1.0),
            cactus_chance: cfg.decoration.cactus_chance.clamp(0.0, 1.0),
            foliage: cfg.decoration.foliage.clone(),
            sapling: cfg.decoration.sapling.clone(),
            cactus: cfg.decoration.cactus.clone(),
        }
    }
}

pub fn load_params_from_path(path: &Path) -> Result<WorldGenParams, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg = WorldGenConfig::from_toml_str(&s)?;
    Ok(WorldGenParams::from_config(&cfg))
}
