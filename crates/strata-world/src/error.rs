use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("region origin ({origin_x}, {origin_z}) is not aligned to the coarse grid")]
    Misaligned { origin_x: i32, origin_z: i32 },
    #[error("region {size}x{height} is not a multiple of the coarse grid")]
    InvalidDimensions { size: usize, height: usize },
    #[error("worldgen references block `{0}` which the registry does not define")]
    MissingBlock(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
