use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read block config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse block config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("the first block must be `air`, found `{0}`")]
    MissingAir(String),
    #[error("block `{0}` is defined more than once")]
    DuplicateName(String),
    #[error("block `{block}` has unknown render strategy `{render}`")]
    UnknownRender { block: String, render: String },
    #[error("block `{0}` renders geometry but declares no materials")]
    MissingMaterials(String),
    #[error("block `{block}` grows into undefined block `{target}`")]
    UnknownGrowthTarget { block: String, target: String },
    #[error("too many block types ({0}); ids are 16-bit")]
    TooManyBlocks(usize),
}
