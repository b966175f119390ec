use serde::Deserialize;

use crate::{TintMode, Transparency};

/// Top-level `blocks.toml` document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockDef {
    pub name: String,
    #[serde(default)]
    pub render: Option<RenderConfig>,
    #[serde(default)]
    pub solid: Option<bool>,
    #[serde(default)]
    pub transparency: Option<Transparency>,
    #[serde(default)]
    pub materials: Option<MaterialsDef>,
    #[serde(default)]
    pub tint: Option<TintMode>,
    #[serde(default)]
    pub growth: Option<GrowthDef>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RenderConfig {
    // render = "cube" | "cross" | "none"
    Simple(String),
    // render = { model = "cactus" }
    Model { model: String },
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MaterialsDef {
    #[serde(default)]
    pub all: Option<String>,
    #[serde(default)]
    pub top: Option<String>,
    #[serde(default)]
    pub bottom: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
}

impl MaterialsDef {
    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        [&self.all, &self.top, &self.bottom, &self.side]
            .into_iter()
            .filter_map(|k| k.as_deref())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct GrowthDef {
    pub into: String,
    pub ticks: u32,
}
