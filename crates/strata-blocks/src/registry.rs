use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::{BlockDef, BlocksConfig, MaterialsDef, RenderConfig};
use crate::material::{MaterialCatalog, MaterialId};
use crate::{AIR, BlockId, FaceRole, RegistryError, RenderStrategy, TintMode, Transparency};

const BUILTIN_BLOCKS: &str = include_str!("../../../assets/voxels/blocks.toml");

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FaceMaterials {
    pub top: MaterialId,
    pub bottom: MaterialId,
    pub side: MaterialId,
}

/// Per-tick replacement of one block by another.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Growth {
    pub into: BlockId,
    pub ticks: u32,
}

#[derive(Clone, Debug)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub render: RenderStrategy,
    pub transparency: Transparency,
    pub solid: bool,
    pub materials: Option<FaceMaterials>,
    pub tint: TintMode,
    pub growth: Option<Growth>,
}

impl BlockType {
    #[inline]
    pub fn is_air(&self) -> bool {
        self.id == AIR
    }

    #[inline]
    pub fn is_cube(&self) -> bool {
        matches!(self.render, RenderStrategy::Cube)
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.transparency == Transparency::Opaque
    }

    /// Opaque full cube: hides every face pressed against it.
    #[inline]
    pub fn occludes(&self) -> bool {
        self.is_cube() && self.is_opaque()
    }

    pub fn material_for(&self, role: FaceRole) -> Option<MaterialId> {
        let m = self.materials?;
        Some(match role {
            FaceRole::Top => m.top,
            FaceRole::Bottom => m.bottom,
            FaceRole::Side => m.side,
        })
    }

    pub fn is_tinted(&self, role: FaceRole) -> bool {
        match self.tint {
            TintMode::None => false,
            TintMode::Top => role == FaceRole::Top,
            TintMode::All => true,
        }
    }

    pub fn model_prototype(&self) -> Option<&str> {
        match &self.render {
            RenderStrategy::Model { prototype } => Some(prototype),
            _ => None,
        }
    }
}

/// Owned table of block types. Built once per session and shared by `Arc`.
#[derive(Clone, Debug, Default)]
pub struct BlockRegistry {
    pub materials: MaterialCatalog,
    pub blocks: Vec<BlockType>,
    pub by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// The registry shipped with the crate (`assets/voxels/blocks.toml`).
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_toml_str(BUILTIN_BLOCKS)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, RegistryError> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, RegistryError> {
        match cfg.blocks.first() {
            Some(def) if def.name == "air" => {}
            Some(def) => return Err(RegistryError::MissingAir(def.name.clone())),
            None => return Err(RegistryError::MissingAir(String::new())),
        }
        if cfg.blocks.len() > usize::from(BlockId::MAX) {
            return Err(RegistryError::TooManyBlocks(cfg.blocks.len()));
        }

        let mut by_name = HashMap::with_capacity(cfg.blocks.len());
        for (i, def) in cfg.blocks.iter().enumerate() {
            if by_name.insert(def.name.clone(), i as BlockId).is_some() {
                return Err(RegistryError::DuplicateName(def.name.clone()));
            }
        }

        let materials = MaterialCatalog::from_keys(
            cfg.blocks
                .iter()
                .filter_map(|d| d.materials.as_ref())
                .flat_map(MaterialsDef::keys),
        );

        let mut blocks = Vec::with_capacity(cfg.blocks.len());
        for (i, def) in cfg.blocks.iter().enumerate() {
            blocks.push(compile_block(i as BlockId, def, &materials, &by_name)?);
        }

        Ok(BlockRegistry {
            materials,
            blocks,
            by_name,
        })
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockType> {
        self.blocks.get(id as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&BlockType> {
        self.id_by_name(name).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// True when `id` names an opaque full cube.
    #[inline]
    pub fn occludes(&self, id: BlockId) -> bool {
        self.get(id).is_some_and(BlockType::occludes)
    }
}

fn compile_block(
    id: BlockId,
    def: &BlockDef,
    materials: &MaterialCatalog,
    by_name: &HashMap<String, BlockId>,
) -> Result<BlockType, RegistryError> {
    let render = match &def.render {
        None => {
            if id == AIR {
                RenderStrategy::None
            } else {
                RenderStrategy::Cube
            }
        }
        Some(RenderConfig::Simple(k)) => match k.as_str() {
            "none" => RenderStrategy::None,
            "cube" => RenderStrategy::Cube,
            "cross" => RenderStrategy::Cross,
            other => {
                return Err(RegistryError::UnknownRender {
                    block: def.name.clone(),
                    render: other.to_string(),
                });
            }
        },
        Some(RenderConfig::Model { model }) => RenderStrategy::Model {
            prototype: model.clone(),
        },
    };

    let face_materials = match render {
        RenderStrategy::Cube | RenderStrategy::Cross => {
            let resolved = def
                .materials
                .as_ref()
                .and_then(|m| resolve_materials(m, materials));
            match resolved {
                Some(fm) => Some(fm),
                None => return Err(RegistryError::MissingMaterials(def.name.clone())),
            }
        }
        RenderStrategy::None | RenderStrategy::Model { .. } => None,
    };

    let growth = match &def.growth {
        Some(g) => match by_name.get(&g.into) {
            Some(&into) => Some(Growth {
                into,
                ticks: g.ticks.max(1),
            }),
            None => {
                return Err(RegistryError::UnknownGrowthTarget {
                    block: def.name.clone(),
                    target: g.into.clone(),
                });
            }
        },
        None => None,
    };

    let is_air = id == AIR;
    Ok(BlockType {
        id,
        name: def.name.clone(),
        render,
        transparency: def.transparency.unwrap_or(if is_air {
            Transparency::Transparent
        } else {
            Transparency::Opaque
        }),
        solid: def.solid.unwrap_or(!is_air),
        materials: face_materials,
        tint: def.tint.unwrap_or_default(),
        growth,
    })
}

fn resolve_materials(def: &MaterialsDef, catalog: &MaterialCatalog) -> Option<FaceMaterials> {
    let lookup = |k: &Option<String>| k.as_deref().and_then(|k| catalog.get_id(k));
    let all = lookup(&def.all);
    let side = lookup(&def.side).or(all)?;
    Some(FaceMaterials {
        top: lookup(&def.top).or(all).unwrap_or(side),
        bottom: lookup(&def.bottom).or(all).unwrap_or(side),
        side,
    })
}
