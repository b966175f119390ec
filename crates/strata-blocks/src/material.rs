use std::collections::HashMap;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MaterialId(pub u16);

#[derive(Clone, Debug)]
pub struct Material {
    pub id: MaterialId,
    pub key: String,
}

#[derive(Default, Clone, Debug)]
pub struct MaterialCatalog {
    pub materials: Vec<Material>,
    pub by_key: HashMap<String, MaterialId>,
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from every key referenced by the block definitions.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut keys: Vec<&str> = keys.into_iter().collect();
        // Ids follow sorted key order so they do not depend on definition order.
        keys.sort_unstable();
        keys.dedup();
        let mut catalog = MaterialCatalog::new();
        for key in keys {
            let id = MaterialId(catalog.materials.len() as u16);
            catalog.by_key.insert(key.to_string(), id);
            catalog.materials.push(Material {
                id,
                key: key.to_string(),
            });
        }
        catalog
    }

    pub fn get_id(&self, key: &str) -> Option<MaterialId> {
        self.by_key.get(key).copied()
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
