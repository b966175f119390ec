use std::collections::HashMap;

use strata_blocks::MaterialId;
use strata_world::{CLIMATE_MAX, Climate};

use crate::mesh_build::MeshBuild;

const UNTINTED: [u8; 4] = [255, 255, 255, 255];

// Sink for writing into per-material mesh buffers.
pub trait BuildSink {
    fn get_build_mut(&mut self, mid: MaterialId) -> &mut MeshBuild;
}

impl BuildSink for HashMap<MaterialId, MeshBuild> {
    #[inline]
    fn get_build_mut(&mut self, mid: MaterialId) -> &mut MeshBuild {
        self.entry(mid).or_default()
    }
}

/// Vertex color for tinted faces: lush blue-green where cool and wet,
/// olive-yellow where hot and dry.
pub fn tint_color(climate: Climate) -> [u8; 4] {
    let t = f32::from(climate.temperature) / f32::from(CLIMATE_MAX);
    let h = f32::from(climate.humidity) / f32::from(CLIMATE_MAX);
    let dry_heat = t * (1.0 - h);
    let r = 72.0 + 120.0 * dry_heat;
    let g = 150.0 + 50.0 * h - 20.0 * dry_heat;
    let b = 48.0 + 40.0 * (1.0 - t) * h;
    [r as u8, g as u8, b as u8, 255]
}

#[inline]
pub(crate) fn face_color(tinted: bool, climate: Climate) -> [u8; 4] {
    if tinted { tint_color(climate) } else { UNTINTED }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_heat_is_yellower() {
        let desert = tint_color(Climate::new(15, 0));
        let forest = tint_color(Climate::new(4, 15));
        assert!(desert[0] > forest[0]);
        assert!(forest[1] > desert[1]);
        assert_eq!(face_color(false, Climate::new(15, 0)), UNTINTED);
    }
}
