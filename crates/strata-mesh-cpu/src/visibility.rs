use strata_blocks::BlockType;

/// Whether the face of `here` pressed against `neighbor` is drawn.
///
/// `None` is an absent, unloaded, or unknown neighbor. Transparency classes
/// are ordered `Opaque < Cutout < Transparent`; two different non-opaque
/// cubes each draw their shared face when the neighbor ranks at least as
/// high, so equal ranks draw both sides.
pub fn face_visible(here: &BlockType, neighbor: Option<&BlockType>) -> bool {
    let Some(nb) = neighbor else {
        return true;
    };
    if nb.is_air() || !nb.is_cube() {
        return true;
    }
    if nb.id == here.id {
        return false;
    }
    if nb.is_opaque() {
        return false;
    }
    if here.is_opaque() {
        return true;
    }
    nb.transparency.rank() >= here.transparency.rank()
}
