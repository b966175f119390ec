use strata_geom::Vec3;

use crate::face::Face;

/// One material's vertex batch. Every quad is 4 vertices and 6 indices and
/// remembers the chunk cell that emitted it.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
    pub col: Vec<u8>,
    /// Owning cell (linear chunk index) per quad.
    pub owner: Vec<u32>,
}

impl MeshBuild {
    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        // 4 vertices per quad
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        self.uv.reserve(n_quads * 4 * 2);
        self.col.reserve(n_quads * 4 * 4);
        self.idx.reserve(n_quads * 6);
        self.owner.reserve(n_quads);
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.owner.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }

    /// Appends a quad with explicit per-vertex UVs, wound counter-clockwise
    /// around `n`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_quad_uv(
        &mut self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        d: Vec3,
        n: Vec3,
        mut uvs: [(f32, f32); 4],
        rgba: [u8; 4],
        owner: u32,
    ) {
        let base = self.vertex_count() as u32;
        let mut vs = [a, d, c, b];
        let cross = (vs[1] - vs[0]).cross(vs[2] - vs[0]);
        if cross.dot(n) < 0.0 {
            vs.swap(1, 3);
            uvs.swap(1, 3);
        }
        // Flip V axis so textures aren't upside-down (top-left origin vs bottom-left)
        for uv in &mut uvs {
            uv.1 = -uv.1;
        }
        for i in 0..4 {
            self.pos.extend_from_slice(&vs[i].to_array());
            self.norm.extend_from_slice(&n.to_array());
            self.uv.extend_from_slice(&[uvs[i].0, uvs[i].1]);
            self.col.extend_from_slice(&rgba);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        self.owner.push(owner);
    }

    /// Emits a face-aligned rectangle for the given face at `origin` with size `(u1,v1)`.
    pub fn add_face_rect(
        &mut self,
        face: Face,
        origin: Vec3,
        u1: f32,
        v1: f32,
        rgba: [u8; 4],
        owner: u32,
    ) {
        let n = face.normal();
        let o = origin;
        let (a, b, c, d) = match face {
            Face::PosY => (
                o,
                o + Vec3::new(u1, 0.0, 0.0),
                o + Vec3::new(u1, 0.0, v1),
                o + Vec3::new(0.0, 0.0, v1),
            ),
            Face::NegY => (
                o + Vec3::new(0.0, 0.0, v1),
                o + Vec3::new(u1, 0.0, v1),
                o + Vec3::new(u1, 0.0, 0.0),
                o,
            ),
            Face::PosX => (
                o + Vec3::new(0.0, v1, u1),
                o + Vec3::new(0.0, v1, 0.0),
                o,
                o + Vec3::new(0.0, 0.0, u1),
            ),
            Face::NegX => (
                o + Vec3::new(0.0, v1, 0.0),
                o + Vec3::new(0.0, v1, u1),
                o + Vec3::new(0.0, 0.0, u1),
                o,
            ),
            Face::PosZ => (
                o + Vec3::new(u1, v1, 0.0),
                o + Vec3::new(0.0, v1, 0.0),
                o,
                o + Vec3::new(u1, 0.0, 0.0),
            ),
            Face::NegZ => (
                o + Vec3::new(0.0, v1, 0.0),
                o + Vec3::new(u1, v1, 0.0),
                o + Vec3::new(u1, 0.0, 0.0),
                o,
            ),
        };
        // Derive absolute UVs from world-space coordinates per face orientation
        let uv_from = |p: Vec3| match face {
            Face::PosY | Face::NegY => (p.x, p.z),
            Face::PosX | Face::NegX => (p.z, p.y),
            Face::PosZ | Face::NegZ => (p.x, p.y),
        };
        let uvs = [uv_from(a), uv_from(d), uv_from(c), uv_from(b)];
        self.add_quad_uv(a, b, c, d, n, uvs, rgba, owner);
    }

    /// Keeps only the quads whose owner passes `keep`, compacting all arrays.
    pub fn retain_quads(&mut self, mut keep: impl FnMut(u32) -> bool) {
        let mut out = MeshBuild::default();
        out.reserve_quads(self.quad_count());
        for (q, &owner) in self.owner.iter().enumerate() {
            if !keep(owner) {
                continue;
            }
            let v = q * 4;
            let base = out.vertex_count() as u32;
            out.pos.extend_from_slice(&self.pos[v * 3..(v + 4) * 3]);
            out.norm.extend_from_slice(&self.norm[v * 3..(v + 4) * 3]);
            out.uv.extend_from_slice(&self.uv[v * 2..(v + 4) * 2]);
            out.col.extend_from_slice(&self.col[v * 4..(v + 4) * 4]);
            let old_base = v as u32;
            out.idx.extend(
                self.idx[q * 6..q * 6 + 6]
                    .iter()
                    .map(|&i| i - old_base + base),
            );
            out.owner.push(owner);
        }
        *self = out;
    }

    /// Returns a slice of interleaved vertex positions (x,y,z per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.pos
    }

    /// Returns a slice of interleaved vertex normals (x,y,z per vertex).
    pub fn normals(&self) -> &[f32] {
        &self.norm
    }

    /// The four corner positions of quad `q`, in emitted order.
    pub fn quad_corners(&self, q: usize) -> [[f32; 3]; 4] {
        let v = q * 12;
        let p = &self.pos[v..v + 12];
        [
            [p[0], p[1], p[2]],
            [p[3], p[4], p[5]],
            [p[6], p[7], p[8]],
            [p[9], p[10], p[11]],
        ]
    }
}
