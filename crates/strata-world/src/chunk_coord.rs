use serde::{Deserialize, Serialize};

/// Horizontal neighbor direction of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cardinal {
    NegX = 0,
    PosX = 1,
    NegZ = 2,
    PosZ = 3,
}

impl Cardinal {
    pub const ALL: [Cardinal; 4] = [Cardinal::NegX, Cardinal::PosX, Cardinal::NegZ, Cardinal::PosZ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Cardinal::NegX => (-1, 0),
            Cardinal::PosX => (1, 0),
            Cardinal::NegZ => (0, -1),
            Cardinal::PosZ => (0, 1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Cardinal {
        match self {
            Cardinal::NegX => Cardinal::PosX,
            Cardinal::PosX => Cardinal::NegX,
            Cardinal::NegZ => Cardinal::PosZ,
            Cardinal::PosZ => Cardinal::NegZ,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    #[serde(rename = "x")]
    pub cx: i32,
    #[serde(rename = "z")]
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn neighbor(self, dir: Cardinal) -> Self {
        let (dx, dz) = dir.delta();
        self.offset(dx, dz)
    }

    /// Chunk containing the integer block column `(wx, wz)`.
    #[inline]
    pub fn from_block(wx: i32, wz: i32, size: usize) -> Self {
        let s = size as i32;
        Self::new(wx.div_euclid(s), wz.div_euclid(s))
    }

    /// Chunk containing the world-space point `(x, z)`.
    #[inline]
    pub fn from_world(x: f32, z: f32, size: usize) -> Self {
        Self::from_block(x.floor() as i32, z.floor() as i32, size)
    }

    /// World block coordinates of this chunk's minimum corner.
    #[inline]
    pub fn origin(self, size: usize) -> (i32, i32) {
        (self.cx * size as i32, self.cz * size as i32)
    }

    /// Distance in chunk units under the max-norm.
    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.cx - other.cx).abs().max((self.cz - other.cz).abs())
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dz * dz
    }

    /// Every coordinate within `radius` (max-norm) of `self`.
    pub fn square(self, radius: i32) -> impl Iterator<Item = ChunkCoord> {
        (-radius..=radius)
            .flat_map(move |dz| (-radius..=radius).map(move |dx| self.offset(dx, dz)))
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}
