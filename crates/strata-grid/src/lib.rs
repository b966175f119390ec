//! Dense 2D/3D grids with fixed linear strides.
#![forbid(unsafe_code)]

use core::ops::{Index, IndexMut};

/// Row-major 2D grid (x fastest). Cell `(x, z)` lives at `x + z * sx`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid2<T> {
    sx: usize,
    sz: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid2<T> {
    pub fn new(sx: usize, sz: usize, fill: T) -> Self {
        Self {
            sx,
            sz,
            data: vec![fill; sx * sz],
        }
    }
}

impl<T> Grid2<T> {
    /// Wraps an existing buffer; `None` when its length is not `sx * sz`.
    pub fn from_vec(sx: usize, sz: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != sx * sz {
            return None;
        }
        Some(Self { sx, sz, data })
    }

    pub fn from_fn(sx: usize, sz: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(sx * sz);
        for z in 0..sz {
            for x in 0..sx {
                data.push(f(x, z));
            }
        }
        Self { sx, sz, data }
    }

    #[inline]
    pub fn sx(&self) -> usize {
        self.sx
    }

    #[inline]
    pub fn sz(&self) -> usize {
        self.sz
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn idx(&self, x: usize, z: usize) -> usize {
        assert!(
            x < self.sx && z < self.sz,
            "grid2 index ({x}, {z}) out of bounds {}x{}",
            self.sx,
            self.sz
        );
        x + z * self.sx
    }

    #[inline]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && (x as usize) < self.sx && (z as usize) < self.sz
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> &T {
        &self.data[self.idx(x, z)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, z: usize) -> &mut T {
        let i = self.idx(x, z);
        &mut self.data[i]
    }

    #[inline]
    pub fn set(&mut self, x: usize, z: usize, value: T) {
        let i = self.idx(x, z);
        self.data[i] = value;
    }

    pub fn get_checked(&self, x: i32, z: i32) -> Option<&T> {
        if !self.contains(x, z) {
            return None;
        }
        Some(&self.data[x as usize + z as usize * self.sx])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid2<U> {
        Grid2 {
            sx: self.sx,
            sz: self.sz,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> Index<(usize, usize)> for Grid2<T> {
    type Output = T;
    #[inline]
    fn index(&self, (x, z): (usize, usize)) -> &T {
        self.get(x, z)
    }
}

impl<T> IndexMut<(usize, usize)> for Grid2<T> {
    #[inline]
    fn index_mut(&mut self, (x, z): (usize, usize)) -> &mut T {
        self.get_mut(x, z)
    }
}

/// Vertical-run 3D grid. Cell `(x, y, z)` lives at `y + x * sy + z * sy * sx`,
/// so a column's cells are contiguous.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid3<T> {
    sx: usize,
    sy: usize,
    sz: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid3<T> {
    pub fn new(sx: usize, sy: usize, sz: usize, fill: T) -> Self {
        Self {
            sx,
            sy,
            sz,
            data: vec![fill; sx * sy * sz],
        }
    }
}

impl<T> Grid3<T> {
    pub fn from_vec(sx: usize, sy: usize, sz: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != sx * sy * sz {
            return None;
        }
        Some(Self { sx, sy, sz, data })
    }

    /// Fills in storage order (y fastest, then x, then z).
    pub fn from_fn(
        sx: usize,
        sy: usize,
        sz: usize,
        mut f: impl FnMut(usize, usize, usize) -> T,
    ) -> Self {
        let mut data = Vec::with_capacity(sx * sy * sz);
        for z in 0..sz {
            for x in 0..sx {
                for y in 0..sy {
                    data.push(f(x, y, z));
                }
            }
        }
        Self { sx, sy, sz, data }
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.sx, self.sy, self.sz)
    }

    #[inline]
    pub fn sx(&self) -> usize {
        self.sx
    }

    #[inline]
    pub fn sy(&self) -> usize {
        self.sy
    }

    #[inline]
    pub fn sz(&self) -> usize {
        self.sz
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < self.sx && y < self.sy && z < self.sz,
            "grid3 index ({x}, {y}, {z}) out of bounds {}x{}x{}",
            self.sx,
            self.sy,
            self.sz
        );
        y + x * self.sy + z * self.sy * self.sx
    }

    /// Inverse of [`Grid3::idx`].
    #[inline]
    pub fn pos(&self, i: usize) -> (usize, usize, usize) {
        assert!(i < self.data.len(), "grid3 linear index {i} out of bounds");
        let y = i % self.sy;
        let x = (i / self.sy) % self.sx;
        let z = i / (self.sy * self.sx);
        (x, y, z)
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.sx
            && (y as usize) < self.sy
            && (z as usize) < self.sz
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> &T {
        &self.data[self.idx(x, y, z)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> &mut T {
        let i = self.idx(x, y, z);
        &mut self.data[i]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: T) {
        let i = self.idx(x, y, z);
        self.data[i] = value;
    }

    pub fn get_checked(&self, x: i32, y: i32, z: i32) -> Option<&T> {
        if !self.contains(x, y, z) {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        Some(&self.data[y + x * self.sy + z * self.sy * self.sx])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Contiguous vertical column at `(x, z)`, bottom first.
    pub fn column(&self, x: usize, z: usize) -> &[T] {
        let start = self.idx(x, 0, z);
        &self.data[start..start + self.sy]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<(usize, usize, usize)> for Grid3<T> {
    type Output = T;
    #[inline]
    fn index(&self, (x, y, z): (usize, usize, usize)) -> &T {
        self.get(x, y, z)
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Grid3<T> {
    #[inline]
    fn index_mut(&mut self, (x, y, z): (usize, usize, usize)) -> &mut T {
        self.get_mut(x, y, z)
    }
}
