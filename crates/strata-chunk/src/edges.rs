use strata_world::Cardinal;

/// Set of cardinal sides with no loaded neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edges(u8);

impl Edges {
    pub const NONE: Edges = Edges(0);
    pub const ALL: Edges = Edges(0b1111);

    #[inline]
    fn bit(dir: Cardinal) -> u8 {
        1 << dir.index()
    }

    #[inline]
    pub fn contains(self, dir: Cardinal) -> bool {
        self.0 & Self::bit(dir) != 0
    }

    #[inline]
    pub fn insert(&mut self, dir: Cardinal) {
        self.0 |= Self::bit(dir);
    }

    #[inline]
    pub fn remove(&mut self, dir: Cardinal) {
        self.0 &= !Self::bit(dir);
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Cardinal> {
        Cardinal::ALL.into_iter().filter(move |&d| self.contains(d))
    }
}

impl Default for Edges {
    fn default() -> Self {
        Edges::ALL
    }
}

impl FromIterator<Cardinal> for Edges {
    fn from_iter<I: IntoIterator<Item = Cardinal>>(iter: I) -> Self {
        let mut e = Edges::NONE;
        for d in iter {
            e.insert(d);
        }
        e
    }
}
