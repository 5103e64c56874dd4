/// Tile: the content of one grid cell.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Tile {
    Empty,
    Value(u32), // always > 0
}

impl Tile {
    /// Does this cell hold nothing?
    pub fn is_empty(self) -> bool {
        matches!(self, Tile::Empty)
    }

    /// Numeric value, or None for an empty cell.
    pub fn value(self) -> Option<u32> {
        match self {
            Tile::Empty => None,
            Tile::Value(v) => Some(v),
        }
    }

    /// Can `self` slide onto or merge into `dest`?
    /// Returns the tile `dest` would hold afterwards, or None if blocked.
    /// A merge whose sum does not fit in a `u32` is blocked.
    pub fn combine_into(self, dest: Tile) -> Option<Tile> {
        match (self, dest) {
            (Tile::Empty, _) => None,
            (v, Tile::Empty) => Some(v),
            (Tile::Value(a), Tile::Value(b)) if a == b => a.checked_add(b).map(Tile::Value),
            _ => None,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

impl From<Option<u32>> for Tile {
    fn from(v: Option<u32>) -> Self {
        match v {
            Some(0) | None => Tile::Empty,
            Some(n) => Tile::Value(n),
        }
    }
}
