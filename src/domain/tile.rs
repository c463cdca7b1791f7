/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Solid, // Ground: blocks movement from every side
}

impl Tile {
    /// Level-description character → tile. Markers (`C`, `E`, `P`, `G`)
    /// sit on empty cells.
    pub fn from_char(ch: char) -> Tile {
        match ch {
            '#' => Tile::Solid,
            _ => Tile::Empty,
        }
    }

    /// Does this tile block movement (collision resolver clamps against it)?
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Solid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_hash_is_solid() {
        assert!(Tile::from_char('#').is_solid());
        for ch in [' ', '.', 'C', 'E', 'P', 'G', '='] {
            assert!(!Tile::from_char(ch).is_solid(), "{ch:?} should be empty");
        }
    }
}
