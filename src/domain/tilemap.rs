/// Immutable tile grid.
///
/// Built once from a level description. Solidity is stored in a flat
/// row-major grid, so `is_solid` is an O(1) lookup and never touches the
/// source text again.
///
/// Out-of-bounds cells (negative or past either extent) are EMPTY, not
/// walls: entities may leave the map through any edge, top included.

use super::tile::Tile;

#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap {
    cols: usize,
    rows: usize,
    tile_size: f32,
    cells: Vec<Tile>,
}

impl Tilemap {
    /// Build from text rows. `cols` is the longest row; short rows are
    /// padded with empty cells.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], tile_size: f32) -> Self {
        let cols = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0);
        let mut cells = vec![Tile::Empty; cols * rows.len()];
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.as_ref().chars().enumerate() {
                cells[row * cols + col] = Tile::from_char(ch);
            }
        }
        Tilemap { cols, rows: rows.len(), tile_size, cells }
    }

    pub fn cols(&self) -> usize { self.cols }
    pub fn rows(&self) -> usize { self.rows }
    pub fn tile_size(&self) -> f32 { self.tile_size }

    /// World width in pixels (`cols * TILE`).
    pub fn world_width(&self) -> f32 { self.cols as f32 * self.tile_size }

    /// World height in pixels (`rows * TILE`).
    pub fn world_height(&self) -> f32 { self.rows as f32 * self.tile_size }

    #[inline]
    pub fn tile_at(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 {
            return Tile::Empty;
        }
        let (c, r) = (col as usize, row as usize);
        if c >= self.cols || r >= self.rows {
            return Tile::Empty;
        }
        self.cells[r * self.cols + c]
    }

    #[inline]
    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.tile_at(col, row).is_solid()
    }

    /// Tile index containing world coordinate `v`.
    #[inline]
    pub fn cell_of(&self, v: f32) -> i32 {
        (v / self.tile_size).floor() as i32
    }
}
