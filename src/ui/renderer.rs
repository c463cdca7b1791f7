/// Terminal renderer for world snapshots.
///
/// Each frame is composed into `next`, compared cell by cell against
/// `shown` (what the terminal currently displays), and only the changed
/// runs are written. Commands are queued and flushed once per frame.
///
/// World → terminal mapping: one tile is `CELL_W` terminal columns by one
/// row. The map window starts at the tile containing `camera_x` and is
/// at most one viewport wide and tall. Coins are drawn in their own cell,
/// moving entities in the tile that contains their center.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Rect;
use crate::sim::snapshot::Snapshot;

/// Background painted under every cell, `Clear` included.
const BASE_BG: Color = Color::Rgb { r: 18, g: 24, b: 40 };

/// How many terminal columns a cell's glyph covers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Span {
    Narrow,
    /// Emoji: this cell and the one to its right.
    Wide,
    /// Right half of a `Wide` glyph; never printed.
    Tail,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Pen {
    fg: Color,
    bg: Color,
}

impl Pen {
    const BASE: Pen = Pen { fg: Color::White, bg: BASE_BG };

    fn new(fg: Color, bg: Color) -> Pen {
        let bg = if bg == Color::Reset { BASE_BG } else { bg };
        Pen { fg, bg }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    utf8: [u8; 8],
    len: u8,
    pen: Pen,
    span: Span,
}

impl Cell {
    const BLANK: Cell = Cell { utf8: [b' ', 0, 0, 0, 0, 0, 0, 0], len: 1, pen: Pen::BASE, span: Span::Narrow };

    const TAIL: Cell = Cell { utf8: [0; 8], len: 0, pen: Pen::BASE, span: Span::Tail };

    /// Never produced by composing, so a screen full of these repaints.
    const STALE: Cell = Cell {
        utf8: [0; 8],
        len: 0,
        pen: Pen { fg: Color::Magenta, bg: Color::Magenta },
        span: Span::Narrow,
    };

    fn narrow(c: char, fg: Color, bg: Color) -> Self {
        let mut utf8 = [0; 8];
        let len = c.encode_utf8(&mut utf8).len() as u8;
        Cell { utf8, len, pen: Pen::new(fg, bg), span: Span::Narrow }
    }

    fn wide(c: char) -> Self {
        Cell { span: Span::Wide, ..Cell::narrow(c, Color::Reset, Color::Reset) }
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.utf8[..self.len as usize]).unwrap_or(" ")
    }

    fn columns(&self) -> usize {
        match self.span {
            Span::Wide => 2,
            Span::Narrow | Span::Tail => 1,
        }
    }
}

/// Row-major grid of cells. Writes outside the grid are dropped.
struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    fn new(width: usize, height: usize) -> Self {
        Grid { width, height, cells: vec![Cell::BLANK; width * height] }
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        self.index(x, y).map_or(Cell::BLANK, |i| self.cells[i])
    }

    /// One column per char, clipped at the right edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate().take(self.width.saturating_sub(x)) {
            self.set(x + i, y, Cell::narrow(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::narrow(' ', Color::White, bg));
        }
    }

    /// Dropped entirely when the tail would fall off the grid.
    fn put_wide(&mut self, x: usize, y: usize, c: char) {
        if x + 1 < self.width {
            self.set(x, y, Cell::wide(c));
            self.set(x + 1, y, Cell::TAIL);
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width)
            .map(|x| self.get(x, y))
            .filter(|c| c.span != Span::Tail)
            .map(|c| c.as_str().to_string())
            .collect()
    }
}

// ── Layout ──

/// Terminal columns per tile.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD + gap above the map, gap + help line below it.
const RESERVED_ROWS: usize = MAP_ROW + 2;

const HUD_BG: Color = Color::Rgb { r: 30, g: 40, b: 90 };
const GRASS_FG: Color = Color::Rgb { r: 120, g: 220, b: 90 };
const GRASS_BG: Color = Color::Rgb { r: 50, g: 130, b: 40 };
const DIRT_FG: Color = Color::Rgb { r: 150, g: 100, b: 55 };
const DIRT_BG: Color = Color::Rgb { r: 95, g: 60, b: 30 };

/// Visible tile window: first column, column count, row count.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct View {
    col0: i32,
    cols: usize,
    rows: usize,
}

impl View {
    fn fit(snap: &Snapshot<'_>, term_w: usize, term_h: usize) -> View {
        let map = snap.tilemap;
        let tile = map.tile_size();
        let viewport_cols = (snap.viewport_width / tile).ceil() as usize;
        let viewport_rows = (snap.viewport_height / tile).ceil() as usize;
        View {
            col0: map.cell_of(snap.camera_x),
            cols: (term_w / CELL_W).min(viewport_cols).min(map.cols()),
            rows: term_h.saturating_sub(RESERVED_ROWS).min(viewport_rows).min(map.rows()),
        }
    }

    /// Terminal (column, row) of the tile holding the center of `r`.
    fn locate(&self, snap: &Snapshot<'_>, r: &Rect) -> Option<(usize, usize)> {
        let map = snap.tilemap;
        self.cell(map.cell_of(r.center_x()), map.cell_of(r.center_y() - snap.camera_y))
    }

    /// Terminal (column, row) of map cell `(col, row)`, if visible.
    fn cell(&self, col: i32, row: i32) -> Option<(usize, usize)> {
        let col = col - self.col0;
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return None;
        }
        Some((col as usize * CELL_W, MAP_ROW + row as usize))
    }
}

// ── Renderer ──

pub struct Renderer {
    out: BufWriter<io::Stdout>,
    next: Grid,
    shown: Grid,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            out: BufWriter::with_capacity(16384, io::stdout()),
            next: Grid::new(0, 0),
            shown: Grid::new(0, 0),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.out, terminal::EnterAlternateScreen, cursor::Hide)?;
        let (w, h) = terminal::size().unwrap_or((80, 24));
        self.resize(w as usize, h as usize)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// New grids and a cleared screen; everything repaints next frame.
    fn resize(&mut self, w: usize, h: usize) -> io::Result<()> {
        self.next = Grid::new(w, h);
        self.shown = Grid::new(w, h);
        self.shown.fill(Cell::STALE);
        queue!(self.out, SetBackgroundColor(BASE_BG), Clear(ClearType::All))
    }

    pub fn render(&mut self, snap: &Snapshot<'_>) -> io::Result<()> {
        let (w, h) = terminal::size().unwrap_or((80, 24));
        if (w as usize, h as usize) != (self.next.width, self.next.height) {
            self.resize(w as usize, h as usize)?;
        }

        self.compose(snap);
        self.flush_diff()?;
        std::mem::swap(&mut self.next, &mut self.shown);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        // Where the terminal cursor sits after the last print, if known.
        let mut cursor: Option<(usize, usize)> = None;
        let mut pen = Pen::BASE;
        queue!(self.out, SetForegroundColor(pen.fg), SetBackgroundColor(pen.bg))?;

        for y in 0..self.next.height {
            let mut x = 0;
            while x < self.next.width {
                let cell = self.next.get(x, y);
                let step = cell.columns();
                let changed = (x..x + step).any(|cx| self.next.get(cx, y) != self.shown.get(cx, y));

                if cell.span != Span::Tail && changed {
                    if cursor != Some((x, y)) {
                        queue!(self.out, MoveTo(x as u16, y as u16))?;
                    }
                    if cell.pen.fg != pen.fg {
                        queue!(self.out, SetForegroundColor(cell.pen.fg))?;
                    }
                    if cell.pen.bg != pen.bg {
                        queue!(self.out, SetBackgroundColor(cell.pen.bg))?;
                    }
                    pen = cell.pen;
                    queue!(self.out, Print(cell.as_str()))?;
                    cursor = Some((x + step, y));
                }
                x += step;
            }
        }

        self.out.flush()
    }

    // ── Compose: fill `next` ──

    fn compose(&mut self, snap: &Snapshot<'_>) {
        self.next.fill(Cell::BLANK);
        let view = View::fit(snap, self.next.width, self.next.height);

        self.compose_hud(snap);
        self.compose_tiles(snap, view);
        self.compose_entities(snap, view);

        let help_row = MAP_ROW + view.rows + 1;
        let help = " ←→/AD: Run  ↑/W/Space: Jump  P: Pause  R: Restart  Q: Quit";
        self.next.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);

        if !snap.alive {
            self.compose_banner(view, "GAME OVER", "R: Restart   Q: Quit", Color::Rgb { r: 255, g: 80, b: 80 });
        } else if snap.paused {
            self.compose_banner(view, "PAUSED", "P: Resume   R: Restart", Color::Rgb { r: 255, g: 220, b: 50 });
        }
    }

    fn compose_hud(&mut self, snap: &Snapshot<'_>) {
        self.next.fill_row(HUD_ROW, HUD_BG);
        let total = snap.coins.len();
        let hud = format!(
            " {}  Score:{:<6}  ♥×{}  ●{}/{}",
            snap.level_name, snap.score, snap.lives,
            total - snap.coins_left(), total,
        );
        self.next.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_tiles(&mut self, snap: &Snapshot<'_>, view: View) {
        let map = snap.tilemap;
        let row0 = map.cell_of(snap.camera_y);
        for vy in 0..view.rows {
            let row = row0 + vy as i32;
            for vx in 0..view.cols {
                let col = view.col0 + vx as i32;
                if !map.is_solid(col, row) { continue; }
                // Ground with open air above gets a grass top
                let (ch, fg, bg) = if map.is_solid(col, row - 1) {
                    ('▓', DIRT_FG, DIRT_BG)
                } else {
                    ('▀', GRASS_FG, GRASS_BG)
                };
                let x = vx * CELL_W;
                self.next.set(x, MAP_ROW + vy, Cell::narrow(ch, fg, bg));
                self.next.set(x + 1, MAP_ROW + vy, Cell::narrow(ch, fg, bg));
            }
        }
    }

    /// Goals, then coins, enemies and the player on top.
    fn compose_entities(&mut self, snap: &Snapshot<'_>, view: View) {
        let tile = snap.tilemap.tile_size();

        for goal in snap.goals {
            let r = Rect::centered(goal.x, goal.y, tile, tile);
            if let Some((x, y)) = view.locate(snap, &r) {
                self.next.put_wide(x, y, '🚩');
            }
        }

        let row0 = snap.tilemap.cell_of(snap.camera_y);
        for coin in snap.coins.iter().filter(|c| !c.picked) {
            if let Some((x, y)) = view.cell(coin.col as i32, coin.row as i32 - row0) {
                self.next.put_wide(x, y, '🪙');
            }
        }

        for enemy in snap.enemies.iter().filter(|e| e.alive) {
            if let Some((x, y)) = view.locate(snap, &enemy.rect) {
                self.next.put_wide(x, y, '👾');
            }
        }

        let player = snap.player;
        if let Some((x, y)) = view.locate(snap, &player.rect()) {
            self.next.put_wide(x, y, if snap.alive { '🐸' } else { '💀' });
        }
    }

    /// Two-line box centered over the map.
    fn compose_banner(&mut self, view: View, title: &str, hint: &str, accent: Color) {
        let box_bg = Color::Rgb { r: 40, g: 40, b: 40 };
        let view_w = view.cols * CELL_W;
        let box_w = (hint.chars().count().max(title.chars().count()) + 6).min(self.next.width);
        let box_x = view_w.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + view.rows.saturating_sub(4) / 2;

        for y in box_y..box_y + 4 {
            for x in box_x..box_x + box_w {
                self.next.set(x, y, Cell::narrow(' ', Color::White, box_bg));
            }
        }
        let center = |s: &str| box_x + box_w.saturating_sub(s.chars().count()) / 2;
        self.next.put_str(center(title), box_y + 1, title, accent, box_bg);
        self.next.put_str(center(hint), box_y + 2, hint, Color::Grey, box_bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::level::Level;
    use crate::sim::world::World;

    fn world(rows: &[&str]) -> World {
        let cfg = SimConfig::default();
        World::new(&Level::parse("Test Hill", rows, &cfg).unwrap(), &cfg)
    }

    fn composed(world: &World, paused: bool, term_w: usize, term_h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.next = Grid::new(term_w, term_h);
        r.compose(&Snapshot::of(world, "Test Hill", paused));
        r
    }

    #[test]
    fn hud_shows_score_lives_and_coins() {
        let mut w = world(&["P C C", "#####"]);
        w.score = 7;
        w.coins[0].picked = true;
        let r = composed(&w, false, 40, 10);
        let hud = r.next.row_text(HUD_ROW);
        assert!(hud.contains("Test Hill"), "{hud}");
        assert!(hud.contains("Score:7"), "{hud}");
        assert!(hud.contains("♥×3"), "{hud}");
        assert!(hud.contains("●1/2"), "{hud}");
    }

    #[test]
    fn ground_and_entities_land_in_their_tiles() {
        let w = world(&["  C ", "P  E", "####"]);
        let r = composed(&w, false, 40, 10);
        // Player in tile (0,1), coin (2,0), enemy (3,1)
        assert_eq!(r.next.get(0, MAP_ROW + 1).span, Span::Wide);
        assert_eq!(r.next.get(1, MAP_ROW + 1), Cell::TAIL);
        assert_eq!(r.next.get(4, MAP_ROW).as_str(), "🪙");
        assert_eq!(r.next.get(6, MAP_ROW + 1).as_str(), "👾");
        // Ground row has open air above → grass
        assert_eq!(r.next.get(0, MAP_ROW + 2).as_str(), "▀");
    }

    #[test]
    fn camera_scrolls_tiles() {
        let mut row = String::from("P");
        row.push_str(&" ".repeat(59));
        let mut ground = "#".repeat(60);
        ground.replace_range(40..41, " ");
        let mut w = world(&[&row, &ground]);
        // camera_x clamps to 1920 - 960 = 960 → first column 30
        w.player.body.rect.x = 1300.0;
        let r = composed(&w, false, 200, 10);
        // Gap at column 40 is the 10th visible tile
        assert_eq!(r.next.get(10 * CELL_W, MAP_ROW + 1), Cell::BLANK);
        assert_ne!(r.next.get(9 * CELL_W, MAP_ROW + 1), Cell::BLANK);
    }

    #[test]
    fn view_is_limited_by_terminal_viewport_and_map() {
        let w = world(&["P   ", "####"]);
        let snap = Snapshot::of(&w, "t", false);
        assert_eq!(View::fit(&snap, 200, 50), View { col0: 0, cols: 4, rows: 2 });
        assert_eq!(View::fit(&snap, 5, 3), View { col0: 0, cols: 2, rows: 0 });
    }

    #[test]
    fn view_is_limited_by_viewport_height() {
        let rows = ["P   ", "    ", "    ", "    ", "    ", "####"];
        let mut w = world(&rows);
        w.config.viewport_height = 64.0;
        let snap = Snapshot::of(&w, "t", false);
        assert_eq!(View::fit(&snap, 200, 50).rows, 2);

        w.config.viewport_height = 70.0;
        let snap = Snapshot::of(&w, "t", false);
        assert_eq!(View::fit(&snap, 200, 50).rows, 3);
    }

    #[test]
    fn coins_are_drawn_in_their_cell() {
        let mut w = world(&["    ", "P  C", "####"]);
        w.coins[0].x = 5.0;
        let r = composed(&w, false, 40, 10);
        assert_eq!(r.next.get(3 * CELL_W, MAP_ROW + 1).as_str(), "🪙");
        assert_eq!(r.next.get(0, MAP_ROW + 1).as_str(), "🐸");
    }

    #[test]
    fn overlays_for_pause_and_game_over() {
        let mut w = world(&["P   ", "    ", "    ", "    ", "####"]);
        let r = composed(&w, true, 40, 12);
        assert!((0..12).any(|y| r.next.row_text(y).contains("PAUSED")));

        w.player.alive = false;
        let r = composed(&w, false, 40, 12);
        assert!((0..12).any(|y| r.next.row_text(y).contains("GAME OVER")));
    }

    #[test]
    fn offscreen_player_is_not_drawn() {
        let mut w = world(&["P  ", "###"]);
        w.player.body.rect.y = 900.0;
        let r = composed(&w, false, 40, 10);
        assert!(!(0..10).any(|y| (0..40).any(|x| r.next.get(x, y).span == Span::Wide)));
    }
}
