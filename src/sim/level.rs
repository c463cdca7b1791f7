/// Level description parsing.
///
/// ## Sources (priority order):
///   1. `level_file` from config.toml
///   2. Built-in embedded level
///
/// ## File format (`.txt`):
///   Lines starting with `;` are comments; the first one names the level.
///   Every other line is a map row. Trailing blank lines are dropped.
///   Rows may be ragged: `cols` is the longest row, the rest is empty.
///
/// ## Tile legend:
///   '#' = Ground (solid)     'C' = Coin
///   'E' = Enemy spawn        'P' = Player start (exactly one)
///   'G' = Goal (parsed, no gameplay effect yet)
///   anything else = Empty

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::domain::tilemap::Tilemap;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level has no rows or no columns")]
    Empty,
    #[error("level has no player start ('P')")]
    MissingPlayer,
    #[error("level has more than one player start: col {}, row {} and col {}, row {}",
        .first.0, .first.1, .second.0, .second.1)]
    MultiplePlayers { first: (usize, usize), second: (usize, usize) },
    #[error("could not read level file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A marker found in the level text: its cell and derived world position.
///
/// For the player and enemies `(x, y)` is the top-left of a box centered
/// horizontally in the cell with its bottom on the cell's bottom edge.
/// For coins and goals `(x, y)` is the cell center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spawn {
    pub col: usize,
    pub row: usize,
    pub x: f32,
    pub y: f32,
}

impl Spawn {
    fn standing(col: usize, row: usize, tile: f32, w: f32, h: f32) -> Self {
        Spawn {
            col,
            row,
            x: col as f32 * tile + (tile - w) / 2.0,
            y: (row + 1) as f32 * tile - h,
        }
    }

    fn centered(col: usize, row: usize, tile: f32) -> Self {
        Spawn {
            col,
            row,
            x: (col as f32 + 0.5) * tile,
            y: (row as f32 + 0.5) * tile,
        }
    }
}

/// Parsed, immutable level. A session is (re)built from this.
#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    pub tilemap: Tilemap,
    pub player_start: Spawn,
    pub coins: Vec<Spawn>,
    pub enemies: Vec<Spawn>,
    pub goals: Vec<Spawn>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

impl Level {
    /// Parse map rows. Markers are collected in row-major order.
    pub fn parse<S: AsRef<str>>(name: &str, rows: &[S], cfg: &SimConfig) -> Result<Level, LevelError> {
        let cols = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(LevelError::Empty);
        }

        let tile = cfg.tile_size;
        let mut player: Option<(usize, usize)> = None;
        let mut coins = vec![];
        let mut enemies = vec![];
        let mut goals = vec![];

        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.as_ref().chars().enumerate() {
                match ch {
                    'C' => coins.push(Spawn::centered(col, row, tile)),
                    'E' => enemies.push(Spawn::standing(col, row, tile, cfg.enemy_width, cfg.enemy_height)),
                    'G' => goals.push(Spawn::centered(col, row, tile)),
                    'P' => {
                        if let Some(first) = player {
                            return Err(LevelError::MultiplePlayers { first, second: (col, row) });
                        }
                        player = Some((col, row));
                    }
                    _ => {}
                }
            }
        }

        let (pc, pr) = player.ok_or(LevelError::MissingPlayer)?;
        let player_start = Spawn::standing(pc, pr, tile, cfg.player_width, cfg.player_height);
        let tilemap = Tilemap::from_rows(rows, tile);

        debug!(
            name, cols = tilemap.cols(), rows = tilemap.rows(),
            coins = coins.len(), enemies = enemies.len(),
            "parsed level"
        );

        Ok(Level {
            name: name.to_string(),
            tilemap,
            player_start,
            coins,
            enemies,
            goals,
        })
    }

    /// Parse a full level file's text (comments + rows).
    pub fn from_text(content: &str, cfg: &SimConfig) -> Result<Level, LevelError> {
        let (name, rows) = split_level_text(content);
        Level::parse(&name, &rows, cfg)
    }

    /// Read and parse a level file.
    pub fn load(path: &Path, cfg: &SimConfig) -> Result<Level, LevelError> {
        let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Level::from_text(&content, cfg)?;
        info!(path = %path.display(), name = %level.name, "loaded level file");
        Ok(level)
    }

    /// The level that ships with the game.
    pub fn builtin(cfg: &SimConfig) -> Result<Level, LevelError> {
        Level::parse(BUILTIN_NAME, BUILTIN_ROWS, cfg)
    }

    /// Level from config: the configured file if any, else the built-in one.
    pub fn from_config(level_file: Option<&Path>, cfg: &SimConfig) -> Result<Level, LevelError> {
        match level_file {
            Some(path) => Level::load(path, cfg),
            None => Level::builtin(cfg),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Text splitting
// ══════════════════════════════════════════════════════════════

/// Split file text into (name, map rows).
fn split_level_text(content: &str) -> (String, Vec<String>) {
    let mut name = String::new();
    let mut rows = vec![];

    for line in content.lines() {
        if let Some(comment) = line.strip_prefix(';') {
            if name.is_empty() {
                name = comment.trim().to_string();
            }
        } else {
            rows.push(line.trim_end_matches('\r').to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if name.is_empty() {
        name = "Untitled".to_string();
    }

    (name, rows)
}

// ══════════════════════════════════════════════════════════════
// Embedded level
// ══════════════════════════════════════════════════════════════

const BUILTIN_NAME: &str = "Hill Country";

const BUILTIN_ROWS: &[&str] = &[
    "                                                                        ",
    "                                                                        ",
    "                                        C C C                           ",
    "                                       #######                  C    G  ",
    "           C  C                                               ####  ### ",
    "          ######          C   C                                         ",
    "                         #######                 C C    E               ",
    "   P                                 E          ########## ###          ",
    "#########        ###          ############                              ",
    "#########    E   ###   C  C                  C                          ",
    "######################### ########   ###########    #####   ############",
    "######################### ########   ###########    #####   ############",
];

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
