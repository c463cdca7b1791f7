/// Game configuration: simulation constants, gamepad bindings, level and
/// log file locations.
///
/// Read from `config.toml` (see `GameConfig::load` for the search order).
/// Every key is optional; anything missing takes its default.
/// The simulation constants are validated once, before a world is built.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub gamepad: GamepadConfig,
    /// Level description file. `None` = built-in level.
    pub level_file: Option<PathBuf>,
    pub log_file: PathBuf,
}

/// Session constants consumed by the simulation core.
/// Distances are world pixels, times are seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Edge length of one tile.
    pub tile_size: f32,
    /// Downward acceleration (px/s²).
    pub gravity: f32,
    /// Horizontal run speed (px/s).
    pub move_speed: f32,
    /// Initial upward speed of a jump (px/s). A stomp bounce uses half of it.
    pub jump_speed: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Patrol speed (px/s).
    pub enemy_speed: f32,
    pub enemy_width: f32,
    pub enemy_height: f32,
    pub starting_lives: u32,
    /// Ceiling for a single frame's dt; keeps fast bodies from tunneling.
    pub max_frame_dt: f32,
    /// How far below the world's bottom edge the player may fall
    /// before it counts as a void-fall.
    pub void_margin: f32,
    /// Width of the visible window; drives horizontal camera scroll.
    pub viewport_width: f32,
    /// Height of the visible window; caps the rows the renderer shows.
    pub viewport_height: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub pause: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("starting_lives must be at least 1")]
    NoLives,
    #[error("{name} size {width}x{height} does not fit in a {tile} px tile")]
    LargerThanTile { name: &'static str, width: f32, height: f32, tile: f32 },
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            tile_size: default_tile_size(),
            gravity: default_gravity(),
            move_speed: default_move_speed(),
            jump_speed: default_jump_speed(),
            player_width: default_player_width(),
            player_height: default_player_height(),
            enemy_speed: default_enemy_speed(),
            enemy_width: default_enemy_width(),
            enemy_height: default_enemy_height(),
            starting_lives: default_starting_lives(),
            max_frame_dt: default_max_frame_dt(),
            void_margin: default_void_margin(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            jump: default_pad_jump(),
            pause: default_pad_pause(),
            restart: default_pad_restart(),
            quit: default_pad_quit(),
        }
    }
}

impl SimConfig {
    /// Reject constants the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tile_size", self.tile_size),
            ("gravity", self.gravity),
            ("move_speed", self.move_speed),
            ("jump_speed", self.jump_speed),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("enemy_speed", self.enemy_speed),
            ("enemy_width", self.enemy_width),
            ("enemy_height", self.enemy_height),
            ("max_frame_dt", self.max_frame_dt),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
        ];
        for (name, value) in positive {
            // `!(v > 0)` also catches NaN
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if self.void_margin < 0.0 {
            return Err(ConfigError::NotPositive { name: "void_margin", value: self.void_margin });
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        let sizes = [
            ("player", self.player_width, self.player_height),
            ("enemy", self.enemy_width, self.enemy_height),
        ];
        for (name, width, height) in sizes {
            if width > self.tile_size || height > self.tile_size {
                return Err(ConfigError::LargerThanTile { name, width, height, tile: self.tile_size });
            }
        }
        Ok(())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    enemy: TomlEnemy,
    #[serde(default)]
    session: TomlSession,
    #[serde(default)]
    view: TomlView,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_tile_size")]
    tile_size: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_jump_speed")]
    jump_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_player_width")]
    width: f32,
    #[serde(default = "default_player_height")]
    height: f32,
}

#[derive(Deserialize, Debug)]
struct TomlEnemy {
    #[serde(default = "default_enemy_speed")]
    speed: f32,
    #[serde(default = "default_enemy_width")]
    width: f32,
    #[serde(default = "default_enemy_height")]
    height: f32,
}

#[derive(Deserialize, Debug)]
struct TomlSession {
    #[serde(default = "default_starting_lives")]
    starting_lives: u32,
    #[serde(default = "default_max_frame_dt")]
    max_frame_dt: f32,
    #[serde(default = "default_void_margin")]
    void_margin: f32,
}

#[derive(Deserialize, Debug)]
struct TomlView {
    #[serde(default = "default_viewport_width")]
    width: f32,
    #[serde(default = "default_viewport_height")]
    height: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_pause")]
    pause: Vec<String>,
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    level_file: Option<String>,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_tile_size() -> f32 { 32.0 }
fn default_gravity() -> f32 { 2000.0 }
fn default_move_speed() -> f32 { 220.0 }
fn default_jump_speed() -> f32 { 700.0 }
fn default_player_width() -> f32 { 24.0 }
fn default_player_height() -> f32 { 30.0 }
fn default_enemy_speed() -> f32 { 60.0 }
fn default_enemy_width() -> f32 { 28.0 }
fn default_enemy_height() -> f32 { 28.0 }
fn default_starting_lives() -> u32 { 3 }
fn default_max_frame_dt() -> f32 { 0.04 }
fn default_void_margin() -> f32 { 500.0 }
fn default_viewport_width() -> f32 { 960.0 }
fn default_viewport_height() -> f32 { 540.0 }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pad_pause() -> Vec<String> { vec!["Start".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Y".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "tilehop.log".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            tile_size: default_tile_size(),
            gravity: default_gravity(),
            move_speed: default_move_speed(),
            jump_speed: default_jump_speed(),
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer { width: default_player_width(), height: default_player_height() }
    }
}

impl Default for TomlEnemy {
    fn default() -> Self {
        TomlEnemy {
            speed: default_enemy_speed(),
            width: default_enemy_width(),
            height: default_enemy_height(),
        }
    }
}

impl Default for TomlSession {
    fn default() -> Self {
        TomlSession {
            starting_lives: default_starting_lives(),
            max_frame_dt: default_max_frame_dt(),
            void_margin: default_void_margin(),
        }
    }
}

impl Default for TomlView {
    fn default() -> Self {
        TomlView { width: default_viewport_width(), height: default_viewport_height() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            pause: default_pad_pause(),
            restart: default_pad_restart(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { level_file: None, log_file: default_log_file() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/tilehop`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Relative level paths resolve against the search dirs, first hit wins
        let level_file = toml_cfg.general.level_file.as_deref().map(|name| {
            let path = PathBuf::from(name);
            if path.is_absolute() {
                path
            } else {
                search_dirs.iter()
                    .map(|d| d.join(name))
                    .find(|p| p.is_file())
                    .unwrap_or(path)
            }
        });

        Self::from_toml(toml_cfg, level_file)
    }

    /// Parse a config document directly (no file search).
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        let level_file = toml_cfg.general.level_file.as_ref().map(PathBuf::from);
        Ok(Self::from_toml(toml_cfg, level_file))
    }

    fn from_toml(toml_cfg: TomlConfig, level_file: Option<PathBuf>) -> Self {
        GameConfig {
            sim: SimConfig {
                tile_size: toml_cfg.physics.tile_size,
                gravity: toml_cfg.physics.gravity,
                move_speed: toml_cfg.physics.move_speed,
                jump_speed: toml_cfg.physics.jump_speed,
                player_width: toml_cfg.player.width,
                player_height: toml_cfg.player.height,
                enemy_speed: toml_cfg.enemy.speed,
                enemy_width: toml_cfg.enemy.width,
                enemy_height: toml_cfg.enemy.height,
                starting_lives: toml_cfg.session.starting_lives,
                max_frame_dt: toml_cfg.session.max_frame_dt,
                void_margin: toml_cfg.session.void_margin,
                viewport_width: toml_cfg.view.width,
                viewport_height: toml_cfg.view.height,
            },
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                pause: toml_cfg.gamepad.pause,
                restart: toml_cfg.gamepad.restart,
                quit: toml_cfg.gamepad.quit,
            },
            level_file,
            log_file: PathBuf::from(toml_cfg.general.log_file),
        }
    }
}

/// Where `config.toml` and relative level files are looked up, in order:
/// the executable's directory (symlinks resolved), the working directory,
/// then the data home if it exists. Duplicates are dropped.
fn candidate_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(PathBuf::from));
    let cwd = std::env::current_dir().ok();
    let data_home = std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".local/share/tilehop"))
        .filter(|dir| dir.is_dir());

    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in [exe_dir, cwd, data_home].into_iter().flatten() {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// First readable `config.toml` wins. A file that fails to parse still
/// stops the search, with defaults in its place.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    let readable = search_dirs.iter()
        .map(|dir| dir.join("config.toml"))
        .filter(|path| path.is_file())
        .find_map(|path| match std::fs::read_to_string(&path) {
            Ok(text) => Some((path, text)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config.toml");
                None
            }
        });

    let Some((path, text)) = readable else {
        debug!("no config.toml found, using defaults");
        return TomlConfig::default();
    };
    toml::from_str(&text).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "config.toml parse error, using defaults");
        TomlConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
        assert_eq!(SimConfig::default().starting_lives, 3);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[physics]\ngravity = 1500.0\n\n[session]\nstarting_lives = 5\n",
        ).unwrap();
        assert_eq!(cfg.sim.gravity, 1500.0);
        assert_eq!(cfg.sim.starting_lives, 5);
        assert_eq!(cfg.sim.tile_size, 32.0);
        assert_eq!(cfg.sim.max_frame_dt, 0.04);
        assert!(cfg.level_file.is_none());
        assert_eq!(cfg.gamepad.pause, vec!["Start".to_string()]);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.sim, SimConfig::default());
        assert_eq!(cfg.log_file, PathBuf::from("tilehop.log"));
    }

    #[test]
    fn level_file_is_read() {
        let cfg = GameConfig::from_toml_str("[general]\nlevel_file = \"world1.txt\"\n").unwrap();
        assert_eq!(cfg.level_file, Some(PathBuf::from("world1.txt")));
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(GameConfig::from_toml_str("[physics]\ngravity = \"heavy\"\n").is_err());
    }

    #[test]
    fn rejects_zero_tile() {
        let cfg = SimConfig { tile_size: 0.0, ..SimConfig::default() };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NotPositive { name: "tile_size", value: 0.0 })
        );
    }

    #[test]
    fn rejects_nan_gravity() {
        let cfg = SimConfig { gravity: f32::NAN, ..SimConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::NotPositive { name: "gravity", .. })));
    }

    #[test]
    fn rejects_zero_lives() {
        let cfg = SimConfig { starting_lives: 0, ..SimConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::NoLives));
    }

    #[test]
    fn rejects_oversized_player() {
        let cfg = SimConfig { player_height: 40.0, ..SimConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::LargerThanTile { name: "player", .. })));
    }
}
