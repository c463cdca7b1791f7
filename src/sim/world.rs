/// World: the complete mutable state of one session.
///
/// ## Ownership
///
/// One aggregate owns everything the simulation touches: the tilemap,
/// coins, enemies, the single player, score and lives. There is no
/// ambient state; every mutation goes through `sim::step` or the
/// construct / respawn methods below.
///
/// ## Lifecycle
///   - `World::new`: build everything from a parsed `Level` (restart).
///   - `respawn_player`: player back to the start at rest; coins,
///     enemies and score are untouched.
///
/// ## Camera
///
/// Horizontal scroll only:
///   `camera_x = clamp(player_x - viewport_w / 3, 0, world_w - viewport_w)`
/// A world narrower than the viewport keeps the camera at 0.

use crate::config::SimConfig;
use crate::domain::entity::{Coin, Enemy, Player};
use crate::domain::tilemap::Tilemap;

use super::level::{Level, Spawn};

#[derive(Clone, Debug)]
pub struct World {
    pub tilemap: Tilemap,
    pub coins: Vec<Coin>,
    pub enemies: Vec<Enemy>,
    pub goals: Vec<Spawn>,
    pub player: Player,
    pub player_spawn: (f32, f32),

    pub score: u32,
    pub lives: u32,

    pub config: SimConfig,
}

// ── Construction ──

impl World {
    pub fn new(level: &Level, config: &SimConfig) -> Self {
        let tile = config.tile_size;
        let start = level.player_start;

        let coins = level.coins.iter()
            .map(|s| Coin::new(s.col, s.row, tile))
            .collect();

        let enemies = level.enemies.iter().enumerate()
            .map(|(id, s)| Enemy::new(
                id, s.x, s.y,
                config.enemy_width, config.enemy_height,
                config.enemy_speed,
            ))
            .collect();

        World {
            tilemap: level.tilemap.clone(),
            coins,
            enemies,
            goals: level.goals.clone(),
            player: Player::new(start.x, start.y, config.player_width, config.player_height),
            player_spawn: (start.x, start.y),
            score: 0,
            lives: config.starting_lives,
            config: config.clone(),
        }
    }
}

// ── Queries ──

impl World {
    pub fn world_width(&self) -> f32 {
        self.tilemap.world_width()
    }

    pub fn world_height(&self) -> f32 {
        self.tilemap.world_height()
    }

    pub fn coins_picked(&self) -> usize {
        self.coins.iter().filter(|c| c.picked).count()
    }

    /// Horizontal scroll offset for the renderer.
    pub fn camera_x(&self) -> f32 {
        let view_w = self.config.viewport_width;
        let max_x = (self.world_width() - view_w).max(0.0);
        (self.player.rect().x - view_w / 3.0).clamp(0.0, max_x)
    }

    /// No vertical scroll.
    pub fn camera_y(&self) -> f32 {
        0.0
    }
}

// ── Mutation ──

impl World {
    pub fn respawn_player(&mut self) {
        let (x, y) = self.player_spawn;
        self.player.respawn_at(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(rows: &[&str]) -> Level {
        Level::parse("t", rows, &SimConfig::default()).unwrap()
    }

    #[test]
    fn built_from_level() {
        let w = World::new(&level(&["P C E", "#####"]), &SimConfig::default());
        assert_eq!(w.coins.len(), 1);
        assert_eq!(w.enemies.len(), 1);
        assert_eq!(w.enemies[0].id, 0);
        assert!(w.enemies[0].alive);
        assert_eq!(w.score, 0);
        assert_eq!(w.lives, 3);
        assert!(w.player.alive);
        assert_eq!((w.player.rect().x, w.player.rect().y), w.player_spawn);
        assert_eq!(w.world_width(), 160.0);
        assert_eq!(w.world_height(), 64.0);
    }

    #[test]
    fn starting_lives_come_from_config() {
        let cfg = SimConfig { starting_lives: 7, ..SimConfig::default() };
        let w = World::new(&level(&["P", "#"]), &cfg);
        assert_eq!(w.lives, 7);
    }

    #[test]
    fn camera_clamps_to_world() {
        // 40 cols * 32 = 1280 px wide, viewport 960
        let mut row = String::from("P");
        row.push_str(&" ".repeat(39));
        let mut w = World::new(&level(&[&row, &"#".repeat(40)]), &SimConfig::default());

        w.player.body.rect.x = 100.0;
        assert_eq!(w.camera_x(), 0.0);

        w.player.body.rect.x = 500.0;
        assert_eq!(w.camera_x(), 500.0 - 320.0);

        w.player.body.rect.x = 1250.0;
        assert_eq!(w.camera_x(), 1280.0 - 960.0);

        assert_eq!(w.camera_y(), 0.0);
    }

    #[test]
    fn camera_on_narrow_world_stays_at_zero() {
        let mut w = World::new(&level(&["P    ", "#####"]), &SimConfig::default());
        w.player.body.rect.x = 150.0;
        assert_eq!(w.camera_x(), 0.0);
    }

    #[test]
    fn respawn_keeps_session_state() {
        let mut w = World::new(&level(&["P C E", "#####"]), &SimConfig::default());
        w.coins[0].picked = true;
        w.enemies[0].alive = false;
        w.score = 9;
        w.player.body.rect.x = 120.0;
        w.player.body.vy = 500.0;
        w.respawn_player();
        assert_eq!((w.player.rect().x, w.player.rect().y), w.player_spawn);
        assert_eq!(w.player.body.vy, 0.0);
        assert!(w.coins[0].picked);
        assert!(!w.enemies[0].alive);
        assert_eq!(w.score, 9);
    }
}
