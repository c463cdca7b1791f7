/// Read-only view of a world for the renderer.

use crate::domain::entity::{Coin, Enemy, Player};
use crate::domain::tilemap::Tilemap;

use super::level::Spawn;
use super::world::World;

#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub level_name: &'a str,
    pub tilemap: &'a Tilemap,
    pub coins: &'a [Coin],
    pub enemies: &'a [Enemy],
    pub goals: &'a [Spawn],
    pub player: &'a Player,
    pub camera_x: f32,
    pub camera_y: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub score: u32,
    pub lives: u32,
    pub paused: bool,
    pub alive: bool,
}

impl<'a> Snapshot<'a> {
    pub fn of(world: &'a World, level_name: &'a str, paused: bool) -> Self {
        Snapshot {
            level_name,
            tilemap: &world.tilemap,
            coins: &world.coins,
            enemies: &world.enemies,
            goals: &world.goals,
            player: &world.player,
            camera_x: world.camera_x(),
            camera_y: world.camera_y(),
            viewport_width: world.config.viewport_width,
            viewport_height: world.config.viewport_height,
            score: world.score,
            lives: world.lives,
            paused,
            alive: world.player.alive,
        }
    }

    pub fn coins_left(&self) -> usize {
        self.coins.iter().filter(|c| !c.picked).count()
    }
}
