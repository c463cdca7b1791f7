/// The step function: advances the world by `dt` seconds.
///
/// Processing order:
///   1. Horizontal intent → vx, facing
///   2. Jump (only from the ground)
///   3. Gravity
///   4. Collision: X pass, then Y pass
///   5. Coin pickup
///   6. Enemies: patrol, then player contact (stomp / damage)
///   7. Void-fall
///
/// A dead player freezes the world: the step is a no-op until restart.
/// Once the player dies mid-step nothing else touches it that step.

use tracing::{debug, info};

use crate::domain::ai;
use crate::domain::entity::{Facing, FrameInput};
use crate::domain::physics;
use crate::domain::rules::{self, Contact};
use super::event::GameEvent;
use super::world::World;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World, input: FrameInput, dt: f32) -> Vec<GameEvent> {
    if !world.player.alive { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();

    resolve_intent(world, input);
    resolve_jump(world, input, &mut events);
    resolve_gravity(world, dt);
    resolve_movement(world, dt);
    resolve_coin_pickup(world, &mut events);
    resolve_enemies(world, dt, &mut events);
    resolve_void_fall(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player motion
// ══════════════════════════════════════════════════════════════

fn resolve_intent(world: &mut World, input: FrameInput) {
    let dir = input.horizontal();
    world.player.body.vx = dir * world.config.move_speed;
    if dir < 0.0 {
        world.player.facing = Facing::Left;
    } else if dir > 0.0 {
        world.player.facing = Facing::Right;
    }
}

fn resolve_jump(world: &mut World, input: FrameInput, events: &mut Vec<GameEvent>) {
    let body = &mut world.player.body;
    if input.up && body.on_ground {
        body.vy = -world.config.jump_speed;
        body.on_ground = false;
        events.push(GameEvent::Jumped);
    }
}

fn resolve_gravity(world: &mut World, dt: f32) {
    world.player.body.vy += world.config.gravity * dt;
}

fn resolve_movement(world: &mut World, dt: f32) {
    let body = &mut world.player.body;
    let (dx, dy) = (body.vx * dt, body.vy * dt);
    physics::move_x(body, dx, &world.tilemap);
    physics::move_y(body, dy, &world.tilemap);
}

// ══════════════════════════════════════════════════════════════
// Pickups and contacts
// ══════════════════════════════════════════════════════════════

fn resolve_coin_pickup(world: &mut World, events: &mut Vec<GameEvent>) {
    for (index, coin) in world.coins.iter_mut().enumerate() {
        if rules::touches_coin(&world.player, coin) {
            coin.picked = true;
            world.score += rules::COIN_SCORE;
            events.push(GameEvent::CoinPicked { index });
        }
    }
}

/// Patrol every living enemy, then check it against the player.
/// At most one life is lost here per step.
fn resolve_enemies(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) {
    let mut hurt = false;

    for i in 0..world.enemies.len() {
        if !world.enemies[i].alive { continue; }
        ai::patrol(&mut world.enemies[i], &world.tilemap, dt);

        if hurt || !world.player.alive { continue; }

        match rules::classify_contact(&world.player, &world.enemies[i]) {
            Some(Contact::Stomp) => {
                let enemy = &mut world.enemies[i];
                enemy.alive = false;
                world.player.body.vy = -world.config.jump_speed * rules::STOMP_BOUNCE;
                world.score += rules::STOMP_SCORE;
                debug!(id = enemy.id, score = world.score, "enemy stomped");
                events.push(GameEvent::EnemyStomped { id: enemy.id });
            }
            Some(Contact::Damage) => {
                hurt = true;
                lose_life(world, LifeLoss::Enemy, events);
            }
            None => {}
        }
    }
}

fn resolve_void_fall(world: &mut World, events: &mut Vec<GameEvent>) {
    if !world.player.alive { return; }
    if rules::fell_into_void(&world.player, world.world_height(), world.config.void_margin) {
        lose_life(world, LifeLoss::Void, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Life loss
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
enum LifeLoss {
    Enemy,
    Void,
}

/// Take one life. The last one kills the player in place; otherwise
/// the player goes back to the start.
fn lose_life(world: &mut World, cause: LifeLoss, events: &mut Vec<GameEvent>) {
    if !world.player.alive { return; }

    world.lives = world.lives.saturating_sub(1);
    if world.lives == 0 {
        world.player.alive = false;
        info!(?cause, score = world.score, "player died");
        events.push(GameEvent::PlayerDied);
        return;
    }

    world.respawn_player();
    info!(?cause, lives = world.lives, "life lost");
    events.push(match cause {
        LifeLoss::Enemy => GameEvent::PlayerHurt { lives: world.lives },
        LifeLoss::Void => GameEvent::PlayerFell { lives: world.lives },
    });
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
