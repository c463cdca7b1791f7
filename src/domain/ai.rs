/// Enemy AI: back-and-forth patrol.
///
/// Each step a living enemy advances `dir * speed * dt`, then probes the
/// pixel just beyond its leading edge:
///   1. **Ledge**: the cell under that pixel, one pixel below the feet,
///      is not solid.
///   2. **Wall**: a solid cell at that pixel overlaps the body's rows.
/// Either probe flips `dir` (a single flip, even when both fire).
///
/// Enemies are not run through the collision resolver and have no gravity:
/// they stay on the row they spawned on.

use super::entity::{Enemy, Facing};
use super::tilemap::Tilemap;

/// Advance one enemy by `dt` seconds and turn it if needed.
/// Returns true if the enemy turned around.
pub fn patrol(enemy: &mut Enemy, map: &Tilemap, dt: f32) -> bool {
    enemy.rect.x += enemy.dir.sign() * enemy.speed * dt;
    if ledge_ahead(enemy, map) || wall_ahead(enemy, map) {
        enemy.dir = enemy.dir.flipped();
        return true;
    }
    false
}

/// First world x outside the body in the movement direction.
fn probe_x(enemy: &Enemy) -> f32 {
    match enemy.dir {
        Facing::Right => enemy.rect.right(),
        Facing::Left => enemy.rect.x - 1.0,
    }
}

/// No floor one tile ahead and one tile down?
pub fn ledge_ahead(enemy: &Enemy, map: &Tilemap) -> bool {
    let col = map.cell_of(probe_x(enemy));
    let row = map.cell_of(enemy.rect.bottom() + 1.0);
    !map.is_solid(col, row)
}

/// Solid cell directly ahead at body height?
pub fn wall_ahead(enemy: &Enemy, map: &Tilemap) -> bool {
    let col = map.cell_of(probe_x(enemy));
    let top = map.cell_of(enemy.rect.y);
    let bottom = map.cell_of(enemy.rect.bottom() - 1.0);
    (top..=bottom).any(|row| map.is_solid(col, row))
}
