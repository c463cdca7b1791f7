/// Contact rules: pure predicates over players, coins and enemies.
///
/// These decide WHAT a contact means; `sim::step` applies the outcome.
///
/// ## Player ↔ Enemy
/// ┌─────────────────────────────────────────────┬───────────┐
/// │ Condition (boxes overlap)                    │ Outcome   │
/// ├─────────────────────────────────────────────┼───────────┤
/// │ vy > 0 AND bottom < enemy center_y + 16      │ Stomp     │
/// │ otherwise                                    │ Damage    │
/// └─────────────────────────────────────────────┴───────────┘
///
/// Exactly one outcome per overlap; it depends only on the sign of the
/// player's vertical velocity and the 16px band around the enemy's center.
///
/// ## Player ↔ Coin
/// A fixed 20×20 box centered on the coin; any overlap picks it up.

use super::entity::{Coin, Enemy, Player, Rect};

/// Side of the square pickup box around a coin's center.
pub const COIN_PICKUP_SIZE: f32 = 20.0;
/// How far below an enemy's vertical center the player's feet may be
/// and still count as landing on it.
pub const STOMP_TOLERANCE: f32 = 16.0;
/// Stomp bounce as a fraction of the jump speed.
pub const STOMP_BOUNCE: f32 = 0.5;

pub const COIN_SCORE: u32 = 1;
pub const STOMP_SCORE: u32 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Stomp,
    Damage,
}

pub fn coin_pickup_box(coin: &Coin) -> Rect {
    Rect::centered(coin.x, coin.y, COIN_PICKUP_SIZE, COIN_PICKUP_SIZE)
}

/// Would the player collect this coin right now?
pub fn touches_coin(player: &Player, coin: &Coin) -> bool {
    !coin.picked && player.rect().overlaps(&coin_pickup_box(coin))
}

/// Classify a player/enemy contact. `None` when the boxes do not overlap.
pub fn classify_contact(player: &Player, enemy: &Enemy) -> Option<Contact> {
    let p = player.rect();
    if !p.overlaps(&enemy.rect) {
        return None;
    }
    let falling = player.body.vy > 0.0;
    let near_top = p.bottom() < enemy.rect.center_y() + STOMP_TOLERANCE;
    if falling && near_top {
        Some(Contact::Stomp)
    } else {
        Some(Contact::Damage)
    }
}

/// Has the player dropped out of the world?
pub fn fell_into_void(player: &Player, world_height: f32, void_margin: f32) -> bool {
    player.rect().y > world_height + void_margin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(x: f32, y: f32, vy: f32) -> Player {
        let mut p = Player::new(x, y, 24.0, 30.0);
        p.body.vy = vy;
        p
    }

    fn enemy_at(x: f32, y: f32) -> Enemy {
        Enemy::new(0, x, y, 28.0, 28.0, 60.0)
    }

    // ── Coins ──

    #[test]
    fn coin_box_is_20px_around_center() {
        let c = Coin::new(1, 1, 32.0); // center (48, 48)
        assert_eq!(coin_pickup_box(&c), Rect::new(38.0, 38.0, 20.0, 20.0));
    }

    #[test]
    fn coin_touch_and_miss() {
        let c = Coin::new(1, 1, 32.0);
        // Right edge at 38 → just touching, no overlap
        assert!(!touches_coin(&player_at(14.0, 30.0, 0.0), &c));
        assert!(touches_coin(&player_at(15.0, 30.0, 0.0), &c));
    }

    #[test]
    fn picked_coin_is_never_touched() {
        let mut c = Coin::new(1, 1, 32.0);
        c.picked = true;
        assert!(!touches_coin(&player_at(36.0, 33.0, 0.0), &c));
    }

    // ── Enemies ──

    #[test]
    fn no_overlap_no_contact() {
        let e = enemy_at(100.0, 100.0);
        assert_eq!(classify_contact(&player_at(0.0, 0.0, 100.0), &e), None);
    }

    #[test]
    fn falling_onto_top_is_stomp() {
        let e = enemy_at(100.0, 100.0); // center_y = 114
        // bottom = 105: 5px into the enemy
        let p = player_at(100.0, 75.0, 300.0);
        assert_eq!(classify_contact(&p, &e), Some(Contact::Stomp));
    }

    #[test]
    fn rising_into_enemy_is_damage() {
        let e = enemy_at(100.0, 100.0);
        let p = player_at(100.0, 75.0, -300.0);
        assert_eq!(classify_contact(&p, &e), Some(Contact::Damage));
    }

    #[test]
    fn resting_contact_is_damage() {
        let e = enemy_at(100.0, 100.0);
        let p = player_at(90.0, 75.0, 0.0);
        assert_eq!(classify_contact(&p, &e), Some(Contact::Damage));
    }

    #[test]
    fn stomp_band_edge() {
        let e = enemy_at(100.0, 100.0); // center 114 → band ends at 130
        // bottom = 129.5 → inside band
        assert_eq!(classify_contact(&player_at(100.0, 99.5, 10.0), &e), Some(Contact::Stomp));
        // bottom = 130 → outside band
        assert_eq!(classify_contact(&player_at(100.0, 100.0, 10.0), &e), Some(Contact::Damage));
    }

    #[test]
    fn void_threshold() {
        assert!(!fell_into_void(&player_at(0.0, 820.0, 0.0), 320.0, 500.0));
        assert!(fell_into_void(&player_at(0.0, 820.5, 0.0), 320.0, 500.0));
    }
}
