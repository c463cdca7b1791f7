/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound cues.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    CoinPicked { index: usize },
    EnemyStomped { id: usize },
    /// Non-fatal enemy contact; the player was sent back to the start.
    PlayerHurt { lives: u32 },
    /// Non-fatal void-fall; the player was sent back to the start.
    PlayerFell { lives: u32 },
    /// Last life lost. The session is frozen until restart.
    PlayerDied,
}
