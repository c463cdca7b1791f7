/// Game loop driver: wall clock → clamped dt → step → render.
///
/// ## Per frame
///   1. `dt = min(max_frame_dt, now - last_frame)`; the first frame gets 0.
///   2. Step the world unless paused or the player is dead.
///   3. Always hand a snapshot to the render callback.
///
/// ## Control events
/// ┌─────────────┬────────────────────────────────────────────────┐
/// │ Event       │ Effect                                         │
/// ├─────────────┼────────────────────────────────────────────────┤
/// │ TogglePause │ flip `paused`; time keeps advancing            │
/// │ Restart     │ rebuild world from the stored level, unpause   │
/// └─────────────┴────────────────────────────────────────────────┘
///
/// Time is passed in as a `Duration` since an arbitrary origin, so the
/// driver never reads a clock itself.

use std::time::Duration;

use tracing::info;

use crate::config::SimConfig;
use crate::domain::entity::FrameInput;

use super::event::GameEvent;
use super::level::Level;
use super::snapshot::Snapshot;
use super::step;
use super::world::World;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ControlEvent {
    TogglePause,
    Restart,
}

pub struct Driver {
    level: Level,
    config: SimConfig,
    world: World,
    paused: bool,
    last_frame: Option<Duration>,
}

impl Driver {
    pub fn new(level: Level, config: SimConfig) -> Self {
        let world = World::new(&level, &config);
        info!(level = %level.name, lives = world.lives, "session started");
        Driver {
            level,
            config,
            world,
            paused: false,
            last_frame: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::of(&self.world, &self.level.name, self.paused)
    }

    pub fn handle(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::TogglePause => {
                self.paused = !self.paused;
                info!(paused = self.paused, "pause toggled");
            }
            ControlEvent::Restart => {
                self.world = World::new(&self.level, &self.config);
                self.paused = false;
                info!(level = %self.level.name, "session restarted");
            }
        }
    }

    /// Clamped seconds since the previous frame.
    fn frame_dt(&mut self, now: Duration) -> f32 {
        let dt = match self.last_frame {
            Some(last) => now.saturating_sub(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_frame = Some(now);
        dt.min(self.config.max_frame_dt)
    }

    /// Run one frame. Returns the step's events (empty when nothing ran).
    pub fn frame<E, R>(&mut self, now: Duration, input: FrameInput, mut render: R) -> Result<Vec<GameEvent>, E>
    where
        R: FnMut(&Snapshot<'_>) -> Result<(), E>,
    {
        let dt = self.frame_dt(now);

        let events = if self.paused || !self.world.player.alive {
            vec![]
        } else {
            step::step(&mut self.world, input, dt)
        };

        render(&self.snapshot())?;
        Ok(events)
    }
}
