/// Keyboard tracker.
///
/// Turns crossterm key events into:
///   - held state for movement and jump (sampled into a `FrameInput`)
///   - fresh presses for one-shot commands (pause, restart, quit)
///
/// Release events are honored only when keyboard enhancement is active.
/// Otherwise a key counts as released once no Press/Repeat arrived for
/// `HOLD_TIMEOUT`, which covers terminals that never report releases.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;
use crate::sim::driver::ControlEvent;

/// After this duration without a Press/Repeat event, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Bindings ──

const LEFT_KEYS: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a')];
const RIGHT_KEYS: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d')];
const JUMP_KEYS: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char(' ')];
const PAUSE_KEYS: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::F(1)];
const RESTART_KEYS: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::F(2)];
const QUIT_KEYS: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q')];

/// One-shot command from a fresh key or button press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Control(ControlEvent),
    Quit,
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,

    /// Ctrl+C seen during the last drain.
    interrupted: bool,

    /// Only true when keyboard enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            interrupted: false,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.begin_frame();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.interrupted = false;
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.interrupted = true;
            return;
        }

        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&code);
            }
            KeyEventKind::Release => {}
            _ => {
                if !self.is_held_at(code, now) {
                    self.fresh_presses.push(code);
                }
                self.last_active.insert(code, now);
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    // ── Queries ──

    /// Held movement / jump keys as a simulation input.
    pub fn frame_input(&self) -> FrameInput {
        let now = Instant::now();
        FrameInput {
            left: self.any_held_at(LEFT_KEYS, now),
            right: self.any_held_at(RIGHT_KEYS, now),
            up: self.any_held_at(JUMP_KEYS, now),
        }
    }

    /// Commands from keys first pressed this frame, in binding order.
    pub fn commands(&self) -> Vec<Command> {
        let mut out = Vec::new();
        if self.interrupted || self.any_pressed(QUIT_KEYS) {
            out.push(Command::Quit);
        }
        if self.any_pressed(PAUSE_KEYS) {
            out.push(Command::Control(ControlEvent::TogglePause));
        }
        if self.any_pressed(RESTART_KEYS) {
            out.push(Command::Control(ControlEvent::Restart));
        }
        out
    }

    fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    fn any_held_at(&self, codes: &[KeyCode], now: Instant) -> bool {
        codes.iter().any(|c| self.is_held_at(*c, now))
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active.get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

/// Letters are bound lowercase; Shift or Caps Lock must not unbind them.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    fn press(s: &mut InputState, code: KeyCode, now: Instant) {
        s.record(key(code, KeyEventKind::Press), now);
    }

    #[test]
    fn held_keys_map_to_frame_input() {
        let mut s = InputState::new();
        let now = Instant::now();
        s.begin_frame();
        press(&mut s, KeyCode::Char('a'), now);
        press(&mut s, KeyCode::Up, now);
        let input = s.frame_input();
        assert!(input.left && input.up && !input.right);
    }

    #[test]
    fn uppercase_letters_are_bound() {
        let mut s = InputState::new();
        s.begin_frame();
        press(&mut s, KeyCode::Char('D'), Instant::now());
        assert!(s.frame_input().right);
    }

    #[test]
    fn keys_expire_without_release_events() {
        let mut s = InputState::new();
        let t0 = Instant::now();
        press(&mut s, KeyCode::Right, t0);
        s.expire(t0 + HOLD_TIMEOUT);
        assert!(!s.any_held_at(RIGHT_KEYS, t0 + HOLD_TIMEOUT));
    }

    #[test]
    fn release_honored_only_with_enhancement() {
        let mut s = InputState::new();
        let now = Instant::now();
        press(&mut s, KeyCode::Left, now);
        s.record(key(KeyCode::Left, KeyEventKind::Release), now);
        assert!(s.any_held_at(LEFT_KEYS, now));

        s.honor_release = true;
        s.record(key(KeyCode::Left, KeyEventKind::Release), now);
        assert!(!s.any_held_at(LEFT_KEYS, now));
    }

    #[test]
    fn repeats_are_not_fresh_presses() {
        let mut s = InputState::new();
        let now = Instant::now();
        s.begin_frame();
        press(&mut s, KeyCode::Char('p'), now);
        assert_eq!(s.commands(), vec![Command::Control(ControlEvent::TogglePause)]);

        s.begin_frame();
        s.record(key(KeyCode::Char('p'), KeyEventKind::Repeat), now + Duration::from_millis(30));
        assert!(s.commands().is_empty());
    }

    #[test]
    fn ctrl_c_quits() {
        let mut s = InputState::new();
        s.begin_frame();
        s.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert_eq!(s.commands(), vec![Command::Quit]);
        // Plain 'c' is not bound to anything
        s.begin_frame();
        press(&mut s, KeyCode::Char('c'), Instant::now());
        assert!(s.commands().is_empty());
    }

    #[test]
    fn restart_and_quit_keys() {
        let mut s = InputState::new();
        let now = Instant::now();
        s.begin_frame();
        press(&mut s, KeyCode::F(2), now);
        press(&mut s, KeyCode::Esc, now);
        assert_eq!(s.commands(), vec![Command::Quit, Command::Control(ControlEvent::Restart)]);
    }
}
