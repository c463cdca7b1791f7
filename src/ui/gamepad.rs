/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick X  →  Run left / right
///   D-pad Up / A / B      →  Jump (held)
///   Start                 →  Pause
///   Y                     →  Restart
///   Select                →  Quit
///
/// Without the `gamepad` feature the tracker exists but never reports
/// any input.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::{debug, warn};

use crate::config::GamepadConfig;
use crate::domain::entity::FrameInput;
use crate::sim::driver::ControlEvent;

use super::input::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Face, shoulder and menu buttons, by position on the pad.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Btn {
    South,
    East,
    West,
    North,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    Start,
    Select,
}

/// Config spellings for each button, matched case-insensitively.
const NAMES: [(Btn, &[&str]); 10] = [
    (Btn::South, &["A", "SOUTH"]),
    (Btn::East, &["B", "EAST"]),
    (Btn::West, &["X", "WEST"]),
    (Btn::North, &["Y", "NORTH"]),
    (Btn::LeftBumper, &["L1", "LB", "LEFTTRIGGER"]),
    (Btn::RightBumper, &["R1", "RB", "RIGHTTRIGGER"]),
    (Btn::LeftTrigger, &["L2", "LT", "LEFTTRIGGER2"]),
    (Btn::RightTrigger, &["R2", "RT", "RIGHTTRIGGER2"]),
    (Btn::Start, &["START"]),
    (Btn::Select, &["SELECT", "BACK"]),
];

impl Btn {
    fn bit(self) -> u16 {
        1 << self as u16
    }

    fn parse(name: &str) -> Option<Btn> {
        NAMES.iter()
            .find(|(_, spellings)| spellings.iter().any(|s| s.eq_ignore_ascii_case(name)))
            .map(|&(btn, _)| btn)
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        Some(match btn {
            Button::South => Btn::South,
            Button::East => Btn::East,
            Button::West => Btn::West,
            Button::North => Btn::North,
            Button::LeftTrigger => Btn::LeftBumper,
            Button::RightTrigger => Btn::RightBumper,
            Button::LeftTrigger2 => Btn::LeftTrigger,
            Button::RightTrigger2 => Btn::RightTrigger,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            _ => return None,
        })
    }
}

/// Set of buttons bound to one action.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Binding(u16);

impl Binding {
    fn of(btns: &[Btn]) -> Self {
        Binding(btns.iter().fold(0, |mask, b| mask | b.bit()))
    }

    /// Unknown names are skipped; nothing valid keeps `fallback`.
    fn parse(names: &[String], fallback: Binding) -> Self {
        let mask = names.iter().filter_map(|n| Btn::parse(n)).fold(0, |mask, b| mask | b.bit());
        if mask == 0 { fallback } else { Binding(mask) }
    }

    fn hits(self, buttons: u16) -> bool {
        self.0 & buttons != 0
    }
}

#[derive(Debug, PartialEq)]
struct Bindings {
    jump: Binding,
    pause: Binding,
    restart: Binding,
    quit: Binding,
}

impl Bindings {
    fn from_config(cfg: &GamepadConfig) -> Self {
        let d = Bindings::default();
        Bindings {
            jump: Binding::parse(&cfg.jump, d.jump),
            pause: Binding::parse(&cfg.pause, d.pause),
            restart: Binding::parse(&cfg.restart, d.restart),
            quit: Binding::parse(&cfg.quit, d.quit),
        }
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Bindings {
            jump: Binding::of(&[Btn::South, Btn::East]),
            pause: Binding::of(&[Btn::Start]),
            restart: Binding::of(&[Btn::North]),
            quit: Binding::of(&[Btn::Select]),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons currently down, one bit per `Btn`.
    held: u16,
    /// Buttons that went down since the last `update`.
    pressed: u16,
    /// D-pad directions currently down.
    dpad: FrameInput,
    stick_x: f32,

    bindings: Bindings,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                debug!(has_pad, "gamepad backend ready");
                (Some(g), has_pad)
            }
            Err(e) => {
                warn!(error = %e, "gamepad backend unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            held: 0,
            pressed: 0,
            dpad: FrameInput::default(),
            stick_x: 0.0,
            bindings: Bindings::from_config(cfg),
            connected,
        }
    }

    /// Start a new frame: forget last frame's presses, then poll.
    pub fn update(&mut self) {
        self.pressed = 0;

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else { return };
        let events: Vec<EventType> = std::iter::from_fn(|| gilrs.next_event()).map(|e| e.event).collect();

        for event in events {
            match event {
                EventType::ButtonPressed(btn, _) => self.on_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.on_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    self.connected = true;
                    self.stick_x = value;
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    debug!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn on_button(&mut self, btn: Button, down: bool) {
        self.connected = true;
        match btn {
            Button::DPadUp => self.dpad.up = down,
            Button::DPadLeft => self.dpad.left = down,
            Button::DPadRight => self.dpad.right = down,
            other => {
                if let Some(b) = Btn::from_gilrs(other) {
                    self.set_btn(b, down);
                }
            }
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set_btn(&mut self, btn: Btn, down: bool) {
        if down {
            self.pressed |= btn.bit() & !self.held;
            self.held |= btn.bit();
        } else {
            self.held &= !btn.bit();
        }
    }

    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            left: self.dpad.left || self.stick_x < -STICK_DEADZONE,
            right: self.dpad.right || self.stick_x > STICK_DEADZONE,
            up: self.dpad.up || self.bindings.jump.hits(self.held),
        }
    }

    /// Quit first, then pause, then restart.
    pub fn commands(&self) -> Vec<Command> {
        let b = &self.bindings;
        [
            (b.quit, Command::Quit),
            (b.pause, Command::Control(ControlEvent::TogglePause)),
            (b.restart, Command::Control(ControlEvent::Restart)),
        ]
        .into_iter()
        .filter(|(binding, _)| binding.hits(self.pressed))
        .map(|(_, command)| command)
        .collect()
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.held = 0;
        self.pressed = 0;
        self.dpad = FrameInput::default();
        self.stick_x = 0.0;
    }
}
