/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::entity::FrameInput;
use sim::driver::Driver;
use sim::level::Level;
use ui::gamepad::GamepadState;
use ui::input::{Command, InputState};
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_ENV: &str = "TILEHOP_LOG";

fn main() -> ExitCode {
    // Config problems go to stderr: the log file is not known yet.
    let config = tracing::subscriber::with_default(stderr_subscriber(), GameConfig::load);

    if let Err(e) = init_logging(&config) {
        eprintln!("Could not open log file {}: {e}", config.log_file.display());
    }

    if let Err(e) = config.sim.validate() {
        error!(error = %e, "invalid configuration");
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    let level = match Level::from_config(config.level_file.as_deref(), &config.sim) {
        Ok(level) => level,
        Err(e) => {
            error!(error = %e, "level load failed");
            eprintln!("Level error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut driver = Driver::new(level, config.sim.clone());
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }
    let enhanced = push_key_release_reporting();

    let sound = SoundEngine::new();

    let result = game_loop(&mut driver, &mut renderer, sound.as_ref(), &config, enhanced);

    if enhanced {
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    let world = driver.world();
    info!(score = world.score, coins = world.coins_picked(), "session ended");
    println!();
    println!("Thanks for playing Tilehop!");
    println!("Final Score: {}", world.score);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "game loop failed");
            eprintln!("Game error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn stderr_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish()
}

/// The renderer owns the terminal, so the session log goes to a file.
fn init_logging(config: &GameConfig) -> std::io::Result<()> {
    let file = File::create(&config.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

/// Ask the terminal for key Release events. Returns true when enabled.
fn push_key_release_reporting() -> bool {
    if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
        return false;
    }
    let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
    match execute!(std::io::stdout(), PushKeyboardEnhancementFlags(flags)) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "keyboard enhancement refused");
            false
        }
    }
}

fn game_loop(
    driver: &mut Driver,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    honor_release: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new(&config.gamepad);
    let origin = Instant::now();

    info!(gamepad = gp.connected, sound = sound.is_some(), honor_release, "game loop started");

    loop {
        kb.drain_events();
        gp.update();

        let commands = kb.commands().into_iter().chain(gp.commands());
        let mut quit = false;
        for command in commands {
            match command {
                Command::Quit => quit = true,
                Command::Control(event) => driver.handle(event),
            }
        }
        if quit {
            break;
        }

        let input = merge_input(kb.frame_input(), gp.frame_input());
        let events = driver.frame(origin.elapsed(), input, |snap| renderer.render(snap))?;
        sound::play_events(sound, &events);

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn merge_input(a: FrameInput, b: FrameInput) -> FrameInput {
    FrameInput {
        left: a.left || b.left,
        right: a.right || b.right,
        up: a.up || b.up,
    }
}
