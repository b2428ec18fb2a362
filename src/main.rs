/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use config::GameConfig;
use error::EngineError;
use sim::step;
use sim::world::Session;
use ui::draw::Scene;
use ui::framebuffer::Framebuffer;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

fn main() {
    init_logging();
    let config = GameConfig::load();

    let mut session = Session::new(config.rules);
    let mut renderer = Renderer::new();

    let enhanced_keys = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            tracing::error!(error = %e, "terminal init failed");
            // Raw mode may already be on
            let _ = renderer.cleanup();
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let sound = SoundEngine::new(&config.sound);
    tracing::info!(enabled = sound.is_enabled(), "sound engine ready");

    let result = game_loop(&mut session, &mut renderer, &sound, &config, enhanced_keys);

    if let Err(e) = renderer.cleanup() {
        tracing::error!(error = %e, "terminal cleanup failed");
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        tracing::error!(error = %e, "game loop aborted");
        eprintln!("Game error: {e}");
    }

    tracing::info!(score = session.score, "exit");
    println!();
    println!("Thanks for playing Koopa Engine!");
    println!("Final Score: {}", session.score);
}

/// The terminal belongs to the game, so logs go to a file.
/// `KOOPA_LOG` overrides the path; `RUST_LOG` the filter.
fn init_logging() {
    let path = std::env::var_os("KOOPA_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("koopa-engine.log"));
    let Ok(file) = File::create(&path) else { return };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    tracing::info!(log = %path.display(), "koopa-engine starting");
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: &SoundEngine,
    config: &GameConfig,
    enhanced_keys: bool,
) -> Result<(), EngineError> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced_keys;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    tracing::info!(connected = gp.connected, "gamepad ready");

    let mut scene = Scene::new(config.display.fps);
    let mut fb = Framebuffer::new();

    let frame_time = Duration::from_secs_f64(1.0 / config.display.fps.max(1) as f64);
    let started = Instant::now();
    let mut next_frame = started;

    loop {
        kb.drain_events();
        gp.update();

        let input = kb.frame_input(&gp);
        if input.quit {
            tracing::info!(phase = ?session.phase, "quit requested");
            break;
        }

        for event in step::step(session, input) {
            tracing::debug!(?event, "game event");
            sound.play_event(&event);
        }

        scene.compose(session, started.elapsed(), &mut fb);
        renderer.present(&fb, config.display.max_scale)?;

        // Fixed-rate pacing; a late frame resyncs instead of bursting.
        next_frame += frame_time;
        let now = Instant::now();
        if next_frame > now {
            std::thread::sleep(next_frame - now);
        } else {
            next_frame = now;
        }
    }

    Ok(())
}
