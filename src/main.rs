/// Entry point and driver loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::Duration;

use tracing::{error, info};

use config::GameConfig;
use domain::direction::Direction;
use sim::event::GameEvent;
use sim::session::Session;
use ui::gamepad::GamepadState;
use ui::input::{Action, InputState, KeyMap};
use ui::palette::Palette;
use ui::renderer::{Hud, Renderer};
use ui::sound::SoundEngine;

/// How long one loop iteration waits for input before redrawing.
const INPUT_POLL: Duration = Duration::from_millis(50);

fn main() {
    let config = GameConfig::load();

    if let Err(e) = logging::init(&config.log) {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    let palette = Palette::from_overrides(&config.display.palette);
    let mut session = Session::from_config(&config.board);
    let mut renderer = Renderer::new(&config.display, palette);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = if config.sound { SoundEngine::new() } else { None };

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop failed: {e:#}");
        eprintln!("Game error: {e:#}");
    }

    println!();
    if session.is_terminal() {
        println!("Game over: no move left.");
    }
    println!("Largest tile: {}", session.grid().max_value());
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> anyhow::Result<()> {
    let mut kb = InputState::new(KeyMap::from_config(&config.keys));
    let mut gp = GamepadState::new(&config.gamepad);
    let mut message = String::new();

    loop {
        let hud = Hud {
            message: &message,
            game_over: session.is_terminal(),
            gamepad: gp.connected,
        };
        renderer.render(session.grid(), &hud)?;

        if session.is_terminal() {
            wait_for_any_key(&mut kb, &mut gp)?;
            return Ok(());
        }

        kb.drain_events(INPUT_POLL)?;
        gp.update();

        if kb.quit_requested() || gp.quit_pressed() {
            info!("quit requested");
            return Ok(());
        }

        for dir in pending_moves(&kb, &gp) {
            if session.is_terminal() {
                break;
            }
            let events = session.apply_move(dir);
            message = describe(&events);
            process_sound_events(sound, &events);
        }
    }
}

/// Directions requested this frame: keyboard in arrival order, then pad.
fn pending_moves(kb: &InputState, gp: &GamepadState) -> Vec<Direction> {
    let mut dirs: Vec<Direction> = kb
        .actions()
        .iter()
        .filter_map(|a| match a {
            Action::Move(d) => Some(*d),
            Action::Quit => None,
        })
        .collect();
    dirs.extend(gp.direction_pressed());
    dirs
}

fn wait_for_any_key(kb: &mut InputState, gp: &mut GamepadState) -> std::io::Result<()> {
    loop {
        kb.drain_events(INPUT_POLL)?;
        gp.update();
        if kb.any_key_pressed() || gp.any_pressed() {
            return Ok(());
        }
    }
}

/// One-line summary of a move for the message bar.
fn describe(events: &[GameEvent]) -> String {
    let merged: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::TilesMerged { value, .. } => Some(*value),
            _ => None,
        })
        .collect();

    if events.contains(&GameEvent::BoardUnchanged) {
        "Nothing moved.".to_string()
    } else if let Some(best) = merged.iter().max() {
        let n = merged.len();
        format!("{n} merge{} - new {best}", if n == 1 { "" } else { "s" })
    } else {
        String::new()
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    if events.contains(&GameEvent::GameOver) {
        sfx.play_game_over();
        return;
    }
    let best_merge = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::TilesMerged { value, .. } => Some(*value),
            _ => None,
        })
        .max();
    match best_merge {
        Some(v) => sfx.play_merge(v),
        None if events.contains(&GameEvent::BoardUnchanged) => sfx.play_blocked(),
        None => {
            if events.iter().any(|e| matches!(e, GameEvent::TileSpawned { .. })) {
                sfx.play_spawn();
            }
        }
    }
}
