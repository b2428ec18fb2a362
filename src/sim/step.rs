/// The step function: advances the session by one frame.
///
/// ## Phase machine
/// ```text
///   TITLE ──start──▶ GAME ──time out / lives 0──▶ GAMEOVER ──start──▶ TITLE
///                     │
///                     └──last level of last world cleared──▶ WIN ──start──▶ TITLE
/// ```
/// `start` arrives edge-triggered, so one held key never chains two
/// transitions.
///
/// ## GAME processing order
///   1. Player physics (input, jump, gravity, ground, bounds)
///   2. Per enemy: physics, then contact with the player
///      (stops early once lives hit 0)
///   3. Camera follow
///   4. Timer (one tick per 60 level frames)
///   5. Goal line check → next level / next world / WIN

use crate::domain::entity::FrameInput;
use crate::domain::physics;
use crate::domain::rules::{self, Contact, STOMP_SCORE};
use super::event::GameEvent;
use super::level::{LEVELS_PER_WORLD, WORLD_COUNT};
use super::world::{Phase, Session, FRAMES_PER_SECOND};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(session: &mut Session, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    session.frame_counter += 1;

    match session.phase {
        Phase::Title => step_title(session, input, &mut events),
        Phase::Game => step_game(session, input, &mut events),
        Phase::GameOver | Phase::Win => {
            if input.start {
                session.set_phase(Phase::Title);
            }
        }
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Title
// ══════════════════════════════════════════════════════════════

fn step_title(session: &mut Session, input: FrameInput, events: &mut Vec<GameEvent>) {
    let f = session.frame_counter;
    session.title_y = ((f as f64 * 0.05).sin() * 10.0) as i32;
    session.title_flash = (f / 15) % 2 == 1;

    if input.start {
        session.set_phase(Phase::Game);
        session.start_game(events);
    }
}

// ══════════════════════════════════════════════════════════════
// Game
// ══════════════════════════════════════════════════════════════

fn step_game(session: &mut Session, input: FrameInput, events: &mut Vec<GameEvent>) {
    if session.level.is_none() {
        session.start_game(events);
    }

    if resolve_entities(session, &input, events) {
        return;
    }
    resolve_camera(session);
    if resolve_timer(session, events) {
        return;
    }
    resolve_goal(session, events);
}

/// Player then enemies. Returns true if the game ended.
fn resolve_entities(session: &mut Session, input: &FrameInput, events: &mut Vec<GameEvent>) -> bool {
    let Session { level, player, score, .. } = session;
    let Some(level) = level.as_mut() else { return false };
    let bounds = level.bounds();

    if physics::update_player(player, input, &bounds).jumped {
        events.push(GameEvent::Jump);
    }

    let mut game_over = false;
    for enemy in level.enemies.iter_mut() {
        if !enemy.alive {
            continue;
        }
        physics::update_enemy(enemy, &bounds);
        match rules::interact(player, enemy) {
            Some(Contact::Stomp) => {
                *score += STOMP_SCORE;
                events.push(GameEvent::Stomp);
            }
            Some(Contact::Hurt) => {
                events.push(GameEvent::Hurt);
                if player.lives == 0 {
                    game_over = true;
                    break;
                }
            }
            None => {}
        }
    }

    if game_over {
        events.push(GameEvent::GameOver);
        session.set_phase(Phase::GameOver);
    }
    game_over
}

fn resolve_camera(session: &mut Session) {
    if let Some(level) = &session.level {
        session.camera.follow(session.player.body.x, level.pixel_width());
    }
}

/// Returns true if time ran out.
fn resolve_timer(session: &mut Session, events: &mut Vec<GameEvent>) -> bool {
    session.level_frames += 1;
    if session.level_frames % FRAMES_PER_SECOND != 0 {
        return false;
    }
    session.time = session.time.saturating_sub(1);
    if session.time == 0 {
        events.push(GameEvent::GameOver);
        session.set_phase(Phase::GameOver);
        return true;
    }
    false
}

fn resolve_goal(session: &mut Session, events: &mut Vec<GameEvent>) {
    let reached = session
        .level
        .as_ref()
        .is_some_and(|level| session.player.body.x > level.goal_x());
    if !reached {
        return;
    }

    events.push(GameEvent::LevelCleared);
    session.level_num += 1;
    if session.level_num >= LEVELS_PER_WORLD {
        session.level_num = 0;
        session.world += 1;
        if session.world >= WORLD_COUNT {
            events.push(GameEvent::Win);
            session.set_phase(Phase::Win);
            return;
        }
    }
    session.start_level(events);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
