/// Keyboard state tracker and the key map for one frame of input.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement, run and jump while a key is held
///   - Edge-triggered start/quit (only fires on initial press)
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;
use super::gamepad::GamepadState;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key Map ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_RUN: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char('z'), KeyCode::Char('Z'), KeyCode::Up, KeyCode::Char(' ')];
const KEYS_START: &[KeyCode] = &[KeyCode::Enter];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Last key event that carried Shift (run modifier). Follows the same
    /// hold rules as `last_active`.
    shift_at: Option<Instant>,
    ctrl_c: bool,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            shift_at: None,
            ctrl_c: false,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.begin_frame();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;
    }

    fn apply(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
        }

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
                self.track_shift(key.modifiers, now);
            }
            KeyEventKind::Release => {}
            _ => {
                self.track_shift(key.modifiers, now);
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// A key event without Shift means Shift is up.
    fn track_shift(&mut self, modifiers: KeyModifiers, now: Instant) {
        self.shift_at = modifiers.contains(KeyModifiers::SHIFT).then_some(now);
    }

    /// Fallback for terminals without Release events.
    fn expire(&mut self, now: Instant) {
        if !self.honor_release {
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
            if self.shift_at.is_some_and(|t| now.duration_since(t) >= HOLD_TIMEOUT) {
                self.shift_at = None;
            }
        }
    }

    fn any_held(&self, codes: &[KeyCode]) -> bool {
        let now = Instant::now();
        codes.iter().any(|c| self.is_held_at(*c, now))
    }

    fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }

    /// Combine keyboard and gamepad into the abstract per-frame input.
    pub fn frame_input(&self, gp: &GamepadState) -> FrameInput {
        FrameInput {
            left: self.any_held(KEYS_LEFT) || gp.left_held(),
            right: self.any_held(KEYS_RIGHT) || gp.right_held(),
            run: self.shift_held_at(Instant::now()) || self.any_held(KEYS_RUN) || gp.run_held(),
            jump: self.any_held(KEYS_JUMP) || gp.jump_held(),
            start: self.any_pressed(KEYS_START) || gp.start_pressed(),
            quit: self.ctrl_c_pressed() || self.any_pressed(KEYS_QUIT) || gp.quit_pressed(),
        }
    }

    // ── Internal ──

    fn shift_held_at(&self, now: Instant) -> bool {
        match self.shift_at {
            Some(_) if self.honor_release => true,
            Some(t) => now.duration_since(t) < HOLD_TIMEOUT,
            None => false,
        }
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        match self.last_active.get(&code) {
            Some(_) if self.honor_release => true,
            Some(t) => now.duration_since(*t) < HOLD_TIMEOUT,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn press_is_fresh_once() {
        let mut kb = InputState::new();
        let t0 = Instant::now();
        kb.begin_frame();
        kb.apply(key(KeyCode::Enter, KeyEventKind::Press), t0);
        assert!(kb.any_pressed(KEYS_START));

        // Auto-repeat next frame is held, not fresh
        kb.begin_frame();
        kb.apply(key(KeyCode::Enter, KeyEventKind::Repeat), t0 + Duration::from_millis(30));
        assert!(!kb.any_pressed(KEYS_START));
        assert!(kb.is_held_at(KeyCode::Enter, t0 + Duration::from_millis(40)));
    }

    #[test]
    fn release_ends_hold_when_honored() {
        let mut kb = InputState::new();
        kb.honor_release = true;
        let t0 = Instant::now();
        kb.apply(key(KeyCode::Left, KeyEventKind::Press), t0);
        // No timeout expiry in enhanced mode
        kb.expire(t0 + Duration::from_secs(5));
        assert!(kb.is_held_at(KeyCode::Left, t0 + Duration::from_secs(5)));
        kb.apply(key(KeyCode::Left, KeyEventKind::Release), t0 + Duration::from_secs(5));
        assert!(!kb.is_held_at(KeyCode::Left, t0 + Duration::from_secs(5)));
    }

    #[test]
    fn hold_times_out_without_release_events() {
        let mut kb = InputState::new();
        let t0 = Instant::now();
        kb.apply(key(KeyCode::Char('z'), KeyEventKind::Press), t0);
        kb.apply(key(KeyCode::Char('z'), KeyEventKind::Release), t0);
        assert!(kb.is_held_at(KeyCode::Char('z'), t0 + Duration::from_millis(100)));
        kb.expire(t0 + HOLD_TIMEOUT);
        assert!(!kb.is_held_at(KeyCode::Char('z'), t0 + HOLD_TIMEOUT));
    }

    #[test]
    fn shift_survives_frames_without_repeat_events() {
        let mut kb = InputState::new();
        let t0 = Instant::now();
        kb.begin_frame();
        kb.apply(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT), t0);

        // Next frame: no new events, Shift+Right still within the hold window
        kb.begin_frame();
        kb.expire(t0 + Duration::from_millis(16));
        assert!(kb.shift_held_at(t0 + Duration::from_millis(16)));
        assert!(kb.is_held_at(KeyCode::Right, t0 + Duration::from_millis(16)));

        kb.expire(t0 + HOLD_TIMEOUT);
        assert!(!kb.shift_held_at(t0 + HOLD_TIMEOUT));
    }

    #[test]
    fn unshifted_event_drops_shift() {
        let mut kb = InputState::new();
        let t0 = Instant::now();
        kb.apply(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT), t0);
        kb.apply(key(KeyCode::Right, KeyEventKind::Repeat), t0 + Duration::from_millis(30));
        assert!(!kb.shift_held_at(t0 + Duration::from_millis(40)));
    }

    #[test]
    fn shift_released_with_enhanced_keys() {
        let mut kb = InputState::new();
        kb.honor_release = true;
        let t0 = Instant::now();
        kb.apply(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT), t0);
        kb.expire(t0 + Duration::from_secs(2));
        assert!(kb.shift_held_at(t0 + Duration::from_secs(2)));
        kb.apply(
            KeyEvent::new_with_kind(KeyCode::Right, KeyModifiers::NONE, KeyEventKind::Release),
            t0 + Duration::from_secs(2),
        );
        assert!(!kb.shift_held_at(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn ctrl_c_detected() {
        let mut kb = InputState::new();
        kb.begin_frame();
        kb.apply(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert!(kb.ctrl_c_pressed());
        kb.begin_frame();
        assert!(!kb.ctrl_c_pressed());
    }
}
