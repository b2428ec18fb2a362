/// Session: the complete snapshot of a running game.
///
/// ## Ownership
///
/// The session owns the current `Level` (terrain + enemies), the `Player`
/// and the `Camera`. Score, world/level indices and the timer are session
/// state; lives live on the Player, which is rebuilt at every level start.
///
/// ## Camera
///
/// A single horizontal scroll offset in world pixels:
///   - target  = player.x − VIEW_WIDTH / 2
///   - camera += (target − camera) · 0.1      (exponential tracking)
///   - clamp to [0, max(0, level_px − VIEW_WIDTH)]
///   - renderer uses `offset()`: the camera truncated to whole pixels

use crate::config::RulesConfig;
use crate::domain::entity::Player;
use super::event::GameEvent;
use super::level::Level;

/// Logical viewport, in pixels.
pub const VIEW_WIDTH: usize = 256;
pub const VIEW_HEIGHT: usize = 240;

pub const CAMERA_SMOOTHING: f32 = 0.1;

/// Frames per timer tick.
pub const FRAMES_PER_SECOND: u64 = 60;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Game,
    GameOver,
    Win,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera {
    pub x: f32,
}

impl Camera {
    pub fn new() -> Self {
        Camera { x: 0.0 }
    }

    /// One smoothing step toward the player, then clamp to the level.
    pub fn follow(&mut self, target_x: f32, level_width_px: f32) {
        let target = target_x - (VIEW_WIDTH / 2) as f32;
        self.x += (target - self.x) * CAMERA_SMOOTHING;
        let max_x = (level_width_px - VIEW_WIDTH as f32).max(0.0);
        self.x = self.x.clamp(0.0, max_x);
    }

    pub fn reset(&mut self) {
        self.x = 0.0;
    }

    /// Whole-pixel scroll used for drawing.
    #[inline]
    pub fn offset(&self) -> i32 {
        self.x as i32
    }
}

pub struct Session {
    pub phase: Phase,
    pub world: u32,
    pub level_num: u32,
    /// `None` until the first game starts.
    pub level: Option<Level>,
    pub player: Player,
    pub camera: Camera,

    pub score: u32,
    pub time: u32,
    /// Frames since process start; drives title animation.
    pub frame_counter: u64,
    /// Frames since the current level started; drives the timer.
    pub level_frames: u64,

    // ── Title animation ──
    pub title_y: i32,
    pub title_flash: bool,

    pub rules: RulesConfig,
}

impl Session {
    pub fn new(rules: RulesConfig) -> Self {
        Session {
            phase: Phase::Title,
            world: 0,
            level_num: 0,
            level: None,
            player: Player::new(rules.start_lives),
            camera: Camera::new(),
            score: 0,
            time: rules.time_limit,
            frame_counter: 0,
            level_frames: 0,
            title_y: 0,
            title_flash: false,
            rules,
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            tracing::info!(from = ?self.phase, to = ?phase, world = self.world, level = self.level_num, score = self.score, "phase change");
            self.phase = phase;
        }
    }

    /// Fresh game from world 0, level 0.
    pub fn start_game(&mut self, events: &mut Vec<GameEvent>) {
        self.world = 0;
        self.level_num = 0;
        self.score = 0;
        self.start_level(events);
    }

    /// Build the level for the current (world, level_num) and reset
    /// per-level state. The player starts over with full lives; score,
    /// world and level index are kept.
    pub fn start_level(&mut self, events: &mut Vec<GameEvent>) {
        self.level = Some(Level::new(self.world, self.level_num));
        self.player = Player::new(self.rules.start_lives);
        self.camera.reset();
        self.time = self.rules.time_limit;
        self.level_frames = 0;
        events.push(GameEvent::LevelStart { world: self.world, level: self.level_num });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PLAYER_SPAWN;

    #[test]
    fn camera_stays_in_bounds_for_any_player_x() {
        let level_px = 2048.0;
        for px in [-500.0, 0.0, 32.0, 128.0, 1000.0, 1968.0, 2048.0, 5000.0] {
            let mut cam = Camera::new();
            for _ in 0..500 {
                cam.follow(px, level_px);
                assert!(cam.x >= 0.0 && cam.x <= level_px - VIEW_WIDTH as f32, "px={px} cam={}", cam.x);
            }
        }
    }

    #[test]
    fn camera_converges_toward_target() {
        let mut cam = Camera::new();
        cam.follow(1128.0, 2048.0);
        assert!((cam.x - 100.0).abs() < 1e-4);
        for _ in 0..300 {
            cam.follow(1128.0, 2048.0);
        }
        assert!((cam.x - 1000.0).abs() < 0.01);
    }

    #[test]
    fn offset_truncates() {
        assert_eq!(Camera { x: 123.9 }.offset(), 123);
        assert_eq!(Camera { x: 0.4 }.offset(), 0);
    }

    #[test]
    fn camera_pinned_when_level_narrower_than_view() {
        let mut cam = Camera::new();
        cam.follow(400.0, 200.0);
        assert_eq!(cam.x, 0.0);
    }

    #[test]
    fn start_game_resets_progress() {
        let mut s = Session::new(RulesConfig::default());
        s.world = 3;
        s.level_num = 2;
        s.score = 900;
        s.player.lives = 1;
        let mut events = vec![];
        s.start_game(&mut events);
        assert_eq!((s.world, s.level_num, s.score), (0, 0, 0));
        assert_eq!(s.player.lives, 3);
        assert_eq!(events, vec![GameEvent::LevelStart { world: 0, level: 0 }]);
    }

    #[test]
    fn start_level_resets_player_and_keeps_score() {
        let mut s = Session::new(RulesConfig::default());
        let mut events = vec![];
        s.start_game(&mut events);
        s.player.lives = 2;
        s.player.invincible = 40;
        s.player.body.x = 900.0;
        s.score = 300;
        s.time = 12;
        s.camera.x = 600.0;
        s.level_num = 1;
        s.start_level(&mut events);

        assert_eq!(s.player.lives, 3);
        assert_eq!(s.player.invincible, 0);
        assert_eq!((s.player.body.x, s.player.body.y), PLAYER_SPAWN);
        assert_eq!(s.score, 300);
        assert_eq!(s.time, 400);
        assert_eq!(s.camera.x, 0.0);
        assert_eq!(s.level.as_ref().map(|l| l.level_num), Some(1));
    }
}
