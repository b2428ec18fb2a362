/// Per-frame kinematics for Player and Enemy.
///
/// ## Frame order (both entity kinds)
///
///   1. Horizontal: x += vx
///   2. Gravity:    vy += g, capped at the entity's max fall speed
///   3. Vertical:   y += vy
///   4. Ground:     clamp to the ground line, zero vy
///   5. Bounds:     Player stops at level edges, Enemy turns around
///
/// ## Ground
///
/// Collision is against one horizontal ground line, not the tilemap
/// terrain. Tiles are scenery; `LevelBounds::ground_y` is the floor.
///
/// ## Constants
/// ```text
/// ┌────────────────┬────────┬────────┐
/// │                │ Player │ Enemy  │
/// ├────────────────┼────────┼────────┤
/// │ gravity        │ 0.25   │ 0.2    │
/// │ max fall       │ 5      │ 4      │
/// │ at level edge  │ stop   │ bounce │
/// └────────────────┴────────┴────────┘
/// ```

use super::entity::{Body, Enemy, Facing, FrameInput, Player};

pub const GROUND_Y: f32 = 200.0;

pub const PLAYER_GRAVITY: f32 = 0.25;
pub const PLAYER_MAX_FALL: f32 = 5.0;
pub const ENEMY_GRAVITY: f32 = 0.2;
pub const ENEMY_MAX_FALL: f32 = 4.0;

pub const WALK_SPEED: f32 = 1.0;
pub const RUN_SPEED: f32 = 2.0;
pub const FRICTION: f32 = 0.8;
pub const JUMP_VELOCITY: f32 = -5.0;
pub const RUN_JUMP_VELOCITY: f32 = -6.0;
/// Upward speed is cut to this when jump is released early.
pub const JUMP_CUT_VELOCITY: f32 = -2.0;

/// What the physics step needs to know about the level.
#[derive(Clone, Copy, Debug)]
pub struct LevelBounds {
    pub width_px: f32,
    pub ground_y: f32,
}

impl LevelBounds {
    pub fn new(width_px: f32) -> Self {
        LevelBounds { width_px, ground_y: GROUND_Y }
    }

    /// Rightmost x an entity of the given width may occupy.
    #[inline]
    fn max_x(&self, width: f32) -> f32 {
        (self.width_px - width).max(0.0)
    }
}

// ══════════════════════════════════════════════════════════════
// Shared kinematics
// ══════════════════════════════════════════════════════════════

/// Steps 1–3: move horizontally, accelerate downward (capped), move vertically.
#[inline]
pub fn integrate(body: &mut Body, gravity: f32, max_fall: f32) {
    body.x += body.vx;
    body.vy = (body.vy + gravity).min(max_fall);
    body.y += body.vy;
}

/// Step 4. Returns true when the body is resting on the ground line.
#[inline]
pub fn clamp_to_ground(body: &mut Body, ground_y: f32) -> bool {
    if body.y + body.height > ground_y {
        body.y = ground_y - body.height;
        body.vy = 0.0;
        true
    } else {
        false
    }
}

// ══════════════════════════════════════════════════════════════
// Enemy
// ══════════════════════════════════════════════════════════════

pub fn update_enemy(enemy: &mut Enemy, bounds: &LevelBounds) {
    let body = &mut enemy.body;
    integrate(body, ENEMY_GRAVITY, ENEMY_MAX_FALL);
    clamp_to_ground(body, bounds.ground_y);

    // Turn around at the edges, always heading back inside
    let max_x = bounds.max_x(body.width);
    if body.x < 0.0 {
        body.x = 0.0;
        body.vx = body.vx.abs();
    } else if body.x > max_x {
        body.x = max_x;
        body.vx = -body.vx.abs();
    }

    enemy.frame = enemy.frame.wrapping_add(1);
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Result of a player step that other systems may react to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerStep {
    pub jumped: bool,
}

pub fn update_player(player: &mut Player, input: &FrameInput, bounds: &LevelBounds) -> PlayerStep {
    let mut step = PlayerStep::default();
    player.run_held = input.run;

    // Horizontal control: walk/run speed while held, friction otherwise
    let speed = if player.run_held { RUN_SPEED } else { WALK_SPEED };
    if input.left {
        player.body.vx = -speed;
        player.facing = Facing::Left;
    } else if input.right {
        player.body.vx = speed;
        player.facing = Facing::Right;
    } else {
        player.body.vx *= FRICTION;
    }

    // Variable-height jump
    if input.jump {
        if !player.jump_held && player.on_ground {
            player.body.vy = if player.run_held { RUN_JUMP_VELOCITY } else { JUMP_VELOCITY };
            step.jumped = true;
        }
        player.jump_held = true;
    } else {
        player.jump_held = false;
        if player.body.vy < JUMP_CUT_VELOCITY {
            player.body.vy = JUMP_CUT_VELOCITY;
        }
    }

    integrate(&mut player.body, PLAYER_GRAVITY, PLAYER_MAX_FALL);
    player.on_ground = clamp_to_ground(&mut player.body, bounds.ground_y);

    let max_x = bounds.max_x(player.body.width);
    player.body.x = player.body.x.clamp(0.0, max_x);

    player.invincible = player.invincible.saturating_sub(1);
    step
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width_px: f32) -> LevelBounds {
        LevelBounds::new(width_px)
    }

    fn bottomless(width_px: f32) -> LevelBounds {
        LevelBounds { width_px, ground_y: f32::INFINITY }
    }

    fn grounded_player() -> Player {
        let mut p = Player::new(3);
        let b = flat(2048.0);
        for _ in 0..120 {
            update_player(&mut p, &FrameInput::default(), &b);
        }
        assert!(p.on_ground);
        p
    }

    // ── Fall speed caps ──

    #[test]
    fn enemy_fall_speed_capped_at_4() {
        let mut e = Enemy::new(100.0, 0.0, 0);
        let b = bottomless(2048.0);
        for _ in 0..1000 {
            update_enemy(&mut e, &b);
            assert!(e.body.vy <= ENEMY_MAX_FALL);
        }
        assert_eq!(e.body.vy, ENEMY_MAX_FALL);
    }

    #[test]
    fn player_fall_speed_capped_at_5() {
        let mut p = Player::new(3);
        let b = bottomless(2048.0);
        let held = FrameInput { jump: true, ..Default::default() };
        for i in 0..1000 {
            let input = if i % 2 == 0 { held } else { FrameInput::default() };
            update_player(&mut p, &input, &b);
            assert!(p.body.vy <= PLAYER_MAX_FALL);
            assert!(!p.on_ground);
        }
        assert_eq!(p.body.vy, PLAYER_MAX_FALL);
    }

    // ── Ground line ──

    #[test]
    fn ground_clamps_position_and_velocity() {
        let p = grounded_player();
        assert_eq!(p.body.y, GROUND_Y - p.body.height);
        assert_eq!(p.body.vy, 0.0);
    }

    #[test]
    fn enemy_lands_on_ground() {
        let mut e = Enemy::new(300.0, 180.0, 0);
        let b = flat(2048.0);
        for _ in 0..30 {
            update_enemy(&mut e, &b);
        }
        assert_eq!(e.body.y, GROUND_Y - e.body.height);
        assert_eq!(e.body.vy, 0.0);
    }

    // ── Horizontal edges ──

    #[test]
    fn enemy_bounces_at_left_edge() {
        let mut e = Enemy::new(0.2, 184.0, 0);
        let b = flat(2048.0);
        update_enemy(&mut e, &b);
        assert_eq!(e.body.x, 0.0);
        assert!(e.body.vx > 0.0);
        update_enemy(&mut e, &b);
        assert!(e.body.x > 0.0);
    }

    #[test]
    fn enemy_bounces_at_right_edge() {
        let mut e = Enemy::new(2048.0 - 16.0, 184.0, 0);
        e.body.vx = ENEMY_WALK;
        let b = flat(2048.0);
        update_enemy(&mut e, &b);
        assert_eq!(e.body.x, 2048.0 - 16.0);
        assert!(e.body.vx < 0.0);
    }

    const ENEMY_WALK: f32 = crate::domain::entity::ENEMY_WALK_SPEED;

    #[test]
    fn player_stops_at_level_edges() {
        let mut p = grounded_player();
        let b = flat(256.0);
        let left = FrameInput { left: true, run: true, ..Default::default() };
        for _ in 0..100 {
            update_player(&mut p, &left, &b);
        }
        assert_eq!(p.body.x, 0.0);

        let right = FrameInput { right: true, run: true, ..Default::default() };
        for _ in 0..300 {
            update_player(&mut p, &right, &b);
        }
        assert_eq!(p.body.x, 256.0 - 16.0);
    }

    // ── Walk / run / friction ──

    #[test]
    fn walk_and_run_speeds() {
        let b = flat(2048.0);
        let mut p = grounded_player();
        update_player(&mut p, &FrameInput { right: true, ..Default::default() }, &b);
        assert_eq!(p.body.vx, WALK_SPEED);
        assert_eq!(p.facing, Facing::Right);

        update_player(&mut p, &FrameInput { left: true, run: true, ..Default::default() }, &b);
        assert_eq!(p.body.vx, -RUN_SPEED);
        assert_eq!(p.facing, Facing::Left);
    }

    #[test]
    fn friction_decays_velocity() {
        let b = flat(2048.0);
        let mut p = grounded_player();
        p.body.vx = 2.0;
        update_player(&mut p, &FrameInput::default(), &b);
        assert!((p.body.vx - 1.6).abs() < 1e-6);
        for _ in 0..100 {
            update_player(&mut p, &FrameInput::default(), &b);
        }
        assert!(p.body.vx.abs() < 1e-3);
    }

    // ── Jumping ──

    #[test]
    fn jump_only_from_ground() {
        let b = flat(2048.0);
        let mut p = Player::new(3); // spawns in the air
        let jump = FrameInput { jump: true, ..Default::default() };
        let step = update_player(&mut p, &jump, &b);
        assert!(!step.jumped);

        let mut p = grounded_player();
        let step = update_player(&mut p, &jump, &b);
        assert!(step.jumped);
        assert_eq!(p.body.vy, JUMP_VELOCITY + PLAYER_GRAVITY);
        assert!(!p.on_ground);
    }

    #[test]
    fn run_jump_is_stronger() {
        let b = flat(2048.0);
        let mut p = grounded_player();
        update_player(&mut p, &FrameInput { jump: true, run: true, ..Default::default() }, &b);
        assert_eq!(p.body.vy, RUN_JUMP_VELOCITY + PLAYER_GRAVITY);
    }

    #[test]
    fn holding_jump_does_not_rejump() {
        let b = flat(2048.0);
        let mut p = grounded_player();
        let jump = FrameInput { jump: true, ..Default::default() };
        let mut jumps = 0;
        for _ in 0..200 {
            if update_player(&mut p, &jump, &b).jumped {
                jumps += 1;
            }
        }
        assert_eq!(jumps, 1);
    }

    fn peak_height(hold_frames: usize) -> f32 {
        let b = flat(2048.0);
        let mut p = grounded_player();
        let start = p.body.y;
        let mut min_y = start;
        for i in 0..120 {
            let input = FrameInput { jump: i < hold_frames, ..Default::default() };
            update_player(&mut p, &input, &b);
            min_y = min_y.min(p.body.y);
        }
        start - min_y
    }

    #[test]
    fn early_release_gives_short_hop() {
        let short = peak_height(1);
        let full = peak_height(60);
        assert!(short > 0.0);
        assert!(full > short * 2.0, "full={full} short={short}");
    }

    #[test]
    fn release_clamps_upward_velocity() {
        let b = flat(2048.0);
        let mut p = grounded_player();
        update_player(&mut p, &FrameInput { jump: true, ..Default::default() }, &b);
        update_player(&mut p, &FrameInput::default(), &b);
        assert_eq!(p.body.vy, JUMP_CUT_VELOCITY + PLAYER_GRAVITY);
    }

    // ── Invincibility ──

    #[test]
    fn invincibility_counts_down_to_zero() {
        let b = flat(2048.0);
        let mut p = grounded_player();
        p.invincible = 2;
        update_player(&mut p, &FrameInput::default(), &b);
        assert_eq!(p.invincible, 1);
        update_player(&mut p, &FrameInput::default(), &b);
        update_player(&mut p, &FrameInput::default(), &b);
        assert_eq!(p.invincible, 0);
    }
}
