/// Entities: Player and Enemy, plus the per-frame input they consume.
/// Positions are real-valued pixel coordinates in world space.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Player size/power state. Only `Small` is reachable without power-ups.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(dead_code)]
pub enum PowerState {
    Small,
    Big,
    Fire,
}

/// Abstract pressed-states for one frame.
/// Directions, run and jump are held states; start/quit are fresh presses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub run: bool,
    pub jump: bool,
    pub start: bool,
    pub quit: bool,
}

/// Kinematic state shared by every moving entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Body { x, y, vx: 0.0, vy: 0.0, width, height }
    }
}

pub const PLAYER_SPAWN: (f32, f32) = (32.0, 100.0);
pub const ENTITY_SIZE: f32 = 16.0;

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub on_ground: bool,
    pub facing: Facing,
    pub run_held: bool,
    pub jump_held: bool,
    #[allow(dead_code)]
    pub power: PowerState,
    /// Frames of remaining invincibility; 0 means vulnerable.
    pub invincible: u32,
    pub lives: u32,
}

impl Player {
    pub fn new(lives: u32) -> Self {
        Player {
            body: Body::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1, ENTITY_SIZE, ENTITY_SIZE),
            on_ground: false,
            facing: Facing::Right,
            run_held: false,
            jump_held: false,
            power: PowerState::Small,
            invincible: 0,
            lives,
        }
    }

    /// Flicker: hidden for two frames out of every four while invincible.
    pub fn is_hidden(&self) -> bool {
        self.invincible > 0 && self.invincible % 4 < 2
    }
}

pub const ENEMY_WALK_SPEED: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: Body,
    /// Cosmetic palette variant (derived from the world index).
    pub color_type: u32,
    pub frame: u32,
    pub alive: bool,
}

impl Enemy {
    pub fn new(x: f32, y: f32, color_type: u32) -> Self {
        let mut body = Body::new(x, y, ENTITY_SIZE, ENTITY_SIZE);
        body.vx = -ENEMY_WALK_SPEED;
        Enemy { body, color_type, frame: 0, alive: true }
    }

    /// Walk animation: mirror every 8 frames.
    pub fn anim_flipped(&self) -> bool {
        (self.frame / 8) % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_spawn_defaults() {
        let p = Player::new(3);
        assert_eq!((p.body.x, p.body.y), PLAYER_SPAWN);
        assert_eq!(p.lives, 3);
        assert_eq!(p.facing, Facing::Right);
        assert_eq!(p.power, PowerState::Small);
        assert!(!p.is_hidden());
    }

    #[test]
    fn flicker_pattern() {
        let mut p = Player::new(3);
        let visible: Vec<bool> = (1..=8)
            .map(|i| {
                p.invincible = i;
                !p.is_hidden()
            })
            .collect();
        // invincible % 4: 1,2,3,0,1,2,3,0
        assert_eq!(visible, vec![false, true, true, false, false, true, true, false]);
    }

    #[test]
    fn enemy_walks_left_and_animates() {
        let mut e = Enemy::new(20.0, 180.0, 2);
        assert!(e.alive);
        assert_eq!(e.body.vx, -ENEMY_WALK_SPEED);
        assert!(e.anim_flipped());
        e.frame = 8;
        assert!(!e.anim_flipped());
    }
}
