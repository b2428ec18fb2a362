/// Player/enemy contact rules.
///
/// Pure functions: they decide what a contact means and apply it to the
/// two entities. Scoring, lives bookkeeping beyond the player itself, and
/// phase changes belong to the sim layer.
///
/// ## Overlap
///
/// Boxes touch when both top-left deltas are under 14 px:
///   |player.x − enemy.x| < 14  AND  |player.y − enemy.y| < 14
///
/// ## Contact Truth Table
/// ┌──────────────────────────────────────┬──────────┬───────────────────────┐
/// │ Condition (priority order)            │ Result   │ Effect                │
/// ├──────────────────────────────────────┼──────────┼───────────────────────┤
/// │ enemy dead                            │ none     │                       │
/// │ no overlap                            │ none     │                       │
/// │ player.vy > 1 AND player.y < enemy.y  │ Stomp    │ enemy dies, vy = −3   │
/// │ player.invincible > 0                 │ none     │ grace frames          │
/// │ otherwise                             │ Hurt     │ invincible = 120,     │
/// │                                       │          │ lives −= 1            │
/// └──────────────────────────────────────┴──────────┴───────────────────────┘
///
/// Stomp is checked before invincibility, so a flickering player can still
/// squash enemies.

use super::entity::{Enemy, Player};

pub const CONTACT_RANGE: f32 = 14.0;
pub const STOMP_MIN_FALL: f32 = 1.0;
pub const STOMP_BOUNCE: f32 = -3.0;
pub const HURT_INVINCIBILITY: u32 = 120;
pub const STOMP_SCORE: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Stomp,
    Hurt,
}

#[inline]
pub fn overlaps(player: &Player, enemy: &Enemy) -> bool {
    (player.body.x - enemy.body.x).abs() < CONTACT_RANGE
        && (player.body.y - enemy.body.y).abs() < CONTACT_RANGE
}

/// Resolve one player/enemy pair. See truth table above.
pub fn interact(player: &mut Player, enemy: &mut Enemy) -> Option<Contact> {
    if !enemy.alive || !overlaps(player, enemy) {
        return None;
    }

    if player.body.vy > STOMP_MIN_FALL && player.body.y < enemy.body.y {
        enemy.alive = false;
        player.body.vy = STOMP_BOUNCE;
        return Some(Contact::Stomp);
    }

    if player.invincible > 0 {
        return None;
    }

    player.invincible = HURT_INVINCIBILITY;
    player.lives = player.lives.saturating_sub(1);
    Some(Contact::Hurt)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
