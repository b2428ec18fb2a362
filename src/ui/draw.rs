/// Scene composition: renders a `Session` into the logical framebuffer.
///
/// ## Layer order (GAME)
///
///   1. Background fill (world palette `bg`)
///   2. Parallax clouds, scrolled at 1/4 camera speed
///   3. Visible tile columns
///   4. Sprites via the OAM queue: enemies, then the player
///   5. HUD, in screen coordinates (camera-independent)
///
/// ## Coordinate spaces
/// ```text
///   tile (tx, ty)  ──×8──▶  world px  ──−camera──▶  screen px
/// ```
/// Only the horizontal axis scrolls; screen y == world y.

use std::ops::Range;
use std::time::Duration;

use crate::domain::palette::{
    self, WorldPalette, PIPE_PALETTE, QUESTION_PALETTE, TITLE_SHELL_PALETTE,
};
use crate::domain::pattern::{PatternCache, TilePattern, TILE_SIZE};
use crate::domain::tile::Tile;
use crate::domain::entity::Facing;
use crate::sim::level::Level;
use crate::sim::world::{Phase, Session, VIEW_HEIGHT, VIEW_WIDTH};
use super::font::{draw_text, text_width};
use super::framebuffer::{Framebuffer, OamEntry, SpriteQueue, HEIGHT, WIDTH};
use super::sprites::{SpriteSet, SPRITE_SIZE};

/// Wall-clock period of the question-block blink.
const QUESTION_BLINK: Duration = Duration::from_millis(500);

const HUD_HEIGHT: i32 = 24;
const CLOUD_COUNT: i32 = 5;
const CLOUD_SPACING: i32 = 80;
const CLOUD_WRAP: i32 = VIEW_WIDTH as i32 + 100;

const W: i32 = WIDTH as i32;
const H: i32 = HEIGHT as i32;

/// Long-lived drawing resources: tile cache and prebuilt sprites.
pub struct Scene {
    tiles: PatternCache,
    sprites: SpriteSet,
    fps: u32,
}

impl Scene {
    pub fn new(fps: u32) -> Self {
        Scene { tiles: PatternCache::new(), sprites: SpriteSet::new(), fps }
    }

    /// Render one frame. `elapsed` is wall-clock time since start and only
    /// drives cosmetic blinking.
    pub fn compose(&mut self, session: &Session, elapsed: Duration, fb: &mut Framebuffer) {
        let world = session.level.as_ref().map_or(0, |level| level.world);
        let pal = WorldPalette::for_world(world);
        fb.fill(pal.background());

        match session.phase {
            Phase::Title => self.draw_title(session, fb),
            Phase::Game => {
                if let Some(level) = &session.level {
                    let cam = session.camera.offset();
                    draw_clouds(fb, pal, cam);
                    self.draw_tiles(fb, level, pal, cam, elapsed);
                    self.queue_entities(session, cam).render(fb);
                    draw_hud(fb, session);
                }
            }
            Phase::GameOver => {
                let white = palette::color(0x30);
                draw_text(fb, "GAME OVER", W / 2 - 32, H / 2 - 4, white);
                draw_text(fb, "PRESS START", W / 2 - 40, H / 2 + 12, white);
            }
            Phase::Win => {
                let white = palette::color(0x30);
                draw_text(fb, "KOOPA CHAMPION!", W / 2 - 56, H / 2 - 12, white);
                draw_text(fb, "THANK YOU KOOPA!", W / 2 - 60, H / 2 + 4, white);
                draw_text(fb, "PRESS START", W / 2 - 40, H / 2 + 20, white);
            }
        }
    }

    // ── Tiles ──

    fn draw_tiles(&mut self, fb: &mut Framebuffer, level: &Level, pal: &WorldPalette, cam: i32, elapsed: Duration) {
        let blink = question_pattern(elapsed);
        let map = &level.tiles;
        let columns = visible_columns(cam, map.width());
        for ty in 0..map.height() {
            for tx in columns.clone() {
                let (pattern, colors) = match map.get(tx as i64, ty as i64) {
                    Tile::Empty => continue,
                    Tile::Solid => (TilePattern::Brick, pal.fg),
                    Tile::Pipe => (TilePattern::Pipe, PIPE_PALETTE),
                    Tile::Question => (blink, QUESTION_PALETTE),
                };
                let sx = (tx * TILE_SIZE) as i32 - cam;
                fb.blit_tile(self.tiles.get(pattern, colors), sx, (ty * TILE_SIZE) as i32);
            }
        }
    }

    // ── Sprites ──

    /// Enemies first, player last, so the player draws on top.
    fn queue_entities<'a>(&'a self, session: &Session, cam: i32) -> SpriteQueue<'a> {
        let mut oam = SpriteQueue::new();
        if let Some(level) = &session.level {
            for enemy in level.enemies.iter().filter(|e| e.alive) {
                if let Some(x) = on_screen_x(enemy.body.x, cam) {
                    oam.push(OamEntry {
                        x,
                        y: enemy.body.y as i32,
                        sprite: self.sprites.enemy(enemy.color_type),
                        flip_h: enemy.anim_flipped(),
                        flip_v: false,
                    });
                }
            }
        }

        let p = &session.player;
        if !p.is_hidden() {
            if let Some(x) = on_screen_x(p.body.x, cam) {
                oam.push(OamEntry {
                    x,
                    y: p.body.y as i32,
                    sprite: &self.sprites.player,
                    flip_h: p.facing == Facing::Left,
                    flip_v: false,
                });
            }
        }
        oam
    }

    // ── Title ──

    fn draw_title(&mut self, session: &Session, fb: &mut Framebuffer) {
        for y in 0..H {
            let idx = if y < 80 { 0x0C } else if y < 160 { 0x01 } else { 0x00 };
            fb.hline(y, palette::color(idx));
        }

        let shell = self.tiles.get(TilePattern::Shell, TITLE_SHELL_PALETTE);
        for y in (0..H).step_by(32) {
            for x in (0..W).step_by(32) {
                if (x / 32 + y / 32) % 2 == 1 {
                    fb.blit_tile(shell, x + 8, y + 8);
                }
            }
        }

        let black = palette::color(0x0F);
        let title_y = 40 + session.title_y;
        draw_text(fb, "KOOPA ENGINE", W / 2 - 44 + 2, title_y + 2, black);
        let title_color = if session.title_flash { 0x20 } else { 0x30 };
        draw_text(fb, "KOOPA ENGINE", W / 2 - 44, title_y, palette::color(title_color));

        draw_shadowed(fb, "TERMINAL EDITION", 65, palette::color(0x16));
        draw_shadowed(fb, "8-BIT PLATFORMER", 80, palette::color(0x1A));

        fb.rect_outline(W / 2 - 60, 130, 120, 40, 2, palette::color(0x30));
        if session.title_flash {
            draw_text(fb, "PRESS START", W / 2 - 44, 140, palette::color(0x30));
        }
        draw_text(fb, "Z=JUMP X=RUN", W / 2 - 48, 155, palette::color(0x30));

        draw_centered(fb, "ENTER = START", 195, palette::color(0x16));
        draw_centered(fb, "ESC = QUIT", 205, palette::color(0x1A));

        // Three enemies drifting on Lissajous paths
        let f = session.frame_counter as f64;
        for i in 0..3u32 {
            let phase = i as f64;
            let x = 40 + i as i32 * 80 + ((f * 0.05 + phase).sin() * 20.0) as i32;
            let y = 100 + ((f * 0.04 + phase).cos() * 5.0) as i32;
            fb.blit_sprite(self.sprites.enemy(i), x, y, true, false);
        }

        let footer = palette::color(0x12);
        draw_text(fb, &format!("NES {VIEW_WIDTH}X{VIEW_HEIGHT}"), 4, H - 12, footer);
        let fps = format!("{}FPS", self.fps);
        draw_text(fb, &fps, W - text_width(&fps), H - 12, footer);
    }
}

// ══════════════════════════════════════════════════════════════
// Free helpers
// ══════════════════════════════════════════════════════════════

/// Tile columns intersecting the viewport, with a one-tile margin.
pub fn visible_columns(cam: i32, width: usize) -> Range<usize> {
    let ts = TILE_SIZE as i32;
    let start = (cam.div_euclid(ts) - 1).max(0) as usize;
    let end = ((cam + W).div_euclid(ts) + 2).max(0) as usize;
    start.min(width)..end.min(width)
}

/// Question blocks alternate with the plain block pattern.
pub fn question_pattern(elapsed: Duration) -> TilePattern {
    if (elapsed.as_millis() / QUESTION_BLINK.as_millis()) % 2 == 0 {
        TilePattern::Question
    } else {
        TilePattern::Solid
    }
}

/// Screen-space center of each cloud cluster.
pub fn cloud_positions(cam: i32) -> impl Iterator<Item = (i32, i32)> {
    (0..CLOUD_COUNT).map(move |i| {
        let x = (i * CLOUD_SPACING - cam.div_euclid(4)).rem_euclid(CLOUD_WRAP) - 50;
        let y = 40 + (i % 3) * 20;
        (x, y)
    })
}

fn draw_clouds(fb: &mut Framebuffer, pal: &WorldPalette, cam: i32) {
    let c = palette::color_signed(pal.bg as i32 + 1);
    for (x, y) in cloud_positions(cam) {
        fb.fill_circle(x, y, 12, c);
        fb.fill_circle(x + 10, y, 10, c);
        fb.fill_circle(x - 10, y, 10, c);
    }
}

/// Screen x for a sprite, or None when it is fully off-screen.
fn on_screen_x(world_x: f32, cam: i32) -> Option<i32> {
    let x = (world_x - cam as f32) as i32;
    (-(SPRITE_SIZE as i32)..=W).contains(&x).then_some(x)
}

fn draw_hud(fb: &mut Framebuffer, session: &Session) {
    for y in 0..HUD_HEIGHT {
        let idx = if y < 2 || y > 21 { 0x0F } else { 0x00 };
        fb.hline(y, palette::color(idx));
    }
    fb.fill_rect(2, 2, W - 4, 20, palette::color(0x0F));

    let white = palette::color(0x30);
    // '$' has no glyph; the score follows its cell
    draw_text(fb, "$", 8, 7, palette::color(0x37));
    draw_text(fb, &format!("{:06}", session.score), 16, 7, white);

    draw_text(fb, "WORLD", W / 2 - 36, 7, palette::color(0x36));
    draw_text(fb, &format!("{}-{}", session.world + 1, session.level_num + 1), W / 2 + 4, 7, white);

    draw_text(fb, "TIME", W - 72, 7, palette::color(0x27));
    let time_color = if session.time < 100 { palette::color(0x16) } else { white };
    draw_text(fb, &format!("{:03}", session.time), W - 40, 7, time_color);

    draw_text(fb, "KOOPA", 8, 14, palette::color(0x1A));
    draw_text(fb, "X", 48, 14, white);
    draw_text(fb, &format!("{:02}", session.player.lives), 56, 14, white);
}

fn draw_centered(fb: &mut Framebuffer, text: &str, y: i32, color: palette::Rgb) {
    draw_text(fb, text, (W - text_width(text)) / 2, y, color);
}

fn draw_shadowed(fb: &mut Framebuffer, text: &str, y: i32, color: palette::Rgb) {
    let x = (W - text_width(text)) / 2;
    draw_text(fb, text, x + 1, y + 1, palette::color(0x0F));
    draw_text(fb, text, x, y, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::sim::event::GameEvent;

    fn game_session() -> Session {
        let mut s = Session::new(RulesConfig::default());
        let mut events: Vec<GameEvent> = vec![];
        s.start_game(&mut events);
        s.set_phase(Phase::Game);
        s
    }

    #[test]
    fn culling_range_has_one_tile_margin() {
        assert_eq!(visible_columns(0, 256), 0..34);
        assert_eq!(visible_columns(80, 256), 9..44);
        assert_eq!(visible_columns(1792, 256), 223..256);
        assert_eq!(visible_columns(0, 10), 0..10);
    }

    #[test]
    fn culling_never_exceeds_map() {
        for cam in [-50, 0, 7, 1000, 1792, 4000] {
            let r = visible_columns(cam, 256);
            assert!(r.start <= r.end && r.end <= 256, "cam={cam} {r:?}");
        }
    }

    #[test]
    fn question_blocks_blink_on_wall_clock() {
        assert_eq!(question_pattern(Duration::from_millis(0)), TilePattern::Question);
        assert_eq!(question_pattern(Duration::from_millis(499)), TilePattern::Question);
        assert_eq!(question_pattern(Duration::from_millis(500)), TilePattern::Solid);
        assert_eq!(question_pattern(Duration::from_millis(1000)), TilePattern::Question);
    }

    #[test]
    fn clouds_scroll_at_quarter_speed_and_wrap() {
        let at0: Vec<_> = cloud_positions(0).collect();
        let at40: Vec<_> = cloud_positions(40).collect();
        assert_eq!(at0[0], (-50, 40));
        assert_eq!(at0[1], (30, 60));
        assert_eq!(at40[1], (20, 60));
        // Cloud 0 wraps to the right edge
        assert_eq!(at40[0], (CLOUD_WRAP - 10 - 50, 40));
    }

    #[test]
    fn hud_ignores_camera() {
        let mut scene = Scene::new(60);
        let mut s = game_session();
        let mut a = Framebuffer::new();
        let mut b = Framebuffer::new();

        s.camera.x = 0.0;
        scene.compose(&s, Duration::ZERO, &mut a);
        s.camera.x = 900.0;
        scene.compose(&s, Duration::ZERO, &mut b);

        for y in 0..HUD_HEIGHT as usize {
            assert_eq!(a.row(y), b.row(y), "row {y}");
        }
        // Below the HUD the scrolled world differs
        assert!((HUD_HEIGHT as usize..HEIGHT).any(|y| a.row(y) != b.row(y)));
    }

    #[test]
    fn low_time_turns_red() {
        let mut scene = Scene::new(60);
        let mut s = game_session();
        let mut fb = Framebuffer::new();
        s.time = 99;
        scene.compose(&s, Duration::ZERO, &mut fb);
        let red = palette::color(0x16);
        let found = (7..15).any(|y| (W as usize - 40..W as usize - 16).any(|x| fb.get(x, y) == red));
        assert!(found);
    }

    #[test]
    fn flickering_player_is_not_queued() {
        let scene = Scene::new(60);
        let mut s = game_session();
        let visible = scene.queue_entities(&s, 0).len();
        s.player.invincible = 4; // 4 % 4 == 0 → hidden
        assert_eq!(scene.queue_entities(&s, 0).len(), visible - 1);
        s.player.invincible = 3;
        assert_eq!(scene.queue_entities(&s, 0).len(), visible);
    }

    #[test]
    fn only_on_screen_living_enemies_are_queued() {
        let scene = Scene::new(60);
        let mut s = game_session();
        // Camera at 0: enemies at x=20 and x=220 are visible, 420+ are not
        assert_eq!(scene.queue_entities(&s, 0).len(), 2 + 1);
        s.level.as_mut().unwrap().enemies[0].alive = false;
        assert_eq!(scene.queue_entities(&s, 0).len(), 1 + 1);
    }

    #[test]
    fn player_is_drawn_last() {
        let scene = Scene::new(60);
        let s = game_session();
        let q = scene.queue_entities(&s, 0);
        let last = q.entries().last().unwrap();
        assert!(std::ptr::eq(last.sprite, &scene.sprites.player));
    }

    #[test]
    fn background_follows_loaded_level_world() {
        let mut scene = Scene::new(60);
        let mut fb = Framebuffer::new();
        let mut s = Session::new(RulesConfig::default());
        s.phase = Phase::GameOver;
        scene.compose(&s, Duration::ZERO, &mut fb);
        assert_eq!(fb.get(0, 0), WorldPalette::for_world(0).background());

        s.level = Some(Level::new(1, 0));
        scene.compose(&s, Duration::ZERO, &mut fb);
        assert_eq!(fb.get(0, 0), WorldPalette::for_world(1).background());
    }

    #[test]
    fn every_phase_composes() {
        let mut scene = Scene::new(30);
        let mut fb = Framebuffer::new();
        let mut s = Session::new(RulesConfig::default());
        scene.compose(&s, Duration::ZERO, &mut fb);
        for phase in [Phase::Game, Phase::GameOver, Phase::Win] {
            s.phase = phase;
            scene.compose(&s, Duration::from_secs(3), &mut fb);
        }
    }
}
