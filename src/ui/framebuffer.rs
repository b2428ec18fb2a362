/// The logical 256x240 RGB surface and the OAM-style sprite queue.
///
/// All drawing primitives take signed coordinates and clip against the
/// surface. Geometry that ends up fully outside, or has a non-positive
/// size, draws nothing.

use crate::domain::palette::Rgb;
use crate::domain::pattern::PixelTile;
use crate::sim::world::{VIEW_HEIGHT, VIEW_WIDTH};
use super::sprites::SpriteImage;

pub const WIDTH: usize = VIEW_WIDTH;
pub const HEIGHT: usize = VIEW_HEIGHT;

pub struct Framebuffer {
    pixels: Vec<Rgb>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer { pixels: vec![Rgb::BLACK; WIDTH * HEIGHT] }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgb {
        if x < WIDTH && y < HEIGHT { self.pixels[y * WIDTH + x] } else { Rgb::BLACK }
    }

    #[cfg(test)]
    pub fn row(&self, y: usize) -> &[Rgb] {
        &self.pixels[y * WIDTH..(y + 1) * WIDTH]
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < WIDTH && (y as usize) < HEIGHT {
            self.pixels[y as usize * WIDTH + x as usize] = c;
        }
    }

    pub fn fill(&mut self, c: Rgb) {
        self.pixels.fill(c);
    }

    pub fn hline(&mut self, y: i32, c: Rgb) {
        self.fill_rect(0, y, WIDTH as i32, 1, c);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        if w <= 0 || h <= 0 {
            return;
        }
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(WIDTH as i32);
        let y1 = (y + h).min(HEIGHT as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for yy in y0..y1 {
            let start = yy as usize * WIDTH;
            self.pixels[start + x0 as usize..start + x1 as usize].fill(c);
        }
    }

    /// Rectangle outline drawn inward with the given line thickness.
    pub fn rect_outline(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: i32, c: Rgb) {
        if w <= 0 || h <= 0 || thickness <= 0 {
            return;
        }
        let t = thickness.min(w).min(h);
        self.fill_rect(x, y, w, t, c);
        self.fill_rect(x, y + h - t, w, t, c);
        self.fill_rect(x, y, t, h, c);
        self.fill_rect(x + w - t, y, t, h, c);
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, c: Rgb) {
        if r <= 0 {
            return;
        }
        let r2 = r * r;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r2 {
                    self.set(cx + dx, cy + dy, c);
                }
            }
        }
    }

    pub fn blit_tile(&mut self, tile: &PixelTile, x: i32, y: i32) {
        for ty in 0..tile.size {
            for tx in 0..tile.size {
                self.set(x + tx as i32, y + ty as i32, tile.get(tx, ty));
            }
        }
    }

    /// Blit with transparency (`None` pixels are skipped) and optional mirroring.
    pub fn blit_sprite(&mut self, sprite: &SpriteImage, x: i32, y: i32, flip_h: bool, flip_v: bool) {
        let n = sprite.size;
        for sy in 0..n {
            for sx in 0..n {
                let src_x = if flip_h { n - 1 - sx } else { sx };
                let src_y = if flip_v { n - 1 - sy } else { sy };
                if let Some(c) = sprite.get(src_x, src_y) {
                    self.set(x + sx as i32, y + sy as i32, c);
                }
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// OAM
// ══════════════════════════════════════════════════════════════

pub const OAM_CAPACITY: usize = 64;

#[derive(Clone, Copy)]
pub struct OamEntry<'a> {
    pub x: i32,
    pub y: i32,
    pub sprite: &'a SpriteImage,
    pub flip_h: bool,
    pub flip_v: bool,
}

/// Bounded per-frame sprite list. Entries past the cap are dropped, so
/// the earliest-added sprites always keep their slots.
pub struct SpriteQueue<'a> {
    entries: Vec<OamEntry<'a>>,
}

impl<'a> SpriteQueue<'a> {
    pub fn new() -> Self {
        SpriteQueue { entries: Vec::with_capacity(OAM_CAPACITY) }
    }

    /// Returns false when the entry was dropped.
    pub fn push(&mut self, entry: OamEntry<'a>) -> bool {
        if self.entries.len() >= OAM_CAPACITY {
            return false;
        }
        self.entries.push(entry);
        true
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[OamEntry<'a>] {
        &self.entries
    }

    #[cfg(test)]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Draw in insertion order; later entries paint over earlier ones.
    pub fn render(&self, fb: &mut Framebuffer) {
        for e in &self.entries {
            fb.blit_sprite(e.sprite, e.x, e.y, e.flip_h, e.flip_v);
        }
    }
}
