/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Scale the 256x240 framebuffer onto terminal cells. Each cell is an
///      upper half block '▀' (fg = top pixel, bg = bottom pixel), so one
///      terminal row carries two pixel rows.
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Scaling is nearest-neighbour. The image shrinks to fit the terminal and
/// never grows past `max_scale` output pixels per source pixel.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::palette::Rgb;
use crate::error::EngineError;
use super::framebuffer::{Framebuffer, HEIGHT, WIDTH};

const HALF_BLOCK: char = '▀';

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Letterbox color around the scaled image.
    const BASE_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn pixels(top: Rgb, bottom: Rgb) -> Self {
        Cell { ch: HALF_BLOCK, fg: rgb(top), bg: rgb(bottom) }
    }
}

#[inline]
fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ── CellGrid: a 2D grid of Cells ──

struct CellGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    fn new(w: usize, h: usize) -> Self {
        CellGrid { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }
}

// ── Layout ──

/// Where the scaled image lands on the terminal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Source pixels per output pixel (>1 shrinks, <1 enlarges).
    pub step: f32,
    /// Output size in terminal cells.
    pub cols: usize,
    pub rows: usize,
    /// Top-left terminal cell of the image.
    pub off_x: usize,
    pub off_y: usize,
}

impl Layout {
    pub fn fit(term_w: usize, term_h: usize, max_scale: f32) -> Self {
        let tw = term_w.max(1) as f32;
        let th = term_h.max(1) as f32;
        let step = (WIDTH as f32 / tw)
            .max(HEIGHT as f32 / (2.0 * th))
            .max(1.0 / max_scale.max(f32::MIN_POSITIVE));

        let cols = ((WIDTH as f32 / step) as usize).clamp(1, term_w.max(1));
        let pixel_rows = ((HEIGHT as f32 / step) as usize).max(1);
        let rows = pixel_rows.div_ceil(2).min(term_h.max(1));

        Layout {
            step,
            cols,
            rows,
            off_x: term_w.saturating_sub(cols) / 2,
            off_y: term_h.saturating_sub(rows) / 2,
        }
    }

    /// Source pixel for an output pixel coordinate.
    #[inline]
    pub fn source(&self, out_x: usize, out_y: usize) -> (usize, usize) {
        let sx = ((out_x as f32 * self.step) as usize).min(WIDTH - 1);
        let sy = ((out_y as f32 * self.step) as usize).min(HEIGHT - 1);
        (sx, sy)
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: CellGrid,
    back: CellGrid,
    term_w: usize,
    term_h: usize,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: CellGrid::new(0, 0),
            back: CellGrid::new(0, 0),
            term_w: 0,
            term_h: 0,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the
    /// terminal reports key releases.
    pub fn init(&mut self) -> Result<bool, EngineError> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }
        tracing::info!(enhanced_keys = self.enhanced_keys, "terminal ready");

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> Result<(), EngineError> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn present(&mut self, fb: &Framebuffer, max_scale: f32) -> Result<(), EngineError> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            tracing::debug!(cols = tw, rows = th, "terminal resized");
        }

        self.front.clear();
        let layout = Layout::fit(self.term_w, self.term_h, max_scale);
        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let (sx, top_y) = layout.source(col, row * 2);
                let (_, bottom_y) = layout.source(col, row * 2 + 1);
                let cell = Cell::pixels(fb.get(sx, top_y), fb.get(sx, bottom_y));
                self.front.set(layout.off_x + col, layout.off_y + row, cell);
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_fit_is_one_to_one() {
        // 256 columns, 120 rows = 240 pixel rows
        let l = Layout::fit(256, 120, 4.0);
        assert_eq!(l.step, 1.0);
        assert_eq!((l.cols, l.rows), (256, 120));
        assert_eq!((l.off_x, l.off_y), (0, 0));
        assert_eq!(l.source(255, 239), (255, 239));
    }

    #[test]
    fn small_terminal_shrinks_and_centers() {
        // Width-bound: 128 columns halve the image
        let l = Layout::fit(128, 100, 4.0);
        assert_eq!(l.step, 2.0);
        assert_eq!((l.cols, l.rows), (128, 60));
        assert_eq!((l.off_x, l.off_y), (0, 20));
        assert_eq!(l.source(10, 10), (20, 20));
    }

    #[test]
    fn height_bound_terminal() {
        // 60 rows = 120 pixel rows, so the image is halved and centered horizontally
        let l = Layout::fit(300, 60, 4.0);
        assert_eq!(l.step, 2.0);
        assert_eq!((l.cols, l.rows), (128, 60));
        assert_eq!(l.off_x, 86);
    }

    #[test]
    fn large_terminal_is_capped_by_max_scale() {
        let l = Layout::fit(2000, 1000, 2.0);
        assert_eq!(l.step, 0.5);
        assert_eq!((l.cols, l.rows), (512, 240));
        assert_eq!(l.off_x, (2000 - 512) / 2);
        // Each source pixel covers two output pixels
        assert_eq!(l.source(3, 3), (1, 1));
    }

    #[test]
    fn degenerate_terminal_still_samples_in_bounds() {
        let l = Layout::fit(0, 0, 4.0);
        assert!(l.cols >= 1 && l.rows >= 1);
        let (sx, sy) = l.source(l.cols - 1, l.rows * 2 - 1);
        assert!(sx < WIDTH && sy < HEIGHT);
    }

    #[test]
    fn half_block_carries_both_pixels() {
        let c = Cell::pixels(Rgb::new(1, 2, 3), Rgb::new(4, 5, 6));
        assert_eq!(c.ch, HALF_BLOCK);
        assert_eq!(c.fg, Color::Rgb { r: 1, g: 2, b: 3 });
        assert_eq!(c.bg, Color::Rgb { r: 4, g: 5, b: 6 });
        assert_ne!(c, Cell::INVALID);
    }

    #[test]
    fn grid_ignores_out_of_range() {
        let mut g = CellGrid::new(2, 2);
        g.set(5, 5, Cell::INVALID);
        assert_eq!(g.get(5, 5), Cell::BLANK);
        g.set(1, 1, Cell::INVALID);
        g.clear();
        assert_eq!(g.get(1, 1), Cell::BLANK);
    }
}
