/// Pattern table: procedural 8x8 tile patterns and the tile rasterizer.
///
/// A pattern is an 8x8 grid of local color indices (0–3). Rasterizing picks a
/// master palette index from a 4-entry palette for each cell and expands it
/// to `scale x scale` pixels. Both steps are pure, so rendered tiles are
/// memoised in [`PatternCache`] keyed by (pattern, palette).

use std::collections::HashMap;

use super::palette::{self, Rgb};

pub const TILE_SIZE: usize = 8;

pub type PatternGrid = [[u8; TILE_SIZE]; TILE_SIZE];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TilePattern {
    Solid,
    Brick,
    Shell,
    Question,
    Pipe,
}

impl TilePattern {
    #[cfg(test)]
    pub const ALL: [TilePattern; 5] = [
        TilePattern::Solid,
        TilePattern::Brick,
        TilePattern::Shell,
        TilePattern::Question,
        TilePattern::Pipe,
    ];
}

const SOLID: PatternGrid = [
    [3, 1, 1, 1, 1, 1, 1, 3],
    [1, 2, 2, 2, 2, 2, 2, 1],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [1, 2, 2, 2, 2, 2, 2, 1],
    [3, 1, 1, 1, 1, 1, 1, 3],
];

const BRICK: PatternGrid = [
    [3, 3, 3, 3, 3, 3, 3, 0],
    [3, 2, 2, 2, 2, 2, 3, 0],
    [3, 2, 2, 2, 2, 2, 3, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 3, 3, 3, 3, 3, 3, 3],
    [0, 3, 2, 2, 2, 2, 2, 3],
    [0, 3, 2, 2, 2, 2, 2, 3],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

const SHELL: PatternGrid = [
    [0, 0, 1, 2, 2, 1, 0, 0],
    [0, 1, 2, 3, 3, 2, 1, 0],
    [1, 2, 3, 2, 2, 3, 2, 1],
    [2, 3, 2, 3, 3, 2, 3, 2],
    [2, 3, 3, 2, 2, 3, 3, 2],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [0, 1, 2, 2, 2, 2, 1, 0],
    [0, 0, 1, 1, 1, 1, 0, 0],
];

const QUESTION: PatternGrid = [
    [3, 3, 3, 3, 3, 3, 3, 3],
    [3, 2, 2, 2, 2, 2, 2, 3],
    [3, 2, 0, 2, 2, 0, 2, 3],
    [3, 2, 2, 0, 0, 2, 2, 3],
    [3, 2, 2, 2, 2, 2, 2, 3],
    [3, 2, 2, 0, 0, 2, 2, 3],
    [3, 2, 2, 2, 2, 2, 2, 3],
    [3, 3, 3, 3, 3, 3, 3, 3],
];

const PIPE: PatternGrid = [[2, 3, 1, 1, 1, 1, 3, 2]; TILE_SIZE];

/// The 8x8 index grid for a pattern.
pub fn make_tile(pattern: TilePattern) -> PatternGrid {
    match pattern {
        TilePattern::Solid => SOLID,
        TilePattern::Brick => BRICK,
        TilePattern::Shell => SHELL,
        TilePattern::Question => QUESTION,
        TilePattern::Pipe => PIPE,
    }
}

/// A rasterized square of pixels, `size x size`, row-major.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PixelTile {
    pub size: usize,
    pub pixels: Vec<Rgb>,
}

impl PixelTile {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.size + x]
    }
}

/// Rasterize an index grid through a palette of master indices.
///
/// Cell indices past the palette's end clamp to its last entry, and the
/// resulting master index clamps into the 64-color table. A scale of 0 is
/// treated as 1.
pub fn render_tile(grid: &PatternGrid, palette4: &[u8], scale: usize) -> PixelTile {
    let scale = scale.max(1);
    let size = TILE_SIZE * scale;
    let mut pixels = vec![Rgb::BLACK; size * size];

    for (y, row) in grid.iter().enumerate() {
        for (x, &idx) in row.iter().enumerate() {
            let rgb = match palette4.len() {
                0 => palette::color(0),
                n => palette::color(palette4[(idx as usize).min(n - 1)] as usize),
            };
            for sy in 0..scale {
                let start = (y * scale + sy) * size + x * scale;
                pixels[start..start + scale].fill(rgb);
            }
        }
    }

    PixelTile { size, pixels }
}

/// Memoised tiles at scale 1, keyed by (pattern, palette).
#[derive(Default)]
pub struct PatternCache {
    tiles: HashMap<(TilePattern, [u8; 4]), PixelTile>,
}

impl PatternCache {
    pub fn new() -> Self {
        PatternCache { tiles: HashMap::new() }
    }

    pub fn get(&mut self, pattern: TilePattern, palette4: [u8; 4]) -> &PixelTile {
        self.tiles
            .entry((pattern, palette4))
            .or_insert_with(|| render_tile(&make_tile(pattern), &palette4, 1))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }
}
