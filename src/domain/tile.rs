/// Tile types and the tilemap grid.
/// Tile semantics are queried via methods so they stay centralized here.

use super::pattern::TILE_SIZE;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Solid,
    Pipe,
    Question,
}

impl Tile {
    /// Numeric tile code: 0=empty, 1=solid, 2=pipe, 3=question block.
    #[allow(dead_code)]
    pub fn code(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::Solid => 1,
            Tile::Pipe => 2,
            Tile::Question => 3,
        }
    }

    /// Unknown codes read as empty.
    #[allow(dead_code)]
    pub fn from_code(code: u8) -> Tile {
        match code {
            1 => Tile::Solid,
            2 => Tile::Pipe,
            3 => Tile::Question,
            _ => Tile::Empty,
        }
    }

    #[allow(dead_code)]
    pub fn is_empty(self) -> bool {
        matches!(self, Tile::Empty)
    }
}

/// A `height x width` grid of tiles, fixed in size once built.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tilemap {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl Tilemap {
    pub fn new(width: usize, height: usize) -> Self {
        Tilemap { width, height, cells: vec![Tile::Empty; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Width of the map in pixels.
    pub fn pixel_width(&self) -> usize {
        self.width * TILE_SIZE
    }

    /// Tile at (x, y) in tile units. Anything outside the grid is empty.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Tile {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Tile::Empty;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    /// Tile under a pixel coordinate.
    #[allow(dead_code)]
    pub fn tile_at_pixel(&self, px: f32, py: f32) -> Tile {
        let ts = TILE_SIZE as f32;
        self.get((px / ts).floor() as i64, (py / ts).floor() as i64)
    }

    /// Writes outside the grid are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = tile;
        }
    }

    #[allow(dead_code)]
    pub fn row(&self, y: usize) -> &[Tile] {
        if y >= self.height {
            return &[];
        }
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Row-major dump of tile codes.
    #[allow(dead_code)]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|t| t.code()).collect()
    }
}
