/// Color tables: the fixed 64-entry master palette and per-world selections.
///
/// Every color in the game is addressed by a master palette index (0x00–0x3F).
/// Out-of-range indices never fail; they clamp to the nearest valid entry.

/// An RGB triple.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

pub const PALETTE_SIZE: usize = 64;

/// 2C02-style master palette.
pub const MASTER_PALETTE: [Rgb; PALETTE_SIZE] = [
    Rgb::new(124, 124, 124), Rgb::new(0, 0, 252), Rgb::new(0, 0, 188), Rgb::new(68, 40, 188),
    Rgb::new(148, 0, 132), Rgb::new(168, 0, 32), Rgb::new(168, 16, 0), Rgb::new(136, 20, 0),
    Rgb::new(80, 48, 0), Rgb::new(0, 120, 0), Rgb::new(0, 104, 0), Rgb::new(0, 88, 0),
    Rgb::new(0, 64, 88), Rgb::new(0, 0, 0), Rgb::new(0, 0, 0), Rgb::new(0, 0, 0),
    Rgb::new(188, 188, 188), Rgb::new(0, 120, 248), Rgb::new(0, 88, 248), Rgb::new(104, 68, 252),
    Rgb::new(216, 0, 204), Rgb::new(228, 0, 88), Rgb::new(248, 56, 0), Rgb::new(228, 92, 16),
    Rgb::new(172, 124, 0), Rgb::new(0, 184, 0), Rgb::new(0, 168, 0), Rgb::new(0, 168, 68),
    Rgb::new(0, 136, 136), Rgb::new(0, 0, 0), Rgb::new(0, 0, 0), Rgb::new(0, 0, 0),
    Rgb::new(248, 248, 248), Rgb::new(60, 188, 252), Rgb::new(104, 136, 252), Rgb::new(152, 120, 248),
    Rgb::new(248, 120, 248), Rgb::new(248, 88, 152), Rgb::new(248, 120, 88), Rgb::new(252, 160, 68),
    Rgb::new(248, 184, 0), Rgb::new(184, 248, 24), Rgb::new(88, 216, 84), Rgb::new(88, 248, 152),
    Rgb::new(0, 232, 216), Rgb::new(120, 120, 120), Rgb::new(0, 0, 0), Rgb::new(0, 0, 0),
    Rgb::new(252, 252, 252), Rgb::new(164, 228, 252), Rgb::new(184, 184, 248), Rgb::new(216, 184, 248),
    Rgb::new(248, 184, 248), Rgb::new(248, 164, 192), Rgb::new(240, 208, 176), Rgb::new(252, 224, 168),
    Rgb::new(248, 216, 120), Rgb::new(216, 248, 120), Rgb::new(184, 248, 184), Rgb::new(184, 248, 216),
    Rgb::new(0, 252, 252), Rgb::new(248, 216, 248), Rgb::new(0, 0, 0), Rgb::new(0, 0, 0),
];

/// Look up a master palette color. Indices past the end clamp to the last entry.
#[inline]
pub fn color(index: usize) -> Rgb {
    MASTER_PALETTE[index.min(PALETTE_SIZE - 1)]
}

/// Signed variant of [`color`] for computed indices (e.g. `bg + 1`).
#[inline]
pub fn color_signed(index: i32) -> Rgb {
    color(index.max(0) as usize)
}

/// Per-world color selection.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WorldPalette {
    pub bg: u8,
    pub fg: [u8; 4],
    pub sprite: [u8; 3],
}

pub const WORLD_PALETTES: [WorldPalette; 5] = [
    // Green hills
    WorldPalette { bg: 0x22, fg: [0x1A, 0x29, 0x19, 0x09], sprite: [0x17, 0x27, 0x37] },
    // Underground
    WorldPalette { bg: 0x0F, fg: [0x03, 0x13, 0x23, 0x33], sprite: [0x15, 0x25, 0x35] },
    // Water
    WorldPalette { bg: 0x21, fg: [0x11, 0x21, 0x31, 0x0C], sprite: [0x16, 0x26, 0x36] },
    // Castle
    WorldPalette { bg: 0x07, fg: [0x07, 0x17, 0x27, 0x06], sprite: [0x08, 0x18, 0x28] },
    // Sky
    WorldPalette { bg: 0x2C, fg: [0x20, 0x30, 0x31, 0x3C], sprite: [0x14, 0x24, 0x34] },
];

impl WorldPalette {
    /// Palette for a world index (wraps every 5 worlds).
    pub fn for_world(world: u32) -> &'static WorldPalette {
        &WORLD_PALETTES[world as usize % WORLD_PALETTES.len()]
    }

    pub fn background(&self) -> Rgb {
        color(self.bg as usize)
    }

    /// Four sprite colors: the three sprite indices padded with 0x0F (black).
    pub fn sprite_colors(&self) -> [Rgb; 4] {
        let mut out = [color(0x0F); 4];
        for (slot, &idx) in out.iter_mut().zip(self.sprite.iter()) {
            *slot = color(idx as usize);
        }
        out
    }
}

/// Fixed 4-entry palettes for tiles that ignore the world palette.
pub const PIPE_PALETTE: [u8; 4] = [0x0F, 0x1A, 0x2A, 0x3A];
pub const QUESTION_PALETTE: [u8; 4] = [0x0F, 0x27, 0x37, 0x30];
pub const TITLE_SHELL_PALETTE: [u8; 4] = [0x11, 0x21, 0x31, 0x30];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_clamps_past_end() {
        assert_eq!(color(200), MASTER_PALETTE[63]);
        assert_eq!(color_signed(-4), MASTER_PALETTE[0]);
        assert_eq!(color(0x30), Rgb::new(252, 252, 252));
    }

    #[test]
    fn world_palette_wraps() {
        assert_eq!(WorldPalette::for_world(0), WorldPalette::for_world(5));
        assert_eq!(WorldPalette::for_world(3).bg, 0x07);
        assert_eq!(WorldPalette::for_world(7).bg, 0x21);
    }

    #[test]
    fn sprite_colors_pad_with_black() {
        let pal = WorldPalette::for_world(0);
        let colors = pal.sprite_colors();
        assert_eq!(colors[0], color(0x17));
        assert_eq!(colors[2], color(0x37));
        assert_eq!(colors[3], color(0x0F));
    }
}
