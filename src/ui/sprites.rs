/// Procedural 16x16 sprites built from character art.
///
/// ```text
///   '#'  shell/body      '@'  eyes (black)     ' '  transparent
///   'S'  skin            'R'  shirt            'B'  overalls (shoes on the last row)
/// ```
/// Enemy shells checker-dither between the two brighter sprite colors of
/// their world palette; the player uses a fixed palette.

use crate::domain::palette::{self, Rgb, WorldPalette, WORLD_PALETTES};

pub const SPRITE_SIZE: usize = 16;

/// Square RGBA-style image; `None` is transparent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteImage {
    pub size: usize,
    pub pixels: Vec<Option<Rgb>>,
}

impl SpriteImage {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        self.pixels[y * self.size + x]
    }
}

const ENEMY_ART: [&str; SPRITE_SIZE] = [
    "                ",
    "     ####       ",
    "    ######      ",
    "    #@@##@#     ",
    "    ######      ",
    "   ########     ",
    "  ##########    ",
    " ############   ",
    " #####  #####   ",
    " ####    ####   ",
    " ############   ",
    "  ##########    ",
    "   ########     ",
    "    ######      ",
    "    ##  ##      ",
    "   ###  ###     ",
];

const PLAYER_ART: [&str; SPRITE_SIZE] = [
    "                ",
    "     ####       ",
    "    ######      ",
    "    #SSSS#      ",
    "   #S@SS@S#     ",
    "   #SSSSSS#     ",
    "    ######      ",
    "   RRRRRRRR     ",
    "  RRRRRRRRRR    ",
    "  BBBRRBRBBB    ",
    "  BBBBBBBBB     ",
    "  BBBBBBBBB     ",
    "   BBBBBBB      ",
    "    BB  BB      ",
    "   SSS  SSS     ",
    "  BBBB  BBBB    ",
];

fn build(art: &[&str; SPRITE_SIZE], paint: impl Fn(char, usize, usize) -> Option<Rgb>) -> SpriteImage {
    let mut pixels = vec![None; SPRITE_SIZE * SPRITE_SIZE];
    for (y, row) in art.iter().enumerate() {
        for (x, ch) in row.chars().take(SPRITE_SIZE).enumerate() {
            pixels[y * SPRITE_SIZE + x] = paint(ch, x, y);
        }
    }
    SpriteImage { size: SPRITE_SIZE, pixels }
}

pub fn enemy_sprite(color_type: u32) -> SpriteImage {
    let colors = WorldPalette::for_world(color_type).sprite_colors();
    build(&ENEMY_ART, |ch, x, y| match ch {
        '#' => Some(colors[1 + (x + y) % 2]),
        '@' => Some(Rgb::BLACK),
        _ => None,
    })
}

pub fn player_sprite() -> SpriteImage {
    let green = palette::color(0x1A);
    let skin = palette::color(0x27);
    let red = palette::color(0x16);
    let blue = palette::color(0x11);
    let brown = palette::color(0x07);
    build(&PLAYER_ART, |ch, _x, y| match ch {
        '#' => Some(green),
        'S' => Some(skin),
        '@' => Some(Rgb::BLACK),
        'R' => Some(red),
        'B' if y == SPRITE_SIZE - 1 => Some(brown),
        'B' => Some(blue),
        _ => None,
    })
}

/// Every sprite the game draws, built once.
pub struct SpriteSet {
    pub player: SpriteImage,
    enemies: Vec<SpriteImage>,
}

impl SpriteSet {
    pub fn new() -> Self {
        SpriteSet {
            player: player_sprite(),
            enemies: (0..WORLD_PALETTES.len() as u32).map(enemy_sprite).collect(),
        }
    }

    /// Enemy tint wraps the same way the world palettes do.
    pub fn enemy(&self, color_type: u32) -> &SpriteImage {
        &self.enemies[color_type as usize % self.enemies.len()]
    }
}
