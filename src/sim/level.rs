/// Procedural level generator.
///
/// ## Determinism
///
/// Each `generate` call builds its own PRNG seeded with
/// `world * 100 + level_num`, so the same pair always yields the same
/// tilemap no matter what else the program has drawn from other generators.
///
/// ## Column pass (x = 0..width)
///
/// ```text
///   h = 25 + trunc(2 · sin(0.1 · x))        rolling ground line
///   rows h.. = Solid
///   x % 20 == 10 → platform : row h − rand(5..=10), 5 columns   (row > 10)
///   x % 35 == 20 → pipe     : rand(3..=6) rows above h, columns x, x+1
///   x % 15 == 7  → ? block  : row h − rand(4..=8)                (row > 10)
/// ```
///
/// Random draws happen in that order within a column, and only for
/// columns that match, which keeps the sequence stable.
///
/// ## Enemies
///
/// One enemy every 200 px starting at x = 20, all at y = 180, tinted by
/// world index.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::domain::entity::Enemy;
use crate::domain::pattern::TILE_SIZE;
use crate::domain::physics::LevelBounds;
use crate::domain::tile::{Tile, Tilemap};

pub const LEVEL_WIDTH: usize = 256;
pub const LEVEL_HEIGHT: usize = 30;

const BASE_GROUND: i32 = 25;
/// Rows at or above this are never used for platforms or blocks.
const PLAYABLE_TOP: i32 = 10;

const PLATFORM_PERIOD: usize = 20;
const PLATFORM_OFFSET: usize = 10;
const PLATFORM_LEN: usize = 5;

const PIPE_PERIOD: usize = 35;
const PIPE_OFFSET: usize = 20;

const BLOCK_PERIOD: usize = 15;
const BLOCK_OFFSET: usize = 7;

const ENEMY_FIRST_X: usize = 20;
const ENEMY_SPACING: usize = 200;
const ENEMY_SPAWN_Y: f32 = 180.0;

/// Levels per world (indices 0..=3) and worlds per game (0..=4).
pub const LEVELS_PER_WORLD: u32 = 4;
pub const WORLD_COUNT: u32 = 5;

/// Distance from the right edge, in tiles, of the goal line.
const GOAL_MARGIN_TILES: usize = 10;

/// A playable level: static terrain plus its enemy roster.
#[derive(Clone, Debug)]
pub struct Level {
    pub world: u32,
    #[allow(dead_code)]
    pub level_num: u32,
    pub tiles: Tilemap,
    pub enemies: Vec<Enemy>,
}

impl Level {
    pub fn new(world: u32, level_num: u32) -> Self {
        let tiles = generate(world, level_num);
        let enemies = spawn_enemies(world, &tiles);
        tracing::debug!(
            world,
            level = level_num,
            seed = seed_for(world, level_num),
            enemies = enemies.len(),
            "level generated"
        );
        Level { world, level_num, tiles, enemies }
    }

    pub fn pixel_width(&self) -> f32 {
        self.tiles.pixel_width() as f32
    }

    pub fn bounds(&self) -> LevelBounds {
        LevelBounds::new(self.pixel_width())
    }

    /// Player x beyond which the level counts as cleared.
    pub fn goal_x(&self) -> f32 {
        (self.tiles.width().saturating_sub(GOAL_MARGIN_TILES) * TILE_SIZE) as f32
    }
}

pub fn seed_for(world: u32, level_num: u32) -> u64 {
    world as u64 * 100 + level_num as u64
}

/// Ground row for a column: the first solid row from the top.
pub fn ground_height(x: usize) -> i32 {
    BASE_GROUND + ((x as f64 * 0.1).sin() * 2.0) as i32
}

pub fn generate(world: u32, level_num: u32) -> Tilemap {
    let mut rng = Pcg32::seed_from_u64(seed_for(world, level_num));
    let mut map = Tilemap::new(LEVEL_WIDTH, LEVEL_HEIGHT);

    for x in 0..LEVEL_WIDTH {
        let h = ground_height(x);

        for y in h.max(0) as usize..LEVEL_HEIGHT {
            map.set(x, y, Tile::Solid);
        }

        if x % PLATFORM_PERIOD == PLATFORM_OFFSET {
            let row = h - rng.random_range(5..=10);
            if row > PLAYABLE_TOP {
                for dx in 0..PLATFORM_LEN {
                    map.set(x + dx, row as usize, Tile::Solid);
                }
            }
        }

        if x % PIPE_PERIOD == PIPE_OFFSET {
            let pipe_height: i32 = rng.random_range(3..=6);
            for dy in 0..pipe_height {
                let y = h - 1 - dy;
                if y >= 0 {
                    map.set(x, y as usize, Tile::Pipe);
                    map.set(x + 1, y as usize, Tile::Pipe);
                }
            }
        }

        if x % BLOCK_PERIOD == BLOCK_OFFSET {
            let row = h - rng.random_range(4..=8);
            if row > PLAYABLE_TOP {
                map.set(x, row as usize, Tile::Question);
            }
        }
    }

    map
}

pub fn spawn_enemies(world: u32, tiles: &Tilemap) -> Vec<Enemy> {
    (ENEMY_FIRST_X..tiles.pixel_width())
        .step_by(ENEMY_SPACING)
        .map(|x| Enemy::new(x as f32, ENEMY_SPAWN_Y, world))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        for (w, l) in [(0, 0), (2, 3), (4, 1)] {
            assert_eq!(generate(w, l).to_bytes(), generate(w, l).to_bytes());
        }
    }

    #[test]
    fn different_levels_differ() {
        assert_ne!(generate(0, 0).to_bytes(), generate(0, 1).to_bytes());
    }

    #[test]
    fn ground_band_is_mostly_solid() {
        let map = generate(0, 0);
        let solid = map.row(25).iter().filter(|&&t| t == Tile::Solid).count();
        assert!(solid * 2 > map.width(), "row 25 solid in {solid} columns");
        // Bottom row is always ground
        assert!(map.row(LEVEL_HEIGHT - 1).iter().all(|&t| t == Tile::Solid));
    }

    #[test]
    fn pipes_come_in_adjacent_pairs() {
        let map = generate(0, 0);
        let has_pair = (0..map.height()).any(|y| {
            map.row(y).windows(2).any(|w| w[0] == Tile::Pipe && w[1] == Tile::Pipe)
        });
        assert!(has_pair);
        // The first pipe sits at column 20
        assert_eq!(map.get(20, (ground_height(20) - 2) as i64), Tile::Pipe);
        assert_eq!(map.get(21, (ground_height(20) - 2) as i64), Tile::Pipe);
    }

    #[test]
    fn nothing_generated_in_the_sky_band() {
        for (w, l) in [(0, 0), (1, 2), (3, 3)] {
            let map = generate(w, l);
            for y in 0..=PLAYABLE_TOP as usize {
                assert!(map.row(y).iter().all(|t| t.is_empty()), "world {w} level {l} row {y}");
            }
        }
    }

    #[test]
    fn question_blocks_only_on_their_columns() {
        let map = generate(1, 1);
        for y in 0..map.height() {
            for (x, &t) in map.row(y).iter().enumerate() {
                if t == Tile::Question {
                    assert_eq!(x % BLOCK_PERIOD, BLOCK_OFFSET);
                }
            }
        }
    }

    #[test]
    fn enemies_spaced_and_tinted() {
        let level = Level::new(3, 0);
        assert_eq!(level.enemies.len(), 11);
        assert_eq!(level.enemies[0].body.x, 20.0);
        assert_eq!(level.enemies[1].body.x, 220.0);
        assert!(level.enemies.iter().all(|e| e.color_type == 3 && e.alive));
        assert!(level.enemies.iter().all(|e| e.body.y == ENEMY_SPAWN_Y));
    }

    #[test]
    fn goal_line_near_right_edge() {
        let level = Level::new(0, 0);
        assert_eq!(level.goal_x(), ((LEVEL_WIDTH - 10) * 8) as f32);
        assert_eq!(level.pixel_width(), 2048.0);
    }
}
