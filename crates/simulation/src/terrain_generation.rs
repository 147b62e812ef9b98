//! Procedural terrain: open land or an island, crossed by curved rivers,
//! dotted with lakes and covered in forest clumps.
//!
//! Everything is drawn from the city's [`SimRng`], so the same seed and
//! [`MapGenConfig`] always produce the same map.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::TileMap;
use crate::sim_rng::SimRng;
use crate::tiles::{tile_of, CHANNEL, DIRT, REDGE, RIVER, WOODS, WOODS_HIGH, WOODS_LOW};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IslandMode {
    /// One map in ten is an island.
    #[default]
    Sometimes,
    Never,
    Always,
}

/// Terrain knobs. A `None` level is chosen at random per map.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapGenConfig {
    pub island: IslandMode,
    pub tree_level: Option<i32>,
    pub lake_level: Option<i32>,
    pub curve_level: Option<i32>,
}

impl MapGenConfig {
    /// Bare dirt, nothing else.
    pub fn flat() -> Self {
        Self {
            island: IslandMode::Never,
            tree_level: Some(0),
            lake_level: Some(0),
            curve_level: Some(0),
        }
    }
}

/// Water margin kept around a naked island.
pub const ISLAND_RADIUS: i32 = 18;

/// Width of the guaranteed river border of an island.
const ISLAND_BORDER: i32 = 5;

// ---------------------------------------------------------------------------
// Stamps
// ---------------------------------------------------------------------------

#[rustfmt::skip]
const BIG_RIVER: [[u16; 9]; 9] = [
    [0, 0, 0, 3, 3, 3, 0, 0, 0],
    [0, 0, 3, 2, 2, 2, 3, 0, 0],
    [0, 3, 2, 2, 2, 2, 2, 3, 0],
    [3, 2, 2, 2, 2, 2, 2, 2, 3],
    [3, 2, 2, 2, 4, 2, 2, 2, 3],
    [3, 2, 2, 2, 2, 2, 2, 2, 3],
    [0, 3, 2, 2, 2, 2, 2, 3, 0],
    [0, 0, 3, 2, 2, 2, 3, 0, 0],
    [0, 0, 0, 3, 3, 3, 0, 0, 0],
];

#[rustfmt::skip]
const SMALL_RIVER: [[u16; 6]; 6] = [
    [0, 0, 3, 3, 0, 0],
    [0, 3, 2, 2, 3, 0],
    [3, 2, 2, 2, 2, 3],
    [3, 2, 2, 2, 2, 3],
    [0, 3, 2, 2, 3, 0],
    [0, 0, 3, 3, 0, 0],
];

/// Write one stamp cell. Off-map writes are dropped; channels are never
/// overwritten and open river only by a channel.
fn put_on_map(map: &mut TileMap, value: u16, x: i32, y: i32) {
    if value == 0 {
        return;
    }
    let Some(cell) = map.get(x, y) else {
        return;
    };
    let tile = tile_of(cell);
    if tile != DIRT {
        if tile == RIVER && value != CHANNEL {
            return;
        }
        if tile == CHANNEL {
            return;
        }
    }
    map.set(x, y, value);
}

fn plop_big_river(map: &mut TileMap, x: i32, y: i32) {
    for (dy, row) in BIG_RIVER.iter().enumerate() {
        for (dx, &value) in row.iter().enumerate() {
            put_on_map(map, value, x + dx as i32, y + dy as i32);
        }
    }
}

fn plop_small_river(map: &mut TileMap, x: i32, y: i32) {
    for (dy, row) in SMALL_RIVER.iter().enumerate() {
        for (dx, &value) in row.iter().enumerate() {
            put_on_map(map, value, x + dx as i32, y + dy as i32);
        }
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// Eight compass headings, clockwise from north.
const HEADING_DX: [i32; 8] = [0, 1, 1, 1, 0, -1, -1, -1];
const HEADING_DY: [i32; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Heading(usize);

impl Heading {
    /// One of the four axis headings.
    fn random_axis(rng: &mut SimRng) -> Self {
        Heading(rng.random(4) as usize * 2)
    }

    fn rotate(self, steps: usize) -> Self {
        Heading((self.0 + steps) % 8)
    }

    fn step(self, x: i32, y: i32) -> (i32, i32) {
        (x + HEADING_DX[self.0], y + HEADING_DY[self.0])
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Build a fresh map in place from the current random stream.
pub fn generate_map(map: &mut TileMap, rng: &mut SimRng, config: &MapGenConfig) {
    if config.island == IslandMode::Sometimes && rng.random(100) < 10 {
        make_island(map, rng, config);
        return;
    }
    if config.island == IslandMode::Always {
        make_naked_island(map, rng);
    } else {
        map.fill(DIRT);
    }

    if config.curve_level != Some(0) {
        let x = 40 + rng.random(map.width() - 79);
        let y = 33 + rng.random(map.height() - 66);
        do_rivers(map, rng, config, x, y);
    }
    if config.lake_level != Some(0) {
        make_lakes(map, rng, config);
    }
    smooth_river(map, rng);
    if config.tree_level != Some(0) {
        do_trees(map, rng, config);
    }
}

fn make_island(map: &mut TileMap, rng: &mut SimRng, config: &MapGenConfig) {
    make_naked_island(map, rng);
    smooth_river(map, rng);
    do_trees(map, rng, config);
}

/// Water everywhere, dirt more than [`ISLAND_BORDER`] tiles in.
pub fn fill_island_base(map: &mut TileMap) {
    map.fill(RIVER);
    for x in ISLAND_BORDER..map.width() - ISLAND_BORDER {
        for y in ISLAND_BORDER..map.height() - ISLAND_BORDER {
            map.set(x, y, DIRT);
        }
    }
}

/// An island with a ragged coast eaten in by river stamps.
pub fn make_naked_island(map: &mut TileMap, rng: &mut SimRng) {
    fill_island_base(map);
    let (w, h) = (map.width(), map.height());
    for x in (0..w - 5).step_by(2) {
        let y = rng.erandom(ISLAND_RADIUS);
        plop_big_river(map, x, y);
        let y = (h - 10) - rng.erandom(ISLAND_RADIUS);
        plop_big_river(map, x, y);
        plop_small_river(map, x, 0);
        plop_small_river(map, x, h - 6);
    }
    for y in (0..h - 5).step_by(2) {
        let x = rng.erandom(ISLAND_RADIUS);
        plop_big_river(map, x, y);
        let x = (w - 10) - rng.erandom(ISLAND_RADIUS);
        plop_big_river(map, x, y);
        plop_small_river(map, 0, y);
        plop_small_river(map, w - 6, y);
    }
}

fn do_rivers(map: &mut TileMap, rng: &mut SimRng, config: &MapGenConfig, x: i32, y: i32) {
    let heading = Heading::random_axis(rng);
    do_river(map, rng, config, x, y, heading, heading, true);

    let heading = heading.rotate(4);
    let local = do_river(map, rng, config, x, y, heading, heading, true);

    let heading = Heading::random_axis(rng);
    do_river(map, rng, config, x, y, heading, local, false);
}

/// Walk a river from (x, y) until it leaves the map, drifting off its
/// overall heading now and then. Returns the heading it ended on.
#[allow(clippy::too_many_arguments)]
fn do_river(
    map: &mut TileMap,
    rng: &mut SimRng,
    config: &MapGenConfig,
    mut x: i32,
    mut y: i32,
    heading: Heading,
    mut local: Heading,
    big: bool,
) -> Heading {
    let (rate1, rate2) = match config.curve_level {
        Some(level) if level >= 0 => (level + 10, level + 100),
        _ => (100, 200),
    };
    let reach = if big { 4 } else { 3 };
    while map.in_bounds(x + reach, y + reach) {
        if big {
            plop_big_river(map, x, y);
        } else {
            plop_small_river(map, x, y);
        }
        if rng.random(rate1 + 1) < 10 {
            local = heading;
        } else {
            if rng.random(rate2 + 1) > 90 {
                local = local.rotate(1);
            }
            if rng.random(rate2 + 1) > 90 {
                local = local.rotate(7);
            }
        }
        (x, y) = local.step(x, y);
    }
    local
}

fn make_lakes(map: &mut TileMap, rng: &mut SimRng, config: &MapGenConfig) {
    let lakes = match config.lake_level {
        Some(level) if level >= 0 => level / 2,
        _ => rng.random(11),
    };
    for _ in 0..lakes {
        let x = rng.random(map.width() - 20) + 10;
        let y = rng.random(map.height() - 19) + 10;
        make_single_lake(map, rng, x, y);
    }
}

fn make_single_lake(map: &mut TileMap, rng: &mut SimRng, x: i32, y: i32) {
    let plops = rng.random(13) + 2;
    for _ in 0..plops {
        let px = x + rng.random(13) - 6;
        let py = y + rng.random(13) - 6;
        if rng.one_in(5) {
            plop_big_river(map, px, py);
        } else {
            plop_small_river(map, px, py);
        }
    }
}

// ---------------------------------------------------------------------------
// Edge smoothing
// ---------------------------------------------------------------------------

const SMOOTH_DX: [i32; 4] = [-1, 0, 1, 0];
const SMOOTH_DY: [i32; 4] = [0, 1, 0, -1];

/// River edge tile for each west/south/east/north neighbour bitmask.
#[rustfmt::skip]
const RIVER_EDGE: [u16; 16] = [
    13, 13, 17, 15,
    5,  2,  19, 17,
    9,  11, 2,  13,
    7,  9,  5,  2,
];

/// Forest tile for each neighbour bitmask; 0 clears the lone tree.
#[rustfmt::skip]
const TREE_EDGE: [u16; 16] = [
    0,  0,  0,  34,
    0,  0,  36, 35,
    0,  32, 0,  33,
    30, 31, 29, 37,
];

fn neighbour_mask(map: &TileMap, x: i32, y: i32, hit: impl Fn(u16) -> bool) -> usize {
    let mut mask = 0;
    for d in 0..4 {
        mask <<= 1;
        if let Some(cell) = map.get(x + SMOOTH_DX[d], y + SMOOTH_DY[d]) {
            if hit(tile_of(cell)) {
                mask += 1;
            }
        }
    }
    mask & 15
}

fn is_tree_tile(tile: u16) -> bool {
    (WOODS_LOW..=WOODS_HIGH).contains(&tile)
}

/// Pick the edge tile of every raw river edge from its wet neighbours.
/// Rewritten tiles are seen by later cells in the same pass.
pub fn smooth_river(map: &mut TileMap, rng: &mut SimRng) {
    for x in 0..map.width() {
        for y in 0..map.height() {
            if map.tile(x, y) != Some(REDGE) {
                continue;
            }
            let mask = neighbour_mask(map, x, y, |t| t != DIRT && !is_tree_tile(t));
            let mut tile = RIVER_EDGE[mask];
            if tile != RIVER && rng.one_in(2) {
                tile += 1;
            }
            map.set(x, y, tile);
        }
    }
}

fn do_trees(map: &mut TileMap, rng: &mut SimRng, config: &MapGenConfig) {
    let amount = match config.tree_level {
        Some(level) if level >= 0 => level + 3,
        _ => rng.random(101) + 50,
    };
    let splashes = amount * map.width() / 120;
    for _ in 0..splashes {
        let x = rng.random(map.width());
        let y = rng.random(map.height());
        tree_splash(map, rng, config, x, y);
    }
    smooth_trees(map);
    smooth_trees(map);
}

/// A random walk that plants woods on bare dirt.
fn tree_splash(map: &mut TileMap, rng: &mut SimRng, config: &MapGenConfig, mut x: i32, mut y: i32) {
    let steps = match config.tree_level {
        Some(level) if level >= 0 => rng.random(101 + level * 2) + 50,
        _ => rng.random(151) + 50,
    };
    for _ in 0..steps {
        let heading = Heading(rng.random(8) as usize);
        (x, y) = heading.step(x, y);
        if !map.in_bounds(x, y) {
            return;
        }
        if map.tile(x, y) == Some(DIRT) {
            map.set(x, y, WOODS);
        }
    }
}

pub fn smooth_trees(map: &mut TileMap) {
    for x in 0..map.width() {
        for y in 0..map.height() {
            if map.tile(x, y).is_some_and(is_tree_tile) {
                smooth_trees_at(map, x, y, false);
            }
        }
    }
}

/// Shape the tree at (x, y) by its wooded neighbours. A lone tree is
/// cleared unless `preserve` is set.
pub fn smooth_trees_at(map: &mut TileMap, x: i32, y: i32, preserve: bool) {
    if !map.tile(x, y).is_some_and(is_tree_tile) {
        return;
    }
    let mask = neighbour_mask(map, x, y, is_tree_tile);
    let mut tile = TREE_EDGE[mask];
    if tile != 0 {
        if tile != WOODS && (x + y) & 1 == 1 {
            tile -= 8;
        }
        map.set(x, y, tile);
    } else if !preserve {
        map.set(x, y, DIRT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{is_water, LASTRIVEDGE};

    fn fresh(seed: u64, config: &MapGenConfig) -> TileMap {
        let mut map = TileMap::default();
        let mut rng = SimRng::from_seed_u64(seed);
        generate_map(&mut map, &mut rng, config);
        map
    }

    #[test]
    fn test_island_base_layout() {
        let mut map = TileMap::default();
        fill_island_base(&mut map);
        for (x, y, cell) in map.iter() {
            let border = x < 5 || y < 5 || x >= 115 || y >= 95;
            if border {
                assert_eq!(cell, RIVER, "({x}, {y})");
            } else {
                assert_eq!(cell, DIRT, "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_naked_island_keeps_its_shore() {
        let mut map = TileMap::default();
        let mut rng = SimRng::from_seed_u64(7);
        make_naked_island(&mut map, &mut rng);
        for (x, y, cell) in map.iter() {
            if x < 5 || y < 5 || x >= 115 || y >= 95 {
                assert!(is_water(tile_of(cell)), "({x}, {y})");
            }
        }
        assert_eq!(map.tile(60, 50), Some(DIRT));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = MapGenConfig::default();
        assert_eq!(fresh(1234, &config).cells(), fresh(1234, &config).cells());
        assert_ne!(fresh(1234, &config).cells(), fresh(4321, &config).cells());
    }

    #[test]
    fn test_flat_config_is_bare() {
        let map = fresh(99, &MapGenConfig::flat());
        assert!(map.cells().iter().all(|&c| c == DIRT));
    }

    #[test]
    fn test_no_raw_edges_survive() {
        let map = fresh(5, &MapGenConfig::default());
        assert!(map.cells().iter().all(|&c| tile_of(c) != REDGE));
        assert!(map.cells().iter().all(|&c| tile_of(c) <= WOODS_HIGH));
        assert!(map.cells().iter().any(|&c| tile_of(c) <= LASTRIVEDGE && c != DIRT));
    }

    #[test]
    fn test_river_stamp_respects_channels() {
        let mut map = TileMap::default();
        map.set(4, 4, CHANNEL);
        map.set(5, 4, RIVER);
        plop_big_river(&mut map, 0, 0);
        assert_eq!(map.tile(4, 4), Some(CHANNEL));
        assert_eq!(map.tile(5, 4), Some(RIVER));
        plop_big_river(&mut map, 1, 0);
        assert_eq!(map.tile(5, 4), Some(CHANNEL));
        plop_big_river(&mut map, -100, -100);
    }

    #[test]
    fn test_lone_tree_is_cleared() {
        let mut map = TileMap::default();
        map.set(10, 10, WOODS);
        smooth_trees(&mut map);
        assert_eq!(map.tile(10, 10), Some(DIRT));

        for x in 20..25 {
            for y in 20..25 {
                map.set(x, y, WOODS);
            }
        }
        smooth_trees(&mut map);
        assert_eq!(map.tile(22, 22), Some(WOODS));
        assert!(map.tile(20, 22).is_some_and(is_tree_tile));
    }
}
