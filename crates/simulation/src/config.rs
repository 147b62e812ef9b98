pub const WORLD_W: usize = 120;
pub const WORLD_H: usize = 100;
/// Pixels per tile edge; sprite positions are in pixels.
pub const CELL_SIZE: i32 = 16;

/// Tile edge of one cell in the half-resolution overlays (pollution, land
/// value, crime, population density, traffic density).
pub const HALF_BLOCK: usize = 2;
/// Terrain density overlay.
pub const QUARTER_BLOCK: usize = 4;
/// Rate-of-growth, station coverage and commercial rate overlays.
pub const EIGHTH_BLOCK: usize = 8;

/// City-time steps between 10-step history snapshots.
pub const CENSUS_FREQUENCY_10: u32 = 4;
/// City-time steps between 120-step history snapshots.
pub const CENSUS_FREQUENCY_120: u32 = CENSUS_FREQUENCY_10 * 12;
/// City-time steps between tax collections.
pub const TAX_FREQUENCY: u32 = 48;

/// Length of each history array, both halves included.
pub const HISTORY_LENGTH: usize = 240;
pub const HISTORY_HALF: usize = HISTORY_LENGTH / 2;

/// Animation cycle wraps at this value.
pub const ANIMATION_CYCLE: u32 = 960;

pub const MAX_ROAD_EFFECT: i32 = 32;
pub const MAX_POLICE_STATION_EFFECT: i32 = 1000;
pub const MAX_FIRE_STATION_EFFECT: i32 = 1000;

/// Longest walk a generated car takes looking for a destination.
pub const MAX_TRAFFIC_DISTANCE: usize = 30;

/// Starting funds for easy, medium and hard.
pub const STARTING_FUNDS: [i64; 3] = [20_000, 10_000, 5_000];
