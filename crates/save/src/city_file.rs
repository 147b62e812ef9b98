//! Encoding a whole city to bytes and back, and moving it in and out of
//! the `World`.

use std::path::Path;

use bevy::prelude::*;
use simulation::budget::CityBudget;
use simulation::census::{CityCensus, CityHistory};
use simulation::config::{HISTORY_LENGTH, WORLD_H, WORLD_W};
use simulation::evaluation::CityEvaluation;
use simulation::events::MapChanged;
use simulation::grid::TileMap;
use simulation::overlays::CityOverlays;
use simulation::settings::{CityClock, CitySettings};
use simulation::speed::SimSpeed;
use simulation::sprites::SpriteList;
use simulation::tiles::{TileRegistry, LOMASK, PWRBIT, TILE_COUNT};
use simulation::zones::demand::DemandValves;

use crate::atomic_write::atomic_write;
use crate::misc_block::{clamp16, MiscBlock, MISC_WORDS};
use crate::save_error::SaveError;

const HISTORY_WORDS: usize = 6 * HISTORY_LENGTH;
const MAP_WORDS: usize = WORLD_W * WORLD_H;

/// Size of a city file in bytes.
pub const FILE_SIZE: usize = 2 * (HISTORY_WORDS + MISC_WORDS + MAP_WORDS);

/// Everything a city file holds.
#[derive(Debug, Clone, PartialEq)]
pub struct CityFile {
    pub history: CityHistory,
    pub misc: MiscBlock,
    /// Row-major cells: tile number plus the power bit.
    pub cells: Vec<u16>,
}

// =============================================================================
// Codec
// =============================================================================

/// Serialize `file`. The status bits of each map word are derived from
/// `specs`.
pub fn encode_city(file: &CityFile, specs: &TileRegistry) -> Vec<u8> {
    let mut words = Vec::with_capacity(FILE_SIZE / 2);
    for series in file.history.arrays() {
        words.extend((0..HISTORY_LENGTH).map(|i| series.get(i).copied().unwrap_or(0) as u16));
    }
    words.extend_from_slice(&file.misc.to_words());
    for x in 0..WORLD_W {
        for y in 0..WORLD_H {
            let cell = file.cells.get(y * WORLD_W + x).copied().unwrap_or(0);
            let cell = cell & (LOMASK | PWRBIT);
            words.push(cell | specs.export_flags(cell));
        }
    }
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Parse a city file. Status bits in the map words are dropped.
pub fn decode_city(bytes: &[u8]) -> Result<CityFile, SaveError> {
    if bytes.len() < FILE_SIZE {
        return Err(SaveError::Truncated {
            expected: FILE_SIZE,
            found: bytes.len(),
        });
    }
    if bytes.len() > FILE_SIZE {
        return Err(SaveError::BadLength {
            expected: FILE_SIZE,
            found: bytes.len(),
        });
    }
    let words: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect();
    let (history_words, rest) = words.split_at(HISTORY_WORDS);
    let (misc_words, map_words) = rest.split_at(MISC_WORDS);

    let mut series = history_words
        .chunks_exact(HISTORY_LENGTH)
        .map(|c| c.iter().map(|&w| w as i16).collect::<Vec<i16>>());
    let mut next = || series.next().unwrap_or_else(|| vec![0; HISTORY_LENGTH]);
    let history = CityHistory {
        residential: next(),
        commercial: next(),
        industrial: next(),
        crime: next(),
        pollution: next(),
        money: next(),
    };

    let mut misc = [0u16; MISC_WORDS];
    misc.copy_from_slice(misc_words);
    let misc = MiscBlock::from_words(&misc)?;

    let mut cells = vec![0u16; MAP_WORDS];
    for (i, &word) in map_words.iter().enumerate() {
        let (x, y) = (i / WORLD_H, i % WORLD_H);
        let tile = word & LOMASK;
        if tile as usize >= TILE_COUNT {
            return Err(SaveError::BadTile {
                x: x as i32,
                y: y as i32,
                tile,
            });
        }
        cells[y * WORLD_W + x] = tile | (word & PWRBIT);
    }

    Ok(CityFile {
        history,
        misc,
        cells,
    })
}

// =============================================================================
// World access
// =============================================================================

/// Snapshot the live city.
pub fn capture(world: &World) -> CityFile {
    let census = world.resource::<CityCensus>();
    let valves = world.resource::<DemandValves>();
    let overlays = world.resource::<CityOverlays>();
    let settings = world.resource::<CitySettings>();
    let evaluation = world.resource::<CityEvaluation>();
    let budget = world.resource::<CityBudget>();

    let misc = MiscBlock {
        res_pop: clamp16(census.res_pop as i64),
        com_pop: clamp16(census.com_pop as i64),
        ind_pop: clamp16(census.ind_pop as i64),
        res_valve: clamp16(valves.res_valve as i64),
        com_valve: clamp16(valves.com_valve as i64),
        ind_valve: clamp16(valves.ind_valve as i64),
        city_time: world.resource::<CityClock>().city_time.min(i32::MAX as u32) as i32,
        crime_ramp: clamp16(census.crime_ramp as i64),
        pollution_ramp: clamp16(census.pollution_ramp as i64),
        land_value_average: clamp16(overlays.land_value_average as i64),
        crime_average: clamp16(overlays.crime_average as i64),
        pollution_average: clamp16(overlays.pollution_average as i64),
        game_level: settings.game_level,
        city_class: evaluation.city_class,
        city_score: clamp16(evaluation.score as i64),
        funds: budget.funds.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        auto_bulldoze: settings.auto_bulldoze,
        auto_budget: settings.auto_budget,
        auto_go: settings.auto_go,
        sound_on: settings.sound_on,
        tax_rate: clamp16(budget.tax_rate as i64),
        speed: *world.resource::<SimSpeed>(),
        police_percent: budget.police_percent,
        fire_percent: budget.fire_percent,
        road_percent: budget.road_percent,
    };

    CityFile {
        history: world.resource::<CityHistory>().clone(),
        misc,
        cells: world.resource::<TileMap>().cells().to_vec(),
    }
}

/// Replace the live city with `file`. Scratch state the next scans rebuild
/// (overlays, census counters, sprites) starts from scratch.
pub fn restore(world: &mut World, file: CityFile) {
    let misc = file.misc;

    let mut map = TileMap::default();
    map.replace_cells(WORLD_W, WORLD_H, file.cells);
    // Announced directly below; the next flush has nothing left to send.
    map.take_changes();
    world.insert_resource(map);
    world.insert_resource(file.history);

    world.insert_resource(CityCensus {
        res_pop: misc.res_pop as i32,
        com_pop: misc.com_pop as i32,
        ind_pop: misc.ind_pop as i32,
        crime_ramp: misc.crime_ramp as i32,
        pollution_ramp: misc.pollution_ramp as i32,
        ..CityCensus::default()
    });
    world.insert_resource(DemandValves {
        res_valve: misc.res_valve as i32,
        com_valve: misc.com_valve as i32,
        ind_valve: misc.ind_valve as i32,
        ..DemandValves::default()
    });

    let mut overlays = CityOverlays::default();
    overlays.land_value_average = misc.land_value_average as i32;
    overlays.crime_average = misc.crime_average as i32;
    overlays.pollution_average = misc.pollution_average as i32;
    world.insert_resource(overlays);

    world.insert_resource(CityClock {
        city_time: misc.city_time as u32,
        new_power: true,
        ..CityClock::default()
    });

    {
        let mut settings = world.resource_mut::<CitySettings>();
        settings.game_level = misc.game_level;
        settings.auto_bulldoze = misc.auto_bulldoze;
        settings.auto_budget = misc.auto_budget;
        settings.auto_go = misc.auto_go;
        settings.sound_on = misc.sound_on;
    }

    world.insert_resource(CityEvaluation {
        city_class: misc.city_class,
        score: misc.city_score as i32,
        ..CityEvaluation::default()
    });

    let mut budget = CityBudget::for_level(misc.game_level);
    budget.funds = misc.funds as i64;
    budget.set_tax_rate(misc.tax_rate as i32);
    budget.police_percent = misc.police_percent;
    budget.fire_percent = misc.fire_percent;
    budget.road_percent = misc.road_percent;
    world.insert_resource(budget);

    world.insert_resource(misc.speed);
    world.insert_resource(SpriteList::default());
    world.send_event(MapChanged);
}

/// Write the live city to `path`.
pub fn save_city(world: &World, path: &Path) -> Result<(), SaveError> {
    let file = capture(world);
    let bytes = encode_city(&file, world.resource::<TileRegistry>());
    atomic_write(path, &bytes)?;
    Ok(())
}

/// Replace the live city with the one stored at `path`.
pub fn load_city(world: &mut World, path: &Path) -> Result<(), SaveError> {
    let bytes = std::fs::read(path)?;
    let file = decode_city(&bytes)?;
    restore(world, file);
    Ok(())
}
