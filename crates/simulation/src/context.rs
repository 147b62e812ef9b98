//! The simulation context handed to every core routine.
//!
//! Core code is written against plain `&mut` references so it can be driven
//! from a Bevy system, a tool request or a unit test alike. [`CityParams`]
//! gathers the resources inside a system and lends them out as a
//! [`SimContext`].

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::budget::CityBudget;
use crate::census::{CityCensus, CityHistory};
use crate::evaluation::CityEvaluation;
use crate::events::HostOutbox;
use crate::grid::TileMap;
use crate::overlays::CityOverlays;
use crate::settings::{CityClock, CitySettings};
use crate::sim_rng::SimRng;
use crate::speed::SimSpeed;
use crate::sprites::SpriteList;
use crate::tiles::TileRegistry;
use crate::zones::demand::DemandValves;

pub struct SimContext<'a> {
    pub specs: &'a TileRegistry,
    pub map: &'a mut TileMap,
    pub rng: &'a mut SimRng,
    pub overlays: &'a mut CityOverlays,
    pub census: &'a mut CityCensus,
    pub history: &'a mut CityHistory,
    pub valves: &'a mut DemandValves,
    pub budget: &'a mut CityBudget,
    pub evaluation: &'a mut CityEvaluation,
    pub clock: &'a mut CityClock,
    pub settings: &'a CitySettings,
    pub sprites: &'a mut SpriteList,
    pub outbox: &'a mut HostOutbox,
    /// Index into the per-speed scan frequency tables.
    pub scan_rate: usize,
}

impl SimContext<'_> {
    /// Raw cell at (x, y), or 0 (dirt) off the grid.
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> u16 {
        self.map.get(x, y).unwrap_or(0)
    }

    /// Tile number at (x, y), or 0 (dirt) off the grid.
    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> u16 {
        self.map.tile(x, y).unwrap_or(0)
    }

    #[inline]
    pub fn set_tile(&mut self, x: i32, y: i32, cell: u16) -> bool {
        self.map.set(x, y, cell)
    }
}

#[derive(SystemParam)]
pub struct CityParams<'w> {
    pub specs: Res<'w, TileRegistry>,
    pub map: ResMut<'w, TileMap>,
    pub rng: ResMut<'w, SimRng>,
    pub overlays: ResMut<'w, CityOverlays>,
    pub census: ResMut<'w, CityCensus>,
    pub history: ResMut<'w, CityHistory>,
    pub valves: ResMut<'w, DemandValves>,
    pub budget: ResMut<'w, CityBudget>,
    pub evaluation: ResMut<'w, CityEvaluation>,
    pub clock: ResMut<'w, CityClock>,
    pub settings: Res<'w, CitySettings>,
    pub sprites: ResMut<'w, SpriteList>,
    pub outbox: ResMut<'w, HostOutbox>,
    pub speed: Res<'w, SimSpeed>,
}

impl CityParams<'_> {
    pub fn ctx(&mut self) -> SimContext<'_> {
        SimContext {
            specs: &self.specs,
            map: &mut self.map,
            rng: &mut self.rng,
            overlays: &mut self.overlays,
            census: &mut self.census,
            history: &mut self.history,
            valves: &mut self.valves,
            budget: &mut self.budget,
            evaluation: &mut self.evaluation,
            clock: &mut self.clock,
            settings: &self.settings,
            sprites: &mut self.sprites,
            outbox: &mut self.outbox,
            scan_rate: self.speed.scan_rate(),
        }
    }
}

/// An owned copy of every city resource, for driving core code without an
/// `App`.
#[derive(Debug, Clone)]
pub struct CityState {
    pub specs: TileRegistry,
    pub map: TileMap,
    pub rng: SimRng,
    pub overlays: CityOverlays,
    pub census: CityCensus,
    pub history: CityHistory,
    pub valves: DemandValves,
    pub budget: CityBudget,
    pub evaluation: CityEvaluation,
    pub clock: CityClock,
    pub settings: CitySettings,
    pub sprites: SpriteList,
    pub outbox: HostOutbox,
    pub scan_rate: usize,
}

impl CityState {
    /// A blank dirt map with default resources and the built-in tile table.
    ///
    /// # Panics
    ///
    /// Panics if the embedded tile table fails to parse.
    pub fn new(seed: u64) -> Self {
        let specs = match TileRegistry::load_default() {
            Ok(specs) => specs,
            Err(e) => panic!("built-in tile table is invalid: {e}"),
        };
        Self {
            specs,
            map: TileMap::default(),
            rng: SimRng::from_seed_u64(seed),
            overlays: CityOverlays::default(),
            census: CityCensus::default(),
            history: CityHistory::default(),
            valves: DemandValves::default(),
            budget: CityBudget::default(),
            evaluation: CityEvaluation::default(),
            clock: CityClock::default(),
            settings: CitySettings::default(),
            sprites: SpriteList::default(),
            outbox: HostOutbox::default(),
            scan_rate: SimSpeed::default().scan_rate(),
        }
    }

    pub fn ctx(&mut self) -> SimContext<'_> {
        SimContext {
            specs: &self.specs,
            map: &mut self.map,
            rng: &mut self.rng,
            overlays: &mut self.overlays,
            census: &mut self.census,
            history: &mut self.history,
            valves: &mut self.valves,
            budget: &mut self.budget,
            evaluation: &mut self.evaluation,
            clock: &mut self.clock,
            settings: &self.settings,
            sprites: &mut self.sprites,
            outbox: &mut self.outbox,
            scan_rate: self.scan_rate,
        }
    }

    /// Tile number at (x, y), or 0 off the grid.
    pub fn tile_at(&self, x: i32, y: i32) -> u16 {
        self.map.tile(x, y).unwrap_or(0)
    }
}
