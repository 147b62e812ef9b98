//! Query and simulation-tick methods for `TestCity`.

use bevy::prelude::*;

use crate::budget::CityBudget;
use crate::census::CityCensus;
use crate::disasters::{DisasterKind, DisasterRequest};
use crate::events::CityMessage;
use crate::grid::TileMap;
use crate::overlays::CityOverlays;
use crate::settings::CityClock;
use crate::sim_rng::SimRng;
use crate::sprites::SpriteList;
use crate::tiles::tile_of;
use crate::tools::ToolApplied;

use super::TestCity;

impl TestCity {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by directly executing the `FixedUpdate`
    /// schedule. This bypasses Bevy's time system entirely, so a tick is one
    /// fixed update no matter how fast the test runs.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Queue a disaster for the next tick.
    pub fn request_disaster(&mut self, kind: DisasterKind) {
        self.app.world_mut().send_event(DisasterRequest { kind });
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<R: Resource>(&self) -> &R {
        self.app.world().resource::<R>()
    }

    pub fn map(&self) -> &TileMap {
        self.resource::<TileMap>()
    }

    /// Raw cell at (x, y), panicking off the map.
    pub fn cell(&self, x: i32, y: i32) -> u16 {
        match self.map().get(x, y) {
            Some(cell) => cell,
            None => panic!("({x}, {y}) is off the map"),
        }
    }

    /// Tile number at (x, y), without the power bit.
    pub fn tile(&self, x: i32, y: i32) -> u16 {
        tile_of(self.cell(x, y))
    }

    pub fn funds(&self) -> i64 {
        self.resource::<CityBudget>().funds
    }

    pub fn clock(&self) -> &CityClock {
        self.resource::<CityClock>()
    }

    pub fn census(&self) -> &CityCensus {
        self.resource::<CityCensus>()
    }

    pub fn overlays(&self) -> &CityOverlays {
        self.resource::<CityOverlays>()
    }

    pub fn sprites(&self) -> &SpriteList {
        self.resource::<SpriteList>()
    }

    /// Serialized random stream position, for comparing two runs.
    pub fn rng_snapshot(&self) -> Vec<u8> {
        self.resource::<SimRng>().snapshot()
    }

    /// Drain every `ToolApplied` event delivered so far.
    pub fn tool_results(&mut self) -> Vec<ToolApplied> {
        self.app
            .world_mut()
            .resource_mut::<Events<ToolApplied>>()
            .drain()
            .collect()
    }

    /// Drain every `CityMessage` delivered so far.
    pub fn messages(&mut self) -> Vec<CityMessage> {
        self.app
            .world_mut()
            .resource_mut::<Events<CityMessage>>()
            .drain()
            .collect()
    }
}
