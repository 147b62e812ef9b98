//! Engine-to-host notifications.
//!
//! Core code never talks to the host directly. It queues notifications in the
//! [`HostOutbox`] while a tick runs, and [`flush_host_events`] turns them into
//! typed Bevy events at the end of the tick.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::CityLocation;
use crate::grid::TileMap;
use crate::overlays::OverlayKind;
use crate::simulation_sets::SimulationSet;
use crate::sprites::CitySprite;

// =============================================================================
// Message and sound identifiers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    NeedResidential,
    NeedCommercial,
    NeedIndustrial,
    NeedRoads,
    NeedRail,
    NeedElectricity,
    NeedStadium,
    NeedSeaport,
    NeedAirport,
    NeedFireStation,
    NeedPolice,
    HighPollution,
    HighCrime,
    HighTraffic,
    TaxTooHigh,
    RoadNeedsFunding,
    FireNeedsFunding,
    PoliceNeedsFunding,
    NotEnoughPower,
    BlackoutsReported,
    FireReported,
    FloodReported,
    MonsterReported,
    TornadoReported,
    EarthquakeReported,
    MeltdownReported,
    PlaneCrash,
    ShipCrash,
    TrainCrash,
    BusCrash,
    CopterCrash,
    HeavyTrafficReported,
    ExplosionReported,
    ReachedTown,
    ReachedCity,
    ReachedCapital,
    ReachedMetropolis,
    ReachedMegalopolis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    ExplosionLow,
    ExplosionHigh,
    ExplosionBoth,
    UhUh,
    Sorry,
    Build,
    Bulldoze,
    HonkHonkLow,
    HonkHonkMed,
    HonkHonkHigh,
    Siren,
    HeavyTraffic,
    Monster,
}

// =============================================================================
// Bevy events delivered to the host
// =============================================================================

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileChanged {
    pub location: CityLocation,
}

/// The whole grid was replaced; per-tile changes were folded into this.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct MapChanged;

#[derive(Event, Debug, Clone, Copy)]
pub struct SpriteMoved {
    pub sprite: CitySprite,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayChanged {
    pub kind: OverlayKind,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityMessage {
    pub kind: MessageKind,
    pub location: Option<CityLocation>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitySound {
    pub kind: SoundKind,
    pub location: CityLocation,
}

// =============================================================================
// Outbox
// =============================================================================

/// Notifications queued during a tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct HostOutbox {
    pub messages: Vec<CityMessage>,
    pub sounds: Vec<CitySound>,
    pub sprites_moved: Vec<CitySprite>,
    pub overlays: Vec<OverlayKind>,
}

impl HostOutbox {
    pub fn message(&mut self, kind: MessageKind, location: Option<CityLocation>) {
        self.messages.push(CityMessage { kind, location });
    }

    pub fn message_at(&mut self, kind: MessageKind, x: i32, y: i32) {
        self.message(kind, Some(CityLocation::new(x, y)));
    }

    pub fn sound(&mut self, kind: SoundKind, x: i32, y: i32) {
        self.sounds.push(CitySound {
            kind,
            location: CityLocation::new(x, y),
        });
    }

    pub fn sprite_moved(&mut self, sprite: CitySprite) {
        self.sprites_moved.push(sprite);
    }

    pub fn overlay_changed(&mut self, kind: OverlayKind) {
        if !self.overlays.contains(&kind) {
            self.overlays.push(kind);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
            && self.sounds.is_empty()
            && self.sprites_moved.is_empty()
            && self.overlays.is_empty()
    }
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct HostWriters<'w> {
    tiles: EventWriter<'w, TileChanged>,
    map: EventWriter<'w, MapChanged>,
    sprites: EventWriter<'w, SpriteMoved>,
    overlays: EventWriter<'w, OverlayChanged>,
    messages: EventWriter<'w, CityMessage>,
    sounds: EventWriter<'w, CitySound>,
}

/// Deliver everything queued this tick, tile changes first.
pub fn flush_host_events(
    mut map: ResMut<TileMap>,
    mut outbox: ResMut<HostOutbox>,
    mut out: HostWriters,
) {
    let (whole, changed) = map.take_changes();
    if whole {
        out.map.send(MapChanged);
    } else {
        out.tiles
            .send_batch(changed.into_iter().map(|location| TileChanged { location }));
    }

    out.sprites.send_batch(
        outbox
            .sprites_moved
            .drain(..)
            .map(|sprite| SpriteMoved { sprite }),
    );
    out.overlays
        .send_batch(outbox.overlays.drain(..).map(|kind| OverlayChanged { kind }));
    out.messages.send_batch(outbox.messages.drain(..));
    out.sounds.send_batch(outbox.sounds.drain(..));
}

pub struct HostEventsPlugin;

impl Plugin for HostEventsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HostOutbox>()
            .add_event::<TileChanged>()
            .add_event::<MapChanged>()
            .add_event::<SpriteMoved>()
            .add_event::<OverlayChanged>()
            .add_event::<CityMessage>()
            .add_event::<CitySound>()
            .add_systems(
                FixedUpdate,
                flush_host_events.in_set(SimulationSet::PostSim),
            );
    }
}
