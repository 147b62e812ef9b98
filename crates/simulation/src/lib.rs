use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod budget;
pub mod census;
pub mod config;
pub mod context;
pub mod crime;
pub mod cycle;
pub mod disasters;
pub mod evaluation;
pub mod events;
pub mod fire;
pub mod geometry;
pub mod grid;
pub mod host_protocol;
pub mod overlays;
pub mod pollution;
pub mod population_density;
pub mod power;
pub mod settings;
pub mod sim_rng;
pub mod simulation_sets;
pub mod speed;
pub mod sprites;
pub mod terrain_generation;
pub mod tile_behavior;
pub mod tiles;
pub mod tools;
pub mod traffic;
pub mod zones;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use simulation_sets::SimulationSet;

use budget::CityBudget;
use census::{CityCensus, CityHistory};
use evaluation::CityEvaluation;
use grid::TileMap;
use overlays::CityOverlays;
use settings::{CityClock, CitySettings, GameLevel};
use sim_rng::SimRng;
use sprites::SpriteList;
use terrain_generation::{generate_map, MapGenConfig};
use tiles::TileRegistry;
use zones::demand::DemandValves;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented each FixedUpdate.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// How the city is set up when the app starts.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct NewCityConfig {
    /// Seed for the terrain and the simulation's random stream.
    pub seed: u64,
    /// Generate terrain at startup. When false the map starts as bare dirt
    /// and the host is expected to generate or load a city.
    pub generate_terrain: bool,
}

impl Default for NewCityConfig {
    fn default() -> Self {
        Self {
            seed: random_seed(),
            generate_terrain: true,
        }
    }
}

/// Generate a random seed from the current system time.
pub fn random_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

/// Throw away the current city and grow fresh terrain from `seed`.
///
/// Every piece of city state is reset; settings, speed and the terrain
/// knobs in [`MapGenConfig`] are kept.
pub fn generate_some_city(world: &mut World, seed: u64) {
    let config = world
        .get_resource::<MapGenConfig>()
        .cloned()
        .unwrap_or_default();
    let level = world
        .get_resource::<CitySettings>()
        .map(|s| s.game_level)
        .unwrap_or(GameLevel::Easy);

    let mut rng = SimRng::from_seed_u64(seed);
    let mut map = TileMap::default();
    generate_map(&mut map, &mut rng, &config);
    map.mark_all_changed();

    world.insert_resource(map);
    world.insert_resource(rng);
    world.insert_resource(CityOverlays::default());
    world.insert_resource(CityCensus::default());
    world.insert_resource(CityHistory::default());
    world.insert_resource(DemandValves::default());
    world.insert_resource(CityBudget::for_level(level));
    world.insert_resource(CityEvaluation::default());
    world.insert_resource(CityClock::default());
    world.insert_resource(SpriteList::default());
    info!("generated city from seed {seed} (island mode {:?})", config.island);
}

fn setup_new_city(world: &mut World) {
    let Some(config) = world.get_resource::<NewCityConfig>().cloned() else {
        return;
    };
    if config.generate_terrain {
        generate_some_city(world, config.seed);
    }
}

pub fn tick_counter(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let specs = match TileRegistry::load_default() {
            Ok(specs) => specs,
            Err(e) => panic!("built-in tile table is invalid: {e}"),
        };

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::PreSim,
                SimulationSet::Simulation,
                SimulationSet::PostSim,
            )
                .chain(),
        );

        app.insert_resource(specs)
            .init_resource::<TickCounter>()
            .init_resource::<NewCityConfig>()
            .init_resource::<MapGenConfig>()
            .init_resource::<TileMap>()
            .init_resource::<CityOverlays>()
            .init_resource::<CityCensus>()
            .init_resource::<CityHistory>()
            .init_resource::<DemandValves>()
            .init_resource::<CityBudget>()
            .init_resource::<CityEvaluation>()
            .init_resource::<CityClock>()
            .init_resource::<CitySettings>()
            .init_resource::<SpriteList>()
            .add_systems(Startup, setup_new_city)
            .add_systems(FixedUpdate, tick_counter.in_set(SimulationSet::PreSim));

        app.add_plugins((
            sim_rng::SimRngPlugin,
            speed::SimSpeedPlugin,
            events::HostEventsPlugin,
            tools::ToolsPlugin,
            disasters::DisastersPlugin,
            cycle::CyclePlugin,
        ));
    }
}
