//! # TestCity: headless integration test harness
//!
//! Provides a fluent builder that wraps `bevy::app::App` + `SimulationPlugin`
//! for running integration tests without a window or renderer.

mod assertions;
mod queries;
mod setup;

use bevy::prelude::*;

use crate::sim_rng::SimRng;
use crate::terrain_generation::MapGenConfig;
use crate::{NewCityConfig, SimulationPlugin};

/// A headless Bevy App wrapping `SimulationPlugin` for integration testing.
///
/// Use builder methods to set up city state, then call `tick()` to advance the
/// simulation and query/assert on the resulting state.
pub struct TestCity {
    app: App,
}

impl TestCity {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new **empty** city: a bare dirt map with every resource at
    /// its default and the random stream seeded with 1.
    pub fn new() -> Self {
        let config = NewCityConfig {
            seed: 1,
            generate_terrain: false,
        };
        Self::build(config, None)
    }

    /// Create a city whose terrain is generated from `seed`.
    pub fn generated(seed: u64) -> Self {
        Self::generated_with(seed, MapGenConfig::default())
    }

    /// Like [`TestCity::generated`] with explicit terrain knobs.
    pub fn generated_with(seed: u64, mapgen: MapGenConfig) -> Self {
        let config = NewCityConfig {
            seed,
            generate_terrain: true,
        };
        Self::build(config, Some(mapgen))
    }

    fn build(config: NewCityConfig, mapgen: Option<MapGenConfig>) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);

        // Inserted before the plugin so its init_resource calls keep them.
        app.insert_resource(SimRng::from_seed_u64(config.seed));
        if let Some(mapgen) = mapgen {
            app.insert_resource(mapgen);
        }
        app.insert_resource(config);
        app.add_plugins(SimulationPlugin);

        // Run one update so Startup systems execute.
        app.update();

        Self { app }
    }
}

impl Default for TestCity {
    fn default() -> Self {
        Self::new()
    }
}
