use std::path::PathBuf;

use bevy::prelude::*;

use crate::city_file::{load_city, save_city};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event, Debug, Clone)]
pub struct SaveCityEvent {
    pub path: PathBuf,
}

#[derive(Event, Debug, Clone)]
pub struct LoadCityEvent {
    pub path: PathBuf,
}

/// Outcome of a save or load, sent once per request.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct CityFileDone {
    pub path: PathBuf,
    pub loaded: bool,
    /// The error message when the operation failed.
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveCityEvent>()
            .add_event::<LoadCityEvent>()
            .add_event::<CityFileDone>()
            .add_systems(Update, (exclusive_save, exclusive_load).chain());
    }
}

// ---------------------------------------------------------------------------
// Exclusive systems
// ---------------------------------------------------------------------------

/// Writes the city for every pending `SaveCityEvent`.
fn exclusive_save(world: &mut World) {
    let requests: Vec<SaveCityEvent> = world
        .resource_mut::<Events<SaveCityEvent>>()
        .drain()
        .collect();
    for SaveCityEvent { path } in requests {
        let error = match save_city(world, &path) {
            Ok(()) => {
                info!("saved city to {}", path.display());
                None
            }
            Err(e) => {
                warn!("save to {} failed: {e}", path.display());
                Some(e.to_string())
            }
        };
        world.send_event(CityFileDone {
            path,
            loaded: false,
            error,
        });
    }
}

/// Replaces the city for every pending `LoadCityEvent`. A failed load leaves
/// the current city untouched.
fn exclusive_load(world: &mut World) {
    let requests: Vec<LoadCityEvent> = world
        .resource_mut::<Events<LoadCityEvent>>()
        .drain()
        .collect();
    for LoadCityEvent { path } in requests {
        let error = match load_city(world, &path) {
            Ok(()) => {
                info!("loaded city from {}", path.display());
                None
            }
            Err(e) => {
                warn!("load from {} failed: {e}", path.display());
                Some(e.to_string())
            }
        };
        world.send_event(CityFileDone {
            path,
            loaded: error.is_none(),
            error,
        });
    }
}
