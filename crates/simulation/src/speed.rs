use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Simulation speed presets.
///
/// Each preset is a fixed-update interval plus a number of simulation steps
/// per interval. Paused keeps a slow interval but runs no steps.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimSpeed {
    Paused,
    Slow,
    #[default]
    Normal,
    Fast,
    SuperFast,
}

impl SimSpeed {
    pub const ALL: [SimSpeed; 5] = [
        SimSpeed::Paused,
        SimSpeed::Slow,
        SimSpeed::Normal,
        SimSpeed::Fast,
        SimSpeed::SuperFast,
    ];

    pub fn interval(self) -> Duration {
        match self {
            SimSpeed::Paused => Duration::from_millis(999),
            SimSpeed::Slow => Duration::from_millis(625),
            SimSpeed::Normal => Duration::from_millis(125),
            SimSpeed::Fast | SimSpeed::SuperFast => Duration::from_millis(25),
        }
    }

    pub fn steps_per_update(self) -> u32 {
        match self {
            SimSpeed::Paused => 0,
            SimSpeed::SuperFast => 5,
            _ => 1,
        }
    }

    /// Index into the per-speed scan frequency tables.
    pub fn scan_rate(self) -> usize {
        match self {
            SimSpeed::Paused | SimSpeed::Slow => 0,
            SimSpeed::Normal => 1,
            SimSpeed::Fast | SimSpeed::SuperFast => 2,
        }
    }

    pub fn is_paused(self) -> bool {
        self == SimSpeed::Paused
    }

    /// Index stored in the city file.
    pub fn index(self) -> u16 {
        self as u16
    }

    pub fn from_index(i: u16) -> Self {
        Self::ALL
            .get(i as usize)
            .copied()
            .unwrap_or(SimSpeed::Normal)
    }
}

pub fn sim_not_paused(speed: Res<SimSpeed>) -> bool {
    !speed.is_paused()
}

/// Pushes the preset's interval into the fixed timestep.
pub fn sync_fixed_timestep(speed: Res<SimSpeed>, mut time: ResMut<Time<Fixed>>) {
    if speed.is_changed() {
        time.set_timestep(speed.interval());
    }
}

pub struct SimSpeedPlugin;

impl Plugin for SimSpeedPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimSpeed>()
            .add_systems(Update, sync_fixed_timestep);
    }
}
