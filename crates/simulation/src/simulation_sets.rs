//! Ordering of the city's systems inside `FixedUpdate`.
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – Host input that must land between ticks: tool requests,
//!   disaster triggers, the tick counter.
//! * **Simulation** – The simulation steps themselves.
//! * **PostSim** – Delivery of the tick's notifications to the host. Reads
//!   simulation state and never mutates it.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
///
/// `SimulationPlugin` configures them as a chain. Plugins use
/// `.in_set(SimulationSet::X)` when registering their systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    PreSim,
    Simulation,
    PostSim,
}
