//! Integration tests using the `TestCity` harness.
//!
//! These tests spin up a headless Bevy App with `SimulationPlugin` and verify
//! behavior that only shows up when the tools, the phase cycle and the host
//! events run together.

mod harness_bootstrap;
mod power_tests;
mod simulation_invariants;
mod terrain_tests;
