//! A blocking loop that reads JSON commands from stdin and writes JSON
//! responses to stdout.
//!
//! Ticks are run by executing `FixedUpdate` directly, so `step` is exact and
//! independent of wall-clock time. Logs go to stderr; stdout carries only
//! the protocol.

use std::io::{BufRead, Write};
use std::path::Path;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use simulation::budget::CityBudget;
use simulation::disasters::DisasterRequest;
use simulation::events::{
    CityMessage, CitySound, MapChanged, OverlayChanged, SpriteMoved, TileChanged,
};
use simulation::host_protocol::{
    make_response, CityObservation, HostCommand, HostResponse, ResponsePayload,
};
use simulation::settings::CityClock;
use simulation::tools::{apply_tool_in_world, ToolApplied};
use simulation::{NewCityConfig, TickCounter};

/// Upper bound on a single `step`.
const MAX_STEP_TICKS: u32 = 10_000;

pub fn build_app(seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(LogPlugin::default());
    app.insert_resource(NewCityConfig {
        seed,
        generate_terrain: true,
    });
    app.add_plugins((simulation::SimulationPlugin, save::SavePlugin));
    // Run Startup.
    app.update();
    app
}

pub fn run(seed: u64) {
    let mut app = build_app(seed);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    write_response(&mut stdout, &make_response(ResponsePayload::Ready));
    info!("headless city ready (seed {seed}), waiting for commands on stdin");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("stdin read error: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<HostCommand>(&line) {
            Ok(cmd) => process_command(cmd, app.world_mut()),
            Err(e) => make_response(ResponsePayload::Error {
                message: format!("Parse error: {e}"),
            }),
        };
        let goodbye = response.payload == ResponsePayload::Goodbye;
        write_response(&mut stdout, &response);
        if goodbye {
            break;
        }
    }

    info!("headless city shutting down");
}

fn write_response(out: &mut impl Write, response: &HostResponse) {
    match serde_json::to_string(response) {
        Ok(json) => {
            let _ = writeln!(out, "{json}");
        }
        Err(e) => {
            error!("could not serialize response: {e}");
            let _ = writeln!(
                out,
                r#"{{"protocol_version":1,"type":"error","message":"internal error"}}"#
            );
        }
    }
    let _ = out.flush();
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

pub fn process_command(cmd: HostCommand, world: &mut World) -> HostResponse {
    let payload = match cmd {
        HostCommand::Observe => ResponsePayload::Observation {
            observation: CityObservation::capture(world),
        },

        HostCommand::Step { ticks } => {
            for _ in 0..ticks.min(MAX_STEP_TICKS) {
                world.run_schedule(FixedUpdate);
            }
            ResponsePayload::StepComplete {
                tick: world.resource::<TickCounter>().0,
                city_time: world.resource::<CityClock>().city_time,
                messages: drain_host_events(world),
            }
        }

        HostCommand::Generate { seed } => {
            simulation::generate_some_city(world, seed);
            drain_host_events(world);
            ResponsePayload::Ok
        }

        HostCommand::Tool { tool, x, y } => ResponsePayload::ToolResult {
            result: apply_tool_in_world(world, tool, x, y),
        },

        HostCommand::SetSpeed { speed } => {
            world.insert_resource(speed);
            ResponsePayload::Ok
        }

        HostCommand::SetTax { rate } => {
            world.resource_mut::<CityBudget>().set_tax_rate(rate);
            ResponsePayload::Ok
        }

        // Starts on the next step.
        HostCommand::Disaster { kind } => {
            world.send_event(DisasterRequest { kind });
            ResponsePayload::Ok
        }

        HostCommand::Save { path } => match save::save_city(world, Path::new(&path)) {
            Ok(()) => {
                info!("saved city to {path}");
                ResponsePayload::Ok
            }
            Err(e) => ResponsePayload::Error {
                message: format!("save failed: {e}"),
            },
        },

        HostCommand::Load { path } => match save::load_city(world, Path::new(&path)) {
            Ok(()) => {
                info!("loaded city from {path}");
                drain_host_events(world);
                ResponsePayload::Ok
            }
            Err(e) => ResponsePayload::Error {
                message: format!("load failed: {e}"),
            },
        },

        HostCommand::Quit => ResponsePayload::Goodbye,
    };
    make_response(payload)
}

fn clear_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.clear();
    }
}

/// Nothing advances the event buffers between fixed updates here, so the
/// loop empties them itself. Returns the city messages.
fn drain_host_events(world: &mut World) -> Vec<CityMessage> {
    clear_events::<TileChanged>(world);
    clear_events::<MapChanged>(world);
    clear_events::<SpriteMoved>(world);
    clear_events::<OverlayChanged>(world);
    clear_events::<CitySound>(world);
    clear_events::<ToolApplied>(world);
    world
        .get_resource_mut::<Events<CityMessage>>()
        .map(|mut events| events.drain().collect())
        .unwrap_or_default()
}
