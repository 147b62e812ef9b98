//! JSON protocol for driving a city from another process.
//!
//! Each line of input is one [`HostCommand`] tagged by its `cmd` field. Each
//! line of output is one [`HostResponse`] carrying the protocol version and a
//! payload tagged by `type`. The I/O loop lives in the `micropolis` binary;
//! the types live here so they can be tested without it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::budget::CityBudget;
use crate::census::CityCensus;
use crate::disasters::DisasterKind;
use crate::evaluation::{CityClass, CityEvaluation};
use crate::events::CityMessage;
use crate::settings::CityClock;
use crate::speed::SimSpeed;
use crate::sprites::SpriteList;
use crate::tools::{Tool, ToolResult};
use crate::zones::demand::DemandValves;
use crate::TickCounter;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum HostCommand {
    /// Snapshot the headline numbers.
    Observe,
    /// Advance the simulation by `ticks` fixed updates.
    Step { ticks: u32 },
    /// Throw the city away and grow new terrain.
    Generate { seed: u64 },
    Tool { tool: Tool, x: i32, y: i32 },
    SetSpeed { speed: SimSpeed },
    SetTax { rate: i32 },
    Disaster { kind: DisasterKind },
    Save { path: String },
    Load { path: String },
    Quit,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    Ready,
    Observation { observation: CityObservation },
    ToolResult { result: ToolResult },
    /// The simulation advanced; lists the messages raised on the way.
    StepComplete {
        tick: u64,
        city_time: u32,
        messages: Vec<CityMessage>,
    },
    Ok,
    Error { message: String },
    Goodbye,
}

/// Current protocol version. Bump when the command/response schema changes.
pub const PROTOCOL_VERSION: u32 = 1;

pub fn make_response(payload: ResponsePayload) -> HostResponse {
    HostResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CityObservation {
    pub tick: u64,
    pub city_time: u32,
    pub year: u32,
    pub month: u32,
    pub funds: i64,
    pub tax_rate: i32,
    pub population: i64,
    pub city_class: CityClass,
    pub score: i32,
    pub res_valve: i32,
    pub com_valve: i32,
    pub ind_valve: i32,
    pub speed: SimSpeed,
    pub sprites: usize,
}

impl CityObservation {
    pub fn capture(world: &World) -> Self {
        let clock = world.resource::<CityClock>();
        let budget = world.resource::<CityBudget>();
        let evaluation = world.resource::<CityEvaluation>();
        let valves = world.resource::<DemandValves>();
        Self {
            tick: world.resource::<TickCounter>().0,
            city_time: clock.city_time,
            year: clock.year(),
            month: clock.month(),
            funds: budget.funds,
            tax_rate: budget.tax_rate,
            population: world.resource::<CityCensus>().city_population(),
            city_class: evaluation.city_class,
            score: evaluation.score,
            res_valve: valves.res_valve,
            com_valve: valves.com_valve,
            ind_valve: valves.ind_valve,
            speed: *world.resource::<SimSpeed>(),
            sprites: world.resource::<SpriteList>().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_step_command() {
        let cmd: HostCommand = serde_json::from_str(r#"{"cmd":"step","ticks":100}"#).unwrap();
        assert_eq!(cmd, HostCommand::Step { ticks: 100 });
    }

    #[test]
    fn test_deserialize_tool_command() {
        let json = r#"{"cmd":"tool","tool":"coal_power","x":10,"y":12}"#;
        let cmd: HostCommand = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            HostCommand::Tool {
                tool: Tool::CoalPower,
                x: 10,
                y: 12
            }
        );
    }

    #[test]
    fn test_deserialize_setting_commands() {
        let cmd: HostCommand =
            serde_json::from_str(r#"{"cmd":"set_speed","speed":"super_fast"}"#).unwrap();
        assert_eq!(
            cmd,
            HostCommand::SetSpeed {
                speed: SimSpeed::SuperFast
            }
        );
        let cmd: HostCommand = serde_json::from_str(r#"{"cmd":"set_tax","rate":9}"#).unwrap();
        assert_eq!(cmd, HostCommand::SetTax { rate: 9 });
        let cmd: HostCommand =
            serde_json::from_str(r#"{"cmd":"disaster","kind":"meltdown"}"#).unwrap();
        assert_eq!(
            cmd,
            HostCommand::Disaster {
                kind: DisasterKind::Meltdown
            }
        );
    }

    #[test]
    fn test_deserialize_file_commands() {
        let cmd: HostCommand =
            serde_json::from_str(r#"{"cmd":"save","path":"/tmp/a.cty"}"#).unwrap();
        assert_eq!(
            cmd,
            HostCommand::Save {
                path: "/tmp/a.cty".to_string()
            }
        );
        let cmd: HostCommand = serde_json::from_str(r#"{"cmd":"quit"}"#).unwrap();
        assert_eq!(cmd, HostCommand::Quit);
    }

    #[test]
    fn test_unknown_command_is_a_parse_error() {
        assert!(serde_json::from_str::<HostCommand>(r#"{"cmd":"nonexistent"}"#).is_err());
        assert!(serde_json::from_str::<HostCommand>(r#"{not valid json"#).is_err());
    }

    #[test]
    fn test_serialize_responses() {
        let json = serde_json::to_string(&make_response(ResponsePayload::Ready)).unwrap();
        assert!(json.contains("\"protocol_version\":1"));
        assert!(json.contains("\"type\":\"ready\""));

        let json = serde_json::to_string(&make_response(ResponsePayload::ToolResult {
            result: ToolResult::InsufficientFunds,
        }))
        .unwrap();
        assert!(json.contains("\"type\":\"tool_result\""));
        assert!(json.contains("\"result\":\"insufficient_funds\""));

        let json = serde_json::to_string(&make_response(ResponsePayload::StepComplete {
            tick: 42,
            city_time: 1,
            messages: Vec::new(),
        }))
        .unwrap();
        assert!(json.contains("\"type\":\"step_complete\""));
        assert!(json.contains("\"tick\":42"));
    }

    #[test]
    fn test_observation_reads_the_world() {
        let mut city = crate::test_harness::TestCity::new().with_funds(777);
        city.tick(32);
        let obs = CityObservation::capture(city.world_mut());
        assert_eq!(obs.tick, 32);
        assert_eq!(obs.city_time, 1);
        assert_eq!(obs.year, 1900);
        assert_eq!(obs.speed, SimSpeed::Normal);
        assert!(obs.funds <= 777);
    }
}
