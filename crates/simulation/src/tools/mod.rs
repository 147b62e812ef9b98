//! Player tools: the one path by which the host edits the map between
//! ticks.
//!
//! Every tool first works out a [`ToolPreview`] against the live map without
//! touching it, then commits the preview in a single step. Hosts that want
//! to show a ghost of the change before committing call [`preview_tool`];
//! everything else goes through [`apply_tool`] or a [`ToolRequest`] event.

mod building;
mod bulldozer;
mod connect;
mod preview;

pub use connect::Network;
pub use preview::{PreviewBuilder, ToolPreview};

use bevy::ecs::system::SystemState;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::context::{CityParams, SimContext};
use crate::tiles::{
    AIRPORT, COMCLR, FIRESTATION, FREEZ, INDCLR, NUCLEAR, POLICESTATION, PORT, POWERPLANT, STADIUM,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Bulldozer,
    Road,
    Rail,
    Wire,
    Park,
    Residential,
    Commercial,
    Industrial,
    FireStation,
    PoliceStation,
    Stadium,
    Seaport,
    CoalPower,
    NuclearPower,
    Airport,
}

impl Tool {
    pub const ALL: [Tool; 15] = [
        Tool::Bulldozer,
        Tool::Road,
        Tool::Rail,
        Tool::Wire,
        Tool::Park,
        Tool::Residential,
        Tool::Commercial,
        Tool::Industrial,
        Tool::FireStation,
        Tool::PoliceStation,
        Tool::Stadium,
        Tool::Seaport,
        Tool::CoalPower,
        Tool::NuclearPower,
        Tool::Airport,
    ];

    /// Zone centre and price of the building this tool places.
    pub fn building(self) -> Option<(u16, i64)> {
        match self {
            Tool::Residential => Some((FREEZ, 100)),
            Tool::Commercial => Some((COMCLR, 100)),
            Tool::Industrial => Some((INDCLR, 100)),
            Tool::FireStation => Some((FIRESTATION, 500)),
            Tool::PoliceStation => Some((POLICESTATION, 500)),
            Tool::Stadium => Some((STADIUM, 5000)),
            Tool::Seaport => Some((PORT, 3000)),
            Tool::CoalPower => Some((POWERPLANT, 3000)),
            Tool::NuclearPower => Some((NUCLEAR, 5000)),
            Tool::Airport => Some((AIRPORT, 10000)),
            Tool::Bulldozer | Tool::Road | Tool::Rail | Tool::Wire | Tool::Park => None,
        }
    }

    fn network(self) -> Option<Network> {
        match self {
            Tool::Road => Some(Network::Road),
            Tool::Rail => Some(Network::Rail),
            Tool::Wire => Some(Network::Wire),
            _ => None,
        }
    }
}

/// Outcome of applying a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResult {
    Success,
    /// Off the map or the spot is taken.
    UhOh,
    InsufficientFunds,
    /// The spot must be cleared first.
    NeedBulldoze,
    /// Nothing to do here.
    Failed,
}

impl ToolResult {
    pub fn is_success(self) -> bool {
        self == ToolResult::Success
    }
}

/// Work out what `tool` would do at (x, y) without changing anything.
pub fn preview_tool(ctx: &mut SimContext, tool: Tool, x: i32, y: i32) -> ToolPreview {
    let mut b = PreviewBuilder::new(ctx, x, y);
    let result = if let Some(network) = tool.network() {
        connect::connect_tile(&mut b, x, y, network)
    } else if let Some((center, cost)) = tool.building() {
        building::place_building(&mut b, x, y, center, cost)
    } else if tool == Tool::Park {
        building::place_park(&mut b, x, y)
    } else {
        bulldozer::bulldoze(&mut b, x, y)
    };
    b.finish(result)
}

/// Preview `tool` at (x, y) and commit it.
pub fn apply_tool(ctx: &mut SimContext, tool: Tool, x: i32, y: i32) -> ToolResult {
    let preview = preview_tool(ctx, tool, x, y);
    let result = preview.apply(ctx, x, y);
    if result.is_success() {
        ctx.clock.new_power = true;
    } else {
        debug!("{tool:?} at ({x}, {y}) rejected: {result:?}");
    }
    result
}

/// Apply a tool straight against a `World`, outside any schedule.
pub fn apply_tool_in_world(world: &mut World, tool: Tool, x: i32, y: i32) -> ToolResult {
    let mut state: SystemState<CityParams> = SystemState::new(world);
    let mut city = state.get_mut(world);
    let result = apply_tool(&mut city.ctx(), tool, x, y);
    state.apply(world);
    result
}

impl SimContext<'_> {
    pub fn apply_tool(&mut self, tool: Tool, x: i32, y: i32) -> ToolResult {
        apply_tool(self, tool, x, y)
    }
}

// =============================================================================
// Events
// =============================================================================

/// Host request to use a tool before the next tick.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool: Tool,
    pub x: i32,
    pub y: i32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolApplied {
    pub tool: Tool,
    pub x: i32,
    pub y: i32,
    pub result: ToolResult,
}

/// Drain queued tool requests in arrival order.
pub fn handle_tool_requests(
    mut requests: EventReader<ToolRequest>,
    mut applied: EventWriter<ToolApplied>,
    mut city: CityParams,
) {
    for &ToolRequest { tool, x, y } in requests.read() {
        let result = apply_tool(&mut city.ctx(), tool, x, y);
        applied.send(ToolApplied { tool, x, y, result });
    }
}

pub struct ToolsPlugin;

impl Plugin for ToolsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ToolRequest>()
            .add_event::<ToolApplied>()
            .add_systems(
                FixedUpdate,
                handle_tool_requests.in_set(crate::SimulationSet::PreSim),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::tiles::{DIRT, ROADS};

    #[test]
    fn test_preview_leaves_map_alone() {
        let mut state = CityState::new(1);
        let preview = preview_tool(&mut state.ctx(), Tool::Residential, 10, 10);
        assert_eq!(preview.result, ToolResult::Success);
        assert_eq!(preview.cost, 100);
        assert_eq!((preview.width, preview.height), (3, 3));
        assert_eq!(preview.offset, (-1, -1));
        assert_eq!(state.tile_at(10, 10), DIRT);
    }

    #[test]
    fn test_success_charges_exactly_preview_cost() {
        let mut state = CityState::new(1);
        state.budget.funds = 50_000;
        for (i, tool) in Tool::ALL.into_iter().enumerate() {
            let x = 8 + (i as i32 % 5) * 20;
            let y = 10 + (i as i32 / 5) * 20;
            let before = state.budget.funds;
            let preview = preview_tool(&mut state.ctx(), tool, x, y);
            let result = state.ctx().apply_tool(tool, x, y);
            if tool == Tool::Bulldozer {
                assert_eq!(result, ToolResult::Failed);
                continue;
            }
            assert_eq!(result, ToolResult::Success, "{tool:?}");
            assert_eq!(state.budget.funds, before - preview.cost, "{tool:?}");
        }
    }

    #[test]
    fn test_broke_city_cannot_build() {
        let mut state = CityState::new(1);
        state.budget.funds = 50;
        assert_eq!(
            apply_tool(&mut state.ctx(), Tool::Residential, 10, 10),
            ToolResult::InsufficientFunds
        );
        assert_eq!(apply_tool(&mut state.ctx(), Tool::Road, 10, 10), ToolResult::Success);
        assert_eq!(state.tile_at(10, 10), ROADS);
        assert_eq!(state.budget.funds, 40);
    }
}
