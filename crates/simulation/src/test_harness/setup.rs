//! Builder methods for map, budget and settings setup in integration tests.

use crate::budget::CityBudget;
use crate::grid::TileMap;
use crate::settings::CitySettings;
use crate::speed::SimSpeed;
use crate::tools::{apply_tool_in_world, Tool, ToolRequest, ToolResult};

use super::TestCity;

impl TestCity {
    // -----------------------------------------------------------------------
    // Budget and settings
    // -----------------------------------------------------------------------

    /// Set the city treasury to the given amount.
    pub fn with_funds(mut self, funds: i64) -> Self {
        self.app.world_mut().resource_mut::<CityBudget>().funds = funds;
        self
    }

    pub fn with_disasters(mut self, enabled: bool) -> Self {
        self.app
            .world_mut()
            .resource_mut::<CitySettings>()
            .disasters_enabled = enabled;
        self
    }

    pub fn with_auto_bulldoze(mut self, enabled: bool) -> Self {
        self.app
            .world_mut()
            .resource_mut::<CitySettings>()
            .auto_bulldoze = enabled;
        self
    }

    pub fn with_speed(mut self, speed: SimSpeed) -> Self {
        self.app.world_mut().insert_resource(speed);
        self
    }

    // -----------------------------------------------------------------------
    // Map
    // -----------------------------------------------------------------------

    /// Write a raw cell, bypassing the tools.
    pub fn with_tile(mut self, x: i32, y: i32, cell: u16) -> Self {
        self.app.world_mut().resource_mut::<TileMap>().set(x, y, cell);
        self
    }

    /// Apply a tool and panic unless it succeeds.
    pub fn with_tool(mut self, tool: Tool, x: i32, y: i32) -> Self {
        let result = self.apply_tool(tool, x, y);
        assert_eq!(
            result,
            ToolResult::Success,
            "{tool:?} at ({x}, {y}) failed during setup"
        );
        self
    }

    /// Lay a straight road from (x0, y0) to (x1, y1). The line must be
    /// horizontal or vertical.
    pub fn with_road_line(self, x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        self.with_line(Tool::Road, x0, y0, x1, y1)
    }

    /// Lay a straight run of a network tool (road, rail or wire).
    pub fn with_line(mut self, tool: Tool, x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        assert!(
            x0 == x1 || y0 == y1,
            "line ({x0}, {y0}) -> ({x1}, {y1}) is not straight"
        );
        for x in x0.min(x1)..=x0.max(x1) {
            for y in y0.min(y1)..=y0.max(y1) {
                self = self.with_tool(tool, x, y);
            }
        }
        self
    }

    // -----------------------------------------------------------------------
    // Tools
    // -----------------------------------------------------------------------

    /// Apply a tool right now, outside the schedule.
    pub fn apply_tool(&mut self, tool: Tool, x: i32, y: i32) -> ToolResult {
        apply_tool_in_world(self.app.world_mut(), tool, x, y)
    }

    /// Queue a tool request for the next tick.
    pub fn request_tool(&mut self, tool: Tool, x: i32, y: i32) {
        self.app
            .world_mut()
            .send_event(ToolRequest { tool, x, y });
    }
}
