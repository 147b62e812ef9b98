//! Zones, service buildings, power plants and parks.

use super::preview::PreviewBuilder;
use super::ToolResult;
use crate::events::SoundKind;
use crate::tiles::{
    tile_of, DIRT, FIRSTRIVEDGE, FOUNTAIN, LASTRUBBLE, LASTTINYEXP, POWERBASE, TINYEXP, WOODS2,
};

pub const PARK_COST: i64 = 10;
const AUTO_DOZE_COST: i64 = 1;

/// Can the auto-bulldozer clear this tile to make room for a building?
fn clearable(tile: u16) -> bool {
    (FIRSTRIVEDGE..=LASTRUBBLE).contains(&tile)
        || (POWERBASE + 2..=POWERBASE + 12).contains(&tile)
        || (TINYEXP..=LASTTINYEXP + 2).contains(&tile)
}

/// Stamp the building whose zone centre is `center` with the centre at
/// (x, y). The footprint must be on the map and clear.
pub fn place_building(b: &mut PreviewBuilder, x: i32, y: i32, center: u16, cost: i64) -> ToolResult {
    let specs = b.ctx.specs;
    let Some(info) = specs.building(center) else {
        return ToolResult::Failed;
    };
    let auto_bulldoze = b.ctx.settings.auto_bulldoze;

    let mut dozed = 0;
    for (dx, dy, _) in info.cells() {
        let (mx, my) = (x + dx, y + dy);
        if !b.in_bounds(mx, my) {
            return ToolResult::UhOh;
        }
        let tile = tile_of(b.get(mx, my));
        if tile == DIRT {
            continue;
        }
        if auto_bulldoze && clearable(tile) {
            dozed += 1;
        } else {
            return ToolResult::UhOh;
        }
    }

    for (dx, dy, member) in info.cells() {
        b.set(x + dx, y + dy, member);
    }
    b.add_cost(cost + dozed * AUTO_DOZE_COST);
    b.sound(SoundKind::Build);
    ToolResult::Success
}

pub fn place_park(b: &mut PreviewBuilder, x: i32, y: i32) -> ToolResult {
    if !b.in_bounds(x, y) {
        return ToolResult::UhOh;
    }
    if tile_of(b.get(x, y)) != DIRT {
        return ToolResult::UhOh;
    }
    let value = b.ctx.rng.random(5) as u16;
    let tile = if value == 4 { FOUNTAIN } else { WOODS2 + value };
    b.set(x, y, tile);
    b.add_cost(PARK_COST);
    b.sound(SoundKind::Build);
    ToolResult::Success
}
