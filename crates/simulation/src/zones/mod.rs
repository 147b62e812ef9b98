//! Zone engine: growth and decline of residential, commercial and
//! industrial zones, plus the special buildings that share the zone scan.
//!
//! Every routine here runs on a zone-center tile found by the map scan and
//! addresses the building's footprint through [`TileRegistry::building`].
//!
//! [`TileRegistry::building`]: crate::tiles::TileRegistry::building

pub mod commercial;
pub mod demand;
pub mod industrial;
pub mod residential;
pub mod special;

use crate::context::SimContext;
use crate::tiles::{
    is_indestructible, tile_of, COMCLR, FLOOD, HOSPITAL, INDCLR, NUCLEAR, PORTBASE, POWERPLANT,
    PWRBIT, ROADBASE, RUBBLE,
};

/// Offset a zone score is measured against before comparing with a signed
/// 16-bit random draw.
const GROWTH_BIAS: i32 = 26380;

/// Survey the zone centred at (x, y): set its power, count it, and let it
/// grow or decline.
pub fn do_zone(ctx: &mut SimContext, x: i32, y: i32, cell: u16) {
    let powered = set_zone_power(ctx, x, y, cell);
    if powered {
        ctx.census.powered_zone_count += 1;
    } else {
        ctx.census.unpowered_zone_count += 1;
    }

    let tile = tile_of(cell);
    if tile > PORTBASE {
        special::do_special_zone(ctx, x, y, tile, powered);
    } else if tile < HOSPITAL {
        residential::do_residential(ctx, x, y, tile, powered);
    } else if tile < COMCLR {
        special::do_hospital_church(ctx, x, y, tile);
    } else if tile < INDCLR {
        commercial::do_commercial(ctx, x, y, tile, powered);
    } else {
        industrial::do_industrial(ctx, x, y, tile, powered);
    }
}

/// Reconcile the zone's power bit with the power grid, switching the
/// footprint's powered artwork on or off on a transition. Returns whether
/// the zone is powered.
pub fn set_zone_power(ctx: &mut SimContext, x: i32, y: i32, cell: u16) -> bool {
    let tile = tile_of(cell);
    let was_powered = cell & PWRBIT != 0;
    let powered =
        tile == NUCLEAR || tile == POWERPLANT || ctx.overlays.power_grid.get(x, y);
    if powered != was_powered {
        ctx.map.set_powered(x, y, powered);
        switch_footprint(ctx, x, y, tile, powered);
    }
    powered
}

fn switch_footprint(ctx: &mut SimContext, x: i32, y: i32, center: u16, on: bool) {
    let Some(info) = ctx.specs.building(center) else {
        return;
    };
    for (dx, dy, _) in info.cells() {
        let Some(cell) = ctx.map.get(x + dx, y + dy) else {
            continue;
        };
        let spec = ctx.specs.get(cell);
        let target = if on { spec.on_power } else { spec.on_shutdown };
        if let Some(t) = target {
            ctx.map.set(x + dx, y + dy, t | (cell & PWRBIT));
        }
    }
}

/// Replace the footprint around (x, y) with the building whose center tile
/// is `center`. Fails without writing when the footprint covers flood,
/// radiation or fire. Rubble is built over and off-map members are skipped.
pub fn zone_plop(ctx: &mut SimContext, x: i32, y: i32, center: u16) -> bool {
    let Some(info) = ctx.specs.building(center) else {
        return false;
    };
    let blocked = info.cells().any(|(dx, dy, _)| {
        ctx.map
            .tile(x + dx, y + dy)
            .is_some_and(|t| (FLOOD..ROADBASE).contains(&t))
    });
    if blocked {
        return false;
    }
    let powered = ctx.map.is_powered(x, y);
    for (dx, dy, member) in info.cells() {
        ctx.map.set(x + dx, y + dy, member);
    }
    if powered {
        ctx.map.set_powered(x, y, true);
    }
    true
}

/// Write the building's footprint unconditionally, keeping each cell's
/// power bit.
pub fn redraw_zone(ctx: &mut SimContext, x: i32, y: i32, center: u16) {
    let Some(info) = ctx.specs.building(center) else {
        return;
    };
    for (dx, dy, member) in info.cells() {
        if let Some(cell) = ctx.map.get(x + dx, y + dy) {
            ctx.map.set(x + dx, y + dy, member | (cell & PWRBIT));
        }
    }
}

/// Restore bulldozed or damaged members of a building. Animated members
/// and disaster tiles are left alone.
pub fn repair_zone(ctx: &mut SimContext, x: i32, y: i32, center: u16) {
    let Some(info) = ctx.specs.building(center) else {
        return;
    };
    for (dx, dy, member) in info.cells() {
        if (dx, dy) == (0, 0) {
            continue;
        }
        let Some(cell) = ctx.map.get(x + dx, y + dy) else {
            continue;
        };
        let tile = tile_of(cell);
        if ctx.specs.is_zone_center(cell) || ctx.specs.is_animated(cell) {
            continue;
        }
        // Powered artwork stands in for its member.
        if ctx.specs.get(cell).on_shutdown.is_some() {
            continue;
        }
        if is_indestructible(tile) || tile == member {
            continue;
        }
        ctx.map.set(x + dx, y + dy, member | (cell & PWRBIT));
    }
}

/// A building was destroyed: slow local growth and turn whatever is left of
/// its footprint into rubble.
pub fn kill_zone(ctx: &mut SimContext, x: i32, y: i32, center: u16) {
    let rog = ctx.overlays.rate_of_growth.world_get(x, y);
    ctx.overlays.rate_of_growth.world_set(x, y, rog - 20);

    let Some(info) = ctx.specs.building(center) else {
        return;
    };
    for (dx, dy, _) in info.cells() {
        let Some(cell) = ctx.map.get(x + dx, y + dy) else {
            continue;
        };
        // Powered artwork counts as the member it replaces.
        let spec = ctx.specs.get(cell);
        let member = spec.on_shutdown.map_or(spec, |t| ctx.specs.get(t));
        let owned = (dx, dy) == (0, 0)
            || (member.owner == Some(center) && member.owner_offset == (dx, dy));
        if owned {
            let rubble = RUBBLE + ctx.rng.random(4) as u16;
            ctx.map.set(x + dx, y + dy, rubble);
        }
    }
}

/// Land value class 0..=3 at (x, y), net of pollution.
pub(crate) fn land_value_class(ctx: &SimContext, x: i32, y: i32) -> i32 {
    let value = ctx.overlays.land_value.world_get(x, y) - ctx.overlays.pollution.world_get(x, y);
    match value {
        v if v < 30 => 0,
        v if v < 80 => 1,
        v if v < 150 => 2,
        _ => 3,
    }
}

/// Should a zone with this score grow this time around?
pub(crate) fn rolls_growth(ctx: &mut SimContext, score: i32) -> bool {
    score > -350 && score - GROWTH_BIAS > ctx.rng.random16_signed()
}

/// Should a zone with this score decline this time around?
pub(crate) fn rolls_decline(ctx: &mut SimContext, score: i32) -> bool {
    score < 350 && score + GROWTH_BIAS < ctx.rng.random16_signed()
}
