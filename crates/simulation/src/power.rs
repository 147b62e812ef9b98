//! Power distribution: a flood along conductive tiles from every plant,
//! limited by total generating capacity.

use bevy::prelude::*;

use crate::context::SimContext;
use crate::events::MessageKind;
use crate::geometry::CityLocation;
use crate::overlays::OverlayKind;
use crate::tiles::{tile_of, NUCLEAR, POWERPLANT};

/// Conductive tiles one plant can energise.
pub const COAL_CAPACITY: i32 = 700;
pub const NUCLEAR_CAPACITY: i32 = 2000;

/// Step from `loc` in direction 0..4 (north, east, south, west), or stay put
/// for 4. Returns `None` when the step would leave the map.
fn step(ctx: &SimContext, loc: CityLocation, dir: usize) -> Option<CityLocation> {
    let next = match dir {
        0 => loc.offset(0, -1),
        1 => loc.offset(1, 0),
        2 => loc.offset(0, 1),
        3 => loc.offset(-1, 0),
        _ => loc,
    };
    ctx.map.in_bounds(next.x, next.y).then_some(next)
}

/// Can power flow from `loc` toward `dir`?
fn conducts_toward(ctx: &SimContext, loc: CityLocation, dir: usize) -> bool {
    let Some(next) = step(ctx, loc, dir) else {
        return false;
    };
    let cell = ctx.cell(next.x, next.y);
    let tile = tile_of(cell);
    ctx.specs.is_conductive(cell)
        && tile != NUCLEAR
        && tile != POWERPLANT
        && !ctx.overlays.power_grid.get(next.x, next.y)
}

/// Rebuild the power grid from the plants found by the last map scan.
pub fn power_scan(ctx: &mut SimContext) {
    ctx.overlays.power_grid.clear();
    let capacity =
        ctx.census.coal_count * COAL_CAPACITY + ctx.census.nuclear_count * NUCLEAR_CAPACITY;
    let mut powered = 0;
    let mut pending = std::mem::take(&mut ctx.census.power_plants);
    let plants = pending.clone();

    while let Some(mut loc) = pending.pop() {
        let mut dir = 4;
        loop {
            powered += 1;
            if powered > capacity {
                warn!("power demand exceeds capacity of {capacity} tiles");
                ctx.outbox.message(MessageKind::NotEnoughPower, None);
                ctx.census.power_plants = plants;
                finish(ctx);
                return;
            }
            if let Some(next) = step(ctx, loc, dir) {
                loc = next;
            }
            ctx.overlays.power_grid.set(loc.x, loc.y, true);

            // Follow the first open branch; remember forks for later.
            let mut branches = 0;
            let mut d = 0;
            while d < 4 && branches < 2 {
                if conducts_toward(ctx, loc, d) {
                    branches += 1;
                    dir = d;
                }
                d += 1;
            }
            if branches > 1 {
                pending.push(loc);
            }
            if branches == 0 {
                break;
            }
        }
    }
    ctx.census.power_plants = plants;
    finish(ctx);
}

fn finish(ctx: &mut SimContext) {
    ctx.clock.new_power = true;
    ctx.outbox.overlay_changed(OverlayKind::Power);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::tiles::{HPOWER, ROADS};
    use crate::zones::zone_plop;

    fn plant_with_line(state: &mut CityState, len: i32) {
        assert!(zone_plop(&mut state.ctx(), 10, 10, POWERPLANT));
        for x in 13..13 + len {
            state.map.set(x, 10, HPOWER);
        }
        state.census.coal_count = 1;
        state.census.power_plants = vec![CityLocation::new(10, 10)];
    }

    #[test]
    fn test_power_flows_along_wire() {
        let mut state = CityState::new(1);
        plant_with_line(&mut state, 10);
        state.map.set(23, 11, ROADS);
        power_scan(&mut state.ctx());
        assert!(state.overlays.power_grid.get(10, 10));
        assert!(state.overlays.power_grid.get(22, 10));
        assert!(!state.overlays.power_grid.get(23, 11));
        assert!(!state.overlays.power_grid.get(30, 10));
        assert!(state.clock.new_power);
    }

    #[test]
    fn test_capacity_runs_out() {
        let mut state = CityState::new(1);
        // A coal plant feeds 700 tiles; the line is longer than that.
        assert!(zone_plop(&mut state.ctx(), 1, 1, POWERPLANT));
        for y in 3..100 {
            for x in 0..10 {
                state.map.set(x, y, HPOWER);
            }
        }
        state.census.coal_count = 1;
        state.census.power_plants = vec![CityLocation::new(1, 1)];
        power_scan(&mut state.ctx());
        let lit = state.overlays.power_grid.data().iter().filter(|&&p| p).count();
        assert!(lit > 0 && lit <= COAL_CAPACITY as usize);
        assert!(state
            .outbox
            .messages
            .iter()
            .any(|m| m.kind == MessageKind::NotEnoughPower));
    }

    #[test]
    fn test_no_plants_no_power() {
        let mut state = CityState::new(1);
        state.map.set(5, 5, HPOWER);
        power_scan(&mut state.ctx());
        assert!(state.overlays.power_grid.data().iter().all(|&p| !p));
    }
}
