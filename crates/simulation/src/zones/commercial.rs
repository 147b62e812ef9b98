use super::{land_value_class, rolls_decline, rolls_growth, zone_plop};
use crate::context::SimContext;
use crate::tiles::{COMCLR, CZB};
use crate::traffic::{make_traffic, TrafficOutcome, ZoneClass};

pub(crate) fn do_commercial(ctx: &mut SimContext, x: i32, y: i32, tile: u16, powered: bool) {
    ctx.census.com_zone_count += 1;
    let pop = ctx.specs.get(tile).population as i32;
    ctx.census.com_pop += pop;

    let traffic = if pop > ctx.rng.random(6) {
        make_traffic(ctx, x, y, ZoneClass::Commercial)
    } else {
        TrafficOutcome::Reached
    };
    if traffic == TrafficOutcome::NoRoad {
        let value = land_value_class(ctx, x, y);
        commercial_out(ctx, x, y, pop, value);
        return;
    }

    if !ctx.rng.one_in(8) {
        return;
    }
    let mut score = ctx.valves.com_valve + ctx.overlays.com_rate.world_get(x, y);
    if !powered {
        score = -500;
    }
    if traffic != TrafficOutcome::Stuck && rolls_growth(ctx, score) {
        let value = land_value_class(ctx, x, y);
        commercial_in(ctx, x, y, pop, value);
    } else if rolls_decline(ctx, score) {
        let value = land_value_class(ctx, x, y);
        commercial_out(ctx, x, y, pop, value);
    }
}

fn plop(ctx: &mut SimContext, x: i32, y: i32, density: i32, value: i32) {
    let center = (value * 5 + density) * 9 + CZB as i32;
    zone_plop(ctx, x, y, center as u16);
}

fn commercial_in(ctx: &mut SimContext, x: i32, y: i32, pop: i32, value: i32) {
    // Land value caps how dense a block may get.
    if pop > ctx.overlays.land_value.world_get(x, y) / 32 {
        return;
    }
    if pop < 5 {
        plop(ctx, x, y, pop, value);
        ctx.overlays.inc_rate_of_growth(x, y, 8);
    }
}

fn commercial_out(ctx: &mut SimContext, x: i32, y: i32, pop: i32, value: i32) {
    if pop > 1 {
        plop(ctx, x, y, pop - 2, value);
        ctx.overlays.inc_rate_of_growth(x, y, -8);
    } else if pop == 1 {
        zone_plop(ctx, x, y, COMCLR);
        ctx.overlays.inc_rate_of_growth(x, y, -8);
    }
}
