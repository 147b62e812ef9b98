use super::{rolls_decline, rolls_growth, zone_plop};
use crate::context::SimContext;
use crate::tiles::{INDCLR, IZB};
use crate::traffic::{make_traffic, TrafficOutcome, ZoneClass};

pub(crate) fn do_industrial(ctx: &mut SimContext, x: i32, y: i32, tile: u16, powered: bool) {
    ctx.census.ind_zone_count += 1;
    let pop = ctx.specs.get(tile).population as i32;
    ctx.census.ind_pop += pop;

    let traffic = if pop > ctx.rng.random(6) {
        make_traffic(ctx, x, y, ZoneClass::Industrial)
    } else {
        TrafficOutcome::Reached
    };
    if traffic == TrafficOutcome::NoRoad {
        let value = ctx.rng.random(2);
        industrial_out(ctx, x, y, pop, value);
        return;
    }

    if !ctx.rng.one_in(8) {
        return;
    }
    let mut score = ctx.valves.ind_valve;
    if !powered {
        score = -500;
    }
    if rolls_growth(ctx, score) {
        let value = ctx.rng.random(2);
        industrial_in(ctx, x, y, pop, value);
    } else if rolls_decline(ctx, score) {
        let value = ctx.rng.random(2);
        industrial_out(ctx, x, y, pop, value);
    }
}

fn plop(ctx: &mut SimContext, x: i32, y: i32, density: i32, value: i32) {
    let center = (value * 4 + density) * 9 + IZB as i32;
    zone_plop(ctx, x, y, center as u16);
}

fn industrial_in(ctx: &mut SimContext, x: i32, y: i32, pop: i32, value: i32) {
    if pop < 4 {
        plop(ctx, x, y, pop, value);
        ctx.overlays.inc_rate_of_growth(x, y, 8);
    }
}

fn industrial_out(ctx: &mut SimContext, x: i32, y: i32, pop: i32, value: i32) {
    if pop > 1 {
        plop(ctx, x, y, pop - 2, value);
        ctx.overlays.inc_rate_of_growth(x, y, -8);
    } else if pop == 1 {
        zone_plop(ctx, x, y, INDCLR);
        ctx.overlays.inc_rate_of_growth(x, y, -8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;

    #[test]
    fn test_empty_zone_grows_to_first_density() {
        let mut state = CityState::new(1);
        assert!(zone_plop(&mut state.ctx(), 10, 10, INDCLR));
        industrial_in(&mut state.ctx(), 10, 10, 0, 1);
        assert_eq!(state.map.tile(10, 10), Some(IZB + 36));
    }

    #[test]
    fn test_top_density_stops_growing() {
        let mut state = CityState::new(1);
        let top = IZB + 27;
        assert!(zone_plop(&mut state.ctx(), 10, 10, top));
        industrial_in(&mut state.ctx(), 10, 10, 4, 0);
        assert_eq!(state.map.tile(10, 10), Some(top));
    }

    #[test]
    fn test_every_survey_is_counted() {
        let mut state = CityState::new(6);
        assert!(zone_plop(&mut state.ctx(), 10, 10, IZB + 9));
        for _ in 0..50 {
            let tile = state.map.tile(10, 10).unwrap_or(0);
            do_industrial(&mut state.ctx(), 10, 10, tile, true);
        }
        assert_eq!(state.census.ind_zone_count, 50);
        let tile = state.map.tile(10, 10).unwrap_or(0);
        assert!(state.specs.is_zone_center(tile));
    }
}
