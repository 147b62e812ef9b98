use super::{land_value_class, rolls_decline, rolls_growth, zone_plop};
use crate::context::SimContext;
use crate::tiles::{
    tile_of, CHURCH, DIRT, FREEZ, HHTHR, HOSPITAL, HOUSE, LASTROAD, LHTHR, RESBASE, RZB,
};
use crate::traffic::{make_traffic, TrafficOutcome, ZoneClass};

/// Neighbour offsets of the eight house lots around an empty zone center.
const LOT_X: [i32; 9] = [0, -1, 0, 1, -1, 1, -1, 0, 1];
const LOT_Y: [i32; 9] = [0, -1, -1, -1, 0, 0, 1, 1, 1];

pub(crate) fn do_residential(ctx: &mut SimContext, x: i32, y: i32, tile: u16, powered: bool) {
    ctx.census.res_zone_count += 1;
    let pop = zone_population(ctx, x, y, tile);
    ctx.census.res_pop += pop;

    let traffic = if pop > ctx.rng.random(36) {
        make_traffic(ctx, x, y, ZoneClass::Residential)
    } else {
        TrafficOutcome::Reached
    };
    if traffic == TrafficOutcome::NoRoad {
        let value = land_value_class(ctx, x, y);
        residential_out(ctx, x, y, pop, value);
        return;
    }

    if tile != FREEZ && !ctx.rng.one_in(8) {
        return;
    }
    let mut score = ctx.valves.res_valve + evaluate_lot(ctx, x, y, traffic);
    if !powered {
        score = -500;
    }
    if rolls_growth(ctx, score) {
        if pop == 0 && ctx.rng.one_in(4) {
            make_hospital(ctx, x, y);
            return;
        }
        let value = land_value_class(ctx, x, y);
        residential_in(ctx, x, y, tile, pop, value);
    } else if rolls_decline(ctx, score) {
        let value = land_value_class(ctx, x, y);
        residential_out(ctx, x, y, pop, value);
    }
}

/// Houses standing on the lots around an empty zone.
fn count_houses(ctx: &SimContext, x: i32, y: i32) -> i32 {
    let mut count = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if let Some(t) = ctx.map.tile(x + dx, y + dy) {
                if (LHTHR..=HHTHR).contains(&t) {
                    count += 1;
                }
            }
        }
    }
    count
}

/// Local desirability, -3000..=3000.
fn evaluate_lot(ctx: &SimContext, x: i32, y: i32, traffic: TrafficOutcome) -> i32 {
    if traffic == TrafficOutcome::NoRoad {
        return -3000;
    }
    let value = ctx.overlays.land_value.world_get(x, y) - ctx.overlays.pollution.world_get(x, y);
    let value = if value < 0 { 0 } else { (value * 32).min(6000) };
    value - 3000
}

fn plop(ctx: &mut SimContext, x: i32, y: i32, density: i32, value: i32) {
    let center = (value * 4 + density) * 9 + RZB as i32;
    zone_plop(ctx, x, y, center as u16);
}

fn residential_in(ctx: &mut SimContext, x: i32, y: i32, tile: u16, pop: i32, value: i32) {
    if ctx.overlays.pollution.world_get(x, y) > 128 {
        return;
    }
    if tile == FREEZ {
        if pop < 8 {
            build_house(ctx, x, y, value);
            ctx.overlays.inc_rate_of_growth(x, y, 1);
        } else if ctx.overlays.population_density.world_get(x, y) > 64 {
            plop(ctx, x, y, 0, value);
            ctx.overlays.inc_rate_of_growth(x, y, 8);
        }
        return;
    }
    if pop < 40 {
        plop(ctx, x, y, pop / 8 - 1, value);
        ctx.overlays.inc_rate_of_growth(x, y, 8);
    }
}

fn residential_out(ctx: &mut SimContext, x: i32, y: i32, pop: i32, value: i32) {
    if pop == 0 {
        return;
    }
    if pop > 16 {
        plop(ctx, x, y, (pop - 24) / 8, value);
        ctx.overlays.inc_rate_of_growth(x, y, -8);
        return;
    }
    if pop == 16 {
        // Break the lowest density back into houses.
        let powered = ctx.map.is_powered(x, y);
        ctx.map.set(x, y, FREEZ);
        ctx.map.set_powered(x, y, powered);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx, dy) == (0, 0) {
                    continue;
                }
                if ctx.map.tile(x + dx, y + dy).is_some() {
                    let house = LHTHR as i32 + value + ctx.rng.random(3);
                    ctx.map.set(x + dx, y + dy, house as u16);
                }
            }
        }
        ctx.overlays.inc_rate_of_growth(x, y, -8);
        return;
    }
    // Knock down one house.
    ctx.overlays.inc_rate_of_growth(x, y, -1);
    for dx in -1..=1 {
        for dy in -1..=1 {
            let Some(t) = ctx.map.tile(x + dx, y + dy) else {
                continue;
            };
            if (LHTHR..=HHTHR).contains(&t) {
                let lot = (dy + 1) * 3 + (dx + 1);
                ctx.map.set(x + dx, y + dy, RESBASE + lot as u16);
                return;
            }
        }
    }
}

/// Put a house on the best empty lot; lots next to roads score higher.
fn build_house(ctx: &mut SimContext, x: i32, y: i32, value: i32) {
    let mut best = 0;
    let mut best_score = 0;
    for z in 1..9 {
        let (lx, ly) = (x + LOT_X[z], y + LOT_Y[z]);
        if !ctx.map.in_bounds(lx, ly) {
            continue;
        }
        let score = evaluate_house_lot(ctx, lx, ly);
        if score == 0 {
            continue;
        }
        if score > best_score {
            best_score = score;
            best = z;
        }
        if score == best_score && ctx.rng.one_in(8) {
            best = z;
        }
    }
    if best != 0 {
        let house = HOUSE as i32 + value * 3 + ctx.rng.random(3);
        ctx.map.set(x + LOT_X[best], y + LOT_Y[best], house as u16);
    }
}

fn evaluate_house_lot(ctx: &SimContext, x: i32, y: i32) -> i32 {
    let tile = ctx.tile(x, y);
    if tile != DIRT && !(RESBASE..=RESBASE + 8).contains(&tile) {
        return -1;
    }
    let roads = [(0, -1), (1, 0), (0, 1), (-1, 0)]
        .iter()
        .filter(|(dx, dy)| {
            ctx.map
                .tile(x + dx, y + dy)
                .is_some_and(|t| t != DIRT && t <= LASTROAD)
        })
        .count();
    1 + roads as i32
}

/// A new residential zone sometimes becomes a hospital or church instead.
fn make_hospital(ctx: &mut SimContext, x: i32, y: i32) {
    if ctx.census.need_hospital > 0 {
        zone_plop(ctx, x, y, HOSPITAL);
        ctx.census.need_hospital = 0;
    } else if ctx.census.need_church > 0 {
        zone_plop(ctx, x, y, CHURCH);
        ctx.census.need_church = 0;
    }
}

/// Residential population of the zone centred on `cell`; an empty zone
/// counts its houses.
pub fn zone_population(ctx: &SimContext, x: i32, y: i32, cell: u16) -> i32 {
    let tile = tile_of(cell);
    if tile == FREEZ {
        count_houses(ctx, x, y)
    } else {
        ctx.specs.get(tile).population as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::tiles::{ROADS, RZB};

    #[test]
    fn test_empty_zone_counts_houses() {
        let mut state = CityState::new(1);
        assert!(zone_plop(&mut state.ctx(), 10, 10, FREEZ));
        state.map.set(9, 9, HOUSE);
        state.map.set(11, 10, HOUSE + 4);
        assert_eq!(zone_population(&state.ctx(), 10, 10, FREEZ), 2);
    }

    #[test]
    fn test_house_prefers_road_side_lot() {
        let mut state = CityState::new(4);
        assert!(zone_plop(&mut state.ctx(), 10, 10, FREEZ));
        state.map.set(12, 9, ROADS);
        state.map.set(12, 10, ROADS);
        state.map.set(12, 11, ROADS);
        build_house(&mut state.ctx(), 10, 10, 0);
        let houses: Vec<_> = state
            .map
            .iter()
            .filter(|&(_, _, c)| (LHTHR..=HHTHR).contains(&tile_of(c)))
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(houses.len(), 1);
        assert_eq!(houses[0].0, 11);
    }

    #[test]
    fn test_decline_from_full_density_drops_one_level() {
        let mut state = CityState::new(4);
        // Density 1 of value class 0: 24 residents.
        assert!(zone_plop(&mut state.ctx(), 10, 10, RZB + 9));
        residential_out(&mut state.ctx(), 10, 10, 24, 0);
        assert_eq!(state.map.tile(10, 10), Some(RZB));
    }

    #[test]
    fn test_lowest_density_breaks_into_houses() {
        let mut state = CityState::new(4);
        assert!(zone_plop(&mut state.ctx(), 10, 10, RZB));
        residential_out(&mut state.ctx(), 10, 10, 16, 0);
        assert_eq!(state.map.tile(10, 10), Some(FREEZ));
        assert_eq!(zone_population(&state.ctx(), 10, 10, FREEZ), 8);
    }

    #[test]
    fn test_unpowered_zone_never_grows() {
        let mut state = CityState::new(9);
        state.valves.res_valve = 2000;
        assert!(zone_plop(&mut state.ctx(), 10, 10, FREEZ));
        for _ in 0..200 {
            let cell = state.map.get(10, 10).unwrap_or(0);
            do_residential(&mut state.ctx(), 10, 10, tile_of(cell), false);
        }
        assert_eq!(zone_population(&state.ctx(), 10, 10, FREEZ), 0);
    }
}
