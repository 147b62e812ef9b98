//! Population density overlay, the city centre of mass, and the commercial
//! attractiveness map derived from distance to it.

use crate::context::SimContext;
use crate::geometry::CityLocation;
use crate::overlays::{OverlayKind, OverlayMap};
use crate::tiles::{tile_of, COMBASE, FREEZ, INDBASE, PORTBASE};
use crate::zones::residential::zone_population;

/// Residents attributed to a zone centre for density purposes.
fn density_of(ctx: &SimContext, x: i32, y: i32, cell: u16) -> i32 {
    let tile = tile_of(cell);
    let pop = ctx.specs.get(cell).population as i32;
    match tile {
        FREEZ => zone_population(ctx, x, y, cell),
        t if t < COMBASE => pop,
        t if t < INDBASE => pop * 8,
        t if t < PORTBASE => pop * 8,
        _ => 0,
    }
}

pub fn population_density_scan(ctx: &mut SimContext) {
    let mut density = ctx.overlays.population_density.clone();
    density.clear();

    let (mut x_total, mut y_total, mut zones) = (0i64, 0i64, 0i64);
    for x in 0..ctx.map.width() {
        for y in 0..ctx.map.height() {
            let cell = ctx.cell(x, y);
            if !ctx.specs.is_zone_center(cell) {
                continue;
            }
            let value = (density_of(ctx, x, y, cell) * 8).min(254);
            density.world_set(x, y, value);
            x_total += x as i64;
            y_total += y as i64;
            zones += 1;
        }
    }

    let density = density.smoothed().smoothed().smoothed();
    ctx.overlays.population_density = density;

    ctx.overlays.city_center = if zones > 0 {
        CityLocation::new((x_total / zones) as i32, (y_total / zones) as i32)
    } else {
        CityLocation::new(ctx.map.width() / 2, ctx.map.height() / 2)
    };
    compute_com_rate(ctx);
    ctx.outbox.overlay_changed(OverlayKind::PopulationDensity);
}

/// Commercial attractiveness, highest at the city centre.
fn compute_com_rate(ctx: &mut SimContext) {
    let overlays = &mut *ctx.overlays;
    let block = overlays.com_rate.block();
    let mut rate: OverlayMap<i32> = overlays.com_rate.clone();
    for x in 0..rate.width() {
        for y in 0..rate.height() {
            let distance = overlays.city_center_distance(x * block, y * block) / 4;
            rate.set(x, y, 64 - distance * 4);
        }
    }
    overlays.com_rate = rate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::tiles::{CZB, RZB};
    use crate::zones::zone_plop;

    #[test]
    fn test_empty_city_centres_on_map() {
        let mut state = CityState::new(1);
        population_density_scan(&mut state.ctx());
        assert_eq!(state.overlays.city_center, CityLocation::new(60, 50));
        assert!(state.overlays.population_density.data().iter().all(|&d| d == 0));
        assert_eq!(state.overlays.com_rate.world_get(60, 50), 64);
    }

    #[test]
    fn test_zones_pull_the_centre() {
        let mut state = CityState::new(1);
        assert!(zone_plop(&mut state.ctx(), 10, 10, RZB + 18));
        assert!(zone_plop(&mut state.ctx(), 20, 10, CZB + 9));
        population_density_scan(&mut state.ctx());
        assert_eq!(state.overlays.city_center, CityLocation::new(15, 10));
        assert!(state.overlays.population_density.world_get(10, 10) > 0);
        assert!(state.overlays.population_density.world_get(20, 10) > 0);
        assert!(state.overlays.com_rate.world_get(16, 8) > state.overlays.com_rate.world_get(100, 90));
    }
}
