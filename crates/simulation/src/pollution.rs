//! Pollution, terrain density and land value, computed together in one
//! pass over 2x2 tile blocks.

use crate::context::SimContext;
use crate::geometry::CityLocation;
use crate::overlays::{OverlayKind, OverlayMap};
use crate::tiles::{tile_of, DIRT, ROADBASE, RUBBLE};

/// Terrain density each natural tile adds to its 4x4 block.
const TERRAIN_WEIGHT: i32 = 15;

pub fn pollution_terrain_land_value_scan(ctx: &mut SimContext) {
    let (w, h) = (ctx.map.width() as usize, ctx.map.height() as usize);
    let mut terrain: OverlayMap<i32> = OverlayMap::new(w, h, 4);
    let mut pollution = ctx.overlays.pollution.clone();
    pollution.clear();

    let mut lv_total = 0;
    let mut lv_count = 0;
    for hx in 0..pollution.width() {
        for hy in 0..pollution.height() {
            let mut level = 0;
            let mut built = false;
            for mx in 2 * hx..=2 * hx + 1 {
                for my in 2 * hy..=2 * hy + 1 {
                    let Some(cell) = ctx.map.get(mx, my) else {
                        continue;
                    };
                    let tile = tile_of(cell);
                    if tile == DIRT {
                        continue;
                    }
                    if tile < RUBBLE {
                        let t = terrain.world_get(mx, my);
                        terrain.world_set(mx, my, t + TERRAIN_WEIGHT);
                        continue;
                    }
                    level += ctx.specs.get(cell).pollution as i32;
                    if tile >= ROADBASE {
                        built = true;
                    }
                }
            }
            pollution.set(hx, hy, level.min(255));

            let value = if built {
                let distance = (ctx.overlays.city_center_distance(2 * hx, 2 * hy) / 2).min(32);
                let mut v = (34 - distance) * 4;
                v += ctx.overlays.terrain_density.world_get(2 * hx, 2 * hy);
                v -= ctx.overlays.pollution.get(hx, hy);
                if ctx.overlays.crime.get(hx, hy) > 190 {
                    v -= 20;
                }
                let v = v.clamp(1, 250);
                lv_total += v;
                lv_count += 1;
                v
            } else {
                0
            };
            ctx.overlays.land_value.set(hx, hy, value);
        }
    }
    ctx.overlays.land_value_average = if lv_count != 0 { lv_total / lv_count } else { 0 };

    let pollution = pollution.smoothed().smoothed();
    let mut count = 0;
    let mut total = 0;
    let mut max = 0;
    for hx in 0..pollution.width() {
        for hy in 0..pollution.height() {
            let z = pollution.get(hx, hy);
            if z == 0 {
                continue;
            }
            count += 1;
            total += z;
            if z > max || (z == max && ctx.rng.one_in(4)) {
                max = z;
                ctx.overlays.pollution_max = CityLocation::new(2 * hx, 2 * hy);
            }
        }
    }
    ctx.overlays.pollution = pollution;
    ctx.overlays.pollution_average = if count != 0 { total / count } else { 0 };
    ctx.overlays.terrain_density = terrain.smoothed_terrain();

    ctx.outbox.overlay_changed(OverlayKind::Pollution);
    ctx.outbox.overlay_changed(OverlayKind::LandValue);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::tiles::{FIRE, ROADS, WOODS};
    use crate::zones::zone_plop;

    #[test]
    fn test_industry_pollutes_and_is_found() {
        let mut state = CityState::new(1);
        assert!(zone_plop(&mut state.ctx(), 41, 41, crate::tiles::IZB));
        pollution_terrain_land_value_scan(&mut state.ctx());
        assert!(state.overlays.pollution.world_get(41, 41) > 0);
        assert!(state.overlays.pollution_average > 0);
        let max = state.overlays.pollution_max;
        assert!((max.x - 41).abs() <= 4 && (max.y - 41).abs() <= 4);
    }

    #[test]
    fn test_land_value_only_on_developed_blocks() {
        let mut state = CityState::new(1);
        state.map.set(60, 50, ROADS);
        pollution_terrain_land_value_scan(&mut state.ctx());
        assert!(state.overlays.land_value.world_get(60, 50) > 0);
        assert_eq!(state.overlays.land_value.world_get(10, 10), 0);
        assert!(state.overlays.land_value_average > 0);
    }

    #[test]
    fn test_trees_raise_terrain_density() {
        let mut state = CityState::new(1);
        for x in 16..24 {
            for y in 16..24 {
                state.map.set(x, y, WOODS);
            }
        }
        pollution_terrain_land_value_scan(&mut state.ctx());
        assert!(state.overlays.terrain_density.world_get(20, 20) > 0);
        assert_eq!(state.overlays.terrain_density.world_get(100, 80), 0);
    }

    #[test]
    fn test_pollution_is_capped() {
        let mut state = CityState::new(1);
        for x in 0..20 {
            for y in 0..20 {
                state.map.set(x, y, FIRE);
            }
        }
        pollution_terrain_land_value_scan(&mut state.ctx());
        assert!(state.overlays.pollution.data().iter().all(|&p| p <= 255));
    }
}
