//! The map scan and the per-tile reactions it drives: fire, flood,
//! radiation, road and rail upkeep, draw bridges and explosion cleanup.
//!
//! The scan mutates the map in place. A tile rewritten early in a pass is
//! seen in its new state by neighbours scanned later in the same pass.

use crate::config::CELL_SIZE;
use crate::context::SimContext;
use crate::sprites::{generate_bus, generate_train, make_explosion, SpriteKind};
use crate::tiles::{
    tile_of, Behavior, BRWH, BRWV, CHANNEL, DIRT, FIRE, FLOOD, HBRDG0, HBRDG1, HBRDG2, HBRDG3,
    HBRIDGE, HTRFBASE, IZB, LTRFBASE, PWRBIT, RIVER, ROADBASE, RUBBLE, VBRDG0, VBRDG1, VBRDG2,
    VBRDG3, VBRIDGE, WOODS5,
};
use crate::zones::{do_zone, kill_zone};

/// Roads start to crumble when upkeep drops below this effect.
const ROAD_DECAY_THRESHOLD: i32 = 30;

const DX: [i32; 4] = [0, 1, 0, -1];
const DY: [i32; 4] = [-1, 0, 1, 0];

/// Survey every tile in columns `x0..x1`.
pub fn map_scan(ctx: &mut SimContext, x0: i32, x1: i32) {
    let specs = ctx.specs;
    for x in x0..x1.min(ctx.map.width()) {
        for y in 0..ctx.map.height() {
            let cell = ctx.cell(x, y);
            if tile_of(cell) == DIRT {
                continue;
            }
            let spec = specs.get(cell);
            if ctx.clock.new_power && spec.conducts && !spec.zone {
                let powered = ctx.overlays.power_grid.get(x, y);
                ctx.map.set_powered(x, y, powered);
            }
            match spec.behavior {
                Some(Behavior::Fire) => {
                    ctx.census.fire_pop += 1;
                    do_fire(ctx, x, y);
                }
                Some(Behavior::Flood) => do_flood(ctx, x, y),
                Some(Behavior::Radioactive) => do_radioactive(ctx, x, y),
                Some(Behavior::Road) => do_road(ctx, x, y, cell),
                Some(Behavior::Rail) => do_rail(ctx, x, y, cell),
                Some(Behavior::Explosion) => do_explosion(ctx, x, y),
                None if spec.zone => do_zone(ctx, x, y, cell),
                None => {}
            }
        }
    }
}

/// Burn: maybe spread to neighbours, then maybe burn out to rubble.
pub fn do_fire(ctx: &mut SimContext, x: i32, y: i32) {
    if ctx.rng.one_in(4) {
        for dir in 0..4 {
            if !ctx.rng.one_in(8) {
                continue;
            }
            let (nx, ny) = (x + DX[dir], y + DY[dir]);
            let Some(cell) = ctx.map.get(nx, ny) else {
                continue;
            };
            if !ctx.specs.is_combustible(cell) {
                continue;
            }
            if ctx.specs.is_zone_center(cell) {
                let tile = tile_of(cell);
                kill_zone(ctx, nx, ny, tile);
                if tile > IZB {
                    make_explosion(ctx, nx, ny);
                }
            }
            let fire = FIRE + ctx.rng.random(4) as u16;
            ctx.map.set(nx, ny, fire);
        }
    }

    let coverage = ctx.overlays.fire_coverage.world_get(x, y);
    let rate = match coverage {
        c if c > 100 => 1,
        c if c > 20 => 2,
        c if c != 0 => 3,
        _ => 10,
    };
    if ctx.rng.one_in(rate + 1) {
        let rubble = RUBBLE + ctx.rng.random(4) as u16;
        ctx.map.set(x, y, rubble);
    }
}

/// Spread while the flood lasts, then dry out.
pub fn do_flood(ctx: &mut SimContext, x: i32, y: i32) {
    if ctx.clock.flood_count == 0 {
        if ctx.rng.one_in(16) {
            ctx.map.set(x, y, DIRT);
        }
        return;
    }
    for dir in 0..4 {
        if !ctx.rng.one_in(8) {
            continue;
        }
        let (nx, ny) = (x + DX[dir], y + DY[dir]);
        let Some(cell) = ctx.map.get(nx, ny) else {
            continue;
        };
        let tile = tile_of(cell);
        if ctx.specs.is_combustible(cell) || tile == DIRT || (WOODS5..FLOOD).contains(&tile) {
            if ctx.specs.is_zone_center(cell) {
                kill_zone(ctx, nx, ny, tile);
            }
            let flood = FLOOD + ctx.rng.random(3) as u16;
            ctx.map.set(nx, ny, flood);
        }
    }
}

pub fn do_radioactive(ctx: &mut SimContext, x: i32, y: i32) {
    if ctx.rng.one_in(4096) {
        ctx.map.set(x, y, DIRT);
    }
}

/// Poorly funded transport crumbles. Returns whether the tile was lost.
fn deteriorate(ctx: &mut SimContext, x: i32, y: i32, cell: u16) -> bool {
    if ctx.budget.road_effect >= ROAD_DECAY_THRESHOLD || !ctx.rng.one_in(512) {
        return false;
    }
    if ctx.specs.is_conductive(cell) || ctx.budget.road_effect >= ctx.rng.random(32) {
        return false;
    }
    if ctx.specs.is_overwater(cell) {
        ctx.map.set(x, y, RIVER);
    } else {
        let rubble = RUBBLE + ctx.rng.random(4) as u16;
        ctx.map.set(x, y, rubble);
    }
    true
}

pub fn do_road(ctx: &mut SimContext, x: i32, y: i32, cell: u16) {
    ctx.census.road_total += 1;
    if deteriorate(ctx, x, y, cell) {
        return;
    }
    if !ctx.specs.is_combustible(cell) {
        ctx.census.road_total += 4;
        if do_bridge(ctx, x, y, tile_of(cell)) {
            return;
        }
    }

    let tile = tile_of(cell);
    let current = if tile < LTRFBASE {
        0
    } else if tile < HTRFBASE {
        1
    } else {
        ctx.census.road_total += 1;
        generate_bus(ctx, x, y);
        2
    };
    let density = ctx.overlays.traffic_density.world_get(x, y);
    let level = match density {
        d if d < 64 => 0,
        d if d < 192 => 1,
        _ => 2,
    };
    if level != current {
        const BASES: [u16; 3] = [ROADBASE, LTRFBASE, HTRFBASE];
        let next = ((tile - ROADBASE) & 15) + BASES[level];
        ctx.map.set(x, y, next | (cell & PWRBIT));
    }
}

pub fn do_rail(ctx: &mut SimContext, x: i32, y: i32, cell: u16) {
    ctx.census.rail_total += 1;
    generate_train(ctx, x, y);
    deteriorate(ctx, x, y, cell);
}

/// Settle the last frames of an explosion into rubble.
pub fn do_explosion(ctx: &mut SimContext, x: i32, y: i32) {
    let rubble = RUBBLE + ctx.rng.random(4) as u16;
    ctx.map.set(x, y, rubble);
}

// ---------------------------------------------------------------------------
// Draw bridges
// ---------------------------------------------------------------------------

struct BridgeLayout {
    dx: [i32; 7],
    dy: [i32; 7],
    open: [u16; 7],
    closed: [u16; 7],
}

const HORIZONTAL_BRIDGE: BridgeLayout = BridgeLayout {
    dx: [-2, 2, -2, -1, 0, 1, 2],
    dy: [-1, -1, 0, 0, 0, 0, 0],
    open: [HBRDG1, HBRDG3, HBRDG0, RIVER, BRWH, RIVER, HBRDG2],
    closed: [RIVER, RIVER, HBRIDGE, HBRIDGE, HBRIDGE, HBRIDGE, HBRIDGE],
};

const VERTICAL_BRIDGE: BridgeLayout = BridgeLayout {
    dx: [0, 1, 0, 0, 0, 0, 1],
    dy: [-2, -2, -1, 0, 1, 2, 2],
    open: [VBRDG0, VBRDG1, RIVER, BRWV, RIVER, VBRDG2, VBRDG3],
    closed: [VBRIDGE, RIVER, VBRIDGE, VBRIDGE, VBRIDGE, VBRIDGE, RIVER],
};

/// Tiles from a boat to the bridge at (x, y), Manhattan, or a large number
/// when there is no boat.
fn boat_distance(ctx: &SimContext, x: i32, y: i32) -> i32 {
    let (mx, my) = (x * CELL_SIZE + CELL_SIZE / 2, y * CELL_SIZE + CELL_SIZE / 2);
    let dist = ctx
        .sprites
        .visible()
        .filter(|s| s.kind() == SpriteKind::Ship)
        .map(|s| (mx - (s.x + s.offx)).abs() + (my - (s.y + s.offy)).abs())
        .min()
        .unwrap_or(99_999);
    dist / CELL_SIZE
}

fn swap_bridge(ctx: &mut SimContext, x: i32, y: i32, layout: &BridgeLayout, opening: bool) {
    let (from, to) = if opening {
        (&layout.closed, &layout.open)
    } else {
        (&layout.open, &layout.closed)
    };
    for z in 0..7 {
        let (bx, by) = (x + layout.dx[z], y + layout.dy[z]);
        if let Some(tile) = ctx.map.tile(bx, by) {
            if tile == from[z] || tile == CHANNEL {
                ctx.map.set(bx, by, to[z]);
            }
        }
    }
}

/// Open a bridge for an approaching boat or close it behind one. Returns
/// whether the tile was handled as a bridge.
pub fn do_bridge(ctx: &mut SimContext, x: i32, y: i32, tile: u16) -> bool {
    if tile == BRWV || tile == BRWH {
        if ctx.rng.one_in(4) && boat_distance(ctx, x, y) > 340 / CELL_SIZE {
            let layout = if tile == BRWV { &VERTICAL_BRIDGE } else { &HORIZONTAL_BRIDGE };
            swap_bridge(ctx, x, y, layout, false);
        }
        return true;
    }

    if boat_distance(ctx, x, y) < 300 / CELL_SIZE && ctx.rng.one_in(8) {
        // Odd tiles run north-south; the channel lies beside the span.
        let (layout, cx, cy) = if tile & 1 != 0 {
            (&VERTICAL_BRIDGE, x + 1, y)
        } else {
            (&HORIZONTAL_BRIDGE, x, y - 1)
        };
        if ctx.map.tile(cx, cy) == Some(CHANNEL) {
            swap_bridge(ctx, x, y, layout, true);
            return true;
        }
    }
    false
}

/// Open the bridge at (x, y) unconditionally.
pub fn open_bridge(ctx: &mut SimContext, x: i32, y: i32) {
    let layout = if ctx.tile(x, y) & 1 != 0 { &VERTICAL_BRIDGE } else { &HORIZONTAL_BRIDGE };
    swap_bridge(ctx, x, y, layout, true);
}

/// Close the open bridge at (x, y) unconditionally.
pub fn close_bridge(ctx: &mut SimContext, x: i32, y: i32) {
    let layout = if ctx.tile(x, y) == BRWV { &VERTICAL_BRIDGE } else { &HORIZONTAL_BRIDGE };
    swap_bridge(ctx, x, y, layout, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::tiles::{is_fire, is_rubble, FREEZ, LASTFLOOD, RADTILE, ROADS, WOODS};

    #[test]
    fn test_fire_spreads_only_to_combustibles() {
        let mut state = CityState::new(7);
        state.map.set(10, 10, FIRE);
        state.map.set(10, 9, WOODS);
        state.map.set(11, 10, RIVER);
        state.overlays.fire_coverage.fill(1000);
        for _ in 0..400 {
            state.map.set(10, 10, FIRE);
            do_fire(&mut state.ctx(), 10, 10);
        }
        assert!(is_fire(state.tile_at(10, 9)));
        assert_eq!(state.tile_at(11, 10), RIVER);
    }

    #[test]
    fn test_unprotected_fire_burns_out_one_in_eleven() {
        let mut state = CityState::new(2024);
        let trials = 20_000;
        let mut burned = 0;
        for _ in 0..trials {
            state.map.set(60, 50, FIRE);
            do_fire(&mut state.ctx(), 60, 50);
            if is_rubble(state.tile_at(60, 50)) {
                burned += 1;
            }
        }
        let rate = burned as f64 / trials as f64;
        assert!((rate - 1.0 / 11.0).abs() < 0.01, "burn-out rate {rate}");
    }

    #[test]
    fn test_flood_recedes_without_counter() {
        let mut state = CityState::new(3);
        state.map.set(5, 5, FLOOD);
        state.map.set(5, 4, FREEZ);
        for _ in 0..400 {
            if state.tile_at(5, 5) == DIRT {
                break;
            }
            do_flood(&mut state.ctx(), 5, 5);
        }
        assert_eq!(state.tile_at(5, 5), DIRT);
        assert_eq!(state.tile_at(5, 4), FREEZ);
    }

    #[test]
    fn test_flood_spreads_while_counting() {
        let mut state = CityState::new(3);
        state.clock.flood_count = 30;
        state.map.set(5, 5, FLOOD);
        for _ in 0..200 {
            do_flood(&mut state.ctx(), 5, 5);
        }
        let t = state.tile_at(6, 5);
        assert!((FLOOD..=LASTFLOOD).contains(&t));
    }

    #[test]
    fn test_radiation_is_long_lived() {
        let mut state = CityState::new(3);
        let mut decayed = 0;
        for _ in 0..40_960 {
            state.map.set(5, 5, RADTILE);
            do_radioactive(&mut state.ctx(), 5, 5);
            if state.tile_at(5, 5) == DIRT {
                decayed += 1;
            }
        }
        // Expect about ten.
        assert!((3..=25).contains(&decayed), "{decayed} decays");
    }

    #[test]
    fn test_road_picks_up_traffic_art() {
        let mut state = CityState::new(3);
        state.budget.road_effect = 32;
        state.map.set(8, 8, ROADS);
        state.overlays.traffic_density.world_set(8, 8, 100);
        let cell = state.map.get(8, 8).unwrap_or(0);
        do_road(&mut state.ctx(), 8, 8, cell);
        assert_eq!(state.tile_at(8, 8), ROADS - ROADBASE + LTRFBASE);

        state.overlays.traffic_density.world_set(8, 8, 0);
        let cell = state.map.get(8, 8).unwrap_or(0);
        do_road(&mut state.ctx(), 8, 8, cell);
        assert_eq!(state.tile_at(8, 8), ROADS);
        assert_eq!(state.census.road_total, 2);
    }

    #[test]
    fn test_unfunded_roads_crumble() {
        let mut state = CityState::new(3);
        state.budget.road_effect = 0;
        state.map.set(8, 8, ROADS);
        for _ in 0..20_000 {
            let cell = state.map.get(8, 8).unwrap_or(0);
            if !crate::tiles::is_road(tile_of(cell)) {
                break;
            }
            do_road(&mut state.ctx(), 8, 8, cell);
        }
        assert!(is_rubble(state.tile_at(8, 8)));
    }

    fn horizontal_bridge(state: &mut CityState) {
        for x in 0..12 {
            for y in 8..13 {
                state.map.set(x, y, RIVER);
            }
        }
        for x in 2..9 {
            state.map.set(x, 10, HBRIDGE);
        }
        state.map.set(5, 9, CHANNEL);
    }

    #[test]
    fn test_bridge_open_close_round_trip() {
        let mut state = CityState::new(3);
        horizontal_bridge(&mut state);
        let before = state.map.cells().to_vec();

        open_bridge(&mut state.ctx(), 5, 10);
        assert_eq!(state.tile_at(5, 10), BRWH);
        assert_eq!(state.tile_at(4, 10), RIVER);
        assert_eq!(state.tile_at(3, 9), HBRDG1);

        close_bridge(&mut state.ctx(), 5, 10);
        assert_eq!(state.map.cells(), &before[..]);
    }

    #[test]
    fn test_bridge_waits_for_boat() {
        let mut state = CityState::new(3);
        horizontal_bridge(&mut state);
        for _ in 0..100 {
            assert!(!do_bridge(&mut state.ctx(), 5, 10, HBRIDGE));
        }
        assert_eq!(state.tile_at(5, 10), HBRIDGE);

        state
            .sprites
            .spawn(crate::sprites::CitySprite::at_tile(
                5,
                9,
                48,
                crate::sprites::SpriteState::Ship {
                    new_dir: 0,
                    count: 0,
                    sound_count: 0,
                },
            ));
        let mut opened = false;
        for _ in 0..200 {
            if do_bridge(&mut state.ctx(), 5, 10, HBRIDGE) {
                opened = true;
                break;
            }
        }
        assert!(opened);
        assert_eq!(state.tile_at(5, 10), BRWH);
    }
}
