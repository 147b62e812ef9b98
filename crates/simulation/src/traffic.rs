//! Trip generation: zones send a car out along the road network and record
//! the route on the traffic-density overlay.

use serde::{Deserialize, Serialize};

use crate::config::MAX_TRAFFIC_DISTANCE;
use crate::context::SimContext;
use crate::sprites::dispatch_copter;
use crate::tiles::{is_drivable, COMBASE, LHTHR, NUCLEAR, PORT, POWERBASE, ROADBASE};

const PERIMETER_X: [i32; 12] = [-1, 0, 1, 2, 2, 2, 1, 0, -1, -2, -2, -2];
const PERIMETER_Y: [i32; 12] = [-2, -2, -2, -1, 0, 1, 2, 2, 2, 1, 0, -1];

const DX: [i32; 4] = [0, 1, 0, -1];
const DY: [i32; 4] = [-1, 0, 1, 0];

/// Density added to every tile a successful trip crosses.
const TRIP_DENSITY: i32 = 50;
pub const MAX_TRAFFIC_DENSITY: i32 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneClass {
    Residential,
    Commercial,
    Industrial,
}

impl ZoneClass {
    /// Inclusive tile range a trip from this class is looking for.
    fn destination(self) -> (u16, u16) {
        match self {
            ZoneClass::Residential => (COMBASE, NUCLEAR),
            ZoneClass::Commercial => (LHTHR, PORT),
            ZoneClass::Industrial => (LHTHR, COMBASE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficOutcome {
    /// Reached a destination; the route was recorded.
    Reached,
    /// Found a road but no destination within range.
    Stuck,
    /// No road touches the zone.
    NoRoad,
}

impl TrafficOutcome {
    /// The classic numeric code: 1, 0 or -1.
    pub fn code(self) -> i32 {
        match self {
            TrafficOutcome::Reached => 1,
            TrafficOutcome::Stuck => 0,
            TrafficOutcome::NoRoad => -1,
        }
    }
}

fn road_test(ctx: &SimContext, x: i32, y: i32) -> bool {
    ctx.map.tile(x, y).is_some_and(is_drivable)
}

/// First drivable tile on the 12-cell ring around a 3x3 zone centred at
/// (x, y).
pub fn find_perimeter_road(ctx: &SimContext, x: i32, y: i32) -> Option<(i32, i32)> {
    PERIMETER_X
        .iter()
        .zip(PERIMETER_Y.iter())
        .map(|(dx, dy)| (x + dx, y + dy))
        .find(|&(tx, ty)| road_test(ctx, tx, ty))
}

/// Send a car from the zone centred at (x, y).
pub fn make_traffic(ctx: &mut SimContext, x: i32, y: i32, class: ZoneClass) -> TrafficOutcome {
    let Some(start) = find_perimeter_road(ctx, x, y) else {
        return TrafficOutcome::NoRoad;
    };
    match try_drive(ctx, start, class) {
        Some(route) => {
            record_route(ctx, &route);
            TrafficOutcome::Reached
        }
        None => TrafficOutcome::Stuck,
    }
}

fn try_drive(ctx: &mut SimContext, start: (i32, i32), class: ZoneClass) -> Option<Vec<(i32, i32)>> {
    let (mut x, mut y) = start;
    let mut last_dir = 5;
    let mut route = Vec::new();
    let mut z = 0;
    while z < MAX_TRAFFIC_DISTANCE {
        if let Some((nx, ny, back)) = try_go(ctx, x, y, last_dir) {
            x = nx;
            y = ny;
            last_dir = back;
            // Only every other step is remembered.
            if z % 2 == 1 {
                route.push((x, y));
            }
            if drive_done(ctx, x, y, class) {
                return Some(route);
            }
        } else if let Some((px, py)) = route.pop() {
            // Back up and burn some of the budget.
            x = px;
            y = py;
            z += 3;
        } else {
            return None;
        }
        z += 1;
    }
    None
}

/// One step in a random direction that does not double back.
fn try_go(ctx: &mut SimContext, x: i32, y: i32, last_dir: usize) -> Option<(i32, i32, usize)> {
    let start = ctx.rng.random(4) as usize;
    (start..start + 4)
        .map(|d| d % 4)
        .filter(|&d| d != last_dir)
        .find(|&d| road_test(ctx, x + DX[d], y + DY[d]))
        .map(|d| (x + DX[d], y + DY[d], (d + 2) % 4))
}

fn drive_done(ctx: &SimContext, x: i32, y: i32, class: ZoneClass) -> bool {
    let (low, high) = class.destination();
    DX.iter().zip(DY.iter()).any(|(dx, dy)| {
        ctx.map
            .tile(x + dx, y + dy)
            .is_some_and(|t| (low..=high).contains(&t))
    })
}

fn record_route(ctx: &mut SimContext, route: &[(i32, i32)]) {
    for &(x, y) in route.iter().rev() {
        let Some(tile) = ctx.map.tile(x, y) else {
            continue;
        };
        if !(ROADBASE..POWERBASE).contains(&tile) {
            continue;
        }
        let density =
            (ctx.overlays.traffic_density.world_get(x, y) + TRIP_DENSITY).min(MAX_TRAFFIC_DENSITY);
        if density >= MAX_TRAFFIC_DENSITY && ctx.rng.one_in(6) {
            ctx.overlays.traffic_max = crate::geometry::CityLocation::new(x, y);
            dispatch_copter(ctx, x, y);
        }
        ctx.overlays.traffic_density.world_set(x, y, density);
    }
}

/// Let the traffic overlay cool off between scans.
pub fn decay_traffic(ctx: &mut SimContext) {
    let map = &mut ctx.overlays.traffic_density;
    for y in 0..map.height() {
        for x in 0..map.width() {
            let z = map.get(x, y);
            let z = match z {
                0 => continue,
                z if z > 200 => z - 34,
                z if z > 24 => z - 24,
                _ => 0,
            };
            map.set(x, y, z);
        }
    }
}
