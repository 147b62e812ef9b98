//! Road, rail and power line placement. Each piece is laid, then it and its
//! four neighbours are redrawn to join up with whatever they touch.

use super::preview::PreviewBuilder;
use super::ToolResult;
use crate::tiles::{
    tile_of, CHANNEL, DIRT, HBRIDGE, HPOWER, HRAIL, HRAILROAD, HROADPOWER, INTERSECTION,
    LASTTINYEXP, LHPOWER, LHRAIL, LVPOWER, LVPOWER10, LVPOWER2, LVPOWER3, LVPOWER4, LVPOWER5,
    LVPOWER6, LVPOWER7, LVPOWER8, LVPOWER9, LVRAIL, LVRAIL10, LVRAIL2, LVRAIL3, LVRAIL4, LVRAIL5,
    LVRAIL6, LVRAIL7, LVRAIL8, LVRAIL9, RAILHPOWERV, RAILVPOWERH, REDGE, RIVER, ROADBASE, ROADS,
    ROADS10, ROADS2, ROADS3, ROADS4, ROADS5, ROADS6, ROADS7, ROADS8, ROADS9, TINYEXP, VBRIDGE,
    VPOWER, VRAIL, VRAILROAD, VROADPOWER,
};

pub const ROAD_COST: i64 = 10;
pub const BRIDGE_COST: i64 = 50;
pub const RAIL_COST: i64 = 20;
pub const TUNNEL_COST: i64 = 100;
pub const WIRE_COST: i64 = 5;
pub const UNDERWATER_WIRE_COST: i64 = 25;
const AUTO_DOZE_COST: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Road,
    Rail,
    Wire,
}

/// Road piece for each north/east/south/west neighbour bitmask.
#[rustfmt::skip]
const ROAD_TABLE: [u16; 16] = [
    ROADS, ROADS2, ROADS, ROADS3,
    ROADS2, ROADS2, ROADS4, ROADS8,
    ROADS, ROADS6, ROADS, ROADS7,
    ROADS5, ROADS10, ROADS9, INTERSECTION,
];

#[rustfmt::skip]
const RAIL_TABLE: [u16; 16] = [
    LHRAIL, LVRAIL, LHRAIL, LVRAIL2,
    LVRAIL, LVRAIL, LVRAIL3, LVRAIL7,
    LHRAIL, LVRAIL5, LHRAIL, LVRAIL6,
    LVRAIL4, LVRAIL9, LVRAIL8, LVRAIL10,
];

#[rustfmt::skip]
const WIRE_TABLE: [u16; 16] = [
    LHPOWER, LVPOWER, LHPOWER, LVPOWER2,
    LVPOWER, LVPOWER, LVPOWER3, LVPOWER7,
    LHPOWER, LVPOWER5, LHPOWER, LVPOWER6,
    LVPOWER4, LVPOWER9, LVPOWER8, LVPOWER10,
];

/// Fold traffic variants of a road back onto the plain piece.
fn neutralize_road(cell: u16) -> u16 {
    let tile = tile_of(cell);
    if (ROADBASE..=207).contains(&tile) {
        (tile & 0x000f) + ROADBASE
    } else {
        tile
    }
}

fn is_open_water(tile: u16) -> bool {
    matches!(tile, RIVER | REDGE | CHANNEL)
}

/// Lay one piece of `network` at (x, y) and tidy up around it.
pub fn connect_tile(b: &mut PreviewBuilder, x: i32, y: i32, network: Network) -> ToolResult {
    if !b.in_bounds(x, y) {
        return ToolResult::UhOh;
    }
    if b.ctx.settings.auto_bulldoze {
        auto_doze(b, x, y);
    }
    let result = match network {
        Network::Road => lay_road(b, x, y),
        Network::Rail => lay_rail(b, x, y),
        Network::Wire => lay_wire(b, x, y),
    };
    fix_zone(b, x, y);
    result
}

/// Clear rubble, trees and debris ahead of a new piece.
fn auto_doze(b: &mut PreviewBuilder, x: i32, y: i32) {
    let cell = b.get(x, y);
    if !b.ctx.specs.is_bulldozable(cell) {
        return;
    }
    let tile = neutralize_road(cell);
    let debris = (TINYEXP..=LASTTINYEXP).contains(&tile);
    if debris || (tile < HBRIDGE && tile != DIRT) {
        b.add_cost(AUTO_DOZE_COST);
        b.set(x, y, DIRT);
    }
}

fn lay_road(b: &mut PreviewBuilder, x: i32, y: i32) -> ToolResult {
    let mut cost = ROAD_COST;
    let tile = neutralize_road(b.get(x, y));
    let piece = match tile {
        DIRT => ROADS,
        t if is_open_water(t) => {
            cost = BRIDGE_COST;
            let across = |t: u16| t == VRAILROAD || t == HBRIDGE || (ROADS..=HROADPOWER).contains(&t);
            let across_west = |t: u16| t == VRAILROAD || t == HBRIDGE || (ROADS..=INTERSECTION).contains(&t);
            let along = |t: u16| t == HRAILROAD || t == VROADPOWER || (VBRIDGE..=INTERSECTION).contains(&t);
            if b.in_bounds(x + 1, y) && across(neutralize_road(b.get(x + 1, y))) {
                HBRIDGE
            } else if b.in_bounds(x - 1, y) && across_west(neutralize_road(b.get(x - 1, y))) {
                HBRIDGE
            } else if b.in_bounds(x, y + 1) && along(neutralize_road(b.get(x, y + 1))) {
                VBRIDGE
            } else if b.in_bounds(x, y - 1) && along(neutralize_road(b.get(x, y - 1))) {
                VBRIDGE
            } else {
                return ToolResult::NeedBulldoze;
            }
        }
        LHPOWER => VROADPOWER,
        LVPOWER => HROADPOWER,
        LHRAIL => HRAILROAD,
        LVRAIL => VRAILROAD,
        _ => return ToolResult::NeedBulldoze,
    };
    b.set(x, y, piece);
    b.add_cost(cost);
    ToolResult::Success
}

fn lay_rail(b: &mut PreviewBuilder, x: i32, y: i32) -> ToolResult {
    let mut cost = RAIL_COST;
    let tile = neutralize_road(b.get(x, y));
    let piece = match tile {
        DIRT => LHRAIL,
        t if is_open_water(t) => {
            cost = TUNNEL_COST;
            let across = |t: u16| t == RAILHPOWERV || t == HRAIL || (LHRAIL..=HRAILROAD).contains(&t);
            let along = |t: u16| t == RAILVPOWERH || t == VRAILROAD || (t > VRAIL && t < VRAILROAD);
            if b.in_bounds(x + 1, y) && across(neutralize_road(b.get(x + 1, y))) {
                HRAIL
            } else if b.in_bounds(x - 1, y) && across(neutralize_road(b.get(x - 1, y))) {
                HRAIL
            } else if b.in_bounds(x, y + 1) && along(neutralize_road(b.get(x, y + 1))) {
                VRAIL
            } else if b.in_bounds(x, y - 1) && along(neutralize_road(b.get(x, y - 1))) {
                VRAIL
            } else {
                return ToolResult::NeedBulldoze;
            }
        }
        LHPOWER => RAILVPOWERH,
        LVPOWER => RAILHPOWERV,
        ROADS => VRAILROAD,
        ROADS2 => HRAILROAD,
        _ => return ToolResult::NeedBulldoze,
    };
    b.set(x, y, piece);
    b.add_cost(cost);
    ToolResult::Success
}

fn lay_wire(b: &mut PreviewBuilder, x: i32, y: i32) -> ToolResult {
    let mut cost = WIRE_COST;
    let tile = neutralize_road(b.get(x, y));
    let piece = match tile {
        DIRT => LHPOWER,
        t if is_open_water(t) => {
            cost = UNDERWATER_WIRE_COST;
            if conducts_except(b, x + 1, y, &[HROADPOWER, RAILHPOWERV, HPOWER])
                || conducts_except(b, x - 1, y, &[HROADPOWER, RAILHPOWERV, HPOWER])
            {
                VPOWER
            } else if conducts_except(b, x, y + 1, &[VROADPOWER, RAILVPOWERH, VPOWER])
                || conducts_except(b, x, y - 1, &[VROADPOWER, RAILVPOWERH, VPOWER])
            {
                HPOWER
            } else {
                return ToolResult::NeedBulldoze;
            }
        }
        ROADS => HROADPOWER,
        ROADS2 => VROADPOWER,
        LHRAIL => RAILHPOWERV,
        LVRAIL => RAILVPOWERH,
        _ => return ToolResult::NeedBulldoze,
    };
    b.set(x, y, piece);
    b.add_cost(cost);
    ToolResult::Success
}

/// Is (x, y) conductive and not one of the `blocked` crossings?
fn conducts_except(b: &PreviewBuilder, x: i32, y: i32, blocked: &[u16]) -> bool {
    if !b.in_bounds(x, y) {
        return false;
    }
    let cell = b.get(x, y);
    b.ctx.specs.is_conductive(cell) && !blocked.contains(&neutralize_road(cell))
}

fn fix_zone(b: &mut PreviewBuilder, x: i32, y: i32) {
    fix_single(b, x, y);
    fix_single(b, x, y - 1);
    fix_single(b, x + 1, y);
    fix_single(b, x, y + 1);
    fix_single(b, x - 1, y);
}

/// Neighbour bitmask: north 1, east 2, south 4, west 8.
fn neighbour_mask(b: &PreviewBuilder, x: i32, y: i32, joins: impl Fn(usize, u16) -> bool) -> usize {
    const STEPS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
    let mut mask = 0;
    for (i, (dx, dy)) in STEPS.iter().enumerate() {
        let (nx, ny) = (x + dx, y + dy);
        if b.in_bounds(nx, ny) && joins(i, b.get(nx, ny)) {
            mask |= 1 << i;
        }
    }
    mask
}

/// Redraw the road, rail or wire at (x, y) to match its neighbours.
fn fix_single(b: &mut PreviewBuilder, x: i32, y: i32) {
    if !b.in_bounds(x, y) {
        return;
    }
    let tile = neutralize_road(b.get(x, y));

    if (ROADS..=INTERSECTION).contains(&tile) {
        let mask = neighbour_mask(b, x, y, |dir, cell| {
            let t = neutralize_road(cell);
            let vertical = dir % 2 == 0;
            let carries = if vertical { t == HRAILROAD } else { t == VRAILROAD }
                || (ROADBASE..=VROADPOWER).contains(&t);
            let blocked = if vertical {
                [HROADPOWER, VRAILROAD, ROADBASE]
            } else {
                [VROADPOWER, HRAILROAD, VBRIDGE]
            };
            carries && !blocked.contains(&t)
        });
        b.set(x, y, ROAD_TABLE[mask]);
        return;
    }

    if (LHRAIL..=LVRAIL10).contains(&tile) {
        let mask = neighbour_mask(b, x, y, |dir, cell| {
            let t = neutralize_road(cell);
            let blocked = if dir % 2 == 0 {
                [RAILHPOWERV, HRAILROAD, HRAIL]
            } else {
                [RAILVPOWERH, VRAILROAD, VRAIL]
            };
            (RAILHPOWERV..=VRAILROAD).contains(&t) && !blocked.contains(&t)
        });
        b.set(x, y, RAIL_TABLE[mask]);
        return;
    }

    if (LHPOWER..=LVPOWER10).contains(&tile) {
        let specs = b.ctx.specs;
        let mask = neighbour_mask(b, x, y, |dir, cell| {
            let t = neutralize_road(cell);
            let blocked = if dir % 2 == 0 {
                [VPOWER, VROADPOWER, RAILVPOWERH]
            } else {
                [HPOWER, HROADPOWER, RAILHPOWERV]
            };
            specs.is_conductive(cell) && !blocked.contains(&t)
        });
        b.set(x, y, WIRE_TABLE[mask]);
    }
}
