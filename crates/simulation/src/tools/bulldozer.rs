use super::preview::PreviewBuilder;
use super::ToolResult;
use crate::events::SoundKind;
use crate::tiles::{
    is_river_edge, tile_of, TileRegistry, DIRT, RADTILE, REDGE, RIVER, TINYEXP,
};

pub const BULLDOZER_COST: i64 = 1;

/// Zone centre of the building `cell` belongs to, as an offset from the
/// member to the centre.
fn center_offset(specs: &TileRegistry, cell: u16) -> Option<(i32, i32)> {
    if specs.is_zone_center(cell) {
        return Some((0, 0));
    }
    specs.owner_of(cell)?;
    let spec = specs.get(cell);
    let (dx, dy) = match spec.owner {
        Some(_) => spec.owner_offset,
        None => specs.get(spec.on_shutdown?).owner_offset,
    };
    Some((-dx, -dy))
}

pub fn bulldoze(b: &mut PreviewBuilder, x: i32, y: i32) -> ToolResult {
    if !b.in_bounds(x, y) {
        return ToolResult::UhOh;
    }
    let specs = b.ctx.specs;
    let cell = b.get(x, y);

    if let Some((dx, dy)) = center_offset(specs, cell) {
        let (cx, cy) = (x + dx, y + dy);
        let center = b.get(cx, cy);
        if let Some(info) = specs.building(center) {
            for (mx, my, _) in info.cells() {
                let (tx, ty) = (cx + mx, cy + my);
                let tile = tile_of(b.get(tx, ty));
                if b.in_bounds(tx, ty) && tile != DIRT && tile != RADTILE {
                    b.set(tx, ty, TINYEXP);
                }
            }
            b.add_cost(BULLDOZER_COST);
            b.sound(SoundKind::ExplosionHigh);
            return ToolResult::Success;
        }
    }

    let tile = tile_of(cell);
    if tile == DIRT {
        return ToolResult::Failed;
    }
    if !specs.is_bulldozable(cell) {
        return ToolResult::UhOh;
    }
    let cleared = if specs.is_overwater(cell) && tile != REDGE && !is_river_edge(tile) {
        RIVER
    } else {
        DIRT
    };
    b.set(x, y, cleared);
    b.add_cost(BULLDOZER_COST);
    b.sound(SoundKind::Bulldoze);
    ToolResult::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::tiles::{FREEZ, HBRIDGE, NUCLEAR, ROADS, WOODS};

    fn doze(state: &mut CityState, x: i32, y: i32) -> ToolResult {
        let mut ctx = state.ctx();
        let mut b = PreviewBuilder::new(&mut ctx, x, y);
        let result = bulldoze(&mut b, x, y);
        let preview = b.finish(result);
        preview.apply(&mut state.ctx(), x, y)
    }

    fn stamp(state: &mut CityState, x: i32, y: i32, center: u16) {
        let info = state.specs.building(center).cloned().expect("building");
        for (dx, dy, member) in info.cells() {
            state.map.set(x + dx, y + dy, member);
        }
    }

    #[test]
    fn test_clears_single_tiles() {
        let mut state = CityState::new(1);
        state.budget.funds = 10;
        state.map.set(3, 3, WOODS);
        state.map.set(4, 3, ROADS);
        state.map.set(5, 3, HBRIDGE);
        assert_eq!(doze(&mut state, 3, 3), ToolResult::Success);
        assert_eq!(doze(&mut state, 4, 3), ToolResult::Success);
        assert_eq!(doze(&mut state, 5, 3), ToolResult::Success);
        assert_eq!(state.tile_at(3, 3), DIRT);
        assert_eq!(state.tile_at(4, 3), DIRT);
        assert_eq!(state.tile_at(5, 3), RIVER);
        assert_eq!(state.budget.funds, 7);
    }

    #[test]
    fn test_dirt_and_water_are_refused() {
        let mut state = CityState::new(1);
        state.budget.funds = 10;
        state.map.set(3, 3, RIVER);
        assert_eq!(doze(&mut state, 2, 2), ToolResult::Failed);
        assert_eq!(doze(&mut state, 3, 3), ToolResult::UhOh);
        assert_eq!(state.budget.funds, 10);
    }

    #[test]
    fn test_member_demolishes_whole_building() {
        let mut state = CityState::new(1);
        state.budget.funds = 10;
        stamp(&mut state, 20, 20, NUCLEAR);
        // Bottom-right member of the 4x4 footprint.
        assert_eq!(doze(&mut state, 22, 22), ToolResult::Success);
        for y in 19..=22 {
            for x in 19..=22 {
                assert_eq!(state.tile_at(x, y), TINYEXP, "({x}, {y})");
            }
        }
        assert_eq!(state.tile_at(23, 20), DIRT);
        assert_eq!(state.budget.funds, 9);
    }

    #[test]
    fn test_zone_centre_demolishes_zone() {
        let mut state = CityState::new(1);
        state.budget.funds = 10;
        stamp(&mut state, 10, 10, FREEZ);
        assert_eq!(doze(&mut state, 10, 10), ToolResult::Success);
        assert_eq!(state.tile_at(9, 9), TINYEXP);
        assert_eq!(state.tile_at(11, 11), TINYEXP);
    }
}
