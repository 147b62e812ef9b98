//! Tool previews: a proposed patch of tiles with its price, built against
//! the live map and committed in one step.

use std::collections::BTreeMap;

use crate::context::SimContext;
use crate::events::SoundKind;

use super::ToolResult;

/// A rectangular patch of proposed cells. `None` cells leave the map alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolPreview {
    /// Top-left corner of the patch relative to the tool origin.
    pub offset: (i32, i32),
    pub width: i32,
    pub height: i32,
    pub cells: Vec<Option<u16>>,
    pub cost: i64,
    /// Sounds played on commit, positioned relative to the tool origin.
    pub sounds: Vec<(SoundKind, i32, i32)>,
    /// Reported when the patch writes nothing.
    pub result: ToolResult,
}

impl ToolPreview {
    /// A preview that changes nothing and reports `result`.
    pub fn rejected(result: ToolResult) -> Self {
        Self {
            offset: (0, 0),
            width: 0,
            height: 0,
            cells: Vec::new(),
            cost: 0,
            sounds: Vec::new(),
            result,
        }
    }

    pub fn cell(&self, px: i32, py: i32) -> Option<u16> {
        if px < 0 || py < 0 || px >= self.width || py >= self.height {
            return None;
        }
        self.cells[(py * self.width + px) as usize]
    }

    /// Non-clear cells as absolute map coordinates for an origin.
    pub fn placed(&self, x: i32, y: i32) -> impl Iterator<Item = (i32, i32, u16)> + '_ {
        let (ox, oy) = (x + self.offset.0, y + self.offset.1);
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.map(|v| (ox + i as i32 % w, oy + i as i32 / w, v)))
    }

    /// Commit the patch at (x, y).
    ///
    /// Fails with [`ToolResult::UhOh`] when the patch does not fit on the
    /// map and with [`ToolResult::InsufficientFunds`] when the city cannot
    /// pay; neither touches the map or the treasury. Otherwise every
    /// non-clear cell is written and the cost is charged once if anything
    /// was written.
    pub fn apply(&self, ctx: &mut SimContext, x: i32, y: i32) -> ToolResult {
        let (left, top) = (x + self.offset.0, y + self.offset.1);
        if self.width > 0 && self.height > 0 {
            let fits = ctx.map.in_bounds(left, top)
                && ctx.map.in_bounds(left + self.width - 1, top + self.height - 1);
            if !fits {
                return ToolResult::UhOh;
            }
        }
        if !ctx.budget.can_afford(self.cost) {
            return ToolResult::InsufficientFunds;
        }

        let mut written = false;
        for (mx, my, value) in self.placed(x, y) {
            written |= ctx.map.set(mx, my, value);
        }
        for &(sound, dx, dy) in &self.sounds {
            ctx.outbox.sound(sound, x + dx, y + dy);
        }
        if !written {
            return self.result;
        }
        if self.cost != 0 {
            ctx.budget.spend(self.cost);
        }
        ToolResult::Success
    }
}

/// Accumulates writes over the live map while a tool works out what it
/// would do. Reads see earlier writes.
pub struct PreviewBuilder<'a, 'c> {
    pub ctx: &'a mut SimContext<'c>,
    origin: (i32, i32),
    writes: BTreeMap<(i32, i32), u16>,
    cost: i64,
    sounds: Vec<(SoundKind, i32, i32)>,
}

impl<'a, 'c> PreviewBuilder<'a, 'c> {
    pub fn new(ctx: &'a mut SimContext<'c>, x: i32, y: i32) -> Self {
        Self {
            ctx,
            origin: (x, y),
            writes: BTreeMap::new(),
            cost: 0,
            sounds: Vec::new(),
        }
    }

    /// Cell at (x, y) as the preview would leave it; 0 off the map.
    pub fn get(&self, x: i32, y: i32) -> u16 {
        self.writes
            .get(&(x, y))
            .copied()
            .unwrap_or_else(|| self.ctx.cell(x, y))
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.ctx.map.in_bounds(x, y)
    }

    pub fn set(&mut self, x: i32, y: i32, value: u16) {
        self.writes.insert((x, y), value);
    }

    pub fn add_cost(&mut self, cost: i64) {
        self.cost += cost;
    }

    pub fn sound(&mut self, sound: SoundKind) {
        self.sounds.push((sound, 0, 0));
    }

    /// Pack the writes into a patch. Anything but success throws the
    /// writes away so committing the preview changes nothing.
    pub fn finish(self, result: ToolResult) -> ToolPreview {
        if result != ToolResult::Success || self.writes.is_empty() {
            return ToolPreview::rejected(result);
        }
        let (ox, oy) = self.origin;
        let xs = self.writes.keys().map(|&(x, _)| x);
        let ys = self.writes.keys().map(|&(_, y)| y);
        let (left, right) = (xs.clone().min().unwrap_or(ox), xs.max().unwrap_or(ox));
        let (top, bottom) = (ys.clone().min().unwrap_or(oy), ys.max().unwrap_or(oy));
        let width = right - left + 1;
        let height = bottom - top + 1;
        let mut cells = vec![None; (width * height) as usize];
        for (&(x, y), &value) in &self.writes {
            cells[((y - top) * width + (x - left)) as usize] = Some(value);
        }
        ToolPreview {
            offset: (left - ox, top - oy),
            width,
            height,
            cells,
            cost: self.cost,
            sounds: self.sounds,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::tiles::{DIRT, ROADS};

    fn road_patch(state: &mut CityState, cost: i64) -> ToolPreview {
        let mut ctx = state.ctx();
        let mut b = PreviewBuilder::new(&mut ctx, 10, 10);
        b.set(10, 10, ROADS);
        b.set(11, 12, ROADS);
        b.add_cost(cost);
        b.sound(SoundKind::Build);
        b.finish(ToolResult::Success)
    }

    #[test]
    fn test_patch_is_packed_with_clear_cells() {
        let mut state = CityState::new(1);
        let preview = road_patch(&mut state, 10);
        assert_eq!(preview.offset, (0, 0));
        assert_eq!((preview.width, preview.height), (2, 3));
        assert_eq!(preview.cell(0, 0), Some(ROADS));
        assert_eq!(preview.cell(1, 0), None);
        assert_eq!(preview.cell(1, 2), Some(ROADS));
    }

    #[test]
    fn test_apply_charges_once() {
        let mut state = CityState::new(1);
        state.budget.funds = 100;
        let preview = road_patch(&mut state, 10);
        assert_eq!(preview.apply(&mut state.ctx(), 10, 10), ToolResult::Success);
        assert_eq!(state.budget.funds, 90);
        assert_eq!(state.tile_at(11, 12), ROADS);
        assert_eq!(state.tile_at(11, 10), DIRT);
        assert_eq!(state.outbox.sounds.len(), 1);
    }

    #[test]
    fn test_apply_off_map_or_broke_changes_nothing() {
        let mut state = CityState::new(1);
        state.budget.funds = 100;
        let preview = road_patch(&mut state, 10);
        assert_eq!(preview.apply(&mut state.ctx(), 119, 10), ToolResult::UhOh);
        state.budget.funds = 5;
        assert_eq!(
            preview.apply(&mut state.ctx(), 10, 10),
            ToolResult::InsufficientFunds
        );
        assert_eq!(state.budget.funds, 5);
        assert!(state.map.cells().iter().all(|&c| c == DIRT));
    }

    #[test]
    fn test_rejected_preview_reports_its_result() {
        let mut state = CityState::new(1);
        let preview = ToolPreview::rejected(ToolResult::NeedBulldoze);
        assert_eq!(
            preview.apply(&mut state.ctx(), 3, 3),
            ToolResult::NeedBulldoze
        );
    }
}
