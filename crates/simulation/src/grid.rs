use bevy::prelude::*;

use crate::config::{WORLD_H, WORLD_W};
use crate::geometry::CityLocation;
use crate::tiles::{LOMASK, PWRBIT};

/// The city's tile grid: one 16-bit cell per tile, row-major.
///
/// Every read and write is bounds-checked. Reads off the grid return `None`
/// and writes off the grid are dropped, since sprites and scans probe past
/// the edges all the time.
#[derive(Resource, Debug, Clone)]
pub struct TileMap {
    width: usize,
    height: usize,
    cells: Vec<u16>,
    dirty: Vec<bool>,
    changed: Vec<CityLocation>,
    whole_map_changed: bool,
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(WORLD_W, WORLD_H)
    }
}

impl TileMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
            dirty: vec![false; width * height],
            changed: Vec::new(),
            whole_map_changed: true,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width as i32
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height as i32
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width + x as usize
    }

    /// Raw cell value including the power bit.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u16> {
        if self.in_bounds(x, y) {
            Some(self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Tile number at (x, y) with flag bits stripped.
    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> Option<u16> {
        self.get(x, y).map(|c| c & LOMASK)
    }

    pub fn tile_at(&self, loc: CityLocation) -> Option<u16> {
        self.tile(loc.x, loc.y)
    }

    /// Write a raw cell value. Returns `false` when (x, y) is off the grid.
    pub fn set(&mut self, x: i32, y: i32, cell: u16) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        if self.cells[idx] != cell {
            self.cells[idx] = cell;
            if !self.dirty[idx] {
                self.dirty[idx] = true;
                self.changed.push(CityLocation::new(x, y));
            }
        }
        true
    }

    pub fn is_powered(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|c| c & PWRBIT != 0)
    }

    pub fn set_powered(&mut self, x: i32, y: i32, powered: bool) {
        if let Some(cell) = self.get(x, y) {
            let next = if powered { cell | PWRBIT } else { cell & !PWRBIT };
            self.set(x, y, next);
        }
    }

    pub fn fill(&mut self, cell: u16) {
        self.cells.fill(cell);
        self.mark_all_changed();
    }

    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    /// Replace the whole grid, e.g. after loading a city file.
    pub fn replace_cells(&mut self, width: usize, height: usize, cells: Vec<u16>) {
        debug_assert_eq!(cells.len(), width * height);
        self.width = width;
        self.height = height;
        self.cells = cells;
        self.dirty = vec![false; width * height];
        self.mark_all_changed();
    }

    pub fn mark_all_changed(&mut self) {
        self.whole_map_changed = true;
        self.changed.clear();
        self.dirty.fill(false);
    }

    /// Drain the cells written since the last call. The flag is `true` when
    /// the whole map was replaced and per-tile changes were folded into it.
    pub fn take_changes(&mut self) -> (bool, Vec<CityLocation>) {
        let whole = std::mem::take(&mut self.whole_map_changed);
        let changed = std::mem::take(&mut self.changed);
        for loc in &changed {
            let idx = self.index(loc.x, loc.y);
            self.dirty[idx] = false;
        }
        (whole, changed)
    }

    /// Iterate `(x, y, cell)` over every tile, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, u16)> + '_ {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &c)| ((i % w) as i32, (i / w) as i32, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{RIVER, ROADS};

    #[test]
    fn test_default_size_and_dirt() {
        let map = TileMap::default();
        assert_eq!(map.width(), 120);
        assert_eq!(map.height(), 100);
        assert!(map.iter().all(|(_, _, c)| c == 0));
    }

    #[test]
    fn test_off_grid_access_is_a_no_op() {
        let mut map = TileMap::new(4, 3);
        let before = map.cells().to_vec();
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3), (i32::MIN, i32::MAX)] {
            assert!(!map.set(x, y, RIVER));
            assert_eq!(map.get(x, y), None);
        }
        assert_eq!(map.cells(), &before[..]);
    }

    #[test]
    fn test_power_bit_is_separate_from_tile() {
        let mut map = TileMap::new(4, 4);
        map.set(1, 1, ROADS);
        map.set_powered(1, 1, true);
        assert!(map.is_powered(1, 1));
        assert_eq!(map.tile(1, 1), Some(ROADS));
        map.set_powered(1, 1, false);
        assert_eq!(map.get(1, 1), Some(ROADS));
    }

    #[test]
    fn test_change_log_dedupes_and_drains() {
        let mut map = TileMap::new(4, 4);
        map.take_changes();
        map.set(2, 2, RIVER);
        map.set(2, 2, ROADS);
        map.set(3, 3, 0); // unchanged value
        let (whole, changed) = map.take_changes();
        assert!(!whole);
        assert_eq!(changed, vec![CityLocation::new(2, 2)]);
        assert!(map.take_changes().1.is_empty());
    }
}
