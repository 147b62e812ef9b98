//! Assertion helpers for `TestCity` integration tests.

use crate::tiles::{TileRegistry, TILE_COUNT};

use super::TestCity;

impl TestCity {
    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    /// Assert the tile number (power bit ignored) at a cell.
    pub fn assert_tile(&self, x: i32, y: i32, expected: u16) {
        let tile = self.tile(x, y);
        assert_eq!(
            tile, expected,
            "Expected tile {expected} at ({x}, {y}), found {tile}"
        );
    }

    pub fn assert_funds(&self, expected: i64) {
        let funds = self.funds();
        assert_eq!(funds, expected, "Expected funds {expected}, got {funds}");
    }

    /// Assert every cell holds a tile number the tile table knows.
    pub fn assert_cells_valid(&self) {
        let specs = self.resource::<TileRegistry>();
        for (x, y, cell) in self.map().iter() {
            let tile = crate::tiles::tile_of(cell) as usize;
            assert!(
                tile < TILE_COUNT && tile < specs.len(),
                "Invalid tile {tile} at ({x}, {y})"
            );
        }
    }
}
