//! Plain value types for tile coordinates and sizes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CityLocation {
    pub x: i32,
    pub y: i32,
}

impl CityLocation {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance in tiles.
    pub fn distance(self, other: CityLocation) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CityDimension {
    pub width: i32,
    pub height: i32,
}

impl CityDimension {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CityRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CityRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> CityLocation {
        CityLocation::new(self.x, self.y)
    }

    pub fn size(&self) -> CityDimension {
        CityDimension::new(self.width, self.height)
    }

    pub fn contains(&self, loc: CityLocation) -> bool {
        loc.x >= self.x
            && loc.y >= self.y
            && loc.x < self.x + self.width
            && loc.y < self.y + self.height
    }
}

/// Four-way heading used by traffic and power tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction4 {
    North,
    East,
    South,
    West,
}

impl Direction4 {
    pub const ALL: [Direction4; 4] = [
        Direction4::North,
        Direction4::East,
        Direction4::South,
        Direction4::West,
    ];

    pub fn from_index(i: usize) -> Self {
        Self::ALL[i & 3]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction4::North => (0, -1),
            Direction4::East => (1, 0),
            Direction4::South => (0, 1),
            Direction4::West => (-1, 0),
        }
    }

    pub fn reverse(self) -> Self {
        Self::from_index(self.index() + 2)
    }
}
