//! Coarse-resolution statistical overlays recomputed by the propagation scans.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{EIGHTH_BLOCK, HALF_BLOCK, QUARTER_BLOCK, WORLD_H, WORLD_W};
use crate::geometry::CityLocation;

/// A 2-D array covering the map at `block` tiles per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayMap<T> {
    block: usize,
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> OverlayMap<T> {
    pub fn new(world_w: usize, world_h: usize, block: usize) -> Self {
        let width = world_w.div_ceil(block);
        let height = world_h.div_ceil(block);
        Self {
            block,
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }

    pub fn width(&self) -> i32 {
        self.width as i32
    }

    pub fn height(&self) -> i32 {
        self.height as i32
    }

    pub fn block(&self) -> i32 {
        self.block as i32
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Value at overlay cell (x, y); the default value off the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> T {
        if self.in_bounds(x, y) {
            self.data[y as usize * self.width + x as usize]
        } else {
            T::default()
        }
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: T) {
        if self.in_bounds(x, y) {
            self.data[y as usize * self.width + x as usize] = value;
        }
    }

    /// Value covering world tile (x, y).
    #[inline]
    pub fn world_get(&self, x: i32, y: i32) -> T {
        if x < 0 || y < 0 {
            return T::default();
        }
        self.get(x / self.block as i32, y / self.block as i32)
    }

    #[inline]
    pub fn world_set(&mut self, x: i32, y: i32, value: T) {
        if x < 0 || y < 0 {
            return;
        }
        self.set(x / self.block as i32, y / self.block as i32, value);
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn clear(&mut self) {
        self.fill(T::default());
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }
}

impl OverlayMap<i32> {
    /// Sum of the four orthogonal neighbours that lie on the grid.
    fn edge_sum(&self, x: i32, y: i32) -> i32 {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .iter()
            .filter(|(dx, dy)| self.in_bounds(x + dx, y + dy))
            .map(|(dx, dy)| self.get(x + dx, y + dy))
            .sum()
    }

    /// Five-point blur into a fresh map, capped at 255.
    pub fn smoothed(&self) -> Self {
        let mut out = self.clone();
        for y in 0..self.height() {
            for x in 0..self.width() {
                let z = (self.get(x, y) + self.edge_sum(x, y)) / 4;
                out.set(x, y, z.min(255));
            }
        }
        out
    }

    /// Terrain blur: half the cell plus a quarter of its neighbours.
    pub fn smoothed_terrain(&self) -> Self {
        let mut out = self.clone();
        for y in 0..self.height() {
            for x in 0..self.width() {
                out.set(x, y, self.edge_sum(x, y) / 4 + self.get(x, y) / 2);
            }
        }
        out
    }

    /// Station-strength blur, written back in place so cells later in the
    /// pass see their already-blurred neighbours.
    pub fn smooth_in_place(&mut self) {
        for x in 0..self.width() {
            for y in 0..self.height() {
                let edge = self.edge_sum(x, y) / 4 + self.get(x, y);
                self.set(x, y, edge / 2);
            }
        }
    }
}

/// Which overlay a host should redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayKind {
    Power,
    TrafficDensity,
    Pollution,
    LandValue,
    Crime,
    PopulationDensity,
    RateOfGrowth,
    FireCoverage,
    PoliceCoverage,
}

#[derive(Resource, Debug, Clone)]
pub struct CityOverlays {
    /// One flag per tile: reached by the power trace.
    pub power_grid: OverlayMap<bool>,
    pub population_density: OverlayMap<i32>,
    pub traffic_density: OverlayMap<i32>,
    pub pollution: OverlayMap<i32>,
    pub land_value: OverlayMap<i32>,
    pub crime: OverlayMap<i32>,
    pub terrain_density: OverlayMap<i32>,
    pub rate_of_growth: OverlayMap<i32>,
    /// Station strength deposited during the map scan.
    pub fire_station: OverlayMap<i32>,
    /// Smoothed station strength read by tile behavior.
    pub fire_coverage: OverlayMap<i32>,
    pub police_station: OverlayMap<i32>,
    pub police_coverage: OverlayMap<i32>,
    pub com_rate: OverlayMap<i32>,

    pub land_value_average: i32,
    pub pollution_average: i32,
    pub crime_average: i32,
    pub pollution_max: CityLocation,
    pub crime_max: CityLocation,
    pub traffic_max: CityLocation,
    pub city_center: CityLocation,
}

impl Default for CityOverlays {
    fn default() -> Self {
        Self::new(WORLD_W, WORLD_H)
    }
}

impl CityOverlays {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            power_grid: OverlayMap::new(w, h, 1),
            population_density: OverlayMap::new(w, h, HALF_BLOCK),
            traffic_density: OverlayMap::new(w, h, HALF_BLOCK),
            pollution: OverlayMap::new(w, h, HALF_BLOCK),
            land_value: OverlayMap::new(w, h, HALF_BLOCK),
            crime: OverlayMap::new(w, h, HALF_BLOCK),
            terrain_density: OverlayMap::new(w, h, QUARTER_BLOCK),
            rate_of_growth: OverlayMap::new(w, h, EIGHTH_BLOCK),
            fire_station: OverlayMap::new(w, h, EIGHTH_BLOCK),
            fire_coverage: OverlayMap::new(w, h, EIGHTH_BLOCK),
            police_station: OverlayMap::new(w, h, EIGHTH_BLOCK),
            police_coverage: OverlayMap::new(w, h, EIGHTH_BLOCK),
            com_rate: OverlayMap::new(w, h, EIGHTH_BLOCK),
            land_value_average: 0,
            pollution_average: 0,
            crime_average: 0,
            pollution_max: CityLocation::default(),
            crime_max: CityLocation::default(),
            traffic_max: CityLocation::default(),
            city_center: CityLocation::new(w as i32 / 2, h as i32 / 2),
        }
    }

    /// Distance from the population center, capped at 64.
    pub fn city_center_distance(&self, x: i32, y: i32) -> i32 {
        let d = (x - self.city_center.x).abs() + (y - self.city_center.y).abs();
        d.min(64)
    }

    /// Let rate-of-growth drift back toward zero, clamped to +-200.
    pub fn decay_rate_of_growth(&mut self) {
        let map = &mut self.rate_of_growth;
        for y in 0..map.height() {
            for x in 0..map.width() {
                let z = map.get(x, y);
                let z = match z {
                    0 => continue,
                    z if z > 0 => (z - 1).min(200),
                    z => (z + 1).max(-200),
                };
                map.set(x, y, z);
            }
        }
    }

    /// Bump the rate-of-growth overlay covering world tile (x, y).
    pub fn inc_rate_of_growth(&mut self, x: i32, y: i32, amount: i32) {
        let value = self.rate_of_growth.world_get(x, y);
        self.rate_of_growth.world_set(x, y, value + amount * 4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_rounds_up() {
        let o = CityOverlays::default();
        assert_eq!((o.land_value.width(), o.land_value.height()), (60, 50));
        assert_eq!((o.terrain_density.width(), o.terrain_density.height()), (30, 25));
        assert_eq!((o.fire_station.width(), o.fire_station.height()), (15, 13));
    }

    #[test]
    fn test_world_coordinates_map_to_blocks() {
        let mut m: OverlayMap<i32> = OverlayMap::new(120, 100, 8);
        m.world_set(17, 9, 5);
        assert_eq!(m.get(2, 1), 5);
        assert_eq!(m.world_get(16, 15), 5);
        assert_eq!(m.world_get(-1, 0), 0);
        m.world_set(-3, 200, 9);
        assert!(m.data().iter().all(|&v| v == 0 || v == 5));
    }

    #[test]
    fn test_smoothing_spreads_and_caps() {
        let mut m: OverlayMap<i32> = OverlayMap::new(10, 10, 1);
        m.set(5, 5, 400);
        let s = m.smoothed();
        assert_eq!(s.get(5, 5), 100);
        assert_eq!(s.get(4, 5), 100);
        assert_eq!(s.get(4, 4), 0);
        m.fill(400);
        assert_eq!(m.smoothed().get(5, 5), 255);
    }

    #[test]
    fn test_in_place_smoothing_sees_earlier_writes() {
        let mut m: OverlayMap<i32> = OverlayMap::new(3, 1, 1);
        m.set(0, 0, 80);
        m.smooth_in_place();
        // (0 + 80) / 2 = 40, then (40/4 + 0) / 2 = 5 using the new value.
        assert_eq!(m.get(0, 0), 40);
        assert_eq!(m.get(1, 0), 5);
    }

    #[test]
    fn test_rate_of_growth_decays_toward_zero() {
        let mut o = CityOverlays::default();
        o.rate_of_growth.set(0, 0, 300);
        o.rate_of_growth.set(1, 0, -5);
        o.decay_rate_of_growth();
        assert_eq!(o.rate_of_growth.get(0, 0), 200);
        assert_eq!(o.rate_of_growth.get(1, 0), -4);
    }

    #[test]
    fn test_city_center_distance_caps() {
        let o = CityOverlays::default();
        assert_eq!(o.city_center_distance(60, 50), 0);
        assert_eq!(o.city_center_distance(0, 0), 64);
    }
}
