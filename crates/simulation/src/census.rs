//! Population and infrastructure counts gathered by the map scan, and the
//! history arrays they feed.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{HISTORY_HALF, HISTORY_LENGTH};
use crate::geometry::CityLocation;
use crate::overlays::CityOverlays;

/// Counters rebuilt from scratch by every full map scan.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityCensus {
    pub res_pop: i32,
    pub com_pop: i32,
    pub ind_pop: i32,

    pub res_zone_count: i32,
    pub com_zone_count: i32,
    pub ind_zone_count: i32,
    pub hospital_count: i32,
    pub church_count: i32,
    pub police_station_count: i32,
    pub fire_station_count: i32,
    pub stadium_count: i32,
    pub coal_count: i32,
    pub nuclear_count: i32,
    pub seaport_count: i32,
    pub airport_count: i32,

    pub road_total: i32,
    pub rail_total: i32,
    pub fire_pop: i32,
    pub powered_zone_count: i32,
    pub unpowered_zone_count: i32,
    /// Generating plants found by the scan, traced by the power scan.
    pub power_plants: Vec<CityLocation>,

    // Survive `clear`.
    /// Normalized population: `res_pop / 8 + com_pop + ind_pop`.
    pub total_pop: i32,
    pub last_total_pop: i32,
    /// +1 when another hospital is wanted, -1 when one should close.
    pub need_hospital: i32,
    pub need_church: i32,
    pub crime_ramp: i32,
    pub pollution_ramp: i32,
}

impl CityCensus {
    /// Reset the per-scan counters ahead of a new map scan.
    pub fn clear(&mut self) {
        *self = Self {
            total_pop: self.total_pop,
            last_total_pop: self.last_total_pop,
            need_hospital: self.need_hospital,
            need_church: self.need_church,
            crime_ramp: self.crime_ramp,
            pollution_ramp: self.pollution_ramp,
            ..Self::default()
        };
    }

    /// Citizens as shown to the player.
    pub fn city_population(&self) -> i64 {
        (self.res_pop as i64 + (self.com_pop as i64 + self.ind_pop as i64) * 8) * 20
    }
}

/// Residential, commercial, industrial, crime, pollution and money history.
///
/// Indices 0..120 hold the 10-step history, newest first; 120..240 hold the
/// 120-step history.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityHistory {
    pub residential: Vec<i16>,
    pub commercial: Vec<i16>,
    pub industrial: Vec<i16>,
    pub crime: Vec<i16>,
    pub pollution: Vec<i16>,
    pub money: Vec<i16>,
}

impl Default for CityHistory {
    fn default() -> Self {
        let empty = vec![0; HISTORY_LENGTH];
        Self {
            residential: empty.clone(),
            commercial: empty.clone(),
            industrial: empty.clone(),
            crime: empty.clone(),
            pollution: empty.clone(),
            money: empty,
        }
    }
}

fn push_front(series: &mut [i16], start: usize, value: i16) {
    let end = start + HISTORY_HALF;
    series.copy_within(start..end - 1, start + 1);
    series[start] = value;
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

impl CityHistory {
    fn arrays_mut(&mut self) -> [&mut Vec<i16>; 6] {
        [
            &mut self.residential,
            &mut self.commercial,
            &mut self.industrial,
            &mut self.crime,
            &mut self.pollution,
            &mut self.money,
        ]
    }

    pub fn arrays(&self) -> [&Vec<i16>; 6] {
        [
            &self.residential,
            &self.commercial,
            &self.industrial,
            &self.crime,
            &self.pollution,
            &self.money,
        ]
    }

    /// Record the short-term history sample and update the ramps and
    /// hospital/church demand.
    pub fn take_census_10(
        &mut self,
        census: &mut CityCensus,
        overlays: &CityOverlays,
        cash_flow: i64,
    ) {
        census.crime_ramp += (overlays.crime_average - census.crime_ramp) / 4;
        census.pollution_ramp += (overlays.pollution_average - census.pollution_ramp) / 4;

        let money = (cash_flow / 20 + 128).clamp(0, 255) as i32;
        let samples = [
            census.res_pop / 8,
            census.com_pop,
            census.ind_pop,
            census.crime_ramp.min(255),
            census.pollution_ramp.min(255),
            money,
        ];
        for (series, value) in self.arrays_mut().into_iter().zip(samples) {
            push_front(series, 0, clamp_i16(value));
        }

        let wanted = census.res_pop >> 8;
        census.need_hospital = (wanted - census.hospital_count).signum();
        census.need_church = (wanted - census.church_count).signum();
    }

    /// Record the long-term history sample.
    pub fn take_census_120(&mut self, census: &CityCensus) {
        let samples = [
            clamp_i16(census.res_pop / 8),
            clamp_i16(census.com_pop),
            clamp_i16(census.ind_pop),
            self.crime[0],
            self.pollution[0],
            self.money[0],
        ];
        for (series, value) in self.arrays_mut().into_iter().zip(samples) {
            push_front(series, HISTORY_HALF, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_keeps_ramps_and_needs() {
        let mut census = CityCensus {
            res_pop: 500,
            road_total: 40,
            crime_ramp: 12,
            need_church: 1,
            total_pop: 80,
            ..Default::default()
        };
        census.clear();
        assert_eq!(census.res_pop, 0);
        assert_eq!(census.road_total, 0);
        assert_eq!(census.crime_ramp, 12);
        assert_eq!(census.need_church, 1);
        assert_eq!(census.total_pop, 80);
    }

    #[test]
    fn test_census_10_shifts_short_history_only() {
        let mut history = CityHistory::default();
        history.residential[HISTORY_HALF] = 77;
        let mut census = CityCensus {
            res_pop: 800,
            com_pop: 5,
            ..Default::default()
        };
        let overlays = CityOverlays::default();
        history.take_census_10(&mut census, &overlays, 0);
        census.res_pop = 1600;
        history.take_census_10(&mut census, &overlays, 2000);
        assert_eq!(history.residential[0], 200);
        assert_eq!(history.residential[1], 100);
        assert_eq!(history.commercial[1], 5);
        assert_eq!(history.money[0], 228);
        assert_eq!(history.money[1], 128);
        assert_eq!(history.residential[HISTORY_HALF], 77);
    }

    #[test]
    fn test_ramps_follow_averages() {
        let mut history = CityHistory::default();
        let mut census = CityCensus::default();
        let mut overlays = CityOverlays::default();
        overlays.crime_average = 100;
        history.take_census_10(&mut census, &overlays, 0);
        assert_eq!(census.crime_ramp, 25);
        assert_eq!(history.crime[0], 25);
    }

    #[test]
    fn test_hospital_demand() {
        let mut history = CityHistory::default();
        let overlays = CityOverlays::default();
        let mut census = CityCensus {
            res_pop: 512,
            hospital_count: 0,
            church_count: 5,
            ..Default::default()
        };
        history.take_census_10(&mut census, &overlays, 0);
        assert_eq!(census.need_hospital, 1);
        assert_eq!(census.need_church, -1);
    }

    #[test]
    fn test_census_120_copies_latest_short_samples() {
        let mut history = CityHistory::default();
        history.crime[0] = 9;
        let census = CityCensus {
            ind_pop: 30,
            ..Default::default()
        };
        history.take_census_120(&census);
        assert_eq!(history.industrial[HISTORY_HALF], 30);
        assert_eq!(history.crime[HISTORY_HALF], 9);
    }

    #[test]
    fn test_city_population() {
        let census = CityCensus {
            res_pop: 100,
            com_pop: 2,
            ind_pop: 3,
            ..Default::default()
        };
        assert_eq!(census.city_population(), (100 + 5 * 8) * 20);
    }
}
