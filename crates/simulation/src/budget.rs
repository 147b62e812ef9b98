//! Municipal finance: tax collection, maintenance requests and escrow.
//!
//! Every phase-0 step accrues one step's worth of income and funded
//! maintenance into the tax fund and escrow accounts. At each tax period the
//! accumulated amounts, divided by [`TAX_FREQUENCY`], settle into the funds.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::census::CityCensus;
use crate::config::{
    MAX_FIRE_STATION_EFFECT, MAX_POLICE_STATION_EFFECT, MAX_ROAD_EFFECT, STARTING_FUNDS,
    TAX_FREQUENCY,
};
use crate::overlays::CityOverlays;
use crate::settings::GameLevel;

/// Road maintenance multiplier per game level.
const ROAD_LEVELS: [f64; 3] = [0.7, 0.9, 1.2];
/// Tax income multiplier per game level.
const TAX_LEVELS: [f64; 3] = [1.4, 1.2, 0.8];

pub const FIRE_STATION_MAINTENANCE: i64 = 100;
pub const POLICE_STATION_MAINTENANCE: i64 = 100;
pub const MAX_TAX_RATE: i32 = 20;
pub const DEFAULT_TAX_RATE: i32 = 7;

/// One step's budget figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetNumbers {
    pub tax_rate: i32,
    pub tax_income: i64,
    pub previous_balance: i64,
    pub road_request: i64,
    pub fire_request: i64,
    pub police_request: i64,
    pub road_funded: i64,
    pub fire_funded: i64,
    pub police_funded: i64,
    pub road_percent: f64,
    pub fire_percent: f64,
    pub police_percent: f64,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityBudget {
    pub funds: i64,
    /// Tax rate in percent, 0..=20.
    pub tax_rate: i32,
    /// Funding fractions in 0.0..=1.0.
    pub road_percent: f64,
    pub fire_percent: f64,
    pub police_percent: f64,

    pub tax_fund: i64,
    pub road_fund_escrow: i64,
    pub fire_fund_escrow: i64,
    pub police_fund_escrow: i64,

    pub road_effect: i32,
    pub fire_effect: i32,
    pub police_effect: i32,
    pub tax_effect: i32,
    /// Sum of the tax rate over the steps since the last collection.
    pub tax_average: i32,
    pub cash_flow: i64,

    // Infrastructure counts the requests are based on.
    pub last_road_total: i32,
    pub last_rail_total: i32,
    pub last_total_pop: i32,
    pub last_fire_station_count: i32,
    pub last_police_count: i32,
}

impl Default for CityBudget {
    fn default() -> Self {
        Self::for_level(GameLevel::Easy)
    }
}

impl CityBudget {
    pub fn for_level(level: GameLevel) -> Self {
        Self {
            funds: STARTING_FUNDS[level.index()],
            tax_rate: DEFAULT_TAX_RATE,
            road_percent: 1.0,
            fire_percent: 1.0,
            police_percent: 1.0,
            tax_fund: 0,
            road_fund_escrow: 0,
            fire_fund_escrow: 0,
            police_fund_escrow: 0,
            road_effect: MAX_ROAD_EFFECT,
            fire_effect: MAX_FIRE_STATION_EFFECT,
            police_effect: MAX_POLICE_STATION_EFFECT,
            tax_effect: DEFAULT_TAX_RATE,
            tax_average: 0,
            cash_flow: 0,
            last_road_total: 0,
            last_rail_total: 0,
            last_total_pop: 0,
            last_fire_station_count: 0,
            last_police_count: 0,
        }
    }

    pub fn set_tax_rate(&mut self, rate: i32) {
        self.tax_rate = rate.clamp(0, MAX_TAX_RATE);
    }

    pub fn can_afford(&self, cost: i64) -> bool {
        self.funds >= cost
    }

    pub fn spend(&mut self, amount: i64) {
        self.funds -= amount;
    }

    /// Requests and funded amounts for one step at the current settings.
    ///
    /// Funding is granted in order roads, fire, police; whatever the funds
    /// plus this step's income cannot cover is cut, and the percentage of the
    /// affected service drops to match.
    pub fn generate(&self, land_value_average: i32, level: GameLevel) -> BudgetNumbers {
        let lvl = level.index();
        let mut b = BudgetNumbers {
            tax_rate: self.tax_rate.max(0),
            road_percent: self.road_percent.max(0.0),
            fire_percent: self.fire_percent.max(0.0),
            police_percent: self.police_percent.max(0.0),
            previous_balance: self.funds,
            ..Default::default()
        };

        b.tax_income = (self.last_total_pop as f64 * land_value_average as f64 / 120.0
            * b.tax_rate as f64
            * TAX_LEVELS[lvl])
            .round() as i64;
        b.road_request = ((self.last_road_total as f64 + self.last_rail_total as f64 * 2.0)
            * ROAD_LEVELS[lvl])
            .round() as i64;
        b.fire_request = FIRE_STATION_MAINTENANCE * self.last_fire_station_count as i64;
        b.police_request = POLICE_STATION_MAINTENANCE * self.last_police_count as i64;

        b.road_funded = (b.road_request as f64 * b.road_percent).round() as i64;
        b.fire_funded = (b.fire_request as f64 * b.fire_percent).round() as i64;
        b.police_funded = (b.police_request as f64 * b.police_percent).round() as i64;

        let mut available = self.funds + b.tax_income;
        let grant = |available: &mut i64, funded: &mut i64, request: i64, percent: &mut f64| {
            if *available >= *funded {
                *available -= *funded;
            } else {
                *funded = (*available).max(0);
                *available = 0;
                *percent = if request != 0 {
                    *funded as f64 / request as f64
                } else {
                    1.0
                };
            }
        };
        grant(&mut available, &mut b.road_funded, b.road_request, &mut b.road_percent);
        grant(&mut available, &mut b.fire_funded, b.fire_request, &mut b.fire_percent);
        grant(
            &mut available,
            &mut b.police_funded,
            b.police_request,
            &mut b.police_percent,
        );
        b
    }

    /// Accrue one step of income and maintenance, using the census of the
    /// last complete map scan.
    pub fn accrue(
        &mut self,
        census: &CityCensus,
        overlays: &CityOverlays,
        level: GameLevel,
        auto_budget: bool,
    ) -> BudgetNumbers {
        self.last_road_total = census.road_total;
        self.last_rail_total = census.rail_total;
        self.last_total_pop = census.total_pop;
        self.last_fire_station_count = census.fire_station_count;
        self.last_police_count = census.police_station_count;
        self.tax_average += self.tax_rate;

        let b = self.generate(overlays.land_value_average, level);
        self.tax_fund += b.tax_income;
        self.road_fund_escrow -= b.road_funded;
        self.fire_fund_escrow -= b.fire_funded;
        self.police_fund_escrow -= b.police_funded;
        self.tax_effect = b.tax_rate;
        self.road_effect = effect(b.road_funded, b.road_request, MAX_ROAD_EFFECT);
        self.fire_effect = effect(b.fire_funded, b.fire_request, MAX_FIRE_STATION_EFFECT);
        self.police_effect = effect(b.police_funded, b.police_request, MAX_POLICE_STATION_EFFECT);

        if auto_budget {
            self.road_percent = b.road_percent;
            self.fire_percent = b.fire_percent;
            self.police_percent = b.police_percent;
        }
        b
    }

    /// Settle the tax period: collect income, pay escrowed maintenance and
    /// apply the cash flow to the funds.
    pub fn collect_tax(&mut self) -> i64 {
        let period = TAX_FREQUENCY as i64;
        let revenue = self.tax_fund / period;
        let expenses =
            -(self.road_fund_escrow + self.fire_fund_escrow + self.police_fund_escrow) / period;
        self.tax_fund -= revenue * period;
        self.road_fund_escrow = 0;
        self.fire_fund_escrow = 0;
        self.police_fund_escrow = 0;
        self.cash_flow = revenue - expenses;
        self.funds += self.cash_flow;
        self.tax_average = 0;
        self.cash_flow
    }
}

fn effect(funded: i64, request: i64, max: i32) -> i32 {
    if request == 0 {
        max
    } else {
        (max as f64 * funded as f64 / request as f64).floor() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn census_with(roads: i32, fire: i32, police: i32, pop: i32) -> CityCensus {
        CityCensus {
            road_total: roads,
            fire_station_count: fire,
            police_station_count: police,
            total_pop: pop,
            ..Default::default()
        }
    }

    #[test]
    fn test_starting_funds_per_level() {
        assert_eq!(CityBudget::for_level(GameLevel::Easy).funds, 20_000);
        assert_eq!(CityBudget::for_level(GameLevel::Hard).funds, 5_000);
    }

    #[test]
    fn test_requests_scale_with_level() {
        let mut budget = CityBudget::default();
        budget.last_road_total = 100;
        budget.last_rail_total = 10;
        budget.last_fire_station_count = 2;
        let easy = budget.generate(0, GameLevel::Easy);
        let hard = budget.generate(0, GameLevel::Hard);
        assert_eq!(easy.road_request, 84);
        assert_eq!(hard.road_request, 144);
        assert_eq!(easy.fire_request, 200);
    }

    #[test]
    fn test_fully_funded_escrow_settles_to_expenses() {
        let mut budget = CityBudget::default();
        let census = census_with(100, 1, 1, 0);
        let overlays = CityOverlays::default();
        for _ in 0..TAX_FREQUENCY {
            budget.accrue(&census, &overlays, GameLevel::Easy, true);
        }
        let start = budget.funds;
        let flow = budget.collect_tax();
        // 70 road + 100 fire + 100 police per step, averaged over the period.
        assert_eq!(flow, -270);
        assert_eq!(budget.funds, start - 270);
        assert_eq!(budget.road_effect, MAX_ROAD_EFFECT);
        assert_eq!(budget.road_fund_escrow, 0);
    }

    #[test]
    fn test_broke_city_cuts_police_first() {
        let mut budget = CityBudget {
            funds: 150,
            ..Default::default()
        };
        let census = census_with(0, 1, 1, 0);
        let overlays = CityOverlays::default();
        let b = budget.accrue(&census, &overlays, GameLevel::Easy, true);
        assert_eq!(b.fire_funded, 100);
        assert_eq!(b.police_funded, 50);
        assert_eq!(budget.police_effect, 500);
        assert_eq!(budget.fire_effect, 1000);
        assert!((budget.police_percent - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_tax_income_accumulates() {
        let mut budget = CityBudget::default();
        let census = census_with(0, 0, 0, 120);
        let mut overlays = CityOverlays::default();
        overlays.land_value_average = 100;
        let b = budget.accrue(&census, &overlays, GameLevel::Medium, true);
        // 120 * 100 / 120 * 7 * 1.2
        assert_eq!(b.tax_income, 840);
        assert_eq!(budget.tax_fund, 840);
        assert_eq!(budget.tax_average, DEFAULT_TAX_RATE);
    }

    #[test]
    fn test_tax_rate_clamped() {
        let mut budget = CityBudget::default();
        budget.set_tax_rate(50);
        assert_eq!(budget.tax_rate, 20);
        budget.set_tax_rate(-3);
        assert_eq!(budget.tax_rate, 0);
    }
}
