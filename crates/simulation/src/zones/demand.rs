use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::census::{CityCensus, CityHistory};
use crate::settings::GameLevel;

/// Tax-rate penalty added to each projected growth ratio, indexed by
/// `tax_effect + game_level`.
const TAX_TABLE: [i32; 21] = [
    200, 150, 120, 100, 80, 50, 30, 0, -10, -40, -100, -150, -200, -250, -300, -350, -400, -450,
    -500, -550, -600,
];

/// Outside-market strength per game level.
const EXTERNAL_MARKET: [f64; 3] = [1.2, 1.1, 0.98];

pub const MAX_RES_VALVE: i32 = 2000;
pub const MAX_COM_VALVE: i32 = 1500;
pub const MAX_IND_VALVE: i32 = 1500;

/// Demand signal per zone class; positive values drive growth.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandValves {
    pub res_valve: i32,
    pub com_valve: i32,
    pub ind_valve: i32,
    /// Growth is capped until a stadium exists.
    pub res_cap: bool,
    /// Growth is capped until an airport exists.
    pub com_cap: bool,
    /// Growth is capped until a seaport exists.
    pub ind_cap: bool,
}

impl DemandValves {
    /// Recompute the valves from the last census and the history arrays.
    pub fn set_valves(
        &mut self,
        census: &mut CityCensus,
        history: &CityHistory,
        tax_effect: i32,
        level: GameLevel,
    ) {
        let norm_res_pop = census.res_pop as f64 / 8.0;
        census.last_total_pop = census.total_pop;
        census.total_pop = (norm_res_pop as i32) + census.com_pop + census.ind_pop;

        let com_ind_prev = history.commercial[1] as f64 + history.industrial[1] as f64;
        let employment = if norm_res_pop != 0.0 {
            com_ind_prev / norm_res_pop
        } else {
            1.0
        };
        let migration = norm_res_pop * (employment - 1.0);
        let births = norm_res_pop * 0.02;
        let projected_res_pop = norm_res_pop + migration + births;

        let labor_base = if com_ind_prev != 0.0 {
            (history.residential[1] as f64 / com_ind_prev).clamp(0.0, 1.3)
        } else {
            1.0
        };

        let internal_market =
            (norm_res_pop + census.com_pop as f64 + census.ind_pop as f64) / 3.7;
        let projected_com_pop = internal_market * labor_base;
        let projected_ind_pop =
            (census.ind_pop as f64 * labor_base * EXTERNAL_MARKET[level.index()]).max(5.0);

        let res_ratio = if norm_res_pop != 0.0 {
            projected_res_pop / norm_res_pop
        } else {
            1.3
        };
        let com_ratio = if census.com_pop != 0 {
            projected_com_pop / census.com_pop as f64
        } else {
            projected_com_pop
        };
        let ind_ratio = if census.ind_pop != 0 {
            projected_ind_pop / census.ind_pop as f64
        } else {
            projected_ind_pop
        };

        let tax_index = (tax_effect + level.index() as i32).clamp(0, 20) as usize;
        let penalty = TAX_TABLE[tax_index] as f64;
        let delta = |ratio: f64| ((ratio.min(2.0) - 1.0) * 600.0 + penalty) as i32;

        self.res_valve = (self.res_valve + delta(res_ratio)).clamp(-MAX_RES_VALVE, MAX_RES_VALVE);
        self.com_valve = (self.com_valve + delta(com_ratio)).clamp(-MAX_COM_VALVE, MAX_COM_VALVE);
        self.ind_valve = (self.ind_valve + delta(ind_ratio)).clamp(-MAX_IND_VALVE, MAX_IND_VALVE);

        self.res_cap = census.res_pop > 500 && census.stadium_count == 0;
        self.com_cap = census.com_pop > 100 && census.airport_count == 0;
        self.ind_cap = census.ind_pop > 70 && census.seaport_count == 0;
        if self.res_cap && self.res_valve > 0 {
            self.res_valve = 0;
        }
        if self.com_cap && self.com_valve > 0 {
            self.com_valve = 0;
        }
        if self.ind_cap && self.ind_valve > 0 {
            self.ind_valve = 0;
        }
    }
}
