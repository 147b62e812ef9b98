//! City evaluation: population class, problem survey, approval and score,
//! plus the periodic advisor messages.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::census::CityCensus;
use crate::config::{MAX_FIRE_STATION_EFFECT, MAX_POLICE_STATION_EFFECT, MAX_ROAD_EFFECT};
use crate::context::SimContext;
use crate::events::MessageKind;
use crate::overlays::CityOverlays;
use crate::sim_rng::SimRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum CityClass {
    #[default]
    Village,
    Town,
    City,
    Capital,
    Metropolis,
    Megalopolis,
}

impl CityClass {
    pub fn from_population(pop: i64) -> Self {
        match pop {
            p if p > 500_000 => CityClass::Megalopolis,
            p if p > 100_000 => CityClass::Metropolis,
            p if p > 50_000 => CityClass::Capital,
            p if p > 10_000 => CityClass::City,
            p if p > 2_000 => CityClass::Town,
            _ => CityClass::Village,
        }
    }

    pub fn index(self) -> u16 {
        self as u16
    }

    pub fn from_index(i: u16) -> Self {
        match i {
            1 => CityClass::Town,
            2 => CityClass::City,
            3 => CityClass::Capital,
            4 => CityClass::Metropolis,
            5 => CityClass::Megalopolis,
            _ => CityClass::Village,
        }
    }

    fn reached_message(self) -> Option<MessageKind> {
        match self {
            CityClass::Village => None,
            CityClass::Town => Some(MessageKind::ReachedTown),
            CityClass::City => Some(MessageKind::ReachedCity),
            CityClass::Capital => Some(MessageKind::ReachedCapital),
            CityClass::Metropolis => Some(MessageKind::ReachedMetropolis),
            CityClass::Megalopolis => Some(MessageKind::ReachedMegalopolis),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CityProblem {
    Crime,
    Pollution,
    Housing,
    Taxes,
    Traffic,
    Unemployment,
    Fire,
}

impl CityProblem {
    pub const ALL: [CityProblem; 7] = [
        CityProblem::Crime,
        CityProblem::Pollution,
        CityProblem::Housing,
        CityProblem::Taxes,
        CityProblem::Traffic,
        CityProblem::Unemployment,
        CityProblem::Fire,
    ];
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEvaluation {
    /// Overall score, 0..=1000.
    pub score: i32,
    pub delta_score: i32,
    pub city_pop: i64,
    pub delta_city_pop: i64,
    pub city_class: CityClass,
    /// Percentage of surveyed citizens approving of the mayor.
    pub approval: i32,
    pub assessed_value: i64,
    pub traffic_average: i32,
    /// Severity per problem, indexed like [`CityProblem::ALL`].
    pub problem_table: [i32; 7],
    pub problem_votes: [i32; 7],
    /// Up to four most-voted problems, worst first.
    pub top_problems: Vec<CityProblem>,
}

impl Default for CityEvaluation {
    fn default() -> Self {
        Self {
            score: 500,
            delta_score: 0,
            city_pop: 0,
            delta_city_pop: 0,
            city_class: CityClass::Village,
            approval: 0,
            assessed_value: 0,
            traffic_average: 0,
            problem_table: [0; 7],
            problem_votes: [0; 7],
            top_problems: Vec::new(),
        }
    }
}

/// Inputs to the score that live outside the census.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    pub res_cap: bool,
    pub com_cap: bool,
    pub ind_cap: bool,
    pub res_valve: i32,
    pub com_valve: i32,
    pub ind_valve: i32,
    pub road_effect: i32,
    pub police_effect: i32,
    pub fire_effect: i32,
    pub tax_rate: i32,
}

pub fn assessed_value(census: &CityCensus) -> i64 {
    let v = census.road_total as i64 * 5
        + census.rail_total as i64 * 10
        + census.police_station_count as i64 * 1000
        + census.fire_station_count as i64 * 1000
        + census.hospital_count as i64 * 400
        + census.stadium_count as i64 * 3000
        + census.seaport_count as i64 * 5000
        + census.airport_count as i64 * 10000
        + census.coal_count as i64 * 3000
        + census.nuclear_count as i64 * 6000;
    v * 1000
}

/// Mean traffic density over developed land, scaled up by 2.4.
pub fn traffic_average(overlays: &CityOverlays) -> i32 {
    let mut total = 0i64;
    let mut count = 0i64;
    for y in 0..overlays.land_value.height() {
        for x in 0..overlays.land_value.width() {
            if overlays.land_value.get(x, y) != 0 {
                total += overlays.traffic_density.get(x, y) as i64;
                count += 1;
            }
        }
    }
    if count == 0 {
        0
    } else {
        ((total / count) as f64 * 2.4) as i32
    }
}

fn unemployment(census: &CityCensus) -> i32 {
    let jobs = (census.com_pop + census.ind_pop) * 8;
    if jobs == 0 {
        return 0;
    }
    let ratio = census.res_pop as f64 / jobs as f64;
    (((ratio - 1.0) * 255.0) as i32).clamp(0, 255)
}

fn fire_severity(census: &CityCensus) -> i32 {
    (census.fire_pop * 5).min(255)
}

impl CityEvaluation {
    /// Full evaluation run once per tax period.
    pub fn evaluate(
        &mut self,
        census: &CityCensus,
        overlays: &CityOverlays,
        inputs: ScoreInputs,
        rng: &mut SimRng,
    ) -> Option<MessageKind> {
        if census.total_pop == 0 {
            *self = CityEvaluation {
                city_class: self.city_class,
                ..Default::default()
            };
            return None;
        }
        self.assessed_value = assessed_value(census);
        let reached = self.update_population(census);
        self.traffic_average = traffic_average(overlays);
        self.problem_table = [
            overlays.crime_average,
            overlays.pollution_average,
            overlays.land_value_average * 7 / 10,
            inputs.tax_rate * 10,
            self.traffic_average,
            unemployment(census),
            fire_severity(census),
        ];
        self.vote_problems(rng);
        self.update_score(census, inputs);
        self.approval = (0..100).filter(|_| rng.random(1000) < self.score).count() as i32;
        reached
    }

    fn update_population(&mut self, census: &CityCensus) -> Option<MessageKind> {
        let old_pop = self.city_pop;
        self.city_pop = census.city_population();
        self.delta_city_pop = self.city_pop - old_pop;
        let class = CityClass::from_population(self.city_pop);
        let previous = std::mem::replace(&mut self.city_class, class);
        if class > previous {
            class.reached_message()
        } else {
            None
        }
    }

    fn vote_problems(&mut self, rng: &mut SimRng) {
        self.problem_votes = [0; 7];
        let mut problem = 0usize;
        let mut votes = 0;
        for _ in 0..600 {
            if votes >= 100 {
                break;
            }
            if rng.random(300) < self.problem_table[problem] {
                self.problem_votes[problem] += 1;
                votes += 1;
            }
            problem = (problem + 1) % CityProblem::ALL.len();
        }

        let mut ranked: Vec<usize> = (0..CityProblem::ALL.len())
            .filter(|&i| self.problem_votes[i] > 0)
            .collect();
        ranked.sort_by(|&a, &b| self.problem_votes[b].cmp(&self.problem_votes[a]));
        self.top_problems = ranked
            .into_iter()
            .take(4)
            .map(|i| CityProblem::ALL[i])
            .collect();
    }

    fn update_score(&mut self, census: &CityCensus, inputs: ScoreInputs) {
        let old_score = self.score;
        let problems: i32 = self.problem_table.iter().sum::<i32>() / 3;
        let mut z = ((256 - problems.min(256)) * 4).clamp(0, 1000) as f64;

        for capped in [inputs.res_cap, inputs.com_cap, inputs.ind_cap] {
            if capped {
                z *= 0.85;
            }
        }
        if inputs.road_effect < MAX_ROAD_EFFECT {
            z -= (MAX_ROAD_EFFECT - inputs.road_effect) as f64;
        }
        if inputs.police_effect < MAX_POLICE_STATION_EFFECT {
            z *= 0.9 + inputs.police_effect as f64 / 10000.1;
        }
        if inputs.fire_effect < MAX_FIRE_STATION_EFFECT {
            z *= 0.9 + inputs.fire_effect as f64 / 10000.1;
        }
        for valve in [inputs.res_valve, inputs.com_valve, inputs.ind_valve] {
            if valve < -1000 {
                z *= 0.85;
            }
        }

        let pop = self.city_pop as f64;
        let delta = self.delta_city_pop as f64;
        let growth = if self.city_pop == 0 || self.delta_city_pop == 0 || delta == pop {
            1.0
        } else if delta > 0.0 {
            delta / pop + 1.0
        } else {
            0.95 + delta / (pop - delta)
        };
        z *= growth;
        z -= fire_severity(census) as f64;
        z -= inputs.tax_rate as f64;

        let zones = census.powered_zone_count + census.unpowered_zone_count;
        if zones != 0 {
            z *= census.powered_zone_count as f64 / zones as f64;
        }

        let z = z.clamp(0.0, 1000.0) as i32;
        self.score = (old_score + z) / 2;
        self.delta_score = self.score - old_score;
    }
}

/// Advisor messages, one check per city-time slot in a 64-step rotation.
pub fn send_messages(ctx: &mut SimContext) {
    let c = &*ctx.census;
    let zones = c.res_zone_count + c.com_zone_count + c.ind_zone_count;
    let power_plants = c.coal_count + c.nuclear_count;

    let message = match ctx.clock.city_time % 64 {
        1 if zones / 4 >= c.res_zone_count => Some(MessageKind::NeedResidential),
        5 if zones / 8 >= c.com_zone_count => Some(MessageKind::NeedCommercial),
        10 if zones / 8 >= c.ind_zone_count => Some(MessageKind::NeedIndustrial),
        14 if zones > 10 && zones * 2 > c.road_total => Some(MessageKind::NeedRoads),
        18 if zones > 50 && zones > c.rail_total => Some(MessageKind::NeedRail),
        22 if zones > 10 && power_plants == 0 => Some(MessageKind::NeedElectricity),
        26 if c.res_pop > 500 && c.stadium_count == 0 => Some(MessageKind::NeedStadium),
        28 if c.ind_pop > 70 && c.seaport_count == 0 => Some(MessageKind::NeedSeaport),
        30 if c.com_pop > 100 && c.airport_count == 0 => Some(MessageKind::NeedAirport),
        32 => {
            let total = c.powered_zone_count + c.unpowered_zone_count;
            (total != 0 && (c.powered_zone_count as f64 / total as f64) < 0.7)
                .then_some(MessageKind::BlackoutsReported)
        }
        35 if ctx.overlays.pollution_average > 60 => Some(MessageKind::HighPollution),
        42 if ctx.overlays.crime_average > 100 => Some(MessageKind::HighCrime),
        45 if c.total_pop > 60 && c.fire_station_count == 0 => Some(MessageKind::NeedFireStation),
        48 if c.total_pop > 60 && c.police_station_count == 0 => Some(MessageKind::NeedPolice),
        51 if ctx.budget.tax_rate > 12 => Some(MessageKind::TaxTooHigh),
        54 if ctx.budget.road_effect < 20 && c.road_total > 30 => {
            Some(MessageKind::RoadNeedsFunding)
        }
        57 if ctx.budget.fire_effect < 700 && c.total_pop > 20 => {
            Some(MessageKind::FireNeedsFunding)
        }
        60 if ctx.budget.police_effect < 700 && c.total_pop > 20 => {
            Some(MessageKind::PoliceNeedsFunding)
        }
        63 if ctx.evaluation.traffic_average > 60 => Some(MessageKind::HighTraffic),
        _ => None,
    };
    if let Some(kind) = message {
        ctx.outbox.message(kind, None);
    }
}
