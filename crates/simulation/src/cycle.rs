//! The simulation step: one slice of the 16-phase cycle, then sprites and
//! tile animation.

use bevy::prelude::*;

use crate::config::{CENSUS_FREQUENCY_10, CENSUS_FREQUENCY_120, TAX_FREQUENCY, WORLD_W};
use crate::context::{CityParams, SimContext};
use crate::crime::crime_scan;
use crate::disasters::do_disasters;
use crate::evaluation::{send_messages, ScoreInputs};
use crate::fire::fire_analysis;
use crate::overlays::OverlayKind;
use crate::pollution::pollution_terrain_land_value_scan;
use crate::population_density::population_density_scan;
use crate::power::power_scan;
use crate::speed::sim_not_paused;
use crate::sprites::move_sprites;
use crate::tile_behavior::map_scan;
use crate::tiles::PWRBIT;
use crate::traffic::decay_traffic;

/// Sim cycles between scans, indexed by scan rate.
const POWER_SCAN_FREQUENCY: [u32; 3] = [1, 2, 4];
const POLLUTION_SCAN_FREQUENCY: [u32; 3] = [1, 2, 7];
const CRIME_SCAN_FREQUENCY: [u32; 3] = [1, 1, 8];
const POP_DENSITY_SCAN_FREQUENCY: [u32; 3] = [1, 1, 9];
const FIRE_ANALYSIS_FREQUENCY: [u32; 3] = [1, 1, 10];

const MAP_SLICES: i32 = 8;

fn due(ctx: &SimContext, table: &[u32; 3]) -> bool {
    let rate = ctx.scan_rate.min(table.len() - 1);
    ctx.clock.sim_cycle % table[rate] == 0
}

/// Advance the city by one step.
pub fn step(ctx: &mut SimContext) {
    if ctx.clock.advance_animation() {
        let phase = ctx.clock.next_phase();
        run_phase(ctx, phase);
    }
    move_sprites(ctx);
    animate_tiles(ctx);
}

/// Run phase `phase` (0..16) of the simulation cycle.
pub fn run_phase(ctx: &mut SimContext, phase: u32) {
    match phase {
        0 => {
            let level = ctx.settings.game_level;
            ctx.budget
                .accrue(ctx.census, ctx.overlays, level, ctx.settings.auto_budget);
            ctx.clock.sim_cycle = (ctx.clock.sim_cycle + 1) % 1024;
            ctx.clock.city_time += 1;
            if ctx.clock.sim_cycle % 2 == 0 {
                ctx.valves
                    .set_valves(ctx.census, ctx.history, ctx.budget.tax_effect, level);
            }
            ctx.census.clear();
            ctx.overlays.fire_station.clear();
            ctx.overlays.police_station.clear();
        }
        1..=8 => {
            let slice = phase as i32 - 1;
            let w = WORLD_W as i32;
            map_scan(ctx, slice * w / MAP_SLICES, (slice + 1) * w / MAP_SLICES);
            if phase == 8 {
                ctx.clock.new_power = false;
            }
        }
        9 => take_census(ctx),
        10 => {
            if ctx.clock.sim_cycle % 5 == 0 {
                ctx.overlays.decay_rate_of_growth();
            }
            decay_traffic(ctx);
            ctx.outbox.overlay_changed(OverlayKind::TrafficDensity);
            ctx.outbox.overlay_changed(OverlayKind::RateOfGrowth);
            send_messages(ctx);
        }
        11 => {
            if due(ctx, &POWER_SCAN_FREQUENCY) {
                power_scan(ctx);
            }
        }
        12 => {
            if due(ctx, &POLLUTION_SCAN_FREQUENCY) {
                pollution_terrain_land_value_scan(ctx);
            }
        }
        13 => {
            if due(ctx, &CRIME_SCAN_FREQUENCY) {
                crime_scan(ctx);
            }
        }
        14 => {
            if due(ctx, &POP_DENSITY_SCAN_FREQUENCY) {
                population_density_scan(ctx);
            }
        }
        15 => {
            if due(ctx, &FIRE_ANALYSIS_FREQUENCY) {
                fire_analysis(ctx);
            }
            do_disasters(ctx);
        }
        _ => {}
    }
}

fn take_census(ctx: &mut SimContext) {
    let time = ctx.clock.city_time;
    if time % CENSUS_FREQUENCY_10 == 0 {
        let cash_flow = ctx.budget.cash_flow;
        ctx.history.take_census_10(ctx.census, ctx.overlays, cash_flow);
    }
    if time % CENSUS_FREQUENCY_120 == 0 {
        ctx.history.take_census_120(ctx.census);
    }
    if time % TAX_FREQUENCY == 0 {
        ctx.budget.collect_tax();
        let inputs = ScoreInputs {
            res_cap: ctx.valves.res_cap,
            com_cap: ctx.valves.com_cap,
            ind_cap: ctx.valves.ind_cap,
            res_valve: ctx.valves.res_valve,
            com_valve: ctx.valves.com_valve,
            ind_valve: ctx.valves.ind_valve,
            road_effect: ctx.budget.road_effect,
            police_effect: ctx.budget.police_effect,
            fire_effect: ctx.budget.fire_effect,
            tax_rate: ctx.budget.tax_rate,
        };
        let reached = ctx
            .evaluation
            .evaluate(ctx.census, ctx.overlays, inputs, ctx.rng);
        if let Some(kind) = reached {
            ctx.outbox.message(kind, None);
        }
    }
}

/// Step every animated tile to its successor, keeping the power bit.
pub fn animate_tiles(ctx: &mut SimContext) {
    let specs = ctx.specs;
    for y in 0..ctx.map.height() {
        for x in 0..ctx.map.width() {
            let cell = ctx.cell(x, y);
            let spec = specs.get(cell);
            if !spec.animated {
                continue;
            }
            if let Some(next) = spec.next {
                ctx.map.set(x, y, next | (cell & PWRBIT));
            }
        }
    }
}

/// Runs the preset's number of steps per fixed update.
pub fn run_simulation_steps(mut city: CityParams) {
    let steps = city.speed.steps_per_update();
    for _ in 0..steps {
        step(&mut city.ctx());
    }
}

pub struct CyclePlugin;

impl Plugin for CyclePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            run_simulation_steps
                .run_if(sim_not_paused)
                .in_set(crate::SimulationSet::Simulation),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::tiles::{tile_of, FIRE, TINYEXP, WOODS};

    #[test]
    fn test_full_cycle_advances_city_time() {
        let mut state = CityState::new(5);
        for _ in 0..32 {
            step(&mut state.ctx());
        }
        assert_eq!(state.clock.city_time, 1);
        assert_eq!(state.clock.sim_cycle, 1);
        assert_eq!(state.clock.phase_cycle, 0);
        assert_eq!(state.clock.acycle, 32);
    }

    #[test]
    fn test_animation_keeps_power_bit() {
        let mut state = CityState::new(5);
        state.map.set(4, 4, TINYEXP | PWRBIT);
        state.map.set(5, 5, WOODS);
        animate_tiles(&mut state.ctx());
        assert_eq!(state.map.get(4, 4), Some((TINYEXP + 1) | PWRBIT));
        assert_eq!(state.tile_at(5, 5), WOODS);
    }

    #[test]
    fn test_fire_burns_out_eventually() {
        let mut state = CityState::new(11);
        state.settings.disasters_enabled = false;
        state.map.set(30, 30, FIRE);
        for _ in 0..4000 {
            step(&mut state.ctx());
        }
        let tile = tile_of(state.map.get(30, 30).unwrap_or(0));
        assert!(!(FIRE..FIRE + 8).contains(&tile), "still burning: {tile}");
    }

    #[test]
    fn test_scan_frequency_tables() {
        let mut state = CityState::new(1);
        state.scan_rate = 2;
        state.clock.sim_cycle = 4;
        let ctx = state.ctx();
        assert!(due(&ctx, &POWER_SCAN_FREQUENCY));
        assert!(!due(&ctx, &POLLUTION_SCAN_FREQUENCY));
        assert!(!due(&ctx, &CRIME_SCAN_FREQUENCY));
    }
}
