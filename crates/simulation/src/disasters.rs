use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::context::{CityParams, SimContext};
use crate::events::{MessageKind, SoundKind};
use crate::sprites::{make_explosion, make_monster, make_tornado};
use crate::tiles::{
    tile_of, CHANNEL, DIRT, FIRE, FLOOD, LASTZONE, LHTHR, NUCLEAR, RADTILE, RESBASE, WATER_HIGH,
};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisasterKind {
    Fire,
    Flood,
    Tornado,
    Earthquake,
    Monster,
    Meltdown,
}

impl DisasterKind {
    pub fn name(self) -> &'static str {
        match self {
            DisasterKind::Fire => "fire",
            DisasterKind::Flood => "flood",
            DisasterKind::Tornado => "tornado",
            DisasterKind::Earthquake => "earthquake",
            DisasterKind::Monster => "monster",
            DisasterKind::Meltdown => "meltdown",
        }
    }
}

/// Host request to start a disaster on the next tick.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisasterRequest {
    pub kind: DisasterKind,
}

// =============================================================================
// Constants
// =============================================================================

/// Odds of a random disaster per phase-15 pass, one in this many plus one.
const DISASTER_CHANCE: [i32; 3] = [480, 240, 60];

/// Phase-15 passes a fresh flood keeps spreading for.
pub const FLOOD_DURATION: i32 = 30;

/// Average pollution a monster needs to be drawn out.
const MONSTER_POLLUTION: i32 = 60;

const FLOOD_DX: [i32; 4] = [0, 1, 0, -1];
const FLOOD_DY: [i32; 4] = [-1, 0, 1, 0];

// =============================================================================
// Random disasters
// =============================================================================

/// Count the flood down and maybe strike the city with something new.
pub fn do_disasters(ctx: &mut SimContext) {
    if ctx.clock.flood_count > 0 {
        ctx.clock.flood_count -= 1;
    }
    if !ctx.settings.disasters_enabled {
        return;
    }
    let chance = DISASTER_CHANCE[ctx.settings.game_level.index()];
    if !ctx.rng.one_in(chance + 1) {
        return;
    }
    match ctx.rng.random(9) {
        0 | 1 => set_fire(ctx),
        2 | 3 => {
            make_flood(ctx);
        }
        5 => trigger(ctx, DisasterKind::Tornado),
        6 => trigger(ctx, DisasterKind::Earthquake),
        7 | 8 if ctx.overlays.pollution_average > MONSTER_POLLUTION => {
            trigger(ctx, DisasterKind::Monster)
        }
        _ => {}
    }
}

/// Start a disaster of `kind` right away.
pub fn trigger(ctx: &mut SimContext, kind: DisasterKind) {
    info!("disaster: {}", kind.name());
    match kind {
        DisasterKind::Fire => make_fire(ctx),
        DisasterKind::Flood => {
            make_flood(ctx);
        }
        DisasterKind::Tornado => make_tornado(ctx),
        DisasterKind::Earthquake => make_earthquake(ctx),
        DisasterKind::Monster => make_monster(ctx),
        DisasterKind::Meltdown => {
            if let Some((x, y)) = find_nuclear_plant(ctx) {
                meltdown(ctx, x, y);
            }
        }
    }
}

fn random_fire(ctx: &mut SimContext) -> u16 {
    FIRE + ctx.rng.random(8) as u16
}

/// One attempt at igniting a random building.
fn set_fire(ctx: &mut SimContext) {
    let x = ctx.rng.random(ctx.map.width());
    let y = ctx.rng.random(ctx.map.height());
    let cell = ctx.cell(x, y);
    if ctx.specs.is_zone_center(cell) {
        return;
    }
    let tile = tile_of(cell);
    if tile > LHTHR && tile < LASTZONE {
        let fire = random_fire(ctx);
        ctx.map.set(x, y, fire);
        info!("fire broke out at ({x}, {y})");
        ctx.outbox.message_at(MessageKind::FireReported, x, y);
    }
}

/// Forty attempts at igniting anything flammable.
fn make_fire(ctx: &mut SimContext) {
    for _ in 0..40 {
        let x = ctx.rng.random(ctx.map.width());
        let y = ctx.rng.random(ctx.map.height());
        let cell = ctx.cell(x, y);
        if ctx.specs.is_zone_center(cell) || !ctx.specs.is_combustible(cell) {
            continue;
        }
        let tile = tile_of(cell);
        if tile > 21 && tile < LASTZONE {
            let fire = random_fire(ctx);
            ctx.map.set(x, y, fire);
            ctx.outbox.message_at(MessageKind::FireReported, x, y);
            return;
        }
    }
}

/// Break a river bank somewhere. Returns where the water got out.
pub fn make_flood(ctx: &mut SimContext) -> Option<(i32, i32)> {
    for _ in 0..300 {
        let x = ctx.rng.random(ctx.map.width());
        let y = ctx.rng.random(ctx.map.height());
        let tile = ctx.tile(x, y);
        if tile <= CHANNEL || tile > WATER_HIGH {
            continue;
        }
        for d in 0..4 {
            let (fx, fy) = (x + FLOOD_DX[d], y + FLOOD_DY[d]);
            let Some(cell) = ctx.map.get(fx, fy) else {
                continue;
            };
            let soaks = tile_of(cell) == DIRT
                || (ctx.specs.is_bulldozable(cell) && ctx.specs.is_combustible(cell));
            if soaks {
                ctx.map.set(fx, fy, FLOOD);
                ctx.clock.flood_count = FLOOD_DURATION;
                info!("flood at ({fx}, {fy})");
                ctx.outbox.message_at(MessageKind::FloodReported, fx, fy);
                return Some((fx, fy));
            }
        }
    }
    None
}

/// Buildings an earthquake can knock down: anything inside a zone
/// footprint except the zone centres themselves.
fn shakes_loose(ctx: &SimContext, cell: u16) -> bool {
    let tile = tile_of(cell);
    (RESBASE..=LASTZONE).contains(&tile) && !ctx.specs.is_zone_center(cell)
}

pub fn make_earthquake(ctx: &mut SimContext) {
    let strength = ctx.rng.random(700) + 300;
    let center = ctx.overlays.city_center;
    info!("earthquake of strength {strength}");
    ctx.outbox
        .message_at(MessageKind::EarthquakeReported, center.x, center.y);
    ctx.outbox
        .sound(SoundKind::ExplosionBoth, center.x, center.y);
    for z in 0..strength {
        let x = ctx.rng.random(ctx.map.width());
        let y = ctx.rng.random(ctx.map.height());
        let cell = ctx.cell(x, y);
        if !shakes_loose(ctx, cell) {
            continue;
        }
        let tile = if z & 3 != 0 {
            crate::tiles::random_rubble(ctx.rng.random16())
        } else {
            random_fire(ctx)
        };
        ctx.map.set(x, y, tile);
    }
}

// =============================================================================
// Meltdown
// =============================================================================

fn find_nuclear_plant(ctx: &SimContext) -> Option<(i32, i32)> {
    ctx.map
        .iter()
        .find(|&(_, _, cell)| tile_of(cell) == NUCLEAR)
        .map(|(x, y, _)| (x, y))
}

/// Blow up the nuclear plant centred at (x, y) and scatter fallout.
pub fn meltdown(ctx: &mut SimContext, x: i32, y: i32) {
    info!("nuclear meltdown at ({x}, {y})");
    for (dx, dy) in [(-1, -1), (-1, 2), (2, -1), (2, 2)] {
        make_explosion(ctx, x + dx, y + dy);
    }
    for fx in x - 1..x + 3 {
        for fy in y - 1..y + 3 {
            let fire = FIRE + ctx.rng.random(4) as u16;
            ctx.map.set(fx, fy, fire);
        }
    }
    for _ in 0..200 {
        let rx = x - 20 + ctx.rng.random(40);
        let ry = y - 15 + ctx.rng.random(30);
        let Some(cell) = ctx.map.get(rx, ry) else {
            continue;
        };
        if ctx.specs.is_zone_center(cell) {
            continue;
        }
        if ctx.specs.is_combustible(cell) || tile_of(cell) == DIRT {
            ctx.map.set(rx, ry, RADTILE);
        }
    }
    ctx.outbox.message_at(MessageKind::MeltdownReported, x, y);
}

// =============================================================================
// Systems
// =============================================================================

pub fn handle_disaster_requests(mut requests: EventReader<DisasterRequest>, mut city: CityParams) {
    for request in requests.read() {
        trigger(&mut city.ctx(), request.kind);
    }
}

pub struct DisastersPlugin;

impl Plugin for DisastersPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DisasterRequest>().add_systems(
            FixedUpdate,
            handle_disaster_requests
                .after(crate::tools::handle_tool_requests)
                .in_set(crate::SimulationSet::PreSim),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::sprites::SpriteKind;
    use crate::tiles::{is_fire, is_rubble, FIRSTRIVEDGE};
    use crate::zones::zone_plop;

    #[test]
    fn test_meltdown_burns_and_irradiates() {
        let mut state = CityState::new(4);
        assert!(zone_plop(&mut state.ctx(), 60, 50, NUCLEAR));
        meltdown(&mut state.ctx(), 60, 50);
        for x in 59..63 {
            for y in 49..53 {
                let tile = state.tile_at(x, y);
                assert!((FIRE..FIRE + 4).contains(&tile), "({x}, {y}) = {tile}");
            }
        }
        let fallout = state.map.iter().filter(|&(_, _, c)| c == RADTILE).count();
        assert!(fallout > 50);
        assert!(state.sprites.has(SpriteKind::Explosion));
        assert!(state
            .outbox
            .messages
            .iter()
            .any(|m| m.kind == MessageKind::MeltdownReported));
    }

    #[test]
    fn test_meltdown_request_needs_a_plant() {
        let mut state = CityState::new(4);
        trigger(&mut state.ctx(), DisasterKind::Meltdown);
        assert!(state.map.iter().all(|(_, _, c)| c == DIRT));
    }

    #[test]
    fn test_flood_starts_at_a_river_bank() {
        let mut state = CityState::new(4);
        for x in (0..120).step_by(2) {
            for y in 0..100 {
                state.map.set(x, y, FIRSTRIVEDGE);
            }
        }
        let (fx, fy) = make_flood(&mut state.ctx()).expect("a bank should flood");
        assert_eq!(state.tile_at(fx, fy), FLOOD);
        assert_eq!(fx % 2, 1);
        assert_eq!(state.clock.flood_count, FLOOD_DURATION);
    }

    #[test]
    fn test_flood_counts_down() {
        let mut state = CityState::new(4);
        state.settings.disasters_enabled = false;
        state.clock.flood_count = 2;
        do_disasters(&mut state.ctx());
        do_disasters(&mut state.ctx());
        do_disasters(&mut state.ctx());
        assert_eq!(state.clock.flood_count, 0);
    }

    #[test]
    fn test_earthquake_spares_zone_centres() {
        let mut state = CityState::new(9);
        for x in 0..40 {
            for y in 0..30 {
                let center = (x % 3 == 1) && (y % 3 == 1);
                if center {
                    assert!(zone_plop(&mut state.ctx(), x, y, crate::tiles::IZB));
                }
            }
        }
        make_earthquake(&mut state.ctx());
        for x in 0..40 {
            for y in 0..30 {
                if (x % 3 == 1) && (y % 3 == 1) {
                    assert_eq!(state.tile_at(x, y), crate::tiles::IZB);
                }
            }
        }
        let damaged = state
            .map
            .iter()
            .filter(|&(_, _, c)| is_fire(tile_of(c)) || is_rubble(tile_of(c)))
            .count();
        assert!(damaged > 0);
    }

    #[test]
    fn test_fire_request_needs_fuel() {
        let mut state = CityState::new(2);
        trigger(&mut state.ctx(), DisasterKind::Fire);
        assert!(state.map.iter().all(|(_, _, c)| c == DIRT));

        for x in 0..120 {
            for y in 0..100 {
                state.map.set(x, y, crate::tiles::WOODS);
            }
        }
        trigger(&mut state.ctx(), DisasterKind::Fire);
        assert!(state.map.iter().any(|(_, _, c)| is_fire(tile_of(c))));
    }
}
