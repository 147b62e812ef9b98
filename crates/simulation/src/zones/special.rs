//! Service buildings, power plants and transport hubs.

use super::{redraw_zone, repair_zone, zone_plop};
use crate::context::SimContext;
use crate::disasters::meltdown;
use crate::geometry::CityLocation;
use crate::sprites::{generate_copter, generate_plane, generate_ship, SpriteKind};
use crate::tiles::{
    AIRPORT, CHURCH, FIRESTATION, FOOTBALLGAME1, FOOTBALLGAME2, FREEZ, FULLSTADIUM, HOSPITAL,
    NUCLEAR, POLICESTATION, PORT, POWERPLANT, STADIUM,
};
use crate::traffic::find_perimeter_road;

/// Meltdown odds per survey, one in this many plus one, per game level.
const MELTDOWN_CHANCE: [i32; 3] = [30000, 20000, 10000];

pub(crate) fn do_special_zone(ctx: &mut SimContext, x: i32, y: i32, tile: u16, powered: bool) {
    let time = ctx.clock.city_time;
    match tile {
        POWERPLANT => {
            ctx.census.coal_count += 1;
            if time % 8 == 0 {
                repair_zone(ctx, x, y, POWERPLANT);
            }
            ctx.census.power_plants.push(CityLocation::new(x, y));
        }
        NUCLEAR => {
            ctx.census.nuclear_count += 1;
            let odds = MELTDOWN_CHANCE[ctx.settings.game_level.index()];
            if ctx.settings.disasters_enabled && ctx.rng.one_in(odds + 1) {
                meltdown(ctx, x, y);
                return;
            }
            if time % 8 == 0 {
                repair_zone(ctx, x, y, NUCLEAR);
            }
            ctx.census.power_plants.push(CityLocation::new(x, y));
        }
        FIRESTATION => {
            ctx.census.fire_station_count += 1;
            if time % 8 == 0 {
                repair_zone(ctx, x, y, FIRESTATION);
            }
            let effect = station_effect(ctx, x, y, ctx.budget.fire_effect, powered);
            let current = ctx.overlays.fire_station.world_get(x, y);
            ctx.overlays.fire_station.world_set(x, y, current + effect);
        }
        POLICESTATION => {
            ctx.census.police_station_count += 1;
            if time % 8 == 0 {
                repair_zone(ctx, x, y, POLICESTATION);
            }
            let effect = station_effect(ctx, x, y, ctx.budget.police_effect, powered);
            let current = ctx.overlays.police_station.world_get(x, y);
            ctx.overlays.police_station.world_set(x, y, current + effect);
        }
        STADIUM => {
            ctx.census.stadium_count += 1;
            if time % 16 == 0 {
                repair_zone(ctx, x, y, STADIUM);
            }
            if powered && (time as i32 + x + y) % 32 == 0 {
                redraw_zone(ctx, x, y, FULLSTADIUM);
                ctx.map.set(x + 1, y, FOOTBALLGAME1);
                ctx.map.set(x + 1, y + 1, FOOTBALLGAME2);
            }
        }
        FULLSTADIUM => {
            ctx.census.stadium_count += 1;
            if (time as i32 + x + y) % 8 == 0 {
                redraw_zone(ctx, x, y, STADIUM);
            }
        }
        AIRPORT => {
            ctx.census.airport_count += 1;
            if time % 8 == 0 {
                repair_zone(ctx, x, y, AIRPORT);
            }
            if powered {
                if ctx.rng.one_in(6) {
                    generate_plane(ctx, x, y);
                } else if ctx.rng.one_in(13) {
                    generate_copter(ctx, x, y);
                }
            }
        }
        PORT => {
            ctx.census.seaport_count += 1;
            if time % 16 == 0 {
                repair_zone(ctx, x, y, PORT);
            }
            if powered && !ctx.sprites.has(SpriteKind::Ship) {
                generate_ship(ctx);
            }
        }
        _ => {}
    }
}

/// Funding effect of a station, halved without power and again without a
/// road to drive out on.
fn station_effect(ctx: &SimContext, x: i32, y: i32, funded: i32, powered: bool) -> i32 {
    let mut effect = if powered { funded } else { funded / 2 };
    if find_perimeter_road(ctx, x, y).is_none() {
        effect /= 2;
    }
    effect
}

pub(crate) fn do_hospital_church(ctx: &mut SimContext, x: i32, y: i32, tile: u16) {
    let time = ctx.clock.city_time;
    let need = match tile {
        HOSPITAL => {
            ctx.census.hospital_count += 1;
            ctx.census.need_hospital
        }
        CHURCH => {
            ctx.census.church_count += 1;
            ctx.census.need_church
        }
        _ => return,
    };
    if time % 16 == 0 {
        repair_zone(ctx, x, y, tile);
    }
    // Too many: close this one down again.
    if need == -1 && ctx.rng.one_in(21) {
        zone_plop(ctx, x, y, FREEZ);
    }
}
