//! Trains on rail and buses on road: both snap to the tile grid and pick a
//! connecting track tile every fourth step.

use super::{tile_under, CitySprite, SpriteKind, SpriteState};
use crate::context::SimContext;
use crate::tiles::{
    is_rail, is_road, HRAIL, HRAILROAD, RAILHPOWERV, RAILVPOWERH, VRAIL, VRAILROAD,
};

const CX: [i32; 4] = [0, 16, 0, -16];
const CY: [i32; 4] = [-16, 0, 16, 0];
const DX: [i32; 5] = [0, 4, 0, -4, 0];
const DY: [i32; 5] = [-4, 0, 4, 0, 0];
const STRAIGHT_FRAME: [i32; 5] = [1, 2, 1, 2, 5];

const FRAME_NW_SE: i32 = 3;
const FRAME_SW_NE: i32 = 4;
const FRAME_UNDERWATER: i32 = 5;
const DIR_NONE: i32 = 4;

fn new_vehicle(tx: i32, ty: i32, state: SpriteState) -> CitySprite {
    let mut s = CitySprite::at_tile(tx, ty, 32, state);
    s.dir = DIR_NONE;
    s
}

pub fn generate_train(ctx: &mut SimContext, x: i32, y: i32) {
    if ctx.census.total_pop > 20 && !ctx.sprites.has(SpriteKind::Train) && ctx.rng.one_in(26) {
        ctx.sprites.spawn(new_vehicle(x, y, SpriteState::Train));
    }
}

pub fn generate_bus(ctx: &mut SimContext, x: i32, y: i32) {
    if ctx.census.total_pop > 20 && !ctx.sprites.has(SpriteKind::Bus) && ctx.rng.one_in(64) {
        ctx.sprites.spawn(new_vehicle(x, y, SpriteState::Bus));
    }
}

fn is_track(kind: SpriteKind, tile: u16) -> bool {
    match kind {
        SpriteKind::Bus => is_road(tile) || tile == HRAILROAD || tile == VRAILROAD,
        _ => is_rail(tile) || tile == RAILVPOWERH || tile == RAILHPOWERV,
    }
}

pub(super) fn move_train(ctx: &mut SimContext, sprite: &mut CitySprite) {
    let kind = sprite.kind();
    if sprite.frame == FRAME_NW_SE || sprite.frame == FRAME_SW_NE {
        sprite.frame = STRAIGHT_FRAME[sprite.dir as usize];
    }
    sprite.x += DX[sprite.dir as usize];
    sprite.y += DY[sprite.dir as usize];

    if ctx.clock.acycle % 4 != 0 {
        return;
    }
    // Keep going straight when possible, otherwise scan from a random side.
    let start = ctx.rng.random(4);
    let order = std::iter::once(sprite.dir)
        .filter(|&d| d != DIR_NONE)
        .chain((start..start + 4).map(|z| z % 4));
    for d in order {
        if sprite.dir != DIR_NONE && d == (sprite.dir + 2) % 4 {
            continue;
        }
        let Some(tile) = tile_under(ctx, sprite.x + CX[d as usize], sprite.y + CY[d as usize])
        else {
            continue;
        };
        if !is_track(kind, tile) {
            continue;
        }
        sprite.frame = if sprite.dir != d && sprite.dir != DIR_NONE {
            if sprite.dir + d == 3 {
                FRAME_NW_SE
            } else {
                FRAME_SW_NE
            }
        } else {
            STRAIGHT_FRAME[d as usize]
        };
        if kind == SpriteKind::Train && (tile == HRAIL || tile == VRAIL) {
            sprite.frame = FRAME_UNDERWATER;
        }
        sprite.dir = d;
        return;
    }
    if sprite.dir == DIR_NONE {
        // Nowhere to go.
        sprite.frame = 0;
        return;
    }
    sprite.dir = DIR_NONE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::sprites::move_sprites;
    use crate::tiles::{LHRAIL, ROADS};

    fn step(state: &mut CityState, n: usize) {
        for _ in 0..n {
            state.clock.acycle = (state.clock.acycle + 1) % 960;
            move_sprites(&mut state.ctx());
        }
    }

    #[test]
    fn test_train_runs_along_straight_track() {
        let mut state = CityState::new(6);
        for x in 10..40 {
            state.map.set(x, 20, LHRAIL);
        }
        state.sprites.spawn(new_vehicle(20, 20, SpriteState::Train));
        step(&mut state, 24);
        let train = state.sprites.sprites[0];
        assert!(train.is_visible());
        assert_eq!(train.tile_y(), 20);
        assert_ne!(train.tile_x(), 20);
        assert_eq!(train.frame, 2);
    }

    #[test]
    fn test_train_without_track_vanishes() {
        let mut state = CityState::new(6);
        state.sprites.spawn(new_vehicle(20, 20, SpriteState::Train));
        step(&mut state, 4);
        assert!(state.sprites.is_empty());
    }

    #[test]
    fn test_bus_ignores_rail_and_follows_road() {
        let mut state = CityState::new(6);
        for y in 5..30 {
            state.map.set(50, y, ROADS);
            state.map.set(51, y, LHRAIL);
        }
        state.sprites.spawn(new_vehicle(50, 10, SpriteState::Bus));
        step(&mut state, 40);
        let bus = state.sprites.sprites[0];
        assert_eq!(bus.tile_x(), 50);
        assert_eq!(bus.frame, 1);
    }

    #[test]
    fn test_spawn_needs_population() {
        let mut state = CityState::new(6);
        for _ in 0..500 {
            generate_train(&mut state.ctx(), 5, 5);
        }
        assert!(state.sprites.is_empty());
        state.census.total_pop = 30;
        for _ in 0..500 {
            generate_train(&mut state.ctx(), 5, 5);
        }
        assert_eq!(state.sprites.len(), 1);
    }
}
