use super::{
    destroy_tile, distance, explode_colliding, get_dir, tile_under, CitySprite, SpriteKind,
    SpriteState,
};
use crate::config::CELL_SIZE;
use crate::context::SimContext;
use crate::events::{MessageKind, SoundKind};
use crate::tiles::RIVER;

const GX: [i32; 5] = [2, 2, -2, -2, 0];
const GY: [i32; 5] = [-2, 2, 2, -2, 0];
const ND1: [i32; 4] = [0, 1, 2, 3];
const ND2: [i32; 4] = [1, 2, 3, 0];
const NN1: [i32; 4] = [2, 5, 8, 11];
const NN2: [i32; 4] = [11, 2, 5, 8];

const VICTIMS: [SpriteKind; 4] = [
    SpriteKind::Airplane,
    SpriteKind::Helicopter,
    SpriteKind::Ship,
    SpriteKind::Train,
];

fn pollution_target(ctx: &SimContext) -> (i32, i32) {
    let p = ctx.overlays.pollution_max;
    (p.x * CELL_SIZE + CELL_SIZE / 2, p.y * CELL_SIZE + CELL_SIZE / 2)
}

pub fn new_monster(ctx: &SimContext, tx: i32, ty: i32) -> CitySprite {
    let (dest_x, dest_y) = pollution_target(ctx);
    let mut monster = CitySprite::at_tile(
        tx,
        ty,
        48,
        SpriteState::Monster {
            dest_x,
            dest_y,
            origin_x: 0,
            origin_y: 0,
            count: 1000,
            sound_count: 0,
            returning: false,
            step: 1,
        },
    );
    if let SpriteState::Monster {
        origin_x, origin_y, ..
    } = &mut monster.state
    {
        *origin_x = monster.x;
        *origin_y = monster.y;
    }
    let east = tx > ctx.map.width() / 2;
    let south = ty > ctx.map.height() / 2;
    monster.frame = match (east, south) {
        (true, true) => 10,
        (true, false) => 7,
        (false, true) => 1,
        (false, false) => 4,
    };
    monster
}

/// Release a monster from a random river tile, or re-aim the existing one
/// at the most polluted spot.
pub fn make_monster(ctx: &mut SimContext) {
    if let Some(i) = ctx.sprites.find(SpriteKind::Monster) {
        let (tx, ty) = pollution_target(ctx);
        if let SpriteState::Monster {
            dest_x,
            dest_y,
            count,
            sound_count,
            ..
        } = &mut ctx.sprites.sprites[i].state
        {
            *sound_count = 1;
            *count = 1000;
            *dest_x = tx;
            *dest_y = ty;
        }
        return;
    }

    let (w, h) = (ctx.map.width(), ctx.map.height());
    let mut spot = None;
    for _ in 0..300 {
        let x = ctx.rng.random(w - 19) + 10;
        let y = ctx.rng.random(h - 9) + 5;
        if ctx.tile(x, y) == RIVER {
            spot = Some((x, y));
            break;
        }
    }
    let (x, y) = spot.unwrap_or((60, 50));
    let monster = new_monster(ctx, x, y);
    ctx.sprites.spawn(monster);
    ctx.outbox.message_at(MessageKind::MonsterReported, x, y);
    ctx.outbox.sound(SoundKind::Monster, x, y);
}

#[allow(clippy::overly_complex_bool_expr)]
pub(super) fn move_monster(ctx: &mut SimContext, index: usize, sprite: &mut CitySprite) {
    let SpriteState::Monster {
        mut dest_x,
        mut dest_y,
        origin_x,
        origin_y,
        mut count,
        mut sound_count,
        mut returning,
        mut step,
    } = sprite.state
    else {
        return;
    };

    if sound_count > 0 {
        sound_count -= 1;
    }

    // Frames 1..=12 walk north-east, south-east, south-west, north-west in
    // three-frame strides; 13..=16 are mid-turn poses.
    let mut d = (sprite.frame - 1) / 3;
    let mut z = (sprite.frame - 1) % 3;
    if d < 4 {
        if z == 2 {
            step = -1;
        }
        if z == 0 {
            step = 1;
        }
        z += step;

        if distance(sprite.x, sprite.y, dest_x, dest_y) < 60 {
            if returning {
                sprite.frame = 0;
                return;
            }
            returning = true;
            dest_x = origin_x;
            dest_y = origin_y;
        }

        let heading = (get_dir(sprite.x, sprite.y, dest_x, dest_y) - 1) / 2;
        if heading != d && ctx.rng.one_in(11) {
            z = if ctx.rng.one_in(2) {
                ND1[d as usize]
            } else {
                ND2[d as usize]
            };
            d = 4;
            if sound_count == 0 {
                ctx.outbox
                    .sound(SoundKind::Monster, sprite.tile_x(), sprite.tile_y());
                sound_count = 50 + ctx.rng.random(101);
            }
        }
    } else {
        let pose = (sprite.frame - 13) % 4;
        if ctx.rng.one_in(4) {
            let next = if ctx.rng.one_in(2) {
                NN1[pose as usize]
            } else {
                NN2[pose as usize]
            };
            d = (next - 1) / 3;
            z = (next - 1) % 3;
        } else {
            d = 4;
            z = pose;
        }
    }

    sprite.frame = d * 3 + z + 1;
    sprite.x += GX[d as usize];
    sprite.y += GY[d as usize];
    if count > 0 {
        count -= 1;
    }
    sprite.state = SpriteState::Monster {
        dest_x,
        dest_y,
        origin_x,
        origin_y,
        count,
        sound_count,
        returning,
        step,
    };

    let under = tile_under(ctx, sprite.x, sprite.y);
    // The river clause is switched off; only leaving the map retires it.
    if under.is_none() || (under == Some(RIVER) && count != 0 && false) {
        sprite.frame = 0;
    }

    explode_colliding(ctx, index, sprite, &VICTIMS);
    destroy_tile(ctx, sprite.x, sprite.y);
}
