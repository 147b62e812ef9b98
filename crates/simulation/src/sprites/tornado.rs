use super::{destroy_tile, explode_colliding, not_in_bounds, CitySprite, SpriteKind, SpriteState};
use crate::context::SimContext;
use crate::events::{MessageKind, SoundKind};

const CDX: [i32; 6] = [2, 3, 2, 0, -2, -3];
const CDY: [i32; 6] = [-2, 0, 2, 3, 2, 0];
const LIFETIME: i32 = 200;

const VICTIMS: [SpriteKind; 4] = [
    SpriteKind::Airplane,
    SpriteKind::Helicopter,
    SpriteKind::Ship,
    SpriteKind::Train,
];

pub fn new_tornado(tx: i32, ty: i32) -> CitySprite {
    let mut t = CitySprite::at_tile(
        tx,
        ty,
        48,
        SpriteState::Tornado {
            count: LIFETIME,
            flag: false,
        },
    );
    t.offy = -40;
    t
}

/// Touch down a tornado somewhere inland, or prolong the current one.
pub fn make_tornado(ctx: &mut SimContext) {
    if let Some(i) = ctx.sprites.find(SpriteKind::Tornado) {
        if let SpriteState::Tornado { count, .. } = &mut ctx.sprites.sprites[i].state {
            *count = LIFETIME;
        }
        return;
    }
    let x = ctx.rng.random(ctx.map.width() - 19) + 10;
    let y = ctx.rng.random(ctx.map.height() - 19) + 10;
    ctx.sprites.spawn(new_tornado(x, y));
    ctx.outbox.message_at(MessageKind::TornadoReported, x, y);
    ctx.outbox.sound(SoundKind::Siren, x, y);
}

pub(super) fn move_tornado(ctx: &mut SimContext, index: usize, sprite: &mut CitySprite) {
    let SpriteState::Tornado {
        mut count,
        mut flag,
    } = sprite.state
    else {
        return;
    };

    // Alternate 1-2-3-2-1 between the two outer frames.
    let z = if sprite.frame == 2 {
        if flag {
            3
        } else {
            1
        }
    } else {
        flag = sprite.frame == 1;
        2
    };
    if count > 0 {
        count -= 1;
    }
    sprite.frame = z;
    sprite.state = SpriteState::Tornado { count, flag };

    explode_colliding(ctx, index, sprite, &VICTIMS);

    let step = ctx.rng.random(CDX.len() as i32) as usize;
    sprite.x += CDX[step];
    sprite.y += CDY[step];
    if not_in_bounds(ctx, sprite) {
        sprite.frame = 0;
        return;
    }
    if count == 0 && ctx.rng.one_in(501) {
        sprite.frame = 0;
        return;
    }
    destroy_tile(ctx, sprite.x, sprite.y);
}
