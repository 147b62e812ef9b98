use super::{CitySprite, SpriteState};
use crate::config::CELL_SIZE;
use crate::context::SimContext;
use crate::events::{MessageKind, SoundKind};
use crate::tiles::{DIRT, FIRE};

pub fn new_explosion(px: i32, py: i32) -> CitySprite {
    CitySprite {
        x: px,
        y: py,
        last_x: px,
        last_y: py,
        frame: 1,
        dir: 0,
        width: 48,
        height: 48,
        offx: -24,
        offy: -24,
        state: SpriteState::Explosion,
    }
}

/// Set fire to the tile under pixel (px, py) if it can burn.
fn start_fire(ctx: &mut SimContext, px: i32, py: i32) {
    let x = px.div_euclid(CELL_SIZE);
    let y = py.div_euclid(CELL_SIZE);
    let Some(cell) = ctx.map.get(x, y) else {
        return;
    };
    let tile = crate::tiles::tile_of(cell);
    if (!ctx.specs.is_combustible(cell) && tile != DIRT) || ctx.specs.is_zone_center(cell) {
        return;
    }
    let fire = FIRE + ctx.rng.random(4) as u16;
    ctx.map.set(x, y, fire);
}

pub(super) fn move_explosion(ctx: &mut SimContext, sprite: &mut CitySprite) {
    if ctx.clock.acycle % 2 == 0 {
        if sprite.frame == 1 {
            let (x, y) = (sprite.tile_x(), sprite.tile_y());
            ctx.outbox.sound(SoundKind::ExplosionHigh, x, y);
            ctx.outbox.message_at(MessageKind::ExplosionReported, x, y);
        }
        sprite.frame += 1;
    }
    if sprite.frame > 6 {
        sprite.frame = 0;
        let (x, y) = (sprite.x, sprite.y);
        for (dx, dy) in [(0, 0), (-16, -16), (16, 16), (-16, 16), (16, -16)] {
            start_fire(ctx, x + dx, y + dy);
        }
    }
}
