use super::{distance, get_dir, turn_to, CitySprite, SpriteKind, SpriteState};
use crate::config::CELL_SIZE;
use crate::context::SimContext;
use crate::events::{MessageKind, SoundKind};

const CDX: [i32; 9] = [0, 0, 3, 5, 3, 0, -3, -5, -3];
const CDY: [i32; 9] = [0, -5, -3, 0, 3, 5, 3, 0, -3];
/// Steps between traffic reports.
const SOUND_FREQ: u32 = 200;
const FLIGHT_TIME: i32 = 1500;

pub fn generate_copter(ctx: &mut SimContext, x: i32, y: i32) {
    if ctx.sprites.has(SpriteKind::Helicopter) {
        return;
    }
    let dest_x = ctx.rng.random(ctx.map.width()) * CELL_SIZE + CELL_SIZE / 2;
    let dest_y = ctx.rng.random(ctx.map.height()) * CELL_SIZE + CELL_SIZE / 2;
    let origin_x = x * CELL_SIZE + CELL_SIZE / 2;
    let origin_y = y * CELL_SIZE + CELL_SIZE / 2;
    let mut copter = CitySprite::at_tile(
        x,
        y,
        32,
        SpriteState::Helicopter {
            dest_x,
            dest_y,
            origin_x,
            origin_y,
            count: FLIGHT_TIME,
        },
    );
    copter.frame = 5;
    ctx.sprites.spawn(copter);
}

/// Send the helicopter, if any, to look at tile (x, y).
pub fn dispatch_copter(ctx: &mut SimContext, x: i32, y: i32) {
    if let Some(i) = ctx.sprites.find(SpriteKind::Helicopter) {
        if let SpriteState::Helicopter { dest_x, dest_y, .. } = &mut ctx.sprites.sprites[i].state {
            *dest_x = x * CELL_SIZE + CELL_SIZE / 2;
            *dest_y = y * CELL_SIZE + CELL_SIZE / 2;
        }
    }
}

pub(super) fn move_helicopter(ctx: &mut SimContext, sprite: &mut CitySprite) {
    let SpriteState::Helicopter {
        mut dest_x,
        mut dest_y,
        origin_x,
        origin_y,
        mut count,
    } = sprite.state
    else {
        return;
    };

    if count > 0 {
        count -= 1;
    }
    if count == 0 {
        // Disasters draw the copter in; otherwise it heads home.
        let target = ctx
            .sprites
            .find(SpriteKind::Monster)
            .or_else(|| ctx.sprites.find(SpriteKind::Tornado))
            .map(|i| (ctx.sprites.sprites[i].x, ctx.sprites.sprites[i].y));
        (dest_x, dest_y) = target.unwrap_or((origin_x, origin_y));
        if distance(sprite.x, sprite.y, origin_x, origin_y) < 30 {
            sprite.frame = 0;
            return;
        }
    }

    if ctx.clock.acycle % SOUND_FREQ == 0 {
        let (x, y) = (sprite.tile_x(), sprite.tile_y());
        if ctx.overlays.traffic_density.world_get(x, y) > 170 && ctx.rng.one_in(8) {
            ctx.outbox.message_at(MessageKind::HeavyTrafficReported, x, y);
            ctx.outbox.sound(SoundKind::HeavyTraffic, x, y);
        }
    }

    let mut z = sprite.frame;
    if ctx.clock.acycle % 3 == 0 {
        z = turn_to(z, get_dir(sprite.x, sprite.y, dest_x, dest_y));
        sprite.frame = z;
    }
    sprite.x += CDX[z as usize];
    sprite.y += CDY[z as usize];
    sprite.state = SpriteState::Helicopter {
        dest_x,
        dest_y,
        origin_x,
        origin_y,
        count,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::sprites::move_sprites;

    #[test]
    fn test_copter_lands_home_after_flight_time() {
        let mut state = CityState::new(9);
        generate_copter(&mut state.ctx(), 40, 40);
        if let SpriteState::Helicopter { count, .. } = &mut state.sprites.sprites[0].state {
            *count = 1;
        }
        move_sprites(&mut state.ctx());
        assert!(!state.sprites.has(SpriteKind::Helicopter));
    }

    #[test]
    fn test_copter_chases_monster_when_grounded() {
        let mut state = CityState::new(9);
        generate_copter(&mut state.ctx(), 40, 40);
        state.sprites.spawn(CitySprite::at_tile(
            90,
            40,
            48,
            SpriteState::Monster {
                dest_x: 0,
                dest_y: 0,
                origin_x: 0,
                origin_y: 0,
                count: 0,
                sound_count: 0,
                returning: false,
                step: 1,
            },
        ));
        let mut copter = state.sprites.sprites[0];
        copter.x += 100;
        if let SpriteState::Helicopter { count, .. } = &mut copter.state {
            *count = 1;
        }
        move_helicopter(&mut state.ctx(), &mut copter);
        match copter.state {
            SpriteState::Helicopter { dest_x, .. } => assert_eq!(dest_x, 90 * 16 + 8),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_dispatch_sets_destination() {
        let mut state = CityState::new(9);
        generate_copter(&mut state.ctx(), 40, 40);
        dispatch_copter(&mut state.ctx(), 3, 4);
        match state.sprites.sprites[0].state {
            SpriteState::Helicopter { dest_x, dest_y, .. } => {
                assert_eq!((dest_x, dest_y), (56, 72));
            }
            _ => unreachable!(),
        }
    }
}
