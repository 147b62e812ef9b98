use super::{
    distance, explode_colliding, explode_sprite, get_dir, not_in_bounds, turn_to, CitySprite,
    SpriteKind, SpriteState,
};
use crate::config::CELL_SIZE;
use crate::context::SimContext;

// Per-frame velocity; frames 9..=11 are the take-off roll.
const CDX: [i32; 12] = [0, 0, 6, 8, 6, 0, -6, -8, -6, 8, 8, 8];
const CDY: [i32; 12] = [0, -8, -6, 0, 6, 8, 6, 0, -6, 0, 0, 0];

pub fn new_airplane(map_width: i32, tx: i32, ty: i32) -> CitySprite {
    let mut sprite = CitySprite::at_tile(tx, ty, 48, SpriteState::Airplane { dest_x: 0, dest_y: 0 });
    let (dest_x, frame) = if tx > map_width - 20 {
        (sprite.x - 200, 7)
    } else {
        (sprite.x + 200, 11)
    };
    sprite.frame = frame;
    sprite.state = SpriteState::Airplane {
        dest_x,
        dest_y: sprite.y,
    };
    sprite
}

/// Launch a plane from the airport at tile (x, y) unless one is flying.
pub fn generate_plane(ctx: &mut SimContext, x: i32, y: i32) {
    if ctx.sprites.has(SpriteKind::Airplane) {
        return;
    }
    let plane = new_airplane(ctx.map.width(), x, y);
    ctx.sprites.spawn(plane);
}

pub(super) fn move_airplane(ctx: &mut SimContext, index: usize, sprite: &mut CitySprite) {
    let SpriteState::Airplane {
        mut dest_x,
        mut dest_y,
    } = sprite.state
    else {
        return;
    };

    let mut z = sprite.frame;
    if ctx.clock.acycle % 5 == 0 {
        if z > 8 {
            z -= 1;
            if z < 9 {
                z = 3;
            }
        } else {
            z = turn_to(z, get_dir(sprite.x, sprite.y, dest_x, dest_y));
        }
        sprite.frame = z;
    }

    if distance(sprite.x, sprite.y, dest_x, dest_y) < 50 {
        dest_x = ctx.rng.random(ctx.map.width()) * CELL_SIZE + CELL_SIZE / 2;
        dest_y = ctx.rng.random(ctx.map.height()) * CELL_SIZE + CELL_SIZE / 2;
    }
    sprite.state = SpriteState::Airplane { dest_x, dest_y };

    if ctx.settings.disasters_enabled {
        let hit = explode_colliding(
            ctx,
            index,
            sprite,
            &[SpriteKind::Airplane, SpriteKind::Helicopter],
        );
        if hit {
            explode_sprite(ctx, sprite);
        }
    }

    sprite.x += CDX[z as usize];
    sprite.y += CDY[z as usize];
    if not_in_bounds(ctx, sprite) {
        sprite.frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::sprites::move_sprites;

    #[test]
    fn test_takes_off_toward_open_side() {
        let plane = new_airplane(120, 10, 10);
        assert_eq!(plane.frame, 11);
        let plane = new_airplane(120, 110, 10);
        assert_eq!(plane.frame, 7);
    }

    #[test]
    fn test_only_one_plane() {
        let mut state = CityState::new(3);
        let mut ctx = state.ctx();
        generate_plane(&mut ctx, 50, 50);
        generate_plane(&mut ctx, 60, 50);
        assert_eq!(state.sprites.len(), 1);
    }

    #[test]
    fn test_planes_collide_and_explode() {
        let mut state = CityState::new(3);
        let a = new_airplane(120, 50, 50);
        let b = new_airplane(120, 50, 51);
        state.sprites.spawn(a);
        state.sprites.spawn(b);
        move_sprites(&mut state.ctx());
        assert!(!state.sprites.has(SpriteKind::Airplane));
        assert!(state.sprites.has(SpriteKind::Explosion));
    }

    #[test]
    fn test_take_off_roll_ends_heading_east() {
        let mut state = CityState::new(3);
        state.sprites.spawn(new_airplane(120, 20, 50));
        let mut frames = Vec::new();
        for _ in 0..3 {
            state.clock.acycle = 0;
            move_sprites(&mut state.ctx());
            frames.push(state.sprites.sprites[0].frame);
        }
        assert_eq!(frames, vec![10, 9, 3]);
    }
}
