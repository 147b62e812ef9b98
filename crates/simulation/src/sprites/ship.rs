use super::{
    destroy_tile, explode_sprite, not_in_bounds, turn_to, CitySprite, SpriteKind, SpriteState,
};
use crate::context::SimContext;
use crate::events::SoundKind;
use crate::tiles::{BRWH, BRWV, CHANNEL, HPOWER, HRAIL, RIVER, VPOWER, VRAIL};

const BDX: [i32; 9] = [0, 0, 1, 1, 1, 0, -1, -1, -1];
const BDY: [i32; 9] = [0, -1, -1, 0, 1, 1, 1, 0, -1];
const BPX: [i32; 9] = [0, 0, 2, 2, 2, 0, -2, -2, -2];
const BPY: [i32; 9] = [0, -2, -2, 0, 2, 2, 2, 0, -2];

/// Tiles a ship may sit on without sinking.
const CLEAR_TILES: [u16; 8] = [RIVER, CHANNEL, HPOWER, VPOWER, HRAIL, VRAIL, BRWH, BRWV];

/// Heading sentinel meaning "no direction is forbidden".
const NO_REVERSE: i32 = 10;

pub fn new_ship(tx: i32, ty: i32, frame: i32) -> CitySprite {
    let mut ship = CitySprite::at_tile(
        tx,
        ty,
        48,
        SpriteState::Ship {
            new_dir: frame,
            count: 1,
            sound_count: 1,
        },
    );
    ship.frame = frame;
    ship.dir = NO_REVERSE;
    ship
}

/// Try to launch a ship from a channel tile on one of the map edges.
pub fn generate_ship(ctx: &mut SimContext) {
    if ctx.sprites.has(SpriteKind::Ship) {
        return;
    }
    let (w, h) = (ctx.map.width(), ctx.map.height());
    // (fixed coordinate, scan along x?, heading)
    let edges = [(0, true, 5), (0, false, 3), (h - 1, true, 1), (w - 1, false, 7)];
    for (fixed, along_x, heading) in edges {
        if !ctx.rng.one_in(4) {
            continue;
        }
        let (start, end) = if along_x { (4, w - 2) } else { (1, h - 2) };
        for t in start..end {
            let (x, y) = if along_x { (t, fixed) } else { (fixed, t) };
            if ctx.tile(x, y) == CHANNEL {
                ctx.sprites.spawn(new_ship(x, y, heading));
                return;
            }
        }
    }
}

/// A power line or rail crossing the water, entered head-on.
fn try_other(tile: u16, old_dir: i32, new_dir: i32) -> bool {
    let mut reverse = old_dir + 4;
    if reverse > 8 {
        reverse -= 8;
    }
    new_dir == reverse && matches!(tile, HPOWER | VPOWER | HRAIL | VRAIL)
}

pub(super) fn move_ship(ctx: &mut SimContext, sprite: &mut CitySprite) {
    let SpriteState::Ship {
        mut new_dir,
        mut count,
        mut sound_count,
    } = sprite.state
    else {
        return;
    };
    let mut tile = RIVER;

    if sound_count > 0 {
        sound_count -= 1;
    }
    if sound_count == 0 {
        if ctx.rng.one_in(4) {
            ctx.outbox
                .sound(SoundKind::HonkHonkLow, sprite.tile_x(), sprite.tile_y());
        }
        sound_count = 200;
    }

    if count > 0 {
        count -= 1;
    }
    if count == 0 {
        count = 9;
        if sprite.frame != new_dir {
            sprite.frame = turn_to(sprite.frame, new_dir);
            sprite.state = SpriteState::Ship {
                new_dir,
                count,
                sound_count,
            };
            return;
        }
        let start = ctx.rng.random(8);
        let mut found = false;
        for p in start..start + 8 {
            let z = (p % 8) + 1;
            if z == sprite.dir {
                continue;
            }
            let x = sprite.tile_x() + BDX[z as usize];
            let y = sprite.tile_y() + BDY[z as usize];
            if let Some(t) = ctx.map.tile(x, y) {
                tile = t;
                if t == CHANNEL || t == BRWH || t == BRWV || try_other(t, sprite.dir, z) {
                    new_dir = z;
                    sprite.frame = turn_to(sprite.frame, new_dir);
                    sprite.dir = if z + 4 > 8 { z - 4 } else { z + 4 };
                    found = true;
                    break;
                }
            }
        }
        if !found {
            sprite.dir = NO_REVERSE;
            new_dir = ctx.rng.random(8) + 1;
        }
    } else if sprite.frame == new_dir {
        sprite.x += BPX[sprite.frame as usize];
        sprite.y += BPY[sprite.frame as usize];
    }

    sprite.state = SpriteState::Ship {
        new_dir,
        count,
        sound_count,
    };
    if not_in_bounds(ctx, sprite) {
        sprite.frame = 0;
        return;
    }
    if !CLEAR_TILES.contains(&tile) {
        explode_sprite(ctx, sprite);
        destroy_tile(ctx, sprite.x, sprite.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CityState;
    use crate::sprites::move_sprites;
    use crate::tiles::DIRT;

    #[test]
    fn test_ship_launches_from_edge_channel() {
        let mut state = CityState::new(4);
        state.map.set(30, 0, CHANNEL);
        for _ in 0..50 {
            generate_ship(&mut state.ctx());
            if !state.sprites.is_empty() {
                break;
            }
        }
        let ship = state.sprites.sprites[0];
        assert_eq!((ship.tile_x(), ship.tile_y(), ship.frame), (30, 0, 5));
    }

    #[test]
    fn test_ship_follows_channel() {
        let mut state = CityState::new(4);
        state.map.fill(RIVER);
        for y in 0..100 {
            state.map.set(60, y, CHANNEL);
        }
        state.sprites.spawn(new_ship(60, 10, 5));
        let start_y = state.sprites.sprites[0].y;
        for _ in 0..120 {
            move_sprites(&mut state.ctx());
        }
        let ship = state.sprites.sprites[0];
        assert!(ship.is_visible());
        assert_eq!(ship.tile_x(), 60);
        assert_ne!(ship.y, start_y);
    }

    #[test]
    fn test_ship_on_land_explodes() {
        let mut state = CityState::new(4);
        state.map.fill(DIRT);
        state.sprites.spawn(new_ship(60, 50, 5));
        move_sprites(&mut state.ctx());
        assert!(!state.sprites.has(SpriteKind::Ship));
        assert_eq!(
            state.outbox.messages[0].kind,
            crate::events::MessageKind::ShipCrash
        );
    }

    #[test]
    fn test_try_other_requires_head_on_entry() {
        assert!(try_other(HRAIL, 1, 5));
        assert!(!try_other(HRAIL, 1, 3));
        assert!(!try_other(RIVER, 1, 5));
    }
}
