//! Mobile map agents: vehicles and disasters.
//!
//! Sprites live in [`SpriteList`] as plain values. Every step each visible
//! sprite is copied out, moved by its kind's routine, and written back, so a
//! moving sprite can inspect and explode the others without aliasing.
//! A sprite with `frame == 0` is dead and is dropped at the end of the step.

mod airplane;
mod explosion;
mod helicopter;
mod monster;
mod ship;
mod tornado;
mod train;

pub use airplane::generate_plane;
pub use helicopter::{dispatch_copter, generate_copter};
pub use monster::make_monster;
pub use ship::generate_ship;
pub use tornado::make_tornado;
pub use train::{generate_bus, generate_train};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CELL_SIZE;
use crate::context::SimContext;
use crate::events::{MessageKind, SoundKind};
use crate::geometry::CityLocation;
use crate::tiles::{
    is_bridge, BRWH, BRWV, HPOWER, HRAIL, RIVER, RZB, TINYEXP, TREEBASE, VPOWER, VRAIL,
};
use crate::zones::kill_zone;

/// Two visible sprites closer than this many pixels (Manhattan) collide.
pub const COLLISION_DISTANCE: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    Airplane,
    Helicopter,
    Ship,
    Monster,
    Tornado,
    Train,
    Bus,
    Explosion,
}

/// Kind-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SpriteState {
    Airplane {
        dest_x: i32,
        dest_y: i32,
    },
    Helicopter {
        dest_x: i32,
        dest_y: i32,
        origin_x: i32,
        origin_y: i32,
        count: i32,
    },
    Ship {
        new_dir: i32,
        count: i32,
        sound_count: i32,
    },
    Monster {
        dest_x: i32,
        dest_y: i32,
        origin_x: i32,
        origin_y: i32,
        count: i32,
        sound_count: i32,
        /// Set once the monster has reached its target and is heading home.
        returning: bool,
        step: i32,
    },
    Tornado {
        count: i32,
        flag: bool,
    },
    Train,
    Bus,
    Explosion,
}

impl SpriteState {
    pub fn kind(&self) -> SpriteKind {
        match self {
            SpriteState::Airplane { .. } => SpriteKind::Airplane,
            SpriteState::Helicopter { .. } => SpriteKind::Helicopter,
            SpriteState::Ship { .. } => SpriteKind::Ship,
            SpriteState::Monster { .. } => SpriteKind::Monster,
            SpriteState::Tornado { .. } => SpriteKind::Tornado,
            SpriteState::Train => SpriteKind::Train,
            SpriteState::Bus => SpriteKind::Bus,
            SpriteState::Explosion => SpriteKind::Explosion,
        }
    }
}

/// One sprite. Positions are in pixels, [`CELL_SIZE`] per tile, and mark the
/// sprite's hot spot; `offx`/`offy` give the drawing offset from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySprite {
    pub x: i32,
    pub y: i32,
    pub last_x: i32,
    pub last_y: i32,
    /// Animation frame; 0 means deallocated.
    pub frame: i32,
    pub dir: i32,
    pub width: i32,
    pub height: i32,
    pub offx: i32,
    pub offy: i32,
    pub state: SpriteState,
}

impl CitySprite {
    /// A sprite centred on tile (tx, ty).
    pub fn at_tile(tx: i32, ty: i32, size: i32, state: SpriteState) -> Self {
        let x = tx * CELL_SIZE + CELL_SIZE / 2;
        let y = ty * CELL_SIZE + CELL_SIZE / 2;
        Self {
            x,
            y,
            last_x: x,
            last_y: y,
            frame: 1,
            dir: 0,
            width: size,
            height: size,
            offx: -size / 2,
            offy: -size / 2,
            state,
        }
    }

    pub fn kind(&self) -> SpriteKind {
        self.state.kind()
    }

    pub fn is_visible(&self) -> bool {
        self.frame != 0
    }

    pub fn tile_x(&self) -> i32 {
        self.x.div_euclid(CELL_SIZE)
    }

    pub fn tile_y(&self) -> i32 {
        self.y.div_euclid(CELL_SIZE)
    }

    pub fn collides_with(&self, other: &CitySprite) -> bool {
        self.is_visible()
            && other.is_visible()
            && distance(self.x, self.y, other.x, other.y) < COLLISION_DISTANCE
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SpriteList {
    pub sprites: Vec<CitySprite>,
    /// Tile where the last vehicle crashed.
    pub crash_location: Option<CityLocation>,
}

impl SpriteList {
    pub fn spawn(&mut self, sprite: CitySprite) {
        self.sprites.push(sprite);
    }

    pub fn visible(&self) -> impl Iterator<Item = &CitySprite> {
        self.sprites.iter().filter(|s| s.is_visible())
    }

    /// Index of the first visible sprite of `kind`.
    pub fn find(&self, kind: SpriteKind) -> Option<usize> {
        self.sprites
            .iter()
            .position(|s| s.is_visible() && s.kind() == kind)
    }

    pub fn has(&self, kind: SpriteKind) -> bool {
        self.find(kind).is_some()
    }

    pub fn remove_dead(&mut self) {
        self.sprites.retain(|s| s.is_visible());
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Shared movement helpers
// ---------------------------------------------------------------------------

pub fn distance(x1: i32, y1: i32, x2: i32, y2: i32) -> i32 {
    (x1 - x2).abs() + (y1 - y2).abs()
}

/// Eight-way heading (1 = north, clockwise) from one pixel toward another.
pub fn get_dir(org_x: i32, org_y: i32, des_x: i32, des_y: i32) -> i32 {
    const GDTAB: [i32; 13] = [0, 3, 2, 1, 3, 4, 5, 7, 6, 5, 7, 8, 1];
    let mut dx = des_x - org_x;
    let mut dy = des_y - org_y;
    let mut z: usize = match (dx < 0, dy < 0) {
        (true, true) => 11,
        (true, false) => 8,
        (false, true) => 2,
        (false, false) => 5,
    };
    dx = dx.abs();
    dy = dy.abs();
    if dx * 2 < dy {
        z += 1;
    } else if dy * 2 < dx {
        z -= 1;
    }
    GDTAB[z]
}

/// Rotate heading `p` one step toward `d` the short way round.
pub fn turn_to(p: i32, d: i32) -> i32 {
    if p == d {
        return p;
    }
    let mut p = p;
    if p < d {
        if d - p < 4 {
            p += 1;
        } else {
            p -= 1;
        }
    } else if p - d < 4 {
        p -= 1;
    } else {
        p += 1;
    }
    if p > 8 {
        1
    } else if p < 1 {
        8
    } else {
        p
    }
}

/// Tile under pixel (x, y), or `None` off the map.
pub(crate) fn tile_under(ctx: &SimContext, x: i32, y: i32) -> Option<u16> {
    ctx.map.tile(x.div_euclid(CELL_SIZE), y.div_euclid(CELL_SIZE))
}

pub(crate) fn not_in_bounds(ctx: &SimContext, sprite: &CitySprite) -> bool {
    !ctx.map.in_bounds(sprite.tile_x(), sprite.tile_y())
}

/// Tiles that leave water behind when wrecked.
fn is_wet(tile: u16) -> bool {
    matches!(tile, HPOWER | VPOWER | HRAIL | VRAIL | BRWH | BRWV)
}

/// Wreck whatever stands under pixel (x, y).
pub fn destroy_tile(ctx: &mut SimContext, px: i32, py: i32) {
    let x = px.div_euclid(CELL_SIZE);
    let y = py.div_euclid(CELL_SIZE);
    let Some(cell) = ctx.map.get(x, y) else {
        return;
    };
    let tile = crate::tiles::tile_of(cell);
    if tile < TREEBASE {
        return;
    }
    if is_bridge(tile) {
        ctx.map.set(x, y, RIVER);
        return;
    }
    if !ctx.specs.is_combustible(cell) {
        return;
    }
    if ctx.specs.is_zone_center(cell) {
        kill_zone(ctx, x, y, tile);
        if tile > RZB {
            make_explosion(ctx, x, y);
        }
    }
    ctx.map.set(x, y, if is_wet(tile) { RIVER } else { TINYEXP });
}

/// Spawn an explosion sprite centred on tile (x, y).
pub fn make_explosion(ctx: &mut SimContext, x: i32, y: i32) {
    if ctx.map.in_bounds(x, y) {
        make_explosion_at(ctx, x * CELL_SIZE + CELL_SIZE / 2, y * CELL_SIZE + CELL_SIZE / 2);
    }
}

pub fn make_explosion_at(ctx: &mut SimContext, px: i32, py: i32) {
    ctx.sprites.spawn(explosion::new_explosion(px, py));
}

/// Blow a sprite up: deallocate it, leave an explosion behind and report
/// vehicle crashes.
pub fn explode_sprite(ctx: &mut SimContext, sprite: &mut CitySprite) {
    sprite.frame = 0;
    make_explosion_at(ctx, sprite.x, sprite.y);
    let (x, y) = (sprite.tile_x(), sprite.tile_y());
    let message = match sprite.kind() {
        SpriteKind::Airplane => Some(MessageKind::PlaneCrash),
        SpriteKind::Ship => Some(MessageKind::ShipCrash),
        SpriteKind::Train => Some(MessageKind::TrainCrash),
        SpriteKind::Bus => Some(MessageKind::BusCrash),
        SpriteKind::Helicopter => Some(MessageKind::CopterCrash),
        _ => None,
    };
    if let Some(kind) = message {
        ctx.sprites.crash_location = Some(CityLocation::new(x, y));
        ctx.outbox.message_at(kind, x, y);
    }
    ctx.outbox.sound(SoundKind::ExplosionHigh, x, y);
}

/// Explode every other visible sprite of the listed kinds that `sprite`
/// touches. Returns whether anything was hit.
pub(crate) fn explode_colliding(
    ctx: &mut SimContext,
    index: usize,
    sprite: &CitySprite,
    kinds: &[SpriteKind],
) -> bool {
    let mut hit = false;
    for j in 0..ctx.sprites.sprites.len() {
        if j == index {
            continue;
        }
        let mut other = ctx.sprites.sprites[j];
        if kinds.contains(&other.kind()) && sprite.collides_with(&other) {
            explode_sprite(ctx, &mut other);
            ctx.sprites.sprites[j] = other;
            hit = true;
        }
    }
    hit
}

// ---------------------------------------------------------------------------
// Per-step driver
// ---------------------------------------------------------------------------

/// Move every sprite alive at the start of the step, then drop the dead.
pub fn move_sprites(ctx: &mut SimContext) {
    let count = ctx.sprites.sprites.len();
    for i in 0..count {
        let mut sprite = ctx.sprites.sprites[i];
        if !sprite.is_visible() {
            continue;
        }
        sprite.last_x = sprite.x;
        sprite.last_y = sprite.y;
        match sprite.kind() {
            SpriteKind::Airplane => airplane::move_airplane(ctx, i, &mut sprite),
            SpriteKind::Helicopter => helicopter::move_helicopter(ctx, &mut sprite),
            SpriteKind::Ship => ship::move_ship(ctx, &mut sprite),
            SpriteKind::Monster => monster::move_monster(ctx, i, &mut sprite),
            SpriteKind::Tornado => tornado::move_tornado(ctx, i, &mut sprite),
            SpriteKind::Train | SpriteKind::Bus => train::move_train(ctx, &mut sprite),
            SpriteKind::Explosion => explosion::move_explosion(ctx, &mut sprite),
        }
        ctx.sprites.sprites[i] = sprite;
        ctx.outbox.sprite_moved(sprite);
    }
    ctx.sprites.remove_dead();
}
