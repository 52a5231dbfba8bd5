//! Passes 1 and 2: bodies against tiles, plus tile reactions.

use macroquad::math::{Rect, Vec2};

use super::CollisionContext;
use crate::game::components::{Mode, PickupKind, State, Tile, TileKind};
use crate::game::entity::{Entity, Tag};
use crate::game::event::{LevelTransitionEvent, TileEvent};
use crate::game::geometry::{overlap, separation_sign, Axis};
use crate::game::spawn::{SpawnKind, SpawnRequest};
use crate::game::world::World;

/// What striking a tile did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileReaction {
    None,
    Broken,
    Opened,
}

/// Which side of the body/tile pair we are resolving for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Body {
    Player,
    Enemy,
}

/// Pass 1: push players out of tiles, track ground contact, react to tiles
/// struck from below and to level doors.
pub fn resolve_player_tiles(world: &mut World, ctx: &mut CollisionContext) {
    for i in 0..world.count(Tag::Player) {
        let player = world.query(Tag::Player)[i];
        if !world.is_alive(player) {
            continue;
        }
        if !settle_on_tiles(world, ctx, player, Body::Player) {
            continue;
        }

        let run_threshold = ctx.config.physics.run_threshold;
        let velocity_x = world.transforms.get(player).map_or(0.0, |t| t.velocity.x);
        if let Some(state) = world.states.get_mut(player) {
            if !state.holds_action() {
                state.mode = if !state.on_ground {
                    Mode::Air
                } else if velocity_x.abs() > run_threshold {
                    Mode::Run
                } else {
                    Mode::Idle
                };
            }
        }
    }
}

/// Pass 2: push enemies out of tiles and track ground contact. Doors are
/// passable and no tile reacts.
pub fn resolve_enemy_tiles(world: &mut World, ctx: &mut CollisionContext) {
    for i in 0..world.count(Tag::Enemy) {
        let enemy = world.query(Tag::Enemy)[i];
        if world.is_alive(enemy) {
            settle_on_tiles(world, ctx, enemy, Body::Enemy);
        }
    }
}

/// Resolve one body against every tile. Returns false if a level door
/// stopped resolution for this body.
fn settle_on_tiles(world: &mut World, ctx: &mut CollisionContext, body: Entity, kind: Body) -> bool {
    let Some(bounds) = world.bounds.get(body).copied() else {
        return true;
    };
    if !world.transforms.contains(body) {
        return true;
    }
    match world.states.get_mut(body) {
        Some(state) => state.on_ground = false,
        None => return true,
    }

    for j in 0..world.count(Tag::Tile) {
        let tile = world.query(Tag::Tile)[j];
        if !world.is_alive(tile) {
            continue;
        }
        let Some(tile_rect) = world.world_rect(tile) else {
            continue;
        };
        let Some(mut transform) = world.transforms.get(body).copied() else {
            return true;
        };
        let body_rect = bounds.rect_at(transform.position);
        let o = overlap(body_rect, tile_rect);
        if o.x <= 0.0 || o.y <= 0.0 {
            continue;
        }

        if let Some(target) = world.tiles.get(tile).and_then(|t| t.door_target()) {
            match kind {
                Body::Enemy => continue,
                Body::Player => {
                    log::info!("player {} entered door to '{}'", body, target);
                    ctx.events.level_transition.send(LevelTransitionEvent {
                        player: body,
                        target: target.to_string(),
                    });
                    return false;
                }
            }
        }

        let body_center = body_rect.center();
        let tile_center = tile_rect.center();
        let mut landed = false;
        let mut struck_from_below = false;
        match Axis::of_least_overlap(o) {
            Axis::X => {
                transform.position.x += separation_sign(body_center.x, tile_center.x) * o.x;
                transform.velocity.x = 0.0;
            }
            Axis::Y => {
                if body_center.y < tile_center.y {
                    transform.position.y -= o.y;
                    landed = true;
                } else {
                    struck_from_below = transform.velocity.y < 0.0;
                    transform.position.y += o.y;
                }
                transform.velocity.y = 0.0;
            }
        }
        world.transforms.insert(body, transform);

        if landed {
            if let Some(state) = world.states.get_mut(body) {
                state.on_ground = true;
            }
        }
        if struck_from_below && kind == Body::Player {
            strike_tile(world, ctx, tile, body);
        }
    }
    true
}

/// Trigger a tile's reaction: breakables shatter (dropping their item),
/// containers open once. Other tiles and dead tiles do nothing.
pub fn strike_tile(world: &mut World, ctx: &mut CollisionContext, tile: Entity, by: Entity) -> TileReaction {
    if !world.is_alive(tile) || !world.tiles.get(tile).is_some_and(Tile::is_reactive) {
        return TileReaction::None;
    }
    let Some(rect) = world.world_rect(tile) else {
        return TileReaction::None;
    };
    match world.tiles.get(tile).map(|t| &t.kind) {
        Some(TileKind::Breakable { drop }) => {
            let drop = *drop;
            break_tile(world, ctx, tile, by, rect, drop);
            TileReaction::Broken
        }
        Some(TileKind::Container { item }) => {
            let item = *item;
            if open_container(world, ctx, tile, by, rect, item) {
                TileReaction::Opened
            } else {
                TileReaction::None
            }
        }
        _ => TileReaction::None,
    }
}

fn break_tile(
    world: &mut World,
    ctx: &mut CollisionContext,
    tile: Entity,
    by: Entity,
    rect: Rect,
    drop: Option<PickupKind>,
) {
    let position = rect.center();
    let count = ctx.config.spawning.fragment_count;
    for index in 0..count {
        ctx.spawner.spawn(
            world,
            SpawnRequest::new(tile, position, SpawnKind::Fragment { index, count }),
        );
    }
    if let Some(item) = drop {
        ctx.spawner.spawn(world, SpawnRequest::new(tile, position, SpawnKind::Item(item)));
    }
    world.destroy(tile);
    ctx.events.tile_broken.send(TileEvent { tile, by, position });
    log::debug!("tile {} broken by {}", tile, by);
}

/// Returns false if the container was already open.
fn open_container(
    world: &mut World,
    ctx: &mut CollisionContext,
    tile: Entity,
    by: Entity,
    rect: Rect,
    item: PickupKind,
) -> bool {
    match world.states.get_mut(tile) {
        Some(state) if state.is(Mode::Activated) => return false,
        Some(state) => state.mode = Mode::Activated,
        None => world.states.insert(tile, State::new(Mode::Activated)),
    }

    // Item pops out on top of the container
    let item_half = ctx.config.spawning.item_size / 2.0;
    let position = Vec2::new(rect.center().x, rect.top() - item_half);
    ctx.spawner.spawn(world, SpawnRequest::new(tile, position, SpawnKind::Item(item)));
    ctx.events.container_opened.send(TileEvent {
        tile,
        by,
        position: rect.center(),
    });
    log::debug!("container {} opened by {}", tile, by);
    true
}
