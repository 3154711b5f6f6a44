//! Per-level room placement, room typing and corridor carving.

use crate::context::GenerationContext;

use super::geometry::{Pos, Rect, tile_index};
use super::model::{RoomLayout, RoomType, TileKind};
use super::params::Theme;
use super::weights::room_type_weights;

pub(super) const MIN_ROOM_SIZE: i32 = 5;
pub(super) const MAX_ROOM_SIZE: i32 = 12;
pub(super) const ROOM_PADDING: i32 = 2;
const PLACEMENT_ATTEMPTS_PER_ROOM: usize = 10;

/// Rejection-samples up to `target` non-overlapping rooms.
///
/// Gives up after `target * 10` attempts, so dense levels may come back short.
pub(super) fn place_rooms(
    context: &mut GenerationContext,
    width: usize,
    height: usize,
    target: usize,
) -> Vec<Rect> {
    let mut rooms: Vec<Rect> = Vec::with_capacity(target);
    for _ in 0..target * PLACEMENT_ATTEMPTS_PER_ROOM {
        if rooms.len() >= target {
            break;
        }
        let room_width = context.random_int_range(MIN_ROOM_SIZE, MAX_ROOM_SIZE);
        let room_height = context.random_int_range(MIN_ROOM_SIZE, MAX_ROOM_SIZE);
        let x = context.random_int_range(ROOM_PADDING, width as i32 - room_width - ROOM_PADDING);
        let y = context.random_int_range(ROOM_PADDING, height as i32 - room_height - ROOM_PADDING);
        let candidate = Rect::new(x, y, room_width, room_height);
        if rooms.iter().any(|existing| existing.intersects(&candidate)) {
            continue;
        }
        rooms.push(candidate);
    }
    rooms
}

/// First room is the entrance; the rest are drawn from the theme's weight table.
pub(super) fn assign_room_types(
    context: &mut GenerationContext,
    theme: Theme,
    room_count: usize,
) -> Vec<RoomType> {
    let table = room_type_weights(theme);
    (0..room_count)
        .map(|index| {
            if index == 0 {
                RoomType::Entrance
            } else {
                context.weighted_pick(&table).unwrap_or(RoomType::Combat)
            }
        })
        .collect()
}

pub(super) fn carve_room(tiles: &mut [TileKind], width: usize, bounds: Rect) {
    for pos in bounds.interior().positions() {
        tiles[tile_index(pos, width)] = TileKind::Floor;
    }
}

/// Links each room to the next one in placement order with an L-shaped corridor.
///
/// Returns the `(from, to)` index pairs that were joined.
pub(super) fn carve_room_corridors(
    tiles: &mut [TileKind],
    width: usize,
    rooms: &[Rect],
) -> Vec<(usize, usize)> {
    let mut links = Vec::with_capacity(rooms.len().saturating_sub(1));
    for (index, pair) in rooms.windows(2).enumerate() {
        let start = pair[0].center();
        let end = pair[1].center();
        carve_horizontal_line(tiles, width, start.y, start.x, end.x);
        carve_vertical_line(tiles, width, end.x, start.y, end.y);
        links.push((index, index + 1));
    }
    links
}

/// Turns corridor breaches in a room's wall ring into doors.
pub(super) fn mark_doors(tiles: &mut [TileKind], width: usize, bounds: Rect) -> Vec<Pos> {
    let mut doors = Vec::new();
    for pos in bounds.perimeter() {
        let index = tile_index(pos, width);
        if tiles[index] == TileKind::Floor {
            tiles[index] = TileKind::Door;
            doors.push(pos);
        }
    }
    doors
}

pub(super) fn build_room(
    id: usize,
    room_type: RoomType,
    bounds: Rect,
    doors: Vec<Pos>,
    level_difficulty: i32,
) -> RoomLayout {
    RoomLayout {
        id,
        room_type,
        bounds,
        tiles: bounds.interior().positions().collect(),
        doors,
        features: room_type.features().iter().map(|feature| (*feature).to_owned()).collect(),
        difficulty: (level_difficulty + room_type.difficulty_modifier()).max(1),
        connected_ids: Vec::new(),
    }
}

fn carve_horizontal_line(tiles: &mut [TileKind], width: usize, y: i32, left_x: i32, right_x: i32) {
    for x in left_x.min(right_x)..=left_x.max(right_x) {
        carve_tile(tiles, width, Pos { y, x });
    }
}

fn carve_vertical_line(tiles: &mut [TileKind], width: usize, x: i32, top_y: i32, bottom_y: i32) {
    for y in top_y.min(bottom_y)..=top_y.max(bottom_y) {
        carve_tile(tiles, width, Pos { y, x });
    }
}

fn carve_tile(tiles: &mut [TileKind], width: usize, pos: Pos) {
    let index = tile_index(pos, width);
    if tiles[index] == TileKind::Wall {
        tiles[index] = TileKind::Floor;
    }
}
