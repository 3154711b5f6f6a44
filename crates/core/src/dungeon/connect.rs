//! Inter-level connectivity: anchor rooms, anchor tiles and connection typing.

use std::collections::BTreeMap;

use crate::context::GenerationContext;
use crate::error::AnchorError;

use super::geometry::Pos;
use super::model::{ConnectionType, DungeonLevel, LevelConnection, RoomLayout, TileKind};
use super::params::Theme;
use super::weights::connection_type_weights;

pub(super) const ANCHOR_ATTEMPTS: usize = 50;

/// Builds one connection between two existing levels.
///
/// Draw order: source room, source tile, target room, target tile, type.
pub(super) fn connect_levels(
    context: &mut GenerationContext,
    levels: &BTreeMap<u32, DungeonLevel>,
    theme: Theme,
    from_level: u32,
    to_level: u32,
) -> Result<LevelConnection, AnchorError> {
    let from = levels.get(&from_level).ok_or(AnchorError::MissingLevel { level: from_level })?;
    let to = levels.get(&to_level).ok_or(AnchorError::MissingLevel { level: to_level })?;

    let from_position = find_anchor(context, from)?;
    let to_position = find_anchor(context, to)?;
    let connection_type = context
        .weighted_pick(&connection_type_weights(theme))
        .unwrap_or(ConnectionType::Stairs);

    Ok(LevelConnection { from_level, to_level, from_position, to_position, connection_type })
}

fn find_anchor(context: &mut GenerationContext, level: &DungeonLevel) -> Result<Pos, AnchorError> {
    let candidates: Vec<&RoomLayout> =
        level.rooms.iter().filter(|room| room.room_type.can_host_connection()).collect();
    let room = context
        .random_choice(&candidates)
        .copied()
        .ok_or(AnchorError::NoCandidateRooms { level: level.level_number })?;

    let interior = room.bounds.interior();
    for _ in 0..ANCHOR_ATTEMPTS {
        let pos = Pos {
            x: context.random_int_range(interior.x, interior.right() - 1),
            y: context.random_int_range(interior.y, interior.bottom() - 1),
        };
        let tile = level.tile_at(pos);
        if tile == TileKind::Floor && tile.is_walkable() {
            return Ok(pos);
        }
    }
    Err(AnchorError::AttemptsExhausted {
        level: level.level_number,
        room_id: room.id,
        attempts: ANCHOR_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::geometry::Rect;
    use crate::dungeon::model::RoomType;

    fn level_with(level_number: u32, rooms: Vec<(RoomType, Rect)>, fill: TileKind) -> DungeonLevel {
        let width = 30;
        let height = 30;
        let mut tiles = vec![TileKind::Wall; width * height];
        let mut layouts = Vec::new();
        for (id, (room_type, bounds)) in rooms.into_iter().enumerate() {
            for pos in bounds.interior().positions() {
                tiles[(pos.y as usize) * width + pos.x as usize] = fill;
            }
            layouts.push(RoomLayout {
                id,
                room_type,
                bounds,
                tiles: bounds.interior().positions().collect(),
                doors: Vec::new(),
                features: Vec::new(),
                difficulty: 1,
                connected_ids: Vec::new(),
            });
        }
        DungeonLevel {
            level_number,
            width,
            height,
            tiles,
            rooms: layouts,
            connection_points: Vec::new(),
            theme: Theme::Classic,
            difficulty: 1,
        }
    }

    fn pair(first: DungeonLevel, second: DungeonLevel) -> BTreeMap<u32, DungeonLevel> {
        BTreeMap::from([(first.level_number, first), (second.level_number, second)])
    }

    #[test]
    fn anchors_land_on_floor_inside_eligible_rooms() {
        let boss = Rect::new(2, 2, 8, 8);
        let combat = Rect::new(15, 15, 8, 8);
        let levels = pair(
            level_with(1, vec![(RoomType::Boss, boss), (RoomType::Combat, combat)], TileKind::Floor),
            level_with(2, vec![(RoomType::Entrance, combat)], TileKind::Floor),
        );
        let mut context = GenerationContext::from_seed(99);
        for _ in 0..20 {
            let connection =
                connect_levels(&mut context, &levels, Theme::Classic, 1, 2).unwrap();
            assert!(combat.interior().contains(connection.from_position));
            assert!(combat.interior().contains(connection.to_position));
        }
    }

    #[test]
    fn only_ineligible_rooms_is_an_error() {
        let levels = pair(
            level_with(1, vec![(RoomType::Secret, Rect::new(2, 2, 8, 8))], TileKind::Floor),
            level_with(2, vec![(RoomType::Entrance, Rect::new(2, 2, 8, 8))], TileKind::Floor),
        );
        let mut context = GenerationContext::from_seed(1);
        let err = connect_levels(&mut context, &levels, Theme::Classic, 1, 2).unwrap_err();
        assert_eq!(err, AnchorError::NoCandidateRooms { level: 1 });
    }

    #[test]
    fn rooms_without_floor_exhaust_the_attempt_budget() {
        let levels = pair(
            level_with(1, vec![(RoomType::Entrance, Rect::new(2, 2, 8, 8))], TileKind::Floor),
            level_with(2, vec![(RoomType::Entrance, Rect::new(2, 2, 8, 8))], TileKind::Door),
        );
        let mut context = GenerationContext::from_seed(1);
        let err = connect_levels(&mut context, &levels, Theme::Classic, 1, 2).unwrap_err();
        assert_eq!(err, AnchorError::AttemptsExhausted { level: 2, room_id: 0, attempts: 50 });
    }

    #[test]
    fn missing_level_is_reported() {
        let levels = pair(
            level_with(1, vec![(RoomType::Entrance, Rect::new(2, 2, 8, 8))], TileKind::Floor),
            level_with(2, vec![(RoomType::Entrance, Rect::new(2, 2, 8, 8))], TileKind::Floor),
        );
        let mut context = GenerationContext::from_seed(1);
        let err = connect_levels(&mut context, &levels, Theme::Classic, 1, 3).unwrap_err();
        assert_eq!(err, AnchorError::MissingLevel { level: 3 });
    }
}
