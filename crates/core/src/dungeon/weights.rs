//! Weight tables for room and connection typing.
//!
//! Tables are fixed-order arrays of `(key, weight)` pairs. Themes only
//! override weights in place, so the scan order is identical for every theme.

use super::model::{ConnectionType, RoomType};
use super::params::Theme;

pub(super) fn room_type_weights(theme: Theme) -> [(RoomType, f64); 8] {
    let mut table = [
        (RoomType::Combat, 30.0),
        (RoomType::Treasure, 15.0),
        (RoomType::Puzzle, 10.0),
        (RoomType::Trap, 15.0),
        (RoomType::Shop, 5.0),
        (RoomType::Rest, 10.0),
        (RoomType::Boss, 5.0),
        (RoomType::Secret, 10.0),
    ];
    let overrides: &[(RoomType, f64)] = match theme {
        Theme::Classic => &[],
        Theme::Horror => &[(RoomType::Combat, 40.0), (RoomType::Trap, 25.0), (RoomType::Rest, 5.0)],
        Theme::Magical => &[(RoomType::Puzzle, 20.0), (RoomType::Shop, 10.0)],
        Theme::Mechanical => &[(RoomType::Trap, 20.0), (RoomType::Puzzle, 15.0)],
        Theme::Natural => &[(RoomType::Rest, 15.0), (RoomType::Secret, 15.0)],
    };
    apply_overrides(&mut table, overrides);
    table
}

pub(super) fn connection_type_weights(theme: Theme) -> [(ConnectionType, f64); 6] {
    let mut table = [
        (ConnectionType::Stairs, 40.0),
        (ConnectionType::Ladder, 20.0),
        (ConnectionType::Pit, 10.0),
        (ConnectionType::Tunnel, 15.0),
        (ConnectionType::Elevator, 5.0),
        (ConnectionType::Portal, 5.0),
    ];
    let overrides: &[(ConnectionType, f64)] = match theme {
        Theme::Classic => &[],
        Theme::Horror => &[(ConnectionType::Pit, 25.0)],
        Theme::Magical => &[(ConnectionType::Portal, 35.0)],
        Theme::Mechanical => &[(ConnectionType::Elevator, 35.0)],
        Theme::Natural => &[(ConnectionType::Ladder, 30.0), (ConnectionType::Tunnel, 30.0)],
    };
    apply_overrides(&mut table, overrides);
    table
}

fn apply_overrides<K: PartialEq + Copy>(table: &mut [(K, f64)], overrides: &[(K, f64)]) {
    for &(key, weight) in overrides {
        if let Some(entry) = table.iter_mut().find(|(existing, _)| *existing == key) {
            entry.1 = weight;
        }
    }
}
