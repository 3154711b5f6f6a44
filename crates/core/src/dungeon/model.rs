//! Generated dungeon artifact: levels, rooms, tile grids and inter-level links.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use super::geometry::{Pos, Rect, in_bounds, tile_index};
use super::params::{DifficultyProgression, Theme};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Wall,
    Floor,
    Door,
}

impl TileKind {
    pub fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Door)
    }

    fn code(self) -> u8 {
        match self {
            Self::Wall => 0,
            Self::Floor => 1,
            Self::Door => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Entrance,
    Combat,
    Treasure,
    Puzzle,
    Trap,
    Shop,
    Rest,
    Boss,
    Secret,
}

impl RoomType {
    /// Whether an inter-level connection may be anchored in a room of this type.
    pub fn can_host_connection(self) -> bool {
        !matches!(self, Self::Boss | Self::Secret)
    }

    pub(super) fn difficulty_modifier(self) -> i32 {
        match self {
            Self::Entrance | Self::Shop | Self::Rest => -1,
            Self::Combat | Self::Treasure | Self::Puzzle => 0,
            Self::Trap | Self::Secret => 1,
            Self::Boss => 3,
        }
    }

    pub(super) fn features(self) -> &'static [&'static str] {
        match self {
            Self::Entrance => &["entry_marker"],
            Self::Combat => &["spawn_point"],
            Self::Treasure => &["chest"],
            Self::Puzzle => &["pressure_plate", "sealed_gate"],
            Self::Trap => &["trap_trigger"],
            Self::Shop => &["merchant_stall"],
            Self::Rest => &["campfire"],
            Self::Boss => &["boss_arena"],
            Self::Secret => &["hidden_cache"],
        }
    }

    fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Stairs,
    Ladder,
    Pit,
    Tunnel,
    Elevator,
    Portal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLayout {
    pub id: usize,
    pub room_type: RoomType,
    pub bounds: Rect,
    /// Floor positions of the carved interior.
    pub tiles: Vec<Pos>,
    pub doors: Vec<Pos>,
    pub features: Vec<String>,
    pub difficulty: i32,
    pub connected_ids: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonLevel {
    pub level_number: u32,
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` tiles.
    pub tiles: Vec<TileKind>,
    pub rooms: Vec<RoomLayout>,
    pub connection_points: Vec<Pos>,
    pub theme: Theme,
    pub difficulty: i32,
}

impl DungeonLevel {
    /// Out-of-bounds positions read as wall.
    pub fn tile_at(&self, pos: Pos) -> TileKind {
        if !in_bounds(self.width, self.height, pos) {
            return TileKind::Wall;
        }
        self.tiles[tile_index(pos, self.width)]
    }

    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { y: y as i32, x: x as i32 };
                let glyph = if self.connection_points.contains(&pos) {
                    '>'
                } else {
                    match self.tile_at(pos) {
                        TileKind::Wall => '#',
                        TileKind::Floor => '.',
                        TileKind::Door => '+',
                    }
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConnection {
    pub from_level: u32,
    pub to_level: u32,
    pub from_position: Pos,
    pub to_position: Pos,
    pub connection_type: ConnectionType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonMetadata {
    pub seed: i64,
    pub total_rooms: usize,
    /// `level_count * rooms_per_level`; more than `total_rooms` means placement fell short.
    pub rooms_requested: usize,
    pub connection_count: usize,
    pub skip_connection: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DungeonComplex {
    pub id: String,
    pub name: String,
    pub levels: BTreeMap<u32, DungeonLevel>,
    pub connections: Vec<LevelConnection>,
    pub theme: Theme,
    pub difficulty_progression: DifficultyProgression,
    pub generated_at: DateTime<Utc>,
    pub metadata: DungeonMetadata,
}

impl DungeonComplex {
    pub fn level(&self, level_number: u32) -> Option<&DungeonLevel> {
        self.levels.get(&level_number)
    }

    pub fn total_rooms(&self) -> usize {
        self.levels.values().map(|level| level.rooms.len()).sum()
    }

    /// Stable encoding of everything the determinism contract covers.
    ///
    /// `generated_at` is wall-clock time and is excluded.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        push_str(&mut bytes, &self.id);
        push_str(&mut bytes, &self.name);
        push_str(&mut bytes, self.theme.as_str());
        bytes.extend(self.difficulty_progression.base_difficulty.to_le_bytes());
        bytes.extend(self.difficulty_progression.scaling_factor.to_bits().to_le_bytes());
        bytes.extend(self.difficulty_progression.max_difficulty.to_le_bytes());

        bytes.extend((self.levels.len() as u32).to_le_bytes());
        for level in self.levels.values() {
            bytes.extend(level.level_number.to_le_bytes());
            bytes.extend((level.width as u32).to_le_bytes());
            bytes.extend((level.height as u32).to_le_bytes());
            bytes.extend(level.difficulty.to_le_bytes());
            bytes.extend(level.tiles.iter().map(|tile| tile.code()));

            bytes.extend((level.rooms.len() as u32).to_le_bytes());
            for room in &level.rooms {
                bytes.extend((room.id as u32).to_le_bytes());
                bytes.push(room.room_type.code());
                push_rect(&mut bytes, room.bounds);
                bytes.extend(room.difficulty.to_le_bytes());
                push_positions(&mut bytes, &room.doors);
                bytes.extend((room.connected_ids.len() as u32).to_le_bytes());
                for &id in &room.connected_ids {
                    bytes.extend((id as u32).to_le_bytes());
                }
            }
            push_positions(&mut bytes, &level.connection_points);
        }

        bytes.extend((self.connections.len() as u32).to_le_bytes());
        for connection in &self.connections {
            bytes.extend(connection.from_level.to_le_bytes());
            bytes.extend(connection.to_level.to_le_bytes());
            push_pos(&mut bytes, connection.from_position);
            push_pos(&mut bytes, connection.to_position);
            bytes.push(connection.connection_type as u8);
        }

        bytes.extend(self.metadata.seed.to_le_bytes());
        bytes.extend((self.metadata.total_rooms as u32).to_le_bytes());
        bytes.extend((self.metadata.rooms_requested as u32).to_le_bytes());
        bytes.extend((self.metadata.connection_count as u32).to_le_bytes());
        bytes.push(u8::from(self.metadata.skip_connection));
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

fn push_str(bytes: &mut Vec<u8>, value: &str) {
    bytes.extend((value.len() as u32).to_le_bytes());
    bytes.extend(value.as_bytes());
}

fn push_pos(bytes: &mut Vec<u8>, pos: Pos) {
    bytes.extend(pos.y.to_le_bytes());
    bytes.extend(pos.x.to_le_bytes());
}

fn push_positions(bytes: &mut Vec<u8>, positions: &[Pos]) {
    bytes.extend((positions.len() as u32).to_le_bytes());
    for &pos in positions {
        push_pos(bytes, pos);
    }
}

fn push_rect(bytes: &mut Vec<u8>, rect: Rect) {
    bytes.extend(rect.x.to_le_bytes());
    bytes.extend(rect.y.to_le_bytes());
    bytes.extend(rect.width.to_le_bytes());
    bytes.extend(rect.height.to_le_bytes());
}
