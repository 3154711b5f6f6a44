//! Linear dungeon pipeline: validate, build levels, connect levels, attach metadata.
//!
//! A single stream is seeded from the call seed and threaded through every
//! step as a local value. Draw order is levels `1..=N` (placement, then
//! typing), then adjacent connections in ascending level order, then the
//! optional skip connection. Changing that order changes every dungeon.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::context::GenerationContext;
use crate::error::GenerationError;
use crate::generator::CancelToken;

use super::connect::connect_levels;
use super::layout::{
    assign_room_types, build_room, carve_room, carve_room_corridors, mark_doors, place_rooms,
};
use super::model::{DungeonComplex, DungeonLevel, DungeonMetadata, LevelConnection, TileKind};
use super::naming::complex_name;
use super::params::DungeonParams;

const SKIP_CONNECTION_MIN_LEVELS: u32 = 4;
const SKIP_CONNECTION_PROBABILITY: f64 = 0.3;
const SKIP_FROM_LEVEL: u32 = 1;
const SKIP_TO_LEVEL: u32 = 3;

pub(super) fn generate_complex(
    seed: i64,
    params: &DungeonParams,
    cancel: &CancelToken,
) -> Result<DungeonComplex, GenerationError> {
    params.validate()?;
    info!(
        seed,
        level_count = params.level_count,
        theme = params.theme.as_str(),
        "generating dungeon"
    );

    let mut context = GenerationContext::from_seed(seed);
    let mut levels = generate_levels(&mut context, params, cancel)?;
    let (connections, has_skip_connection) =
        link_levels(&mut context, params, &mut levels, cancel)?;

    let total_rooms = levels.values().map(|level| level.rooms.len()).sum();
    let metadata = DungeonMetadata {
        seed,
        total_rooms,
        rooms_requested: (params.level_count * params.rooms_per_level) as usize,
        connection_count: connections.len(),
        skip_connection: has_skip_connection,
    };
    info!(
        seed,
        total_rooms,
        connection_count = metadata.connection_count,
        "dungeon generated"
    );

    Ok(DungeonComplex {
        id: format!("dungeon-{:016x}", seed as u64),
        name: params.name.clone().unwrap_or_else(|| complex_name(seed, params.theme)),
        levels,
        connections,
        theme: params.theme,
        difficulty_progression: params.difficulty,
        generated_at: Utc::now(),
        metadata,
    })
}

fn generate_levels(
    context: &mut GenerationContext,
    params: &DungeonParams,
    cancel: &CancelToken,
) -> Result<BTreeMap<u32, DungeonLevel>, GenerationError> {
    let mut levels = BTreeMap::new();
    for level_number in 1..=params.level_count {
        cancel.ensure_active(|| format!("level {level_number}"))?;
        levels.insert(level_number, generate_level(context, params, level_number));
    }
    Ok(levels)
}

/// Adjacent connections, then the optional skip connection, then anchor bookkeeping.
///
/// The flag reports whether the skip connection was made.
fn link_levels(
    context: &mut GenerationContext,
    params: &DungeonParams,
    levels: &mut BTreeMap<u32, DungeonLevel>,
    cancel: &CancelToken,
) -> Result<(Vec<LevelConnection>, bool), GenerationError> {
    cancel.ensure_active(|| "level connections".to_owned())?;
    let mut connections = connect_adjacent_levels(context, params, levels)?;
    let skip_connection = try_skip_connection(context, params, levels);
    let has_skip_connection = skip_connection.is_some();
    connections.extend(skip_connection);
    for connection in &connections {
        record_connection_points(levels, connection);
    }
    Ok((connections, has_skip_connection))
}

fn generate_level(
    context: &mut GenerationContext,
    params: &DungeonParams,
    level_number: u32,
) -> DungeonLevel {
    let width = params.level_width as usize;
    let height = params.level_height as usize;
    let difficulty = params.difficulty.for_level(level_number);
    let mut tiles = vec![TileKind::Wall; width * height];

    let target = params.rooms_per_level as usize;
    let bounds = place_rooms(context, width, height, target);
    if bounds.len() < target {
        warn!(level_number, placed = bounds.len(), target, "room placement fell short");
    }
    let room_types = assign_room_types(context, params.theme, bounds.len());

    for &room in &bounds {
        carve_room(&mut tiles, width, room);
    }
    let links = carve_room_corridors(&mut tiles, width, &bounds);

    let mut rooms: Vec<_> = bounds
        .iter()
        .zip(room_types)
        .enumerate()
        .map(|(id, (&room_bounds, room_type))| {
            let doors = mark_doors(&mut tiles, width, room_bounds);
            build_room(id, room_type, room_bounds, doors, difficulty)
        })
        .collect();
    for (from, to) in links {
        rooms[from].connected_ids.push(to);
        rooms[to].connected_ids.push(from);
    }

    debug!(level_number, difficulty, rooms = rooms.len(), "level generated");
    DungeonLevel {
        level_number,
        width,
        height,
        tiles,
        rooms,
        connection_points: Vec::new(),
        theme: params.theme,
        difficulty,
    }
}

fn connect_adjacent_levels(
    context: &mut GenerationContext,
    params: &DungeonParams,
    levels: &BTreeMap<u32, DungeonLevel>,
) -> Result<Vec<LevelConnection>, GenerationError> {
    let level_numbers: Vec<u32> = levels.keys().copied().collect();
    let mut connections = Vec::with_capacity(level_numbers.len().saturating_sub(1));
    for pair in level_numbers.windows(2) {
        let (from_level, to_level) = (pair[0], pair[1]);
        let connection = connect_levels(context, levels, params.theme, from_level, to_level)
            .map_err(|source| GenerationError::GenerationFailure {
                operation: "connect levels",
                from_level,
                to_level,
                source,
            })?;
        debug!(from_level, to_level, kind = ?connection.connection_type, "levels connected");
        connections.push(connection);
    }
    Ok(connections)
}

/// Best effort: a failed skip connection is logged and dropped.
fn try_skip_connection(
    context: &mut GenerationContext,
    params: &DungeonParams,
    levels: &BTreeMap<u32, DungeonLevel>,
) -> Option<LevelConnection> {
    if params.level_count < SKIP_CONNECTION_MIN_LEVELS
        || !context.chance(SKIP_CONNECTION_PROBABILITY)
    {
        return None;
    }
    match connect_levels(context, levels, params.theme, SKIP_FROM_LEVEL, SKIP_TO_LEVEL) {
        Ok(connection) => Some(connection),
        Err(error) => {
            warn!(%error, "optional skip connection abandoned");
            None
        }
    }
}

fn record_connection_points(
    levels: &mut BTreeMap<u32, DungeonLevel>,
    connection: &LevelConnection,
) {
    if let Some(level) = levels.get_mut(&connection.from_level) {
        level.connection_points.push(connection.from_position);
    }
    if let Some(level) = levels.get_mut(&connection.to_level) {
        level.connection_points.push(connection.to_position);
    }
}
