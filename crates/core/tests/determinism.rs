use std::sync::Arc;
use std::thread;

use delve_core::dungeon::DifficultyProgression;
use delve_core::{
    ContentType, DungeonGenerator, DungeonParams, GenerationParams, Generator, RoomType, Theme,
    generate_dungeon,
};
use proptest::prelude::*;

fn params(level_count: u32, theme: Theme) -> DungeonParams {
    DungeonParams {
        level_count,
        level_width: 48,
        level_height: 36,
        rooms_per_level: 10,
        theme,
        difficulty: DifficultyProgression {
            base_difficulty: 1,
            scaling_factor: 2.0,
            max_difficulty: 15,
        },
        name: None,
    }
}

#[test]
fn test_determinism_identical_seeds_produce_identical_dungeons() {
    let first = generate_dungeon(12_345, &params(5, Theme::Mechanical)).expect("first run");
    let second = generate_dungeon(12_345, &params(5, Theme::Mechanical)).expect("second run");

    assert_eq!(first.canonical_bytes(), second.canonical_bytes());
    assert_eq!(first.levels, second.levels, "tile grids and rooms must match");
    assert_eq!(first.connections, second.connections);
    assert_eq!(first.metadata, second.metadata);
}

#[test]
fn test_determinism_different_seeds_produce_different_dungeons() {
    let first = generate_dungeon(123, &params(3, Theme::Classic)).expect("first run");
    let second = generate_dungeon(456, &params(3, Theme::Classic)).expect("second run");
    assert_ne!(first.fingerprint(), second.fingerprint());
}

#[test]
fn test_concurrent_calls_on_one_generator_do_not_interfere() {
    let generator = Arc::new(DungeonGenerator::new());
    let expected: Vec<u64> = (1..=4_i64)
        .map(|seed| {
            generator.generate_dungeon(seed, &params(4, Theme::Horror)).unwrap().fingerprint()
        })
        .collect();

    let handles: Vec<_> = (1..=4_i64)
        .map(|seed| {
            let generator = Arc::clone(&generator);
            thread::spawn(move || {
                generator.generate_dungeon(seed, &params(4, Theme::Horror)).unwrap().fingerprint()
            })
        })
        .collect();
    let concurrent: Vec<u64> =
        handles.into_iter().map(|handle| handle.join().expect("worker panicked")).collect();

    assert_eq!(concurrent, expected);
}

#[test]
fn test_generator_contract_is_deterministic_through_the_parameter_bag() {
    let generator = DungeonGenerator::new();
    let request = GenerationParams::new(2_026)
        .with_typed(DungeonGenerator::PARAMS_KEY, &params(4, Theme::Natural))
        .expect("params encode");
    assert_eq!(generator.content_type(), ContentType::Dungeon);

    let first = generator.generate(&request).unwrap().into_dungeon().unwrap();
    let second = generator.generate(&request).unwrap().into_dungeon().unwrap();
    assert_eq!(first.canonical_bytes(), second.canonical_bytes());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]
    #[test]
    fn generated_dungeons_hold_structural_invariants(
        seed in any::<i64>().prop_filter("non-zero", |seed| *seed != 0),
        level_count in 1_u32..=8,
        theme_selector in 0_u8..=4,
    ) {
        let theme = match theme_selector {
            0 => Theme::Classic,
            1 => Theme::Horror,
            2 => Theme::Magical,
            3 => Theme::Mechanical,
            _ => Theme::Natural,
        };
        let dungeon = generate_dungeon(seed, &params(level_count, theme)).unwrap();

        prop_assert_eq!(dungeon.levels.len(), level_count as usize);
        for (&number, level) in &dungeon.levels {
            prop_assert_eq!(number, level.level_number);
            prop_assert!(!level.rooms.is_empty());
            prop_assert_eq!(level.rooms[0].room_type, RoomType::Entrance);
            for (index, room) in level.rooms.iter().enumerate() {
                for other in &level.rooms[index + 1..] {
                    prop_assert!(!room.bounds.intersects(&other.bounds));
                }
            }
        }

        let adjacent: Vec<_> = dungeon
            .connections
            .iter()
            .filter(|connection| connection.to_level == connection.from_level + 1)
            .collect();
        prop_assert_eq!(adjacent.len(), level_count as usize - 1);
        let skips: Vec<_> = dungeon
            .connections
            .iter()
            .filter(|connection| connection.to_level != connection.from_level + 1)
            .collect();
        prop_assert!(skips.len() <= 1);
        for skip in &skips {
            prop_assert_eq!((skip.from_level, skip.to_level), (1, 3));
        }
        prop_assert_eq!(dungeon.metadata.skip_connection, !skips.is_empty());
        if level_count < 4 {
            prop_assert!(skips.is_empty());
        }

        let difficulties: Vec<i32> =
            dungeon.levels.values().map(|level| level.difficulty).collect();
        prop_assert!(difficulties.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
