use anyhow::{Result, bail, ensure};
use clap::Parser;
use delve_core::dungeon::DifficultyProgression;
use delve_core::{DungeonComplex, DungeonParams, RoomType, generate_dungeon};
use delve_tools::{ALL_THEMES, init_tracing};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Sweep seeds and check dungeon invariants", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    count: u32,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn in_range(rng: &mut ChaCha8Rng, min: u32, max: u32) -> u32 {
    min + (rng.next_u64() % u64::from(max - min + 1)) as u32
}

fn random_params(rng: &mut ChaCha8Rng) -> DungeonParams {
    DungeonParams {
        level_count: in_range(rng, 1, 20),
        level_width: in_range(rng, 20, 120),
        level_height: in_range(rng, 20, 120),
        rooms_per_level: in_range(rng, 3, 50),
        theme: choose(rng, &ALL_THEMES),
        difficulty: DifficultyProgression {
            base_difficulty: in_range(rng, 1, 5) as i32,
            scaling_factor: f64::from(in_range(rng, 0, 40)) / 4.0,
            max_difficulty: in_range(rng, 5, 50) as i32,
        },
        name: None,
    }
}

fn check(seed: i64, params: &DungeonParams) -> Result<DungeonComplex> {
    let dungeon = generate_dungeon(seed, params)?;
    let again = generate_dungeon(seed, params)?;
    ensure!(dungeon.canonical_bytes() == again.canonical_bytes(), "non-deterministic output");

    for level in dungeon.levels.values() {
        ensure!(
            level.rooms.first().map(|room| room.room_type) == Some(RoomType::Entrance),
            "level {} does not start with an entrance",
            level.level_number
        );
        for (index, room) in level.rooms.iter().enumerate() {
            for other in &level.rooms[index + 1..] {
                if room.bounds.intersects(&other.bounds) {
                    bail!(
                        "level {}: rooms {} and {} overlap",
                        level.level_number,
                        room.id,
                        other.id
                    );
                }
            }
        }
        ensure!(
            level.difficulty == params.difficulty.for_level(level.level_number),
            "level {} difficulty mismatch",
            level.level_number
        );
    }

    let expected_links =
        params.level_count as usize - 1 + usize::from(dungeon.metadata.skip_connection);
    ensure!(dungeon.connections.len() == expected_links, "unexpected connection count");
    if dungeon.metadata.skip_connection {
        let skip = &dungeon.connections[dungeon.connections.len() - 1];
        ensure!((skip.from_level, skip.to_level) == (1, 3), "skip connection must link 1 to 3");
    }
    Ok(dungeon)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    println!("Sweeping {} dungeons from seed {}...", args.count, args.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut under_provisioned = 0_u32;

    for iteration in 0..args.count {
        let params = random_params(&mut rng);
        let seed = match rng.next_u64() as i64 {
            0 => 1,
            seed => seed,
        };
        let dungeon = match check(seed, &params) {
            Ok(dungeon) => dungeon,
            Err(error) => {
                bail!("iteration {iteration} (seed {seed}, params {params:?}) failed: {error:#}")
            }
        };
        if dungeon.metadata.total_rooms < dungeon.metadata.rooms_requested {
            under_provisioned += 1;
        }
        info!(iteration, seed, fingerprint = dungeon.fingerprint(), "dungeon checked");
    }

    println!(
        "Sweep completed successfully. {under_provisioned} of {} dungeons placed fewer rooms \
         than requested.",
        args.count
    );
    Ok(())
}
