use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use delve_core::{
    CancelToken, ContentType, DungeonComplex, DungeonGenerator, DungeonParams, GenerationParams,
    GeneratorRegistry, SeedManager, SeedState,
};
use delve_tools::{ThemeArg, init_tracing};
use tracing::info;

const DEFAULT_SEED: i64 = 12_345;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Summary,
    Ascii,
    Json,
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate a deterministic multi-level dungeon",
    long_about = None
)]
struct Args {
    /// Generation seed [default: 12345]. Used as given, except that with
    /// `--context` a zero asks the seed manager for a non-reproducible runtime seed.
    #[arg(short, long)]
    seed: Option<i64>,
    /// TOML file with dungeon parameters; flags below override its fields
    #[arg(short, long)]
    params: Option<PathBuf>,
    #[arg(long)]
    levels: Option<u32>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    rooms: Option<u32>,
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,
    #[arg(long)]
    name: Option<String>,
    /// Derive the dungeon seed from this context name through a seed manager
    #[arg(long)]
    context: Option<String>,
    /// Seed-manager state file, loaded if present and saved after derivation
    #[arg(long, requires = "context")]
    seed_state: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let dungeon_params = resolve_params(&args)?;
    let seed = resolve_seed(&args, &dungeon_params)?;

    let mut registry = GeneratorRegistry::new();
    registry.register(Arc::new(DungeonGenerator::new()));

    let request = GenerationParams::new(seed)
        .with_typed(DungeonGenerator::PARAMS_KEY, &dungeon_params)
        .context("Failed to encode dungeon parameters")?;
    let dungeon = registry
        .generate(ContentType::Dungeon, &request, &CancelToken::new())
        .context("Dungeon generation failed")?
        .into_dungeon()
        .context("Generator returned a non-dungeon artifact")?;

    match args.format {
        OutputFormat::Summary => print_summary(&dungeon),
        OutputFormat::Ascii => {
            for level in dungeon.levels.values() {
                println!("Level {} (difficulty {})", level.level_number, level.difficulty);
                print!("{}", level.render_ascii());
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&dungeon)
                .context("Failed to serialize dungeon to JSON")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn resolve_params(args: &Args) -> Result<DungeonParams> {
    let mut params: DungeonParams = match &args.params {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read params file: {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse params file: {}", path.display()))?
        }
        None => DungeonParams::default(),
    };

    if let Some(levels) = args.levels {
        params.level_count = levels;
    }
    if let Some(width) = args.width {
        params.level_width = width;
    }
    if let Some(height) = args.height {
        params.level_height = height;
    }
    if let Some(rooms) = args.rooms {
        params.rooms_per_level = rooms;
    }
    if let Some(theme) = args.theme {
        params.theme = theme.into();
    }
    if let Some(name) = &args.name {
        params.name = Some(name.clone());
    }

    if let Err(error) = params.validate() {
        bail!("Invalid dungeon parameters: {error}");
    }
    Ok(params)
}

fn resolve_seed(args: &Args, params: &DungeonParams) -> Result<i64> {
    let Some(context_name) = &args.context else {
        return Ok(args.seed.unwrap_or(DEFAULT_SEED));
    };

    let manager = match &args.seed_state {
        Some(path) if path.exists() => {
            let state = SeedState::load(path).context("Failed to load seed state")?;
            check_loaded_seed(args.seed, &state)?;
            SeedManager::from_state(state)
        }
        _ => SeedManager::new(args.seed.unwrap_or(DEFAULT_SEED)),
    };

    let request = GenerationParams::new(manager.base_seed())
        .with_typed(DungeonGenerator::PARAMS_KEY, params)
        .context("Failed to encode dungeon parameters")?;
    let stream = manager.create_rng(ContentType::Dungeon.as_str(), context_name, &request);
    info!(context = %context_name, seed = stream.seed(), "derived dungeon seed");

    if let Some(path) = &args.seed_state {
        manager
            .state()
            .write_atomic(path)
            .with_context(|| format!("Failed to save seed state: {}", path.display()))?;
    }
    Ok(stream.seed())
}

/// A saved state owns its base seed; an explicit `--seed` must agree with it.
fn check_loaded_seed(requested: Option<i64>, state: &SeedState) -> Result<()> {
    match requested {
        Some(seed) if seed != state.base_seed => bail!(
            "--seed {seed} conflicts with base seed {} in the seed-state file",
            state.base_seed
        ),
        _ => Ok(()),
    }
}

fn print_summary(dungeon: &DungeonComplex) {
    println!("{} ({})", dungeon.name, dungeon.id);
    println!("Theme: {}", dungeon.theme.as_str());
    println!("Seed: {}", dungeon.metadata.seed);
    println!(
        "Rooms: {} of {} requested",
        dungeon.metadata.total_rooms, dungeon.metadata.rooms_requested
    );
    for level in dungeon.levels.values() {
        let types: Vec<String> =
            level.rooms.iter().map(|room| format!("{:?}", room.room_type)).collect();
        println!(
            "  Level {:>2}: difficulty {:>3}, {:>2} rooms [{}]",
            level.level_number,
            level.difficulty,
            level.rooms.len(),
            types.join(", ")
        );
    }
    println!("Connections: {}", dungeon.metadata.connection_count);
    for connection in &dungeon.connections {
        println!(
            "  {} -> {} via {:?} at ({}, {}) -> ({}, {})",
            connection.from_level,
            connection.to_level,
            connection.connection_type,
            connection.from_position.x,
            connection.from_position.y,
            connection.to_position.x,
            connection.to_position.y
        );
    }
    println!("Fingerprint: {:016x}", dungeon.fingerprint());
}
