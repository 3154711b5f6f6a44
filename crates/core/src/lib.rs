//! Deterministic procedural generation: hierarchical seed derivation, seeded
//! sampling and multi-level dungeon generation.
//!
//! Identical seed and parameters always produce an identical artifact.

pub mod context;
pub mod dungeon;
pub mod error;
pub mod generator;
pub mod params;
pub mod seed;
pub mod state_file;
pub mod stream;

pub use context::GenerationContext;
pub use dungeon::{
    DungeonComplex, DungeonGenerator, DungeonLevel, DungeonParams, RoomType, Theme,
    generate_dungeon,
};
pub use error::{AnchorError, GenerationError};
pub use generator::{CancelToken, GeneratedContent, Generator, GeneratorRegistry};
pub use params::{ContentType, GenerationParams};
pub use seed::{SeedManager, SeedState};
pub use state_file::SeedStateError;
pub use stream::SeededStream;
