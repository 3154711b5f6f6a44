//! Multi-level dungeon generation split into coherent submodules.

pub mod geometry;
pub mod model;
pub mod params;

mod connect;
mod layout;
mod naming;
mod pipeline;
mod weights;

pub use geometry::{Pos, Rect};
pub use model::{
    ConnectionType, DungeonComplex, DungeonLevel, DungeonMetadata, LevelConnection, RoomLayout,
    RoomType, TileKind,
};
pub use params::{DifficultyProgression, DungeonParams, Theme};

use crate::error::GenerationError;
use crate::generator::{CancelToken, GeneratedContent, Generator};
use crate::params::{ContentType, GenerationParams};

/// Stateless dungeon generator; every call owns its own random stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct DungeonGenerator;

impl DungeonGenerator {
    pub const VERSION: &'static str = "1.0.0";
    /// Constraint-bag key holding the [`DungeonParams`].
    pub const PARAMS_KEY: &'static str = "dungeon";

    pub fn new() -> Self {
        Self
    }

    pub fn generate_dungeon(
        &self,
        seed: i64,
        params: &DungeonParams,
    ) -> Result<DungeonComplex, GenerationError> {
        self.generate_dungeon_with_cancel(seed, params, &CancelToken::new())
    }

    pub fn generate_dungeon_with_cancel(
        &self,
        seed: i64,
        params: &DungeonParams,
        cancel: &CancelToken,
    ) -> Result<DungeonComplex, GenerationError> {
        pipeline::generate_complex(seed, params, cancel)
    }
}

impl Generator for DungeonGenerator {
    fn generate_with_cancel(
        &self,
        params: &GenerationParams,
        cancel: &CancelToken,
    ) -> Result<GeneratedContent, GenerationError> {
        let dungeon_params = params.typed::<DungeonParams>(Self::PARAMS_KEY)?;
        let dungeon = self.generate_dungeon_with_cancel(params.seed, &dungeon_params, cancel)?;
        Ok(GeneratedContent::Dungeon(Box::new(dungeon)))
    }

    fn validate(&self, params: &GenerationParams) -> Result<(), GenerationError> {
        params.typed::<DungeonParams>(Self::PARAMS_KEY)?.validate()
    }

    fn content_type(&self) -> ContentType {
        ContentType::Dungeon
    }

    fn version(&self) -> &str {
        Self::VERSION
    }
}

pub fn generate_dungeon(
    seed: i64,
    params: &DungeonParams,
) -> Result<DungeonComplex, GenerationError> {
    DungeonGenerator::new().generate_dungeon(seed, params)
}
