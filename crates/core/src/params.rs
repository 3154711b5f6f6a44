//! Generic generation parameters and the content-type discriminator.
//!
//! Generator-specific parameters travel inside the `constraints` bag as JSON
//! values under a generator-owned key and are recovered with a type-checked
//! lookup. Everything in the bag influences the parameter seed; `metadata`
//! and `timeout` never do.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GenerationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Dungeon,
    Terrain,
    Item,
    Quest,
    Npc,
    Faction,
    Dialogue,
    Narrative,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dungeon => "dungeon",
            Self::Terrain => "terrain",
            Self::Item => "item",
            Self::Quest => "quest",
            Self::Npc => "npc",
            Self::Faction => "faction",
            Self::Dialogue => "dialogue",
            Self::Narrative => "narrative",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sole determinism input, used as given. Zero is an ordinary seed here; only
    /// `SeedManager::new` treats it as a request for a runtime seed.
    pub seed: i64,
    pub difficulty: i32,
    pub player_level: i32,
    /// Read-only snapshot of the surrounding world; not consulted by dungeon generation.
    #[serde(skip)]
    pub world_state: Option<Arc<Value>>,
    #[serde(default)]
    pub constraints: BTreeMap<String, Value>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Advisory only; nothing in this crate enforces it.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl GenerationParams {
    pub fn new(seed: i64) -> Self {
        Self { seed, difficulty: 1, player_level: 1, ..Self::default() }
    }

    /// Stores `value` in the constraint bag under `key`.
    pub fn with_typed<T: Serialize>(
        mut self,
        key: &str,
        value: &T,
    ) -> Result<Self, GenerationError> {
        let encoded = serde_json::to_value(value)
            .map_err(|source| GenerationError::InvalidParameter { key: key.to_owned(), source })?;
        self.constraints.insert(key.to_owned(), encoded);
        Ok(self)
    }

    /// Recovers a generator-specific parameter block from the constraint bag.
    pub fn typed<T: DeserializeOwned>(&self, key: &str) -> Result<T, GenerationError> {
        let value = self
            .constraints
            .get(key)
            .ok_or_else(|| GenerationError::MissingParameter { key: key.to_owned() })?;
        T::deserialize(value)
            .map_err(|source| GenerationError::InvalidParameter { key: key.to_owned(), source })
    }
}
