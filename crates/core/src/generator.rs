//! The generator capability contract, cooperative cancellation and the registry.
//!
//! Every content generator implements [`Generator`] so a registry can invoke
//! it uniformly by [`ContentType`]. Cancellation is cooperative: generators
//! check a [`CancelToken`] at phase boundaries and return
//! [`GenerationError::Cancelled`] instead of an artifact.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::debug;

use crate::dungeon::DungeonComplex;
use crate::error::GenerationError;
use crate::params::{ContentType, GenerationParams};

#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Errors with the lazily built `stage` name once the token is cancelled.
    pub fn ensure_active(&self, stage: impl FnOnce() -> String) -> Result<(), GenerationError> {
        if self.is_cancelled() {
            return Err(GenerationError::Cancelled { stage: stage() });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[non_exhaustive]
pub enum GeneratedContent {
    Dungeon(Box<DungeonComplex>),
}

impl GeneratedContent {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Dungeon(_) => ContentType::Dungeon,
        }
    }

    pub fn into_dungeon(self) -> Option<DungeonComplex> {
        match self {
            Self::Dungeon(dungeon) => Some(*dungeon),
        }
    }
}

pub trait Generator: Send + Sync {
    fn generate_with_cancel(
        &self,
        params: &GenerationParams,
        cancel: &CancelToken,
    ) -> Result<GeneratedContent, GenerationError>;

    fn generate(&self, params: &GenerationParams) -> Result<GeneratedContent, GenerationError> {
        self.generate_with_cancel(params, &CancelToken::new())
    }

    fn validate(&self, params: &GenerationParams) -> Result<(), GenerationError>;

    fn content_type(&self) -> ContentType;

    fn version(&self) -> &str;
}

#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<ContentType, Arc<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `generator` under its own content type, returning any generator it replaced.
    pub fn register(&mut self, generator: Arc<dyn Generator>) -> Option<Arc<dyn Generator>> {
        let content_type = generator.content_type();
        debug!(%content_type, version = generator.version(), "generator registered");
        self.generators.insert(content_type, generator)
    }

    pub fn get(&self, content_type: ContentType) -> Option<Arc<dyn Generator>> {
        self.generators.get(&content_type).cloned()
    }

    pub fn content_types(&self) -> Vec<ContentType> {
        self.generators.keys().copied().collect()
    }

    pub fn generate(
        &self,
        content_type: ContentType,
        params: &GenerationParams,
        cancel: &CancelToken,
    ) -> Result<GeneratedContent, GenerationError> {
        let generator =
            self.get(content_type).ok_or(GenerationError::UnknownContentType(content_type))?;
        generator.validate(params)?;
        generator.generate_with_cancel(params, cancel)
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry").field("content_types", &self.content_types()).finish()
    }
}
