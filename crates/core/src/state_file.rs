//! Atomic JSON persistence for [`SeedState`].

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::seed::SeedState;

#[derive(Debug, Error)]
pub enum SeedStateError {
    #[error("seed state I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("seed state in {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SeedState {
    /// Writes to a sibling temp file, then renames it over `path`.
    pub fn write_atomic(&self, path: &Path) -> Result<(), SeedStateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| io_error(path, source))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(|source| json_error(path, source))?;

        fs::write(&tmp_path, json).map_err(|source| io_error(&tmp_path, source))?;
        fs::rename(&tmp_path, path).map_err(|source| io_error(path, source))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SeedStateError> {
        let content = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
        serde_json::from_str(&content).map_err(|source| json_error(path, source))
    }
}

fn io_error(path: &Path, source: io::Error) -> SeedStateError {
    SeedStateError::Io { path: path.display().to_string(), source }
}

fn json_error(path: &Path, source: serde_json::Error) -> SeedStateError {
    SeedStateError::Json { path: path.display().to_string(), source }
}
