use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::MODEL_CACHE_DIR_NAME;

#[derive(Error, Debug)]
pub enum ModelLocateError {
    #[error("model file {0} does not exist")]
    Missing(PathBuf),
    #[error("model {name} not found in {searched}")]
    NotCached { name: String, searched: PathBuf },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Resolve a model file on local disk.
///
/// Resolution order:
/// 1. Explicit path (must exist)
/// 2. User model cache directory (platform-specific)
pub fn locate(name: &str, explicit: Option<&Path>) -> Result<PathBuf, ModelLocateError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(ModelLocateError::Missing(path.to_path_buf()))
        };
    }
    locate_in(name, &model_cache_dir()?)
}

fn locate_in(name: &str, dir: &Path) -> Result<PathBuf, ModelLocateError> {
    let candidate = dir.join(name);
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(ModelLocateError::NotCached {
            name: name.to_string(),
            searched: dir.to_path_buf(),
        })
    }
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Brodmann17/models/`
/// - Linux: `$XDG_CACHE_HOME/Brodmann17/models/` or `~/.cache/Brodmann17/models/`
/// - Windows: `%LOCALAPPDATA%/Brodmann17/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelLocateError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join(MODEL_CACHE_DIR_NAME).join("models"))
            .ok_or(ModelLocateError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join(MODEL_CACHE_DIR_NAME).join("models"))
            .ok_or(ModelLocateError::NoCacheDir)
    }
}
