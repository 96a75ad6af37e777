//! Settings shared by the executables: which engine a data directory uses, and where its
//! data file lives.
//!
//! The engine chosen for a data directory is recorded in an `engine` file inside it. Once
//! recorded, opening the directory with a different engine is refused, since the two
//! engines persist incompatible documents.
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{info, warn};

use crate::{CrsError, Result};

/// the file, inside the data directory, holding the client document
pub const DEFAULT_DATA_FILE: &str = "clients.json";
/// the file, inside the data directory, recording the engine in use
pub const ENGINE_FILE: &str = "engine";
/// the data directory used when none is given
pub const DEFAULT_DATA_DIR: &str = "data";

/// The available storage engines
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineKind {
    /// [`IndexedStore`](../struct.IndexedStore.html)
    Indexed,
    /// [`NamedStore`](../struct.NamedStore.html)
    Named,
}

impl EngineKind {
    /// the names accepted by [`EngineKind::from_str`]
    pub const VARIANTS: &'static [&'static str] = &["indexed", "named"];
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Indexed => write!(f, "indexed"),
            EngineKind::Named => write!(f, "named"),
        }
    }
}

impl FromStr for EngineKind {
    type Err = CrsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "indexed" => Ok(EngineKind::Indexed),
            "named" => Ok(EngineKind::Named),
            other => Err(CrsError::Parsing(format!("unknown engine: {}", other))),
        }
    }
}

/// the path of the client document inside `data_dir`
pub fn data_file(data_dir: &Path) -> PathBuf {
    data_dir.join(DEFAULT_DATA_FILE)
}

/// determines if there is an engine file in `data_dir` and returns its value
///
/// returns `Ok(None)` if no engine file exists yet, or if its contents are invalid
pub fn current_engine(data_dir: &Path) -> Result<Option<EngineKind>> {
    let engine = data_dir.join(ENGINE_FILE);
    if !engine.exists() {
        return Ok(None);
    }

    match fs::read_to_string(engine)?.parse() {
        Ok(engine) => Ok(Some(engine)),
        Err(e) => {
            warn!("The content of the engine file is invalid: {}", e);
            Ok(None)
        }
    }
}

/// checks `requested` against the engine recorded in `data_dir` and records it if the
/// directory has none yet
///
/// # Errors
/// returns [`CrsError::Parsing`] if `data_dir` already uses a different engine
pub fn resolve_engine(data_dir: &Path, requested: Option<EngineKind>) -> Result<EngineKind> {
    let engine = match (current_engine(data_dir)?, requested) {
        (None, requested) => requested.unwrap_or(EngineKind::Indexed),
        (Some(current), None) => current,
        (Some(current), Some(requested)) if current == requested => current,
        (Some(current), Some(requested)) => {
            return Err(CrsError::Parsing(format!(
                "the requested engine: {} does not match the engine currently in use: {}",
                requested, current
            )))
        }
    };
    fs::create_dir_all(data_dir)?;
    fs::write(data_dir.join(ENGINE_FILE), engine.to_string())?;
    info!("Storage engine: {}", engine);
    Ok(engine)
}
