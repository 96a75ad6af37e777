use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::Result;

/// The backing JSON document of an engine, together with the lock that serializes access
/// to it. Clones share the same lock.
#[derive(Debug, Clone)]
pub(crate) struct JsonFile {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFile {
    /// creates the parent directory of `path` if needed
    pub(crate) fn open(path: PathBuf) -> Result<JsonFile> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        Ok(JsonFile {
            path,
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// acquires the store lock. The guard must be held for the whole load-mutate-save
    /// sequence of a write.
    ///
    /// A poisoned lock is recovered: the file on disk is the only state it protects.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// reads and parses the document. A missing, unreadable or corrupt file yields
    /// `T::default()`
    pub(crate) fn load<T: DeserializeOwned + Default>(&self) -> T {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{:?} does not exist yet", &self.path);
                return T::default();
            }
            Err(e) => {
                warn!("could not read {:?}, treating it as empty: {}", &self.path, e);
                return T::default();
            }
        };
        if contents.trim().is_empty() {
            return T::default();
        }
        match serde_json::from_str(&contents) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("{:?} is not a valid client document, treating it as empty: {}", &self.path, e);
                T::default()
            }
        }
    }

    /// replaces the document with `doc`.
    ///
    /// The document is written to a temporary file in the same directory, synced, and then
    /// renamed over the old file, so readers only ever see the old or the new contents.
    pub(crate) fn save<T: Serialize>(&self, doc: &T) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, doc)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        debug!("saved {:?}", &self.path);
        Ok(())
    }
}
