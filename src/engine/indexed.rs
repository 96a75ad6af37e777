use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use super::file::JsonFile;
use super::ClientEngine;
use crate::error::{CrsError, Result};
use crate::fields::{Patch, NAME_ALIASES, SERVICE_ALIASES};
use crate::Record;

/// The id-keyed client store.
///
/// Records are persisted as a JSON array in a single file. Every record gets an integer id
/// when it is created (the largest id in the store plus one) and can be looked up either by
/// that id or by its name.
///
/// On update, a supplied `extra` mapping replaces the stored one wholesale.
///
/// `IndexedStore` is cheap to clone; all clones share the same lock, so a process should
/// open one store per file and hand out clones of it.
#[derive(Debug, Clone)]
pub struct IndexedStore {
    file: JsonFile,
}

impl IndexedStore {
    /// creates an [`IndexedStore`] that persists its records in the file at `path`.
    /// The parent directory of `path` is created if it does not exist; the file itself is
    /// created on the first write.
    #[instrument]
    pub fn open(path: &Path) -> Result<IndexedStore> {
        info!("opening indexed client store");
        let file = JsonFile::open(path.to_path_buf())?;
        Ok(IndexedStore { file })
    }

    /// the path of the backing file
    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// reads every element of the stored array. Elements that do not parse as records are
    /// kept as [`Slot::Raw`] so that saving writes them back unchanged
    fn load(&self) -> Vec<Slot> {
        let values: Vec<Value> = self.file.load();
        values.into_iter().map(Slot::parse).collect()
    }
}

/// one element of the stored array
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Slot {
    Record(Record),
    Raw(Value),
}

impl Slot {
    fn parse(value: Value) -> Slot {
        match serde_json::from_value(value.clone()) {
            Ok(record) => Slot::Record(record),
            Err(e) => {
                warn!("skipping invalid client record {}: {}", value, e);
                Slot::Raw(value)
            }
        }
    }

    fn record(&self) -> Option<&Record> {
        match self {
            Slot::Record(record) => Some(record),
            Slot::Raw(_) => None,
        }
    }

    /// the id held by this element, skipped elements included
    fn id(&self) -> Option<i64> {
        match self {
            Slot::Record(record) => record.id,
            Slot::Raw(value) => value.get("id").and_then(Value::as_i64),
        }
    }
}

impl ClientEngine for IndexedStore {
    fn list(&self) -> Vec<Record> {
        let slots = {
            let _guard = self.file.lock();
            self.load()
        };
        slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Record(record) => Some(record),
                Slot::Raw(_) => None,
            })
            .collect()
    }

    fn get(&self, key: &str) -> Option<Record> {
        let slots = {
            let _guard = self.file.lock();
            self.load()
        };
        position(&slots, key).and_then(|idx| slots[idx].record().cloned())
    }

    fn create(&self, fields: &Map<String, Value>) -> Result<Record> {
        let patch = Patch::from_fields(fields)?;
        let (name, service) = match (patch.name, patch.service) {
            (Some(name), Some(service)) => (name, service),
            _ => {
                return Err(CrsError::Validation(format!(
                    "required fields: {} and {}",
                    NAME_ALIASES.join("/"),
                    SERVICE_ALIASES.join("/")
                )))
            }
        };

        let _guard = self.file.lock();
        let mut slots = self.load();
        let record = Record {
            id: Some(next_id(&slots)?),
            name,
            service,
            contact: patch.contact,
            extra: patch.extra.unwrap_or_default(),
            history: Vec::new(),
        };
        slots.push(Slot::Record(record.clone()));
        self.file.save(&slots)?;
        debug!(id = ?record.id, "created client");
        Ok(record)
    }

    fn update(&self, key: &str, fields: &Map<String, Value>) -> Result<Record> {
        let patch = Patch::from_fields(fields)?;
        if patch.is_empty() {
            debug!(key, "empty patch, nothing to update");
            return self.get(key).ok_or_else(|| not_found(key));
        }

        self.update_with(key, |record| {
            if let Some(name) = patch.name {
                record.name = name;
            }
            if let Some(service) = patch.service {
                record.service = service;
            }
            if let Some(contact) = patch.contact {
                record.contact = Some(contact);
            }
            if let Some(extra) = patch.extra {
                record.extra = extra;
            }
        })
    }

    fn update_with<F>(&self, key: &str, f: F) -> Result<Record>
    where
        F: FnOnce(&mut Record),
    {
        let _guard = self.file.lock();
        let mut slots = self.load();
        let idx = position(&slots, key).ok_or_else(|| not_found(key))?;

        let record = match &mut slots[idx] {
            Slot::Record(record) => record,
            Slot::Raw(_) => return Err(not_found(key)),
        };
        let id = record.id;
        f(record);
        record.id = id;
        record.history.clear();

        let updated = record.clone();
        self.file.save(&slots)?;
        debug!(id = ?updated.id, "updated client");
        Ok(updated)
    }

    fn delete(&self, key: &str) -> Result<Record> {
        let _guard = self.file.lock();
        let mut slots = self.load();
        let idx = position(&slots, key).ok_or_else(|| not_found(key))?;
        let removed = match slots.remove(idx) {
            Slot::Record(record) => record,
            Slot::Raw(_) => return Err(not_found(key)),
        };
        self.file.save(&slots)?;
        debug!(id = ?removed.id, "deleted client");
        Ok(removed)
    }
}

/// resolves `key` to an index into `slots`. Skipped elements never match.
///
/// A key that parses as an integer is only ever matched against ids, otherwise the first
/// record whose name equals `key` (ignoring case) is returned.
fn position(slots: &[Slot], key: &str) -> Option<usize> {
    let mut records = slots.iter().map(Slot::record);
    match key.parse::<i64>() {
        Ok(id) => records.position(|r| r.map_or(false, |r| r.id == Some(id))),
        Err(_) => records.position(|r| r.map_or(false, |r| r.name_matches(key))),
    }
}

/// the next free id: one more than the largest id in `slots`, and never less than 1.
/// Elements without a usable id are skipped.
fn next_id(slots: &[Slot]) -> Result<i64> {
    slots
        .iter()
        .filter_map(Slot::id)
        .max()
        .unwrap_or(0)
        .max(0)
        .checked_add(1)
        .ok_or_else(|| CrsError::StringErr("no client ids left to assign".to_string()))
}

fn not_found(key: &str) -> CrsError {
    CrsError::NotFound(format!("client not found: {}", key))
}
