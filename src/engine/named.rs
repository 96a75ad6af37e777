use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use super::file::JsonFile;
use super::ClientEngine;
use crate::error::{CrsError, Result};
use crate::fields::{Patch, NAME_ALIASES};
use crate::{HistoryEntry, Record};

/// reserved document key holding format metadata, never a client
pub const META_KEY: &str = "_meta";

/// service stored when a client is created without one
pub const DEFAULT_SERVICE: &str = "unspecified";

const FORMAT_VERSION: u64 = 1;

/// The name-keyed client store.
///
/// Records are persisted as a single JSON object mapping client names to entries of the
/// form `{name, service, contact, data, history}`, next to a reserved `_meta` key. Clients
/// are looked up by their exact name only, and a name can be created once.
///
/// Every create and update appends an entry to the record's history. A supplied `extra`
/// mapping is merged key-by-key into the stored one.
#[derive(Debug, Clone)]
pub struct NamedStore {
    file: JsonFile,
}

/// a record as kept in the document. The client name doubles as the document key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Entry {
    name: String,
    service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact: Option<String>,
    data: Map<String, Value>,
    history: Vec<HistoryEntry>,
}

impl Entry {
    fn into_record(self, key: &str) -> Record {
        Record {
            id: None,
            name: key.to_string(),
            service: self.service,
            contact: self.contact,
            extra: self.data,
            history: self.history,
        }
    }

    fn push_history(&mut self, action: &str) {
        self.history.push(HistoryEntry {
            action: action.to_string(),
            service: self.service.clone(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
    }
}

impl From<Record> for Entry {
    fn from(record: Record) -> Self {
        Entry {
            name: record.name,
            service: record.service,
            contact: record.contact,
            data: record.extra,
            history: record.history,
        }
    }
}

impl NamedStore {
    /// creates a [`NamedStore`] that persists its records in the file at `path`.
    /// The parent directory of `path` is created if it does not exist.
    #[instrument]
    pub fn open(path: &Path) -> Result<NamedStore> {
        info!("opening named client store");
        let file = JsonFile::open(path.to_path_buf())?;
        Ok(NamedStore { file })
    }

    /// the path of the backing file
    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    fn save(&self, doc: Map<String, Value>) -> Result<()> {
        let doc = if doc.contains_key(META_KEY) {
            doc
        } else {
            let mut with_meta = Map::new();
            with_meta.insert(META_KEY.to_string(), json!({ "version": FORMAT_VERSION }));
            with_meta.extend(doc);
            with_meta
        };
        self.file.save(&doc)
    }
}

impl ClientEngine for NamedStore {
    fn list(&self) -> Vec<Record> {
        let doc: Map<String, Value> = {
            let _guard = self.file.lock();
            self.file.load()
        };
        doc.into_iter()
            .filter(|(key, _)| key != META_KEY)
            .filter_map(|(key, value)| entry(&key, value).map(|e| e.into_record(&key)))
            .collect()
    }

    fn get(&self, key: &str) -> Option<Record> {
        if key == META_KEY {
            return None;
        }
        let doc: Map<String, Value> = {
            let _guard = self.file.lock();
            self.file.load()
        };
        let value = doc.get(key)?.clone();
        entry(key, value).map(|e| e.into_record(key))
    }

    fn create(&self, fields: &Map<String, Value>) -> Result<Record> {
        let patch = Patch::from_fields(fields)?;
        let name = match patch.name {
            Some(name) if name != META_KEY => name,
            Some(_) => {
                return Err(CrsError::Validation(format!(
                    "{} is a reserved name",
                    META_KEY
                )))
            }
            None => {
                return Err(CrsError::Validation(format!(
                    "required field: {}",
                    NAME_ALIASES.join("/")
                )))
            }
        };

        let _guard = self.file.lock();
        let mut doc: Map<String, Value> = self.file.load();
        if doc.contains_key(&name) {
            return Err(CrsError::Conflict(format!("client already exists: {}", name)));
        }
        let mut new = Entry {
            name: name.clone(),
            service: patch.service.unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
            contact: patch.contact,
            data: patch.extra.unwrap_or_default(),
            history: Vec::new(),
        };
        new.push_history("create");
        doc.insert(name.clone(), serde_json::to_value(&new)?);
        self.save(doc)?;
        debug!(name = name.as_str(), "created client");
        Ok(new.into_record(&name))
    }

    fn update(&self, key: &str, fields: &Map<String, Value>) -> Result<Record> {
        let patch = Patch::from_fields(fields)?;

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
                record.extra.extend(extra);
            }
        })
    }

    fn update_with<F>(&self, key: &str, f: F) -> Result<Record>
    where
        F: FnOnce(&mut Record),
    {
        if key == META_KEY {
            return Err(not_found(key));
        }

        let _guard = self.file.lock();
        let doc: Map<String, Value> = self.file.load();
        let mut record = doc
            .get(key)
            .and_then(|value| entry(key, value.clone()))
            .map(|e| e.into_record(key))
            .ok_or_else(|| not_found(key))?;

        f(&mut record);
        record.id = None;
        if record.name.is_empty() {
            return Err(CrsError::Validation("name must not be empty".to_string()));
        }
        if record.name == META_KEY {
            return Err(CrsError::Validation(format!(
                "{} is a reserved name",
                META_KEY
            )));
        }
        if record.name != key && doc.contains_key(&record.name) {
            return Err(CrsError::Conflict(format!(
                "client already exists: {}",
                record.name
            )));
        }

        let mut current = Entry::from(record);
        current.push_history("update");
        let value = serde_json::to_value(&current)?;
        // renames keep the record at its position in the document
        let doc = doc
            .into_iter()
            .map(|(k, v)| {
                if k == key {
                    (current.name.clone(), value.clone())
                } else {
                    (k, v)
                }
            })
            .collect();
        self.save(doc)?;
        debug!(name = current.name.as_str(), "updated client");
        let name = current.name.clone();
        Ok(current.into_record(&name))
    }

    fn delete(&self, key: &str) -> Result<Record> {
        if key == META_KEY {
            return Err(not_found(key));
        }

        let _guard = self.file.lock();
        let mut doc: Map<String, Value> = self.file.load();
        let removed = doc
            .shift_remove(key)
            .and_then(|value| entry(key, value))
            .ok_or_else(|| not_found(key))?;
        self.save(doc)?;
        debug!(name = key, "deleted client");
        Ok(removed.into_record(key))
    }
}

/// parses the document value stored under `key`. Values that are not entries are skipped
fn entry(key: &str, value: Value) -> Option<Entry> {
    match serde_json::from_value(value) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("skipping invalid entry for {:?}: {}", key, e);
            None
        }
    }
}

fn not_found(key: &str) -> CrsError {
    CrsError::NotFound(format!("client not found: {}", key))
}
