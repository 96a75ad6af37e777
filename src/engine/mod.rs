//! This module provides the client record storage engines.
//! Both engines persist the whole collection as a single JSON document and re-read it on
//! every operation:
//!
//! - [`IndexedStore`] keeps a JSON array of records keyed by an assigned integer id
//! - [`NamedStore`] keeps a JSON object keyed by client name, with a per-record history
//!
//! An installation uses exactly one of them.
use serde_json::{Map, Value};

use crate::{Record, Result};

/// A trait for the basic functionality of a client record storage engine
pub trait ClientEngine: Clone + Send + 'static {
    /// Returns every record, in insertion order.
    ///
    /// Unreadable or corrupt storage is treated as an empty collection.
    fn list(&self) -> Vec<Record>;

    /// Gets the record resolved by `key`
    ///
    /// Returns `None` if no record matches.
    fn get(&self, key: &str) -> Option<Record>;

    /// Creates a new record from the raw request `fields` and returns it
    ///
    /// # Errors
    ///
    /// Returns `CrsError::Validation` if a required field is missing, and
    /// `CrsError::Conflict` if the engine already holds a record with the same identity.
    fn create(&self, fields: &Map<String, Value>) -> Result<Record>;

    /// Applies the fields present in `fields` to the record resolved by `key` and returns
    /// the updated record
    ///
    /// # Errors
    ///
    /// Returns `CrsError::NotFound` if the given `key` is not found.
    fn update(&self, key: &str, fields: &Map<String, Value>) -> Result<Record>;

    /// Runs `f` on the record resolved by `key` and persists the result, all while holding
    /// the store lock, so concurrent read-modify-write sequences cannot lose updates.
    ///
    /// The id of the record cannot be changed.
    ///
    /// # Errors
    ///
    /// Returns `CrsError::NotFound` if the given `key` is not found.
    fn update_with<F>(&self, key: &str, f: F) -> Result<Record>
    where
        F: FnOnce(&mut Record);

    /// Removes the record resolved by `key` and returns it
    ///
    /// # Errors
    ///
    /// Returns `CrsError::NotFound` if the given `key` is not found.
    fn delete(&self, key: &str) -> Result<Record>;
}

mod file;
mod indexed;
mod named;

pub use self::indexed::IndexedStore;
pub use self::named::{NamedStore, DEFAULT_SERVICE, META_KEY};
