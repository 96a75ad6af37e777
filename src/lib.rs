#![deny(missing_docs)]
//! A small, persistent store of client records, with a server and client that expose it
//! over TCP.
//!
//! A client record holds a name, the service the client contracted, an optional contact and
//! a free-form `extra` mapping. The whole collection lives in a single JSON file that is
//! re-read on every operation and replaced atomically on every write.
//!
//! ## Supported Operations
//! Every engine supports five operations:
//!
//! - `LIST` every record, in insertion order
//! - `GET` a record by id or by name
//! - `CREATE` a record from a mapping of fields
//! - `UPDATE` the fields present in a mapping
//! - `DELETE` a record, returning what was removed
//!
//! See the [`ClientEngine`] trait and the [`Request`] and [`Response`] types for more
//! information on the structure of these operations.
//!
//! ## Engines
//! - [`IndexedStore`] assigns integer ids and keeps the records in a JSON array. A key that
//!   parses as an integer is looked up by id, any other key by name, ignoring case.
//! - [`NamedStore`] keys the records by name in a JSON object and keeps a history of every
//!   create and update.
//!
//! ## Field aliases
//! Request mappings may spell a field in more than one way, for example `nombre` or `name`.
//! The accepted spellings and their precedence are listed in the [`fields`] module.
//!
//! ## Client / Server
//! [`CrsServer`] accepts TCP connections and serves each one on a thread from a
//! [`thread_pool`]. Requests and responses are JSON documents streamed over the socket;
//! a [`Response`] carries a status code (200, 201, 400, 404, 409 or 500) and a body.
//! [`CrsClient`] is the matching client.
//!
//! ### Executables
//! - `crs-server` runs the server
//! - `crs-client` sends single requests to a running server
//! - `crs` works on a data file directly, without a server

pub use client::CrsClient;
pub use command::{Request, Response};
pub use engine::{ClientEngine, IndexedStore, NamedStore, DEFAULT_SERVICE, META_KEY};
pub use error::{CrsError, Result};
pub use record::{HistoryEntry, Record};
pub use server::{handle, CrsServer};

mod client;
mod command;
pub mod config;
mod engine;
mod error;
pub mod fields;
mod record;
mod server;
pub mod thread_pool;
