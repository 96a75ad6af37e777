use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{CrsError, Record};

/// These are the request "commands" that can be made to a crs-server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// check that the server is up
    Health,
    /// list every client
    List,
    /// get a single client
    Get {
        /// an id, or a client name
        key: String,
    },
    /// create a client
    Create {
        /// the raw request body
        fields: Value,
    },
    /// update a client
    Update {
        /// an id, or a client name
        key: String,
        /// the raw request body
        fields: Value,
    },
    /// delete a client
    Delete {
        /// an id, or a client name
        key: String,
    },
}

/// The response types that can be returned for any crs [`Request`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// this variant is returned when a request was successful
    Ok {
        /// 200, or 201 for a created client
        status: u16,
        /// the response envelope
        body: Value,
    },
    /// this variant is returned if an Error occurs while processing the request
    Err {
        /// 400, 404, 409 or 500
        status: u16,
        /// a description of the error
        error: String,
    },
}

impl Response {
    /// the status code of this response
    pub fn status(&self) -> u16 {
        match self {
            Response::Ok { status, .. } | Response::Err { status, .. } => *status,
        }
    }

    pub(crate) fn health() -> Response {
        Response::Ok {
            status: 200,
            body: json!({ "ok": true, "message": "client manager running" }),
        }
    }

    pub(crate) fn list(records: Vec<Record>) -> Response {
        Response::Ok {
            status: 200,
            body: json!(records),
        }
    }

    pub(crate) fn record(record: Record) -> Response {
        Response::Ok {
            status: 200,
            body: json!(record),
        }
    }

    pub(crate) fn created(record: Record) -> Response {
        Response::Ok {
            status: 201,
            body: json!({ "message": "client created", "client": record }),
        }
    }

    pub(crate) fn updated(record: Record) -> Response {
        Response::Ok {
            status: 200,
            body: json!({ "message": "client updated", "client": record }),
        }
    }

    pub(crate) fn deleted(record: Record) -> Response {
        Response::Ok {
            status: 200,
            body: json!({ "ok": true, "message": "client deleted", "client": record }),
        }
    }
}

impl From<CrsError> for Response {
    fn from(e: CrsError) -> Self {
        Response::Err {
            status: e.status(),
            error: e.to_string(),
        }
    }
}

/// turns a raw request body into the field mapping handed to an engine.
/// Anything other than a JSON object counts as an empty body.
pub(crate) fn body_fields(fields: Value) -> Map<String, Value> {
    match fields {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
