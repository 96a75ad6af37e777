use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single client record, as returned by every [`ClientEngine`] operation.
///
/// `extra` is opaque to the store: it is never validated or interpreted, only replaced or
/// merged as a whole mapping.
///
/// Records written by older versions of the service used the keys `nombre`, `servicio`,
/// `correo` and `data`. Those are still accepted when loading, but a record is always
/// serialized with its canonical keys.
///
/// [`ClientEngine`]: ./engine/trait.ClientEngine.html
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// the record identifier. `None` for records of the name-keyed engine, and for
    /// historical records whose id is missing or not an integer
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,

    /// the client name
    #[serde(default, alias = "nombre")]
    pub name: String,

    /// the service contracted by the client
    #[serde(default, alias = "servicio")]
    pub service: String,

    /// optional contact (usually an email address)
    #[serde(
        default,
        alias = "correo",
        alias = "email",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact: Option<String>,

    /// arbitrary caller data
    #[serde(default, alias = "data", deserialize_with = "nullable_map")]
    pub extra: Map<String, Value>,

    /// create/update history, only kept by the name-keyed engine
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
}

impl Record {
    /// returns `true` if this record's name equals `name`, ignoring case
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// One entry of a record's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// either "create" or "update"
    pub action: String,
    /// the service value after the action was applied
    pub service: String,
    /// RFC 3339 UTC timestamp of the action
    pub timestamp: String,
}

// ids that are missing, fractional or not numbers at all are treated as absent
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_i64())
}

// a stored `null` is an empty mapping
fn nullable_map<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}
