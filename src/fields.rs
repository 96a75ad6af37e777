//! Extraction of the mutable record fields from a raw request mapping.
//!
//! Every logical field can be supplied under more than one name. The accepted names, and the
//! order in which they are tried, are kept as data in the `*_ALIASES` constants: the first
//! alias holding a value that is neither `null` nor an empty string wins.
use serde_json::{Map, Value};

use crate::error::{CrsError, Result};

/// accepted names for the client name, in lookup order
pub const NAME_ALIASES: &[&str] = &["nombre", "name"];
/// accepted names for the service, in lookup order
pub const SERVICE_ALIASES: &[&str] = &["servicio", "service"];
/// accepted names for the contact, in lookup order
pub const CONTACT_ALIASES: &[&str] = &["correo", "email", "contact"];
/// accepted names for the extra data mapping, in lookup order
pub const EXTRA_ALIASES: &[&str] = &["extra", "data"];

/// returns the value of the first alias in `aliases` that is present in `fields` with a
/// value other than `null` or `""`
pub fn first_present<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| fields.get(*alias))
        .find(|value| !is_blank(value))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// The set of fields supplied by a create or update request.
///
/// A `None` field was not supplied and must be left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    /// the client name
    pub name: Option<String>,
    /// the service
    pub service: Option<String>,
    /// the contact
    pub contact: Option<String>,
    /// the extra data mapping
    pub extra: Option<Map<String, Value>>,
}

impl Patch {
    /// extracts a `Patch` from the raw request `fields`
    ///
    /// # Errors
    /// returns [`CrsError::Validation`] if a supplied field has the wrong JSON type
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Patch> {
        Ok(Patch {
            name: string_field(fields, NAME_ALIASES)?,
            service: string_field(fields, SERVICE_ALIASES)?,
            contact: string_field(fields, CONTACT_ALIASES)?,
            extra: match first_present(fields, EXTRA_ALIASES) {
                None => None,
                Some(Value::Object(map)) => Some(map.clone()),
                Some(_) => {
                    return Err(CrsError::Validation(format!(
                        "{} must be an object",
                        EXTRA_ALIASES.join("/")
                    )))
                }
            },
        })
    }

    /// returns `true` if no field was supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.service.is_none() && self.contact.is_none() && self.extra.is_none()
    }
}

fn string_field(fields: &Map<String, Value>, aliases: &[&str]) -> Result<Option<String>> {
    match first_present(fields, aliases) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(CrsError::Validation(format!(
            "{} must be a string",
            aliases.join("/")
        ))),
    }
}
