//! Zone instructions as emitted by the panel
//!
//! The panel hands over a JSON array; each element names a command and the
//! zone it applies to:
//!
//! ```json
//! [
//!   {
//!     "command": "update",
//!     "zone": {
//!       "name": "example.com.",
//!       "soa": { "ttl": 86400 },
//!       "rr": [
//!         { "host": "www.example.com.", "type": "A", "ttl": 300, "opt": "", "value": "192.0.2.1" }
//!       ]
//!     }
//!   }
//! ]
//! ```

use crate::error::{Error, Result};
use crate::record::{DesiredRecord, lenient};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::warn;

/// Instruction command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Zone was created in the panel
    Create,
    /// Zone records changed in the panel
    Update,
    /// Zone was removed from the panel
    Delete,
    /// Reverse records were added (not managed)
    CreatePtrs,
    /// Reverse records were removed (not managed)
    DeletePtrs,
    /// Anything else
    Unknown(String),
}

impl From<&str> for Command {
    fn from(command: &str) -> Self {
        match command {
            "create" => Command::Create,
            "update" => Command::Update,
            "delete" => Command::Delete,
            "createPTRs" => Command::CreatePtrs,
            "deletePTRs" => Command::DeletePtrs,
            other => Command::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Command::Create => "create",
            Command::Update => "update",
            Command::Delete => "delete",
            Command::CreatePtrs => "createPTRs",
            Command::DeletePtrs => "deletePTRs",
            Command::Unknown(other) => other,
        })
    }
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = lenient::string_or_empty(deserializer)?;
        Ok(Command::from(raw.as_str()))
    }
}

/// SOA parameters of a zone; only the TTL matters here
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SoaSpec {
    /// Zone default TTL
    #[serde(default, deserialize_with = "lenient::optional_u32")]
    pub ttl: Option<u32>,
}

/// A zone as declared by the panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ZoneSpec {
    /// Zone name, possibly with trailing dot
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub name: Option<String>,

    /// SOA parameters; anything but an object counts as absent
    #[serde(default, deserialize_with = "soa_object")]
    pub soa: Option<SoaSpec>,

    /// Declared records; `None` when the panel sent no list
    #[serde(default, deserialize_with = "record_list")]
    pub rr: Option<Vec<DesiredRecord>>,
}

impl ZoneSpec {
    /// The zone's default TTL, if its SOA carries one
    pub fn soa_ttl(&self) -> Option<u32> {
        self.soa.as_ref().and_then(|soa| soa.ttl)
    }
}

/// One decoded instruction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Instruction {
    /// What to do
    pub command: Command,

    /// The zone it applies to
    #[serde(default)]
    pub zone: Option<ZoneSpec>,
}

impl Instruction {
    /// Create an instruction for a named zone
    pub fn new(command: Command, zone_name: impl Into<String>) -> Self {
        Self {
            command,
            zone: Some(ZoneSpec {
                name: Some(zone_name.into()),
                ..ZoneSpec::default()
            }),
        }
    }

    /// Attach declared records
    pub fn with_records(mut self, records: Vec<DesiredRecord>) -> Self {
        self.zone.get_or_insert_with(ZoneSpec::default).rr = Some(records);
        self
    }

    /// Attach the zone's SOA TTL
    pub fn with_soa_ttl(mut self, ttl: u32) -> Self {
        self.zone.get_or_insert_with(ZoneSpec::default).soa = Some(SoaSpec { ttl: Some(ttl) });
        self
    }

    /// The zone name, when present and non-empty
    pub fn zone_name(&self) -> Option<&str> {
        self.zone
            .as_ref()
            .and_then(|zone| zone.name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

/// Decode the panel's instruction payload
///
/// # Returns
///
/// - `Ok(Vec<Instruction>)`: Every usable instruction, in input order
/// - `Err(Error::InvalidInput)`: The payload is not a JSON array
///
/// Elements that are not objects, lack a `command`, or fail to decode are
/// skipped with a warning.
pub fn decode_instructions(payload: &str) -> Result<Vec<Instruction>> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| Error::invalid_input(format!("payload is not valid JSON: {e}")))?;

    let Value::Array(elements) = value else {
        return Err(Error::invalid_input("expecting a JSON array of instructions"));
    };

    let mut instructions = Vec::with_capacity(elements.len());
    for (position, element) in elements.into_iter().enumerate() {
        let has_command = element
            .as_object()
            .is_some_and(|object| object.get("command").is_some_and(|c| !c.is_null()));
        if !has_command {
            warn!("Skipping instruction #{}: no command", position);
            continue;
        }

        match serde_json::from_value::<Instruction>(element) {
            Ok(instruction) => instructions.push(instruction),
            Err(e) => warn!("Skipping instruction #{}: {}", position, e),
        }
    }

    Ok(instructions)
}

fn soa_object<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<SoaSpec>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

/// Read the whole payload from `reader` and decode it
///
/// A payload that is not UTF-8 is an [`Error::Io`].
pub async fn read_instructions<R>(mut reader: R) -> Result<Vec<Instruction>>
where
    R: AsyncRead + Unpin,
{
    let mut payload = String::new();
    reader.read_to_string(&mut payload).await?;
    decode_instructions(&payload)
}

/// Decode `rr`, treating anything but an array as "no list"
///
/// Individual malformed records are skipped.
fn record_list<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Vec<DesiredRecord>>, D::Error> {
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<DesiredRecord>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping malformed record: {}", e);
                    None
                }
            })
            .collect(),
    ))
}
