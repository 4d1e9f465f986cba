//! Resource record model
//!
//! - [`DesiredRecord`]: a record as declared by the panel
//! - [`ExistingRecord`]: a record as held by the provider
//! - [`NormalizedRecord`]: provider wire parameters derived from a desired record
//!
//! Record types form a closed set ([`RecordType`]); anything outside of it
//! decodes as [`RecordType::Other`] and is never managed.

pub mod lenient;
pub mod normalize;

pub use normalize::{NormalizedRecord, normalize};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// DNS record type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Txt,
    Srv,
    Caa,
    Ptr,
    Sshfp,
    Tlsa,
    Nsec,
    Dname,
    Dnskey,
    Ds,
    Hinfo,
    Loc,
    Naptr,
    Rp,
    Spf,
    Uri,
    Soa,
    /// Any type this tool does not know how to manage (upper-cased)
    Other(String),
}

impl RecordType {
    /// Upper-case mnemonic of the type
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Txt => "TXT",
            RecordType::Srv => "SRV",
            RecordType::Caa => "CAA",
            RecordType::Ptr => "PTR",
            RecordType::Sshfp => "SSHFP",
            RecordType::Tlsa => "TLSA",
            RecordType::Nsec => "NSEC",
            RecordType::Dname => "DNAME",
            RecordType::Dnskey => "DNSKEY",
            RecordType::Ds => "DS",
            RecordType::Hinfo => "HINFO",
            RecordType::Loc => "LOC",
            RecordType::Naptr => "NAPTR",
            RecordType::Rp => "RP",
            RecordType::Spf => "SPF",
            RecordType::Uri => "URI",
            RecordType::Soa => "SOA",
            RecordType::Other(other) => other,
        }
    }

    /// Whether the provider accepts records of this type from us
    pub fn is_supported(&self) -> bool {
        !matches!(self, RecordType::Other(_))
    }

    /// SOA and NS belong to the provider and are never touched
    pub fn is_provider_owned(&self) -> bool {
        matches!(self, RecordType::Soa | RecordType::Ns)
    }

    /// Types whose priority travels in a separate field
    pub fn carries_priority(&self) -> bool {
        matches!(self, RecordType::Mx | RecordType::Srv)
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "NS" => RecordType::Ns,
            "TXT" => RecordType::Txt,
            "SRV" => RecordType::Srv,
            "CAA" => RecordType::Caa,
            "PTR" => RecordType::Ptr,
            "SSHFP" => RecordType::Sshfp,
            "TLSA" => RecordType::Tlsa,
            "NSEC" => RecordType::Nsec,
            "DNAME" => RecordType::Dname,
            "DNSKEY" => RecordType::Dnskey,
            "DS" => RecordType::Ds,
            "HINFO" => RecordType::Hinfo,
            "LOC" => RecordType::Loc,
            "NAPTR" => RecordType::Naptr,
            "RP" => RecordType::Rp,
            "SPF" => RecordType::Spf,
            "URI" => RecordType::Uri,
            "SOA" => RecordType::Soa,
            _ => RecordType::Other(upper),
        })
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse::<RecordType>().unwrap_or_else(|never| match never {}))
    }
}

/// Provider-side identifier of a zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Provider-side identifier of a record, stable across its lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A resource record as declared by the panel
///
/// Decoded from `{type, host, ttl, opt, value}`. The panel is loose about
/// scalar types, so `ttl` and `opt` accept numbers as well as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DesiredRecord {
    /// Record type; `None` when missing or empty
    #[serde(rename = "type", default, deserialize_with = "lenient::optional_record_type")]
    pub record_type: Option<RecordType>,

    /// Owner name, possibly fully qualified with a trailing dot
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub host: Option<String>,

    /// Record TTL; the zone default applies when absent
    #[serde(default, deserialize_with = "lenient::optional_u32")]
    pub ttl: Option<u32>,

    /// MX priority, SRV "priority weight port", or CAA "flag tag"
    #[serde(rename = "opt", default, deserialize_with = "lenient::optional_string")]
    pub priority_option: Option<String>,

    /// Type-specific payload
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub value: String,
}

impl DesiredRecord {
    /// Create a desired record of the given type and value
    pub fn new(record_type: RecordType, value: impl Into<String>) -> Self {
        Self {
            record_type: Some(record_type),
            value: value.into(),
            ..Self::default()
        }
    }

    /// Set the owner name
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the priority option
    pub fn with_priority_option(mut self, opt: impl Into<String>) -> Self {
        self.priority_option = Some(opt.into());
        self
    }
}

/// A resource record as currently held by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingRecord {
    /// Provider-assigned identifier, target of update/delete calls
    pub id: RecordId,
    /// Record type
    pub record_type: RecordType,
    /// Owner name as the provider reports it
    pub name: String,
    /// Priority for MX/SRV, if the provider reports one
    pub priority: Option<u32>,
    /// Record content
    pub content: String,
    /// Time-to-live
    pub ttl: u32,
}
