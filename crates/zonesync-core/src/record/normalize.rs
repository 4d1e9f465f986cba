// # Record Normalizer
//
// Maps a panel record onto the parameter set the provider expects.
//
// Normalization is a pure function of (record, default TTL). The engine
// compares normalized records against provider records field by field, so
// any non-determinism here would show up as endless update churn.
//
// ## Encoding rules
//
// | Type  | priority                     | content                              |
// |-------|------------------------------|--------------------------------------|
// | MX    | leading integer of `opt`     | value                                |
// | SRV   | first numeric token of `opt` | `"<weight> <port> <target>."`        |
// | CAA   | -                            | `<opt> "<value>"`                    |
// | TXT   | -                            | value with tabs replaced by spaces   |
// | other | -                            | value                                |

use super::lenient::{leading_int, numeric_token};
use super::{DesiredRecord, RecordType};
use serde::Serialize;

/// Provider wire parameters for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Owner name without trailing dot; `None` for the zone apex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Priority, only for MX and SRV
    #[serde(rename = "prio", skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Fully encoded content
    pub content: String,
    /// Time-to-live
    pub ttl: u32,
}

/// Normalize a desired record
///
/// Returns `None` when the record has no type or is an SOA record; those are
/// never managed by this tool.
pub fn normalize(record: &DesiredRecord, default_ttl: u32) -> Option<NormalizedRecord> {
    let record_type = record.record_type.clone()?;
    if record_type == RecordType::Soa {
        return None;
    }

    let name = record
        .host
        .as_deref()
        .map(|host| host.trim_end_matches('.'))
        .filter(|host| !host.is_empty())
        .map(str::to_string);

    let opt = record.priority_option.as_deref().filter(|opt| !opt.is_empty());

    let mut priority = record_type
        .carries_priority()
        .then(|| opt.map(leading_int).unwrap_or(0));

    let content = match record_type {
        RecordType::Txt => record.value.replace('\t', " "),
        RecordType::Caa => match opt {
            Some(opt) => format!("{} \"{}\"", opt.trim(), record.value),
            None => format!("\"{}\"", record.value),
        },
        RecordType::Srv => {
            let srv = SrvOption::parse(opt.unwrap_or(""));
            priority = Some(srv.priority);
            format!(
                "{} {} {}.",
                srv.weight,
                srv.port,
                record.value.trim_end_matches('.')
            )
        }
        _ => record.value.clone(),
    };

    Some(NormalizedRecord {
        record_type,
        name,
        priority,
        content,
        ttl: record.ttl.unwrap_or(default_ttl),
    })
}

/// Decomposed SRV priority option: "priority weight port"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct SrvOption {
    priority: u32,
    weight: u32,
    port: u32,
}

impl SrvOption {
    fn parse(opt: &str) -> Self {
        let opt = opt.trim();
        let mut tokens = opt.split_whitespace().map(numeric_token);

        let first = tokens.next().flatten();
        let weight = tokens.next().flatten().unwrap_or(0);
        let port = tokens.next().flatten().unwrap_or(0);

        let priority = first
            .or_else(|| (!opt.is_empty()).then(|| numeric_token(opt)).flatten())
            .unwrap_or(0);

        Self {
            priority,
            weight,
            port,
        }
    }
}
