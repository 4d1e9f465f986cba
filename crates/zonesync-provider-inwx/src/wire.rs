//! DomRobot JSON-RPC payloads
//!
//! Request: `{"method": "nameserver.info", "params": {...}}`
//! Response: `{"code": 1000, "msg": "Command completed successfully", "resData": {...}}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use zonesync_core::record::{ExistingRecord, NormalizedRecord, RecordId, RecordType, ZoneId, lenient};
use zonesync_core::traits::ProviderResponse;

/// Result code for a completed command
pub const SUCCESS_CODE: i64 = 1000;

#[derive(Debug, Serialize)]
pub(crate) struct Request<'a> {
    pub method: &'a str,
    pub params: Value,
}

/// A decoded DomRobot reply
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Reply {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default, rename = "resData")]
    pub res_data: Value,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.code == Some(SUCCESS_CODE)
    }

    /// Turn the reply into a verdict, extracting the payload on success
    pub fn verdict<T>(self, payload: impl FnOnce(&Value) -> Option<T>) -> ProviderResponse<T> {
        let success = self.is_success();
        ProviderResponse {
            success,
            code: self.code,
            payload: if success { payload(&self.res_data) } else { None },
            message: self.msg,
        }
    }

    /// Whether login announced a second factor
    pub fn requires_second_factor(&self) -> bool {
        match self.res_data.get("tfa") {
            None | Some(Value::Null) => false,
            Some(Value::String(method)) => !method.is_empty() && method != "0",
            Some(Value::Number(n)) => n.as_i64() != Some(0),
            Some(Value::Bool(enabled)) => *enabled,
            Some(_) => true,
        }
    }

    /// Status line of the reply, worded like any other verdict
    pub fn describe(&self) -> String {
        let status: ProviderResponse<()> = ProviderResponse {
            success: self.is_success(),
            code: self.code,
            message: self.msg.clone(),
            payload: None,
        };
        status.describe()
    }
}

/// Ids travel as integers whenever they look like one
pub(crate) fn id_param(id: &str) -> Value {
    id.parse::<u64>().map_or_else(|_| json!(id), |n| json!(n))
}

/// `resData.roId` of a `nameserver.info {domain}` reply
pub(crate) fn zone_id(res_data: &Value) -> Option<ZoneId> {
    res_data.get("roId").and_then(lenient::value_to_id).map(ZoneId)
}

/// `resData.record[]` of a `nameserver.info {roId}` reply
///
/// Entries without an id cannot be targeted and are skipped.
pub(crate) fn zone_records(res_data: &Value) -> Vec<ExistingRecord> {
    let Some(records) = res_data.get("record").and_then(Value::as_array) else {
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| {
            let id = record.get("id").and_then(lenient::value_to_id)?;
            let text = |field: &str| match record.get(field) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            };

            Some(ExistingRecord {
                id: RecordId(id),
                record_type: text("type").parse::<RecordType>().unwrap_or_else(|never| match never {}),
                name: text("name"),
                priority: record.get("prio").and_then(lenient::value_to_u32),
                content: text("content"),
                ttl: record.get("ttl").and_then(lenient::value_to_u32).unwrap_or(0),
            })
        })
        .collect()
}

/// Record parameters shared by `createRecord` and `updateRecord`
///
/// `name` and `prio` are only sent when set; the provider then applies the
/// zone apex and no priority.
pub(crate) fn record_params(record: &NormalizedRecord) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("type".to_string(), json!(record.record_type.as_str()));
    if let Some(name) = &record.name {
        params.insert("name".to_string(), json!(name));
    }
    params.insert("content".to_string(), json!(record.content));
    if let Some(priority) = record.priority {
        params.insert("prio".to_string(), json!(priority));
    }
    params.insert("ttl".to_string(), json!(record.ttl));
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_records_decoding() {
        let res_data = json!({
            "roId": 12345,
            "record": [
                {"id": 1, "name": "example.com", "type": "SOA", "content": "ns.inwx.de hostmaster.inwx.de 2024010101", "ttl": 86400, "prio": 0},
                {"id": "2", "name": "www.example.com", "type": "a", "content": "192.0.2.1", "ttl": "300"},
                {"name": "orphan.example.com", "type": "A", "content": "192.0.2.9", "ttl": 300},
                {"id": 4, "name": "example.com", "type": "MX", "content": "mail.example.com", "ttl": 3600, "prio": "10"}
            ]
        });

        let records = zone_records(&res_data);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].record_type, RecordType::Soa);
        assert_eq!(records[1].id, RecordId::from("2"));
        assert_eq!(records[1].record_type, RecordType::A);
        assert_eq!(records[1].ttl, 300);
        assert_eq!(records[1].priority, None);
        assert_eq!(records[2].priority, Some(10));
    }

    #[test]
    fn test_missing_record_list() {
        assert!(zone_records(&json!({"roId": 1})).is_empty());
        assert!(zone_records(&Value::Null).is_empty());
    }

    #[test]
    fn test_zone_id() {
        assert_eq!(zone_id(&json!({"roId": 12345})), Some(ZoneId::from("12345")));
        assert_eq!(zone_id(&json!({})), None);
    }

    #[test]
    fn test_record_params() {
        let apex_mx = NormalizedRecord {
            record_type: RecordType::Mx,
            name: None,
            priority: Some(10),
            content: "mail.example.com".to_string(),
            ttl: 3600,
        };
        assert_eq!(
            Value::Object(record_params(&apex_mx)),
            json!({"type": "MX", "content": "mail.example.com", "prio": 10, "ttl": 3600})
        );

        let www = NormalizedRecord {
            record_type: RecordType::A,
            name: Some("www.example.com".to_string()),
            priority: None,
            content: "192.0.2.1".to_string(),
            ttl: 300,
        };
        assert_eq!(
            Value::Object(record_params(&www)),
            json!({"type": "A", "name": "www.example.com", "content": "192.0.2.1", "ttl": 300})
        );
    }

    #[test]
    fn test_second_factor_detection() {
        let reply = |res_data: Value| Reply {
            code: Some(SUCCESS_CODE),
            msg: None,
            res_data,
        };
        assert!(!reply(json!({"tfa": "0"})).requires_second_factor());
        assert!(!reply(json!({})).requires_second_factor());
        assert!(!reply(json!({"tfa": 0})).requires_second_factor());
        assert!(reply(json!({"tfa": "GOOGLE-AUTH"})).requires_second_factor());
    }

    #[test]
    fn test_verdict() {
        let rejected = Reply {
            code: Some(2303),
            msg: Some("Object does not exist".to_string()),
            res_data: json!({"roId": 1}),
        };
        let response = rejected.verdict(zone_id);
        assert!(!response.is_success());
        assert_eq!(response.payload, None);
        assert_eq!(response.describe(), "code 2303: Object does not exist");
    }

    #[test]
    fn test_describe_matches_verdict() {
        let rejected = Reply {
            code: Some(2200),
            msg: Some("Authentication error".to_string()),
            res_data: Value::Null,
        };
        assert_eq!(rejected.describe(), "code 2200: Authentication error");
        assert_eq!(rejected.describe(), rejected.clone().verdict(|_| Some(())).describe());
        assert_eq!(Reply::default().describe(), "no status");
    }

    #[test]
    fn test_id_param() {
        assert_eq!(id_param("42"), json!(42));
        assert_eq!(id_param("abc"), json!("abc"));
    }
}
