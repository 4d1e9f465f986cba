//! Test doubles and common utilities for reconciliation contract tests
//!
//! [`MockZoneProvider`] keeps zones in memory, applies every mutation it
//! receives and records each call in order, so tests can assert both the
//! resulting zone contents and the exact sequence of provider calls.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use zonesync_core::config::{ProviderConfig, SyncConfig};
use zonesync_core::error::{Error, Result};
use zonesync_core::record::{
    DesiredRecord, ExistingRecord, NormalizedRecord, RecordId, RecordType, ZoneId,
};
use zonesync_core::traits::{ProviderResponse, ZoneProvider};

/// A provider call, as observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    OpenSession,
    CloseSession,
    LookupZone(String),
    DeleteZone(String),
    ZoneRecords(ZoneId),
    Create(ZoneId, NormalizedRecord),
    Update(RecordId, NormalizedRecord),
    Delete(RecordId),
}

impl Call {
    /// Whether the call changes provider state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::DeleteZone(_) | Call::Create(..) | Call::Update(..) | Call::Delete(_)
        )
    }
}

#[derive(Default)]
struct MockState {
    zones: HashMap<String, ZoneId>,
    records: HashMap<ZoneId, Vec<ExistingRecord>>,
    next_id: u64,
    calls: Vec<Call>,
    failing_contents: HashSet<String>,
    failing_ids: HashSet<RecordId>,
    erroring_ids: HashSet<RecordId>,
    failing_zone_deletions: HashSet<String>,
    reject_login: bool,
}

/// In-memory zone provider that records every call
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the other.
#[derive(Clone, Default)]
pub struct MockZoneProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockZoneProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone with the given provider id and records
    pub fn with_zone(self, name: &str, zone_id: &str, records: Vec<ExistingRecord>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let zone_id = ZoneId::from(zone_id);
            state.zones.insert(name.to_string(), zone_id.clone());
            state.records.insert(zone_id, records);
            state.next_id = state.next_id.max(1000);
        }
        self
    }

    /// Reject create/update calls whose content equals `content`
    pub fn failing_content(self, content: &str) -> Self {
        self.state.lock().unwrap().failing_contents.insert(content.to_string());
        self
    }

    /// Reject update/delete calls targeting `id`
    pub fn failing_id(self, id: &str) -> Self {
        self.state.lock().unwrap().failing_ids.insert(RecordId::from(id));
        self
    }

    /// Fail update/delete calls targeting `id` at the transport level
    pub fn erroring_id(self, id: &str) -> Self {
        self.state.lock().unwrap().erroring_ids.insert(RecordId::from(id));
        self
    }

    /// Reject deletion of the named zone
    pub fn failing_zone_deletion(self, name: &str) -> Self {
        self.state.lock().unwrap().failing_zone_deletions.insert(name.to_string());
        self
    }

    /// Reject the login
    pub fn rejecting_login(self) -> Self {
        self.state.lock().unwrap().reject_login = true;
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Only the mutating calls
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Forget recorded calls, keeping zone contents
    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Current records of the zone with the given id
    pub fn records(&self, zone_id: &str) -> Vec<ExistingRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(&ZoneId::from(zone_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Whether the named zone still exists
    pub fn has_zone(&self, name: &str) -> bool {
        self.state.lock().unwrap().zones.contains_key(name)
    }

    fn log(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn ok<T>(payload: T) -> Result<ProviderResponse<T>> {
    Ok(ProviderResponse::ok(Some(1000), payload))
}

fn rejected<T>(message: &str) -> Result<ProviderResponse<T>> {
    Ok(ProviderResponse::rejected(Some(2400), message))
}

#[async_trait::async_trait]
impl ZoneProvider for MockZoneProvider {
    async fn open_session(&self) -> Result<()> {
        self.log(Call::OpenSession);
        if self.state.lock().unwrap().reject_login {
            return Err(Error::auth("login rejected: code 2200"));
        }
        Ok(())
    }

    async fn close_session(&self) -> Result<()> {
        self.log(Call::CloseSession);
        Ok(())
    }

    async fn lookup_zone(&self, name: &str) -> Result<ProviderResponse<ZoneId>> {
        self.log(Call::LookupZone(name.to_string()));
        match self.state.lock().unwrap().zones.get(name) {
            Some(zone_id) => ok(zone_id.clone()),
            None => Ok(ProviderResponse::rejected(Some(2303), "Object does not exist")),
        }
    }

    async fn delete_zone(&self, name: &str) -> Result<ProviderResponse<()>> {
        self.log(Call::DeleteZone(name.to_string()));
        let mut state = self.state.lock().unwrap();
        if state.failing_zone_deletions.contains(name) {
            return rejected("Object status prohibits operation");
        }
        match state.zones.remove(name) {
            Some(zone_id) => {
                state.records.remove(&zone_id);
                ok(())
            }
            None => Ok(ProviderResponse::rejected(Some(2303), "Object does not exist")),
        }
    }

    async fn zone_records(&self, zone_id: &ZoneId) -> Result<ProviderResponse<Vec<ExistingRecord>>> {
        self.log(Call::ZoneRecords(zone_id.clone()));
        ok(self.state.lock().unwrap().records.get(zone_id).cloned().unwrap_or_default())
    }

    async fn create_record(
        &self,
        zone_id: &ZoneId,
        record: &NormalizedRecord,
    ) -> Result<ProviderResponse<()>> {
        self.log(Call::Create(zone_id.clone(), record.clone()));
        let mut state = self.state.lock().unwrap();
        if state.failing_contents.contains(&record.content) {
            return rejected("Parameter value policy error");
        }

        state.next_id += 1;
        let id = RecordId(state.next_id.to_string());
        state
            .records
            .entry(zone_id.clone())
            .or_default()
            .push(existing_from(id, record));
        ok(())
    }

    async fn update_record(
        &self,
        id: &RecordId,
        record: &NormalizedRecord,
    ) -> Result<ProviderResponse<()>> {
        self.log(Call::Update(id.clone(), record.clone()));
        let mut state = self.state.lock().unwrap();
        if state.erroring_ids.contains(id) {
            return Err(Error::http("connection reset"));
        }
        if state.failing_ids.contains(id) || state.failing_contents.contains(&record.content) {
            return rejected("Parameter value policy error");
        }

        for records in state.records.values_mut() {
            if let Some(slot) = records.iter_mut().find(|existing| &existing.id == id) {
                *slot = existing_from(id.clone(), record);
                return ok(());
            }
        }
        Ok(ProviderResponse::rejected(Some(2303), "Object does not exist"))
    }

    async fn delete_record(&self, id: &RecordId) -> Result<ProviderResponse<()>> {
        self.log(Call::Delete(id.clone()));
        let mut state = self.state.lock().unwrap();
        if state.erroring_ids.contains(id) {
            return Err(Error::http("connection reset"));
        }
        if state.failing_ids.contains(id) {
            return rejected("Object status prohibits operation");
        }

        for records in state.records.values_mut() {
            if let Some(position) = records.iter().position(|existing| &existing.id == id) {
                records.remove(position);
                return ok(());
            }
        }
        Ok(ProviderResponse::rejected(Some(2303), "Object does not exist"))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

fn existing_from(id: RecordId, record: &NormalizedRecord) -> ExistingRecord {
    ExistingRecord {
        id,
        record_type: record.record_type.clone(),
        name: record.name.clone().unwrap_or_default(),
        priority: record.priority,
        content: record.content.clone(),
        ttl: record.ttl,
    }
}

/// An existing provider-side record
pub fn existing(
    id: &str,
    record_type: RecordType,
    name: &str,
    priority: Option<u32>,
    content: &str,
    ttl: u32,
) -> ExistingRecord {
    ExistingRecord {
        id: RecordId::from(id),
        record_type,
        name: name.to_string(),
        priority,
        content: content.to_string(),
        ttl,
    }
}

/// A declared record with host and explicit TTL
pub fn rr(record_type: RecordType, host: &str, value: &str, ttl: u32) -> DesiredRecord {
    DesiredRecord::new(record_type, value).with_host(host).with_ttl(ttl)
}

/// Configuration for a dispatcher driving the mock
pub fn mock_config() -> SyncConfig {
    SyncConfig::new(ProviderConfig::Custom {
        factory: "mock".to_string(),
        config: serde_json::json!({}),
    })
}

/// Ids of the records currently in a zone, in provider order
pub fn ids(records: &[ExistingRecord]) -> Vec<String> {
    records.iter().map(|record| record.id.to_string()).collect()
}
