//! Reconciliation engine
//!
//! The engine is responsible for:
//! - Filtering and normalizing the records the panel declares
//! - Fetching the zone's current records from the provider
//! - Planning the minimal create/update/delete set ([`plan()`])
//! - Applying the plan one provider call at a time ([`Reconciler::apply`])
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   normalize    ┌──────────────────┐
//! │ DesiredRecord│ ─────────────▶ │ NormalizedRecord │──┐
//! └──────────────┘                └──────────────────┘  │   ┌──────────┐   ┌─────────┐
//!                                                       ├──▶│  plan()  │──▶│  apply  │──▶ ZoneProvider
//! ┌──────────────┐  ZoneFetcher   ┌──────────────────┐  │   └──────────┘   └─────────┘
//! │ ZoneProvider │ ─────────────▶ │  ExistingRecord  │──┘
//! └──────────────┘                └──────────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! A failed create/update/delete is logged and recorded in the
//! [`ApplyReport`]; the remaining operations still run.

pub mod keys;
pub mod plan;

pub use keys::{BaseKey, ExactKey, Keyed};
pub use plan::{Change, RecordUpdate, SyncPlan, plan};

use crate::record::{DesiredRecord, NormalizedRecord, RecordId, RecordType, ZoneId, normalize};
use crate::traits::{ProviderResponse, ZoneProvider};
use crate::zone::ZoneFetcher;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Kind of record operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

/// A record operation the provider did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFailure {
    /// What was attempted
    pub operation: Operation,
    /// Type of the affected record
    pub record_type: RecordType,
    /// Owner name of the affected record
    pub name: String,
    /// Target id for updates and deletes
    pub id: Option<RecordId>,
    /// Provider verdict or transport error
    pub reason: String,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.operation, self.name, self.record_type)?;
        if let Some(id) = &self.id {
            write!(f, " (id {id})")?;
        }
        write!(f, ": {}", self.reason)
    }
}

/// Outcome of applying a plan to one zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Records created
    pub created: usize,
    /// Records updated in place
    pub updated: usize,
    /// Records deleted
    pub deleted: usize,
    /// Records left as they were
    pub unchanged: usize,
    /// Operations that failed
    pub failures: Vec<OperationFailure>,
}

impl ApplyReport {
    /// Whether any operation failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Turn declared records into the normalized set the engine manages
///
/// Unknown types, SOA and NS records are dropped; the rest are normalized
/// with `default_ttl`.
pub fn desired_records(records: &[DesiredRecord], default_ttl: u32) -> Vec<NormalizedRecord> {
    records
        .iter()
        .filter(|record| match &record.record_type {
            Some(record_type) if !record_type.is_supported() => {
                debug!("Skipping unsupported record type {}", record_type);
                false
            }
            Some(record_type) => !record_type.is_provider_owned(),
            None => false,
        })
        .filter_map(|record| normalize(record, default_ttl))
        .collect()
}

/// Applies reconciliation plans through a provider
///
/// Calls are issued strictly one at a time, in [`SyncPlan::changes`] order.
pub struct Reconciler<'a> {
    provider: &'a dyn ZoneProvider,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over the given provider
    pub fn new(provider: &'a dyn ZoneProvider) -> Self {
        Self { provider }
    }

    /// Converge a zone onto the declared records
    ///
    /// # Parameters
    ///
    /// - `zone_id`: Provider id of the zone
    /// - `records`: Records declared by the panel
    /// - `default_ttl`: TTL for records that declare none
    pub async fn reconcile(
        &self,
        zone_id: &ZoneId,
        records: &[DesiredRecord],
        default_ttl: u32,
    ) -> ApplyReport {
        let desired = desired_records(records, default_ttl);
        let existing = ZoneFetcher::new(self.provider).fetch_records(zone_id).await;

        debug!(
            "Reconciling zone id {}: {} desired, {} existing",
            zone_id,
            desired.len(),
            existing.len()
        );

        let plan = plan(desired, existing);
        self.apply(&plan, zone_id).await
    }

    /// Apply a plan to the zone
    pub async fn apply(&self, plan: &SyncPlan, zone_id: &ZoneId) -> ApplyReport {
        let mut report = ApplyReport {
            unchanged: plan.unchanged().len(),
            ..ApplyReport::default()
        };

        if plan.is_noop() {
            debug!("Zone id {} already in sync", zone_id);
            return report;
        }

        info!(
            "Applying plan to zone id {}: {} create(s), {} update(s), {} delete(s)",
            zone_id,
            plan.creates().len(),
            plan.updates().len(),
            plan.deletes().len()
        );

        for change in plan.changes() {
            match change {
                Change::Update(update) => {
                    let outcome = self
                        .provider
                        .update_record(&update.target.id, &update.desired)
                        .await;
                    match failure_reason(outcome) {
                        None => {
                            debug!(
                                "Updated record id {} -> {} {}",
                                update.target.id, update.desired.record_type, update.desired.content
                            );
                            report.updated += 1;
                        }
                        Some(reason) => report.failures.push(self.failed(
                            Operation::Update,
                            &update.desired.record_type,
                            update.desired.name.as_deref().unwrap_or_default(),
                            Some(&update.target.id),
                            reason,
                        )),
                    }
                }
                Change::Create(record) => {
                    match failure_reason(self.provider.create_record(zone_id, record).await) {
                        None => {
                            debug!(
                                "Created record {} {} -> {}",
                                record.name.as_deref().unwrap_or_default(),
                                record.record_type,
                                record.content
                            );
                            report.created += 1;
                        }
                        Some(reason) => report.failures.push(self.failed(
                            Operation::Create,
                            &record.record_type,
                            record.name.as_deref().unwrap_or_default(),
                            None,
                            reason,
                        )),
                    }
                }
                Change::Delete(record) => {
                    match failure_reason(self.provider.delete_record(&record.id).await) {
                        None => {
                            debug!(
                                "Deleted record id {} ({} {})",
                                record.id, record.name, record.record_type
                            );
                            report.deleted += 1;
                        }
                        Some(reason) => report.failures.push(self.failed(
                            Operation::Delete,
                            &record.record_type,
                            &record.name,
                            Some(&record.id),
                            reason,
                        )),
                    }
                }
            }
        }

        report
    }

    fn failed(
        &self,
        operation: Operation,
        record_type: &RecordType,
        name: &str,
        id: Option<&RecordId>,
        reason: String,
    ) -> OperationFailure {
        let failure = OperationFailure {
            operation,
            record_type: record_type.clone(),
            name: name.to_string(),
            id: id.cloned(),
            reason,
        };
        match operation {
            Operation::Create => warn!("Failed to create record on {}: {}", self.provider.provider_name(), failure),
            _ => error!("Failed to {} record on {}: {}", operation, self.provider.provider_name(), failure),
        }
        failure
    }
}

/// `None` on success, otherwise the reason the call failed
fn failure_reason(outcome: crate::Result<ProviderResponse<()>>) -> Option<String> {
    match outcome {
        Ok(response) if response.is_success() => None,
        Ok(response) => Some(response.describe()),
        Err(e) => Some(e.to_string()),
    }
}
