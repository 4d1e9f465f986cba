//! Instruction dispatcher
//!
//! Routes each panel instruction to the right action:
//!
//! | Command                    | Action                                       |
//! |----------------------------|----------------------------------------------|
//! | `create`, `update`         | resolve zone, reconcile declared records     |
//! | `delete`                   | delete the whole zone on the provider        |
//! | `createPTRs`, `deletePTRs` | no-op (reverse zones are not managed)        |
//! | anything else              | logged and ignored                           |
//!
//! Instructions are processed one at a time, in input order. A failing zone
//! or record marks the run as having errors but never stops it.

pub mod instruction;

pub use instruction::{
    Command, Instruction, SoaSpec, ZoneSpec, decode_instructions, read_instructions,
};

use crate::config::SyncConfig;
use crate::engine::{ApplyReport, OperationFailure, Reconciler};
use crate::traits::ZoneProvider;
use crate::zone::ZoneFetcher;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

/// Events emitted by the Dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Zone records were reconciled
    ZoneSynchronized {
        zone: String,
        created: usize,
        updated: usize,
        deleted: usize,
        unchanged: usize,
    },

    /// Zone was deleted on the provider
    ZoneDeleted { zone: String },

    /// Zone deletion failed
    ZoneDeleteFailed { zone: String },

    /// Zone is absent on the provider
    ZoneNotFound { zone: String },

    /// Instruction required no provider action
    InstructionSkipped { command: String, reason: String },

    /// A record operation failed
    OperationFailed { zone: String, failure: OperationFailure },

    /// All instructions were processed
    RunFinished { processed: usize, had_errors: bool },
}

/// What happened to a single instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionOutcome {
    /// Records were reconciled
    Synchronized(ApplyReport),
    /// The zone was deleted
    ZoneDeleted,
    /// Nothing to do
    Skipped,
    /// The instruction failed at zone level
    Failed,
}

impl InstructionOutcome {
    /// Whether this outcome counts as a run error
    pub fn is_error(&self) -> bool {
        match self {
            InstructionOutcome::Synchronized(report) => report.has_failures(),
            InstructionOutcome::Failed => true,
            InstructionOutcome::ZoneDeleted | InstructionOutcome::Skipped => false,
        }
    }
}

/// Summary of a dispatcher run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Instructions processed
    pub processed: usize,
    /// Whether any zone- or record-level operation failed
    pub had_errors: bool,
    /// When the run began
    pub started_at: DateTime<Utc>,
    /// When the run ended
    pub finished_at: DateTime<Utc>,
}

/// Instruction dispatcher
///
/// Owns the provider for the duration of a run. Nothing is shared between
/// instructions: each zone's desired and existing sets are rebuilt from
/// scratch.
pub struct Dispatcher {
    /// Provider all calls go through
    provider: Box<dyn ZoneProvider>,

    /// TTL used when a zone carries no SOA TTL
    default_ttl: u32,

    /// Whether instructions reach the provider at all
    enabled: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SyncEvent>,
}

impl Dispatcher {
    /// Create a new dispatcher
    ///
    /// # Returns
    ///
    /// A tuple of (dispatcher, event_receiver) where event_receiver yields sync events
    pub fn new(
        provider: Box<dyn ZoneProvider>,
        config: &SyncConfig,
    ) -> crate::Result<(Self, mpsc::Receiver<SyncEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let dispatcher = Self {
            provider,
            default_ttl: config.default_ttl,
            enabled: config.enabled,
            event_tx: tx,
        };

        Ok((dispatcher, rx))
    }

    /// The provider this dispatcher drives
    pub fn provider(&self) -> &dyn ZoneProvider {
        self.provider.as_ref()
    }

    /// Process a list of instructions in order
    pub async fn run(&self, instructions: Vec<Instruction>) -> RunReport {
        self.run_stream(tokio_stream::iter(instructions)).await
    }

    /// Process a stream of instructions in order
    pub async fn run_stream<S>(&self, instructions: S) -> RunReport
    where
        S: Stream<Item = Instruction>,
    {
        let started_at = Utc::now();
        let mut processed = 0;
        let mut had_errors = false;

        tokio::pin!(instructions);
        while let Some(instruction) = instructions.next().await {
            let outcome = self.process(&instruction).await;
            processed += 1;
            if outcome.is_error() {
                had_errors = true;
            }
        }

        let finished_at = Utc::now();
        info!(
            "Processed {} instruction(s) in {} ms{}",
            processed,
            (finished_at - started_at).num_milliseconds(),
            if had_errors { " with errors" } else { "" }
        );
        self.emit_event(SyncEvent::RunFinished {
            processed,
            had_errors,
        });

        RunReport {
            processed,
            had_errors,
            started_at,
            finished_at,
        }
    }

    /// Process a single instruction
    pub async fn process(&self, instruction: &Instruction) -> InstructionOutcome {
        let command = &instruction.command;

        if !self.enabled {
            debug!("Synchronization disabled; skipping {} instruction", command);
            return self.skipped(command, "synchronization disabled");
        }

        match command {
            Command::Create | Command::Update | Command::Delete => {}
            Command::CreatePtrs | Command::DeletePtrs => {
                info!(
                    "PTR operation skipped for {} backend: {}",
                    self.provider.provider_name(),
                    command
                );
                return self.skipped(command, "reverse zones are not managed");
            }
            Command::Unknown(_) => {
                warn!("Unknown command: {}", command);
                return self.skipped(command, "unknown command");
            }
        }

        let Some(zone_name) = instruction.zone_name() else {
            debug!("Skipping {} instruction without zone name", command);
            return self.skipped(command, "no zone name");
        };

        if *command == Command::Delete {
            return self.delete_zone(zone_name).await;
        }

        let zone = instruction.zone.as_ref();
        let default_ttl = zone
            .and_then(ZoneSpec::soa_ttl)
            .unwrap_or(self.default_ttl);
        let records = zone.and_then(|zone| zone.rr.as_deref());

        self.sync_zone(zone_name, records, default_ttl).await
    }

    async fn sync_zone(
        &self,
        zone_name: &str,
        records: Option<&[crate::record::DesiredRecord]>,
        default_ttl: u32,
    ) -> InstructionOutcome {
        let fetcher = ZoneFetcher::new(self.provider.as_ref());
        let zone_id = match fetcher.resolve_zone(zone_name).await {
            Ok(zone_id) => zone_id,
            Err(_) => {
                self.emit_event(SyncEvent::ZoneNotFound {
                    zone: zone_name.to_string(),
                });
                return InstructionOutcome::Failed;
            }
        };

        let report = match records {
            Some(records) => {
                Reconciler::new(self.provider.as_ref())
                    .reconcile(&zone_id, records, default_ttl)
                    .await
            }
            None => {
                debug!("Zone {} carries no record list", zone_name);
                ApplyReport::default()
            }
        };

        for failure in &report.failures {
            self.emit_event(SyncEvent::OperationFailed {
                zone: zone_name.to_string(),
                failure: failure.clone(),
            });
        }

        info!(
            "Zone synchronized incrementally: {} ({} created, {} updated, {} deleted, {} unchanged, {} failed)",
            zone_name,
            report.created,
            report.updated,
            report.deleted,
            report.unchanged,
            report.failures.len()
        );
        self.emit_event(SyncEvent::ZoneSynchronized {
            zone: zone_name.to_string(),
            created: report.created,
            updated: report.updated,
            deleted: report.deleted,
            unchanged: report.unchanged,
        });

        InstructionOutcome::Synchronized(report)
    }

    async fn delete_zone(&self, zone_name: &str) -> InstructionOutcome {
        let zone = zone_name.to_string();
        let fetcher = ZoneFetcher::new(self.provider.as_ref());
        if fetcher.delete_zone(zone_name).await {
            self.emit_event(SyncEvent::ZoneDeleted { zone });
            InstructionOutcome::ZoneDeleted
        } else {
            self.emit_event(SyncEvent::ZoneDeleteFailed { zone });
            InstructionOutcome::Failed
        }
    }

    fn skipped(&self, command: &Command, reason: &str) -> InstructionOutcome {
        self.emit_event(SyncEvent::InstructionSkipped {
            command: command.to_string(),
            reason: reason.to_string(),
        });
        InstructionOutcome::Skipped
    }

    /// Emit a sync event
    ///
    /// A full channel drops the event with a warning; nobody listening is fine.
    fn emit_event(&self, event: SyncEvent) {
        if let Err(TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
