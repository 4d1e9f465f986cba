// # zonesync-core
//
// Core library for synchronizing panel-managed DNS zones onto a hosted
// DNS provider.
//
// ## Architecture Overview
//
// - **record**: Declared and provider-side record models, normalization
// - **zone**: Zone lookup and record fetching through a provider
// - **engine**: Three-phase reconciliation planner and plan applier
// - **dispatch**: Routes panel instructions (create/update/delete) to the engine
// - **ZoneProvider**: Trait every DNS provider backend implements
// - **ProviderRegistry**: Plugin-based registry for provider backends
//
// ## Design Principles
//
// 1. **Incremental**: Only records that differ are touched; unchanged ones stay put
// 2. **Scoped deletion**: Records in slots the panel never declared are left alone
// 3. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod record;
pub mod zone;
pub mod engine;
pub mod dispatch;
pub mod registry;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{ProviderResponse, ZoneProvider, ZoneProviderFactory};
pub use record::{DesiredRecord, ExistingRecord, NormalizedRecord, RecordId, RecordType, ZoneId};
pub use engine::{ApplyReport, OperationFailure, Reconciler, SyncPlan, plan};
pub use dispatch::{
    Dispatcher, Instruction, RunReport, SyncEvent, decode_instructions, read_instructions,
};
pub use registry::ProviderRegistry;
pub use config::{Environment, ProviderConfig, SyncConfig};
pub use error::{Error, Result};
