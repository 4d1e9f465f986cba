//! Core traits for zone synchronization
//!
//! This module defines the abstract interface that provider implementations must follow.
//!
//! - [`ZoneProvider`]: Zone lookup and record CRUD against a remote DNS provider

pub mod zone_provider;

pub use zone_provider::{ProviderResponse, ZoneProvider, ZoneProviderFactory};
