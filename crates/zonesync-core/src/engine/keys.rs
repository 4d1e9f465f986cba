//! Matching keys
//!
//! An [`ExactKey`] identifies a record that is already exactly as desired.
//! A [`BaseKey`] groups records occupying the same name/type/priority slot,
//! regardless of content.
//!
//! Names compare case-insensitively and a missing priority counts as 0.

use crate::record::{ExistingRecord, NormalizedRecord, RecordType};

/// (type, name, priority) slot identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseKey {
    record_type: RecordType,
    name: String,
    priority: u32,
}

/// Full-tuple identity: slot plus content and TTL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactKey {
    base: BaseKey,
    content: String,
    ttl: u32,
}

impl BaseKey {
    fn new(record_type: &RecordType, name: Option<&str>, priority: Option<u32>) -> Self {
        Self {
            record_type: record_type.clone(),
            name: name.unwrap_or_default().to_lowercase(),
            priority: priority.unwrap_or(0),
        }
    }
}

impl ExactKey {
    /// The slot this key belongs to
    pub fn base(&self) -> &BaseKey {
        &self.base
    }
}

/// Anything that can be placed in a slot
pub trait Keyed {
    fn base_key(&self) -> BaseKey;
    fn exact_key(&self) -> ExactKey;
}

impl Keyed for NormalizedRecord {
    fn base_key(&self) -> BaseKey {
        BaseKey::new(&self.record_type, self.name.as_deref(), self.priority)
    }

    fn exact_key(&self) -> ExactKey {
        ExactKey {
            base: self.base_key(),
            content: self.content.clone(),
            ttl: self.ttl,
        }
    }
}

impl Keyed for ExistingRecord {
    fn base_key(&self) -> BaseKey {
        BaseKey::new(&self.record_type, Some(&self.name), self.priority)
    }

    fn exact_key(&self) -> ExactKey {
        ExactKey {
            base: self.base_key(),
            content: self.content.clone(),
            ttl: self.ttl,
        }
    }
}
