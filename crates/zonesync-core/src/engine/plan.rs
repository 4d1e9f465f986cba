// # Reconciliation Planning
//
// Computes the create/update/delete plan for one zone without touching the
// provider.
//
// ## Algorithm
//
// 1. Drop SOA and NS records on both sides.
// 2. Index existing records by exact key (last write wins, first-insertion
//    order kept) and by base key (provider order kept).
// 3. Phase 1: a desired record whose exact key is indexed is already correct.
//    The matching existing record leaves both indexes.
// 4. Phase 2: every other desired record takes the oldest remaining existing
//    record in its slot as an update target; its exact key leaves the exact
//    index. With nothing left in the slot the record is created.
// 5. Phase 3: existing records still in the exact index are deleted, but only
//    when their slot was declared by some desired record in this run. Slots the
//    caller never mentioned are left alone.

use super::keys::{BaseKey, ExactKey, Keyed};
use crate::record::{ExistingRecord, NormalizedRecord};
use std::collections::{HashMap, HashSet, VecDeque};

/// An in-place update of an existing record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    /// The record being overwritten; its id is the update target
    pub target: ExistingRecord,
    /// The parameters it is overwritten with
    pub desired: NormalizedRecord,
}

/// One provider call of a plan, borrowed from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<'a> {
    Create(&'a NormalizedRecord),
    Update(&'a RecordUpdate),
    Delete(&'a ExistingRecord),
}

/// Position of a phase-2 decision within `creates` or `updates`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upsert {
    Create(usize),
    Update(usize),
}

/// The full set of changes for one zone
///
/// Only [`plan()`] builds a non-empty plan, so the call order recorded during
/// phase 2 always matches `creates` and `updates`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    creates: Vec<NormalizedRecord>,
    updates: Vec<RecordUpdate>,
    deletes: Vec<ExistingRecord>,
    unchanged: Vec<ExistingRecord>,
    upsert_order: Vec<Upsert>,
}

impl SyncPlan {
    /// Records to create, in desired-list order
    pub fn creates(&self) -> &[NormalizedRecord] {
        &self.creates
    }

    /// Records to update in place, in desired-list order
    pub fn updates(&self) -> &[RecordUpdate] {
        &self.updates
    }

    /// Records to delete, in index order
    pub fn deletes(&self) -> &[ExistingRecord] {
        &self.deletes
    }

    /// Existing records that already match a desired record exactly
    pub fn unchanged(&self) -> &[ExistingRecord] {
        &self.unchanged
    }

    /// Provider calls in the order they are issued
    ///
    /// Creates and updates interleave in desired-list order, deletes follow.
    pub fn changes(&self) -> impl Iterator<Item = Change<'_>> + '_ {
        self.upsert_order
            .iter()
            .filter_map(|step| match *step {
                Upsert::Create(idx) => self.creates.get(idx).map(Change::Create),
                Upsert::Update(idx) => self.updates.get(idx).map(Change::Update),
            })
            .chain(self.deletes.iter().map(Change::Delete))
    }

    /// Whether applying this plan would issue no provider calls
    pub fn is_noop(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Number of provider calls applying this plan would issue
    pub fn operation_count(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }
}

/// Existing records indexed by exact and base key
///
/// Both indexes refer to positions in `records`.
struct ExistingIndex {
    records: Vec<ExistingRecord>,
    by_exact: HashMap<ExactKey, usize>,
    exact_order: Vec<ExactKey>,
    by_base: HashMap<BaseKey, VecDeque<usize>>,
}

impl ExistingIndex {
    fn build(records: Vec<ExistingRecord>) -> Self {
        let mut by_exact = HashMap::new();
        let mut exact_order = Vec::new();
        let mut by_base: HashMap<BaseKey, VecDeque<usize>> = HashMap::new();

        for (idx, record) in records.iter().enumerate() {
            let exact = record.exact_key();
            if by_exact.insert(exact.clone(), idx).is_none() {
                exact_order.push(exact);
            }
            by_base.entry(record.base_key()).or_default().push_back(idx);
        }

        Self {
            records,
            by_exact,
            exact_order,
            by_base,
        }
    }

    /// Remove an exact match, also taking it out of its slot
    fn take_exact(&mut self, key: &ExactKey) -> Option<usize> {
        let idx = self.by_exact.remove(key)?;
        if let Some(slot) = self.by_base.get_mut(key.base()) {
            slot.retain(|&candidate| candidate != idx);
        }
        Some(idx)
    }

    /// Pop the oldest remaining record of a slot, also taking its exact key
    fn take_from_slot(&mut self, key: &BaseKey) -> Option<usize> {
        let idx = self.by_base.get_mut(key)?.pop_front()?;
        self.by_exact.remove(&self.records[idx].exact_key());
        Some(idx)
    }

    /// Records still in the exact index, in first-insertion order
    fn remaining(&self) -> impl Iterator<Item = usize> + '_ {
        self.exact_order
            .iter()
            .filter_map(|key| self.by_exact.get(key).copied())
    }
}

/// Compute the plan that converges `existing` onto `desired`
///
/// Pure: the same inputs always yield the same plan.
pub fn plan(desired: Vec<NormalizedRecord>, existing: Vec<ExistingRecord>) -> SyncPlan {
    let desired: Vec<NormalizedRecord> = desired
        .into_iter()
        .filter(|record| !record.record_type.is_provider_owned())
        .collect();
    let existing: Vec<ExistingRecord> = existing
        .into_iter()
        .filter(|record| !record.record_type.is_provider_owned())
        .collect();

    let declared_slots: HashSet<BaseKey> = desired.iter().map(Keyed::base_key).collect();
    let mut index = ExistingIndex::build(existing);
    let mut plan = SyncPlan::default();

    // Phase 1: exact matches
    let mut remaining = Vec::new();
    for record in desired {
        match index.take_exact(&record.exact_key()) {
            Some(idx) => plan.unchanged.push(index.records[idx].clone()),
            None => remaining.push(record),
        }
    }

    // Phase 2: update in place or create
    for record in remaining {
        match index.take_from_slot(&record.base_key()) {
            Some(idx) => {
                plan.upsert_order.push(Upsert::Update(plan.updates.len()));
                plan.updates.push(RecordUpdate {
                    target: index.records[idx].clone(),
                    desired: record,
                });
            }
            None => {
                plan.upsert_order.push(Upsert::Create(plan.creates.len()));
                plan.creates.push(record);
            }
        }
    }

    // Phase 3: orphans in declared slots
    plan.deletes = index
        .remaining()
        .map(|idx| &index.records[idx])
        .filter(|record| declared_slots.contains(&record.base_key()))
        .cloned()
        .collect();

    plan
}
