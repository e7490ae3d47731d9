//! Uniqueness-enforcing record collection.
//!
//! # Responsibility
//! - Provide CRUD and identity lookup over student records.
//! - Publish a monotonically increasing revision as the change notification.
//!
//! # Invariants
//! - No two members share `identity`; no two members are field-equal.
//! - `index[identity]` always points at the member's current position.
//! - `revision` increments exactly once per successful mutation.

use crate::model::record::{Identity, Record, Subject};
use log::debug;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Semantic errors returned by store mutations and lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another member already uses this identity.
    DuplicateIdentity(Identity),
    /// A field-equal member already exists.
    DuplicateRecord(Identity),
    /// The student already takes this subject in this class.
    DuplicateEnrollment { identity: Identity, subject: Subject },
    NotFound(Identity),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateIdentity(id) => {
                write!(f, "a student with NRIC {id} already exists")
            }
            Self::DuplicateRecord(id) => {
                write!(f, "this student already exists in the roster: {id}")
            }
            Self::DuplicateEnrollment { identity, subject } => write!(
                f,
                "student {identity} is already enrolled in {} class {}",
                subject.name(),
                subject.class()
            ),
            Self::NotFound(id) => write!(f, "no student found with NRIC {id}"),
        }
    }
}

impl StoreError {
    /// Stable snake_case name used as `error_kind` in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateIdentity(_) => "duplicate_identity",
            Self::DuplicateRecord(_) => "duplicate_record",
            Self::DuplicateEnrollment { .. } => "duplicate_enrollment",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl Error for StoreError {}

/// Immutable, cheaply clonable copy of the store contents in canonical order.
///
/// Safe to move to another thread while the live store keeps changing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSnapshot(Arc<[Record]>);

impl RosterSnapshot {
    pub fn records(&self) -> &[Record] {
        &self.0
    }
}

impl Deref for RosterSnapshot {
    type Target = [Record];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Insertion-ordered student collection with an identity index.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    index: HashMap<Identity, usize>,
    revision: u64,
}

impl PartialEq for RecordStore {
    /// Two stores are equal when they hold the same records in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for RecordStore {}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store by adding `records` in order.
    ///
    /// # Errors
    /// - Returns the first uniqueness violation encountered.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> StoreResult<Self> {
        let mut store = Self::new();
        for record in records {
            store.insert_checked(record)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Change counter observed by views and the presentation layer.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Appends `record` after checking uniqueness.
    ///
    /// # Errors
    /// - `DuplicateRecord` when a field-equal member exists.
    /// - `DuplicateIdentity` when another member shares the identity.
    pub fn add(&mut self, record: Record) -> StoreResult<()> {
        let identity = record.identity().clone();
        if let Err(err) = self.insert_checked(record) {
            debug!(
                "event=store_add module=store status=rejected identity={identity} reason={}",
                err.kind()
            );
            return Err(err);
        }
        self.revision += 1;
        debug!(
            "event=store_add module=store status=ok identity={identity} size={}",
            self.records.len()
        );
        Ok(())
    }

    /// Removes the member identity-equal to `target`.
    pub fn remove(&mut self, target: &Record) -> StoreResult<Record> {
        let position = self.position_of(target.identity())?;
        let removed = self.records.remove(position);
        self.index.remove(removed.identity());
        for (offset, record) in self.records[position..].iter().enumerate() {
            self.index.insert(record.identity().clone(), position + offset);
        }
        self.revision += 1;
        debug!(
            "event=store_remove module=store status=ok identity={} size={}",
            removed.identity(),
            self.records.len()
        );
        Ok(removed)
    }

    /// Substitutes `replacement` for the member identity-equal to `target`.
    ///
    /// The replacement keeps the target's position and may change identity,
    /// as long as it does not collide with a different member.
    pub fn replace(&mut self, target: &Record, replacement: Record) -> StoreResult<()> {
        let position = self.position_of(target.identity())?;
        if let Some(&other) = self.index.get(replacement.identity()) {
            if other != position {
                let err = if self.records[other] == replacement {
                    StoreError::DuplicateRecord(replacement.identity().clone())
                } else {
                    StoreError::DuplicateIdentity(replacement.identity().clone())
                };
                debug!(
                    "event=store_replace module=store status=rejected identity={} reason={}",
                    target.identity(),
                    err.kind()
                );
                return Err(err);
            }
        }

        let previous = std::mem::replace(&mut self.records[position], replacement);
        if previous.identity() != self.records[position].identity() {
            self.index.remove(previous.identity());
            let identity = self.records[position].identity().clone();
            self.index.insert(identity, position);
        }
        self.revision += 1;
        debug!(
            "event=store_replace module=store status=ok identity={} position={position}",
            self.records[position].identity()
        );
        Ok(())
    }

    /// O(1) lookup by identity.
    pub fn find_by_identity(&self, identity: &Identity) -> StoreResult<&Record> {
        let position = self.position_of(identity)?;
        Ok(&self.records[position])
    }

    /// Enrolls the stored record identity-equal to `target` in `subject`.
    ///
    /// Returns the updated record value; the stored entry is swapped in place.
    ///
    /// # Errors
    /// - `NotFound` when no member matches `target`.
    /// - `DuplicateEnrollment` when the (subject, class) pair is already held.
    pub fn add_subject_to_record(
        &mut self,
        target: &Record,
        subject: Subject,
    ) -> StoreResult<Record> {
        let stored = self.find_by_identity(target.identity())?.clone();
        if stored.is_enrolled(&subject) {
            debug!(
                "event=store_enroll module=store status=rejected identity={} reason=duplicate_enrollment",
                stored.identity()
            );
            return Err(StoreError::DuplicateEnrollment {
                identity: stored.identity().clone(),
                subject,
            });
        }

        let updated = stored.with_subject(subject);
        self.replace(&stored, updated.clone())?;
        Ok(updated)
    }

    /// Returns whether a field-equal record is stored.
    pub fn contains(&self, record: &Record) -> bool {
        self.index
            .get(record.identity())
            .is_some_and(|&position| self.records[position] == *record)
    }

    pub fn contains_identity(&self, identity: &Identity) -> bool {
        self.index.contains_key(identity)
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot(Arc::from(self.records.as_slice()))
    }

    /// Replaces the whole contents with `other`, e.g. after a load.
    pub fn set_records(&mut self, other: RecordStore) {
        self.records = other.records;
        self.index = other.index;
        self.revision += 1;
        debug!(
            "event=store_reset module=store status=ok size={}",
            self.records.len()
        );
    }

    fn position_of(&self, identity: &Identity) -> StoreResult<usize> {
        self.index
            .get(identity)
            .copied()
            .ok_or_else(|| StoreError::NotFound(identity.clone()))
    }

    fn insert_checked(&mut self, record: Record) -> StoreResult<()> {
        if let Some(&position) = self.index.get(record.identity()) {
            return Err(if self.records[position] == record {
                StoreError::DuplicateRecord(record.identity().clone())
            } else {
                StoreError::DuplicateIdentity(record.identity().clone())
            });
        }
        self.index.insert(record.identity().clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }
}
