//! Filtered, sorted read projection over the record store.
//!
//! # Responsibility
//! - Hold the active predicate and ordering chosen by the command layer.
//! - Recompute the visible sequence from the store on demand.
//!
//! # Invariants
//! - The view never mutates or caches store contents.
//! - Filtering is applied before ordering; ordering is stable.

use crate::model::record::Record;
use crate::store::record_store::RecordStore;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Shared record predicate installed into a [`FilteredView`].
pub type RecordPredicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// `set_predicate` was called without a predicate.
    MissingPredicate,
}

impl Display for ViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPredicate => write!(
                f,
                "a predicate is required; use show_all() to clear the filter"
            ),
        }
    }
}

impl Error for ViewError {}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Insertion,
    /// Case-insensitive name order.
    Name,
    /// Smallest class label first; students without classes last.
    Class,
}

pub struct FilteredView {
    predicate: RecordPredicate,
    order: SortOrder,
}

impl Debug for FilteredView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilteredView")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl Default for FilteredView {
    fn default() -> Self {
        Self {
            predicate: show_all_predicate(),
            order: SortOrder::Insertion,
        }
    }
}

impl FilteredView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active predicate.
    ///
    /// # Errors
    /// - `MissingPredicate` when `predicate` is `None`; the filter is unchanged.
    pub fn set_predicate(&mut self, predicate: Option<RecordPredicate>) -> Result<(), ViewError> {
        let predicate = predicate.ok_or(ViewError::MissingPredicate)?;
        self.predicate = predicate;
        Ok(())
    }

    /// Restores the accept-all default predicate.
    pub fn show_all(&mut self) {
        self.predicate = show_all_predicate();
    }

    pub fn sort_by_name(&mut self) {
        self.order = SortOrder::Name;
    }

    pub fn sort_by_class(&mut self) {
        self.order = SortOrder::Class;
    }

    pub fn sort_by_insertion(&mut self) {
        self.order = SortOrder::Insertion;
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Returns the visible records: predicate first, then the active ordering.
    ///
    /// Recomputed from `store` on every call, so callers re-pull after each
    /// store revision change.
    pub fn current_view<'a>(&self, store: &'a RecordStore) -> Vec<&'a Record> {
        let mut visible = store
            .iter()
            .filter(|&record| (self.predicate)(record))
            .collect::<Vec<_>>();
        match self.order {
            SortOrder::Insertion => {}
            SortOrder::Name => visible.sort_by(|a, b| compare_by_name(a, b)),
            SortOrder::Class => visible.sort_by(|a, b| compare_by_class(a, b)),
        }
        visible
    }
}

/// Name order used by [`SortOrder::Name`].
pub fn compare_by_name(a: &Record, b: &Record) -> Ordering {
    a.name()
        .as_str()
        .to_lowercase()
        .cmp(&b.name().as_str().to_lowercase())
}

/// Class order used by [`SortOrder::Class`].
pub fn compare_by_class(a: &Record, b: &Record) -> Ordering {
    match (a.primary_class(), b.primary_class()) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn show_all_predicate() -> RecordPredicate {
    Arc::new(|_: &Record| true)
}
