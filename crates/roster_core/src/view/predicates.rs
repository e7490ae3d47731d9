//! Predicate builders for "find"-style filtering.
//!
//! The command layer decides which matching mode to use; the view only
//! applies whatever predicate it receives.
//!
//! # Invariants
//! - Every text comparison (names, tags, subjects, class labels) ignores
//!   case. Identity matching is exact, since NRICs are stored uppercase.

use crate::model::record::{Identity, Record};
use crate::view::filtered_view::RecordPredicate;
use std::sync::Arc;

/// How name keywords are compared against a student's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatch {
    /// Keyword must equal one whitespace-separated name token.
    #[default]
    Token,
    /// Keyword may appear anywhere in the name.
    Substring,
}

/// Matches records whose name matches any keyword, ignoring case.
///
/// Blank keywords are ignored; with no usable keywords nothing matches.
pub fn name_contains_keywords<I, S>(keywords: I, mode: NameMatch) -> RecordPredicate
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let keywords = keywords
        .into_iter()
        .map(|keyword| keyword.as_ref().trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect::<Vec<_>>();

    Arc::new(move |record: &Record| {
        let name = record.name().as_str().to_lowercase();
        keywords.iter().any(|keyword| match mode {
            NameMatch::Token => name.split_whitespace().any(|token| token == keyword),
            NameMatch::Substring => name.contains(keyword.as_str()),
        })
    })
}

pub fn identity_is(identity: Identity) -> RecordPredicate {
    Arc::new(move |record: &Record| *record.identity() == identity)
}

pub fn has_tag(tag: &str) -> RecordPredicate {
    let wanted = tag.trim().to_lowercase();
    Arc::new(move |record: &Record| {
        record
            .tags()
            .iter()
            .any(|tag| tag.as_str().to_lowercase() == wanted)
    })
}

/// Matches students taking `subject` in any class, ignoring case.
pub fn enrolled_in_subject(subject: &str) -> RecordPredicate {
    let wanted = subject.trim().to_lowercase();
    Arc::new(move |record: &Record| {
        record
            .subjects()
            .iter()
            .any(|held| held.name().to_lowercase() == wanted)
    })
}

/// Matches students with at least one enrollment in class `label`, ignoring case.
pub fn in_class(label: &str) -> RecordPredicate {
    let wanted = label.trim().to_lowercase();
    Arc::new(move |record: &Record| {
        record
            .subjects()
            .iter()
            .any(|held| held.class().to_lowercase() == wanted)
    })
}

/// Conjunction of `predicates`; an empty list accepts everything.
pub fn all_of(predicates: Vec<RecordPredicate>) -> RecordPredicate {
    Arc::new(move |record: &Record| predicates.iter().all(|predicate| predicate(record)))
}
