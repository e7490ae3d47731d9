//! Versioned JSON document shape for the roster and its conversions.
//!
//! # Responsibility
//! - Map records to a field-named, serde-friendly document and back.
//! - Validate every field and the store uniqueness rules on decode.
//!
//! # Invariants
//! - `decode(encode(s)) == s` for every valid store `s`.
//! - Decode reports the first offending field path, e.g. `students[2].email`.
//! - Unknown document fields are ignored; missing `subjects`/`tags` are empty.

use crate::model::record::{
    Address, Email, Identity, Name, Phone, Record, RecordValidationError, Subject, Tag,
};
use crate::store::record_store::RecordStore;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Latest roster document version written by this crate.
pub const ROSTER_FORMAT_VERSION: u32 = 1;

/// Top-level persisted roster document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDocument {
    #[serde(default = "legacy_version")]
    pub version: u32,
    pub students: Vec<RecordDocument>,
}

/// One persisted student; all fields are raw strings until decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDocument {
    pub identity: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub subjects: Vec<SubjectDocument>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDocument {
    pub subject: String,
    pub class: String,
}

/// Decode-time structural or semantic violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedDataError {
    /// Path of the first offending field, e.g. `students[0].subjects[1].class`.
    pub field: String,
    pub message: String,
}

impl MalformedDataError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Display for MalformedDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed roster data at `{}`: {}", self.field, self.message)
    }
}

impl Error for MalformedDataError {}

/// Encodes records in the given order into the current document version.
pub fn encode<'a>(records: impl IntoIterator<Item = &'a Record>) -> RosterDocument {
    RosterDocument {
        version: ROSTER_FORMAT_VERSION,
        students: records.into_iter().map(encode_record).collect(),
    }
}

/// Decodes and validates a document into a fresh store.
pub fn decode(document: &RosterDocument) -> Result<RecordStore, MalformedDataError> {
    if document.version > ROSTER_FORMAT_VERSION {
        return Err(MalformedDataError::new(
            "version",
            format!(
                "document version {} is newer than supported {ROSTER_FORMAT_VERSION}",
                document.version
            ),
        ));
    }

    let mut store = RecordStore::new();
    for (position, student) in document.students.iter().enumerate() {
        let prefix = format!("students[{position}]");
        let record = decode_record(&prefix, student)?;
        store.add(record).map_err(|err| {
            MalformedDataError::new(format!("{prefix}.identity"), err.to_string())
        })?;
    }
    Ok(store)
}

fn encode_record(record: &Record) -> RecordDocument {
    RecordDocument {
        identity: record.identity().to_string(),
        name: record.name().to_string(),
        phone: record.phone().to_string(),
        email: record.email().to_string(),
        address: record.address().to_string(),
        subjects: record
            .subjects()
            .iter()
            .map(|subject| SubjectDocument {
                subject: subject.name().to_string(),
                class: subject.class().to_string(),
            })
            .collect(),
        tags: record.tags().iter().map(Tag::to_string).collect(),
    }
}

fn decode_record(prefix: &str, student: &RecordDocument) -> Result<Record, MalformedDataError> {
    let field_error = |err: RecordValidationError| {
        MalformedDataError::new(format!("{prefix}.{}", err.field()), err.to_string())
    };

    let identity = Identity::parse(&student.identity).map_err(field_error)?;
    let name = Name::parse(&student.name).map_err(field_error)?;
    let phone = Phone::parse(&student.phone).map_err(field_error)?;
    let email = Email::parse(&student.email).map_err(field_error)?;
    let address = Address::parse(&student.address).map_err(field_error)?;

    let mut subjects = Vec::with_capacity(student.subjects.len());
    for (position, subject) in student.subjects.iter().enumerate() {
        let parsed = Subject::parse(&subject.subject, &subject.class).map_err(|err| {
            MalformedDataError::new(
                format!("{prefix}.subjects[{position}].{}", err.field()),
                err.to_string(),
            )
        })?;
        subjects.push(parsed);
    }

    let mut tags = Vec::with_capacity(student.tags.len());
    for (position, tag) in student.tags.iter().enumerate() {
        let parsed = Tag::parse(tag).map_err(|err| {
            MalformedDataError::new(format!("{prefix}.tags[{position}]"), err.to_string())
        })?;
        tags.push(parsed);
    }

    Ok(Record::new(identity, name, phone, email, address, subjects, tags))
}

fn legacy_version() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, RosterDocument, ROSTER_FORMAT_VERSION};
    use serde_json::json;

    fn document(value: serde_json::Value) -> RosterDocument {
        serde_json::from_value(value).expect("fixture should match document shape")
    }

    fn student(identity: &str, email: &str) -> serde_json::Value {
        json!({
            "identity": identity,
            "name": "Charlotte Oliveiro",
            "phone": "93210283",
            "email": email,
            "address": "Blk 11 Ang Mo Kio Street 74, #11-04",
            "subjects": [{ "subject": "English", "class": "B" }],
            "tags": ["neighbours"]
        })
    }

    #[test]
    fn decode_names_first_offending_field() {
        let doc = document(json!({
            "version": 1,
            "students": [
                student("S1111111A", "charlotte@example.com"),
                student("S2222222B", "not-an-email"),
                student("bad", "also-bad"),
            ]
        }));

        let err = decode(&doc).unwrap_err();
        assert_eq!(err.field, "students[1].email");
    }

    #[test]
    fn decode_rejects_duplicate_identity_across_entries() {
        let doc = document(json!({
            "students": [
                student("S1111111A", "first@example.com"),
                student("S1111111A", "second@example.com"),
            ]
        }));

        let err = decode(&doc).unwrap_err();
        assert_eq!(err.field, "students[1].identity");
        assert!(err.message.contains("already exists"));
    }

    #[test]
    fn decode_reports_nested_subject_and_tag_paths() {
        let mut bad_class = student("S1111111A", "c@example.com");
        bad_class["subjects"] = json!([{ "subject": "Math", "class": "" }]);
        let err = decode(&document(json!({ "students": [bad_class] }))).unwrap_err();
        assert_eq!(err.field, "students[0].subjects[0].class");

        let mut bad_tag = student("S1111111A", "c@example.com");
        bad_tag["tags"] = json!(["ok", "not ok"]);
        let err = decode(&document(json!({ "students": [bad_tag] }))).unwrap_err();
        assert_eq!(err.field, "students[0].tags[1]");
    }

    #[test]
    fn decode_rejects_newer_versions_and_defaults_missing_version() {
        let newer = document(json!({ "version": ROSTER_FORMAT_VERSION + 1, "students": [] }));
        assert_eq!(decode(&newer).unwrap_err().field, "version");

        let unversioned = document(json!({ "students": [] }));
        assert_eq!(unversioned.version, 1);
        assert!(decode(&unversioned).unwrap().is_empty());
    }

    #[test]
    fn optional_collections_and_unknown_fields_are_tolerated() {
        let doc = document(json!({
            "students": [{
                "identity": "G7654321K",
                "name": "David Li",
                "phone": "91031282",
                "email": "lidavid@example.com",
                "address": "Blk 436 Serangoon Gardens Street 26",
                "nickname": "Dave"
            }],
            "exported_by": "another build"
        }));

        let store = decode(&doc).expect("forward-compatible document");
        let record = store.iter().next().unwrap();
        assert!(record.subjects().is_empty());
        assert!(record.tags().is_empty());
        assert_eq!(decode(&encode(store.iter())).unwrap(), store);
    }
}
