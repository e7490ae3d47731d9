//! Student record domain model.
//!
//! # Responsibility
//! - Define the canonical student record shared by store, view and storage.
//! - Validate every field at construction time through typed newtypes.
//!
//! # Invariants
//! - A `Record` can only hold field values that passed `parse`.
//! - Records are immutable values; enrollment returns a new `Record`.
//! - "Same identity" compares `identity` only; `PartialEq` compares all fields.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const NAME_MAX_CHARS: usize = 100;
const SUBJECT_NAME_MAX_CHARS: usize = 50;
const CLASS_LABEL_MAX_CHARS: usize = 20;
const TAG_MAX_CHARS: usize = 30;

static IDENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[STFGM][0-9]{7}[A-Z]$").expect("valid identity regex"));
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z ]*$").expect("valid name regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3,}$").expect("valid phone regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9]+([+_.\-][A-Za-z0-9]+)*@([A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?\.)*[A-Za-z0-9][A-Za-z0-9\-]*[A-Za-z0-9]$",
    )
    .expect("valid email regex")
});
static SUBJECT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ]*$").expect("valid subject regex"));
static ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid alphanumeric regex"));

/// Field-level validation failure for record construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    InvalidIdentity(String),
    InvalidName(String),
    InvalidPhone(String),
    InvalidEmail(String),
    /// Address must contain at least one non-whitespace character.
    BlankAddress,
    InvalidSubjectName(String),
    InvalidClassLabel(String),
    InvalidTag(String),
}

impl RecordValidationError {
    /// Returns the record field name this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidIdentity(_) => "identity",
            Self::InvalidName(_) => "name",
            Self::InvalidPhone(_) => "phone",
            Self::InvalidEmail(_) => "email",
            Self::BlankAddress => "address",
            Self::InvalidSubjectName(_) => "subject",
            Self::InvalidClassLabel(_) => "class",
            Self::InvalidTag(_) => "tag",
        }
    }
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentity(value) => write!(
                f,
                "invalid NRIC `{value}`: expected one of S/T/F/G/M, 7 digits and an uppercase letter"
            ),
            Self::InvalidName(value) => write!(
                f,
                "invalid name `{value}`: must be 1-{NAME_MAX_CHARS} characters of alphabets and spaces"
            ),
            Self::InvalidPhone(value) => write!(
                f,
                "invalid phone `{value}`: must contain only digits and be at least 3 digits long"
            ),
            Self::InvalidEmail(value) => {
                write!(f, "invalid email `{value}`: expected local-part@domain")
            }
            Self::BlankAddress => write!(f, "address must not be blank"),
            Self::InvalidSubjectName(value) => write!(
                f,
                "invalid subject `{value}`: must be 1-{SUBJECT_NAME_MAX_CHARS} alphanumeric characters or spaces"
            ),
            Self::InvalidClassLabel(value) => write!(
                f,
                "invalid class `{value}`: must be 1-{CLASS_LABEL_MAX_CHARS} alphanumeric characters"
            ),
            Self::InvalidTag(value) => write!(
                f,
                "invalid tag `{value}`: must be 1-{TAG_MAX_CHARS} alphanumeric characters"
            ),
        }
    }
}

impl Error for RecordValidationError {}

/// National registration ID uniquely identifying a student.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    /// Parses a trimmed, case-sensitive NRIC such as `S1234567A`.
    pub fn parse(raw: &str) -> Result<Self, RecordValidationError> {
        let trimmed = raw.trim();
        if !IDENTITY_RE.is_match(trimmed) {
            return Err(RecordValidationError::InvalidIdentity(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Student display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn parse(raw: &str) -> Result<Self, RecordValidationError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() > NAME_MAX_CHARS || !NAME_RE.is_match(trimmed) {
            return Err(RecordValidationError::InvalidName(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Phone(String);

impl Phone {
    pub fn parse(raw: &str) -> Result<Self, RecordValidationError> {
        let trimmed = raw.trim();
        if !PHONE_RE.is_match(trimmed) {
            return Err(RecordValidationError::InvalidPhone(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, RecordValidationError> {
        let trimmed = raw.trim();
        if !EMAIL_RE.is_match(trimmed) {
            return Err(RecordValidationError::InvalidEmail(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, RecordValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RecordValidationError::BlankAddress);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One enrollment: a subject taught in a specific class/group.
///
/// Ordering is `(name, class)`, which is also the persisted list order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subject {
    name: String,
    class: String,
}

impl Subject {
    pub fn parse(name: &str, class: &str) -> Result<Self, RecordValidationError> {
        let name_trimmed = name.trim();
        if name_trimmed.chars().count() > SUBJECT_NAME_MAX_CHARS
            || !SUBJECT_NAME_RE.is_match(name_trimmed)
        {
            return Err(RecordValidationError::InvalidSubjectName(name.to_string()));
        }
        let class_trimmed = class.trim();
        if class_trimmed.chars().count() > CLASS_LABEL_MAX_CHARS
            || !ALNUM_RE.is_match(class_trimmed)
        {
            return Err(RecordValidationError::InvalidClassLabel(class.to_string()));
        }
        Ok(Self {
            name: name_trimmed.to_string(),
            class: class_trimmed.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &str {
        &self.class
    }
}

/// Free-form alphanumeric label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub fn parse(raw: &str) -> Result<Self, RecordValidationError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() > TAG_MAX_CHARS || !ALNUM_RE.is_match(trimmed) {
            return Err(RecordValidationError::InvalidTag(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Identity, Name, Phone, Email, Address, Tag);

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} ({})]", self.name, self.class)
    }
}

/// Canonical student record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    identity: Identity,
    name: Name,
    phone: Phone,
    email: Email,
    address: Address,
    subjects: BTreeSet<Subject>,
    tags: BTreeSet<Tag>,
}

impl Record {
    /// Assembles a record from already-validated field values.
    ///
    /// Duplicate subjects or tags collapse into one entry.
    pub fn new(
        identity: Identity,
        name: Name,
        phone: Phone,
        email: Email,
        address: Address,
        subjects: impl IntoIterator<Item = Subject>,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Self {
        Self {
            identity,
            name,
            phone,
            email,
            address,
            subjects: subjects.into_iter().collect(),
            tags: tags.into_iter().collect(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn phone(&self) -> &Phone {
        &self.phone
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn subjects(&self) -> &BTreeSet<Subject> {
        &self.subjects
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    /// Returns whether both records carry the same identity.
    pub fn is_same_identity(&self, other: &Record) -> bool {
        self.identity == other.identity
    }

    /// Returns whether this record already holds the exact (subject, class) pair.
    pub fn is_enrolled(&self, subject: &Subject) -> bool {
        self.subjects.contains(subject)
    }

    /// Returns a copy of this record with `subject` added.
    ///
    /// Callers that need duplicate-enrollment rejection check
    /// [`Record::is_enrolled`] first; this helper is idempotent.
    pub fn with_subject(&self, subject: Subject) -> Record {
        let mut updated = self.clone();
        updated.subjects.insert(subject);
        updated
    }

    /// Lexicographically smallest class label, used as the class sort key.
    pub fn primary_class(&self) -> Option<&str> {
        self.subjects.iter().map(Subject::class).min()
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}; Phone: {}; Email: {}; Address: {}; NRIC: {}; Subjects: ",
            self.name, self.phone, self.email, self.address, self.identity
        )?;
        if self.subjects.is_empty() {
            f.write_str("none")?;
        }
        for subject in &self.subjects {
            write!(f, "{subject}")?;
        }
        f.write_str("; Tags: ")?;
        if self.tags.is_empty() {
            f.write_str("none")?;
        }
        for tag in &self.tags {
            write!(f, "[{tag}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Address, Email, Identity, Name, Phone, Record, RecordValidationError, Subject, Tag,
    };

    fn sample() -> Record {
        Record::new(
            Identity::parse("S1234567A").unwrap(),
            Name::parse("Alex Yeoh").unwrap(),
            Phone::parse("87438807").unwrap(),
            Email::parse("alexyeoh@example.com").unwrap(),
            Address::parse("Blk 30 Geylang Street 29, #06-40").unwrap(),
            [Subject::parse("Math", "A").unwrap()],
            [Tag::parse("friends").unwrap()],
        )
    }

    #[test]
    fn identity_requires_prefix_digits_and_checksum_letter() {
        assert!(Identity::parse("S1234567A").is_ok());
        assert!(Identity::parse(" T7654321Z ").is_ok());
        assert!(Identity::parse("s1234567a").is_err());
        assert!(Identity::parse("A1234567B").is_err());
        assert!(Identity::parse("S123456A").is_err());
    }

    #[test]
    fn name_rejects_digits_blank_and_overlong_values() {
        assert!(Name::parse("Bernice Yu").is_ok());
        assert!(matches!(
            Name::parse("R2D2"),
            Err(RecordValidationError::InvalidName(_))
        ));
        assert!(Name::parse("   ").is_err());
        assert!(Name::parse(&"a".repeat(100)).is_ok());
        assert!(Name::parse(&"a".repeat(101)).is_err());
    }

    #[test]
    fn email_accepts_common_shapes_and_rejects_malformed_ones() {
        assert!(Email::parse("a.b+c@mail.example.com").is_ok());
        assert!(Email::parse("peter_jack-1190@example.co").is_ok());
        assert!(Email::parse("no-at-sign").is_err());
        assert!(Email::parse(".lead@example.com").is_err());
        assert!(Email::parse("user@example.c").is_err());
    }

    #[test]
    fn phone_and_address_validation() {
        assert!(Phone::parse("911").is_ok());
        assert!(Phone::parse("91").is_err());
        assert!(Phone::parse("9123 4567").is_err());
        assert_eq!(Address::parse("  "), Err(RecordValidationError::BlankAddress));
    }

    #[test]
    fn validation_errors_name_their_field() {
        let err = Subject::parse("Math", "A-1").unwrap_err();
        assert_eq!(err.field(), "class");
        assert_eq!(Tag::parse("two words").unwrap_err().field(), "tag");
    }

    #[test]
    fn with_subject_returns_new_value_and_keeps_original() {
        let record = sample();
        let extra = Subject::parse("Math", "B").unwrap();
        let updated = record.with_subject(extra.clone());

        assert!(!record.is_enrolled(&extra));
        assert!(updated.is_enrolled(&extra));
        assert!(updated.is_same_identity(&record));
        assert_ne!(updated, record);
    }

    #[test]
    fn primary_class_is_smallest_label() {
        let record = sample().with_subject(Subject::parse("Science", "0B").unwrap());
        assert_eq!(record.primary_class(), Some("0B"));
    }

    #[test]
    fn display_lists_each_subject_once() {
        let rendered = sample().to_string();
        assert_eq!(
            rendered,
            "Alex Yeoh; Phone: 87438807; Email: alexyeoh@example.com; \
             Address: Blk 30 Geylang Street 29, #06-40; NRIC: S1234567A; \
             Subjects: [Math (A)]; Tags: [friends]"
        );
        assert_eq!(rendered.matches("Math").count(), 1);
    }

    #[test]
    fn display_marks_empty_subjects_and_tags() {
        let bare = Record::new(
            Identity::parse("T0234567D").unwrap(),
            Name::parse("Irfan Ibrahim").unwrap(),
            Phone::parse("92492021").unwrap(),
            Email::parse("irfan@example.com").unwrap(),
            Address::parse("Blk 47 Tampines Street 20").unwrap(),
            [],
            [],
        );
        let rendered = bare.to_string();
        assert!(rendered.ends_with("NRIC: T0234567D; Subjects: none; Tags: none"));
    }
}
