//! Sample roster used when no data file exists yet.

use crate::model::record::{
    Address, Email, Identity, Name, Phone, Record, RecordValidationError, Subject, Tag,
};
use crate::store::record_store::RecordStore;
use log::error;

type SampleRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static [(&'static str, &'static str)],
    &'static [&'static str],
);

const SAMPLE_ROWS: &[SampleRow] = &[
    (
        "S9876543A",
        "Alex Yeoh",
        "87438807",
        "alexyeoh@example.com",
        "Blk 30 Geylang Street 29, #06-40",
        &[("Math", "A")],
        &["scholarship"],
    ),
    (
        "T0123456B",
        "Bernice Yu",
        "99272758",
        "berniceyu@example.com",
        "Blk 30 Lorong 3 Serangoon Gardens, #07-18",
        &[("Science", "B"), ("English", "A")],
        &["siblings", "paid"],
    ),
    (
        "S8765432C",
        "Charlotte Oliveiro",
        "93210283",
        "charlotte@example.com",
        "Blk 11 Ang Mo Kio Street 74, #11-04",
        &[("Chinese", "C")],
        &["siblings"],
    ),
    (
        "F1234567N",
        "David Li",
        "91031282",
        "lidavid@example.com",
        "Blk 436 Serangoon Gardens Street 26, #16-43",
        &[("Math", "B")],
        &["trial"],
    ),
    (
        "T0234567D",
        "Irfan Ibrahim",
        "92492021",
        "irfan@example.com",
        "Blk 47 Tampines Street 20, #17-35",
        &[],
        &[],
    ),
    (
        "G7654321K",
        "Roy Balakrishnan",
        "92624417",
        "royb@example.com",
        "Blk 45 Aljunied Street 85, #11-31",
        &[("English", "B"), ("Math", "A")],
        &["paid"],
    ),
];

/// Returns the sample students in display order.
pub fn sample_records() -> Vec<Record> {
    SAMPLE_ROWS
        .iter()
        .filter_map(|row| match build_sample(row) {
            Ok(record) => Some(record),
            Err(err) => {
                error!(
                    "event=sample_data module=sample status=error identity={} field={}",
                    row.0,
                    err.field()
                );
                None
            }
        })
        .collect()
}

/// Returns a store populated with [`sample_records`].
pub fn sample_store() -> RecordStore {
    let mut store = RecordStore::new();
    for record in sample_records() {
        if let Err(err) = store.add(record) {
            error!(
                "event=sample_data module=sample status=error error_kind={}",
                err.kind()
            );
        }
    }
    store
}

fn build_sample(row: &SampleRow) -> Result<Record, RecordValidationError> {
    let (identity, name, phone, email, address, subjects, tags) = *row;
    let subjects = subjects
        .iter()
        .map(|(subject, class)| Subject::parse(subject, class))
        .collect::<Result<Vec<_>, _>>()?;
    let tags = tags
        .iter()
        .map(|tag| Tag::parse(tag))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Record::new(
        Identity::parse(identity)?,
        Name::parse(name)?,
        Phone::parse(phone)?,
        Email::parse(email)?,
        Address::parse(address)?,
        subjects,
        tags,
    ))
}
