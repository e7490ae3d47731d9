use roster_core::{
    Address, Email, Identity, Name, Phone, Record, RecordStore, StoreError, Subject, Tag,
};
use std::collections::HashSet;

fn student(id: &str, name: &str, subjects: &[(&str, &str)]) -> Record {
    Record::new(
        Identity::parse(id).unwrap(),
        Name::parse(name).unwrap(),
        Phone::parse("91234567").unwrap(),
        Email::parse("student@example.com").unwrap(),
        Address::parse("Blk 1 Clementi Road").unwrap(),
        subjects
            .iter()
            .map(|(subject, class)| Subject::parse(subject, class).unwrap()),
        [Tag::parse("new").unwrap()],
    )
}

fn identities(store: &RecordStore) -> Vec<String> {
    store.iter().map(|record| record.identity().to_string()).collect()
}

fn assert_unique(store: &RecordStore) {
    let distinct = store
        .iter()
        .map(|record| record.identity().clone())
        .collect::<HashSet<_>>();
    assert_eq!(distinct.len(), store.len());
}

#[test]
fn duplicate_identity_is_rejected_and_store_is_unchanged() {
    let mut store = RecordStore::new();
    store
        .add(student("S1234567A", "Ann Tan", &[]))
        .expect("first add");
    let before = store.clone();

    let err = store.add(student("S1234567A", "Ben Lim", &[])).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateIdentity(ref id) if id.as_str() == "S1234567A"));
    assert_eq!(store, before);
    assert_eq!(store.len(), 1);
}

#[test]
fn field_equal_record_is_reported_as_duplicate_record() {
    let mut store = RecordStore::new();
    store
        .add(student("S1234567A", "Ann Tan", &[]))
        .expect("first add");

    let err = store.add(student("S1234567A", "Ann Tan", &[])).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateRecord(_)));
}

#[test]
fn enrollment_adds_subject_once_and_rejects_repeat() {
    let mut store = RecordStore::new();
    let ann = student("S1234567A", "Ann Tan", &[]);
    store.add(ann.clone()).expect("add");
    let math_a = Subject::parse("Math", "A").unwrap();

    let updated = store
        .add_subject_to_record(&ann, math_a.clone())
        .expect("first enrollment");
    assert!(updated.is_enrolled(&math_a));
    assert_eq!(
        store.find_by_identity(ann.identity()).expect("stored"),
        &updated
    );

    let before = store.clone();
    let err = store.add_subject_to_record(&updated, math_a).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEnrollment { .. }));
    assert_eq!(store, before);
    assert_eq!(
        store
            .find_by_identity(ann.identity())
            .expect("stored")
            .subjects()
            .len(),
        1
    );
}

#[test]
fn same_subject_in_another_class_is_a_distinct_enrollment() {
    let mut store = RecordStore::new();
    let ann = student("S1234567A", "Ann Tan", &[("Math", "A")]);
    store.add(ann.clone()).expect("add");

    let updated = store
        .add_subject_to_record(&ann, Subject::parse("Math", "B").unwrap())
        .expect("different class");
    assert_eq!(updated.subjects().len(), 2);
}

#[test]
fn remove_and_replace_report_missing_targets() {
    let mut store = RecordStore::new();
    let ghost = student("T7654321Z", "Ghost", &[]);

    assert!(matches!(store.remove(&ghost), Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.replace(&ghost, student("T7654321Z", "Ghost Two", &[])),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.find_by_identity(ghost.identity()),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.add_subject_to_record(&ghost, Subject::parse("Math", "A").unwrap()),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn replace_keeps_position_and_may_change_identity() {
    let mut store = RecordStore::from_records([
        student("S1111111A", "Ann Tan", &[]),
        student("S2222222B", "Ben Lim", &[]),
        student("S3333333C", "Cai Ng", &[]),
    ])
    .expect("seed");

    let ben = store
        .find_by_identity(&Identity::parse("S2222222B").unwrap())
        .expect("ben")
        .clone();
    store
        .replace(&ben, student("S4444444D", "Ben Lim", &[]))
        .expect("identity change");

    assert_eq!(identities(&store), ["S1111111A", "S4444444D", "S3333333C"]);
    assert!(!store.contains_identity(ben.identity()));
    assert!(store.contains_identity(&Identity::parse("S4444444D").unwrap()));
}

#[test]
fn replace_rejects_collision_with_another_member() {
    let mut store = RecordStore::from_records([
        student("S1111111A", "Ann Tan", &[]),
        student("S2222222B", "Ben Lim", &[]),
    ])
    .expect("seed");
    let ann = student("S1111111A", "Ann Tan", &[]);
    let before = store.clone();

    let identity_clash = store
        .replace(&ann, student("S2222222B", "Someone Else", &[]))
        .unwrap_err();
    assert!(matches!(identity_clash, StoreError::DuplicateIdentity(_)));

    let record_clash = store
        .replace(&ann, student("S2222222B", "Ben Lim", &[]))
        .unwrap_err();
    assert!(matches!(record_clash, StoreError::DuplicateRecord(_)));
    assert_eq!(store, before);

    // Replacing a member with an edited copy of itself is allowed.
    store
        .replace(&ann, student("S1111111A", "Ann Tan Mei", &[]))
        .expect("self replace");
    assert_eq!(store.len(), 2);
}

#[test]
fn uniqueness_holds_across_mixed_mutation_sequences() {
    let mut store = RecordStore::new();
    let ids = ["S1000000A", "S2000000B", "S3000000C", "S4000000D"];
    let names = ["Ann Tan", "Ben Lim", "Cai Ng", "Dee Ong"];

    for step in 0..40usize {
        let id = ids[step % ids.len()];
        let name = names[(step / ids.len()) % names.len()];
        let candidate = student(id, name, &[]);
        match step % 3 {
            0 => {
                let _ = store.add(candidate);
            }
            1 => {
                let target = store.iter().nth(step % 2).cloned();
                if let Some(target) = target {
                    let _ = store.replace(&target, candidate);
                }
            }
            _ => {
                if step % 5 == 0 {
                    let target = store.iter().next().cloned();
                    if let Some(target) = target {
                        store.remove(&target).expect("present member");
                    }
                } else {
                    let _ = store.add(candidate);
                }
            }
        }
        assert_unique(&store);
        for record in store.iter() {
            assert!(store.contains(record));
            assert_eq!(
                store.find_by_identity(record.identity()).expect("indexed"),
                record
            );
        }
    }
}

#[test]
fn contains_distinguishes_field_equality_from_identity() {
    let store = RecordStore::from_records([student("S1111111A", "Ann Tan", &[])]).expect("seed");

    assert!(store.contains(&student("S1111111A", "Ann Tan", &[])));
    assert!(!store.contains(&student("S1111111A", "Ann Tan", &[("Math", "A")])));
    assert!(store.contains_identity(&Identity::parse("S1111111A").unwrap()));
}

#[test]
fn from_records_rejects_duplicates() {
    let err = RecordStore::from_records([
        student("S1111111A", "Ann Tan", &[]),
        student("S1111111A", "Other Name", &[]),
    ])
    .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateIdentity(_)));
}

#[test]
fn set_records_swaps_contents_and_bumps_revision() {
    let mut store =
        RecordStore::from_records([student("S1111111A", "Ann Tan", &[])]).expect("seed");
    let replacement =
        RecordStore::from_records([student("S2222222B", "Ben Lim", &[])]).expect("replacement");
    let revision = store.revision();

    store.set_records(replacement.clone());
    assert_eq!(store, replacement);
    assert!(store.revision() > revision);
    assert!(store
        .find_by_identity(&Identity::parse("S2222222B").unwrap())
        .is_ok());
}
