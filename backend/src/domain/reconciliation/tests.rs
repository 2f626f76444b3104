//! Behaviour coverage for the registration backfill job.

use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::MockRecordStore;
use crate::outbound::document_store::InMemoryRecordStore;

fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

fn seed(store: &InMemoryRecordStore, collection: Collection, id: &str, value: Value) {
    store.insert(collection, id, document(value)).expect("seed");
}

async fn stored(store: &InMemoryRecordStore, id: &str) -> Value {
    let document = store
        .get(Collection::Registrations, id)
        .await
        .expect("get")
        .expect("registration present");
    Value::Object(document)
}

#[fixture]
fn store() -> Arc<InMemoryRecordStore> {
    let store = InMemoryRecordStore::default();
    seed(
        &store,
        Collection::Users,
        "u-1",
        json!({ "name": "Jane Doe", "email": "jane@x.org", "mobile": "9876543210", "batch": "2023" }),
    );
    seed(
        &store,
        Collection::Users,
        "u-2",
        json!({ "name": "Sam Roe", "email": "sam@x.org" }),
    );
    seed(
        &store,
        Collection::Registrations,
        "reg-empty",
        json!({ "userId": "u-1", "eventId": "evt-1" }),
    );
    seed(
        &store,
        Collection::Registrations,
        "reg-half",
        json!({ "userId": "u-1", "mobile": "1112223333" }),
    );
    seed(
        &store,
        Collection::Registrations,
        "reg-full",
        json!({ "userId": "u-2", "mobile": "5555555555", "batch": "2020" }),
    );
    seed(
        &store,
        Collection::Registrations,
        "reg-bare-user",
        json!({ "userId": "u-2" }),
    );
    Arc::new(store)
}

#[rstest]
#[tokio::test]
async fn backfills_missing_fields_and_tallies_each_record(store: Arc<InMemoryRecordStore>) {
    let job = ReconciliationJob::new(store.clone());

    let tally = job.run().await.expect("run");

    assert_eq!(
        tally,
        ReconciliationTally {
            succeeded: 2,
            skipped: 2,
            failed: 0,
        }
    );
    assert_eq!(job.state(), JobState::Complete(tally));
    assert_eq!(
        stored(&store, "reg-empty").await,
        json!({ "userId": "u-1", "eventId": "evt-1", "mobile": "9876543210", "batch": "2023" })
    );
}

#[rstest]
#[tokio::test]
async fn never_overwrites_existing_values(store: Arc<InMemoryRecordStore>) {
    ReconciliationJob::new(store.clone())
        .run()
        .await
        .expect("run");

    assert_eq!(
        stored(&store, "reg-half").await,
        json!({ "userId": "u-1", "mobile": "1112223333", "batch": "2023" })
    );
    assert_eq!(
        stored(&store, "reg-full").await,
        json!({ "userId": "u-2", "mobile": "5555555555", "batch": "2020" })
    );
}

#[rstest]
#[tokio::test]
async fn second_run_repairs_nothing(store: Arc<InMemoryRecordStore>) {
    let job = ReconciliationJob::new(store.clone());
    job.run().await.expect("first run");
    let before = store.snapshot().expect("snapshot");

    let tally = job.run().await.expect("second run");

    assert_eq!(tally.succeeded, 0);
    assert_eq!(tally.total(), 4);
    assert_eq!(store.snapshot().expect("snapshot"), before);
}

#[rstest]
#[tokio::test]
async fn orphaned_and_malformed_records_fail_without_stopping_the_scan(
    store: Arc<InMemoryRecordStore>,
) {
    seed(
        &store,
        Collection::Registrations,
        "reg-0-orphan",
        json!({ "userId": "ghost" }),
    );
    seed(
        &store,
        Collection::Registrations,
        "reg-1-malformed",
        json!({ "eventId": "evt-9" }),
    );

    let tally = ReconciliationJob::new(store.clone())
        .run()
        .await
        .expect("run");

    assert_eq!(tally.failed, 2);
    assert_eq!(tally.succeeded, 2);
    assert_eq!(
        stored(&store, "reg-0-orphan").await,
        json!({ "userId": "ghost" })
    );
}

#[tokio::test]
async fn member_profile_drift_does_not_block_the_backfill() {
    let store = InMemoryRecordStore::default();
    seed(
        &store,
        Collection::Users,
        "u-9",
        json!({
            "uid": "u-9",
            "name": "Odd",
            "role": "Admin",
            "badges": [3],
            "mobile": "9998887776",
            "batch": "2022"
        }),
    );
    seed(
        &store,
        Collection::Registrations,
        "reg-9",
        json!({ "userId": "u-9" }),
    );
    let store = Arc::new(store);

    let tally = ReconciliationJob::new(store.clone())
        .run()
        .await
        .expect("run");

    assert_eq!(
        tally,
        ReconciliationTally {
            succeeded: 1,
            skipped: 0,
            failed: 0,
        }
    );
    assert_eq!(
        stored(&store, "reg-9").await,
        json!({ "userId": "u-9", "mobile": "9998887776", "batch": "2022" })
    );
}

#[tokio::test]
async fn complete_registration_without_a_user_reference_is_skipped() {
    let mut store = MockRecordStore::new();
    store.expect_scan_all().returning(|_| {
        Ok(vec![(
            "reg-a".to_owned(),
            document(json!({ "mobile": "1234567890", "batch": "2021" })),
        )])
    });
    store.expect_get().never();
    store.expect_update().never();

    let tally = ReconciliationJob::new(Arc::new(store))
        .run()
        .await
        .expect("run");

    assert_eq!(
        tally,
        ReconciliationTally {
            succeeded: 0,
            skipped: 1,
            failed: 0,
        }
    );
}

#[tokio::test]
async fn write_failures_are_counted_per_record() {
    let mut store = MockRecordStore::new();
    store.expect_scan_all().times(1).returning(|_| {
        Ok(vec![
            ("reg-a".to_owned(), document(json!({ "userId": "u-1" }))),
            ("reg-b".to_owned(), document(json!({ "userId": "u-1" }))),
        ])
    });
    store
        .expect_get()
        .times(2)
        .returning(|_, _| Ok(Some(document(json!({ "name": "J", "email": "j@x.org", "batch": "2024" })))));
    store
        .expect_update()
        .withf(|_, id, _| id == "reg-a")
        .times(1)
        .returning(|_, _, _| Err(RecordStoreError::write("quota exceeded")));
    store
        .expect_update()
        .withf(|_, id, patch| id == "reg-b" && patch.get("batch") == Some(&json!("2024")))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let tally = ReconciliationJob::new(Arc::new(store))
        .run()
        .await
        .expect("run");

    assert_eq!(
        tally,
        ReconciliationTally {
            succeeded: 1,
            skipped: 0,
            failed: 1,
        }
    );
}

#[tokio::test]
async fn complete_registrations_skip_the_member_lookup() {
    let mut store = MockRecordStore::new();
    store.expect_scan_all().returning(|_| {
        Ok(vec![(
            "reg-a".to_owned(),
            document(json!({ "userId": "u-1", "mobile": "1234567890", "batch": "2021" })),
        )])
    });
    store.expect_get().never();
    store.expect_update().never();

    let tally = ReconciliationJob::new(Arc::new(store))
        .run()
        .await
        .expect("run");

    assert_eq!(tally.skipped, 1);
}

#[tokio::test]
async fn scan_failure_aborts_the_job() {
    let mut store = MockRecordStore::new();
    store
        .expect_scan_all()
        .returning(|_| Err(RecordStoreError::unavailable("network down")));
    let job = ReconciliationJob::new(Arc::new(store));

    let err = job.run().await.expect_err("scan must fail");

    assert_eq!(
        err,
        ReconciliationError::StoreUnavailable(RecordStoreError::unavailable("network down"))
    );
    assert!(matches!(job.state(), JobState::Error(message) if message.contains("network down")));
}

#[rstest]
#[case(None, RepairDecision::Orphaned)]
#[case(Some(("9876543210", "2023")), RepairDecision::AlreadyComplete)]
fn decisions_without_a_member(
    #[case] fields: Option<(&str, &str)>,
    #[case] expected: RepairDecision,
) {
    let registration = match fields {
        Some((mobile, batch)) => RegistrationRecord::new(
            "r",
            Some("u-1".to_owned()),
            Some(mobile.to_owned()),
            Some(batch.to_owned()),
        ),
        None => RegistrationRecord::new("r", Some("u-1".to_owned()), None, None),
    };

    assert_eq!(decide_repair(&registration, None), expected);
}

#[test]
fn member_without_fields_leaves_nothing_to_copy() {
    let registration = RegistrationRecord::new("r", Some("u-1".to_owned()), None, None);

    assert_eq!(
        decide_repair(&registration, Some(&MemberContact::default())),
        RepairDecision::NothingToCopy
    );
}
