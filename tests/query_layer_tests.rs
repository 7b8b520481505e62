// Read-side tests: the pending triage queue and the paginated device and
// employee history queries.

mod support;

use chrono::{TimeZone, Utc};
use rstest::rstest;
use uuid::Uuid;

use punch_ledger::application::queries::{PunchQueries, TriageResolution};
use punch_ledger::core::punch::PunchType;

use support::{CaptureBuilder, DEVICE, Harness, TENANT};

#[rstest]
#[tokio::test]
async fn it_should_return_an_empty_pending_set_when_nothing_failed() {
    let harness = Harness::new().await;
    harness.ingest(CaptureBuilder::new().build()).await;

    let pending = harness.ledger.pending_punches(TENANT).await.unwrap();
    assert!(pending.is_empty());
}

#[rstest]
#[tokio::test]
async fn it_should_queue_resolution_failures_for_triage() {
    let harness = Harness::new().await;
    let failed = harness
        .ingest(CaptureBuilder::new().user("no-such-badge").build())
        .await;

    let pending = harness.ledger.pending_punches(TENANT).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(Some(pending[0].id), failed.punch_record_id);
}

#[rstest]
#[case(TriageResolution::Linked)]
#[case(TriageResolution::Dismissed)]
#[tokio::test]
async fn it_should_drop_a_punch_from_the_pending_set_once_triaged(
    #[case] resolution: TriageResolution,
) {
    let harness = Harness::new().await;
    let failed = harness
        .ingest(CaptureBuilder::new().user("no-such-badge").build())
        .await;
    let punch_id = failed.punch_record_id.unwrap();

    harness
        .ledger
        .mark_triaged(TENANT, punch_id, resolution)
        .await
        .unwrap();

    let pending = harness.ledger.pending_punches(TENANT).await.unwrap();
    assert!(pending.is_empty());
}

#[rstest]
#[tokio::test]
async fn it_should_refuse_to_triage_an_accepted_punch() {
    let harness = Harness::new().await;
    let accepted = harness.ingest(CaptureBuilder::new().build()).await;

    let result = harness
        .ledger
        .mark_triaged(
            TENANT,
            accepted.punch_record_id.unwrap(),
            TriageResolution::Dismissed,
        )
        .await;
    assert!(result.is_err());
}

#[rstest]
#[tokio::test]
async fn it_should_isolate_pending_punches_per_tenant() {
    let harness = Harness::new().await;
    harness
        .ingest(CaptureBuilder::new().user("no-such-badge").build())
        .await;

    let other_tenant = Uuid::from_u128(0xA2);
    let pending = harness.ledger.pending_punches(other_tenant).await.unwrap();
    assert!(pending.is_empty());
}

#[rstest]
#[tokio::test]
async fn it_should_fetch_one_punch_by_id_within_the_tenant() {
    let harness = Harness::new().await;
    let result = harness.ingest(CaptureBuilder::new().build()).await;
    let punch_id = result.punch_record_id.unwrap();

    let found = harness.ledger.punch_by_id(TENANT, punch_id).await.unwrap();
    assert_eq!(found.map(|p| p.id), Some(punch_id));

    let other_tenant = Uuid::from_u128(0xA2);
    assert!(
        harness
            .ledger
            .punch_by_id(other_tenant, punch_id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        harness
            .ledger
            .punch_by_id(TENANT, Uuid::now_v7())
            .await
            .unwrap()
            .is_none()
    );
}

/// Three employees, eight accepted punches each, all on the harness device.
async fn seed_history(harness: &Harness) {
    harness.add_employee("43", "Edsger Dijkstra").await;
    harness.add_employee("44", "Barbara Liskov").await;
    for (offset, user) in ["42", "43", "44"].iter().enumerate() {
        for i in 0..8u32 {
            let punch_type = if i % 2 == 0 {
                PunchType::CheckIn
            } else {
                PunchType::CheckOut
            };
            let minutes = i * 16 + offset as u32;
            let result = harness
                .ingest(
                    CaptureBuilder::new()
                        .user(*user)
                        .punch_type(punch_type)
                        .at(6 + minutes / 60, minutes % 60)
                        .build(),
                )
                .await;
            assert!(result.success);
        }
    }
}

#[rstest]
#[tokio::test]
async fn it_should_page_device_history_newest_first_with_total_count() {
    let harness = Harness::new().await;
    seed_history(&harness).await;

    let first = harness
        .ledger
        .punches_by_device(DEVICE, None, None, 1, 10)
        .await
        .unwrap();
    assert_eq!(first.total_count, 24);
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.page, 1);
    assert!(
        first
            .items
            .windows(2)
            .all(|w| w[0].punch_time >= w[1].punch_time),
        "expected newest-first ordering"
    );

    let last = harness
        .ledger
        .punches_by_device(DEVICE, None, None, 3, 10)
        .await
        .unwrap();
    assert_eq!(last.items.len(), 4);
    assert_eq!(last.total_count, 24);

    let beyond = harness
        .ledger
        .punches_by_device(DEVICE, None, None, 9, 10)
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_count, 24);
}

#[rstest]
#[tokio::test]
async fn it_should_filter_device_history_by_time_range() {
    let harness = Harness::new().await;
    seed_history(&harness).await;

    let from = Utc.with_ymd_and_hms(2026, 1, 5, 7, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2026, 1, 5, 7, 59, 59).unwrap();
    let page = harness
        .ledger
        .punches_by_device(DEVICE, Some(from), Some(to), 1, 100)
        .await
        .unwrap();
    assert!(page.total_count > 0);
    assert!(
        page.items
            .iter()
            .all(|p| p.punch_time >= from && p.punch_time <= to)
    );
}

#[rstest]
#[tokio::test]
async fn it_should_clamp_page_and_page_size() {
    let harness = Harness::new().await;
    seed_history(&harness).await;

    let page = harness
        .ledger
        .punches_by_device(DEVICE, None, None, 0, 0)
        .await
        .unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 10);
}

#[rstest]
#[tokio::test]
async fn it_should_list_one_employees_punches_in_time_order() {
    let harness = Harness::new().await;
    seed_history(&harness).await;

    let from = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2026, 1, 5, 23, 59, 59).unwrap();
    let punches = harness
        .ledger
        .punches_by_employee(support::EMPLOYEE, from, to)
        .await
        .unwrap();
    assert_eq!(punches.len(), 8);
    assert!(
        punches.windows(2).all(|w| w[0].punch_time <= w[1].punch_time),
        "expected oldest-first ordering"
    );
    assert!(punches.iter().all(|p| p.employee_id == Some(support::EMPLOYEE)));
}
