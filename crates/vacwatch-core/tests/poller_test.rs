#![allow(clippy::unwrap_used)]
// Poll-cycle tests against a mocked vacancy API.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vacwatch_core::{
    Badge, ChannelNotifier, FixedClock, HttpClient, MemoryStore, NotifierEvent, PollOutcome,
    PollSettings, PollState, Poller, Record, SettingsStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    server: MockServer,
    store: Arc<MemoryStore>,
    notifier: Arc<ChannelNotifier>,
    poller: Poller,
}

async fn setup(last_count: Option<u64>) -> Harness {
    let server = MockServer::start().await;
    let record = Record {
        settings: PollSettings {
            api_base: format!("{}/api/v1", server.uri()),
            title: "rust".into(),
            ..PollSettings::default()
        },
        state: PollState {
            last_count,
            ..PollState::default()
        },
    };
    let store = Arc::new(MemoryStore::with_record(record));
    let notifier = Arc::new(ChannelNotifier::new());
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap());
    let poller = Poller::new(
        store.clone(),
        notifier.clone(),
        HttpClient::new(),
        Arc::new(clock),
    );
    Harness {
        server,
        store,
        notifier,
        poller,
    }
}

async fn mount_count(server: &MockServer, count: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": count })))
        .mount(server)
        .await;
}

// ── Alerting ────────────────────────────────────────────────────────

#[tokio::test]
async fn growth_raises_alert_and_badge() {
    let h = setup(Some(10)).await;
    mount_count(&h.server, 15).await;
    let mut events = h.notifier.subscribe();

    let outcome = h.poller.poll_now().await;
    assert_eq!(
        outcome,
        PollOutcome::Checked {
            count: 15,
            previous: 10,
            delta: Some(5),
        }
    );

    match events.recv().await.unwrap() {
        NotifierEvent::Alert(alert) => {
            assert_eq!(alert.title, "New vacancies");
            assert_eq!(alert.message, "New vacancies: 5");
            assert_eq!(alert.delta, 5);
        }
        other => panic!("expected alert, got {other:?}"),
    }
    assert_eq!(*h.notifier.badge().borrow(), Badge::delta(5));
    assert_eq!(h.notifier.badge().borrow().text(), "5");

    let state = h.store.load().state;
    assert_eq!(state.last_count, Some(15));
    assert_eq!(state.last_error, None);
    assert_eq!(state.polling_status.as_deref(), Some("Polling: ok (60 sec)"));
    assert_eq!(
        state.last_checked,
        Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap())
    );
}

#[tokio::test]
async fn no_growth_clears_badge() {
    let h = setup(Some(15)).await;
    mount_count(&h.server, 12).await;
    let mut events = h.notifier.subscribe();

    let outcome = h.poller.poll_now().await;
    assert!(matches!(outcome, PollOutcome::Checked { delta: None, .. }));
    assert_eq!(
        events.recv().await.unwrap(),
        NotifierEvent::Badge(Badge::Cleared)
    );
    assert_eq!(h.store.load().state.last_count, Some(12));
}

#[tokio::test]
async fn zero_baseline_never_alerts() {
    for baseline in [None, Some(0)] {
        let h = setup(baseline).await;
        mount_count(&h.server, 40).await;
        let mut events = h.notifier.subscribe();

        let outcome = h.poller.poll_now().await;
        assert_eq!(
            outcome,
            PollOutcome::Checked {
                count: 40,
                previous: 0,
                delta: None,
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            NotifierEvent::Badge(Badge::Cleared)
        );
        assert_eq!(h.store.load().state.last_count, Some(40));
    }
}

#[tokio::test]
async fn filters_are_sent_as_query_params() {
    let h = setup(None).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/count"))
        .and(query_param("title", "rust"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 3 })))
        .expect(1)
        .mount(&h.server)
        .await;

    h.poller.poll_now().await;
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn server_error_is_stored_and_keeps_count() {
    let h = setup(Some(10)).await;
    let earlier = Utc.with_ymd_and_hms(2026, 2, 28, 18, 0, 0).unwrap();
    h.store
        .modify_state(&mut |s| s.last_checked = Some(earlier))
        .unwrap();
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/count"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;
    let mut events = h.notifier.subscribe();

    let outcome = h.poller.poll_now().await;
    assert_eq!(
        outcome,
        PollOutcome::Failed {
            message: "API error: 500".into()
        }
    );

    let state = h.store.load().state;
    assert_eq!(state.last_count, Some(10));
    assert_eq!(state.last_error.as_deref(), Some("API error: 500"));
    assert_eq!(
        state.last_checked,
        Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap())
    );
    assert_eq!(
        state.polling_status.as_deref(),
        Some("Polling: error (60 sec)")
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn server_detail_is_kept_in_last_error() {
    let h = setup(Some(10)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/count"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "detail": "title too long" })))
        .mount(&h.server)
        .await;

    h.poller.poll_now().await;
    assert_eq!(
        h.store.load().state.last_error.as_deref(),
        Some("API error: 422 (title too long)")
    );
}

#[tokio::test]
async fn success_after_failure_clears_error() {
    let h = setup(Some(10)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/count"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    mount_count(&h.server, 13).await;

    assert!(matches!(h.poller.poll_now().await, PollOutcome::Failed { .. }));
    let outcome = h.poller.poll_now().await;
    assert!(matches!(outcome, PollOutcome::Checked { delta: Some(3), .. }));
    assert_eq!(h.store.load().state.last_error, None);
}

#[tokio::test]
async fn missing_count_field_reads_as_zero() {
    let h = setup(Some(8)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 8 })))
        .mount(&h.server)
        .await;

    let outcome = h.poller.poll_now().await;
    assert!(matches!(outcome, PollOutcome::Checked { count: 0, .. }));
    assert_eq!(h.store.load().state.last_count, Some(0));
}

// ── Status line ─────────────────────────────────────────────────────

#[tokio::test]
async fn status_reflects_interval_saved_during_request() {
    let h = setup(Some(5)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/count"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "count": 5 }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&h.server)
        .await;

    let poll = tokio::spawn({
        let poller = h.poller.clone();
        async move { poller.poll_now().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut settings = h.store.load().settings;
    settings.interval_seconds = 120;
    h.store.save_settings(&settings).unwrap();

    assert!(matches!(poll.await.unwrap(), PollOutcome::Checked { .. }));
    assert_eq!(
        h.store.load().state.polling_status.as_deref(),
        Some("Polling: ok (120 sec)")
    );
}
