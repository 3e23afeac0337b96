#![allow(clippy::unwrap_used)]
// Watcher lifecycle tests: install, re-arm, save + push, external edits,
// shutdown, and dashboard id validation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vacwatch_core::{
    CoreError, Dashboard, FileStore, HttpClient, LogNotifier, MemoryStore, POLL_TIMER_ID,
    PollOutcome, PollSettings, PollState, PushOptions, PushResult, Record, RefreshOutcome,
    SettingsStore, StorageError, Watcher, WatcherConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn settings_for(server: &MockServer) -> PollSettings {
    PollSettings {
        api_base: format!("{}/api/v1", server.uri()),
        title: "rust".into(),
        ..PollSettings::default()
    }
}

fn watcher(server: &MockServer, store: Arc<dyn SettingsStore>) -> Watcher {
    let config = WatcherConfig {
        defaults: settings_for(server),
        sync_interval: Duration::from_millis(50),
        ..WatcherConfig::default()
    };
    Watcher::new(config, store, Arc::new(LogNotifier)).unwrap()
}

async fn mount_count(server: &MockServer, count: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v1/vacancies/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": count })))
        .mount(server)
        .await;
}

async fn mount_push(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/api/v1/vacancies/polling-settings"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

// ── Startup ─────────────────────────────────────────────────────────

#[tokio::test]
async fn start_installs_defaults_arms_and_polls() {
    let server = MockServer::start().await;
    mount_count(&server, 9).await;
    let store = Arc::new(MemoryStore::new());
    let watcher = watcher(&server, store.clone());

    let outcome = watcher.start().await.unwrap();
    assert!(matches!(outcome, PollOutcome::Checked { count: 9, .. }));

    let record = store.load();
    assert_eq!(record.settings, settings_for(&server));
    assert_eq!(record.state.last_count, Some(9));
    assert_eq!(
        watcher.active_timers(),
        vec![(POLL_TIMER_ID.to_owned(), Duration::from_secs(60))]
    );
    watcher.shutdown().await;
}

#[tokio::test]
async fn start_keeps_existing_settings() {
    let server = MockServer::start().await;
    mount_count(&server, 1).await;
    let stored = PollSettings {
        title: "golang".into(),
        interval_seconds: 300,
        ..settings_for(&server)
    };
    let store = Arc::new(MemoryStore::with_record(Record {
        settings: stored.clone(),
        ..Record::default()
    }));
    let watcher = watcher(&server, store.clone());

    watcher.start().await.unwrap();
    assert_eq!(store.load().settings, stored);
    assert_eq!(
        watcher.active_timers(),
        vec![(POLL_TIMER_ID.to_owned(), Duration::from_secs(300))]
    );
    watcher.shutdown().await;
}

#[tokio::test]
async fn disabled_settings_report_disabled_status() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::with_record(Record {
        settings: PollSettings {
            enabled: false,
            ..settings_for(&server)
        },
        ..Record::default()
    }));
    let watcher = watcher(&server, store.clone());

    assert_eq!(watcher.start().await.unwrap(), PollOutcome::Skipped);
    assert_eq!(
        store.load().state.polling_status.as_deref(),
        Some("Polling: disabled")
    );
    watcher.shutdown().await;
}

// ── Saving ──────────────────────────────────────────────────────────

#[tokio::test]
async fn saving_twice_leaves_one_timer() {
    let server = MockServer::start().await;
    mount_count(&server, 4).await;
    mount_push(&server, 200).await;
    let store = Arc::new(MemoryStore::new());
    let watcher = watcher(&server, store.clone());
    watcher.start().await.unwrap();

    for secs in [45, 120] {
        let report = watcher
            .save_settings(PollSettings {
                interval_seconds: secs,
                ..settings_for(&server)
            })
            .await
            .unwrap();
        assert_eq!(report.interval_secs, secs);
        assert_eq!(report.push, PushResult::Sent);
    }

    assert_eq!(
        watcher.active_timers(),
        vec![(POLL_TIMER_ID.to_owned(), Duration::from_secs(120))]
    );
    let status = store.load().state.polling_status.unwrap();
    assert!(status.ends_with("(120 sec)"), "unexpected status {status}");
    watcher.shutdown().await;
}

#[tokio::test]
async fn interval_below_floor_is_clamped() {
    let server = MockServer::start().await;
    mount_count(&server, 4).await;
    mount_push(&server, 200).await;
    let watcher = watcher(&server, Arc::new(MemoryStore::new()));

    let report = watcher
        .save_settings(PollSettings {
            interval_seconds: 3,
            ..settings_for(&server)
        })
        .await
        .unwrap();
    assert_eq!(report.interval_secs, 10);
    watcher.shutdown().await;
}

#[tokio::test]
async fn push_sends_filters_and_options() {
    let server = MockServer::start().await;
    mount_count(&server, 4).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/vacancies/polling-settings"))
        .and(body_json(json!({
            "enabled": true,
            "title": "rust",
            "location": "Berlin",
            "min_salary": 50000,
            "max_salary": null,
            "limit": 20,
            "area": 1,
            "only_with_salary": false
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let watcher = watcher(&server, Arc::new(MemoryStore::new()));

    let report = watcher
        .save_settings(PollSettings {
            location: " Berlin ".into(),
            min_salary: Some(50_000),
            ..settings_for(&server)
        })
        .await
        .unwrap();
    assert_eq!(report.push, PushResult::Sent);
    watcher.shutdown().await;
}

#[tokio::test]
async fn push_failure_keeps_local_save() {
    let server = MockServer::start().await;
    mount_count(&server, 4).await;
    mount_push(&server, 500).await;
    let store = Arc::new(MemoryStore::new());
    let watcher = watcher(&server, store.clone());

    let wanted = PollSettings {
        title: "kotlin".into(),
        ..settings_for(&server)
    };
    let report = watcher.save_settings(wanted.clone()).await.unwrap();

    assert!(matches!(report.push, PushResult::Failed { .. }));
    assert_eq!(store.load().settings, wanted);
    watcher.shutdown().await;
}

#[tokio::test]
async fn push_can_be_turned_off() {
    let server = MockServer::start().await;
    mount_count(&server, 4).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let config = WatcherConfig {
        defaults: settings_for(&server),
        push: PushOptions {
            enabled: false,
            ..PushOptions::default()
        },
        ..WatcherConfig::default()
    };
    let watcher = Watcher::new(config, Arc::new(MemoryStore::new()), Arc::new(LogNotifier)).unwrap();

    let report = watcher.save_settings(settings_for(&server)).await.unwrap();
    assert_eq!(report.push, PushResult::Disabled);
    watcher.shutdown().await;
}

#[tokio::test]
async fn invalid_settings_are_rejected_before_saving() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::with_record(Record {
        settings: settings_for(&server),
        ..Record::default()
    }));
    let watcher = watcher(&server, store.clone());

    let result = watcher
        .save_settings(PollSettings {
            min_salary: Some(9),
            max_salary: Some(1),
            ..settings_for(&server)
        })
        .await;
    assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
    assert_eq!(store.load().settings, settings_for(&server));
    assert!(watcher.active_timers().is_empty());
}

// ── External edits ──────────────────────────────────────────────────

#[tokio::test]
async fn external_edit_rearms_the_timer() {
    let server = MockServer::start().await;
    mount_count(&server, 2).await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("state.json");
    let store = Arc::new(FileStore::open(&file).unwrap());
    let watcher = watcher(&server, store.clone());
    watcher.start().await.unwrap();
    watcher.watch_external().await;

    let mut edited = store.load();
    edited.settings.interval_seconds = 90;
    std::fs::write(&file, edited.to_json().unwrap()).unwrap();

    let mut period = None;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        period = watcher
            .active_timers()
            .into_iter()
            .find(|(id, _)| id == POLL_TIMER_ID)
            .map(|(_, p)| p);
        if period == Some(Duration::from_secs(90)) {
            break;
        }
    }
    assert_eq!(period, Some(Duration::from_secs(90)));
    watcher.shutdown().await;
}

/// Store whose first refresh reports an outside settings edit, but only
/// after the test lets it return.
struct GatedStore {
    inner: MemoryStore,
    gated: AtomicBool,
    entered: mpsc::SyncSender<()>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl SettingsStore for GatedStore {
    fn load(&self) -> Record {
        self.inner.load()
    }

    fn save_settings(&self, settings: &PollSettings) -> Result<(), StorageError> {
        self.inner.save_settings(settings)
    }

    fn modify_state(&self, edit: &mut dyn FnMut(&mut PollState)) -> Result<(), StorageError> {
        self.inner.modify_state(edit)
    }

    fn subscribe(&self) -> watch::Receiver<Record> {
        self.inner.subscribe()
    }

    fn install_defaults(&self, defaults: &PollSettings) -> Result<bool, StorageError> {
        self.inner.install_defaults(defaults)
    }

    fn refresh(&self) -> Result<RefreshOutcome, StorageError> {
        if !self.gated.swap(false, Ordering::SeqCst) {
            return Ok(RefreshOutcome::Unchanged);
        }
        self.entered.send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        Ok(RefreshOutcome::SettingsChanged)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_completes_while_sync_task_reacts_to_an_edit() {
    let server = MockServer::start().await;
    let (entered_tx, entered_rx) = mpsc::sync_channel(1);
    let (release_tx, release_rx) = mpsc::channel();
    let store = Arc::new(GatedStore {
        // Disabled: polls are skipped, so no request is needed.
        inner: MemoryStore::with_record(Record {
            settings: PollSettings {
                enabled: false,
                ..settings_for(&server)
            },
            ..Record::default()
        }),
        gated: AtomicBool::new(true),
        entered: entered_tx,
        release: Mutex::new(release_rx),
    });
    let watcher = watcher(&server, store);
    watcher.start().await.unwrap();
    watcher.watch_external().await;

    // The sync task is now inside refresh, about to re-arm and poll.
    tokio::task::spawn_blocking(move || entered_rx.recv())
        .await
        .unwrap()
        .unwrap();

    let stopping = tokio::spawn({
        let watcher = watcher.clone();
        async move { watcher.shutdown().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    release_tx.send(()).unwrap();

    tokio::time::timeout(Duration::from_secs(3), stopping)
        .await
        .expect("shutdown did not finish")
        .unwrap();
}

// ── Dashboard ───────────────────────────────────────────────────────

#[tokio::test]
async fn non_numeric_id_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    let dashboard =
        Dashboard::with_http(HttpClient::new(), &settings_for(&server).api_base).unwrap();

    let result = dashboard.vacancy("12abc").await;
    assert!(matches!(result, Err(CoreError::InvalidVacancyId { .. })));
}
