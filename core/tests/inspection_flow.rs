mod support;

use std::time::Duration;

use serde_json::json;
use support::{closed_port_client, drain, notices, sample_snapshot, MockService, Reply};
use tfidf_core::boundary::FALLBACK_MESSAGE;
use tfidf_core::screens::{InspectionScreen, InspectionStatus};
use tfidf_core::{ErrorKind, EventSink, NoticeLevel, Route, Screen, Settled, Shell, UiEvent};

#[tokio::test]
async fn renders_both_tables_from_one_fetch() {
    let mock = MockService::start().await;
    mock.set_view(Reply::ok(sample_snapshot()));
    let (events, mut rx) = EventSink::channel();

    let (screen, fetch) = InspectionScreen::mount(mock.client(), events);
    assert!(screen.render().unwrap().contains("Loading..."));

    assert_eq!(fetch.await.unwrap(), Settled::Applied);
    assert_eq!(mock.view_hits(), 1);

    let tables = screen.tables().unwrap().unwrap();
    assert_eq!(tables.tf_idf.rows, vec![vec!["cat", "2.0000", "0.0000", "0.3010"]]);
    assert_eq!(tables.tfidf.rows, vec![vec!["cat", "0.6020", "0.0000"]]);

    let text = screen.render().unwrap();
    assert!(text.contains("Term Frequency (TF) and IDF"));
    assert!(text.contains("TF-IDF Values"));
    assert!(text.contains("Go to Search"));
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn failed_fetch_stays_loading_without_retry() {
    let mock = MockService::start().await;
    mock.set_view(Reply::fail(500));
    let (events, mut rx) = EventSink::channel();

    let (screen, fetch) = InspectionScreen::mount(mock.client(), events);
    assert_eq!(fetch.await.unwrap(), Settled::Failed);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(matches!(screen.status(), InspectionStatus::Failed));
    assert!(screen.render().unwrap().contains("Loading..."));
    assert!(!screen.proceed_to_query());
    assert_eq!(mock.view_hits(), 1);

    let seen = notices(&drain(&mut rx));
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].level, NoticeLevel::Error);
    assert_eq!(seen[0].message, "Error fetching index.");
}

#[tokio::test]
async fn unreachable_service_is_a_request_failure() {
    let (events, mut rx) = EventSink::channel();
    let (screen, fetch) = InspectionScreen::mount(closed_port_client().await, events);

    assert_eq!(fetch.await.unwrap(), Settled::Failed);
    assert!(screen.tables().is_none());
    assert_eq!(notices(&drain(&mut rx)).len(), 1);
}

#[tokio::test]
async fn missing_tfidf_entry_surfaces_as_a_render_fault() {
    let mock = MockService::start().await;
    mock.set_view(Reply::ok(json!({
        "documents": ["a", "b"],
        "tf": [{"cat": 1.0}, {}],
        "idf": {"cat": 1.0},
        "tfidf": {"cat": [1.0]}
    })));
    let (events, _rx) = EventSink::channel();
    let mut shell = Shell::new(mock.client(), events);

    let fetch = shell.navigate(Route::ViewIndex, None).unwrap();
    assert_eq!(fetch.await.unwrap(), Settled::Applied);

    let err = shell.inspection().unwrap().tables().unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataContractViolation);

    let text = shell.render();
    assert!(text.contains(FALLBACK_MESSAGE));
    assert!(text.contains("[View Index]"));
    assert!(shell.boundary().fault().unwrap().message.contains("cat"));

    // the fault stays with that mount only
    shell.navigate(Route::Search, None);
    assert!(!shell.render().contains(FALLBACK_MESSAGE));
}

#[tokio::test]
async fn empty_snapshot_is_not_a_fault() {
    let mock = MockService::start().await;
    mock.set_view(Reply::ok(json!({ "documents": [], "tf": [], "idf": {}, "tfidf": {} })));
    let (events, _rx) = EventSink::channel();
    let mut shell = Shell::new(mock.client(), events);

    shell.navigate(Route::ViewIndex, None).unwrap().await.unwrap();
    assert!(!shell.render().contains(FALLBACK_MESSAGE));
    assert!(!shell.boundary().has_fault());
}

#[tokio::test]
async fn proceed_hands_the_snapshot_forward() {
    let mock = MockService::start().await;
    mock.set_view(Reply::ok(sample_snapshot()));
    let (events, mut rx) = EventSink::channel();

    let gate = mock.hold();
    let (screen, fetch) = InspectionScreen::mount(mock.client(), events);
    assert!(!screen.proceed_to_query());
    gate.notify_one();
    fetch.await.unwrap();

    assert!(screen.proceed_to_query());
    match drain(&mut rx).as_slice() {
        [UiEvent::Navigate(nav)] => {
            assert_eq!(nav.route, Route::Search);
            assert_eq!(nav.payload.as_ref().unwrap().document_count(), 2);
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test]
async fn late_snapshot_is_dropped_after_unmount() {
    let mock = MockService::start().await;
    mock.set_view(Reply::fail(500));
    let (events, mut rx) = EventSink::channel();

    let gate = mock.hold();
    let (screen, fetch) = InspectionScreen::mount(mock.client(), events);
    drop(screen);
    gate.notify_one();

    assert_eq!(fetch.await.unwrap(), Settled::Discarded);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn rows_follow_the_service_key_order() {
    let mock = MockService::start().await;
    mock.set_view(Reply::raw(
        r#"{
            "documents": ["z a"],
            "tf": [{"zeta": 1, "alpha": 1}],
            "idf": {"alpha": 0.5, "zeta": 0.25},
            "tfidf": {"zeta": [0.25], "alpha": [0.5]}
        }"#,
    ));
    let (events, _rx) = EventSink::channel();

    let (screen, fetch) = InspectionScreen::mount(mock.client(), events);
    assert_eq!(fetch.await.unwrap(), Settled::Applied);

    let tables = screen.tables().unwrap().unwrap();
    let terms: Vec<&str> = tables.tfidf.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(terms, ["zeta", "alpha"]);
    assert_eq!(tables.tf_idf.rows[0], ["zeta", "1.0000", "0.2500"]);
}
