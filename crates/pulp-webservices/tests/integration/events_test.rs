use axum::http::{HeaderName, HeaderValue, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use pulp_webservices::collaborators::DEFAULT_CONSUMER_HEADER;
use pulp_webservices::http::REQUEST_ID_HEADER;
use pulp_webservices::managers::{Operation, Principal};

use crate::helpers::{EVENTS_PATH, MockEventListenerRepo, test_app, test_listener};

// ── POST /pulp/api/v2/events/ ────────────────────────────────────────────────

#[tokio::test]
async fn should_create_event_listener() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .post(EVENTS_PATH)
        .json(&json!({
            "notifier_type_id": "http",
            "notifier_config": {"url": "http://hooks.example.com/pulp"},
            "event_types": ["repo.sync.start", "repo.sync.finish"],
        }))
        .await;

    resp.assert_status(StatusCode::CREATED);
    let body: Value = resp.json();
    let id = body["id"].as_str().unwrap().to_owned();
    assert_eq!(body["notifier_type_id"], "http");
    assert_eq!(body["event_types"], json!(["repo.sync.start", "repo.sync.finish"]));
    assert_eq!(body["_href"], app.fixture.get_mock_uri_path(&[&id]));

    let stored = app.repo.snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id.to_string(), id);
    app.fixture.validate_auth(Operation::Create);
}

#[tokio::test]
async fn should_accept_wildcard_event_type_without_config() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .post(EVENTS_PATH)
        .json(&json!({"notifier_type_id": "email", "event_types": ["*"]}))
        .await;

    resp.assert_status(StatusCode::CREATED);
    let body: Value = resp.json();
    assert_eq!(body["notifier_config"], json!({}));
}

#[tokio::test]
async fn should_reject_unknown_notifier_type() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .post(EVENTS_PATH)
        .json(&json!({"notifier_type_id": "carrier-pigeon", "event_types": ["*"]}))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_NOTIFIER_TYPE");
    assert!(app.repo.snapshot().is_empty());
}

#[tokio::test]
async fn should_reject_unknown_event_type() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .post(EVENTS_PATH)
        .json(&json!({"notifier_type_id": "http", "event_types": ["repo.explode"]}))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_EVENT_TYPE");
}

#[tokio::test]
async fn should_reject_empty_event_types() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .post(EVENTS_PATH)
        .json(&json!({"notifier_type_id": "http", "event_types": []}))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "MISSING_EVENT_TYPES");
}

#[tokio::test]
async fn should_reject_malformed_body() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .post(EVENTS_PATH)
        .json(&json!({"event_types": ["*"]}))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_REQUEST_BODY");
}

#[tokio::test]
async fn should_reject_non_object_notifier_config() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .post(EVENTS_PATH)
        .json(&json!({"notifier_type_id": "http", "notifier_config": [1, 2], "event_types": ["*"]}))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_NOTIFIER_CONFIG");
}

// ── GET /pulp/api/v2/events/ ─────────────────────────────────────────────────

#[tokio::test]
async fn should_list_event_listeners_with_hrefs() {
    let first = test_listener();
    let second = test_listener();
    let app = test_app(MockEventListenerRepo::new(vec![first.clone(), second.clone()]));

    let resp = app.server.get(EVENTS_PATH).await;

    resp.assert_status(StatusCode::OK);
    let body: Vec<Value> = resp.json();
    assert_eq!(body.len(), 2);
    assert_eq!(
        body[0]["_href"],
        app.fixture.get_mock_uri_path(&[&first.id.to_string()])
    );
    assert_eq!(
        body[1]["_href"],
        app.fixture.get_mock_uri_path(&[&second.id.to_string()])
    );
    app.fixture.validate_auth(Operation::Read);
}

#[tokio::test]
async fn should_reject_unauthenticated_list() {
    let app = test_app(MockEventListenerRepo::default());
    app.fixture.pre_authenticator.set_login(None);

    let resp = app.server.get(EVENTS_PATH).await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(app.fixture.http_error.calls.call_count(), 1);
}

#[tokio::test]
async fn should_reject_unauthorized_list() {
    let app = test_app(MockEventListenerRepo::default());
    app.fixture
        .user_query_manager
        .authorized
        .store(false, std::sync::atomic::Ordering::SeqCst);

    let resp = app.server.get(EVENTS_PATH).await;

    resp.assert_status(StatusCode::FORBIDDEN);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_authorize_consumer_when_not_preauthenticated() {
    let app = test_app(MockEventListenerRepo::new(vec![test_listener()]));
    app.fixture.pre_authenticator.set_login(None);

    let resp = app
        .server
        .get(EVENTS_PATH)
        .add_header(
            HeaderName::from_static(DEFAULT_CONSUMER_HEADER),
            HeaderValue::from_static("consumer-1"),
        )
        .await;

    resp.assert_status(StatusCode::OK);
    app.fixture.consumer_authorizer.calls.assert_called_once_with(&(
        "/mock/".to_owned(),
        "consumer-1".to_owned(),
        Operation::Read,
    ));
    assert_eq!(app.fixture.user_query_manager.is_authorized_calls.call_count(), 0);
}

#[tokio::test]
async fn principal_is_recorded_under_echoed_request_id() {
    let app = test_app(MockEventListenerRepo::new(vec![test_listener()]));

    let resp = app
        .server
        .get(EVENTS_PATH)
        .add_header(REQUEST_ID_HEADER, "req-42")
        .await;

    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.header(REQUEST_ID_HEADER), "req-42");
    app.fixture
        .principal_manager
        .set_calls
        .assert_called_once_matching("under req-42", |(id, principal)| {
            id == "req-42" && matches!(principal, Principal::User(_))
        });
    app.fixture
        .principal_manager
        .clear_calls
        .assert_called_once_with(&"req-42".to_owned());
}

// ── GET /pulp/api/v2/events/{event_listener_id}/ ─────────────────────────────

#[tokio::test]
async fn should_get_event_listener() {
    let listener = test_listener();
    let app = test_app(MockEventListenerRepo::new(vec![listener.clone()]));
    app.fixture
        .uri_path
        .set_path(app.fixture.get_mock_uri_path(&[&listener.id.to_string()]));

    let resp = app
        .server
        .get(&format!("{EVENTS_PATH}{}/", listener.id))
        .await;

    resp.assert_status(StatusCode::OK);
    let body: Value = resp.json();
    assert_eq!(body["id"], listener.id.to_string());
    assert_eq!(body["notifier_config"]["url"], "http://hooks.example.com/pulp");
    assert_eq!(
        body["_href"],
        app.fixture.get_mock_uri_path(&[&listener.id.to_string()])
    );
    app.fixture.validate_auth(Operation::Read);
}

#[tokio::test]
async fn should_return_not_found_for_missing_listener() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .get(&format!("{EVENTS_PATH}{}/", Uuid::new_v4()))
        .await;

    resp.assert_status(StatusCode::NOT_FOUND);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "EVENT_LISTENER_NOT_FOUND");
}

#[tokio::test]
async fn should_return_not_found_for_malformed_id() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app.server.get(&format!("{EVENTS_PATH}not-a-uuid/")).await;

    resp.assert_status(StatusCode::NOT_FOUND);
}

// ── PUT /pulp/api/v2/events/{event_listener_id}/ ─────────────────────────────

#[tokio::test]
async fn should_merge_notifier_config_on_update() {
    let listener = test_listener();
    let app = test_app(MockEventListenerRepo::new(vec![listener.clone()]));

    let resp = app
        .server
        .put(&format!("{EVENTS_PATH}{}/", listener.id))
        .json(&json!({
            "notifier_config": {"url": "http://other.example.com", "username": null, "timeout": 10},
            "event_types": ["*"],
        }))
        .await;

    resp.assert_status(StatusCode::OK);
    let body: Value = resp.json();
    assert_eq!(
        body["notifier_config"],
        json!({"url": "http://other.example.com", "timeout": 10})
    );
    assert_eq!(body["event_types"], json!(["*"]));
    assert_eq!(body["_href"], app.fixture.get_mock_uri_path(&[]));

    let stored = app.repo.snapshot();
    assert_eq!(stored[0].event_types, vec!["*".to_owned()]);
    app.fixture.validate_auth(Operation::Update);
}

#[tokio::test]
async fn should_reject_update_with_unknown_event_type() {
    let listener = test_listener();
    let app = test_app(MockEventListenerRepo::new(vec![listener.clone()]));

    let resp = app
        .server
        .put(&format!("{EVENTS_PATH}{}/", listener.id))
        .json(&json!({"event_types": ["repo.explode"]}))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.repo.snapshot()[0].event_types, listener.event_types);
}

#[tokio::test]
async fn should_return_not_found_when_updating_missing_listener() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .put(&format!("{EVENTS_PATH}{}/", Uuid::new_v4()))
        .json(&json!({"event_types": ["*"]}))
        .await;

    resp.assert_status(StatusCode::NOT_FOUND);
}

// ── DELETE /pulp/api/v2/events/{event_listener_id}/ ──────────────────────────

#[tokio::test]
async fn should_delete_event_listener() {
    let listener = test_listener();
    let app = test_app(MockEventListenerRepo::new(vec![listener.clone()]));

    let resp = app
        .server
        .delete(&format!("{EVENTS_PATH}{}/", listener.id))
        .await;

    resp.assert_status(StatusCode::NO_CONTENT);
    assert!(app.repo.snapshot().is_empty());
    app.fixture.validate_auth(Operation::Delete);
}

#[tokio::test]
async fn should_return_not_found_when_deleting_missing_listener() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .delete(&format!("{EVENTS_PATH}{}/", Uuid::new_v4()))
        .await;

    resp.assert_status(StatusCode::NOT_FOUND);
}
