use axum::http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use pulp_webservices::http::REQUEST_ID_HEADER;

use crate::helpers::{MockEventListenerRepo, test_app};

#[tokio::test]
async fn should_report_status_without_auth() {
    let app = test_app(MockEventListenerRepo::default());
    app.fixture.pre_authenticator.set_login(None);

    let resp = app.server.get("/pulp/api/v2/status/").await;

    resp.assert_status(StatusCode::OK);
    let body: Value = resp.json();
    assert_eq!(body["api_version"], "2");
    assert_eq!(body["server_name"], "pulp.test");
    assert_eq!(app.fixture.pre_authenticator.calls.call_count(), 0);
}

#[tokio::test]
async fn should_echo_incoming_request_id() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app
        .server
        .get("/pulp/api/v2/status/")
        .add_header(REQUEST_ID_HEADER, "req-7")
        .await;

    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.header(REQUEST_ID_HEADER), "req-7");
}

#[tokio::test]
async fn should_assign_request_id_when_missing() {
    let app = test_app(MockEventListenerRepo::default());

    let resp = app.server.get("/pulp/api/v2/status/").await;

    let id = resp.header(REQUEST_ID_HEADER);
    assert!(id.to_str().unwrap().parse::<Uuid>().is_ok(), "not a uuid: {id:?}");
}
