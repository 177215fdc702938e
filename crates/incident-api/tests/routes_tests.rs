//! Route tests against a seeded SQLite database

use incident_api::{routes, ApiState};
use incident_core::AllowList;
use incident_store::SqliteIncidentStore;
use incident_test_utils::{TestDatabase, TEST_FIELDS};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use warp::http::StatusCode;

async fn state_for(db: &TestDatabase, fields: &str) -> ApiState {
    let config = db.config(fields);
    let store = SqliteIncidentStore::open(&config).await.unwrap();
    ApiState::new(Arc::new(store), AllowList::from(&config.fields))
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn get_returns_configured_fields() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    let resp = warp::test::request()
        .method("GET")
        .path("/api/incidents/INC123")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp.body()), json!({"title": "A", "status": "Open"}));
}

#[tokio::test]
async fn get_unknown_incident_is_404() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    let resp = warp::test::request()
        .path("/api/incidents/INC999")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp.body()), json!({"error": "Incident not found"}));
}

#[tokio::test]
async fn get_decodes_percent_encoded_numbers() {
    let db = TestDatabase::new();
    db.insert("INC 7/B", "Spaced", "Open");
    let api = routes(state_for(&db, TEST_FIELDS).await);

    let resp = warp::test::request()
        .path("/api/incidents/INC%207%2FB")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp.body())["title"], "Spaced");
}

#[tokio::test]
async fn blank_or_missing_number_is_400() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    for path in ["/api/incidents/%20", "/api/incidents"] {
        let resp = warp::test::request().path(path).reply(&api).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(
            body_json(resp.body()),
            json!({"error": "Incident number is required"})
        );
    }

    let resp = warp::test::request()
        .method("PUT")
        .path("/api/incidents")
        .json(&json!({"status": "Closed"}))
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_updates_only_allow_listed_fields() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    let resp = warp::test::request()
        .method("PUT")
        .path("/api/incidents/INC123")
        .json(&json!({"status": "Closed", "hacker": "x"}))
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp.body());
    assert_eq!(body, json!({"title": "A", "status": "Closed"}));
    assert!(body.get("hacker").is_none());
    assert_eq!(
        db.title_and_status("INC123"),
        Some(("A".to_string(), "Closed".to_string()))
    );
}

#[tokio::test]
async fn put_then_get_round_trips() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    let put = warp::test::request()
        .method("PUT")
        .path("/api/incidents/INC123")
        .json(&json!({"title": "Disk full on db-01"}))
        .reply(&api)
        .await;
    let get = warp::test::request()
        .path("/api/incidents/INC123")
        .reply(&api)
        .await;

    assert_eq!(put.status(), StatusCode::OK);
    assert_eq!(body_json(put.body()), body_json(get.body()));
    assert_eq!(body_json(get.body())["title"], "Disk full on db-01");
}

#[tokio::test]
async fn put_with_no_allowed_fields_is_400_and_changes_nothing() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    let resp = warp::test::request()
        .method("PUT")
        .path("/api/incidents/INC123")
        .json(&json!({"hacker": "x", "priority": 1}))
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp.body()),
        json!({"error": "No valid fields provided for update"})
    );
    assert_eq!(
        db.title_and_status("INC123"),
        Some(("A".to_string(), "Open".to_string()))
    );
}

#[tokio::test]
async fn put_with_empty_payload_is_400() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    for body in ["{}", ""] {
        let resp = warp::test::request()
            .method("PUT")
            .path("/api/incidents/INC123")
            .header("content-type", "application/json")
            .body(body)
            .reply(&api)
            .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body:?}");
        assert_eq!(
            body_json(resp.body()),
            json!({"error": "No fields provided for update"})
        );
    }
}

#[tokio::test]
async fn put_rejects_bodies_that_are_not_objects() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    for body in ["[1, 2]", "\"Closed\"", "{not json"] {
        let resp = warp::test::request()
            .method("PUT")
            .path("/api/incidents/INC123")
            .body(body)
            .reply(&api)
            .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(
            body_json(resp.body()),
            json!({"error": "Request body must be a JSON object"})
        );
    }
}

#[tokio::test]
async fn put_rejects_nested_values_for_allowed_fields() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    let resp = warp::test::request()
        .method("PUT")
        .path("/api/incidents/INC123")
        .json(&json!({"status": {"nested": true}}))
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        db.title_and_status("INC123"),
        Some(("A".to_string(), "Open".to_string()))
    );
}

#[tokio::test]
async fn put_unknown_incident_is_404() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    let resp = warp::test::request()
        .method("PUT")
        .path("/api/incidents/INC999")
        .json(&json!({"status": "Closed"}))
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp.body()), json!({"error": "Incident not found"}));
}

#[tokio::test]
async fn without_field_list_everything_reads_and_nothing_writes() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, "").await);

    let get = warp::test::request()
        .path("/api/incidents/INC123")
        .reply(&api)
        .await;
    assert_eq!(get.status(), StatusCode::OK);
    assert_eq!(
        body_json(get.body()),
        json!({
            "IncidentNumber": "INC123",
            "title": "A",
            "status": "Open",
            "priority": 2,
            "notes": null
        })
    );

    let put = warp::test::request()
        .method("PUT")
        .path("/api/incidents/INC123")
        .json(&json!({"status": "Closed"}))
        .reply(&api)
        .await;
    assert_eq!(put.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_routes_and_methods_get_json_errors() {
    let db = TestDatabase::new();
    let api = routes(state_for(&db, TEST_FIELDS).await);

    let resp = warp::test::request().path("/api/other").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp.body()), json!({"error": "Not found"}));

    let resp = warp::test::request()
        .method("DELETE")
        .path("/api/incidents/INC123")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
