//! Handler behaviour against a mocked store

use async_trait::async_trait;
use incident_api::{routes, ApiState};
use incident_core::{AllowList, FieldList, FieldUpdate, FieldValue, Incident, IncidentNumber};
use incident_store::{IncidentStore, StoreError};
use mockall::mock;
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use warp::http::StatusCode;

mock! {
    pub Store {}

    #[async_trait]
    impl IncidentStore for Store {
        async fn fetch_by_key(&self, key: &IncidentNumber) -> Result<Option<Incident>, StoreError>;
        async fn update_fields(
            &self,
            key: &IncidentNumber,
            fields: &FieldUpdate,
        ) -> Result<Option<Incident>, StoreError>;
    }
}

fn state(store: MockStore, fields: &str) -> ApiState {
    let fields: FieldList = fields.parse().unwrap();
    ApiState::new(Arc::new(store), AllowList::from(&fields))
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn store_is_not_called_when_nothing_survives_filtering() {
    let mut store = MockStore::new();
    store.expect_update_fields().times(0);
    let api = routes(state(store, "title,status"));

    let resp = warp::test::request()
        .method("PUT")
        .path("/api/incidents/INC123")
        .json(&json!({"hacker": "x"}))
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_receives_filtered_fields_and_decoded_key() {
    let mut store = MockStore::new();
    store
        .expect_update_fields()
        .withf(|key, fields| {
            key.as_str() == "INC 1"
                && fields.len() == 1
                && fields.get("status") == Some(&FieldValue::from("Closed"))
        })
        .times(1)
        .returning(|_, _| Ok(Some(Incident::new().with("status", "Closed"))));
    let api = routes(state(store, "title,status"));

    let resp = warp::test::request()
        .method("PUT")
        .path("/api/incidents/INC%201")
        .json(&json!({"status": "Closed", "owner": "mallory"}))
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp.body()), json!({"status": "Closed"}));
}

#[tokio::test]
async fn fetch_failure_is_500_with_generic_message() {
    let mut store = MockStore::new();
    store
        .expect_fetch_by_key()
        .returning(|_| Err(StoreError::TableNotFound("secret_table".into())));
    let api = routes(state(store, "title"));

    let resp = warp::test::request()
        .path("/api/incidents/INC123")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp.body()),
        json!({"error": "Failed to fetch incident details"})
    );
}

#[tokio::test]
async fn update_failure_is_500_with_generic_message() {
    let mut store = MockStore::new();
    store
        .expect_update_fields()
        .returning(|_, _| Err(StoreError::PoolClosed));
    let api = routes(state(store, "title"));

    let resp = warp::test::request()
        .method("PUT")
        .path("/api/incidents/INC123")
        .json(&json!({"title": "B"}))
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp.body()),
        json!({"error": "Failed to update incident details"})
    );
}

#[tokio::test]
async fn booleans_are_stored_as_integers() {
    let mut store = MockStore::new();
    store
        .expect_update_fields()
        .withf(|_, fields| fields.get("resolved") == Some(&FieldValue::Integer(1)))
        .returning(|_, _| Ok(Some(Incident::new().with("resolved", 1_i64))));
    let api = routes(state(store, "resolved"));

    let resp = warp::test::request()
        .method("PUT")
        .path("/api/incidents/INC123")
        .json(&json!({"resolved": true}))
        .reply(&api)
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn payloads_without_allowed_fields_never_reach_the_store(
        names in prop::collection::btree_set("[a-z]{1,8}", 1..6)
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let status = runtime.block_on(async {
            let mut store = MockStore::new();
            store.expect_update_fields().times(0);
            // Uppercase names can never collide with the lowercase payload keys
            let api = routes(state(store, "Title,Status"));

            let payload: Map<String, Value> =
                names.into_iter().map(|n| (n, json!("x"))).collect();
            warp::test::request()
                .method("PUT")
                .path("/api/incidents/INC123")
                .json(&Value::Object(payload))
                .reply(&api)
                .await
                .status()
        });
        prop_assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
