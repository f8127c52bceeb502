mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use fitgate::{crm::CrmClient, server};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{API_KEY, MockCrm, Reply, closed_base_url};

async fn call(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn app(crm: &MockCrm) -> Router {
    server::router(Arc::new(crm.client()))
}

#[tokio::test]
async fn health_reports_version() {
    let crm = MockCrm::start(vec![]).await;

    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://app.example.com")
        .body(Body::empty())
        .unwrap();

    let (status, headers, body) = call(app(&crm), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(headers["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn public_branch_list_uses_items_envelope() {
    let crm = MockCrm::start(vec![(
        "branch/list",
        Reply::json(json!({"items": [
            {"id": 1, "name": "Center"},
            {"id": 2, "name": "Closed", "isActive": false},
            {"id": 0, "name": "Broken"}
        ]})),
    )])
    .await;

    let (status, _, body) = call(app(&crm), post("/api/public/branch/list", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["items"], json!([{"id": 1, "name": "Center", "is_active": true}]));
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["limit"], 20);

    let seen = crm.last_request().await;
    assert_eq!(seen.body["limit"], 20);
    assert_eq!(seen.body["sort"], json!({"id": "asc"}));
}

#[tokio::test]
async fn empty_post_body_means_defaults() {
    let crm = MockCrm::start(vec![("teacher/list", Reply::json(json!({"items": []})))]).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/public/teacher/list")
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = call(app(&crm), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(crm.last_request().await.body["limit"], 100);
}

#[tokio::test]
async fn v1_hall_list_uses_data_envelope_and_query_params() {
    let crm = MockCrm::start(vec![(
        "hall/list",
        Reply::json(json!({"data": [{"id": 3, "name": "Studio"}]})),
    )])
    .await;

    let (status, _, body) = call(app(&crm), get("/api/v1/hall?limit=5&page=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Studio");
    assert!(body.get("items").is_none());
    assert_eq!(body["meta"]["page"], 2);

    let seen = crm.last_request().await;
    assert_eq!(seen.body["limit"], 5);
    assert_eq!(seen.body["page"], 2);
    assert_eq!(seen.body["columns"], json!({"isActive": true}));
}

#[tokio::test]
async fn public_schedule_reconciles_the_requested_day() {
    let crm = MockCrm::start(vec![(
        "schedule/list",
        Reply::json(json!({"items": [
            {"id": 1, "day": 2, "minutesBegin": 600, "name": "Yoga"},
            {"id": 2, "day": 4, "minutesBegin": 600, "name": "Boxing"}
        ]})),
    )])
    .await;
    let client = crm.client();
    client.set_session("sess-9").await;
    let app = server::router(Arc::new(client));

    let (status, _, body) = call(
        app,
        post(
            "/api/public/schedule/list",
            json!({"date_from": "2024-01-15", "branch_id": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["id"], 1);
    assert_eq!(body["items"][0]["date"], "2024-01-15");
    assert_eq!(body["items"][0]["hall_id"], 2);
    assert_eq!(body["meta"]["date_from"], "2024-01-15");
    assert_eq!(body["meta"]["date_to"], "2024-01-15");

    let seen = crm.last_request().await;
    assert_eq!(seen.query.as_deref(), Some("PHPSESSID=sess-9"));
    assert_eq!(seen.body["filters"]["branch_id"], json!([2]));
}

#[tokio::test]
async fn v1_schedule_rejects_bad_dates_without_calling_crm() {
    let crm = MockCrm::start(vec![]).await;

    let (status, _, body) = call(app(&crm), get("/api/v1/schedule?date_from=15.01.2024")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("date_from"));
    assert!(crm.requests().await.is_empty());
}

#[tokio::test]
async fn crm_failure_is_a_bad_gateway() {
    let crm = MockCrm::start(vec![(
        "teacher/list",
        Reply::html(StatusCode::INTERNAL_SERVER_ERROR, "<html>down</html>"),
    )])
    .await;

    let (status, _, body) = call(app(&crm), get("/api/v1/teacher")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to fetch teachers");
    assert!(body["details"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn unreachable_crm_is_service_unavailable() {
    let client = CrmClient::new(&closed_base_url().await, API_KEY).unwrap();
    let app = server::router(Arc::new(client));

    let (status, _, body) = call(app, get("/api/v1/branch")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Failed to fetch branches");
}

#[tokio::test]
async fn client_lookup_by_phone() {
    let crm = MockCrm::start(vec![(
        "client/list",
        Reply::json(json!({"items": [{"id": 31, "firstName": "Ivan", "lastName": "Petrov"}]})),
    )])
    .await;

    let (status, _, body) = call(
        app(&crm),
        post("/api/v1/auth/by-phone", json!({"phone": " +79000000000 "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["client"]["id"], 31);
    assert_eq!(body["client"]["full_name"], "Petrov Ivan");
    assert_eq!(body["client"]["phone"], "+79000000000");

    let seen = crm.last_request().await;
    assert_eq!(seen.body["columns"]["phone"], "+79000000000");
}

#[tokio::test]
async fn unknown_phone_is_not_found() {
    let crm = MockCrm::start(vec![("client/list", Reply::json(json!({"items": []})))]).await;

    let (status, _, body) = call(
        app(&crm),
        post("/api/v1/auth/by-phone", json!({"phone": "+79000000000"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Client not found");
}

#[tokio::test]
async fn blank_phone_is_a_bad_request() {
    let crm = MockCrm::start(vec![]).await;

    let (status, _, _) = call(app(&crm), post("/api/v1/auth/by-phone", json!({"phone": " "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(crm.requests().await.is_empty());
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let crm = MockCrm::start(vec![]).await;
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/public/schedule/list")
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = call(app(&crm), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(
        headers["access-control-allow-methods"]
            .to_str()
            .unwrap()
            .contains("POST")
    );
    assert!(
        headers["access-control-allow-headers"]
            .to_str()
            .unwrap()
            .contains("content-type")
    );
    assert!(crm.requests().await.is_empty());
}
