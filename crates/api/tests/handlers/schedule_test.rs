use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shiftdesk_api::middleware::error_handling::ErrorBody;
use shiftdesk_core::models::batch::{BatchStatus, BatchSummary, ScheduleBatch};
use shiftdesk_core::notification::NotificationTemplate;
use shiftdesk_db::mock::MockScheduleStore;

use crate::common::{admin, entry, user_header, RecordingNotifier, TestContext};

#[tokio::test]
async fn test_health_needs_no_identity() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_missing_or_invalid_identity_is_unauthorized() {
    let ctx = TestContext::new();

    let missing = ctx.server.get("/api/schedules").await;
    let garbage = ctx
        .server
        .get("/api/schedules")
        .add_header(user_header(), HeaderValue::from_static("abc"))
        .await;

    for response in [missing, garbage] {
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<ErrorBody>().code, "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_create_and_fetch_schedule() {
    let ctx = TestContext::new();

    let created = ctx
        .create_batch(json!([
            entry("2024-01-15", "10:00", "14:00", 1),
            entry("2024-01-16", "09:00", "17:00", 2),
        ]))
        .await;

    assert_eq!(created["status"], "DRAFTED");
    assert_eq!(created["startDate"], "2024-01-15");
    assert_eq!(created["endDate"], "2024-01-16");
    assert_eq!(created["totalDays"], 2);
    assert_eq!(created["entries"][0]["totalHours"], 4.0);
    assert_eq!(created["entries"][1]["totalHours"], 8.0);

    let id = created["id"].as_i64().unwrap();
    let fetched = ctx
        .server
        .get(&format!("/api/schedules/{id}"))
        .add_header(user_header(), admin())
        .await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    assert_eq!(fetched.json::<Value>(), created);

    let listed = ctx
        .server
        .get("/api/schedules")
        .add_header(user_header(), admin())
        .await
        .json::<Vec<BatchSummary>>();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].entry_count, 2);

    let sent = ctx.wait_for_notifications(2).await;
    assert_eq!(sent.len(), 2);
    assert!(sent
        .iter()
        .all(|n| n.template == NotificationTemplate::DraftAvailable { batch_id: id }));
}

#[tokio::test]
async fn test_create_rejects_oversized_batch() {
    let ctx = TestContext::new();
    let entries: Vec<Value> = (0..22)
        .map(|i| entry("2024-01-15", "09:00", "10:00", 100 + i))
        .collect();

    let response = ctx
        .server
        .post("/api/schedules")
        .add_header(user_header(), admin())
        .json(&json!({ "entries": entries }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<ErrorBody>();
    assert_eq!(body.code, "VALIDATION_ERROR");
    assert!(body.error.contains("at most 21"));
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let ctx = TestContext::new();

    let malformed_time = ctx
        .server
        .post("/api/schedules")
        .add_header(user_header(), admin())
        .json(&json!({ "entries": [entry("2024-01-15", "9:00", "10:00", 1)] }))
        .await;
    assert_eq!(malformed_time.status_code(), StatusCode::BAD_REQUEST);
    assert!(malformed_time.json::<ErrorBody>().error.contains("Invalid time format"));

    let missing_user = ctx
        .server
        .post("/api/schedules")
        .add_header(user_header(), admin())
        .json(&json!({ "entries": [{ "date": "2024-01-15", "startTime": "09:00", "endTime": "10:00" }] }))
        .await;
    assert_eq!(missing_user.status_code(), StatusCode::BAD_REQUEST);
    assert!(missing_user.json::<ErrorBody>().error.contains("userId"));

    let not_json = ctx
        .server
        .post("/api/schedules")
        .add_header(user_header(), admin())
        .text("{ entries")
        .await;
    assert_eq!(not_json.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(not_json.json::<ErrorBody>().code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_conflict_lists_colliding_entries() {
    let ctx = TestContext::new();
    let first = ctx
        .create_batch(json!([entry("2024-01-15", "10:00", "12:00", 1)]))
        .await;

    let response = ctx
        .server
        .post("/api/schedules")
        .add_header(user_header(), admin())
        .json(&json!({ "entries": [entry("2024-01-15", "11:00", "13:00", 1)] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "TIME_CONFLICT");
    assert_eq!(body["conflicts"][0]["entryId"], first["entries"][0]["id"]);
    assert_eq!(body["conflicts"][0]["startTime"], "10:00");
}

#[tokio::test]
async fn test_publish_then_publish_again() {
    let ctx = TestContext::new();
    let created = ctx
        .create_batch(json!([entry("2024-01-15", "10:00", "12:00", 1)]))
        .await;
    let id = created["id"].as_i64().unwrap();
    ctx.wait_for_notifications(1).await;

    let published = ctx
        .server
        .patch(&format!("/api/schedules/{id}"))
        .add_header(user_header(), admin())
        .json(&json!({
            "status": "PUBLISHED",
            "entries": [entry("2024-01-17", "08:00", "09:00", 2)]
        }))
        .await;
    assert_eq!(published.status_code(), StatusCode::OK);
    let batch = published.json::<ScheduleBatch>();
    assert_eq!(batch.status, BatchStatus::Published);
    assert_eq!(batch.entries.len(), 2);
    assert_eq!(batch.span.total_days, 3);

    let sent = ctx.wait_for_notifications(3).await;
    assert_eq!(
        sent[1..]
            .iter()
            .map(|n| n.subject())
            .collect::<Vec<_>>(),
        vec!["Your schedule has been published", "Your schedule has been published"]
    );

    let again = ctx
        .server
        .patch(&format!("/api/schedules/{id}"))
        .add_header(user_header(), admin())
        .json(&json!({ "status": "PUBLISHED" }))
        .await;
    assert_eq!(again.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(again.json::<ErrorBody>().code, "BATCH_LOCKED");
}

#[tokio::test]
async fn test_publish_requires_published_status() {
    let ctx = TestContext::new();
    let created = ctx
        .create_batch(json!([entry("2024-01-15", "10:00", "12:00", 1)]))
        .await;
    let id = created["id"].as_i64().unwrap();

    for body in [json!({}), json!({ "status": "ARCHIVED" })] {
        let response = ctx
            .server
            .patch(&format!("/api/schedules/{id}"))
            .add_header(user_header(), admin())
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_delete_schedule() {
    let ctx = TestContext::new();
    let created = ctx
        .create_batch(json!([entry("2024-01-15", "10:00", "12:00", 1)]))
        .await;
    let path = format!("/api/schedules/{}", created["id"]);

    let deleted = ctx.server.delete(&path).add_header(user_header(), admin()).await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(
        deleted.json::<Value>(),
        json!({ "message": "Schedule deleted successfully" })
    );

    let missing = ctx.server.get(&path).add_header(user_header(), admin()).await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<ErrorBody>().code, "NOT_FOUND");

    let again = ctx.server.delete(&path).add_header(user_header(), admin()).await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get("/api/schedules/abc")
        .add_header(user_header(), admin())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notifier_failure_does_not_fail_request() {
    let ctx = TestContext::with_notifier(RecordingNotifier::failing());

    let created = ctx
        .create_batch(json!([entry("2024-01-15", "10:00", "12:00", 1)]))
        .await;

    assert_eq!(created["status"], "DRAFTED");
    assert_eq!(ctx.wait_for_notifications(1).await.len(), 1);
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let mut store = MockScheduleStore::new();
    store
        .expect_list_batches()
        .returning(|| Err(eyre::eyre!("connection pool timed out")));
    let ctx = TestContext::with_store(Arc::new(store), RecordingNotifier::default());

    let response = ctx
        .server
        .get("/api/schedules")
        .add_header(user_header(), admin())
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<ErrorBody>(),
        ErrorBody::new("Internal server error", "INTERNAL_ERROR")
    );
}
