use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shiftdesk_api::middleware::error_handling::ErrorBody;

use crate::common::{admin, entry, user_header, TestContext};

#[tokio::test]
async fn test_add_update_and_delete_entry() {
    let ctx = TestContext::new();
    let batch = ctx
        .create_batch(json!([entry("2024-01-15", "10:00", "12:00", 1)]))
        .await;
    let id = batch["id"].as_i64().unwrap();

    let added = ctx
        .server
        .post(&format!("/api/schedules/{id}/entries"))
        .add_header(user_header(), admin())
        .json(&entry("2024-01-18", "09:00", "09:20", 2))
        .await;
    assert_eq!(added.status_code(), StatusCode::CREATED);
    let added = added.json::<Value>();
    assert_eq!(added["batchId"], id);
    assert_eq!(added["totalHours"], 0.33);
    let entry_id = added["id"].as_i64().unwrap();

    let updated = ctx
        .server
        .patch(&format!("/api/schedules/{id}/entries/{entry_id}"))
        .add_header(user_header(), admin())
        .json(&json!({ "startTime": "09:00", "endTime": "09:40" }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    assert_eq!(updated.json::<Value>()["totalHours"], 0.67);

    let span = ctx
        .server
        .get(&format!("/api/schedules/{id}"))
        .add_header(user_header(), admin())
        .await
        .json::<Value>();
    assert_eq!(span["totalDays"], 4);

    let deleted = ctx
        .server
        .delete(&format!("/api/schedules/{id}/entries/{entry_id}"))
        .add_header(user_header(), admin())
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(
        deleted.json::<Value>(),
        json!({ "message": "Entry deleted successfully" })
    );

    let after = ctx
        .server
        .get(&format!("/api/schedules/{id}"))
        .add_header(user_header(), admin())
        .await
        .json::<Value>();
    assert_eq!(after["entries"].as_array().unwrap().len(), 1);
    assert_eq!(after["totalDays"], 1);
}

#[tokio::test]
async fn test_update_entry_conflict() {
    let ctx = TestContext::new();
    let batch = ctx
        .create_batch(json!([
            entry("2024-01-15", "10:00", "12:00", 1),
            entry("2024-01-15", "13:00", "15:00", 1),
        ]))
        .await;
    let id = batch["id"].as_i64().unwrap();
    let second = batch["entries"][1]["id"].as_i64().unwrap();

    let response = ctx
        .server
        .patch(&format!("/api/schedules/{id}/entries/{second}"))
        .add_header(user_header(), admin())
        .json(&json!({ "startTime": "11:00", "endTime": "14:00" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["conflicts"][0]["entryId"], batch["entries"][0]["id"]);

    let inverted = ctx
        .server
        .patch(&format!("/api/schedules/{id}/entries/{second}"))
        .add_header(user_header(), admin())
        .json(&json!({ "startTime": "15:00", "endTime": "13:00" }))
        .await;
    assert_eq!(inverted.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entry_of_other_batch_is_not_found() {
    let ctx = TestContext::new();
    let first = ctx
        .create_batch(json!([entry("2024-01-15", "10:00", "12:00", 1)]))
        .await;
    let second = ctx
        .create_batch(json!([entry("2024-01-15", "10:00", "12:00", 2)]))
        .await;

    let response = ctx
        .server
        .delete(&format!(
            "/api/schedules/{}/entries/{}",
            first["id"], second["entries"][0]["id"]
        ))
        .add_header(user_header(), admin())
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_published_batch_entries_are_locked() {
    let ctx = TestContext::new();
    let batch = ctx
        .create_batch(json!([entry("2024-01-15", "10:00", "12:00", 1)]))
        .await;
    let id = batch["id"].as_i64().unwrap();
    let entry_id = batch["entries"][0]["id"].as_i64().unwrap();

    ctx.server
        .patch(&format!("/api/schedules/{id}"))
        .add_header(user_header(), admin())
        .json(&json!({ "status": "PUBLISHED" }))
        .await;

    let add = ctx
        .server
        .post(&format!("/api/schedules/{id}/entries"))
        .add_header(user_header(), admin())
        .json(&entry("2024-01-16", "10:00", "12:00", 1))
        .await;
    let update = ctx
        .server
        .patch(&format!("/api/schedules/{id}/entries/{entry_id}"))
        .add_header(user_header(), admin())
        .json(&json!({ "startTime": "10:00", "endTime": "11:00" }))
        .await;
    let delete = ctx
        .server
        .delete(&format!("/api/schedules/{id}/entries/{entry_id}"))
        .add_header(user_header(), admin())
        .await;

    for response in [add, update, delete] {
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ErrorBody>().code, "BATCH_LOCKED");
    }
}
