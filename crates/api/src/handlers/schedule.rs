use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shiftdesk_core::models::batch::{BatchSummary, ScheduleBatch};
use shiftdesk_core::models::requests::{CreateBatchRequest, MessageResponse, PublishRequest};
use std::sync::Arc;
use tracing::debug;

use crate::{
    middleware::{
        auth::CurrentUser,
        error_handling::{ApiJson, AppError},
    },
    notify, ApiState,
};

#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<BatchSummary>>, AppError> {
    debug!("User {} listing schedules", user_id);
    let batches = state.engine.list_batches().await?;
    Ok(Json(batches))
}

#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(payload): ApiJson<CreateBatchRequest>,
) -> Result<(StatusCode, Json<ScheduleBatch>), AppError> {
    debug!("User {} creating a schedule with {} entries", user_id, payload.entries.len());

    let (batch, notifications) = state.engine.create_batch(&payload).await?.into_parts();
    notify::dispatch(state.notifier.clone(), notifications);

    Ok((StatusCode::CREATED, Json(batch)))
}

#[axum::debug_handler]
pub async fn get_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ScheduleBatch>, AppError> {
    let batch = state.engine.get_batch(id).await?;
    Ok(Json(batch))
}

/// Publishes a draft, applying any entry edits sent along with it.
#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<PublishRequest>,
) -> Result<Json<ScheduleBatch>, AppError> {
    debug!("User {} publishing schedule {}", user_id, id);

    let (batch, notifications) = state.engine.publish(id, &payload).await?.into_parts();
    notify::dispatch(state.notifier.clone(), notifications);

    Ok(Json(batch))
}

#[axum::debug_handler]
pub async fn delete_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    debug!("User {} deleting schedule {}", user_id, id);
    state.engine.delete_batch(id).await?;
    Ok(Json(MessageResponse::new("Schedule deleted successfully")))
}
