use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shiftdesk_core::models::entry::ScheduleEntry;
use shiftdesk_core::models::requests::{EntryInput, MessageResponse, UpdateEntryRequest};
use std::sync::Arc;

use crate::{
    middleware::{
        auth::CurrentUser,
        error_handling::{ApiJson, AppError},
    },
    ApiState,
};

#[axum::debug_handler]
pub async fn add_entry(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<EntryInput>,
) -> Result<(StatusCode, Json<ScheduleEntry>), AppError> {
    let entry = state.engine.add_entry(id, &payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[axum::debug_handler]
pub async fn update_entry(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_): CurrentUser,
    Path((id, entry_id)): Path<(i64, i64)>,
    ApiJson(payload): ApiJson<UpdateEntryRequest>,
) -> Result<Json<ScheduleEntry>, AppError> {
    let entry = state.engine.update_entry(id, entry_id, &payload).await?;
    Ok(Json(entry))
}

#[axum::debug_handler]
pub async fn delete_entry(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_): CurrentUser,
    Path((id, entry_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, AppError> {
    state.engine.delete_entry(id, entry_id).await?;
    Ok(Json(MessageResponse::new("Entry deleted successfully")))
}
