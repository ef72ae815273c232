use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/schedules",
            get(handlers::schedule::list_schedules).post(handlers::schedule::create_schedule),
        )
        .route(
            "/api/schedules/:id",
            get(handlers::schedule::get_schedule)
                .patch(handlers::schedule::update_schedule)
                .delete(handlers::schedule::delete_schedule),
        )
        .route("/api/schedules/:id/entries", post(handlers::entry::add_entry))
        .route(
            "/api/schedules/:id/entries/:entry_id",
            patch(handlers::entry::update_entry).delete(handlers::entry::delete_entry),
        )
}
