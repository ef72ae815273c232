//! # Error Handling Middleware
//!
//! Maps [`ScheduleError`] onto HTTP status codes and a JSON body of the form
//! `{ "error": <message>, "code": <CODE> }`. Time conflicts also list the
//! colliding entries under `conflicts`.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shiftdesk_core::conflict::CollidingEntry;
use shiftdesk_core::errors::{ErrorKind, ScheduleError, ValidationError};

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<CollidingEntry>>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            conflicts: None,
        }
    }
}

/// Application error wrapper that provides HTTP status code mapping
///
/// Handlers return `Result<_, AppError>` and use `?` on engine results.
#[derive(Debug)]
pub struct AppError(pub ScheduleError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Validation | ErrorKind::Locked => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self.0.kind() {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Locked => "BATCH_LOCKED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "TIME_CONFLICT",
            ErrorKind::Persistence => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Store failures are logged in full and reported without detail.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {:?}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let mut body = ErrorBody::new(message, self.code());
        if let ScheduleError::TimeConflict(conflict) = self.0 {
            body.conflicts = Some(conflict.colliding);
        }

        (status, Json(body)).into_response()
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ScheduleError::Persistence(err))
    }
}

/// Undecodable bodies are validation failures like any other bad input.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(ValidationError::MalformedBody(rejection.body_text()).into())
    }
}

/// `Json` extractor whose rejection goes through [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
