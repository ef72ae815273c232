//! Request and response bodies exchanged with callers.
//!
//! Every field of an incoming body is optional on the wire so that a missing
//! field is reported as a validation error instead of a decode failure.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::models::batch::BatchStatus;
use crate::time_range::TimeRange;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub user_id: Option<i64>,
}

impl EntryInput {
    pub fn new(date: &str, start_time: &str, end_time: &str, user_id: i64) -> Self {
        Self {
            date: Some(date.to_string()),
            start_time: Some(start_time.to_string()),
            end_time: Some(end_time.to_string()),
            user_id: Some(user_id),
        }
    }

    /// Checks presence and format, returning the assignee and the parsed range.
    pub fn validate(&self) -> Result<(i64, TimeRange), ValidationError> {
        let range = self.range()?;
        let user_id = self.user_id.ok_or(ValidationError::MissingField("userId"))?;
        Ok((user_id, range))
    }

    pub fn range(&self) -> Result<TimeRange, ValidationError> {
        let date = self.date.as_deref().ok_or(ValidationError::MissingField("date"))?;
        let (start, end) = self.times()?;
        TimeRange::parse(date, start, end)
    }

    /// The raw `startTime` and `endTime`, both required.
    pub fn times(&self) -> Result<(&str, &str), ValidationError> {
        let start = self
            .start_time
            .as_deref()
            .ok_or(ValidationError::MissingField("startTime"))?;
        let end = self
            .end_time
            .as_deref()
            .ok_or(ValidationError::MissingField("endTime"))?;
        Ok((start, end))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    #[serde(default)]
    pub entries: Vec<EntryInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl UpdateEntryRequest {
    pub fn new(start_time: &str, end_time: &str) -> Self {
        Self {
            start_time: Some(start_time.to_string()),
            end_time: Some(end_time.to_string()),
        }
    }

    pub fn times(&self) -> Result<(&str, &str), ValidationError> {
        let start = self
            .start_time
            .as_deref()
            .ok_or(ValidationError::MissingField("startTime"))?;
        let end = self
            .end_time
            .as_deref()
            .ok_or(ValidationError::MissingField("endTime"))?;
        Ok((start, end))
    }
}

/// One entry of a publish payload. A positive `id` edits an existing entry,
/// anything else creates a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: EntryInput,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub status: Option<String>,
    pub entries: Option<Vec<EntryPayload>>,
}

impl PublishRequest {
    pub fn publish() -> Self {
        Self {
            status: Some(BatchStatus::Published.as_str().to_string()),
            entries: None,
        }
    }

    pub fn with_entries(mut self, entries: Vec<EntryPayload>) -> Self {
        self.entries = Some(entries);
        self
    }

    /// The requested target status. Only PUBLISHED is reachable.
    pub fn target_status(&self) -> Result<BatchStatus, ValidationError> {
        let raw = self.status.as_deref().ok_or(ValidationError::MissingField("status"))?;
        match raw.parse::<BatchStatus>()? {
            BatchStatus::Published => Ok(BatchStatus::Published),
            BatchStatus::Drafted => Err(ValidationError::InvalidStatus(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
