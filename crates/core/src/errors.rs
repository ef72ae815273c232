use thiserror::Error;

use crate::conflict::Conflict;
use crate::models::batch::BatchStatus;

/// Input rejected before anything touches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid time format (HH:MM): {0:?}")]
    MalformedTime(String),

    #[error("Invalid date format (YYYY-MM-DD): {0:?}")]
    MalformedDate(String),

    #[error("Start time {start} must be before end time {end}")]
    InvertedRange { start: String, end: String },

    #[error("A batch needs at least one entry")]
    EmptyBatch,

    #[error("A batch holds at most {max} entries, got {count}")]
    BatchTooLarge { count: usize, max: usize },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unsupported status transition to {0:?}")]
    InvalidStatus(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Batch {0} not found")]
    BatchNotFound(i64),

    #[error("Entry {0} not found")]
    EntryNotFound(i64),

    #[error("Entry {entry_id} not found in batch {batch_id}")]
    EntryNotInBatch { batch_id: i64, entry_id: i64 },

    #[error("Time conflict for user {} on {}", .0.user_id, .0.date)]
    TimeConflict(Conflict),

    #[error("Batch {batch_id} is {status} and can no longer be edited")]
    BatchLocked { batch_id: i64, status: BatchStatus },

    #[error("Database error: {0}")]
    Persistence(#[from] eyre::Report),
}

/// Coarse classification used by callers that map errors onto transport codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Locked,
    Persistence,
}

impl ScheduleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduleError::Validation(_) => ErrorKind::Validation,
            ScheduleError::BatchNotFound(_)
            | ScheduleError::EntryNotFound(_)
            | ScheduleError::EntryNotInBatch { .. } => ErrorKind::NotFound,
            ScheduleError::TimeConflict(_) => ErrorKind::Conflict,
            ScheduleError::BatchLocked { .. } => ErrorKind::Locked,
            ScheduleError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl From<Conflict> for ScheduleError {
    fn from(conflict: Conflict) -> Self {
        ScheduleError::TimeConflict(conflict)
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
