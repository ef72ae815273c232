use std::error::Error;

use chrono::{NaiveDate, NaiveTime};
use shiftdesk_core::conflict::{CollidingEntry, Conflict};
use shiftdesk_core::errors::{ErrorKind, ScheduleError, ValidationError};
use shiftdesk_core::models::batch::BatchStatus;

fn conflict() -> Conflict {
    Conflict {
        user_id: 4,
        date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        colliding: vec![CollidingEntry {
            entry_id: 9,
            batch_id: 2,
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        }],
    }
}

#[test]
fn test_schedule_error_display() {
    let malformed: ScheduleError = ValidationError::MalformedTime("9:00".to_string()).into();
    let too_large: ScheduleError = ValidationError::BatchTooLarge { count: 22, max: 21 }.into();
    let locked = ScheduleError::BatchLocked {
        batch_id: 3,
        status: BatchStatus::Published,
    };
    let database = ScheduleError::Persistence(eyre::eyre!("connection refused"));

    assert_eq!(
        malformed.to_string(),
        "Validation error: Invalid time format (HH:MM): \"9:00\""
    );
    assert_eq!(
        too_large.to_string(),
        "Validation error: A batch holds at most 21 entries, got 22"
    );
    assert_eq!(
        locked.to_string(),
        "Batch 3 is PUBLISHED and can no longer be edited"
    );
    assert_eq!(
        ScheduleError::from(conflict()).to_string(),
        "Time conflict for user 4 on 2024-01-15"
    );
    assert!(database.to_string().contains("Database error:"));
}

#[test]
fn test_error_kinds() {
    let cases = [
        (ScheduleError::from(ValidationError::EmptyBatch), ErrorKind::Validation),
        (ScheduleError::BatchNotFound(1), ErrorKind::NotFound),
        (ScheduleError::EntryNotFound(1), ErrorKind::NotFound),
        (
            ScheduleError::EntryNotInBatch { batch_id: 1, entry_id: 2 },
            ErrorKind::NotFound,
        ),
        (ScheduleError::from(conflict()), ErrorKind::Conflict),
        (
            ScheduleError::BatchLocked {
                batch_id: 1,
                status: BatchStatus::Published,
            },
            ErrorKind::Locked,
        ),
        (ScheduleError::Persistence(eyre::eyre!("boom")), ErrorKind::Persistence),
    ];

    for (error, kind) in cases {
        assert_eq!(error.kind(), kind, "{error}");
    }
}

#[test]
fn test_validation_error_is_source() {
    let error: ScheduleError = ValidationError::MissingField("userId").into();
    assert!(error.source().is_some());
}
