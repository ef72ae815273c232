use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{NaiveDate, NaiveTime};
use rstest::rstest;
use shiftdesk_api::middleware::error_handling::AppError;
use shiftdesk_core::conflict::{CollidingEntry, Conflict};
use shiftdesk_core::errors::{ScheduleError, ValidationError};
use shiftdesk_core::models::batch::BatchStatus;

#[rstest]
#[case(ValidationError::EmptyBatch.into(), StatusCode::BAD_REQUEST)]
#[case(ValidationError::MissingField("date").into(), StatusCode::BAD_REQUEST)]
#[case(ScheduleError::BatchLocked { batch_id: 1, status: BatchStatus::Published }, StatusCode::BAD_REQUEST)]
#[case(ScheduleError::BatchNotFound(1), StatusCode::NOT_FOUND)]
#[case(ScheduleError::EntryNotFound(1), StatusCode::NOT_FOUND)]
#[case(ScheduleError::EntryNotInBatch { batch_id: 1, entry_id: 2 }, StatusCode::NOT_FOUND)]
#[case(ScheduleError::Persistence(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: ScheduleError, #[case] expected: StatusCode) {
    assert_eq!(AppError(error).status(), expected);
}

#[test]
fn test_conflict_maps_to_409() {
    let conflict = Conflict {
        user_id: 1,
        date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        colliding: vec![CollidingEntry {
            entry_id: 3,
            batch_id: 1,
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        }],
    };

    let response = AppError(conflict.into()).into_response();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[test]
fn test_eyre_report_is_persistence() {
    let error: AppError = eyre::eyre!("pool closed").into();
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
