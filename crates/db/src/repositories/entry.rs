use crate::models::DbEntry;
use chrono::NaiveDate;
use eyre::Result;
use shiftdesk_core::time_range::TimeRange;
use sqlx::PgExecutor;

const COLUMNS: &str = "id, batch_id, user_id, date, start_time, end_time, total_hours";

pub async fn create_entry<'e, E: PgExecutor<'e>>(
    executor: E,
    batch_id: i64,
    user_id: i64,
    range: &TimeRange,
    total_hours: f64,
) -> Result<DbEntry> {
    tracing::debug!(
        "Creating entry: batch_id={}, user_id={}, range={}",
        batch_id, user_id, range
    );

    let entry = sqlx::query_as::<_, DbEntry>(&format!(
        r#"
        INSERT INTO schedule_entries (batch_id, user_id, date, start_time, end_time, total_hours)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(batch_id)
    .bind(user_id)
    .bind(range.date())
    .bind(range.start())
    .bind(range.end())
    .bind(total_hours)
    .fetch_one(executor)
    .await?;

    Ok(entry)
}

pub async fn get_entry_by_id<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<Option<DbEntry>> {
    let entry = sqlx::query_as::<_, DbEntry>(&format!(
        "SELECT {COLUMNS} FROM schedule_entries WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(entry)
}

pub async fn get_entries_by_batch_id<'e, E: PgExecutor<'e>>(executor: E, batch_id: i64) -> Result<Vec<DbEntry>> {
    let entries = sqlx::query_as::<_, DbEntry>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM schedule_entries
        WHERE batch_id = $1
        ORDER BY date ASC, start_time ASC, id ASC
        "#
    ))
    .bind(batch_id)
    .fetch_all(executor)
    .await?;

    Ok(entries)
}

/// Every entry of a user on one date, whatever batch it belongs to.
pub async fn get_entries_for_user_on<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: i64,
    date: NaiveDate,
) -> Result<Vec<DbEntry>> {
    let entries = sqlx::query_as::<_, DbEntry>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM schedule_entries
        WHERE user_id = $1 AND date = $2
        ORDER BY start_time ASC
        "#
    ))
    .bind(user_id)
    .bind(date)
    .fetch_all(executor)
    .await?;

    Ok(entries)
}

pub async fn update_entry_range<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i64,
    range: &TimeRange,
    total_hours: f64,
) -> Result<Option<DbEntry>> {
    tracing::debug!("Updating entry: id={}, range={}", id, range);

    let entry = sqlx::query_as::<_, DbEntry>(&format!(
        r#"
        UPDATE schedule_entries
        SET start_time = $2, end_time = $3, total_hours = $4
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(range.start())
    .bind(range.end())
    .bind(total_hours)
    .fetch_optional(executor)
    .await?;

    Ok(entry)
}

pub async fn delete_entry<'e, E: PgExecutor<'e>>(executor: E, batch_id: i64, id: i64) -> Result<bool> {
    tracing::debug!("Deleting entry: batch_id={}, id={}", batch_id, id);

    let result = sqlx::query("DELETE FROM schedule_entries WHERE id = $1 AND batch_id = $2")
        .bind(id)
        .bind(batch_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
