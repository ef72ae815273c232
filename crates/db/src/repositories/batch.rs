use crate::models::{DbBatch, DbBatchSummary};
use eyre::Result;
use shiftdesk_core::models::batch::{BatchStatus, DateSpan};
use sqlx::PgExecutor;

pub async fn create_batch<'e, E: PgExecutor<'e>>(executor: E, span: &DateSpan) -> Result<DbBatch> {
    tracing::debug!(
        "Creating batch: start_date={}, end_date={}, total_days={}",
        span.start_date, span.end_date, span.total_days
    );

    let batch = sqlx::query_as::<_, DbBatch>(
        r#"
        INSERT INTO schedule_batches (status, start_date, end_date, total_days)
        VALUES ($1, $2, $3, $4)
        RETURNING id, status, start_date, end_date, total_days, created_at, updated_at
        "#,
    )
    .bind(BatchStatus::Drafted.as_str())
    .bind(span.start_date)
    .bind(span.end_date)
    .bind(span.total_days as i32)
    .fetch_one(executor)
    .await?;

    tracing::debug!("Batch created successfully: id={}", batch.id);
    Ok(batch)
}

pub async fn list_batches<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<DbBatchSummary>> {
    let batches = sqlx::query_as::<_, DbBatchSummary>(
        r#"
        SELECT b.id, b.status, b.start_date, b.end_date, b.total_days,
               COUNT(e.id) AS entry_count, b.created_at, b.updated_at
        FROM schedule_batches b
        LEFT JOIN schedule_entries e ON e.batch_id = b.id
        GROUP BY b.id
        ORDER BY b.created_at DESC, b.id DESC
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(batches)
}

pub async fn get_batch_by_id<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<Option<DbBatch>> {
    tracing::debug!("Getting batch by id: {}", id);

    let batch = sqlx::query_as::<_, DbBatch>(
        r#"
        SELECT id, status, start_date, end_date, total_days, created_at, updated_at
        FROM schedule_batches
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    if batch.is_none() {
        tracing::debug!("Batch not found: id={}", id);
    }

    Ok(batch)
}

/// Same as [`get_batch_by_id`] but holds a row lock until the transaction ends.
pub async fn lock_batch<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<Option<DbBatch>> {
    let batch = sqlx::query_as::<_, DbBatch>(
        r#"
        SELECT id, status, start_date, end_date, total_days, created_at, updated_at
        FROM schedule_batches
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(batch)
}

pub async fn update_span<'e, E: PgExecutor<'e>>(executor: E, id: i64, span: &DateSpan) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE schedule_batches
        SET start_date = $2, end_date = $3, total_days = $4, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(span.start_date)
    .bind(span.end_date)
    .bind(span.total_days as i32)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn touch_batch<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<()> {
    sqlx::query("UPDATE schedule_batches SET updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

/// Flips a DRAFTED batch to PUBLISHED. Returns false if it was not DRAFTED.
pub async fn mark_published<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<bool> {
    tracing::debug!("Publishing batch: id={}", id);

    let result = sqlx::query(
        r#"
        UPDATE schedule_batches
        SET status = $2, updated_at = NOW()
        WHERE id = $1 AND status = $3
        "#,
    )
    .bind(id)
    .bind(BatchStatus::Published.as_str())
    .bind(BatchStatus::Drafted.as_str())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Entries go with the batch through `ON DELETE CASCADE`.
pub async fn delete_batch<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<bool> {
    tracing::debug!("Deleting batch: id={}", id);

    let result = sqlx::query("DELETE FROM schedule_batches WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
