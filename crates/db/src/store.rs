//! PostgreSQL-backed [`ScheduleStore`].

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::{bail, eyre, Result, WrapErr};

use shiftdesk_core::lifecycle::{PlannedChange, PublishPlan};
use shiftdesk_core::models::batch::{BatchSummary, DateSpan, NewBatch, ScheduleBatch};
use shiftdesk_core::models::entry::ScheduleEntry;
use shiftdesk_core::models::user::UserContact;
use shiftdesk_core::store::ScheduleStore;
use shiftdesk_core::time_range::TimeRange;

use crate::repositories::{batch, entry, user};
use crate::DbPool;

#[derive(Clone)]
pub struct PgScheduleStore {
    pool: DbPool,
}

impl PgScheduleStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn insert_batch(&self, new_batch: &NewBatch) -> Result<ScheduleBatch> {
        let mut tx = self.pool.begin().await?;

        let row = batch::create_batch(&mut *tx, &new_batch.span).await?;
        let mut rows = Vec::with_capacity(new_batch.entries.len());
        for e in &new_batch.entries {
            rows.push(entry::create_entry(&mut *tx, row.id, e.user_id, e.range(), e.total_hours()).await?);
        }

        tx.commit().await.wrap_err("Failed to commit new batch")?;
        row.into_batch(rows)
    }

    async fn list_batches(&self) -> Result<Vec<BatchSummary>> {
        batch::list_batches(&self.pool)
            .await?
            .into_iter()
            .map(BatchSummary::try_from)
            .collect()
    }

    async fn find_batch(&self, batch_id: i64) -> Result<Option<ScheduleBatch>> {
        let Some(row) = batch::get_batch_by_id(&self.pool, batch_id).await? else {
            return Ok(None);
        };
        let entries = entry::get_entries_by_batch_id(&self.pool, batch_id).await?;
        row.into_batch(entries).map(Some)
    }

    async fn find_entry(&self, entry_id: i64) -> Result<Option<ScheduleEntry>> {
        entry::get_entry_by_id(&self.pool, entry_id)
            .await?
            .map(|row| row.into_entry())
            .transpose()
    }

    async fn entries_for_user_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<ScheduleEntry>> {
        entry::get_entries_for_user_on(&self.pool, user_id, date)
            .await?
            .into_iter()
            .map(|row| row.into_entry())
            .collect()
    }

    async fn insert_entry(&self, batch_id: i64, new_entry: &ScheduleEntry, span: DateSpan) -> Result<ScheduleEntry> {
        let mut tx = self.pool.begin().await?;

        batch::lock_batch(&mut *tx, batch_id)
            .await?
            .ok_or_else(|| eyre!("Batch {} disappeared before the entry was added", batch_id))?;
        let row = entry::create_entry(
            &mut *tx,
            batch_id,
            new_entry.user_id,
            new_entry.range(),
            new_entry.total_hours(),
        )
        .await?;
        batch::update_span(&mut *tx, batch_id, &span).await?;

        tx.commit().await.wrap_err("Failed to commit new entry")?;
        row.into_entry()
    }

    async fn update_entry_range(&self, entry_id: i64, range: &TimeRange, total_hours: f64) -> Result<ScheduleEntry> {
        let mut tx = self.pool.begin().await?;

        let row = entry::update_entry_range(&mut *tx, entry_id, range, total_hours)
            .await?
            .ok_or_else(|| eyre!("Entry {} disappeared before it was updated", entry_id))?;
        batch::touch_batch(&mut *tx, row.batch_id).await?;

        tx.commit().await.wrap_err("Failed to commit entry update")?;
        row.into_entry()
    }

    async fn delete_entry(&self, batch_id: i64, entry_id: i64, span: Option<DateSpan>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if !entry::delete_entry(&mut *tx, batch_id, entry_id).await? {
            bail!("Entry {} disappeared from batch {} before it was deleted", entry_id, batch_id);
        }
        match span {
            Some(span) => batch::update_span(&mut *tx, batch_id, &span).await?,
            None => batch::touch_batch(&mut *tx, batch_id).await?,
        }

        tx.commit().await.wrap_err("Failed to commit entry removal")?;
        Ok(())
    }

    async fn publish_batch(&self, plan: &PublishPlan) -> Result<ScheduleBatch> {
        let mut tx = self.pool.begin().await?;

        batch::lock_batch(&mut *tx, plan.batch_id)
            .await?
            .ok_or_else(|| eyre!("Batch {} disappeared before it was published", plan.batch_id))?;

        for change in &plan.changes {
            match change {
                PlannedChange::Update { id, range } => {
                    entry::update_entry_range(&mut *tx, *id, range, range.duration_hours())
                        .await?
                        .ok_or_else(|| eyre!("Entry {} disappeared before it was updated", id))?;
                }
                PlannedChange::Create { user_id, range } => {
                    entry::create_entry(&mut *tx, plan.batch_id, *user_id, range, range.duration_hours()).await?;
                }
            }
        }
        batch::update_span(&mut *tx, plan.batch_id, &plan.span).await?;
        if !batch::mark_published(&mut *tx, plan.batch_id).await? {
            bail!("Batch {} was published concurrently", plan.batch_id);
        }

        tx.commit().await.wrap_err("Failed to commit publish")?;

        self.find_batch(plan.batch_id)
            .await?
            .ok_or_else(|| eyre!("Batch {} missing after publish", plan.batch_id))
    }

    async fn delete_batch(&self, batch_id: i64) -> Result<bool> {
        batch::delete_batch(&self.pool, batch_id).await
    }

    async fn find_contacts(&self, user_ids: &[i64]) -> Result<Vec<UserContact>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = user::get_contacts(&self.pool, user_ids).await?;
        Ok(users.into_iter().map(UserContact::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::create_test_pool;
    use pretty_assertions::assert_eq;
    use shiftdesk_core::lifecycle::EntryChange;
    use shiftdesk_core::models::batch::BatchStatus;
    use shiftdesk_core::models::requests::EntryInput;

    async fn store_with_user() -> (PgScheduleStore, i64) {
        let pool = create_test_pool().await;
        let user = user::create_user(&pool, Some("pg@example.com"), Some("Pat"), None)
            .await
            .unwrap();
        (PgScheduleStore::new(pool), user.id)
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database at TEST_DATABASE_URL"]
    async fn test_insert_and_find_batch() {
        let (store, user_id) = store_with_user().await;
        let plan = NewBatch::plan(&[
            EntryInput::new("2031-03-04", "10:00", "14:00", user_id),
            EntryInput::new("2031-03-02", "09:00", "17:00", user_id),
        ])
        .unwrap();

        let created = store.insert_batch(&plan).await.unwrap();
        let found = store.find_batch(created.id).await.unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.status, BatchStatus::Drafted);
        assert_eq!(found.span.total_days, 3);
        assert!(found.entries.iter().all(|e| e.is_persisted()));
        assert_eq!(found.entries[0].range().date(), plan.span.start_date);

        assert!(store.delete_batch(created.id).await.unwrap());
        assert!(store.find_batch(created.id).await.unwrap().is_none());
        assert!(store.find_entry(created.entries[0].id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database at TEST_DATABASE_URL"]
    async fn test_publish_applies_changes() {
        let (store, user_id) = store_with_user().await;
        let plan = NewBatch::plan(&[EntryInput::new("2031-04-01", "10:00", "14:00", user_id)]).unwrap();
        let created = store.insert_batch(&plan).await.unwrap();

        let publish = PublishPlan::prepare(
            &created,
            vec![EntryChange::Create {
                user_id,
                range: TimeRange::parse("2031-04-03", "08:00", "09:30").unwrap(),
            }],
        )
        .unwrap();
        let published = store.publish_batch(&publish).await.unwrap();

        assert_eq!(published.status, BatchStatus::Published);
        assert_eq!(published.entries.len(), 2);
        assert_eq!(published.span.total_days, 3);
        assert!(store.publish_batch(&publish).await.is_err());

        let contacts = store.find_contacts(&[user_id]).await.unwrap();
        assert_eq!(contacts[0].email.as_deref(), Some("pg@example.com"));

        store.delete_batch(created.id).await.unwrap();
    }
}
