//! The batch and entry operations.
//!
//! [`ScheduleEngine`] validates input, enforces the DRAFTED lock and the
//! double-booking rule, commits through a [`ScheduleStore`], and hands back
//! the notifications a transition calls for. It never delivers them.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::conflict::ConflictValidator;
use crate::errors::{ScheduleError, ScheduleResult, ValidationError};
use crate::lifecycle::{EntryChange, PublishPlan};
use crate::models::batch::{BatchSummary, DateSpan, NewBatch, ScheduleBatch, MAX_BATCH_ENTRIES};
use crate::models::entry::ScheduleEntry;
use crate::models::requests::{CreateBatchRequest, EntryInput, PublishRequest, UpdateEntryRequest};
use crate::notification::{manifest, Notification, NotificationTemplate, Outcome};
use crate::store::ScheduleStore;
use crate::time_range::{parse_clock, TimeRange};

#[derive(Clone)]
pub struct ScheduleEngine {
    store: Arc<dyn ScheduleStore>,
}

impl ScheduleEngine {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ScheduleStore> {
        &self.store
    }

    /// Creates a DRAFTED batch from 1..=21 entries.
    ///
    /// Nothing is stored unless every entry is well formed and free of
    /// overlaps, both within the request and against stored entries.
    pub async fn create_batch(&self, request: &CreateBatchRequest) -> ScheduleResult<Outcome<ScheduleBatch>> {
        let plan = NewBatch::plan(&request.entries)?;
        ConflictValidator::check_internal(&plan.entries)?;
        self.check_against_store(&plan.entries, None).await?;

        let batch = self.store.insert_batch(&plan).await?;
        info!(
            "Created draft batch {} with {} entries ({} to {})",
            batch.id,
            batch.entries.len(),
            batch.span.start_date,
            batch.span.end_date
        );

        let side_effects = self
            .manifest_for(&plan.user_ids(), NotificationTemplate::DraftAvailable { batch_id: batch.id })
            .await;
        Ok(Outcome::new(batch, side_effects))
    }

    pub async fn list_batches(&self) -> ScheduleResult<Vec<BatchSummary>> {
        Ok(self.store.list_batches().await?)
    }

    pub async fn get_batch(&self, batch_id: i64) -> ScheduleResult<ScheduleBatch> {
        self.store
            .find_batch(batch_id)
            .await?
            .ok_or(ScheduleError::BatchNotFound(batch_id))
    }

    /// Adds one entry to a DRAFTED batch.
    pub async fn add_entry(&self, batch_id: i64, input: &EntryInput) -> ScheduleResult<ScheduleEntry> {
        let (user_id, range) = input.validate()?;

        let batch = self.get_batch(batch_id).await?;
        batch.ensure_drafted()?;
        if batch.entries.len() >= MAX_BATCH_ENTRIES {
            return Err(ValidationError::BatchTooLarge {
                count: batch.entries.len() + 1,
                max: MAX_BATCH_ENTRIES,
            }
            .into());
        }

        let entry = ScheduleEntry::create(user_id, range).in_batch(batch_id);
        let siblings = self.store.entries_for_user_on(user_id, range.date()).await?;
        ConflictValidator::validate(&entry.candidate(), &siblings, None)?;

        let span = DateSpan::of_entries(batch.entries.iter().chain([&entry])).unwrap_or(batch.span);
        let saved = self.store.insert_entry(batch_id, &entry, span).await?;
        info!("Added entry {} to batch {}", saved.id, batch_id);
        Ok(saved)
    }

    /// Moves an entry of a DRAFTED batch to new clock times on the same date.
    pub async fn update_entry(
        &self,
        batch_id: i64,
        entry_id: i64,
        request: &UpdateEntryRequest,
    ) -> ScheduleResult<ScheduleEntry> {
        let (start, end) = request.times()?;
        let start = parse_clock(start)?;
        let end = parse_clock(end)?;
        TimeRange::check_order(start, end)?;

        let batch = self.get_batch(batch_id).await?;
        batch.ensure_drafted()?;
        let mut entry = self.entry_in_batch(batch_id, entry_id).await?;

        let new_range = TimeRange::new(entry.range().date(), start, end)?;
        let siblings = self
            .store
            .entries_for_user_on(entry.user_id, new_range.date())
            .await?;
        entry.reschedule(new_range, &siblings)?;

        let saved = self
            .store
            .update_entry_range(entry.id, entry.range(), entry.total_hours())
            .await?;
        debug!("Rescheduled entry {} of batch {} to {}", entry_id, batch_id, new_range);
        Ok(saved)
    }

    /// Removes an entry from a DRAFTED batch. No conflict check is needed.
    ///
    /// Removing the last entry is allowed; the empty draft keeps its last
    /// date span.
    pub async fn delete_entry(&self, batch_id: i64, entry_id: i64) -> ScheduleResult<()> {
        let batch = self.get_batch(batch_id).await?;
        batch.ensure_drafted()?;
        self.entry_in_batch(batch_id, entry_id).await?;

        let span = DateSpan::of_entries(batch.entries.iter().filter(|e| e.id != entry_id));
        self.store.delete_entry(batch_id, entry_id, span).await?;
        debug!("Deleted entry {} from batch {}", entry_id, batch_id);
        Ok(())
    }

    /// DRAFTED -> PUBLISHED, optionally reconciling a final entry set first.
    ///
    /// The final set is checked for overlaps within itself and against
    /// entries of other batches. Status and entries commit together.
    pub async fn publish(&self, batch_id: i64, request: &PublishRequest) -> ScheduleResult<Outcome<ScheduleBatch>> {
        request.target_status()?;
        let changes = EntryChange::decide_all(request.entries.as_deref().unwrap_or_default())?;

        let batch = self.get_batch(batch_id).await?;
        let plan = PublishPlan::prepare(&batch, changes)?;
        self.check_against_store(&plan.final_entries, Some(batch_id)).await?;

        let published = self.store.publish_batch(&plan).await?;
        info!(
            "Published batch {} ({} entries, {} changes applied)",
            published.id,
            published.entries.len(),
            plan.changes.len()
        );

        let side_effects = self
            .manifest_for(&plan.user_ids(), NotificationTemplate::SchedulePublished { batch_id })
            .await;
        Ok(Outcome::new(published, side_effects))
    }

    /// Deletes a batch at any status, cascading to its entries.
    pub async fn delete_batch(&self, batch_id: i64) -> ScheduleResult<()> {
        if !self.store.delete_batch(batch_id).await? {
            return Err(ScheduleError::BatchNotFound(batch_id));
        }
        info!("Deleted batch {}", batch_id);
        Ok(())
    }

    async fn entry_in_batch(&self, batch_id: i64, entry_id: i64) -> ScheduleResult<ScheduleEntry> {
        let entry = self
            .store
            .find_entry(entry_id)
            .await?
            .ok_or(ScheduleError::EntryNotFound(entry_id))?;
        if entry.batch_id != batch_id {
            return Err(ScheduleError::EntryNotInBatch { batch_id, entry_id });
        }
        Ok(entry)
    }

    /// Checks each entry against stored entries of the same user and date.
    /// Stored entries of `replacing_batch` are skipped; `entries` supersedes them.
    async fn check_against_store(
        &self,
        entries: &[ScheduleEntry],
        replacing_batch: Option<i64>,
    ) -> ScheduleResult<()> {
        let mut stored: HashMap<(i64, NaiveDate), Vec<ScheduleEntry>> = HashMap::new();

        for entry in entries {
            let key = (entry.user_id, entry.range().date());
            if !stored.contains_key(&key) {
                let siblings = self
                    .store
                    .entries_for_user_on(key.0, key.1)
                    .await?
                    .into_iter()
                    .filter(|s| Some(s.batch_id) != replacing_batch)
                    .collect();
                stored.insert(key, siblings);
            }
            ConflictValidator::validate(&entry.candidate(), &stored[&key], Some(entry.id))?;
        }

        Ok(())
    }

    /// Recipients are best effort: a failed lookup drops the notifications,
    /// never the operation that already committed.
    async fn manifest_for(&self, user_ids: &[i64], template: NotificationTemplate) -> Vec<Notification> {
        match self.store.find_contacts(user_ids).await {
            Ok(contacts) => manifest(&contacts, template),
            Err(err) => {
                warn!("Could not load recipients for {:?}: {}", template, err);
                Vec::new()
            }
        }
    }
}
