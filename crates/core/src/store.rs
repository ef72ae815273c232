//! Persistence port.
//!
//! Every method that writes is a single transaction on the implementor's
//! side: either all of its rows change or none do.

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;

use crate::lifecycle::PublishPlan;
use crate::models::batch::{BatchSummary, DateSpan, NewBatch, ScheduleBatch};
use crate::models::entry::ScheduleEntry;
use crate::models::user::UserContact;
use crate::time_range::TimeRange;

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Inserts a DRAFTED batch and all of its entries.
    async fn insert_batch(&self, batch: &NewBatch) -> Result<ScheduleBatch>;

    /// All batches, newest first.
    async fn list_batches(&self) -> Result<Vec<BatchSummary>>;

    /// A batch with its entries ordered by date.
    async fn find_batch(&self, batch_id: i64) -> Result<Option<ScheduleBatch>>;

    async fn find_entry(&self, entry_id: i64) -> Result<Option<ScheduleEntry>>;

    /// Every stored entry of `user_id` on `date`, across all batches.
    async fn entries_for_user_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<ScheduleEntry>>;

    /// Adds one entry to a batch and stores the batch's new date span.
    async fn insert_entry(&self, batch_id: i64, entry: &ScheduleEntry, span: DateSpan) -> Result<ScheduleEntry>;

    /// Writes new clock times and hours for one entry.
    async fn update_entry_range(&self, entry_id: i64, range: &TimeRange, total_hours: f64) -> Result<ScheduleEntry>;

    /// Removes one entry. `span` replaces the batch's span when present.
    async fn delete_entry(&self, batch_id: i64, entry_id: i64, span: Option<DateSpan>) -> Result<()>;

    /// Applies the plan's entry changes and sets the batch PUBLISHED.
    async fn publish_batch(&self, plan: &PublishPlan) -> Result<ScheduleBatch>;

    /// Deletes a batch and its entries. Returns whether a batch was removed.
    async fn delete_batch(&self, batch_id: i64) -> Result<bool>;

    /// Contacts for the given users, skipping unknown or deleted ones.
    async fn find_contacts(&self, user_ids: &[i64]) -> Result<Vec<UserContact>>;
}
