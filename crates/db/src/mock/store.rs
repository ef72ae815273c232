use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;

use shiftdesk_core::lifecycle::PublishPlan;
use shiftdesk_core::models::batch::{BatchSummary, DateSpan, NewBatch, ScheduleBatch};
use shiftdesk_core::models::entry::ScheduleEntry;
use shiftdesk_core::models::user::UserContact;
use shiftdesk_core::store::ScheduleStore;
use shiftdesk_core::time_range::TimeRange;

// Mock store for failure injection in engine and API tests
mock! {
    pub ScheduleStore {}

    #[async_trait]
    impl ScheduleStore for ScheduleStore {
        async fn insert_batch(&self, batch: &NewBatch) -> eyre::Result<ScheduleBatch>;

        async fn list_batches(&self) -> eyre::Result<Vec<BatchSummary>>;

        async fn find_batch(&self, batch_id: i64) -> eyre::Result<Option<ScheduleBatch>>;

        async fn find_entry(&self, entry_id: i64) -> eyre::Result<Option<ScheduleEntry>>;

        async fn entries_for_user_on(
            &self,
            user_id: i64,
            date: NaiveDate,
        ) -> eyre::Result<Vec<ScheduleEntry>>;

        async fn insert_entry(
            &self,
            batch_id: i64,
            entry: &ScheduleEntry,
            span: DateSpan,
        ) -> eyre::Result<ScheduleEntry>;

        async fn update_entry_range(
            &self,
            entry_id: i64,
            range: &TimeRange,
            total_hours: f64,
        ) -> eyre::Result<ScheduleEntry>;

        async fn delete_entry(
            &self,
            batch_id: i64,
            entry_id: i64,
            span: Option<DateSpan>,
        ) -> eyre::Result<()>;

        async fn publish_batch(&self, plan: &PublishPlan) -> eyre::Result<ScheduleBatch>;

        async fn delete_batch(&self, batch_id: i64) -> eyre::Result<bool>;

        async fn find_contacts(&self, user_ids: &[i64]) -> eyre::Result<Vec<UserContact>>;
    }
}
