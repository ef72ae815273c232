//! In-memory [`ScheduleStore`].
//!
//! Thread-safe and non-persistent. Used for tests and local runs without a
//! database. Each method holds the single state lock for its whole body, so
//! writes are all-or-nothing like the PostgreSQL store's transactions.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::{bail, eyre, Result};

use shiftdesk_core::lifecycle::{PlannedChange, PublishPlan};
use shiftdesk_core::models::batch::{BatchStatus, BatchSummary, DateSpan, NewBatch, ScheduleBatch};
use shiftdesk_core::models::entry::ScheduleEntry;
use shiftdesk_core::models::user::UserContact;
use shiftdesk_core::store::ScheduleStore;
use shiftdesk_core::time_range::TimeRange;

#[derive(Debug, Clone)]
struct StoredBatch {
    id: i64,
    status: BatchStatus,
    span: DateSpan,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    batches: HashMap<i64, StoredBatch>,
    entries: BTreeMap<i64, ScheduleEntry>,
    users: HashMap<i64, UserContact>,
    last_batch_id: i64,
    last_entry_id: i64,
}

impl State {
    fn next_batch_id(&mut self) -> i64 {
        self.last_batch_id += 1;
        self.last_batch_id
    }

    fn insert_entry(&mut self, batch_id: i64, user_id: i64, range: TimeRange) -> ScheduleEntry {
        self.last_entry_id += 1;
        let entry = ScheduleEntry::from_parts(self.last_entry_id, batch_id, user_id, range, range.duration_hours());
        self.entries.insert(entry.id, entry.clone());
        entry
    }

    fn batch_mut(&mut self, batch_id: i64) -> Result<&mut StoredBatch> {
        self.batches
            .get_mut(&batch_id)
            .ok_or_else(|| eyre!("Batch {} not found", batch_id))
    }

    fn assemble(&self, stored: &StoredBatch) -> ScheduleBatch {
        let mut batch = ScheduleBatch {
            id: stored.id,
            status: stored.status,
            span: stored.span,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            entries: self
                .entries
                .values()
                .filter(|e| e.batch_id == stored.id)
                .cloned()
                .collect(),
        };
        batch.sort_entries();
        batch
    }
}

pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    /// A store whose user directory holds `contacts`.
    pub fn with_users<I>(contacts: I) -> Self
    where
        I: IntoIterator<Item = UserContact>,
    {
        let state = State {
            users: contacts.into_iter().map(|c| (c.id, c)).collect(),
            ..State::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    pub fn add_user(&self, contact: UserContact) -> Result<()> {
        self.write()?.users.insert(contact.id, contact);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| eyre!("In-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| eyre!("In-memory store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn insert_batch(&self, batch: &NewBatch) -> Result<ScheduleBatch> {
        let mut state = self.write()?;
        let now = Utc::now();
        let stored = StoredBatch {
            id: state.next_batch_id(),
            status: BatchStatus::Drafted,
            span: batch.span,
            created_at: now,
            updated_at: now,
        };

        for entry in &batch.entries {
            state.insert_entry(stored.id, entry.user_id, *entry.range());
        }
        state.batches.insert(stored.id, stored.clone());
        Ok(state.assemble(&stored))
    }

    async fn list_batches(&self) -> Result<Vec<BatchSummary>> {
        let state = self.read()?;
        let mut summaries: Vec<BatchSummary> = state
            .batches
            .values()
            .map(|b| BatchSummary {
                id: b.id,
                status: b.status,
                span: b.span,
                entry_count: state.entries.values().filter(|e| e.batch_id == b.id).count() as i64,
                created_at: b.created_at,
                updated_at: b.updated_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(summaries)
    }

    async fn find_batch(&self, batch_id: i64) -> Result<Option<ScheduleBatch>> {
        let state = self.read()?;
        Ok(state.batches.get(&batch_id).map(|b| state.assemble(b)))
    }

    async fn find_entry(&self, entry_id: i64) -> Result<Option<ScheduleEntry>> {
        Ok(self.read()?.entries.get(&entry_id).cloned())
    }

    async fn entries_for_user_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<ScheduleEntry>> {
        let state = self.read()?;
        Ok(state
            .entries
            .values()
            .filter(|e| e.user_id == user_id && e.range().date() == date)
            .cloned()
            .collect())
    }

    async fn insert_entry(&self, batch_id: i64, entry: &ScheduleEntry, span: DateSpan) -> Result<ScheduleEntry> {
        let mut state = self.write()?;
        let batch = state.batch_mut(batch_id)?;
        batch.span = span;
        batch.updated_at = Utc::now();
        Ok(state.insert_entry(batch_id, entry.user_id, *entry.range()))
    }

    async fn update_entry_range(&self, entry_id: i64, range: &TimeRange, total_hours: f64) -> Result<ScheduleEntry> {
        let mut state = self.write()?;
        let stored = state
            .entries
            .get_mut(&entry_id)
            .ok_or_else(|| eyre!("Entry {} not found", entry_id))?;
        *stored = ScheduleEntry::from_parts(stored.id, stored.batch_id, stored.user_id, *range, total_hours);
        let updated = stored.clone();

        state.batch_mut(updated.batch_id)?.updated_at = Utc::now();
        Ok(updated)
    }

    async fn delete_entry(&self, batch_id: i64, entry_id: i64, span: Option<DateSpan>) -> Result<()> {
        let mut state = self.write()?;
        match state.entries.get(&entry_id) {
            Some(entry) if entry.batch_id == batch_id => {}
            _ => bail!("Entry {} not found in batch {}", entry_id, batch_id),
        }

        let batch = state.batch_mut(batch_id)?;
        if let Some(span) = span {
            batch.span = span;
        }
        batch.updated_at = Utc::now();
        state.entries.remove(&entry_id);
        Ok(())
    }

    async fn publish_batch(&self, plan: &PublishPlan) -> Result<ScheduleBatch> {
        let mut state = self.write()?;
        let batch = state.batch_mut(plan.batch_id)?;
        if batch.status != BatchStatus::Drafted {
            bail!("Batch {} was published concurrently", plan.batch_id);
        }

        // Check every update target before touching anything.
        for change in &plan.changes {
            if let PlannedChange::Update { id, .. } = change {
                if !state.entries.get(id).is_some_and(|e| e.batch_id == plan.batch_id) {
                    bail!("Entry {} not found in batch {}", id, plan.batch_id);
                }
            }
        }

        for change in &plan.changes {
            match *change {
                PlannedChange::Update { id, range } => {
                    if let Some(entry) = state.entries.get_mut(&id) {
                        *entry = ScheduleEntry::from_parts(id, entry.batch_id, entry.user_id, range, range.duration_hours());
                    }
                }
                PlannedChange::Create { user_id, range } => {
                    state.insert_entry(plan.batch_id, user_id, range);
                }
            }
        }

        let batch = state.batch_mut(plan.batch_id)?;
        batch.status = BatchStatus::Published;
        batch.span = plan.span;
        batch.updated_at = Utc::now();
        let stored = batch.clone();
        Ok(state.assemble(&stored))
    }

    async fn delete_batch(&self, batch_id: i64) -> Result<bool> {
        let mut state = self.write()?;
        if state.batches.remove(&batch_id).is_none() {
            return Ok(false);
        }
        state.entries.retain(|_, e| e.batch_id != batch_id);
        Ok(true)
    }

    async fn find_contacts(&self, user_ids: &[i64]) -> Result<Vec<UserContact>> {
        let state = self.read()?;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .cloned()
            .collect())
    }
}
