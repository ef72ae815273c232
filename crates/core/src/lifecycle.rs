//! DRAFTED -> PUBLISHED transition and the entry reconciliation that can
//! ride along with it.

use chrono::NaiveTime;

use crate::conflict::ConflictValidator;
use crate::errors::{ScheduleError, ScheduleResult, ValidationError};
use crate::models::batch::{BatchStatus, DateSpan, ScheduleBatch, MAX_BATCH_ENTRIES};
use crate::models::entry::ScheduleEntry;
use crate::models::requests::EntryPayload;
use crate::time_range::{parse_clock, TimeRange};

/// What a publish payload entry asks for, decided once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryChange {
    Create { user_id: i64, range: TimeRange },
    /// New clock times for a stored entry. Its date and assignee never change.
    Update { id: i64, start: NaiveTime, end: NaiveTime },
}

impl EntryChange {
    /// Positive ids edit an existing entry; absent or non-positive ids create one.
    ///
    /// An update only reads `startTime` and `endTime`; any `date` or `userId`
    /// sent with it is ignored.
    pub fn decide(payload: &EntryPayload) -> Result<Self, ValidationError> {
        match payload.id {
            Some(id) if id > 0 => {
                let (start, end) = payload.fields.times()?;
                let start = parse_clock(start)?;
                let end = parse_clock(end)?;
                TimeRange::check_order(start, end)?;
                Ok(EntryChange::Update { id, start, end })
            }
            _ => {
                let (user_id, range) = payload.fields.validate()?;
                Ok(EntryChange::Create { user_id, range })
            }
        }
    }

    pub fn decide_all(payloads: &[EntryPayload]) -> Result<Vec<Self>, ValidationError> {
        payloads.iter().map(Self::decide).collect()
    }
}

/// An [`EntryChange`] resolved against the stored batch. Update ranges keep
/// the stored entry's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedChange {
    Create { user_id: i64, range: TimeRange },
    Update { id: i64, range: TimeRange },
}

/// A validated publish, ready to be committed in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishPlan {
    pub batch_id: i64,
    pub changes: Vec<PlannedChange>,
    pub span: DateSpan,
    /// The batch's entries as they will look after the commit.
    pub final_entries: Vec<ScheduleEntry>,
}

impl PublishPlan {
    /// Checks the transition and applies `changes` to a copy of the entries.
    ///
    /// Updates must name an entry of this batch. The resulting set is
    /// checked for internal overlaps; overlaps with other batches are the
    /// caller's to check since they need the store.
    pub fn prepare(batch: &ScheduleBatch, changes: Vec<EntryChange>) -> ScheduleResult<Self> {
        if !batch.status.can_transition_to(BatchStatus::Published) {
            return Err(ScheduleError::BatchLocked {
                batch_id: batch.id,
                status: batch.status,
            });
        }

        let mut final_entries = batch.entries.clone();
        let mut planned = Vec::with_capacity(changes.len());
        for change in changes {
            match change {
                EntryChange::Update { id, start, end } => {
                    let entry = final_entries
                        .iter_mut()
                        .find(|e| e.id == id)
                        .ok_or(ScheduleError::EntryNotInBatch {
                            batch_id: batch.id,
                            entry_id: id,
                        })?;
                    let range = TimeRange::new(entry.range().date(), start, end)?;
                    entry.replace_range(range);
                    planned.push(PlannedChange::Update { id, range });
                }
                EntryChange::Create { user_id, range } => {
                    final_entries.push(ScheduleEntry::create(user_id, range).in_batch(batch.id));
                    planned.push(PlannedChange::Create { user_id, range });
                }
            }
        }

        if final_entries.len() > MAX_BATCH_ENTRIES {
            return Err(ValidationError::BatchTooLarge {
                count: final_entries.len(),
                max: MAX_BATCH_ENTRIES,
            }
            .into());
        }

        ConflictValidator::check_internal(&final_entries)?;

        let span = DateSpan::of_entries(&final_entries).unwrap_or(batch.span);
        Ok(Self {
            batch_id: batch.id,
            changes: planned,
            span,
            final_entries,
        })
    }

    pub fn user_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.final_entries.iter().map(|e| e.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
