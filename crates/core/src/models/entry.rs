use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

use crate::conflict::{Candidate, Conflict, ConflictValidator};
use crate::time_range::TimeRange;

// Unsaved entries count down from -1 so they can never collide with store ids.
static NEXT_UNSAVED_ID: AtomicI64 = AtomicI64::new(-1);

/// One user's shift inside a batch.
///
/// `total_hours` is a cached copy of `range.duration_hours()` and is only
/// ever written together with `range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: i64,
    pub batch_id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    range: TimeRange,
    total_hours: f64,
}

impl ScheduleEntry {
    /// An unsaved entry with a temporary negative id and no owning batch yet.
    pub fn create(user_id: i64, range: TimeRange) -> Self {
        Self {
            id: NEXT_UNSAVED_ID.fetch_sub(1, Ordering::Relaxed),
            batch_id: 0,
            user_id,
            total_hours: range.duration_hours(),
            range,
        }
    }

    /// Rebuilds a persisted entry from stored columns.
    pub fn from_parts(id: i64, batch_id: i64, user_id: i64, range: TimeRange, total_hours: f64) -> Self {
        Self {
            id,
            batch_id,
            user_id,
            range,
            total_hours,
        }
    }

    pub fn in_batch(mut self, batch_id: i64) -> Self {
        self.batch_id = batch_id;
        self
    }

    pub fn range(&self) -> &TimeRange {
        &self.range
    }

    pub fn total_hours(&self) -> f64 {
        self.total_hours
    }

    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }

    pub fn candidate(&self) -> Candidate {
        Candidate {
            user_id: self.user_id,
            range: self.range,
        }
    }

    /// Replaces the range without a conflict check; callers validate the
    /// resulting entry set as a whole.
    pub(crate) fn replace_range(&mut self, range: TimeRange) {
        self.range = range;
        self.total_hours = range.duration_hours();
    }

    /// Moves the shift to `new_range` unless it collides with one of `siblings`.
    ///
    /// The entry itself is excluded by id. On conflict nothing changes.
    pub fn reschedule<'a, I>(&mut self, new_range: TimeRange, siblings: I) -> Result<(), Conflict>
    where
        I: IntoIterator<Item = &'a ScheduleEntry>,
    {
        let candidate = Candidate {
            user_id: self.user_id,
            range: new_range,
        };
        ConflictValidator::validate(&candidate, siblings, Some(self.id))?;
        self.replace_range(new_range);
        Ok(())
    }
}
