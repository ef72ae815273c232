//! Caller-side drafting.
//!
//! Drafts live entirely in the caller's state until the whole set is
//! submitted as one create-batch request. They carry their own uuid and are
//! never compared against stored entries.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::models::requests::{CreateBatchRequest, EntryInput};
use crate::time_range::{parse_clock, TimeRange};

/// Default horizon for weekday repetition.
pub const DEFAULT_RECURRENCE_WEEKS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftEntry {
    pub draft_id: Uuid,
    pub user_id: i64,
    pub range: TimeRange,
}

/// Naive weekday repetition starting at the base date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    pub weekdays: Vec<Weekday>,
    pub weeks: u32,
}

impl Recurrence {
    pub fn weekly(weekdays: Vec<Weekday>) -> Self {
        Self {
            weekdays,
            weeks: DEFAULT_RECURRENCE_WEEKS,
        }
    }

    /// Every date in `[base, base + weeks * 7)` falling on a selected weekday.
    pub fn dates_from(&self, base: NaiveDate) -> Vec<NaiveDate> {
        (0..i64::from(self.weeks) * 7)
            .map(|offset| base + Duration::days(offset))
            .filter(|d| self.weekdays.contains(&d.weekday()))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DraftPlanner {
    drafts: Vec<DraftEntry>,
}

impl DraftPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn drafts(&self) -> &[DraftEntry] {
        &self.drafts
    }

    /// Drafts a shift for each user on `base` (or on every recurring date).
    ///
    /// A user already drafted on a date is skipped for that date, which also
    /// keeps a user's drafts from overlapping. Returns what was added.
    pub fn add(
        &mut self,
        base: NaiveDate,
        user_ids: &[i64],
        start: &str,
        end: &str,
        recurrence: Option<&Recurrence>,
    ) -> Result<Vec<DraftEntry>, ValidationError> {
        let start = parse_clock(start)?;
        let end = parse_clock(end)?;
        TimeRange::check_order(start, end)?;

        let dates = match recurrence {
            Some(rule) => rule.dates_from(base),
            None => vec![base],
        };

        let mut added = Vec::new();
        for date in dates {
            let range = TimeRange::new(date, start, end)?;
            for &user_id in user_ids {
                if self.has_draft_on(user_id, date) {
                    continue;
                }
                let draft = DraftEntry {
                    draft_id: Uuid::new_v4(),
                    user_id,
                    range,
                };
                self.drafts.push(draft.clone());
                added.push(draft);
            }
        }

        Ok(added)
    }

    pub fn remove(&mut self, draft_id: Uuid) -> Option<DraftEntry> {
        let idx = self.drafts.iter().position(|d| d.draft_id == draft_id)?;
        Some(self.drafts.remove(idx))
    }

    /// Moves a draft to new clock times on the same date.
    pub fn retime(&mut self, draft_id: Uuid, start: &str, end: &str) -> Result<Option<&DraftEntry>, ValidationError> {
        let Some(draft) = self.drafts.iter_mut().find(|d| d.draft_id == draft_id) else {
            return Ok(None);
        };
        draft.range = draft.range.with_times(start, end)?;
        Ok(Some(&*draft))
    }

    /// Turns the drafts into a create-batch request ordered by date and start.
    pub fn into_request(mut self) -> CreateBatchRequest {
        self.drafts
            .sort_by_key(|d| (d.range.date(), d.range.start(), d.user_id));

        let entries = self
            .drafts
            .iter()
            .map(|d| EntryInput {
                date: Some(d.range.date().format("%Y-%m-%d").to_string()),
                start_time: Some(d.range.start().format("%H:%M").to_string()),
                end_time: Some(d.range.end().format("%H:%M").to_string()),
                user_id: Some(d.user_id),
            })
            .collect();

        CreateBatchRequest { entries }
    }

    fn has_draft_on(&self, user_id: i64, date: NaiveDate) -> bool {
        self.drafts
            .iter()
            .any(|d| d.user_id == user_id && d.range.date() == date)
    }
}
