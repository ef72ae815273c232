use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ScheduleError, ScheduleResult, ValidationError};
use crate::models::entry::ScheduleEntry;
use crate::models::requests::EntryInput;

/// Hard cap on entries per batch. Bounds a single administrative action.
pub const MAX_BATCH_ENTRIES: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Drafted,
    Published,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Drafted => "DRAFTED",
            BatchStatus::Published => "PUBLISHED",
        }
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self, BatchStatus::Drafted)
    }

    /// The only transition is DRAFTED -> PUBLISHED.
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        matches!((self, next), (BatchStatus::Drafted, BatchStatus::Published))
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFTED" => Ok(BatchStatus::Drafted),
            "PUBLISHED" => Ok(BatchStatus::Published),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// First and last shift date of a batch plus the inclusive day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSpan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i64,
}

impl DateSpan {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            total_days: (end_date - start_date).num_days() + 1,
        }
    }

    /// Span over every date given, or `None` when there are none.
    pub fn covering<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut dates = dates.into_iter();
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d)));
        Some(Self::new(min, max))
    }

    pub fn of_entries<'a, I>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a ScheduleEntry>,
    {
        Self::covering(entries.into_iter().map(|e| e.range().date()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBatch {
    pub id: i64,
    pub status: BatchStatus,
    #[serde(flatten)]
    pub span: DateSpan,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub entries: Vec<ScheduleEntry>,
}

impl ScheduleBatch {
    /// Fails with `BatchLocked` unless the batch is still DRAFTED.
    pub fn ensure_drafted(&self) -> ScheduleResult<()> {
        if self.status.is_mutable() {
            Ok(())
        } else {
            Err(ScheduleError::BatchLocked {
                batch_id: self.id,
                status: self.status,
            })
        }
    }

    pub fn entry(&self, entry_id: i64) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    /// Orders entries by date, then start time, then id.
    pub fn sort_entries(&mut self) {
        self.entries.sort_by_key(|e| (e.range().date(), e.range().start(), e.id));
    }
}

/// Row shape for batch listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub id: i64,
    pub status: BatchStatus,
    #[serde(flatten)]
    pub span: DateSpan,
    pub entry_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated batch that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBatch {
    pub span: DateSpan,
    pub entries: Vec<ScheduleEntry>,
}

impl NewBatch {
    /// Validates every input, all-or-nothing. The first bad entry aborts.
    pub fn plan(inputs: &[EntryInput]) -> Result<Self, ValidationError> {
        if inputs.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        if inputs.len() > MAX_BATCH_ENTRIES {
            return Err(ValidationError::BatchTooLarge {
                count: inputs.len(),
                max: MAX_BATCH_ENTRIES,
            });
        }

        let mut entries = inputs
            .iter()
            .map(|input| {
                let (user_id, range) = input.validate()?;
                Ok(ScheduleEntry::create(user_id, range))
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        entries.sort_by_key(|e| (e.range().date(), e.range().start()));

        let span = DateSpan::of_entries(&entries).ok_or(ValidationError::EmptyBatch)?;
        Ok(Self { span, entries })
    }

    pub fn user_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.entries.iter().map(|e| e.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
