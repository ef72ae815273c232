//! Double-booking detection.
//!
//! Only entries of the same user on the same date are ever compared. A user
//! may hold overlapping clock times on different days, and two users may hold
//! identical shifts.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::entry::ScheduleEntry;
use crate::time_range::{hhmm, TimeRange};

/// The shift being proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub user_id: i64,
    pub range: TimeRange,
}

/// An existing entry that collides with a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollidingEntry {
    pub entry_id: i64,
    pub batch_id: i64,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl From<&ScheduleEntry> for CollidingEntry {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            entry_id: entry.id,
            batch_id: entry.batch_id,
            start_time: entry.range().start(),
            end_time: entry.range().end(),
        }
    }
}

/// Rejection carrying every sibling the candidate overlaps. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub user_id: i64,
    pub date: NaiveDate,
    pub colliding: Vec<CollidingEntry>,
}

pub struct ConflictValidator;

impl ConflictValidator {
    /// Accepts `candidate` unless it overlaps a sibling of the same user and date.
    ///
    /// `exclude_entry_id` drops the entry being edited by identity. Two
    /// distinct entries with identical times still conflict.
    pub fn validate<'a, I>(
        candidate: &Candidate,
        siblings: I,
        exclude_entry_id: Option<i64>,
    ) -> Result<(), Conflict>
    where
        I: IntoIterator<Item = &'a ScheduleEntry>,
    {
        let colliding: Vec<CollidingEntry> = siblings
            .into_iter()
            .filter(|s| s.user_id == candidate.user_id)
            .filter(|s| s.range().date() == candidate.range.date())
            .filter(|s| Some(s.id) != exclude_entry_id)
            .filter(|s| candidate.range.overlaps(s.range()))
            .map(CollidingEntry::from)
            .collect();

        if colliding.is_empty() {
            Ok(())
        } else {
            Err(Conflict {
                user_id: candidate.user_id,
                date: candidate.range.date(),
                colliding,
            })
        }
    }

    /// Checks a set of entries against each other, reporting the first entry
    /// that collides with an earlier one.
    pub fn check_internal(entries: &[ScheduleEntry]) -> Result<(), Conflict> {
        for (idx, entry) in entries.iter().enumerate() {
            Self::validate(&entry.candidate(), &entries[..idx], Some(entry.id))?;
        }
        Ok(())
    }
}
