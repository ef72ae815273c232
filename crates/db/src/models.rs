use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use shiftdesk_core::models::batch::{BatchStatus, BatchSummary, DateSpan, ScheduleBatch};
use shiftdesk_core::models::entry::ScheduleEntry;
use shiftdesk_core::models::user::UserContact;
use shiftdesk_core::time_range::TimeRange;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBatch {
    pub id: i64,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbBatch {
    pub fn status(&self) -> Result<BatchStatus> {
        self.status
            .parse()
            .map_err(|_| eyre!("Unknown status {:?} on batch {}", self.status, self.id))
    }

    pub fn span(&self) -> DateSpan {
        DateSpan {
            start_date: self.start_date,
            end_date: self.end_date,
            total_days: i64::from(self.total_days),
        }
    }

    pub fn into_batch(self, entries: Vec<DbEntry>) -> Result<ScheduleBatch> {
        let entries = entries
            .into_iter()
            .map(DbEntry::into_entry)
            .collect::<Result<Vec<_>>>()?;

        let mut batch = ScheduleBatch {
            id: self.id,
            status: self.status()?,
            span: self.span(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            entries,
        };
        batch.sort_entries();
        Ok(batch)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBatchSummary {
    pub id: i64,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub entry_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbBatchSummary> for BatchSummary {
    type Error = eyre::Report;

    fn try_from(row: DbBatchSummary) -> Result<Self> {
        let status = row
            .status
            .parse()
            .map_err(|_| eyre!("Unknown status {:?} on batch {}", row.status, row.id))?;

        Ok(BatchSummary {
            id: row.id,
            status,
            span: DateSpan {
                start_date: row.start_date,
                end_date: row.end_date,
                total_days: i64::from(row.total_days),
            },
            entry_count: row.entry_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEntry {
    pub id: i64,
    pub batch_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_hours: f64,
}

impl DbEntry {
    pub fn into_entry(self) -> Result<ScheduleEntry> {
        let range = TimeRange::new(self.date, self.start_time, self.end_time)
            .wrap_err_with(|| format!("Stored entry {} has an invalid time range", self.id))?;
        Ok(ScheduleEntry::from_parts(
            self.id,
            self.batch_id,
            self.user_id,
            range,
            self.total_hours,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<DbUser> for UserContact {
    fn from(user: DbUser) -> Self {
        UserContact {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}
