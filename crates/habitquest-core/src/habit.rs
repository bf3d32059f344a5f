//! Habit domain model and recurrence rules.
//!
//! A habit belongs to one user, carries a recurrence rule describing which
//! calendar days it is due, and accumulates one completion entry per
//! calendar day. The cached `streak` field is denormalized from
//! `completed_dates` + `repeat` and is recomputed on every mutation.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ValidationError};

/// Title length bounds, in characters.
pub const TITLE_MIN_CHARS: usize = 2;
pub const TITLE_MAX_CHARS: usize = 50;

/// Which calendar days a habit is due.
///
/// The wire format keeps the original field spellings (`daysOfWeek`,
/// `countPerWeek`) so persisted records stay readable by existing clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecurrenceRule {
    /// Due on an explicit set of weekdays, 0 = Sunday .. 6 = Saturday.
    ///
    /// An empty set means due every day.
    #[serde(rename = "daysOfWeek")]
    DaysOfWeek {
        #[serde(rename = "daysOfWeek", default)]
        days: BTreeSet<u8>,
    },
    /// Due "any N days per week", 1..=7.
    ///
    /// No per-day schedule exists for this kind; streak and mission logic
    /// treat every day as due.
    #[serde(rename = "countPerWeek")]
    CountPerWeek {
        #[serde(rename = "countPerWeek")]
        count: u8,
    },
}

impl RecurrenceRule {
    /// Rule that schedules the habit on every calendar day.
    pub fn every_day() -> Self {
        RecurrenceRule::DaysOfWeek {
            days: BTreeSet::new(),
        }
    }

    /// Whether `date` is a scheduled day under this rule.
    pub fn is_scheduled(&self, date: NaiveDate) -> bool {
        match self {
            RecurrenceRule::DaysOfWeek { days } => {
                days.is_empty() || days.contains(&(date.weekday().num_days_from_sunday() as u8))
            }
            RecurrenceRule::CountPerWeek { .. } => true,
        }
    }

    /// Validate field ranges (weekdays 0..=6, count 1..=7).
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            RecurrenceRule::DaysOfWeek { days } => {
                if let Some(&day) = days.iter().find(|&&d| d > 6) {
                    return Err(ValidationError::OutOfRange {
                        field: "repeat.daysOfWeek".to_string(),
                        value: i64::from(day),
                        min: 0,
                        max: 6,
                    });
                }
                Ok(())
            }
            RecurrenceRule::CountPerWeek { count } => {
                if !(1..=7).contains(count) {
                    return Err(ValidationError::OutOfRange {
                        field: "repeat.countPerWeek".to_string(),
                        value: i64::from(*count),
                        min: 1,
                        max: 7,
                    });
                }
                Ok(())
            }
        }
    }
}

/// A recurring activity a user tracks completion of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub repeat: RecurrenceRule,
    /// Cached streak length; always equals
    /// `compute_streak(completed_dates, repeat, today)`.
    pub streak: u32,
    /// Calendar days with a completion, one entry per day.
    pub completed_dates: BTreeSet<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit for `user_id` after validating title and rule.
    pub fn new(user_id: &str, title: &str, repeat: RecurrenceRule) -> Result<Self> {
        let title = validate_title(title)?;
        repeat.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title,
            repeat,
            streak: 0,
            completed_dates: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether this habit has a completion dated `date`.
    pub fn completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }
}

/// Trim and validate a habit title, returning the normalized form.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(ValidationError::OutOfRange {
            field: "title".to_string(),
            value: len as i64,
            min: TITLE_MIN_CHARS as i64,
            max: TITLE_MAX_CHARS as i64,
        });
    }
    Ok(trimmed.to_string())
}
