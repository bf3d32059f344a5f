//! Check-in and un-check-in transitions for a single habit.
//!
//! Ordering within one call: date mutation, then streak recompute, then XP
//! application. Persistence is the caller's job.

use chrono::{NaiveDate, Utc};

use crate::habit::Habit;
use crate::progression::{self, XP_PER_CHECKIN};
use crate::streak::compute_streak;
use crate::user::User;

/// Record a completion for `date`.
///
/// Idempotent per calendar day: a second check-in on the same date changes
/// nothing and grants no XP. Returns whether state changed.
pub fn check_in(habit: &mut Habit, user: &mut User, date: NaiveDate, today: NaiveDate) -> bool {
    if !habit.completed_dates.insert(date) {
        return false;
    }
    habit.streak = compute_streak(&habit.completed_dates, &habit.repeat, today);
    habit.updated_at = Utc::now();
    progression::apply_xp_gain(user, XP_PER_CHECKIN);
    true
}

/// Remove the completion for `date` and recompute the streak.
///
/// XP from the original check-in is kept; grants are never reversed.
/// Returns whether state changed.
pub fn uncheck_in(habit: &mut Habit, date: NaiveDate, today: NaiveDate) -> bool {
    if !habit.completed_dates.remove(&date) {
        return false;
    }
    habit.streak = compute_streak(&habit.completed_dates, &habit.repeat, today);
    habit.updated_at = Utc::now();
    true
}
