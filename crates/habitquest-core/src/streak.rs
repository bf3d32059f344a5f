//! Streak computation over completion dates and a recurrence rule.
//!
//! The streak is the count of consecutive scheduled days completed, walking
//! backward from the reference day. A scheduled day without a completion
//! breaks the streak; an unscheduled day never does, though a bonus
//! completion on one still counts.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::habit::RecurrenceRule;

/// Maximum number of days scanned backward from the reference day.
pub const LOOKBACK_DAYS: u32 = 365;

/// Compute the current streak length as of `today`.
///
/// If `today` is scheduled but has no completion yet, the scan starts at
/// yesterday: the day is still in progress and must not break a streak
/// built on prior days.
pub fn compute_streak(
    completed: &BTreeSet<NaiveDate>,
    rule: &RecurrenceRule,
    today: NaiveDate,
) -> u32 {
    let mut day = if rule.is_scheduled(today) && !completed.contains(&today) {
        today - Duration::days(1)
    } else {
        today
    };

    let mut streak = 0;
    for _ in 0..LOOKBACK_DAYS {
        if rule.is_scheduled(day) {
            if completed.contains(&day) {
                streak += 1;
            } else {
                break;
            }
        } else if completed.contains(&day) {
            // Bonus check-in on an off day.
            streak += 1;
        }
        day -= Duration::days(1);
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days(dates: &[NaiveDate]) -> BTreeSet<NaiveDate> {
        dates.iter().copied().collect()
    }

    #[test]
    fn empty_completions_is_zero() {
        let today = date(2024, 1, 15);
        assert_eq!(compute_streak(&BTreeSet::new(), &RecurrenceRule::every_day(), today), 0);
        assert_eq!(
            compute_streak(
                &BTreeSet::new(),
                &RecurrenceRule::DaysOfWeek {
                    days: [1].into_iter().collect()
                },
                today
            ),
            0
        );
        assert_eq!(
            compute_streak(
                &BTreeSet::new(),
                &RecurrenceRule::CountPerWeek { count: 3 },
                today
            ),
            0
        );
    }

    #[test]
    fn consecutive_days_ending_today() {
        let today = date(2024, 1, 15);
        let completed = days(&[date(2024, 1, 13), date(2024, 1, 14), today]);
        assert_eq!(
            compute_streak(&completed, &RecurrenceRule::every_day(), today),
            3
        );
    }

    #[test]
    fn today_unchecked_does_not_break_streak() {
        // Three consecutive check-ins ending yesterday; today still open.
        let today = date(2024, 1, 15);
        let completed = days(&[date(2024, 1, 12), date(2024, 1, 13), date(2024, 1, 14)]);
        assert_eq!(
            compute_streak(&completed, &RecurrenceRule::every_day(), today),
            3
        );
    }

    #[test]
    fn gap_breaks_streak() {
        let today = date(2024, 1, 15);
        // Missed the 14th.
        let completed = days(&[date(2024, 1, 12), date(2024, 1, 13), today]);
        assert_eq!(
            compute_streak(&completed, &RecurrenceRule::every_day(), today),
            1
        );
    }

    #[test]
    fn unscheduled_days_are_skipped() {
        // Mon/Wed/Fri rule; completions on Mon 15th, Fri 12th, Wed 10th.
        let rule = RecurrenceRule::DaysOfWeek {
            days: [1, 3, 5].into_iter().collect(),
        };
        let today = date(2024, 1, 15); // Monday
        let completed = days(&[date(2024, 1, 10), date(2024, 1, 12), today]);
        assert_eq!(compute_streak(&completed, &rule, today), 3);
    }

    #[test]
    fn missed_scheduled_day_stops_scan() {
        let rule = RecurrenceRule::DaysOfWeek {
            days: [1, 3, 5].into_iter().collect(),
        };
        let today = date(2024, 1, 15); // Monday; Friday the 12th was missed
        let completed = days(&[date(2024, 1, 10), today]);
        assert_eq!(compute_streak(&completed, &rule, today), 1);
    }

    #[test]
    fn bonus_checkin_on_off_day_counts() {
        let rule = RecurrenceRule::DaysOfWeek {
            days: [1].into_iter().collect(), // Mondays only
        };
        let today = date(2024, 1, 15); // Monday
        // Checked in Sunday the 14th (off day) and both Mondays.
        let completed = days(&[date(2024, 1, 8), date(2024, 1, 14), today]);
        assert_eq!(compute_streak(&completed, &rule, today), 3);
    }

    #[test]
    fn scheduled_today_unchecked_scans_from_yesterday_only_once() {
        let rule = RecurrenceRule::DaysOfWeek {
            days: [1].into_iter().collect(), // Mondays only
        };
        let today = date(2024, 1, 15); // Monday, unchecked
        let completed = days(&[date(2024, 1, 8)]);
        assert_eq!(compute_streak(&completed, &rule, today), 1);
    }

    #[test]
    fn scan_is_bounded_by_lookback() {
        let today = date(2024, 1, 15);
        // A single completion far beyond the lookback horizon.
        let completed = days(&[today - Duration::days(i64::from(LOOKBACK_DAYS) + 10)]);
        assert_eq!(
            compute_streak(&completed, &RecurrenceRule::every_day(), today),
            0
        );
    }

    proptest! {
        #[test]
        fn streak_never_exceeds_completion_count(
            offsets in proptest::collection::btree_set(0i64..400, 0..40)
        ) {
            let today = date(2024, 6, 1);
            let completed: BTreeSet<NaiveDate> =
                offsets.iter().map(|&o| today - Duration::days(o)).collect();
            let streak = compute_streak(&completed, &RecurrenceRule::every_day(), today);
            prop_assert!(streak as usize <= completed.len());
        }

        #[test]
        fn contiguous_prefix_is_counted_exactly(n in 0u32..60) {
            let today = date(2024, 6, 1);
            let completed: BTreeSet<NaiveDate> =
                (0..n).map(|o| today - Duration::days(i64::from(o))).collect();
            let streak = compute_streak(&completed, &RecurrenceRule::every_day(), today);
            prop_assert_eq!(streak, n);
        }
    }
}
