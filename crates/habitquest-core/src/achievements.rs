//! Achievement catalog and evaluation.
//!
//! The catalog is a closed enum with stable string keys; earned entries
//! are persisted under those keys, so the spellings must never change.
//! Evaluation appends entries for predicates that newly hold; earned
//! entries are never re-checked or revoked.

use chrono::{DateTime, Utc};

use crate::habit::Habit;
use crate::user::{Achievement, User};

/// Every achievement the system can award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementKind {
    Level2,
    Level5,
    Level10,
    Habits1,
    Habits4,
    Habits10,
    Streak3,
    Streak7,
    Gems100,
    Xp500,
}

/// Evaluation order; also the display order of earned badges.
pub const CATALOG: [AchievementKind; 10] = [
    AchievementKind::Level2,
    AchievementKind::Level5,
    AchievementKind::Level10,
    AchievementKind::Habits1,
    AchievementKind::Habits4,
    AchievementKind::Habits10,
    AchievementKind::Streak3,
    AchievementKind::Streak7,
    AchievementKind::Gems100,
    AchievementKind::Xp500,
];

impl AchievementKind {
    /// Stable external key, used for persistence and dedup.
    pub fn key(&self) -> &'static str {
        match self {
            AchievementKind::Level2 => "level-2",
            AchievementKind::Level5 => "level-5",
            AchievementKind::Level10 => "level-10",
            AchievementKind::Habits1 => "habits-1",
            AchievementKind::Habits4 => "habits-4",
            AchievementKind::Habits10 => "habits-10",
            AchievementKind::Streak3 => "streak-3",
            AchievementKind::Streak7 => "streak-7",
            AchievementKind::Gems100 => "gems-100",
            AchievementKind::Xp500 => "xp-500",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AchievementKind::Level2 => "Level 2 Reached",
            AchievementKind::Level5 => "Level 5 Reached",
            AchievementKind::Level10 => "Level 10 Reached",
            AchievementKind::Habits1 => "First Habit",
            AchievementKind::Habits4 => "4 Habits Completed",
            AchievementKind::Habits10 => "10 Habits Completed",
            AchievementKind::Streak3 => "3 Day Streak",
            AchievementKind::Streak7 => "7 Day Streak",
            AchievementKind::Gems100 => "Gem Collector",
            AchievementKind::Xp500 => "XP Hunter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementKind::Level2 => "Reach level 2",
            AchievementKind::Level5 => "Reach level 5",
            AchievementKind::Level10 => "Reach level 10",
            AchievementKind::Habits1 => "Create your first habit",
            AchievementKind::Habits4 => "Create 4 habits",
            AchievementKind::Habits10 => "Create 10 habits",
            AchievementKind::Streak3 => "Maintain a 3-day streak",
            AchievementKind::Streak7 => "Maintain a 7-day streak",
            AchievementKind::Gems100 => "Collect 100 gems",
            AchievementKind::Xp500 => "Earn 500 XP",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            AchievementKind::Level2 => "🥈",
            AchievementKind::Level5 => "🥉",
            AchievementKind::Level10 => "🏅",
            AchievementKind::Habits1 => "🌱",
            AchievementKind::Habits4 => "🏆",
            AchievementKind::Habits10 => "🌟",
            AchievementKind::Streak3 => "🔥",
            AchievementKind::Streak7 => "💎",
            AchievementKind::Gems100 => "💰",
            AchievementKind::Xp500 => "⚡",
        }
    }

    fn earned(&self, user: &User, habits: &[Habit]) -> bool {
        match self {
            AchievementKind::Level2 => user.level >= 2,
            AchievementKind::Level5 => user.level >= 5,
            AchievementKind::Level10 => user.level >= 10,
            AchievementKind::Habits1 => habits.len() >= 1,
            AchievementKind::Habits4 => habits.len() >= 4,
            AchievementKind::Habits10 => habits.len() >= 10,
            AchievementKind::Streak3 => habits.iter().any(|h| h.streak >= 3),
            AchievementKind::Streak7 => habits.iter().any(|h| h.streak >= 7),
            AchievementKind::Gems100 => user.gems >= 100,
            AchievementKind::Xp500 => user.xp >= 500,
        }
    }

    fn entry(&self, now: DateTime<Utc>) -> Achievement {
        Achievement {
            key: self.key().to_string(),
            title: self.title().to_string(),
            description: self.description().to_string(),
            icon: self.icon().to_string(),
            earned_at: now,
            completed: true,
        }
    }
}

/// Entries newly earned against current state; already-held keys are
/// skipped, so re-running with unchanged state yields nothing.
pub fn evaluate(user: &User, habits: &[Habit], now: DateTime<Utc>) -> Vec<Achievement> {
    CATALOG
        .iter()
        .filter(|kind| !user.has_achievement(kind.key()) && kind.earned(user, habits))
        .map(|kind| kind.entry(now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::RecurrenceRule;

    fn habits(user: &User, n: usize) -> Vec<Habit> {
        (0..n)
            .map(|i| Habit::new(&user.id, &format!("Habit {i}"), RecurrenceRule::every_day()).unwrap())
            .collect()
    }

    #[test]
    fn fresh_user_with_one_habit_earns_first_habit_only() {
        let user = User::new("a@b.c", "Ada", None);
        let owned = habits(&user, 1);
        let earned = evaluate(&user, &owned, Utc::now());
        let keys: Vec<_> = earned.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["habits-1"]);
    }

    #[test]
    fn level_and_gem_thresholds() {
        let mut user = User::new("a@b.c", "Ada", None);
        user.level = 5;
        user.gems = 100;
        let earned = evaluate(&user, &[], Utc::now());
        let keys: Vec<_> = earned.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["level-2", "level-5", "gems-100"]);
    }

    #[test]
    fn streak_threshold_checks_any_habit() {
        let user = User::new("a@b.c", "Ada", None);
        let mut owned = habits(&user, 2);
        owned[1].streak = 7;
        let earned = evaluate(&user, &owned, Utc::now());
        let keys: Vec<_> = earned.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["habits-1", "streak-3", "streak-7"]);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let mut user = User::new("a@b.c", "Ada", None);
        user.level = 2;
        let owned = habits(&user, 1);

        let first = evaluate(&user, &owned, Utc::now());
        assert!(!first.is_empty());
        user.achievements.extend(first);

        let second = evaluate(&user, &owned, Utc::now());
        assert!(second.is_empty());
    }

    #[test]
    fn catalog_keys_are_unique() {
        let mut keys: Vec<_> = CATALOG.iter().map(|k| k.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), CATALOG.len());
    }
}
