//! Daily and weekly missions.
//!
//! Missions are computed fresh from current state on every call, never
//! persisted as their own entities; only the set of collected ids lives on
//! the user. Kinds are a closed enum that round-trips through the original
//! string ids (`habit-1`, `any-2`, `streak-<habit id>`) so redeemed ids
//! stay stable across releases.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::habit::Habit;
use crate::progression;
use crate::user::User;

/// Streak length a weekly mission asks for.
pub const STREAK_GOAL: u32 = 3;

/// XP and gems paid out when a mission is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub xp: u32,
    pub gems: u32,
}

/// The closed set of mission kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissionKind {
    /// Complete the user's first habit today.
    FirstHabitToday,
    /// Complete any two habits today.
    AnyTwoToday,
    /// Maintain a [`STREAK_GOAL`]-day streak on one habit.
    Streak { habit_id: String },
}

impl MissionKind {
    /// Stable external id; redeemed ids are persisted, so these spellings
    /// must never change.
    pub fn id(&self) -> String {
        match self {
            MissionKind::FirstHabitToday => "habit-1".to_string(),
            MissionKind::AnyTwoToday => "any-2".to_string(),
            MissionKind::Streak { habit_id } => format!("streak-{habit_id}"),
        }
    }

    pub fn reward(&self) -> Reward {
        match self {
            MissionKind::FirstHabitToday => Reward { xp: 20, gems: 5 },
            MissionKind::AnyTwoToday => Reward { xp: 30, gems: 8 },
            MissionKind::Streak { .. } => Reward { xp: 40, gems: 10 },
        }
    }
}

/// One computed mission, ready for display or collection.
#[derive(Debug, Clone, Serialize)]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub collected: bool,
    pub reward: Reward,
    /// Current streak, present on weekly streak missions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_goal: Option<u32>,
}

/// The full mission set for one user at one instant.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MissionBoard {
    pub daily: Vec<Mission>,
    pub weekly: Vec<Mission>,
}

impl MissionBoard {
    fn find(&self, mission_id: &str) -> Option<&Mission> {
        self.daily
            .iter()
            .chain(self.weekly.iter())
            .find(|m| m.id == mission_id)
    }
}

/// New progression totals after a successful collection.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CollectOutcome {
    pub xp: u32,
    pub level: u32,
    pub gems: u32,
}

/// Compute the mission board for `user` as of `today`.
///
/// `habits` must be the user's habits in creation order; the first entry
/// anchors the `habit-1` mission.
pub fn board(user: &User, habits: &[Habit], today: NaiveDate) -> MissionBoard {
    let completed_today = |h: &Habit| h.completed_on(today);

    let first = MissionKind::FirstHabitToday;
    let first_title = habits
        .first()
        .map(|h| h.title.as_str())
        .unwrap_or("any habit");
    let daily = vec![
        Mission {
            id: first.id(),
            title: format!("Complete {first_title}"),
            completed: habits.first().map(completed_today).unwrap_or(false),
            collected: user.collected_missions.contains(&first.id()),
            reward: first.reward(),
            streak: None,
            streak_goal: None,
        },
        Mission {
            id: MissionKind::AnyTwoToday.id(),
            title: "Complete any 2 habits today".to_string(),
            completed: habits.iter().filter(|h| completed_today(h)).count() >= 2,
            collected: user
                .collected_missions
                .contains(&MissionKind::AnyTwoToday.id()),
            reward: MissionKind::AnyTwoToday.reward(),
            streak: None,
            streak_goal: None,
        },
    ];

    let weekly = habits
        .iter()
        .map(|h| {
            let kind = MissionKind::Streak {
                habit_id: h.id.clone(),
            };
            Mission {
                id: kind.id(),
                title: format!("Maintain a {STREAK_GOAL}-day streak on {}", h.title),
                completed: h.streak >= STREAK_GOAL,
                collected: user.collected_missions.contains(&kind.id()),
                reward: kind.reward(),
                streak: Some(h.streak),
                streak_goal: Some(STREAK_GOAL),
            }
        })
        .collect();

    MissionBoard { daily, weekly }
}

/// Redeem a completed, uncollected mission and apply its reward.
///
/// The reward's XP goes through the level rollover; gems are added
/// directly. The mission id is then recorded so it cannot be redeemed
/// twice.
pub fn collect(
    user: &mut User,
    habits: &[Habit],
    mission_id: &str,
    today: NaiveDate,
) -> Result<CollectOutcome> {
    let board = board(user, habits, today);
    let mission = board.find(mission_id).ok_or_else(|| CoreError::InvalidMission {
        id: mission_id.to_string(),
    })?;
    if !mission.completed || mission.collected {
        return Err(CoreError::InvalidMission {
            id: mission_id.to_string(),
        });
    }

    progression::apply_xp_gain(user, mission.reward.xp);
    user.gems += mission.reward.gems;
    user.collected_missions.insert(mission_id.to_string());

    Ok(CollectOutcome {
        xp: user.xp,
        level: user.level,
        gems: user.gems,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin;
    use crate::habit::RecurrenceRule;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(user: &User, title: &str) -> Habit {
        Habit::new(&user.id, title, RecurrenceRule::every_day()).unwrap()
    }

    #[test]
    fn board_with_no_habits() {
        let user = User::new("a@b.c", "Ada", None);
        let board = board(&user, &[], date(2024, 1, 15));
        assert_eq!(board.daily.len(), 2);
        assert!(board.weekly.is_empty());
        assert_eq!(board.daily[0].title, "Complete any habit");
        assert!(!board.daily[0].completed);
    }

    #[test]
    fn first_habit_mission_tracks_first_habit_only() {
        let mut user = User::new("a@b.c", "Ada", None);
        let today = date(2024, 1, 15);
        let first = habit(&user, "Stretch");
        let mut second = habit(&user, "Read");
        checkin::check_in(&mut second, &mut user, today, today);

        let board = board(&user, &[first, second], today);
        assert_eq!(board.daily[0].title, "Complete Stretch");
        assert!(!board.daily[0].completed);
        assert!(!board.daily[1].completed); // only one habit done today
    }

    #[test]
    fn any_two_completes_at_two() {
        let mut user = User::new("a@b.c", "Ada", None);
        let today = date(2024, 1, 15);
        let mut a = habit(&user, "Stretch");
        let mut b = habit(&user, "Read");
        checkin::check_in(&mut a, &mut user, today, today);
        checkin::check_in(&mut b, &mut user, today, today);

        let board = board(&user, &[a, b], today);
        assert!(board.daily[1].completed);
    }

    #[test]
    fn weekly_mission_follows_streak() {
        let mut user = User::new("a@b.c", "Ada", None);
        let today = date(2024, 1, 15);
        let mut h = habit(&user, "Stretch");
        for offset in 0..3i64 {
            checkin::check_in(&mut h, &mut user, today - chrono::Duration::days(offset), today);
        }
        let id = MissionKind::Streak {
            habit_id: h.id.clone(),
        }
        .id();

        let board = board(&user, std::slice::from_ref(&h), today);
        let weekly = &board.weekly[0];
        assert_eq!(weekly.id, id);
        assert!(weekly.completed);
        assert_eq!(weekly.streak, Some(3));
    }

    #[test]
    fn collect_pays_out_and_marks_collected() {
        let mut user = User::new("a@b.c", "Ada", None);
        let today = date(2024, 1, 15);
        let mut h = habit(&user, "Stretch");
        checkin::check_in(&mut h, &mut user, today, today);
        let habits = vec![h];

        let outcome = collect(&mut user, &habits, "habit-1", today).unwrap();
        // 10 XP from the check-in plus the 20 XP reward.
        assert_eq!(outcome.xp, 30);
        assert_eq!(outcome.gems, 5);
        assert!(user.collected_missions.contains("habit-1"));
    }

    #[test]
    fn collect_twice_is_rejected() {
        let mut user = User::new("a@b.c", "Ada", None);
        let today = date(2024, 1, 15);
        let mut h = habit(&user, "Stretch");
        checkin::check_in(&mut h, &mut user, today, today);
        let habits = vec![h];

        collect(&mut user, &habits, "habit-1", today).unwrap();
        let err = collect(&mut user, &habits, "habit-1", today).unwrap_err();
        assert!(matches!(err, CoreError::InvalidMission { .. }));
    }

    #[test]
    fn collect_incomplete_or_unknown_is_rejected() {
        let mut user = User::new("a@b.c", "Ada", None);
        let today = date(2024, 1, 15);
        let habits = vec![habit(&user, "Stretch")];

        assert!(matches!(
            collect(&mut user, &habits, "habit-1", today).unwrap_err(),
            CoreError::InvalidMission { .. }
        ));
        assert!(matches!(
            collect(&mut user, &habits, "no-such-mission", today).unwrap_err(),
            CoreError::InvalidMission { .. }
        ));
        assert!(user.collected_missions.is_empty());
    }
}
