//! Service facade over storage and the pure calculators.
//!
//! This is the surface a request boundary (the CLI, or any other front
//! end) talks to. Every method authenticates nothing by itself: callers
//! pass a resolved user id, and habit lookups are owner-scoped so a
//! foreign habit id behaves as absent.

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::achievements;
use crate::checkin;
use crate::error::{CoreError, Result, ValidationError};
use crate::habit::{validate_title, Habit, RecurrenceRule};
use crate::missions::{self, CollectOutcome, MissionBoard};
use crate::progression::{self, GEMS_PER_UPGRADE};
use crate::storage::{Config, Database};
use crate::user::{verify_password, Achievement, User, AVATARS};

/// Partial habit update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub repeat: Option<RecurrenceRule>,
}

/// Partial profile update; `None` fields are left untouched.
///
/// `achievements` replaces the stored list wholesale; it exists for
/// clients restoring a profile, not for normal progression.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub avatar: Option<String>,
    pub about: Option<String>,
    pub achievements: Option<Vec<Achievement>>,
}

/// Profile view returned to the boundary.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub level: u32,
    pub xp: u32,
    pub gems: u32,
    pub avatar: String,
    pub name: String,
    pub about: String,
    pub achievements: Vec<Achievement>,
}

/// Facade owning the process-wide database handle.
pub struct HabitService {
    db: Database,
    config: Config,
}

impl HabitService {
    /// Create a service with default configuration.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            config: Config::default(),
        }
    }

    /// Create a service with custom configuration.
    pub fn with_config(db: Database, config: Config) -> Self {
        Self { db, config }
    }

    /// The underlying database, for boundary-level state (session kv).
    pub fn db(&self) -> &Database {
        &self.db
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn require_user(&self, user_id: &str) -> Result<User> {
        self.db.find_user(user_id)?.ok_or_else(|| CoreError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        })
    }

    fn require_habit(&self, user_id: &str, habit_id: &str) -> Result<Habit> {
        self.db
            .find_habit(habit_id, user_id)?
            .ok_or_else(|| CoreError::NotFound {
                entity: "Habit",
                id: habit_id.to_string(),
            })
    }

    // === Accounts ===

    /// Register a new account with a unique email.
    pub fn register(&self, email: &str, name: &str, password: Option<&str>) -> Result<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ValidationError::InvalidValue {
                field: "email".to_string(),
                message: "must be a valid email address".to_string(),
            }
            .into());
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }
        if self.db.find_user_by_email(&email)?.is_some() {
            return Err(ValidationError::InvalidValue {
                field: "email".to_string(),
                message: "already registered".to_string(),
            }
            .into());
        }

        let user = User::new(&email, name, password);
        self.db.insert_user(&user)?;
        info!(user = %user.id, "account registered");
        Ok(user)
    }

    /// Verify credentials and return the account.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let user = self
            .db
            .find_user_by_email(&email)?
            .ok_or(CoreError::Unauthenticated)?;
        match &user.password_hash {
            Some(stored) if verify_password(password, stored) => Ok(user),
            _ => Err(CoreError::Unauthenticated),
        }
    }

    // === Habits ===

    pub fn create_habit(
        &self,
        user_id: &str,
        title: &str,
        repeat: RecurrenceRule,
    ) -> Result<Habit> {
        let user = self.require_user(user_id)?;
        let habit = Habit::new(&user.id, title, repeat)?;
        self.db.insert_habit(&habit)?;
        debug!(habit = %habit.id, user = %user.id, "habit created");
        Ok(habit)
    }

    pub fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>> {
        self.require_user(user_id)?;
        Ok(self.db.habits_for_user(user_id)?)
    }

    /// Apply a partial update; a rule change recomputes the cached streak.
    pub fn update_habit(
        &self,
        user_id: &str,
        habit_id: &str,
        update: HabitUpdate,
    ) -> Result<Habit> {
        let mut habit = self.require_habit(user_id, habit_id)?;
        if let Some(title) = update.title {
            habit.title = validate_title(&title)?;
        }
        if let Some(repeat) = update.repeat {
            repeat.validate()?;
            habit.repeat = repeat;
            habit.streak =
                crate::streak::compute_streak(&habit.completed_dates, &habit.repeat, Self::today());
        }
        habit.updated_at = Utc::now();
        self.db.update_habit(&habit)?;
        Ok(habit)
    }

    pub fn delete_habit(&self, user_id: &str, habit_id: &str) -> Result<()> {
        if !self.db.delete_habit(habit_id, user_id)? {
            return Err(CoreError::NotFound {
                entity: "Habit",
                id: habit_id.to_string(),
            });
        }
        debug!(habit = %habit_id, user = %user_id, "habit deleted");
        Ok(())
    }

    /// Record a completion for `date` (today when absent).
    ///
    /// Grants check-in XP to the owner as a side effect; checking in twice
    /// on the same calendar day is a no-op.
    pub fn check_in(
        &self,
        user_id: &str,
        habit_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Habit> {
        let mut user = self.require_user(user_id)?;
        let mut habit = self.require_habit(user_id, habit_id)?;
        let date = date.unwrap_or_else(Self::today);

        let level_before = user.level;
        if checkin::check_in(&mut habit, &mut user, date, Self::today()) {
            self.db.update_habit(&habit)?;
            self.db.update_user(&user)?;
            debug!(habit = %habit.id, %date, streak = habit.streak, "check-in recorded");
            if user.level > level_before {
                info!(user = %user.id, level = user.level, "level up");
            }
        }
        Ok(habit)
    }

    /// Remove the completion for `date` (today when absent).
    ///
    /// The XP granted by the original check-in is kept.
    pub fn uncheck_in(
        &self,
        user_id: &str,
        habit_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Habit> {
        self.require_user(user_id)?;
        let mut habit = self.require_habit(user_id, habit_id)?;
        let date = date.unwrap_or_else(Self::today);

        if checkin::uncheck_in(&mut habit, date, Self::today()) {
            self.db.update_habit(&habit)?;
            debug!(habit = %habit.id, %date, streak = habit.streak, "check-in removed");
        }
        Ok(habit)
    }

    // === Missions ===

    pub fn missions(&self, user_id: &str) -> Result<MissionBoard> {
        let user = self.require_user(user_id)?;
        let habits = self.db.habits_for_user(user_id)?;
        Ok(missions::board(&user, &habits, Self::today()))
    }

    pub fn collect_mission(&self, user_id: &str, mission_id: &str) -> Result<CollectOutcome> {
        let mut user = self.require_user(user_id)?;
        let habits = self.db.habits_for_user(user_id)?;
        let outcome = missions::collect(&mut user, &habits, mission_id, Self::today())?;
        self.db.update_user(&user)?;
        info!(user = %user.id, mission = mission_id, "mission collected");
        Ok(outcome)
    }

    // === Profile ===

    pub fn profile(&self, user_id: &str) -> Result<Profile> {
        let user = self.require_user(user_id)?;
        Ok(self.profile_view(user))
    }

    pub fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile> {
        let mut user = self.require_user(user_id)?;
        if let Some(avatar) = update.avatar {
            if !AVATARS.contains(&avatar.as_str()) {
                return Err(ValidationError::InvalidValue {
                    field: "avatar".to_string(),
                    message: "not in the avatar catalog".to_string(),
                }
                .into());
            }
            user.avatar = Some(avatar);
        }
        if let Some(about) = update.about {
            user.about = Some(about);
        }
        if let Some(achievements) = update.achievements {
            user.achievements = achievements;
        }
        self.db.update_user(&user)?;
        Ok(self.profile_view(user))
    }

    /// Spend gems for one level, then award any newly earned achievements.
    pub fn upgrade(&self, user_id: &str) -> Result<Profile> {
        let mut user = self.require_user(user_id)?;
        progression::spend_gems(&mut user, GEMS_PER_UPGRADE)?;
        user.level += 1;

        let habits = self.db.habits_for_user(user_id)?;
        let earned = achievements::evaluate(&user, &habits, Utc::now());
        for achievement in &earned {
            info!(user = %user.id, key = %achievement.key, "achievement earned");
        }
        user.achievements.extend(earned);

        self.db.update_user(&user)?;
        info!(user = %user.id, level = user.level, "upgrade purchased");
        Ok(self.profile_view(user))
    }

    fn profile_view(&self, user: User) -> Profile {
        Profile {
            level: user.level,
            xp: user.xp,
            gems: user.gems,
            avatar: user
                .avatar
                .unwrap_or_else(|| self.config.profile.default_avatar.clone()),
            name: user.name,
            about: user.about.unwrap_or_default(),
            achievements: user.achievements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> HabitService {
        HabitService::new(Database::open_memory().unwrap())
    }

    #[test]
    fn register_rejects_bad_input_and_duplicates() {
        let service = service();
        assert!(service.register("not-an-email", "Ada", None).is_err());
        assert!(service.register("ada@example.com", "  ", None).is_err());

        service.register("ada@example.com", "Ada", None).unwrap();
        assert!(service.register("Ada@Example.com", "Ada", None).is_err());
    }

    #[test]
    fn authenticate_checks_credentials() {
        let service = service();
        let user = service
            .register("ada@example.com", "Ada", Some("hunter2"))
            .unwrap();

        assert_eq!(
            service.authenticate("ada@example.com", "hunter2").unwrap().id,
            user.id
        );
        assert!(matches!(
            service.authenticate("ada@example.com", "wrong").unwrap_err(),
            CoreError::Unauthenticated
        ));
        assert!(matches!(
            service.authenticate("ghost@example.com", "pw").unwrap_err(),
            CoreError::Unauthenticated
        ));
    }

    #[test]
    fn habit_operations_are_owner_scoped() {
        let service = service();
        let ada = service.register("ada@example.com", "Ada", None).unwrap();
        let eve = service.register("eve@example.com", "Eve", None).unwrap();
        let habit = service
            .create_habit(&ada.id, "Stretch", RecurrenceRule::every_day())
            .unwrap();

        assert!(matches!(
            service.check_in(&eve.id, &habit.id, None).unwrap_err(),
            CoreError::NotFound { .. }
        ));
        assert!(matches!(
            service.delete_habit(&eve.id, &habit.id).unwrap_err(),
            CoreError::NotFound { .. }
        ));
    }

    #[test]
    fn rule_change_recomputes_streak() {
        let service = service();
        let ada = service.register("ada@example.com", "Ada", None).unwrap();
        let habit = service
            .create_habit(&ada.id, "Stretch", RecurrenceRule::every_day())
            .unwrap();
        service.check_in(&ada.id, &habit.id, None).unwrap();

        let updated = service
            .update_habit(
                &ada.id,
                &habit.id,
                HabitUpdate {
                    title: None,
                    repeat: Some(RecurrenceRule::CountPerWeek { count: 2 }),
                },
            )
            .unwrap();
        assert_eq!(updated.streak, 1);
        assert!(matches!(
            updated.repeat,
            RecurrenceRule::CountPerWeek { count: 2 }
        ));
    }

    #[test]
    fn profile_falls_back_to_default_avatar() {
        let service = service();
        let ada = service.register("ada@example.com", "Ada", None).unwrap();

        let profile = service.profile(&ada.id).unwrap();
        assert_eq!(profile.avatar, AVATARS[0]);
        assert_eq!(profile.about, "");

        let profile = service
            .update_profile(
                &ada.id,
                ProfileUpdate {
                    avatar: Some(AVATARS[2].to_string()),
                    about: Some("Slaying habits".to_string()),
                    achievements: None,
                },
            )
            .unwrap();
        assert_eq!(profile.avatar, AVATARS[2]);
        assert_eq!(profile.about, "Slaying habits");
    }

    #[test]
    fn unknown_avatar_is_rejected() {
        let service = service();
        let ada = service.register("ada@example.com", "Ada", None).unwrap();
        let err = service
            .update_profile(
                &ada.id,
                ProfileUpdate {
                    avatar: Some("🦀".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn upgrade_requires_gems() {
        let service = service();
        let ada = service.register("ada@example.com", "Ada", None).unwrap();
        assert!(matches!(
            service.upgrade(&ada.id).unwrap_err(),
            CoreError::InsufficientGems { .. }
        ));
    }
}
