//! SQLite-based storage for users and habits.
//!
//! One row per aggregate; set- and list-valued fields are stored as JSON
//! text columns and timestamps as RFC 3339 text. Single-row updates are
//! atomic, which is all the engine above requires.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{DatabaseError, Result};
use crate::habit::{Habit, RecurrenceRule};
use crate::user::{Achievement, User};

use super::data_dir;

/// Parse datetime from RFC 3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a User from a database row
fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let collected_str: String = row.get(9)?;
    let collected_missions: BTreeSet<String> =
        serde_json::from_str(&collected_str).unwrap_or_default();

    let achievements_str: String = row.get(10)?;
    let achievements: Vec<Achievement> =
        serde_json::from_str(&achievements_str).unwrap_or_default();

    let created_at_str: String = row.get(11)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        avatar: row.get(4)?,
        about: row.get(5)?,
        xp: row.get(6)?,
        level: row.get(7)?,
        gems: row.get(8)?,
        collected_missions,
        achievements,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// Build a Habit from a database row
fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    let repeat_str: String = row.get(3)?;
    let repeat: RecurrenceRule =
        serde_json::from_str(&repeat_str).unwrap_or_else(|_| RecurrenceRule::every_day());

    let dates_str: String = row.get(5)?;
    let completed_dates: BTreeSet<NaiveDate> =
        serde_json::from_str(&dates_str).unwrap_or_default();

    let created_at_str: String = row.get(6)?;
    let updated_at_str: String = row.get(7)?;

    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        repeat,
        streak: row.get(4)?,
        completed_dates,
        created_at: parse_datetime_fallback(&created_at_str),
        updated_at: parse_datetime_fallback(&updated_at_str),
    })
}

const USER_COLUMNS: &str = "id, email, name, password_hash, avatar, about, \
                            xp, level, gems, collected_missions, achievements, created_at";
const HABIT_COLUMNS: &str =
    "id, user_id, title, repeat_rule, streak, completed_dates, created_at, updated_at";

/// SQLite database for user and habit storage.
///
/// Opened once per process and handed to the service layer; every update
/// touches a single row.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/habitquest/habitquest.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("habitquest.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id                 TEXT PRIMARY KEY,
                    email              TEXT NOT NULL UNIQUE,
                    name               TEXT NOT NULL,
                    password_hash      TEXT,
                    avatar             TEXT,
                    about              TEXT,
                    xp                 INTEGER NOT NULL DEFAULT 0,
                    level              INTEGER NOT NULL DEFAULT 1,
                    gems               INTEGER NOT NULL DEFAULT 0,
                    collected_missions TEXT NOT NULL DEFAULT '[]',
                    achievements       TEXT NOT NULL DEFAULT '[]',
                    created_at         TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS habits (
                    id              TEXT PRIMARY KEY,
                    user_id         TEXT NOT NULL REFERENCES users(id),
                    title           TEXT NOT NULL,
                    repeat_rule     TEXT NOT NULL,
                    streak          INTEGER NOT NULL DEFAULT 0,
                    completed_dates TEXT NOT NULL DEFAULT '[]',
                    created_at      TEXT NOT NULL,
                    updated_at      TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_habits_user_id ON habits(user_id);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // === Users ===

    pub fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO users (id, email, name, password_hash, avatar, about,
                                xp, level, gems, collected_missions, achievements, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                user.id,
                user.email,
                user.name,
                user.password_hash,
                user.avatar,
                user.about,
                user.xp,
                user.level,
                user.gems,
                serde_json::to_string(&user.collected_missions).unwrap_or_else(|_| "[]".into()),
                serde_json::to_string(&user.achievements).unwrap_or_else(|_| "[]".into()),
                user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Atomic single-row update of every mutable user field.
    pub fn update_user(&self, user: &User) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE users
             SET email = ?2, name = ?3, password_hash = ?4, avatar = ?5, about = ?6,
                 xp = ?7, level = ?8, gems = ?9, collected_missions = ?10, achievements = ?11
             WHERE id = ?1",
            params![
                user.id,
                user.email,
                user.name,
                user.password_hash,
                user.avatar,
                user.about,
                user.xp,
                user.level,
                user.gems,
                serde_json::to_string(&user.collected_missions).unwrap_or_else(|_| "[]".into()),
                serde_json::to_string(&user.achievements).unwrap_or_else(|_| "[]".into()),
            ],
        )?;
        Ok(())
    }

    pub fn find_user(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
        Ok(stmt.query_row(params![id], row_to_user).optional()?)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"))?;
        Ok(stmt.query_row(params![email], row_to_user).optional()?)
    }

    // === Habits ===

    pub fn insert_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO habits (id, user_id, title, repeat_rule, streak,
                                 completed_dates, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                habit.id,
                habit.user_id,
                habit.title,
                serde_json::to_string(&habit.repeat).unwrap_or_else(|_| "{}".into()),
                habit.streak,
                serde_json::to_string(&habit.completed_dates).unwrap_or_else(|_| "[]".into()),
                habit.created_at.to_rfc3339(),
                habit.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Atomic single-row update of every mutable habit field.
    pub fn update_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE habits
             SET title = ?2, repeat_rule = ?3, streak = ?4, completed_dates = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                habit.id,
                habit.title,
                serde_json::to_string(&habit.repeat).unwrap_or_else(|_| "{}".into()),
                habit.streak,
                serde_json::to_string(&habit.completed_dates).unwrap_or_else(|_| "[]".into()),
                habit.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find a habit by id, scoped to its owner.
    pub fn find_habit(&self, id: &str, user_id: &str) -> Result<Option<Habit>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1 AND user_id = ?2"
        ))?;
        Ok(stmt.query_row(params![id, user_id], row_to_habit).optional()?)
    }

    /// All habits owned by `user_id`, in creation order.
    pub fn habits_for_user(&self, user_id: &str) -> Result<Vec<Habit>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = ?1 ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_habit)?;
        let mut habits = Vec::new();
        for habit in rows {
            habits.push(habit?);
        }
        Ok(habits)
    }

    /// Delete a habit owned by `user_id`. Returns whether a row was removed.
    pub fn delete_habit(&self, id: &str, user_id: &str) -> Result<bool, DatabaseError> {
        let deleted = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }

    // === Key-value store ===

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        Ok(stmt
            .query_row(params![key], |row| row.get::<_, String>(0))
            .optional()?)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
