//! # HabitQuest Core Library
//!
//! This library provides the core business logic for HabitQuest, a gamified
//! habit tracker. It implements a CLI-first philosophy where all operations
//! are available via a standalone CLI binary; any richer front end is a
//! thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Engine**: pure calculators for recurrence scheduling, streak
//!   computation, XP/level rollover, missions, and achievements
//! - **Service**: [`HabitService`] orchestrates check-ins, mission
//!   collection, and upgrades against storage
//! - **Storage**: SQLite-based user/habit persistence and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`Habit`] / [`RecurrenceRule`]: the tracked activity and its schedule
//! - [`streak::compute_streak`]: streak length from completion dates
//! - [`HabitService`]: the surface a request boundary calls
//! - [`Database`]: user and habit persistence

pub mod achievements;
pub mod checkin;
pub mod error;
pub mod habit;
pub mod missions;
pub mod progression;
pub mod service;
pub mod storage;
pub mod streak;
pub mod user;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use habit::{Habit, RecurrenceRule};
pub use missions::{CollectOutcome, Mission, MissionBoard, Reward};
pub use service::{HabitService, HabitUpdate, Profile, ProfileUpdate};
pub use storage::{Config, Database};
pub use user::{Achievement, User, AVATARS};
