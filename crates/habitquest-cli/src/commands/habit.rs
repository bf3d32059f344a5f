//! Habit management commands for CLI.

use clap::Subcommand;
use habitquest_core::{Config, HabitUpdate, RecurrenceRule};

use crate::common::{current_user_id, open_service, parse_date, parse_days};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit title
        title: String,
        /// Comma-separated weekdays (0 = Sun .. 6 = Sat); default: every day
        #[arg(long, conflicts_with = "per_week")]
        days: Option<String>,
        /// Target count per week (1-7)
        #[arg(long)]
        per_week: Option<u8>,
    },
    /// List habits
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a habit's title or schedule
    Edit {
        /// Habit ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New comma-separated weekdays (0 = Sun .. 6 = Sat)
        #[arg(long, conflicts_with = "per_week")]
        days: Option<String>,
        /// New target count per week (1-7)
        #[arg(long)]
        per_week: Option<u8>,
    },
    /// Delete a habit
    Rm {
        /// Habit ID
        id: String,
    },
    /// Check in a habit
    Done {
        /// Habit ID
        id: String,
        /// Check-in date (YYYY-MM-DD); default today
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove a check-in
    Undo {
        /// Habit ID
        id: String,
        /// Check-in date (YYYY-MM-DD); default today
        #[arg(long)]
        date: Option<String>,
    },
}

fn rule_from_flags(days: Option<String>, per_week: Option<u8>) -> Result<Option<RecurrenceRule>, Box<dyn std::error::Error>> {
    if let Some(count) = per_week {
        return Ok(Some(RecurrenceRule::CountPerWeek { count }));
    }
    if let Some(raw) = days {
        return Ok(Some(RecurrenceRule::DaysOfWeek {
            days: parse_days(&raw)?,
        }));
    }
    Ok(None)
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service()?;
    let user_id = current_user_id(&service)?;

    match action {
        HabitAction::Add {
            title,
            days,
            per_week,
        } => {
            let rule = rule_from_flags(days, per_week)?.unwrap_or_else(RecurrenceRule::every_day);
            let habit = service.create_habit(&user_id, &title, rule)?;
            println!("Habit created: {}", habit.id);
        }
        HabitAction::List { json } => {
            let habits = service.list_habits(&user_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                println!("No habits yet. Add one with `habit add <title>`.");
            } else {
                let icons = Config::load()?.display.icons;
                let today = chrono::Local::now().date_naive();
                for habit in habits {
                    let marker = if habit.completed_on(today) { "x" } else { " " };
                    let streak = if icons {
                        format!("🔥{}", habit.streak)
                    } else {
                        format!("streak {}", habit.streak)
                    };
                    println!("[{marker}] {}  {}  ({streak})", habit.id, habit.title);
                }
            }
        }
        HabitAction::Edit {
            id,
            title,
            days,
            per_week,
        } => {
            let update = HabitUpdate {
                title,
                repeat: rule_from_flags(days, per_week)?,
            };
            let habit = service.update_habit(&user_id, &id, update)?;
            println!("Habit updated: {} ({})", habit.title, habit.id);
        }
        HabitAction::Rm { id } => {
            service.delete_habit(&user_id, &id)?;
            println!("Habit deleted: {id}");
        }
        HabitAction::Done { id, date } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            let habit = service.check_in(&user_id, &id, date)?;
            let profile = service.profile(&user_id)?;
            println!(
                "Checked in: {} (streak {}), level {}, {} XP",
                habit.title, habit.streak, profile.level, profile.xp
            );
        }
        HabitAction::Undo { id, date } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            let habit = service.uncheck_in(&user_id, &id, date)?;
            println!("Check-in removed: {} (streak {})", habit.title, habit.streak);
        }
    }
    Ok(())
}
