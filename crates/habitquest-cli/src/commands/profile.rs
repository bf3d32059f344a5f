//! Profile commands for CLI.

use clap::Subcommand;
use habitquest_core::ProfileUpdate;

use crate::common::{current_user_id, open_service};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show level, XP, gems, and achievements
    Show {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Update avatar or about text
    Set {
        /// Avatar, one of the built-in catalog
        #[arg(long)]
        avatar: Option<String>,
        /// About text
        #[arg(long)]
        about: Option<String>,
    },
    /// Spend gems to buy a level
    Upgrade,
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service()?;
    let user_id = current_user_id(&service)?;

    match action {
        ProfileAction::Show { json } => {
            let profile = service.profile(&user_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!("{} {}", profile.avatar, profile.name);
                println!("Level {}, {} XP, {} gems", profile.level, profile.xp, profile.gems);
                if !profile.about.is_empty() {
                    println!("{}", profile.about);
                }
                if !profile.achievements.is_empty() {
                    println!("\nAchievements:");
                    for achievement in &profile.achievements {
                        println!(
                            "{} {}  {}",
                            achievement.icon, achievement.title, achievement.description
                        );
                    }
                }
            }
        }
        ProfileAction::Set { avatar, about } => {
            let profile = service.update_profile(
                &user_id,
                ProfileUpdate {
                    avatar,
                    about,
                    achievements: None,
                },
            )?;
            println!("Profile updated: {} {}", profile.avatar, profile.name);
        }
        ProfileAction::Upgrade => {
            let before = service.profile(&user_id)?.achievements.len();
            let profile = service.upgrade(&user_id)?;
            println!("Upgraded to level {} ({} gems left)", profile.level, profile.gems);
            for achievement in profile.achievements.iter().skip(before) {
                println!(
                    "New achievement: {} {}",
                    achievement.icon, achievement.title
                );
            }
        }
    }
    Ok(())
}
