//! Mission commands for CLI.

use clap::Subcommand;
use habitquest_core::{Config, Mission};

use crate::common::{current_user_id, open_service};

#[derive(Subcommand)]
pub enum MissionsAction {
    /// Show today's daily and weekly missions
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Collect the reward for a completed mission
    Collect {
        /// Mission ID (e.g. any-2, streak-<habit id>)
        id: String,
    },
}

fn print_mission(mission: &Mission, icons: bool) {
    let state = if mission.collected {
        "collected"
    } else if mission.completed {
        "ready"
    } else {
        "open"
    };
    let gems = if icons { "💎" } else { "gems" };
    let mut line = format!(
        "[{state}] {}  {}  (+{} XP, +{} {gems})",
        mission.id, mission.title, mission.reward.xp, mission.reward.gems
    );
    if let (Some(streak), Some(goal)) = (mission.streak, mission.streak_goal) {
        line.push_str(&format!("  {streak}/{goal} days"));
    }
    println!("{line}");
}

pub fn run(action: MissionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service()?;
    let user_id = current_user_id(&service)?;

    match action {
        MissionsAction::List { json } => {
            let board = service.missions(&user_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                let icons = Config::load()?.display.icons;
                println!("Daily missions:");
                for mission in &board.daily {
                    print_mission(mission, icons);
                }
                println!("\nWeekly missions:");
                for mission in &board.weekly {
                    print_mission(mission, icons);
                }
            }
        }
        MissionsAction::Collect { id } => {
            let outcome = service.collect_mission(&user_id, &id)?;
            println!(
                "Mission collected: {id}. Now level {}, {} XP, {} gems",
                outcome.level, outcome.xp, outcome.gems
            );
        }
    }
    Ok(())
}
