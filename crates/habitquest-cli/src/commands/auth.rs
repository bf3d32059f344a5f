//! Account and session commands for CLI.

use clap::Subcommand;
use habitquest_core::CoreError;

use crate::common::{current_user_id, open_service, SESSION_KEY};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account and log in
    Register {
        /// Email address (unique)
        #[arg(long)]
        email: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Password; omit for a passwordless local account
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in as an existing account
    Login {
        /// Email address
        #[arg(long)]
        email: String,
        /// Password, required when the account has one
        #[arg(long)]
        password: Option<String>,
    },
    /// Clear the current session
    Logout,
    /// Show the logged-in account
    Whoami,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service()?;

    match action {
        AuthAction::Register {
            email,
            name,
            password,
        } => {
            let user = service.register(&email, &name, password.as_deref())?;
            service.db().kv_set(SESSION_KEY, &user.id)?;
            println!("Registered {} <{}>", user.name, user.email);
        }
        AuthAction::Login { email, password } => {
            let user = match password {
                Some(password) => service.authenticate(&email, &password)?,
                None => {
                    // Passwordless accounts log in by email alone.
                    let user = service
                        .db()
                        .find_user_by_email(email.trim().to_lowercase().as_str())?
                        .ok_or(CoreError::Unauthenticated)?;
                    if user.password_hash.is_some() {
                        return Err(CoreError::Unauthenticated.into());
                    }
                    user
                }
            };
            service.db().kv_set(SESSION_KEY, &user.id)?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        AuthAction::Logout => {
            service.db().kv_delete(SESSION_KEY)?;
            println!("Logged out");
        }
        AuthAction::Whoami => {
            let user_id = current_user_id(&service)?;
            let profile = service.profile(&user_id)?;
            println!("{} (level {}, {} XP)", profile.name, profile.level, profile.xp);
        }
    }
    Ok(())
}
