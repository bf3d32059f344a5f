//! Shared helpers for CLI commands: service construction, session
//! resolution, and argument parsing.

use chrono::NaiveDate;
use habitquest_core::{Config, CoreError, Database, HabitService, Result, ValidationError};

/// kv key holding the logged-in user's id.
pub const SESSION_KEY: &str = "session.current_user";

/// Open the database and config and build the service.
pub fn open_service() -> Result<HabitService> {
    let db = Database::open()?;
    let config = Config::load()?;
    Ok(HabitService::with_config(db, config))
}

/// Resolve the logged-in user id from the session, or fail.
pub fn current_user_id(service: &HabitService) -> Result<String> {
    service
        .db()
        .kv_get(SESSION_KEY)?
        .ok_or(CoreError::Unauthenticated)
}

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidValue {
            field: "date".to_string(),
            message: format!("'{raw}' is not a YYYY-MM-DD date"),
        }
        .into()
    })
}

/// Parse a comma-separated weekday list, 0 = Sunday .. 6 = Saturday.
pub fn parse_days(raw: &str) -> Result<std::collections::BTreeSet<u8>> {
    raw.split(',')
        .map(|part| {
            part.trim().parse::<u8>().map_err(|_| {
                ValidationError::InvalidValue {
                    field: "days".to_string(),
                    message: format!("'{part}' is not a weekday number (0-6)"),
                }
                .into()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates() {
        assert_eq!(
            parse_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date("15/01/2024").is_err());
    }

    #[test]
    fn parses_day_lists() {
        let days = parse_days("1, 3,5").unwrap();
        assert_eq!(days.into_iter().collect::<Vec<_>>(), [1, 3, 5]);
        assert!(parse_days("mon").is_err());
    }
}
