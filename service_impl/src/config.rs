use std::env;

use async_trait::async_trait;
use service::{
    config::{Config, ConfigService},
    ServiceError, ValidationFailureItem,
};
use tracing::warn;

pub const REQUIRED_WEEKLY_HOURS_VAR: &str = "TIMESHEET_REQUIRED_WEEKLY_HOURS";
pub const LEAVE_HOURS_VAR: &str = "TIMESHEET_LEAVE_HOURS";
pub const LEAVE_ON_WEEKENDS_VAR: &str = "TIMESHEET_LEAVE_ON_WEEKENDS";

/// Reads the timesheet rules from the environment, falling back to
/// [`Config::default`] for unset variables.
pub struct ConfigServiceImpl;

#[async_trait]
impl ConfigService for ConfigServiceImpl {
    async fn get_config(&self) -> Result<Config, ServiceError> {
        config_from(|name| env::var(name).ok())
    }
}

pub fn config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ServiceError> {
    let defaults = Config::default();
    Ok(Config {
        required_weekly_hours: read_hours(
            REQUIRED_WEEKLY_HOURS_VAR,
            lookup(REQUIRED_WEEKLY_HOURS_VAR),
            defaults.required_weekly_hours,
        )?,
        leave_autofill_hours: read_hours(
            LEAVE_HOURS_VAR,
            lookup(LEAVE_HOURS_VAR),
            defaults.leave_autofill_hours,
        )?,
        leave_on_weekends: match lookup(LEAVE_ON_WEEKENDS_VAR) {
            None => defaults.leave_on_weekends,
            Some(value) => match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    warn!("Ignoring {}={:?}", LEAVE_ON_WEEKENDS_VAR, value);
                    defaults.leave_on_weekends
                }
            },
        },
    })
}

fn read_hours(name: &str, value: Option<String>, default: f32) -> Result<f32, ServiceError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().parse::<f32>() {
        Ok(hours) if hours.is_finite() && hours > 0.0 => Ok(hours),
        _ => Err(ServiceError::validation(ValidationFailureItem::InvalidValue(
            format!("{}={}", name, value).into(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = config_from(|_| None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(|name| match name {
            REQUIRED_WEEKLY_HOURS_VAR => Some("37.5".to_string()),
            LEAVE_HOURS_VAR => Some("7.5".to_string()),
            LEAVE_ON_WEEKENDS_VAR => Some("TRUE".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.required_weekly_hours, 37.5);
        assert_eq!(config.leave_autofill_hours, 7.5);
        assert!(config.leave_on_weekends);
    }

    #[test]
    fn test_invalid_hours() {
        let result = config_from(|name| {
            (name == REQUIRED_WEEKLY_HOURS_VAR).then(|| "forty".to_string())
        });
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }
}
