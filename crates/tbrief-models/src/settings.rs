//! User notification settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_NOTIFICATION_TIME: &str = "21:30";
pub const DEFAULT_PLATFORM: &str = "Telegram";

/// Single-record notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserSettings {
    /// Daily delivery time as local `HH:MM`.
    pub notification_time: String,
    pub notification_platform: String,
    pub notification_enabled: bool,
    /// Local date (`YYYY-MM-DD`) of the last scheduled run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_date: Option<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notification_time: DEFAULT_NOTIFICATION_TIME.to_string(),
            notification_platform: DEFAULT_PLATFORM.to_string(),
            notification_enabled: true,
            last_run_date: None,
        }
    }
}

/// Request body for `PUT /api/settings`.
#[derive(Debug, Clone, Default, Deserialize, Validate, JsonSchema)]
pub struct UpdateSettingsRequest {
    /// Must be `HH:MM`, 24-hour.
    #[validate(custom(function = "validate_time"))]
    pub notification_time: Option<String>,
    pub notification_platform: Option<String>,
    pub notification_enabled: Option<bool>,
}

impl UpdateSettingsRequest {
    /// Merge the request over existing settings.
    pub fn apply_to(&self, settings: &mut UserSettings) {
        if let Some(time) = &self.notification_time {
            settings.notification_time = time.clone();
        }
        if let Some(platform) = &self.notification_platform {
            settings.notification_platform = platform.clone();
        }
        if let Some(enabled) = self.notification_enabled {
            settings.notification_enabled = enabled;
        }
    }
}

fn validate_time(value: &str) -> Result<(), validator::ValidationError> {
    let valid = matches!(value.split_once(':'), Some((h, m))
        if h.len() == 2
            && m.len() == 2
            && h.parse::<u32>().is_ok_and(|h| h < 24)
            && m.parse::<u32>().is_ok_and(|m| m < 60));
    if valid {
        Ok(())
    } else {
        Err(validator::ValidationError::new("notification_time"))
    }
}
