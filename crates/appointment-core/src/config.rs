//! Scheduling configuration, loadable from TOML.
//!
//! ```toml
//! business_zone = "America/New_York"
//! business_open = "08:00:00"
//! business_close = "22:00:00"
//! viewer_zone = "America/Denver"
//! reminder_window_minutes = 15
//! ```
//!
//! Every key is optional; missing keys take the defaults above (the viewer
//! zone defaults to `UTC`).

use std::path::Path;

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::hours::BusinessHours;
use crate::time;

/// Longest accepted reminder window: one year.
pub const MAX_REMINDER_WINDOW_MINUTES: i64 = 366 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    pub business_zone: String,
    pub business_open: String,
    pub business_close: String,
    pub viewer_zone: String,
    pub reminder_window_minutes: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            business_zone: time::BUSINESS_ZONE.name().to_string(),
            business_open: "08:00:00".to_string(),
            business_close: "22:00:00".to_string(),
            viewer_zone: "UTC".to_string(),
            reminder_window_minutes: 15,
        }
    }
}

impl SchedulingConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ScheduleError::InvalidConfig(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ScheduleError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn business_hours(&self) -> Result<BusinessHours> {
        let zone = time::parse_timezone(&self.business_zone)?;
        BusinessHours::new(zone, &self.business_open, &self.business_close)
    }

    pub fn viewer_zone(&self) -> Result<Tz> {
        time::parse_timezone(&self.viewer_zone)
    }

    pub fn reminder_window(&self) -> Result<Duration> {
        let minutes = self.reminder_window_minutes;
        if !(0..=MAX_REMINDER_WINDOW_MINUTES).contains(&minutes) {
            return Err(ScheduleError::InvalidConfig(format!(
                "reminder_window_minutes must be between 0 and {MAX_REMINDER_WINDOW_MINUTES} (got {minutes})"
            )));
        }
        Duration::try_minutes(minutes).ok_or_else(|| {
            ScheduleError::InvalidConfig(format!("reminder_window_minutes {minutes} is out of range"))
        })
    }
}
