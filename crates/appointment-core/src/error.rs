//! Error types for appointment validation and storage.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::appointment::AppointmentId;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Start time must come before end time (start {start}, end {end})")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Appointment must be within business hours ({instant} is outside the window)")]
    OutsideBusinessHours { instant: DateTime<Utc> },

    #[error("Appointment overlaps with an existing appointment{}", conflict_suffix(.conflicting))]
    OverlapConflict { conflicting: Option<AppointmentId> },

    #[error("Appointment store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("Appointment not found: {0}")]
    NotFound(AppointmentId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Instant out of supported range: {0}")]
    OutOfRange(String),

    #[error("Duplicate appointment id: {0}")]
    DuplicateId(AppointmentId),
}

impl ScheduleError {
    /// Whether the same request may succeed if simply retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScheduleError::StoreUnavailable(_))
    }
}

fn conflict_suffix(conflicting: &Option<AppointmentId>) -> String {
    match conflicting {
        Some(id) => format!(" ({id})"),
        None => String::new(),
    }
}

/// Failures reported by an [`AppointmentStore`](crate::store::AppointmentStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("no appointment with {0}")]
    NotFound(AppointmentId),

    #[error("{0} appears more than once")]
    DuplicateId(AppointmentId),
}

impl From<StoreError> for ScheduleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ScheduleError::NotFound(id),
            StoreError::DuplicateId(id) => ScheduleError::DuplicateId(id),
            other => ScheduleError::StoreUnavailable(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
