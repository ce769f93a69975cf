//! Candidate appointment intervals.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::time::{self, storage_format};

/// A `(start, end)` pair of canonical instants.
///
/// A valid interval has `start < end`. Construction does not enforce this so
/// that user input can be carried to validation and rejected there; see
/// [`AppointmentInterval::ensure_ordered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentInterval {
    #[serde(with = "storage_format")]
    pub start: DateTime<Utc>,
    #[serde(with = "storage_format")]
    pub end: DateTime<Utc>,
}

impl AppointmentInterval {
    /// Build an interval, dropping sub-second components from both ends.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: time::truncate(start),
            end: time::truncate(end),
        }
    }

    /// Build an interval and check its ordering.
    pub fn checked(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let interval = Self::new(start, end);
        interval.ensure_ordered()?;
        Ok(interval)
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidInterval`] unless `start < end`.
    pub fn ensure_ordered(&self) -> Result<()> {
        if self.start < self.end {
            Ok(())
        } else {
            Err(ScheduleError::InvalidInterval {
                start: self.start,
                end: self.end,
            })
        }
    }

    /// Half-open overlap: intervals that only share an endpoint do not overlap.
    pub fn overlaps(&self, other: &AppointmentInterval) -> bool {
        other.end > self.start && other.start < self.end
    }

    /// Whether `instant` lies in `[start, end)`.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
