//! The daily operating-hours window.
//!
//! The window recurs every calendar day in its zone and never spans midnight.
//! Both bounds are inclusive: an appointment may start exactly at opening and
//! end exactly at closing. On a day where an opening or closing time is
//! skipped by a DST transition, that bound moves to the end of the gap.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};
use crate::time::{self, BUSINESS_ZONE};

/// Daily opening and closing times in a fixed zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    zone: Tz,
    open: NaiveTime,
    close: NaiveTime,
}

const DEFAULT_OPEN: NaiveTime = match NaiveTime::from_hms_opt(8, 0, 0) {
    Some(t) => t,
    None => panic!("08:00:00 is a valid time"),
};

const DEFAULT_CLOSE: NaiveTime = match NaiveTime::from_hms_opt(22, 0, 0) {
    Some(t) => t,
    None => panic!("22:00:00 is a valid time"),
};

impl Default for BusinessHours {
    /// 08:00–22:00 in [`BUSINESS_ZONE`].
    fn default() -> Self {
        Self {
            zone: BUSINESS_ZONE,
            open: DEFAULT_OPEN,
            close: DEFAULT_CLOSE,
        }
    }
}

impl BusinessHours {
    /// Build a window from `HH:mm:ss` opening and closing times.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimeFormat`] if either time is not
    /// `HH:mm:ss`, or [`ScheduleError::InvalidConfig`] if `open` is not strictly
    /// before `close`.
    pub fn new(zone: Tz, open: &str, close: &str) -> Result<Self> {
        let open = time::parse_time_of_day(open)?;
        let close = time::parse_time_of_day(close)?;
        if open >= close {
            return Err(ScheduleError::InvalidConfig(format!(
                "business hours must open before they close (open {open}, close {close})"
            )));
        }
        Ok(Self { zone, open, close })
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    /// Canonical opening and closing instants on `date` (a date in this
    /// window's zone).
    pub fn bounds_on(&self, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let open = time::at_local_or_after(date, self.open, self.zone)?;
        let close = time::at_local_or_after(date, self.close, self.zone)?;
        Ok((open, close))
    }

    /// Whether `instant` falls within the window of its own calendar day.
    pub fn contains(&self, instant: &DateTime<Utc>) -> Result<bool> {
        let date = instant.with_timezone(&self.zone).date_naive();
        let (open, close) = self.bounds_on(date)?;
        Ok(open <= *instant && *instant <= close)
    }
}
