//! Conversions between the viewer's zone, the business zone, and canonical UTC.
//!
//! Every instant that reaches storage is UTC with second precision and is
//! written as `yyyy-MM-dd HH:mm:ss` with no offset suffix. Instants shown to a
//! person are rendered in that person's zone as `MM/dd/yy h:mm a`. Business
//! hours are always evaluated in [`BUSINESS_ZONE`], wherever the caller runs.
//!
//! Formatting configuration lives in [`ZonedFormat`], an immutable value that is
//! built per call. There is no shared formatter whose pattern or zone gets
//! swapped between calls.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};

/// The fixed zone the operating-hours window is evaluated in.
pub const BUSINESS_ZONE: Tz = chrono_tz::America::New_York;

/// Canonical storage pattern (`yyyy-MM-dd HH:mm:ss`, UTC implied).
pub const STORAGE_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// Human-facing pattern (`MM/dd/yy h:mm a`). Parsing accepts unpadded fields.
pub const DISPLAY_PATTERN: &str = "%m/%d/%y %-I:%M %p";

/// Time-of-day pattern used by [`combine_date_and_time`].
pub const TIME_OF_DAY_PATTERN: &str = "%H:%M:%S";

// ── ZonedFormat ─────────────────────────────────────────────────────────────

/// A (pattern, zone) pair used to format or parse instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedFormat {
    pattern: &'static str,
    zone: Tz,
}

impl ZonedFormat {
    pub const fn new(pattern: &'static str, zone: Tz) -> Self {
        Self { pattern, zone }
    }

    /// The canonical storage format: [`STORAGE_PATTERN`] in UTC.
    pub const fn storage() -> Self {
        Self::new(STORAGE_PATTERN, chrono_tz::UTC)
    }

    /// The display format in a viewer's zone.
    pub const fn display(zone: Tz) -> Self {
        Self::new(DISPLAY_PATTERN, zone)
    }

    /// The display format anchored to [`BUSINESS_ZONE`].
    pub const fn business() -> Self {
        Self::display(BUSINESS_ZONE)
    }

    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Render `instant` as wall-clock text in this format's zone.
    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.zone)
            .format(self.pattern)
            .to_string()
    }

    /// Parse wall-clock text in this format's zone into a canonical instant.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimeFormat`] if the text does not match
    /// the pattern, or names a local time skipped by a DST transition.
    pub fn parse(&self, s: &str) -> Result<DateTime<Utc>> {
        let trimmed = s.trim();
        let naive = NaiveDateTime::parse_from_str(trimmed, self.pattern).map_err(|e| {
            ScheduleError::InvalidTimeFormat(format!("'{}': {}", trimmed, e))
        })?;
        localize(naive, self.zone)
    }
}

// ── Normalization ───────────────────────────────────────────────────────────

/// Convert user-entered wall-clock text (`MM/dd/yy h:mm a`) in `source_zone`
/// to a canonical UTC instant.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidTimeFormat`] if the text cannot be parsed.
///
/// # Examples
///
/// ```
/// use appointment_core::time::{format_storage, to_canonical};
///
/// let utc = to_canonical("03/01/24 9:00 AM", chrono_tz::America::New_York).unwrap();
/// assert_eq!(format_storage(&utc), "2024-03-01 14:00:00");
/// ```
pub fn to_canonical(local: &str, source_zone: Tz) -> Result<DateTime<Utc>> {
    ZonedFormat::display(source_zone).parse(local)
}

/// Normalize a local wall-clock value for storage.
///
/// Accepts either the entry pattern (`MM/dd/yy h:mm a`) or a full
/// `yyyy-MM-dd HH:mm:ss` wall-clock value, both interpreted in `zone`.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidTimeFormat`] if the text matches neither
/// pattern, or names a local time skipped by a DST transition.
pub fn normalize_for_storage(local_date_time: &str, zone: Tz) -> Result<DateTime<Utc>> {
    let trimmed = local_date_time.trim();
    let naive = NaiveDateTime::parse_from_str(trimmed, DISPLAY_PATTERN)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, STORAGE_PATTERN))
        .map_err(|_| {
            ScheduleError::InvalidTimeFormat(format!(
                "'{trimmed}': expected 'MM/dd/yy h:mm a' or 'yyyy-MM-dd HH:mm:ss'"
            ))
        })?;
    localize(naive, zone)
}

/// Format a canonical instant for a viewer in `viewer_zone`.
pub fn format_for_display(instant: &DateTime<Utc>, viewer_zone: Tz) -> String {
    ZonedFormat::display(viewer_zone).format(instant)
}

/// Re-express a canonical instant in [`BUSINESS_ZONE`].
pub fn to_business_zone(instant: &DateTime<Utc>) -> DateTime<Tz> {
    instant.with_timezone(&BUSINESS_ZONE)
}

/// Combine a calendar date with an `HH:mm:ss` time of day in `zone`.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidTimeFormat`] if `time_of_day` is not
/// `HH:mm:ss`, or the resulting local time does not exist in `zone`.
pub fn combine_date_and_time(
    date: NaiveDate,
    time_of_day: &str,
    zone: Tz,
) -> Result<DateTime<Utc>> {
    let time = parse_time_of_day(time_of_day)?;
    at_local(date, time, zone)
}

/// Parse an `HH:mm:ss` time of day.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_OF_DAY_PATTERN)
        .map_err(|e| ScheduleError::InvalidTimeFormat(format!("'{}': {}", s.trim(), e)))
}

/// Resolve `date` at `time` in `zone` to a canonical instant.
pub(crate) fn at_local(date: NaiveDate, time: NaiveTime, zone: Tz) -> Result<DateTime<Utc>> {
    localize(date.and_time(time), zone)
}

/// Resolve `date` at `time` in `zone`, moving a time skipped by a DST
/// transition forward to the first instant after the gap.
pub(crate) fn at_local_or_after(
    date: NaiveDate,
    time: NaiveTime,
    zone: Tz,
) -> Result<DateTime<Utc>> {
    let naive = date.and_time(time);
    if let Some(dt) = zone.from_local_datetime(&naive).earliest() {
        return Ok(dt.with_timezone(&Utc));
    }
    // Transitions fall on whole minutes.
    let minute = naive.with_second(0).unwrap_or(naive);
    (1..=MAX_GAP_MINUTES)
        .filter_map(|m| minute.checked_add_signed(Duration::minutes(m)))
        .find_map(|candidate| zone.from_local_datetime(&candidate).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            ScheduleError::InvalidTimeFormat(format!(
                "{} does not exist in {} (DST gap)",
                naive,
                zone.name()
            ))
        })
}

/// Longest wall-clock gap any zone has skipped in one transition.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Format an instant in the canonical storage representation.
pub fn format_storage(instant: &DateTime<Utc>) -> String {
    ZonedFormat::storage().format(instant)
}

/// Parse a canonical storage string.
pub fn parse_storage(s: &str) -> Result<DateTime<Utc>> {
    ZonedFormat::storage().parse(s)
}

/// Drop any sub-second component.
pub fn truncate(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(0)
}

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimezone(format!("'{}'", s)))
}

/// AM/PM marker chosen on an entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// Build entry text from the parts an appointment form collects: a date, a
/// 12-hour clock hour, a minute, and an AM/PM marker.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidTimeFormat`] if the hour is not in `1..=12`
/// or the minute is not in `0..=59`.
pub fn entry_from_parts(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    meridiem: Meridiem,
) -> Result<String> {
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(ScheduleError::InvalidTimeFormat(format!(
            "{hour}:{minute:02} is not a 12-hour clock time"
        )));
    }
    let marker = match meridiem {
        Meridiem::Am => "AM",
        Meridiem::Pm => "PM",
    };
    Ok(format!(
        "{} {hour}:{minute:02} {marker}",
        date.format("%m/%d/%y")
    ))
}

fn localize(naive: NaiveDateTime, zone: Tz) -> Result<DateTime<Utc>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Fall-back repeats an hour; take the first occurrence.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(ScheduleError::InvalidTimeFormat(format!(
            "{} does not exist in {} (DST gap)",
            naive,
            zone.name()
        ))),
    }
}

/// Serde adapter writing `DateTime<Utc>` in the canonical storage format.
pub mod storage_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_storage(instant))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_storage(&s).map_err(serde::de::Error::custom)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
