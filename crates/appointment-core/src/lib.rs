//! # appointment-core
//!
//! Time normalization and conflict detection for office appointments.
//!
//! Appointment times move between three zones: the viewer's local zone, the
//! fixed business zone (`America/New_York`) where the 08:00–22:00 operating
//! window is evaluated, and canonical UTC for storage. A candidate appointment
//! is legal when it is ordered, both of its endpoints fall inside business
//! hours, and it does not overlap any other stored appointment.
//!
//! ## Modules
//!
//! - [`time`] — Zone conversion, canonical storage and display formats
//! - [`hours`] — The daily business-hours window
//! - [`interval`] — Candidate intervals and half-open overlap
//! - [`appointment`] — Appointment records
//! - [`store`] — The storage collaborator trait and an in-memory store
//! - [`conflict`] — Validation of a candidate against hours and stored appointments
//! - [`scheduler`] — Validate-then-commit and reminder queries
//! - [`config`] — TOML configuration
//! - [`error`] — Error types

pub mod appointment;
pub mod config;
pub mod conflict;
pub mod error;
pub mod hours;
pub mod interval;
pub mod scheduler;
pub mod store;
pub mod time;

pub use appointment::{Appointment, AppointmentId, NewAppointment};
pub use config::SchedulingConfig;
pub use conflict::{check_candidates, validate_appointment};
pub use error::{ScheduleError, StoreError};
pub use hours::BusinessHours;
pub use interval::AppointmentInterval;
pub use scheduler::Scheduler;
pub use store::{AppointmentStore, InMemoryStore};
pub use time::{
    combine_date_and_time, format_for_display, normalize_for_storage, to_business_zone,
    to_canonical, ZonedFormat, BUSINESS_ZONE,
};
