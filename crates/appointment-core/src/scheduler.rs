//! Validate-then-commit over an [`AppointmentStore`].
//!
//! A candidate reaches the store only after every check passes; rejected
//! candidates leave the store untouched.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::appointment::{Appointment, AppointmentId, NewAppointment};
use crate::config::SchedulingConfig;
use crate::conflict::validate_appointment;
use crate::error::{Result, ScheduleError};
use crate::hours::BusinessHours;
use crate::store::AppointmentStore;

#[derive(Debug)]
pub struct Scheduler<S> {
    store: S,
    hours: BusinessHours,
    reminder_window: Duration,
}

impl<S: AppointmentStore> Scheduler<S> {
    /// Default business hours and a 15-minute reminder window.
    pub fn new(store: S) -> Self {
        Self {
            store,
            hours: BusinessHours::default(),
            reminder_window: Duration::minutes(15),
        }
    }

    pub fn from_config(store: S, config: &SchedulingConfig) -> Result<Self> {
        Ok(Self {
            store,
            hours: config.business_hours()?,
            reminder_window: config.reminder_window()?,
        })
    }

    pub fn hours(&self) -> &BusinessHours {
        &self.hours
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validate and insert a new appointment.
    pub fn schedule(&mut self, appointment: NewAppointment) -> Result<AppointmentId> {
        validate_appointment(&appointment.interval, None, &self.store, &self.hours)?;
        let id = self.store.create(appointment)?;
        info!(%id, "appointment scheduled");
        Ok(id)
    }

    /// Validate and update an existing appointment, ignoring its own stored slot.
    pub fn reschedule(&mut self, appointment: Appointment) -> Result<()> {
        let id = appointment.id;
        validate_appointment(appointment.interval(), Some(id), &self.store, &self.hours)?;
        self.store.update(appointment)?;
        info!(%id, "appointment rescheduled");
        Ok(())
    }

    pub fn cancel(&mut self, id: AppointmentId) -> Result<()> {
        self.store.delete(id)?;
        info!(%id, "appointment cancelled");
        Ok(())
    }

    /// The appointment in progress at `now` (`start <= now < end`), if any.
    pub fn current_appointment(&self, now: DateTime<Utc>) -> Result<Option<Appointment>> {
        let found = self
            .store
            .list_between(now, shift(now, Duration::seconds(1))?)?
            .into_iter()
            .find(|a| a.interval().contains(&now));
        Ok(found)
    }

    /// Appointments starting within the reminder window after `now`
    /// (`now < start <= now + window`).
    pub fn upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Appointment>> {
        let horizon = shift(now, self.reminder_window)?;
        let found = self
            .store
            .list_between(now, shift(horizon, Duration::seconds(1))?)?
            .into_iter()
            .filter(|a| {
                let start = a.interval().start;
                now < start && start <= horizon
            })
            .collect();
        Ok(found)
    }

    /// Appointments intersecting `[from, to)`, ordered by start.
    pub fn in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Appointment>> {
        Ok(self.store.list_between(from, to)?)
    }
}

fn shift(instant: DateTime<Utc>, by: Duration) -> Result<DateTime<Utc>> {
    instant.checked_add_signed(by).ok_or_else(|| {
        ScheduleError::OutOfRange(format!("{instant} + {by}"))
    })
}
