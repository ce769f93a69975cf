//! Appointment records as the host application persists them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interval::AppointmentInterval;

/// Store-assigned appointment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub u64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "appointment #{}", self.0)
    }
}

/// An appointment that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub customer_id: u64,
    #[serde(default)]
    pub contact_id: u64,
    #[serde(default)]
    pub user_id: u64,
    #[serde(flatten)]
    pub interval: AppointmentInterval,
}

impl NewAppointment {
    /// A bare appointment with only a time slot.
    pub fn at(interval: AppointmentInterval) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            location: String::new(),
            kind: String::new(),
            customer_id: 0,
            contact_id: 0,
            user_id: 0,
            interval,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn into_stored(self, id: AppointmentId) -> Appointment {
        Appointment { id, details: self }
    }
}

/// A stored appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    #[serde(flatten)]
    pub details: NewAppointment,
}

impl Appointment {
    pub fn interval(&self) -> &AppointmentInterval {
        &self.details.interval
    }

    pub fn title(&self) -> &str {
        &self.details.title
    }
}
