//! The storage collaborator the validator queries.
//!
//! All instants crossing this boundary are canonical UTC.
//!
//! Implementations backed by SQL must bind interval bounds as query
//! parameters, never interpolate them into query text. They must also run the
//! overlap query and the following insert or update inside one serializable
//! transaction (or retry on an optimistic-concurrency failure). The validator
//! cannot close the window between check and commit on its own.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use crate::appointment::{Appointment, AppointmentId, NewAppointment};
use crate::error::StoreError;
use crate::interval::AppointmentInterval;

pub trait AppointmentStore {
    /// Whether any stored appointment other than `exclude` satisfies
    /// `end > interval.start AND start < interval.end`.
    fn exists_overlap(
        &self,
        interval: &AppointmentInterval,
        exclude: Option<AppointmentId>,
    ) -> Result<bool, StoreError>;

    fn create(&mut self, appointment: NewAppointment) -> Result<AppointmentId, StoreError>;

    fn update(&mut self, appointment: Appointment) -> Result<(), StoreError>;

    fn delete(&mut self, id: AppointmentId) -> Result<(), StoreError>;

    /// Appointments intersecting `[from, to)`, ordered by start.
    fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError>;
}

/// A map-backed store.
///
/// Can be switched offline to stand in for a lost database connection; every
/// call then fails with [`StoreError::Unavailable`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    appointments: BTreeMap<AppointmentId, Appointment>,
    next_id: u64,
    offline: bool,
    overlap_queries: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with already-persisted appointments. New ids continue
    /// after the largest one seen.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if two appointments share an id.
    pub fn from_appointments(
        appointments: impl IntoIterator<Item = Appointment>,
    ) -> Result<Self, StoreError> {
        let mut seeded = BTreeMap::new();
        for appointment in appointments {
            let id = appointment.id;
            if seeded.insert(id, appointment).is_some() {
                return Err(StoreError::DuplicateId(id));
            }
        }
        let next_id = seeded.keys().next_back().map_or(0, |id: &AppointmentId| id.0);
        Ok(Self {
            appointments: seeded,
            next_id,
            ..Self::default()
        })
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn get(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments.get(&id)
    }

    pub fn appointments(&self) -> impl Iterator<Item = &Appointment> {
        self.appointments.values()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// How many overlap queries this store has answered or refused.
    pub fn overlap_queries(&self) -> usize {
        self.overlap_queries.load(Ordering::Relaxed)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Unavailable("connection lost".to_string()))
        } else {
            Ok(())
        }
    }
}

impl AppointmentStore for InMemoryStore {
    fn exists_overlap(
        &self,
        interval: &AppointmentInterval,
        exclude: Option<AppointmentId>,
    ) -> Result<bool, StoreError> {
        self.overlap_queries.fetch_add(1, Ordering::Relaxed);
        self.ensure_online()?;
        Ok(self
            .appointments
            .values()
            .filter(|a| Some(a.id) != exclude)
            .any(|a| a.interval().overlaps(interval)))
    }

    fn create(&mut self, appointment: NewAppointment) -> Result<AppointmentId, StoreError> {
        self.ensure_online()?;
        self.next_id += 1;
        let id = AppointmentId(self.next_id);
        self.appointments.insert(id, appointment.into_stored(id));
        Ok(id)
    }

    fn update(&mut self, appointment: Appointment) -> Result<(), StoreError> {
        self.ensure_online()?;
        match self.appointments.get_mut(&appointment.id) {
            Some(slot) => {
                *slot = appointment;
                Ok(())
            }
            None => Err(StoreError::NotFound(appointment.id)),
        }
    }

    fn delete(&mut self, id: AppointmentId) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.appointments
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.ensure_online()?;
        let window = AppointmentInterval { start: from, end: to };
        let mut found: Vec<Appointment> = self
            .appointments
            .values()
            .filter(|a| a.interval().overlaps(&window))
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.interval().start, a.id));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_storage;

    fn slot(start: &str, end: &str) -> AppointmentInterval {
        AppointmentInterval::new(parse_storage(start).unwrap(), parse_storage(end).unwrap())
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let mut store = InMemoryStore::new();
        let a = store
            .create(NewAppointment::at(slot("2024-03-01 14:00:00", "2024-03-01 15:00:00")))
            .unwrap();
        let b = store
            .create(NewAppointment::at(slot("2024-03-01 15:00:00", "2024-03-01 16:00:00")))
            .unwrap();
        assert_eq!(a, AppointmentId(1));
        assert_eq!(b, AppointmentId(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_seeded_ids_continue_after_max() {
        let seeded = NewAppointment::at(slot("2024-03-01 14:00:00", "2024-03-01 15:00:00"))
            .into_stored(AppointmentId(40));
        let mut store = InMemoryStore::from_appointments(vec![seeded]).unwrap();
        let id = store
            .create(NewAppointment::at(slot("2024-03-02 14:00:00", "2024-03-02 15:00:00")))
            .unwrap();
        assert_eq!(id, AppointmentId(41));
    }

    #[test]
    fn test_seeding_rejects_duplicate_ids() {
        let first = NewAppointment::at(slot("2024-03-01 14:00:00", "2024-03-01 15:00:00"))
            .into_stored(AppointmentId(1));
        let second = NewAppointment::at(slot("2024-03-01 16:00:00", "2024-03-01 17:00:00"))
            .into_stored(AppointmentId(1));
        let err = InMemoryStore::from_appointments(vec![first, second]).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(AppointmentId(1)));
        assert_eq!(err.to_string(), "appointment #1 appears more than once");
    }

    #[test]
    fn test_exists_overlap_honours_exclusion() {
        let mut store = InMemoryStore::new();
        let booked = slot("2024-03-01 14:00:00", "2024-03-01 15:00:00");
        let id = store.create(NewAppointment::at(booked)).unwrap();
        assert!(store.exists_overlap(&booked, None).unwrap());
        assert!(!store.exists_overlap(&booked, Some(id)).unwrap());
        assert!(!store
            .exists_overlap(&slot("2024-03-01 15:00:00", "2024-03-01 16:00:00"), None)
            .unwrap());
        assert_eq!(store.overlap_queries(), 3);
    }

    #[test]
    fn test_empty_store_reports_no_overlap() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(
            store.exists_overlap(&slot("2024-03-01 14:00:00", "2024-03-01 15:00:00"), None),
            Ok(false)
        );
    }

    #[test]
    fn test_offline_store_fails_instead_of_reporting_empty() {
        let mut store = InMemoryStore::new();
        store.set_offline(true);
        let result = store.exists_overlap(&slot("2024-03-01 14:00:00", "2024-03-01 15:00:00"), None);
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_update_and_delete_unknown_id() {
        let mut store = InMemoryStore::new();
        let ghost = NewAppointment::at(slot("2024-03-01 14:00:00", "2024-03-01 15:00:00"))
            .into_stored(AppointmentId(9));
        assert_eq!(store.update(ghost), Err(StoreError::NotFound(AppointmentId(9))));
        assert_eq!(store.delete(AppointmentId(9)), Err(StoreError::NotFound(AppointmentId(9))));
    }

    #[test]
    fn test_list_between_is_half_open_and_sorted() {
        let mut store = InMemoryStore::new();
        let late = store
            .create(NewAppointment::at(slot("2024-03-01 18:00:00", "2024-03-01 19:00:00")))
            .unwrap();
        let early = store
            .create(NewAppointment::at(slot("2024-03-01 14:00:00", "2024-03-01 15:00:00")))
            .unwrap();
        store
            .create(NewAppointment::at(slot("2024-03-01 20:00:00", "2024-03-01 21:00:00")))
            .unwrap();

        let found = store
            .list_between(
                parse_storage("2024-03-01 14:30:00").unwrap(),
                parse_storage("2024-03-01 20:00:00").unwrap(),
            )
            .unwrap();
        let ids: Vec<_> = found.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![early, late]);
    }
}
