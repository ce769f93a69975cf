//! Decide whether a candidate interval may be committed.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. ordering (`start < end`)
//! 2. business hours, for the start and the end independently
//! 3. overlap with any other appointment in the system
//!
//! The overlap domain is global: two appointments conflict whenever their
//! intervals intersect, regardless of customer, contact, or user.

use tracing::{debug, warn};

use crate::appointment::AppointmentId;
use crate::error::{Result, ScheduleError};
use crate::hours::BusinessHours;
use crate::interval::AppointmentInterval;
use crate::store::AppointmentStore;

/// Validate `candidate` against business hours and the appointments in `store`.
///
/// Pass the appointment's own id as `exclude_id` when rescheduling, so its
/// previously stored interval is not counted as a conflict.
///
/// # Errors
///
/// - [`ScheduleError::InvalidInterval`] if `end` is not after `start`. The
///   store is not queried.
/// - [`ScheduleError::OutsideBusinessHours`] if either endpoint falls outside
///   the window for its own day. The store is not queried.
/// - [`ScheduleError::OverlapConflict`] if another appointment intersects.
/// - [`ScheduleError::StoreUnavailable`] if the store cannot answer.
pub fn validate_appointment<S>(
    candidate: &AppointmentInterval,
    exclude_id: Option<AppointmentId>,
    store: &S,
    hours: &BusinessHours,
) -> Result<()>
where
    S: AppointmentStore + ?Sized,
{
    check_window(candidate, hours)?;

    match store.exists_overlap(candidate, exclude_id) {
        Ok(false) => {
            debug!(start = %candidate.start, end = %candidate.end, "no overlapping appointment");
            Ok(())
        }
        Ok(true) => {
            debug!(start = %candidate.start, end = %candidate.end, "overlap conflict");
            Err(ScheduleError::OverlapConflict { conflicting: None })
        }
        Err(err) => {
            warn!(error = %err, "overlap query failed");
            Err(ScheduleError::StoreUnavailable(err))
        }
    }
}

/// Validate `candidate` against an in-memory set of existing appointments.
///
/// Same rules as [`validate_appointment`]; the error names the first
/// conflicting appointment found.
pub fn check_candidates<'a, I>(
    candidate: &AppointmentInterval,
    exclude_id: Option<AppointmentId>,
    existing: I,
    hours: &BusinessHours,
) -> Result<()>
where
    I: IntoIterator<Item = (AppointmentId, &'a AppointmentInterval)>,
{
    check_window(candidate, hours)?;

    let conflict = existing
        .into_iter()
        .filter(|(id, _)| Some(*id) != exclude_id)
        .find(|(_, interval)| interval.overlaps(candidate));

    match conflict {
        Some((id, _)) => {
            debug!(%id, "overlap conflict");
            Err(ScheduleError::OverlapConflict {
                conflicting: Some(id),
            })
        }
        None => Ok(()),
    }
}

/// Ordering and business-hours checks; no store access.
fn check_window(candidate: &AppointmentInterval, hours: &BusinessHours) -> Result<()> {
    candidate.ensure_ordered()?;

    for endpoint in [candidate.start, candidate.end] {
        if !hours.contains(&endpoint)? {
            debug!(%endpoint, "endpoint outside business hours");
            return Err(ScheduleError::OutsideBusinessHours { instant: endpoint });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::NewAppointment;
    use crate::store::InMemoryStore;
    use crate::time::{to_canonical, BUSINESS_ZONE};
    use proptest::prelude::*;

    /// An interval from business-zone entry text.
    fn eastern(start: &str, end: &str) -> AppointmentInterval {
        AppointmentInterval::new(
            to_canonical(start, BUSINESS_ZONE).unwrap(),
            to_canonical(end, BUSINESS_ZONE).unwrap(),
        )
    }

    fn store_with(slots: &[AppointmentInterval]) -> (InMemoryStore, Vec<AppointmentId>) {
        let mut store = InMemoryStore::new();
        let ids = slots
            .iter()
            .map(|s| store.create(NewAppointment::at(*s)).unwrap())
            .collect();
        (store, ids)
    }

    // ── Ordering ────────────────────────────────────────────────────────

    #[test]
    fn test_inverted_interval_rejected_before_store_query() {
        let (store, _) = store_with(&[eastern("03/01/24 9:00 AM", "03/01/24 10:00 AM")]);
        let candidate = eastern("03/01/24 11:00 AM", "03/01/24 10:00 AM");
        let err = validate_appointment(&candidate, None, &store, &BusinessHours::default())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInterval { .. }));
        assert_eq!(store.overlap_queries(), 0);
    }

    // ── Business hours ──────────────────────────────────────────────────

    #[test]
    fn test_end_past_close_rejected() {
        let store = InMemoryStore::new();
        let candidate = eastern("03/01/24 9:45 PM", "03/01/24 10:15 PM");
        let err = validate_appointment(&candidate, None, &store, &BusinessHours::default())
            .unwrap_err();
        match err {
            ScheduleError::OutsideBusinessHours { instant } => assert_eq!(instant, candidate.end),
            other => panic!("expected OutsideBusinessHours, got {other:?}"),
        }
        assert_eq!(store.overlap_queries(), 0);
    }

    #[test]
    fn test_start_at_open_and_end_at_close_accepted() {
        let store = InMemoryStore::new();
        let hours = BusinessHours::default();
        let morning = eastern("03/01/24 8:00 AM", "03/01/24 9:00 AM");
        let evening = eastern("03/01/24 9:00 PM", "03/01/24 10:00 PM");
        assert!(validate_appointment(&morning, None, &store, &hours).is_ok());
        assert!(validate_appointment(&evening, None, &store, &hours).is_ok());
    }

    #[test]
    fn test_one_second_before_open_rejected() {
        let store = InMemoryStore::new();
        let open = to_canonical("03/01/24 8:00 AM", BUSINESS_ZONE).unwrap();
        let candidate = AppointmentInterval::new(
            open - chrono::Duration::seconds(1),
            open + chrono::Duration::hours(1),
        );
        let err = validate_appointment(&candidate, None, &store, &BusinessHours::default())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::OutsideBusinessHours { .. }));
    }

    #[test]
    fn test_one_second_after_close_rejected() {
        let store = InMemoryStore::new();
        let close = to_canonical("03/01/24 10:00 PM", BUSINESS_ZONE).unwrap();
        let candidate = AppointmentInterval::new(
            close - chrono::Duration::hours(1),
            close + chrono::Duration::seconds(1),
        );
        let err = validate_appointment(&candidate, None, &store, &BusinessHours::default())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::OutsideBusinessHours { .. }));
    }

    #[test]
    fn test_endpoints_are_checked_against_their_own_day() {
        // Each endpoint is inside its own day's window, so the span over the
        // closed night is not rejected.
        let store = InMemoryStore::new();
        let candidate = eastern("03/01/24 9:00 PM", "03/02/24 9:00 AM");
        assert!(validate_appointment(&candidate, None, &store, &BusinessHours::default()).is_ok());
    }

    // ── Overlap ─────────────────────────────────────────────────────────

    #[test]
    fn test_back_to_back_accepted_and_overlap_rejected() {
        let (store, _) = store_with(&[eastern("03/01/24 10:00 AM", "03/01/24 11:00 AM")]);
        let hours = BusinessHours::default();

        let touching = eastern("03/01/24 11:00 AM", "03/01/24 12:00 PM");
        assert!(validate_appointment(&touching, None, &store, &hours).is_ok());

        let overlapping = eastern("03/01/24 10:59 AM", "03/01/24 12:00 PM");
        let err = validate_appointment(&overlapping, None, &store, &hours).unwrap_err();
        assert!(matches!(err, ScheduleError::OverlapConflict { .. }));
    }

    #[test]
    fn test_self_is_excluded_on_update() {
        let slot = eastern("03/01/24 10:00 AM", "03/01/24 11:00 AM");
        let (store, ids) = store_with(&[slot]);
        let hours = BusinessHours::default();
        assert!(validate_appointment(&slot, Some(ids[0]), &store, &hours).is_ok());
        assert!(validate_appointment(&slot, None, &store, &hours).is_err());
    }

    #[test]
    fn test_unavailable_store_is_not_treated_as_no_conflict() {
        let (mut store, _) = store_with(&[]);
        store.set_offline(true);
        let candidate = eastern("03/01/24 10:00 AM", "03/01/24 11:00 AM");
        let err = validate_appointment(&candidate, None, &store, &BusinessHours::default())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::StoreUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_works_through_trait_object() {
        let (store, _) = store_with(&[eastern("03/01/24 10:00 AM", "03/01/24 11:00 AM")]);
        let dyn_store: &dyn AppointmentStore = &store;
        let candidate = eastern("03/01/24 10:30 AM", "03/01/24 11:30 AM");
        assert!(validate_appointment(&candidate, None, dyn_store, &BusinessHours::default())
            .is_err());
    }

    // ── check_candidates ────────────────────────────────────────────────

    #[test]
    fn test_check_candidates_names_the_conflict() {
        let existing = [
            (AppointmentId(1), eastern("03/01/24 9:00 AM", "03/01/24 10:00 AM")),
            (AppointmentId(2), eastern("03/01/24 1:00 PM", "03/01/24 2:00 PM")),
        ];
        let candidate = eastern("03/01/24 1:30 PM", "03/01/24 3:00 PM");
        let err = check_candidates(
            &candidate,
            None,
            existing.iter().map(|(id, i)| (*id, i)),
            &BusinessHours::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Appointment overlaps with an existing appointment (appointment #2)"
        );
        assert!(matches!(
            err,
            ScheduleError::OverlapConflict {
                conflicting: Some(AppointmentId(2))
            }
        ));
    }

    #[test]
    fn test_check_candidates_excludes_self() {
        let slot = eastern("03/01/24 9:00 AM", "03/01/24 10:00 AM");
        let existing = [(AppointmentId(5), slot)];
        let result = check_candidates(
            &slot,
            Some(AppointmentId(5)),
            existing.iter().map(|(id, i)| (*id, i)),
            &BusinessHours::default(),
        );
        assert!(result.is_ok());
    }

    proptest! {
        #[test]
        fn start_not_before_end_is_always_invalid(offset in 0i64..86_400, gap in 0i64..7_200) {
            let base = to_canonical("03/01/24 8:00 AM", BUSINESS_ZONE).unwrap();
            let a = base + chrono::Duration::seconds(offset);
            let b = a + chrono::Duration::seconds(gap);
            let store = InMemoryStore::new();
            let result = validate_appointment(
                &AppointmentInterval::new(b, a),
                None,
                &store,
                &BusinessHours::default(),
            );
            prop_assert!(
                matches!(result, Err(ScheduleError::InvalidInterval { .. })),
                "expected InvalidInterval, got {:?}",
                result
            );
        }
    }
}
