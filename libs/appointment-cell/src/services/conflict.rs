use tracing::{debug, warn};

use directory_cell::Directory;
use shared_models::AppointmentStatus;

use crate::models::AppointmentError;

/// Slot checks against the directory. Callers pass a directory borrowed
/// from the write guard they will mutate under.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConflictDetectionService;

impl ConflictDetectionService {
    pub fn new() -> Self {
        Self
    }

    /// Errors when an active appointment other than `exclude_appointment_id`
    /// already holds `(doctor_id, date_time)`.
    pub fn ensure_slot_free(
        &self,
        directory: &Directory,
        doctor_id: &str,
        date_time: &str,
        exclude_appointment_id: Option<&str>,
    ) -> Result<(), AppointmentError> {
        debug!("Checking conflicts for doctor {} at {}", doctor_id, date_time);

        if directory.is_slot_available_excluding(doctor_id, date_time, exclude_appointment_id) {
            return Ok(());
        }

        warn!("Conflict detected for doctor {} at {}", doctor_id, date_time);
        Err(AppointmentError::SlotNotAvailable {
            doctor_id: doctor_id.to_string(),
            date_time: date_time.to_string(),
        })
    }

    /// IDs of `doctor_id`'s appointments that an emergency switch on `date`
    /// cancels: scheduled, not themselves emergencies, dated that day.
    pub fn same_day_cascade_targets(&self, directory: &Directory, doctor_id: &str, date: &str) -> Vec<String> {
        directory
            .appointments_for_doctor(doctor_id)
            .filter(|a| a.status == AppointmentStatus::Scheduled)
            .filter(|a| !a.is_emergency)
            .filter(|a| a.date() == date)
            .map(|a| a.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::Appointment;
    use shared_utils::test_utils::sample_snapshot;

    fn directory_with(appointments: Vec<Appointment>) -> Directory {
        let mut snapshot = sample_snapshot();
        snapshot.appointments = appointments;
        Directory::from_snapshot(snapshot)
    }

    #[test]
    fn test_ensure_slot_free_honours_exclusion() {
        let directory = directory_with(vec![Appointment::scheduled(
            "A1",
            "D1",
            "P1",
            "2025-04-05 10:00",
            false,
        )]);
        let service = ConflictDetectionService::new();

        assert!(service.ensure_slot_free(&directory, "D1", "2025-04-05 10:00", None).is_err());
        assert!(service
            .ensure_slot_free(&directory, "D1", "2025-04-05 10:00", Some("A1"))
            .is_ok());
        assert!(service.ensure_slot_free(&directory, "D2", "2025-04-05 10:00", None).is_ok());
    }

    #[test]
    fn test_cascade_targets_only_todays_plain_scheduled() {
        let mut cancelled = Appointment::scheduled("A3", "D1", "P2", "2025-04-05 11:00", false);
        cancelled.status = AppointmentStatus::PatientCancelled;
        let directory = directory_with(vec![
            Appointment::scheduled("A1", "D1", "P1", "2025-04-05 10:00", false),
            Appointment::scheduled("A2", "D1", "P1", "2025-04-06 10:00", false),
            cancelled,
            Appointment::scheduled("EMG-A4", "D1", "P2", "2025-04-05 12:00", true),
            Appointment::scheduled("A5", "D2", "P2", "2025-04-05 10:00", false),
        ]);

        let targets = ConflictDetectionService::new().same_day_cascade_targets(&directory, "D1", "2025-04-05");
        assert_eq!(targets, vec!["A1"]);
    }
}
