// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use shared_models::{Appointment, AppointmentStatus, Identity, Role};

use crate::models::AppointmentError;

/// Status transitions and who may trigger them.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        AppointmentStatus::ALL
            .into_iter()
            .filter(|next| current_status.can_transition_to(*next))
            .collect()
    }

    /// Patients cancel their own appointments as `patient-cancelled`; admins
    /// may use any cancellation status. Doctors never cancel.
    pub fn authorize_cancel(
        &self,
        actor: &Identity,
        appointment: &Appointment,
        status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        if !status.is_cancellation() {
            return Err(AppointmentError::ValidationError(format!(
                "{} is not a cancellation status",
                status
            )));
        }

        match actor.role {
            Role::Admin => Ok(()),
            Role::Patient if appointment.patient_id != actor.user_id => Err(AppointmentError::Unauthorized(
                "patients may only cancel their own appointments".to_string(),
            )),
            Role::Patient if status != AppointmentStatus::PatientCancelled => Err(
                AppointmentError::Unauthorized(format!("patients may not cancel with status {}", status)),
            ),
            Role::Patient => Ok(()),
            Role::Doctor => Err(AppointmentError::Unauthorized(
                "doctors may not cancel appointments".to_string(),
            )),
        }
    }

    /// The owning patient or an admin.
    pub fn authorize_reschedule(&self, actor: &Identity, appointment: &Appointment) -> Result<(), AppointmentError> {
        if actor.is_admin() || actor.is(Role::Patient, &appointment.patient_id) {
            return Ok(());
        }
        Err(AppointmentError::Unauthorized(
            "only the booking patient or an admin may reschedule".to_string(),
        ))
    }

    /// The appointment's doctor or an admin.
    pub fn authorize_complete(&self, actor: &Identity, appointment: &Appointment) -> Result<(), AppointmentError> {
        if actor.is_admin() || actor.is(Role::Doctor, &appointment.doctor_id) {
            return Ok(());
        }
        Err(AppointmentError::Unauthorized(
            "only the assigned doctor or an admin may complete".to_string(),
        ))
    }

    /// Doctors switch only themselves; admins may switch anyone.
    pub fn authorize_emergency_duty(&self, actor: &Identity, doctor_id: &str) -> Result<(), AppointmentError> {
        if actor.is_admin() || actor.is(Role::Doctor, doctor_id) {
            return Ok(());
        }
        Err(AppointmentError::Unauthorized(
            "doctors may only mark themselves for emergency duty".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment() -> Appointment {
        Appointment::scheduled("A1", "D1", "P1", "2025-04-05 10:00", false)
    }

    #[test]
    fn test_only_scheduled_has_transitions() {
        let service = AppointmentLifecycleService::new();
        assert_eq!(service.get_valid_transitions(AppointmentStatus::Scheduled).len(), 4);
        for status in AppointmentStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(service.get_valid_transitions(status).is_empty());
        }
        assert!(service
            .validate_status_transition(AppointmentStatus::Completed, AppointmentStatus::Cancelled)
            .is_err());
    }

    #[test]
    fn test_cancel_permissions_by_role() {
        let service = AppointmentLifecycleService::new();
        let appt = appointment();
        let owner = Identity::new("P1", "Pat", Role::Patient);
        let other = Identity::new("P2", "Other", Role::Patient);
        let doctor = Identity::new("D1", "Doc", Role::Doctor);
        let admin = Identity::new("admin1", "Admin", Role::Admin);

        assert!(service.authorize_cancel(&owner, &appt, AppointmentStatus::PatientCancelled).is_ok());
        assert!(service.authorize_cancel(&owner, &appt, AppointmentStatus::Cancelled).is_err());
        assert!(service.authorize_cancel(&other, &appt, AppointmentStatus::PatientCancelled).is_err());
        assert!(service.authorize_cancel(&doctor, &appt, AppointmentStatus::Cancelled).is_err());
        assert!(service.authorize_cancel(&admin, &appt, AppointmentStatus::EmergencyCancelled).is_ok());
        assert!(matches!(
            service.authorize_cancel(&admin, &appt, AppointmentStatus::Completed),
            Err(AppointmentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_complete_and_duty_permissions() {
        let service = AppointmentLifecycleService::new();
        let appt = appointment();

        assert!(service.authorize_complete(&Identity::new("D1", "Doc", Role::Doctor), &appt).is_ok());
        assert!(service.authorize_complete(&Identity::new("D2", "Doc", Role::Doctor), &appt).is_err());
        assert!(service.authorize_complete(&Identity::new("P1", "Pat", Role::Patient), &appt).is_err());

        assert!(service.authorize_emergency_duty(&Identity::new("D1", "Doc", Role::Doctor), "D1").is_ok());
        assert!(service.authorize_emergency_duty(&Identity::new("D1", "Doc", Role::Doctor), "D2").is_err());
        assert!(service.authorize_emergency_duty(&Identity::new("admin1", "A", Role::Admin), "D2").is_ok());
    }
}
