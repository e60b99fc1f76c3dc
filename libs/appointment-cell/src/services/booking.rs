// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use directory_cell::SharedDirectory;
use security_cell::{AuditLog, ValidationService};
use shared_models::{Appointment, AppointmentStatus, Identity};
use shared_utils::Clock;

use crate::models::AppointmentError;
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;

pub const EMERGENCY_ID_PREFIX: &str = "EMG-";

/// Booking, rescheduling, cancellation and completion.
///
/// Every check-then-act sequence runs under one write guard on the shared
/// directory, and its audit entry is written before the guard is released.
pub struct AppointmentBookingService {
    directory: SharedDirectory,
    audit: Arc<AuditLog>,
    clock: Arc<dyn Clock>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
    validation: ValidationService,
}

impl AppointmentBookingService {
    pub fn new(directory: SharedDirectory, audit: Arc<AuditLog>, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory,
            audit,
            clock,
            conflict_service: ConflictDetectionService::new(),
            lifecycle_service: AppointmentLifecycleService::new(),
            validation: ValidationService::default(),
        }
    }

    /// Books `patient_id` with `doctor_id` at `date_time`.
    #[instrument(skip(self))]
    pub async fn book_appointment(
        &self,
        patient_id: &str,
        doctor_id: &str,
        date_time: &str,
    ) -> Result<Appointment, AppointmentError> {
        self.validation.validate_slot(date_time)?;

        let mut directory = self.directory.write().await;

        if directory.find_doctor(doctor_id).is_none() {
            warn!("Booking rejected, unknown doctor {}", doctor_id);
            return Err(AppointmentError::DoctorNotFound(doctor_id.to_string()));
        }
        if directory.find_patient(patient_id).is_none() {
            warn!("Booking rejected, unknown patient {}", patient_id);
            return Err(AppointmentError::PatientNotFound(patient_id.to_string()));
        }
        self.conflict_service
            .ensure_slot_free(&directory, doctor_id, date_time, None)?;

        let appointment = Appointment::scheduled(
            Uuid::new_v4().to_string(),
            doctor_id,
            patient_id,
            date_time,
            false,
        );
        directory.insert_appointment(appointment.clone())?;

        self.audit
            .record_or_warn(format!("Booked appointment: {}", appointment.id), patient_id)
            .await;
        info!("Appointment {} booked with doctor {} at {}", appointment.id, doctor_id, date_time);

        Ok(appointment)
    }

    /// Moves a scheduled appointment to a new slot with the same doctor.
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn reschedule_appointment(
        &self,
        actor: &Identity,
        appointment_id: &str,
        new_date_time: &str,
    ) -> Result<Appointment, AppointmentError> {
        self.validation.validate_slot(new_date_time)?;

        let mut directory = self.directory.write().await;

        let current = directory
            .find_appointment(appointment_id)
            .cloned()
            .ok_or_else(|| AppointmentError::NotFound(appointment_id.to_string()))?;
        self.lifecycle_service.authorize_reschedule(actor, &current)?;
        if current.status != AppointmentStatus::Scheduled {
            warn!("Reschedule rejected, appointment {} is {}", appointment_id, current.status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current.status,
                to: AppointmentStatus::Scheduled,
            });
        }

        self.conflict_service.ensure_slot_free(
            &directory,
            &current.doctor_id,
            new_date_time,
            Some(appointment_id),
        )?;
        let previous = directory.move_appointment(appointment_id, new_date_time)?;

        self.audit
            .record_or_warn(format!("Appointment rescheduled: {}", appointment_id), &actor.user_id)
            .await;
        info!("Appointment {} moved from {} to {}", appointment_id, previous, new_date_time);

        Ok(Appointment {
            date_time: new_date_time.to_string(),
            ..current
        })
    }

    /// Cancels with one of the three cancellation statuses.
    #[instrument(skip(self, actor, note), fields(actor_id = %actor.user_id))]
    pub async fn cancel_appointment(
        &self,
        actor: &Identity,
        appointment_id: &str,
        status: AppointmentStatus,
        note: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        if let Some(note) = note.as_deref() {
            self.validation.validate_free_text("note", note)?;
        }

        let mut directory = self.directory.write().await;

        let current = directory
            .find_appointment(appointment_id)
            .cloned()
            .ok_or_else(|| AppointmentError::NotFound(appointment_id.to_string()))?;
        self.lifecycle_service.authorize_cancel(actor, &current, status)?;
        self.lifecycle_service
            .validate_status_transition(current.status, status)?;

        directory.set_appointment_status(appointment_id, status, note.clone())?;

        let reason = note.as_deref().filter(|n| !n.is_empty()).unwrap_or(status.as_str());
        self.audit
            .record_or_warn(
                format!("Appointment cancelled: {} Reason: {}", appointment_id, reason),
                &actor.user_id,
            )
            .await;
        info!("Appointment {} cancelled as {}", appointment_id, status);

        Ok(Appointment {
            status,
            note: note.or(current.note.clone()),
            ..current
        })
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn complete_appointment(
        &self,
        actor: &Identity,
        appointment_id: &str,
    ) -> Result<Appointment, AppointmentError> {
        let mut directory = self.directory.write().await;

        let current = directory
            .find_appointment(appointment_id)
            .cloned()
            .ok_or_else(|| AppointmentError::NotFound(appointment_id.to_string()))?;
        self.lifecycle_service.authorize_complete(actor, &current)?;
        self.lifecycle_service
            .validate_status_transition(current.status, AppointmentStatus::Completed)?;

        directory.set_appointment_status(appointment_id, AppointmentStatus::Completed, None)?;

        self.audit
            .record_or_warn(format!("Appointment completed: {}", appointment_id), &actor.user_id)
            .await;
        info!("Appointment {} completed", appointment_id);

        Ok(Appointment {
            status: AppointmentStatus::Completed,
            ..current
        })
    }

    /// Creates an emergency appointment at the current minute with the first
    /// on-duty doctor who is free then. Nothing is created on failure.
    #[instrument(skip(self))]
    pub async fn request_emergency(&self, patient_id: &str) -> Result<Appointment, AppointmentError> {
        let now = self.clock.current_slot();
        let mut directory = self.directory.write().await;

        if directory.find_patient(patient_id).is_none() {
            return Err(AppointmentError::PatientNotFound(patient_id.to_string()));
        }
        let doctor_id = match directory.first_available_on_duty_doctor(&now) {
            Some(doctor) => doctor.id.clone(),
            None if directory.doctors().iter().any(|d| d.on_emergency_duty) => {
                warn!("Emergency request from {}, every on-duty doctor is busy at {}", patient_id, now);
                return Err(AppointmentError::NoOnDutyDoctorFree { date_time: now });
            }
            None => {
                warn!("Emergency request from {} with no doctor on duty", patient_id);
                return Err(AppointmentError::NoDoctorAvailable);
            }
        };

        let appointment = Appointment::scheduled(
            format!("{}{}", EMERGENCY_ID_PREFIX, Uuid::new_v4()),
            doctor_id,
            patient_id,
            now,
            true,
        );
        directory.insert_appointment(appointment.clone())?;

        self.audit
            .record_or_warn(
                format!("Requested emergency appointment: {}", appointment.id),
                patient_id,
            )
            .await;
        info!(
            "Emergency appointment {} created with doctor {}",
            appointment.id, appointment.doctor_id
        );

        Ok(appointment)
    }

    /// Appends `slot` to the doctor's advertised availability.
    #[instrument(skip(self))]
    pub async fn update_availability(&self, doctor_id: &str, slot: &str) -> Result<(), AppointmentError> {
        self.validation.validate_slot(slot)?;

        let mut directory = self.directory.write().await;
        directory.append_available_slot(doctor_id, slot)?;

        self.audit.record_or_warn("Updated availability", doctor_id).await;
        debug!("Doctor {} now lists slot {}", doctor_id, slot);
        Ok(())
    }

    pub async fn appointments_for_doctor(&self, doctor_id: &str) -> Vec<Appointment> {
        let directory = self.directory.read().await;
        directory.appointments_for_doctor(doctor_id).cloned().collect()
    }

    pub async fn appointments_for_patient(&self, patient_id: &str) -> Vec<Appointment> {
        let directory = self.directory.read().await;
        directory
            .appointments_for_patient(patient_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn is_slot_available(&self, doctor_id: &str, date_time: &str) -> bool {
        self.directory.read().await.is_slot_available(doctor_id, date_time)
    }
}
