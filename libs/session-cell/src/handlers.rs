use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use appointment_cell::{AppointmentBookingService, EmergencyDutyService};
use auth_cell::Authenticator;
use directory_cell::SharedDirectory;
use security_cell::{AuditLog, PasswordSecurityService, ValidationService};
use shared_database::SnapshotStore;
use shared_models::{AppError, AppointmentStatus, Doctor, Patient, Role};
use shared_utils::clock::BACKUP_STAMP_FORMAT;
use shared_utils::Clock;

use crate::models::{Operation, OperationOutcome, Session};
use crate::router::is_permitted;

/// Opens sessions and routes each operation to the service that owns it,
/// after checking it against the caller's role table.
pub struct SessionDispatcher {
    directory: SharedDirectory,
    audit: Arc<AuditLog>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn SnapshotStore>,
    authenticator: Authenticator,
    booking: AppointmentBookingService,
    emergency: EmergencyDutyService,
    validation: ValidationService,
}

impl SessionDispatcher {
    pub fn new(
        directory: SharedDirectory,
        audit: Arc<AuditLog>,
        clock: Arc<dyn Clock>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            authenticator: Authenticator::new(directory.clone(), audit.clone()),
            booking: AppointmentBookingService::new(directory.clone(), audit.clone(), clock.clone()),
            emergency: EmergencyDutyService::new(directory.clone(), audit.clone(), clock.clone()),
            validation: ValidationService::default(),
            directory,
            audit,
            clock,
            store,
        }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, user_id: &str, password: &str) -> Result<Session, AppError> {
        let identity = self.authenticator.authenticate(user_id, password).await?;
        Ok(Session::new(identity, self.clock.now()))
    }

    pub async fn logout(&self, session: Session) -> OperationOutcome {
        self.audit.record_or_warn("Logged out", session.user_id()).await;
        info!(session_id = %session.session_id, "User {} logged out", session.user_id());
        OperationOutcome::LoggedOut {
            user_id: session.identity.user_id,
        }
    }

    /// Runs `operation` for the session's user. Anything outside the role's
    /// table fails with `NotPermitted` before touching state.
    #[instrument(skip(self, session), fields(user_id = %session.user_id(), role = %session.role()))]
    pub async fn dispatch(&self, session: &Session, operation: Operation) -> Result<OperationOutcome, AppError> {
        let kind = operation.kind();
        if !is_permitted(session.role(), kind) {
            warn!("{} attempted {} which their role does not allow", session.user_id(), kind);
            return Err(AppError::NotPermitted(format!(
                "{} is not available to {} accounts",
                kind,
                session.role()
            )));
        }
        debug!("Dispatching {}", kind);

        let identity = &session.identity;
        let user_id = identity.user_id.as_str();

        match operation {
            Operation::ViewAppointments => Ok(OperationOutcome::Appointments {
                appointments: self.booking.appointments_for_doctor(user_id).await,
            }),
            Operation::UpdateAvailability { slot } => {
                self.booking.update_availability(user_id, &slot).await?;
                Ok(OperationOutcome::AvailabilityUpdated {
                    doctor_id: user_id.to_string(),
                    slot,
                })
            }
            Operation::MarkEmergencyDuty { doctor_id } => {
                let doctor_id = match (doctor_id, identity.role) {
                    (Some(doctor_id), _) => doctor_id,
                    (None, Role::Doctor) => user_id.to_string(),
                    (None, _) => {
                        return Err(AppError::ValidationError(
                            "a doctor ID is required".to_string(),
                        ))
                    }
                };
                let outcome = self.emergency.mark_emergency_duty(identity, &doctor_id).await?;
                Ok(OperationOutcome::EmergencyDuty(outcome))
            }
            Operation::ViewPatientHistory { patient_id } => self.view_patient_history(user_id, &patient_id).await,
            Operation::ChangePassword {
                old_password,
                new_password,
            } => {
                self.authenticator
                    .change_password(identity, &old_password, &new_password)
                    .await?;
                Ok(OperationOutcome::PasswordChanged)
            }
            Operation::BookAppointment { doctor_id, date_time } => {
                let appointment = self.booking.book_appointment(user_id, &doctor_id, &date_time).await?;
                Ok(OperationOutcome::Appointment { appointment })
            }
            Operation::RescheduleAppointment {
                appointment_id,
                date_time,
            } => {
                let appointment = self
                    .booking
                    .reschedule_appointment(identity, &appointment_id, &date_time)
                    .await?;
                Ok(OperationOutcome::Appointment { appointment })
            }
            Operation::CancelAppointment {
                appointment_id,
                status,
                note,
            } => {
                let status = status.unwrap_or(match identity.role {
                    Role::Patient => AppointmentStatus::PatientCancelled,
                    _ => AppointmentStatus::Cancelled,
                });
                let appointment = self
                    .booking
                    .cancel_appointment(identity, &appointment_id, status, note)
                    .await?;
                Ok(OperationOutcome::Appointment { appointment })
            }
            Operation::CompleteAppointment { appointment_id } => {
                let appointment = self.booking.complete_appointment(identity, &appointment_id).await?;
                Ok(OperationOutcome::Appointment { appointment })
            }
            Operation::ViewRecords => self.view_records(user_id).await,
            Operation::RequestEmergency => {
                let appointment = self.booking.request_emergency(user_id).await?;
                Ok(OperationOutcome::Appointment { appointment })
            }
            Operation::AddDoctor {
                id,
                name,
                specialization,
                password,
            } => {
                self.validation.validate_field("doctor ID", &id)?;
                self.validation.validate_field("name", &name)?;
                self.validation.validate_field("specialization", &specialization)?;
                PasswordSecurityService::validate_new_password(&password)?;

                let doctor = Doctor::new(&id, name, specialization, PasswordSecurityService::hash_password(&password));
                let mut directory = self.directory.write().await;
                directory.add_doctor(doctor)?;
                self.audit.record_or_warn(format!("Added doctor: {}", id), user_id).await;
                info!("Doctor {} added by {}", id, user_id);

                Ok(OperationOutcome::UserAdded {
                    user_id: id,
                    role: Role::Doctor,
                })
            }
            Operation::AddPatient {
                id,
                name,
                medical_history,
                password,
            } => {
                self.validation.validate_field("patient ID", &id)?;
                self.validation.validate_field("name", &name)?;
                self.validation.validate_free_text("medical history", &medical_history)?;
                PasswordSecurityService::validate_new_password(&password)?;

                let patient = Patient::new(&id, name, medical_history, PasswordSecurityService::hash_password(&password));
                let mut directory = self.directory.write().await;
                directory.add_patient(patient)?;
                self.audit.record_or_warn(format!("Added patient: {}", id), user_id).await;
                info!("Patient {} added by {}", id, user_id);

                Ok(OperationOutcome::UserAdded {
                    user_id: id,
                    role: Role::Patient,
                })
            }
            Operation::GenerateReport => {
                let report = self.directory.read().await.report();
                self.audit.record_or_warn("Generated report", user_id).await;
                Ok(OperationOutcome::Report(report))
            }
            Operation::Backup => self.backup(user_id).await,
            Operation::ViewAuditLog { user_id: subject } => {
                let entries = match subject.as_deref() {
                    Some(subject) => self.audit.entries_for_user(subject, None).await,
                    None => self.audit.recent_entries().await,
                };
                self.audit.record_or_warn("Viewed audit log", user_id).await;
                Ok(OperationOutcome::AuditEntries { entries })
            }
        }
    }

    async fn view_patient_history(&self, doctor_id: &str, patient_id: &str) -> Result<OperationOutcome, AppError> {
        let directory = self.directory.read().await;
        let patient = directory
            .find_patient(patient_id)
            .ok_or_else(|| AppError::NotFound(format!("Patient not found: {}", patient_id)))?;

        self.audit
            .record_or_warn(format!("Viewed patient history: {}", patient_id), doctor_id)
            .await;

        Ok(OperationOutcome::PatientHistory {
            patient_id: patient.id.clone(),
            name: patient.name.clone(),
            medical_history: patient.medical_history.clone(),
        })
    }

    async fn view_records(&self, patient_id: &str) -> Result<OperationOutcome, AppError> {
        let directory = self.directory.read().await;
        let patient = directory
            .find_patient(patient_id)
            .ok_or_else(|| AppError::NotFound(format!("Patient not found: {}", patient_id)))?;
        let appointments = directory
            .appointments_for_patient(patient_id)
            .into_iter()
            .cloned()
            .collect();

        self.audit.record_or_warn("Viewed medical records", patient_id).await;

        Ok(OperationOutcome::MedicalRecords {
            patient_id: patient.id.clone(),
            medical_history: patient.medical_history.clone(),
            appointments,
        })
    }

    /// Writes the current snapshot plus the audit log into a timestamped
    /// directory under the backup root.
    async fn backup(&self, admin_id: &str) -> Result<OperationOutcome, AppError> {
        let snapshot = self.directory.read().await.snapshot();
        let stamp = self.clock.now().format(BACKUP_STAMP_FORMAT).to_string();

        let path = self
            .store
            .backup(&snapshot, &stamp)
            .await
            .map_err(|e| AppError::Io(format!("{:#}", e)))?;

        self.audit.record_or_warn("Data backup created", admin_id).await;
        info!("Backup written to {}", path.display());

        Ok(OperationOutcome::BackupCreated { path })
    }
}
