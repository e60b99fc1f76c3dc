use serde::Serialize;
use thiserror::Error;

use directory_cell::DirectoryError;
use security_cell::SecurityError;
use shared_models::{AppError, AppointmentStatus};

// ==============================================================================
// RESULT MODELS
// ==============================================================================

/// What a switch to emergency duty did.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmergencyDutyOutcome {
    pub doctor_id: String,
    /// False when the doctor was already on duty this session.
    pub newly_on_duty: bool,
    /// Appointments moved to `emergency-cancelled`, in collection order.
    pub cancelled_appointment_ids: Vec<String>,
}

impl EmergencyDutyOutcome {
    pub fn cancelled_count(&self) -> usize {
        self.cancelled_appointment_ids.len()
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Doctor {doctor_id} is not available at {date_time}")]
    SlotNotAvailable { doctor_id: String, date_time: String },

    #[error("Doctor not found: {0}")]
    DoctorNotFound(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("No doctor is currently on emergency duty")]
    NoDoctorAvailable,

    #[error("No on-duty doctor is free at {date_time}")]
    NoOnDutyDoctorFree { date_time: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Duplicate appointment ID: {0}")]
    DuplicateId(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<DirectoryError> for AppointmentError {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::DuplicateId(id) => AppointmentError::DuplicateId(id),
            DirectoryError::SlotUnavailable { doctor_id, date_time } => {
                AppointmentError::SlotNotAvailable { doctor_id, date_time }
            }
            DirectoryError::DoctorNotFound(id) => AppointmentError::DoctorNotFound(id),
            DirectoryError::PatientNotFound(id) => AppointmentError::PatientNotFound(id),
            DirectoryError::AppointmentNotFound(id) | DirectoryError::UserNotFound(id) => {
                AppointmentError::NotFound(id)
            }
            DirectoryError::InvalidTransition { from, to } => {
                AppointmentError::InvalidStatusTransition { from, to }
            }
        }
    }
}

/// Only the validators feed this conversion. Audit writes go through
/// `AuditLog::record_or_warn` and never fail an engine operation.
impl From<SecurityError> for AppointmentError {
    fn from(error: SecurityError) -> Self {
        match error {
            SecurityError::Validation(issue) => AppointmentError::ValidationError(issue.to_string()),
            other => AppointmentError::ValidationError(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(error: AppointmentError) -> Self {
        let message = error.to_string();
        match error {
            AppointmentError::NotFound(_)
            | AppointmentError::DoctorNotFound(_)
            | AppointmentError::PatientNotFound(_) => AppError::NotFound(message),
            AppointmentError::SlotNotAvailable { .. } => AppError::SlotUnavailable(message),
            AppointmentError::NoDoctorAvailable | AppointmentError::NoOnDutyDoctorFree { .. } => {
                AppError::NoDoctorAvailable(message)
            }
            AppointmentError::Unauthorized(_) => AppError::NotPermitted(message),
            AppointmentError::InvalidStatusTransition { .. } => AppError::InvalidTransition(message),
            AppointmentError::DuplicateId(_) => AppError::DuplicateId(message),
            AppointmentError::ValidationError(_) => AppError::ValidationError(message),
        }
    }
}
