use serde::Serialize;
use thiserror::Error;

use shared_models::{AppError, AppointmentStatus};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("ID already exists: {0}")]
    DuplicateId(String),

    #[error("Doctor {doctor_id} already has an active appointment at {date_time}")]
    SlotUnavailable { doctor_id: String, date_time: String },

    #[error("Doctor not found: {0}")]
    DoctorNotFound(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("Appointment status cannot change from {from} to {to}")]
    InvalidTransition { from: AppointmentStatus, to: AppointmentStatus },
}

impl From<DirectoryError> for AppError {
    fn from(error: DirectoryError) -> Self {
        let message = error.to_string();
        match error {
            DirectoryError::DuplicateId(_) => AppError::DuplicateId(message),
            DirectoryError::SlotUnavailable { .. } => AppError::SlotUnavailable(message),
            DirectoryError::DoctorNotFound(_)
            | DirectoryError::PatientNotFound(_)
            | DirectoryError::UserNotFound(_)
            | DirectoryError::AppointmentNotFound(_) => AppError::NotFound(message),
            DirectoryError::InvalidTransition { .. } => AppError::InvalidTransition(message),
        }
    }
}

/// Head counts and appointment breakdown for the admin report.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DirectoryReport {
    pub doctors: usize,
    pub patients: usize,
    pub appointments: usize,
    pub scheduled: usize,
    pub completed: usize,
    /// All three cancellation statuses together.
    pub cancelled: usize,
    pub emergency: usize,
    pub doctors_on_emergency_duty: usize,
}
