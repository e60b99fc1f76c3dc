use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),

    #[error("Not permitted: {0}")]
    NotPermitted(String),

    #[error("Duplicate ID: {0}")]
    DuplicateId(String),

    #[error("No doctor available: {0}")]
    NoDoctorAvailable(String),

    #[error("Invalid credentials")]
    AuthFailure,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("I/O error: {0}")]
    Io(String),
}
