use thiserror::Error;

use directory_cell::DirectoryError;
use security_cell::SecurityError;
use shared_models::AppError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid user ID or password")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Password rejected: {0}")]
    InvalidPassword(String),
}

impl From<SecurityError> for AuthError {
    fn from(error: SecurityError) -> Self {
        AuthError::InvalidPassword(error.to_string())
    }
}

impl From<DirectoryError> for AuthError {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::UserNotFound(id)
            | DirectoryError::DoctorNotFound(id)
            | DirectoryError::PatientNotFound(id) => AuthError::UserNotFound(id),
            other => AuthError::UserNotFound(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => AppError::AuthFailure,
            AuthError::UserNotFound(_) => AppError::NotFound(error.to_string()),
            AuthError::InvalidPassword(_) => AppError::ValidationError(error.to_string()),
        }
    }
}
