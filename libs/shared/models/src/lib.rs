pub mod appointment;
pub mod auth;
pub mod error;
pub mod snapshot;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus, SLOT_FORMAT};
pub use auth::{Identity, Role};
pub use error::AppError;
pub use snapshot::Snapshot;
pub use user::{Admin, Doctor, Patient, UserAccount};
