use crate::appointment::Appointment;
use crate::user::{Doctor, Patient};

/// Persisted state: everything except admins, who are seeded at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub doctors: Vec<Doctor>,
    pub patients: Vec<Patient>,
    pub appointments: Vec<Appointment>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty() && self.patients.is_empty() && self.appointments.is_empty()
    }
}
