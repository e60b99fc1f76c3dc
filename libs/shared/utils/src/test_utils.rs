use std::sync::Arc;

use shared_models::{Admin, Doctor, Identity, Patient, Role, Snapshot};

use crate::clock::FixedClock;
use crate::digest::password_digest;

pub const TEST_PASSWORD: &str = "s3cret";

pub struct TestUser {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub password: String,
}

impl TestUser {
    pub fn new(id: &str, role: Role) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Test {} {}", role, id),
            role,
            password: TEST_PASSWORD.to_string(),
        }
    }

    pub fn doctor(id: &str) -> Self {
        Self::new(id, Role::Doctor)
    }

    pub fn patient(id: &str) -> Self {
        Self::new(id, Role::Patient)
    }

    pub fn admin(id: &str) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn to_identity(&self) -> Identity {
        Identity::new(&self.id, &self.name, self.role)
    }

    pub fn to_doctor(&self, specialization: &str) -> Doctor {
        Doctor::new(&self.id, &self.name, specialization, password_digest(&self.password))
    }

    pub fn to_patient(&self, medical_history: &str) -> Patient {
        Patient::new(&self.id, &self.name, medical_history, password_digest(&self.password))
    }

    pub fn to_admin(&self) -> Admin {
        Admin::new(&self.id, &self.name, password_digest(&self.password))
    }
}

/// Two doctors (`D1` cardiology, `D2` neurology) and two patients (`P1`, `P2`).
pub fn sample_snapshot() -> Snapshot {
    Snapshot {
        doctors: vec![
            TestUser::doctor("D1").to_doctor("Cardiology"),
            TestUser::doctor("D2").to_doctor("Neurology"),
        ],
        patients: vec![
            TestUser::patient("P1").to_patient("Hypertension"),
            TestUser::patient("P2").to_patient(""),
        ],
        appointments: Vec::new(),
    }
}

pub fn sample_admin() -> Admin {
    TestUser::admin("admin1").to_admin()
}

/// Clock pinned to `slot`; panics on malformed input, tests only.
pub fn fixed_clock(slot: &str) -> Arc<FixedClock> {
    Arc::new(FixedClock::at(slot).expect("test clock slot must be YYYY-MM-DD HH:MM"))
}
