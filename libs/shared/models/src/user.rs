use serde::Serialize;

use crate::auth::{Identity, Role};

/// Common view over the three account kinds.
pub trait UserAccount {
    const ROLE: Role;

    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn password_digest(&self) -> &str;
    fn set_password_digest(&mut self, digest: String);

    fn identity(&self) -> Identity {
        Identity::new(self.id(), self.display_name(), Self::ROLE)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialization: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub available_slots: Vec<String>,
    pub on_emergency_duty: bool,
}

impl Doctor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        specialization: impl Into<String>,
        password_digest: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specialization: specialization.into(),
            password_digest: password_digest.into(),
            available_slots: Vec::new(),
            on_emergency_duty: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub medical_history: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    /// Reverse index only; the appointment collection is authoritative.
    pub appointment_ids: Vec<String>,
}

impl Patient {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        medical_history: impl Into<String>,
        password_digest: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            medical_history: medical_history.into(),
            password_digest: password_digest.into(),
            appointment_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub password_digest: String,
}

impl Admin {
    pub fn new(id: impl Into<String>, name: impl Into<String>, password_digest: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            password_digest: password_digest.into(),
        }
    }
}

macro_rules! impl_user_account {
    ($ty:ty, $role:expr) => {
        impl UserAccount for $ty {
            const ROLE: Role = $role;

            fn id(&self) -> &str {
                &self.id
            }

            fn display_name(&self) -> &str {
                &self.name
            }

            fn password_digest(&self) -> &str {
                &self.password_digest
            }

            fn set_password_digest(&mut self, digest: String) {
                self.password_digest = digest;
            }
        }
    };
}

impl_user_account!(Doctor, Role::Doctor);
impl_user_account!(Patient, Role::Patient);
impl_user_account!(Admin, Role::Admin);
