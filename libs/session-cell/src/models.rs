use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use appointment_cell::EmergencyDutyOutcome;
use directory_cell::DirectoryReport;
use security_cell::AuditEntry;
use shared_models::{Appointment, AppointmentStatus, Identity, Role};

/// An open login. Dropped (via logout) to close it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Session {
    pub session_id: Uuid,
    pub identity: Identity,
    pub opened_at: NaiveDateTime,
}

impl Session {
    pub fn new(identity: Identity, opened_at: NaiveDateTime) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            identity,
            opened_at,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }
}

// ==============================================================================
// OPERATIONS
// ==============================================================================

/// A request made within a session.
#[derive(Clone, PartialEq, Eq)]
pub enum Operation {
    ViewAppointments,
    UpdateAvailability {
        slot: String,
    },
    /// `None` means the calling doctor.
    MarkEmergencyDuty {
        doctor_id: Option<String>,
    },
    ViewPatientHistory {
        patient_id: String,
    },
    ChangePassword {
        old_password: String,
        new_password: String,
    },
    BookAppointment {
        doctor_id: String,
        date_time: String,
    },
    RescheduleAppointment {
        appointment_id: String,
        date_time: String,
    },
    /// Without a status, patients cancel as `patient-cancelled` and admins as `cancelled`.
    CancelAppointment {
        appointment_id: String,
        status: Option<AppointmentStatus>,
        note: Option<String>,
    },
    CompleteAppointment {
        appointment_id: String,
    },
    ViewRecords,
    RequestEmergency,
    AddDoctor {
        id: String,
        name: String,
        specialization: String,
        password: String,
    },
    AddPatient {
        id: String,
        name: String,
        medical_history: String,
        password: String,
    },
    GenerateReport,
    Backup,
    /// `None` lists the most recent entries from every user.
    ViewAuditLog {
        user_id: Option<String>,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::ViewAppointments => OperationKind::ViewAppointments,
            Operation::UpdateAvailability { .. } => OperationKind::UpdateAvailability,
            Operation::MarkEmergencyDuty { .. } => OperationKind::MarkEmergencyDuty,
            Operation::ViewPatientHistory { .. } => OperationKind::ViewPatientHistory,
            Operation::ChangePassword { .. } => OperationKind::ChangePassword,
            Operation::BookAppointment { .. } => OperationKind::BookAppointment,
            Operation::RescheduleAppointment { .. } => OperationKind::RescheduleAppointment,
            Operation::CancelAppointment { .. } => OperationKind::CancelAppointment,
            Operation::CompleteAppointment { .. } => OperationKind::CompleteAppointment,
            Operation::ViewRecords => OperationKind::ViewRecords,
            Operation::RequestEmergency => OperationKind::RequestEmergency,
            Operation::AddDoctor { .. } => OperationKind::AddDoctor,
            Operation::AddPatient { .. } => OperationKind::AddPatient,
            Operation::GenerateReport => OperationKind::GenerateReport,
            Operation::Backup => OperationKind::Backup,
            Operation::ViewAuditLog { .. } => OperationKind::ViewAuditLog,
        }
    }
}

// Operations carry passwords; only the kind is ever printed.
impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Operation").field(&self.kind()).finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    ViewAppointments,
    UpdateAvailability,
    MarkEmergencyDuty,
    ViewPatientHistory,
    ChangePassword,
    BookAppointment,
    RescheduleAppointment,
    CancelAppointment,
    CompleteAppointment,
    ViewRecords,
    RequestEmergency,
    AddDoctor,
    AddPatient,
    GenerateReport,
    Backup,
    ViewAuditLog,
}

impl OperationKind {
    pub const ALL: [OperationKind; 16] = [
        OperationKind::ViewAppointments,
        OperationKind::UpdateAvailability,
        OperationKind::MarkEmergencyDuty,
        OperationKind::ViewPatientHistory,
        OperationKind::ChangePassword,
        OperationKind::BookAppointment,
        OperationKind::RescheduleAppointment,
        OperationKind::CancelAppointment,
        OperationKind::CompleteAppointment,
        OperationKind::ViewRecords,
        OperationKind::RequestEmergency,
        OperationKind::AddDoctor,
        OperationKind::AddPatient,
        OperationKind::GenerateReport,
        OperationKind::Backup,
        OperationKind::ViewAuditLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::ViewAppointments => "view_appointments",
            OperationKind::UpdateAvailability => "update_availability",
            OperationKind::MarkEmergencyDuty => "mark_emergency_duty",
            OperationKind::ViewPatientHistory => "view_patient_history",
            OperationKind::ChangePassword => "change_password",
            OperationKind::BookAppointment => "book_appointment",
            OperationKind::RescheduleAppointment => "reschedule_appointment",
            OperationKind::CancelAppointment => "cancel_appointment",
            OperationKind::CompleteAppointment => "complete_appointment",
            OperationKind::ViewRecords => "view_records",
            OperationKind::RequestEmergency => "request_emergency",
            OperationKind::AddDoctor => "add_doctor",
            OperationKind::AddPatient => "add_patient",
            OperationKind::GenerateReport => "generate_report",
            OperationKind::Backup => "backup",
            OperationKind::ViewAuditLog => "view_audit_log",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown operation '{}'", s))
    }
}

// ==============================================================================
// OUTCOMES
// ==============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OperationOutcome {
    LoggedIn {
        session: Session,
    },
    LoggedOut {
        user_id: String,
    },
    Appointments {
        appointments: Vec<Appointment>,
    },
    Appointment {
        appointment: Appointment,
    },
    AvailabilityUpdated {
        doctor_id: String,
        slot: String,
    },
    EmergencyDuty(EmergencyDutyOutcome),
    PatientHistory {
        patient_id: String,
        name: String,
        medical_history: String,
    },
    MedicalRecords {
        patient_id: String,
        medical_history: String,
        appointments: Vec<Appointment>,
    },
    PasswordChanged,
    UserAdded {
        user_id: String,
        role: Role,
    },
    Report(DirectoryReport),
    BackupCreated {
        path: PathBuf,
    },
    AuditEntries {
        entries: Vec<AuditEntry>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_names_round_trip() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.as_str().parse::<OperationKind>(), Ok(kind));
        }
        assert!("drop_tables".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_debug_hides_passwords() {
        let op = Operation::ChangePassword {
            old_password: "old-secret".to_string(),
            new_password: "new-secret".to_string(),
        };
        let printed = format!("{:?}", op);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("ChangePassword"));
    }
}
