use shared_models::Role;

use crate::models::OperationKind;

const DOCTOR_OPERATIONS: &[OperationKind] = &[
    OperationKind::ViewAppointments,
    OperationKind::UpdateAvailability,
    OperationKind::MarkEmergencyDuty,
    OperationKind::ViewPatientHistory,
    OperationKind::CompleteAppointment,
    OperationKind::ChangePassword,
];

const PATIENT_OPERATIONS: &[OperationKind] = &[
    OperationKind::BookAppointment,
    OperationKind::RescheduleAppointment,
    OperationKind::CancelAppointment,
    OperationKind::ViewRecords,
    OperationKind::RequestEmergency,
    OperationKind::ChangePassword,
];

const ADMIN_OPERATIONS: &[OperationKind] = &[
    OperationKind::AddDoctor,
    OperationKind::AddPatient,
    OperationKind::GenerateReport,
    OperationKind::MarkEmergencyDuty,
    OperationKind::RescheduleAppointment,
    OperationKind::CancelAppointment,
    OperationKind::CompleteAppointment,
    OperationKind::Backup,
    OperationKind::ViewAuditLog,
    OperationKind::ChangePassword,
];

/// Everything a role may ask for, in menu order.
pub fn permitted_operations(role: Role) -> &'static [OperationKind] {
    match role {
        Role::Doctor => DOCTOR_OPERATIONS,
        Role::Patient => PATIENT_OPERATIONS,
        Role::Admin => ADMIN_OPERATIONS,
    }
}

pub fn is_permitted(role: Role, kind: OperationKind) -> bool {
    permitted_operations(role).contains(&kind)
}
