// libs/directory-cell/src/services/directory.rs
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use shared_models::{
    Admin, Appointment, AppointmentStatus, Doctor, Patient, Role, Snapshot, UserAccount,
};

use crate::models::DirectoryError;

/// The whole directory behind one lock. Check-then-act sequences must hold
/// the write guard from the check to the last mutation.
pub type SharedDirectory = Arc<RwLock<Directory>>;

/// Sole owner of doctors, patients, admins and appointments.
///
/// Lookups are linear scans in insertion order; that order is also what
/// "first match" means for authentication and emergency doctor selection.
#[derive(Debug, Default)]
pub struct Directory {
    doctors: Vec<Doctor>,
    patients: Vec<Patient>,
    admins: Vec<Admin>,
    appointments: Vec<Appointment>,
    // Loaded records that break an invariant. Not queryable, but saved back.
    quarantined: Snapshot,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from persisted state. Records that would break a
    /// directory invariant are quarantined: left out of every lookup, and
    /// written back unchanged by [`snapshot`](Self::snapshot).
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut directory = Self::new();

        for doctor in snapshot.doctors {
            if let Err(e) = directory.ensure_new_user_id(&doctor.id) {
                warn!("Quarantining doctor record: {}", e);
                directory.quarantined.doctors.push(doctor);
                continue;
            }
            directory.doctors.push(doctor);
        }
        for mut patient in snapshot.patients {
            // Rebuilt below from the appointments themselves.
            patient.appointment_ids.clear();
            if let Err(e) = directory.ensure_new_user_id(&patient.id) {
                warn!("Quarantining patient record: {}", e);
                directory.quarantined.patients.push(patient);
                continue;
            }
            directory.patients.push(patient);
        }
        for appointment in snapshot.appointments {
            if let Err(e) = directory.check_insertable(&appointment) {
                warn!("Quarantining appointment record {}: {}", appointment.id, e);
                directory.quarantined.appointments.push(appointment);
                continue;
            }
            directory.link_appointment(appointment);
        }

        if !directory.quarantined.is_empty() {
            warn!(
                doctors = directory.quarantined.doctors.len(),
                patients = directory.quarantined.patients.len(),
                appointments = directory.quarantined.appointments.len(),
                "Conflicting records kept aside, they will be saved back unchanged"
            );
        }

        directory
    }

    pub fn into_shared(self) -> SharedDirectory {
        Arc::new(RwLock::new(self))
    }

    /// Live records followed by any quarantined ones.
    pub fn snapshot(&self) -> Snapshot {
        let quarantined = &self.quarantined;
        Snapshot {
            doctors: self.doctors.iter().chain(&quarantined.doctors).cloned().collect(),
            patients: self.patients.iter().chain(&quarantined.patients).cloned().collect(),
            appointments: self
                .appointments
                .iter()
                .chain(&quarantined.appointments)
                .cloned()
                .collect(),
        }
    }

    /// Records set aside by [`from_snapshot`](Self::from_snapshot).
    pub fn quarantined(&self) -> &Snapshot {
        &self.quarantined
    }

    // ==============================================================================
    // LOOKUPS
    // ==============================================================================

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn admins(&self) -> &[Admin] {
        &self.admins
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn find_doctor(&self, id: &str) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }

    pub fn find_patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn find_admin(&self, id: &str) -> Option<&Admin> {
        self.admins.iter().find(|a| a.id == id)
    }

    pub fn find_appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn contains_user_id(&self, id: &str) -> bool {
        self.find_doctor(id).is_some() || self.find_patient(id).is_some() || self.find_admin(id).is_some()
    }

    pub fn appointments_for_doctor<'a>(&'a self, doctor_id: &'a str) -> impl Iterator<Item = &'a Appointment> + 'a {
        self.appointments.iter().filter(move |a| a.doctor_id == doctor_id)
    }

    /// Resolved through the patient's reverse index, in booking order.
    pub fn appointments_for_patient(&self, patient_id: &str) -> Vec<&Appointment> {
        self.find_patient(patient_id)
            .map(|patient| {
                patient
                    .appointment_ids
                    .iter()
                    .filter_map(|id| self.find_appointment(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True iff no `scheduled` or `completed` appointment holds exactly this slot.
    pub fn is_slot_available(&self, doctor_id: &str, date_time: &str) -> bool {
        self.is_slot_available_excluding(doctor_id, date_time, None)
    }

    /// Same as [`is_slot_available`](Self::is_slot_available), ignoring one appointment.
    pub fn is_slot_available_excluding(
        &self,
        doctor_id: &str,
        date_time: &str,
        exclude_appointment_id: Option<&str>,
    ) -> bool {
        let available = !self.appointments.iter().any(|a| {
            a.occupies(doctor_id, date_time) && Some(a.id.as_str()) != exclude_appointment_id
        });
        debug!(doctor_id, date_time, available, "Slot availability checked");
        available
    }

    /// First doctor, in collection order, who is on emergency duty and free at `date_time`.
    pub fn first_available_on_duty_doctor(&self, date_time: &str) -> Option<&Doctor> {
        self.doctors
            .iter()
            .filter(|d| d.on_emergency_duty)
            .find(|d| self.is_slot_available(&d.id, date_time))
    }

    // ==============================================================================
    // INSERTS
    // ==============================================================================

    /// User IDs are unique across all three roles.
    pub fn add_doctor(&mut self, doctor: Doctor) -> Result<(), DirectoryError> {
        self.ensure_new_user_id(&doctor.id)?;
        self.doctors.push(doctor);
        Ok(())
    }

    pub fn add_patient(&mut self, patient: Patient) -> Result<(), DirectoryError> {
        self.ensure_new_user_id(&patient.id)?;
        self.patients.push(patient);
        Ok(())
    }

    pub fn add_admin(&mut self, admin: Admin) -> Result<(), DirectoryError> {
        self.ensure_new_user_id(&admin.id)?;
        self.admins.push(admin);
        Ok(())
    }

    /// Registers an appointment and links it into its patient's index.
    ///
    /// Rejects a reused appointment ID, and an active appointment whose slot
    /// is already held. The patient need not exist: appointments refer to
    /// users by ID only.
    pub fn insert_appointment(&mut self, appointment: Appointment) -> Result<(), DirectoryError> {
        self.check_insertable(&appointment)?;
        self.link_appointment(appointment);
        Ok(())
    }

    fn check_insertable(&self, appointment: &Appointment) -> Result<(), DirectoryError> {
        if self.find_appointment(&appointment.id).is_some() {
            return Err(DirectoryError::DuplicateId(appointment.id.clone()));
        }
        if appointment.status.is_active()
            && !self.is_slot_available(&appointment.doctor_id, &appointment.date_time)
        {
            return Err(DirectoryError::SlotUnavailable {
                doctor_id: appointment.doctor_id.clone(),
                date_time: appointment.date_time.clone(),
            });
        }
        Ok(())
    }

    fn link_appointment(&mut self, appointment: Appointment) {
        if let Some(patient) = self.patients.iter_mut().find(|p| p.id == appointment.patient_id) {
            patient.appointment_ids.push(appointment.id.clone());
        }
        self.appointments.push(appointment);
    }

    fn ensure_new_user_id(&self, id: &str) -> Result<(), DirectoryError> {
        if self.contains_user_id(id) {
            return Err(DirectoryError::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    // ==============================================================================
    // NARROW MUTATORS
    // ==============================================================================

    /// Moves a `scheduled` appointment to a terminal status. Returns the previous status.
    pub fn set_appointment_status(
        &mut self,
        appointment_id: &str,
        status: AppointmentStatus,
        note: Option<String>,
    ) -> Result<AppointmentStatus, DirectoryError> {
        let appointment = self.appointment_mut(appointment_id)?;
        let previous = appointment.status;
        if !previous.can_transition_to(status) {
            return Err(DirectoryError::InvalidTransition { from: previous, to: status });
        }
        appointment.status = status;
        if note.is_some() {
            appointment.note = note;
        }
        Ok(previous)
    }

    /// Replaces an appointment's slot key. The target slot must be free of
    /// every other active appointment. Returns the previous slot key.
    pub fn move_appointment(
        &mut self,
        appointment_id: &str,
        new_date_time: &str,
    ) -> Result<String, DirectoryError> {
        let doctor_id = self
            .find_appointment(appointment_id)
            .map(|a| a.doctor_id.clone())
            .ok_or_else(|| DirectoryError::AppointmentNotFound(appointment_id.to_string()))?;

        if !self.is_slot_available_excluding(&doctor_id, new_date_time, Some(appointment_id)) {
            return Err(DirectoryError::SlotUnavailable {
                doctor_id,
                date_time: new_date_time.to_string(),
            });
        }

        let appointment = self.appointment_mut(appointment_id)?;
        Ok(std::mem::replace(&mut appointment.date_time, new_date_time.to_string()))
    }

    /// Puts a doctor on emergency duty. Returns whether they already were.
    pub fn set_emergency_duty(&mut self, doctor_id: &str) -> Result<bool, DirectoryError> {
        let doctor = self.doctor_mut(doctor_id)?;
        Ok(std::mem::replace(&mut doctor.on_emergency_duty, true))
    }

    pub fn append_available_slot(&mut self, doctor_id: &str, slot: &str) -> Result<(), DirectoryError> {
        self.doctor_mut(doctor_id)?.available_slots.push(slot.to_string());
        Ok(())
    }

    pub fn set_password_digest(
        &mut self,
        role: Role,
        user_id: &str,
        digest: String,
    ) -> Result<(), DirectoryError> {
        let not_found = || DirectoryError::UserNotFound(user_id.to_string());
        match role {
            Role::Doctor => self
                .doctors
                .iter_mut()
                .find(|d| d.id == user_id)
                .ok_or_else(not_found)?
                .set_password_digest(digest),
            Role::Patient => self
                .patients
                .iter_mut()
                .find(|p| p.id == user_id)
                .ok_or_else(not_found)?
                .set_password_digest(digest),
            Role::Admin => self
                .admins
                .iter_mut()
                .find(|a| a.id == user_id)
                .ok_or_else(not_found)?
                .set_password_digest(digest),
        }
        Ok(())
    }

    fn appointment_mut(&mut self, id: &str) -> Result<&mut Appointment, DirectoryError> {
        self.appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DirectoryError::AppointmentNotFound(id.to_string()))
    }

    fn doctor_mut(&mut self, id: &str) -> Result<&mut Doctor, DirectoryError> {
        self.doctors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| DirectoryError::DoctorNotFound(id.to_string()))
    }
}
