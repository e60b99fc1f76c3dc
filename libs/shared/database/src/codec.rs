//! Pipe-delimited flat-file records, one per line.
//!
//! - doctor: `id|name|specialization|passwordDigest`
//! - patient: `id|name|medicalHistory|passwordDigest`
//! - appointment: `apptID|doctorID|patientID|dateTime|status|emergencyFlag`
//!
//! The last field of each record takes the remainder of the line.

use thiserror::Error;

use shared_models::{Appointment, AppointmentStatus, Doctor, Patient};

pub const FIELD_SEPARATOR: char = '|';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("empty record identifier")]
    EmptyId,

    #[error("{0}")]
    Status(#[from] shared_models::appointment::UnknownStatus),
}

fn split_fields<const N: usize>(line: &str) -> Result<[&str; N], RecordError> {
    let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
    let fields: Vec<&str> = line.splitn(N, FIELD_SEPARATOR).collect();
    let found = fields.len();
    let fields: [&str; N] = fields
        .try_into()
        .map_err(|_| RecordError::FieldCount { expected: N, found })?;
    if fields[0].is_empty() {
        return Err(RecordError::EmptyId);
    }
    Ok(fields)
}

pub fn encode_doctor(doctor: &Doctor) -> String {
    [
        doctor.id.as_str(),
        &doctor.name,
        &doctor.specialization,
        &doctor.password_digest,
    ]
    .join("|")
}

pub fn decode_doctor(line: &str) -> Result<Doctor, RecordError> {
    let [id, name, specialization, digest] = split_fields::<4>(line)?;
    Ok(Doctor::new(id, name, specialization, digest))
}

pub fn encode_patient(patient: &Patient) -> String {
    [
        patient.id.as_str(),
        &patient.name,
        &patient.medical_history,
        &patient.password_digest,
    ]
    .join("|")
}

pub fn decode_patient(line: &str) -> Result<Patient, RecordError> {
    let [id, name, history, digest] = split_fields::<4>(line)?;
    Ok(Patient::new(id, name, history, digest))
}

pub fn encode_appointment(appointment: &Appointment) -> String {
    [
        appointment.id.as_str(),
        &appointment.doctor_id,
        &appointment.patient_id,
        &appointment.date_time,
        appointment.status.as_str(),
        if appointment.is_emergency { "1" } else { "0" },
    ]
    .join("|")
}

/// Any emergency flag other than `1` reads as a regular appointment.
pub fn decode_appointment(line: &str) -> Result<Appointment, RecordError> {
    let [id, doctor_id, patient_id, date_time, status, flag] = split_fields::<6>(line)?;
    let status: AppointmentStatus = status.parse()?;
    let mut appointment = Appointment::scheduled(id, doctor_id, patient_id, date_time, flag == "1");
    appointment.status = status;
    Ok(appointment)
}
