use shared_models::AppointmentStatus;
use session_cell::{Operation, OperationKind};

/// Separates free-text fields that may contain spaces. Stored text can
/// never contain it, so it is always safe to split on.
const FIELD_DELIMITER: char = '|';

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Login { user_id: String, password: String },
    Logout,
    Help,
    Quit,
    Run(Operation),
}

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match name {
        "login" => {
            let [user_id, password] = exact::<2>(&args, "login <user-id> <password>")?;
            Command::Login {
                user_id: user_id.to_string(),
                password: password.to_string(),
            }
        }
        "logout" => Command::Logout,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "appointments" => Command::Run(Operation::ViewAppointments),
        "availability" => {
            let [date, time] = exact::<2>(&args, usage(OperationKind::UpdateAvailability))?;
            Command::Run(Operation::UpdateAvailability {
                slot: format!("{} {}", date, time),
            })
        }
        "duty" => match args.as_slice() {
            [] => Command::Run(Operation::MarkEmergencyDuty { doctor_id: None }),
            [doctor_id] => Command::Run(Operation::MarkEmergencyDuty {
                doctor_id: Some(doctor_id.to_string()),
            }),
            _ => return Err(format!("usage: {}", usage(OperationKind::MarkEmergencyDuty))),
        },
        "history" => {
            let [patient_id] = exact::<1>(&args, usage(OperationKind::ViewPatientHistory))?;
            Command::Run(Operation::ViewPatientHistory {
                patient_id: patient_id.to_string(),
            })
        }
        "passwd" => {
            let [old_password, new_password] = exact::<2>(&args, usage(OperationKind::ChangePassword))?;
            Command::Run(Operation::ChangePassword {
                old_password: old_password.to_string(),
                new_password: new_password.to_string(),
            })
        }
        "book" => {
            let [doctor_id, date, time] = exact::<3>(&args, usage(OperationKind::BookAppointment))?;
            Command::Run(Operation::BookAppointment {
                doctor_id: doctor_id.to_string(),
                date_time: format!("{} {}", date, time),
            })
        }
        "reschedule" => {
            let [appointment_id, date, time] = exact::<3>(&args, usage(OperationKind::RescheduleAppointment))?;
            Command::Run(Operation::RescheduleAppointment {
                appointment_id: appointment_id.to_string(),
                date_time: format!("{} {}", date, time),
            })
        }
        "cancel" => parse_cancel(&args)?,
        "complete" => {
            let [appointment_id] = exact::<1>(&args, usage(OperationKind::CompleteAppointment))?;
            Command::Run(Operation::CompleteAppointment {
                appointment_id: appointment_id.to_string(),
            })
        }
        "records" => Command::Run(Operation::ViewRecords),
        "emergency" => Command::Run(Operation::RequestEmergency),
        "add-doctor" => {
            let (id, password, name, specialization) = parse_new_user(rest, usage(OperationKind::AddDoctor))?;
            Command::Run(Operation::AddDoctor {
                id,
                name,
                specialization,
                password,
            })
        }
        "add-patient" => {
            let (id, password, name, medical_history) = parse_new_user(rest, usage(OperationKind::AddPatient))?;
            Command::Run(Operation::AddPatient {
                id,
                name,
                medical_history,
                password,
            })
        }
        "report" => Command::Run(Operation::GenerateReport),
        "backup" => Command::Run(Operation::Backup),
        "audit" => match args.as_slice() {
            [] => Command::Run(Operation::ViewAuditLog { user_id: None }),
            [user_id] => Command::Run(Operation::ViewAuditLog {
                user_id: Some(user_id.to_string()),
            }),
            _ => return Err(format!("usage: {}", usage(OperationKind::ViewAuditLog))),
        },
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };

    Ok(Some(command))
}

/// Console syntax for each operation.
pub fn usage(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::ViewAppointments => "appointments",
        OperationKind::UpdateAvailability => "availability <YYYY-MM-DD> <HH:MM>",
        OperationKind::MarkEmergencyDuty => "duty [doctor-id]",
        OperationKind::ViewPatientHistory => "history <patient-id>",
        OperationKind::ChangePassword => "passwd <old> <new>",
        OperationKind::BookAppointment => "book <doctor-id> <YYYY-MM-DD> <HH:MM>",
        OperationKind::RescheduleAppointment => "reschedule <appointment-id> <YYYY-MM-DD> <HH:MM>",
        OperationKind::CancelAppointment => "cancel <appointment-id> [status] [note...]",
        OperationKind::CompleteAppointment => "complete <appointment-id>",
        OperationKind::ViewRecords => "records",
        OperationKind::RequestEmergency => "emergency",
        OperationKind::AddDoctor => "add-doctor <id> <password> <name> | <specialization>",
        OperationKind::AddPatient => "add-patient <id> <password> <name> | <medical history>",
        OperationKind::GenerateReport => "report",
        OperationKind::Backup => "backup",
        OperationKind::ViewAuditLog => "audit [user-id]",
    }
}

fn exact<'a, const N: usize>(args: &[&'a str], usage: &str) -> Result<[&'a str; N], String> {
    <[&str; N]>::try_from(args).map_err(|_| format!("usage: {}", usage))
}

fn parse_cancel(args: &[&str]) -> Result<Command, String> {
    let (appointment_id, rest) = args
        .split_first()
        .ok_or_else(|| format!("usage: {}", usage(OperationKind::CancelAppointment)))?;

    let (status, note_words) = match rest.split_first() {
        Some((first, tail)) => match first.parse::<AppointmentStatus>() {
            Ok(status) => (Some(status), tail),
            Err(_) => (None, rest),
        },
        None => (None, rest),
    };
    let note = (!note_words.is_empty()).then(|| note_words.join(" "));

    Ok(Command::Run(Operation::CancelAppointment {
        appointment_id: appointment_id.to_string(),
        status,
        note,
    }))
}

/// `<id> <password> <name words> | <free text>`
fn parse_new_user(rest: &str, usage: &str) -> Result<(String, String, String, String), String> {
    let usage_error = || format!("usage: {}", usage);

    let (head, detail) = rest.split_once(FIELD_DELIMITER).ok_or_else(usage_error)?;
    let mut words = head.split_whitespace();
    let id = words.next().ok_or_else(usage_error)?;
    let password = words.next().ok_or_else(usage_error)?;
    let name = words.collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(usage_error());
    }

    Ok((
        id.to_string(),
        password.to_string(),
        name,
        detail.trim().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_slot_arguments_are_joined() {
        assert_eq!(
            parse_command("book D1 2025-04-05 10:00").unwrap(),
            Some(Command::Run(Operation::BookAppointment {
                doctor_id: "D1".to_string(),
                date_time: "2025-04-05 10:00".to_string(),
            }))
        );
        assert!(parse_command("book D1 2025-04-05").is_err());
    }

    #[test]
    fn test_cancel_with_optional_status_and_note() {
        assert_eq!(
            parse_command("cancel A1").unwrap(),
            Some(Command::Run(Operation::CancelAppointment {
                appointment_id: "A1".to_string(),
                status: None,
                note: None,
            }))
        );
        assert_eq!(
            parse_command("cancel A1 emergency-cancelled Ward closed").unwrap(),
            Some(Command::Run(Operation::CancelAppointment {
                appointment_id: "A1".to_string(),
                status: Some(AppointmentStatus::EmergencyCancelled),
                note: Some("Ward closed".to_string()),
            }))
        );
        assert_eq!(
            parse_command("cancel A1 Feeling better").unwrap(),
            Some(Command::Run(Operation::CancelAppointment {
                appointment_id: "A1".to_string(),
                status: None,
                note: Some("Feeling better".to_string()),
            }))
        );
    }

    #[test]
    fn test_new_user_fields_split_on_delimiter() {
        assert_eq!(
            parse_command("add-patient P3 pw Jane Q Doe | Asthma, mild").unwrap(),
            Some(Command::Run(Operation::AddPatient {
                id: "P3".to_string(),
                name: "Jane Q Doe".to_string(),
                medical_history: "Asthma, mild".to_string(),
                password: "pw".to_string(),
            }))
        );
        assert!(parse_command("add-doctor D3 pw | Surgery").is_err());
        assert!(parse_command("add-doctor D3 pw Grace Hopper").is_err());
    }

    #[test]
    fn test_session_commands() {
        assert_matches!(
            parse_command("login admin1 admin123"),
            Ok(Some(Command::Login { ref user_id, .. })) if user_id == "admin1"
        );
        assert_matches!(parse_command("   "), Ok(None));
        assert_matches!(parse_command("duty"), Ok(Some(Command::Run(Operation::MarkEmergencyDuty { doctor_id: None }))));
        assert_matches!(parse_command("quit"), Ok(Some(Command::Quit)));
        assert_matches!(
            parse_command("audit P1"),
            Ok(Some(Command::Run(Operation::ViewAuditLog { user_id: Some(ref id) }))) if id == "P1"
        );
        assert!(parse_command("drop everything").is_err());
    }
}
