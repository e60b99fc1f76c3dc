use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Slot keys are local date-times in this exact shape.
pub const SLOT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Length of the `YYYY-MM-DD` prefix of a slot key.
pub const DATE_PREFIX_LEN: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appointment {
    pub id: String,
    pub doctor_id: String,
    pub patient_id: String,
    pub date_time: String,
    pub status: AppointmentStatus,
    pub is_emergency: bool,
    /// Free-text reason attached on cancellation. Not persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Appointment {
    pub fn scheduled(
        id: impl Into<String>,
        doctor_id: impl Into<String>,
        patient_id: impl Into<String>,
        date_time: impl Into<String>,
        is_emergency: bool,
    ) -> Self {
        Self {
            id: id.into(),
            doctor_id: doctor_id.into(),
            patient_id: patient_id.into(),
            date_time: date_time.into(),
            status: AppointmentStatus::Scheduled,
            is_emergency,
            note: None,
        }
    }

    /// The `YYYY-MM-DD` portion of the slot key, or the whole key if shorter.
    pub fn date(&self) -> &str {
        self.date_time.get(..DATE_PREFIX_LEN).unwrap_or(&self.date_time)
    }

    pub fn occupies(&self, doctor_id: &str, date_time: &str) -> bool {
        self.status.is_active() && self.doctor_id == doctor_id && self.date_time == date_time
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    PatientCancelled,
    EmergencyCancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::PatientCancelled,
        AppointmentStatus::EmergencyCancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::PatientCancelled => "patient-cancelled",
            AppointmentStatus::EmergencyCancelled => "emergency-cancelled",
        }
    }

    /// Occupies its slot for conflict purposes.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Completed)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }

    /// `scheduled` is the only non-terminal status and nothing moves back to it.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        *self == AppointmentStatus::Scheduled && next != AppointmentStatus::Scheduled
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Cancelled
                | AppointmentStatus::PatientCancelled
                | AppointmentStatus::EmergencyCancelled
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown appointment status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for AppointmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_parse_back() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
        assert!("rescheduled".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_only_scheduled_and_completed_occupy_a_slot() {
        let mut appt = Appointment::scheduled("A1", "D1", "P1", "2025-04-05 10:00", false);
        assert!(appt.occupies("D1", "2025-04-05 10:00"));
        assert!(!appt.occupies("D2", "2025-04-05 10:00"));

        appt.status = AppointmentStatus::Completed;
        assert!(appt.occupies("D1", "2025-04-05 10:00"));

        appt.status = AppointmentStatus::PatientCancelled;
        assert!(!appt.occupies("D1", "2025-04-05 10:00"));
    }

    #[test]
    fn test_transitions_are_one_directional() {
        for next in AppointmentStatus::ALL {
            assert_eq!(
                AppointmentStatus::Scheduled.can_transition_to(next),
                next != AppointmentStatus::Scheduled
            );
        }
        for terminal in AppointmentStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(AppointmentStatus::ALL.iter().all(|next| !terminal.can_transition_to(*next)));
        }
    }

    #[test]
    fn test_date_prefix() {
        let appt = Appointment::scheduled("A1", "D1", "P1", "2025-04-05 10:00", false);
        assert_eq!(appt.date(), "2025-04-05");

        let short = Appointment::scheduled("A2", "D1", "P1", "soon", false);
        assert_eq!(short.date(), "soon");
    }
}
