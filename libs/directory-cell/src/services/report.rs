use shared_models::AppointmentStatus;

use crate::models::DirectoryReport;
use crate::services::directory::Directory;

impl Directory {
    pub fn report(&self) -> DirectoryReport {
        let mut report = DirectoryReport {
            doctors: self.doctors().len(),
            patients: self.patients().len(),
            appointments: self.appointments().len(),
            doctors_on_emergency_duty: self.doctors().iter().filter(|d| d.on_emergency_duty).count(),
            ..DirectoryReport::default()
        };

        for appointment in self.appointments() {
            match appointment.status {
                AppointmentStatus::Scheduled => report.scheduled += 1,
                AppointmentStatus::Completed => report.completed += 1,
                status if status.is_cancellation() => report.cancelled += 1,
                _ => {}
            }
            if appointment.is_emergency {
                report.emergency += 1;
            }
        }

        report
    }
}
