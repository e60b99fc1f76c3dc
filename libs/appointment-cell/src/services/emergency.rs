use std::sync::Arc;

use tracing::{info, instrument};

use directory_cell::SharedDirectory;
use security_cell::AuditLog;
use shared_models::{AppointmentStatus, Identity};
use shared_utils::Clock;

use crate::models::{AppointmentError, EmergencyDutyOutcome};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;

const CASCADE_NOTE: &str = "Doctor on emergency duty";

/// Switches doctors to emergency duty and clears their day.
pub struct EmergencyDutyService {
    directory: SharedDirectory,
    audit: Arc<AuditLog>,
    clock: Arc<dyn Clock>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
}

impl EmergencyDutyService {
    pub fn new(directory: SharedDirectory, audit: Arc<AuditLog>, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory,
            audit,
            clock,
            conflict_service: ConflictDetectionService::new(),
            lifecycle_service: AppointmentLifecycleService::new(),
        }
    }

    /// Puts `doctor_id` on duty, then moves each of their scheduled,
    /// non-emergency appointments dated today to `emergency-cancelled`.
    /// The flag flip and the cascade share one write guard.
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn mark_emergency_duty(
        &self,
        actor: &Identity,
        doctor_id: &str,
    ) -> Result<EmergencyDutyOutcome, AppointmentError> {
        self.lifecycle_service.authorize_emergency_duty(actor, doctor_id)?;

        let today = self.clock.today();
        let mut directory = self.directory.write().await;

        let already_on_duty = directory.set_emergency_duty(doctor_id)?;
        let targets = self
            .conflict_service
            .same_day_cascade_targets(&directory, doctor_id, &today);

        for appointment_id in &targets {
            directory.set_appointment_status(
                appointment_id,
                AppointmentStatus::EmergencyCancelled,
                Some(CASCADE_NOTE.to_string()),
            )?;
            self.audit
                .record_or_warn(
                    format!(
                        "Appointment cancelled: {} Reason: {}",
                        appointment_id,
                        AppointmentStatus::EmergencyCancelled
                    ),
                    &actor.user_id,
                )
                .await;
        }

        let action = if actor.user_id == doctor_id {
            "Marked emergency duty".to_string()
        } else {
            format!("Marked emergency duty: {}", doctor_id)
        };
        self.audit.record_or_warn(action, &actor.user_id).await;

        info!(
            "Doctor {} on emergency duty, {} appointments for {} cancelled",
            doctor_id,
            targets.len(),
            today
        );

        Ok(EmergencyDutyOutcome {
            doctor_id: doctor_id.to_string(),
            newly_on_duty: !already_on_duty,
            cancelled_appointment_ids: targets,
        })
    }
}
