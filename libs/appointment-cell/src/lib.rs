// =====================================================================================
// APPOINTMENT CELL - BOOKING, LIFECYCLE & EMERGENCY OVERRIDE
// =====================================================================================

pub mod models;
pub mod services;

pub use models::{AppointmentError, EmergencyDutyOutcome};
pub use services::{
    AppointmentBookingService, AppointmentLifecycleService, ConflictDetectionService,
    EmergencyDutyService,
};
