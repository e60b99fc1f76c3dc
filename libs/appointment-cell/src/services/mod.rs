pub mod booking;
pub mod conflict;
pub mod emergency;
pub mod lifecycle;

pub use booking::AppointmentBookingService;
pub use conflict::ConflictDetectionService;
pub use emergency::EmergencyDutyService;
pub use lifecycle::AppointmentLifecycleService;
