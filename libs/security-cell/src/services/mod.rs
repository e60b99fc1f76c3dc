pub mod audit;
pub mod password;
pub mod validation;

pub use audit::{AuditLog, AuditSink, FileAuditSink, MemoryAuditSink};
pub use password::PasswordSecurityService;
pub use validation::ValidationService;
