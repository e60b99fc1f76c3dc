// =====================================================================================
// SECURITY CELL - AUDIT TRAIL, PASSWORD HANDLING & INPUT VALIDATION
// =====================================================================================
//
// - Append-only audit log of every state-changing action
// - Password digesting and verification
// - Validation of identifiers, free text and slot keys before they reach storage
//
// =====================================================================================

pub mod models;
pub mod services;

pub use models::{AuditEntry, SecurityError, ValidationConfig, ValidationIssue};

pub use services::{
    AuditLog, AuditSink, FileAuditSink, MemoryAuditSink,
    PasswordSecurityService, ValidationService,
};
