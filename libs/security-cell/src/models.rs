// =====================================================================================
// SECURITY CELL MODELS
// =====================================================================================

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use shared_models::AppError;
use shared_utils::clock::AUDIT_TIMESTAMP_FORMAT;

// =====================================================================================
// AUDIT MODELS
// =====================================================================================

/// One line of the audit trail: `YYYY-MM-DD HH:MM:SS | User: <id> | Action: <text>`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: NaiveDateTime,
    pub actor_id: String,
    pub action: String,
}

impl AuditEntry {
    pub fn new(timestamp: NaiveDateTime, actor_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            timestamp,
            actor_id: actor_id.into(),
            action: action.into(),
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "{} | User: {} | Action: {}",
            self.timestamp.format(AUDIT_TIMESTAMP_FORMAT),
            self.actor_id,
            self.action
        )
    }

    pub fn parse_line(line: &str) -> Option<Self> {
        let (timestamp, rest) = line.split_once(" | User: ")?;
        let (actor_id, action) = rest.split_once(" | Action: ")?;
        let timestamp = NaiveDateTime::parse_from_str(timestamp, AUDIT_TIMESTAMP_FORMAT).ok()?;
        Some(Self::new(timestamp, actor_id, action))
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

// =====================================================================================
// VALIDATION MODELS
// =====================================================================================

#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub max_field_length: usize,
    pub max_free_text_length: usize,
    pub forbidden_characters: Vec<char>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_field_length: 64,
            max_free_text_length: 2000,
            // Field separator and record separators of the flat-file store.
            forbidden_characters: vec!['|', '\n', '\r'],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    Empty { field: String },
    ExceedsMaxLength { field: String, max_length: usize, actual_length: usize },
    ForbiddenCharacter { field: String, character: char },
    InvalidFormat { field: String, expected: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Empty { field } => write!(f, "{} must not be empty", field),
            ValidationIssue::ExceedsMaxLength { field, max_length, actual_length } => write!(
                f,
                "{} is {} characters long, maximum is {}",
                field, actual_length, max_length
            ),
            ValidationIssue::ForbiddenCharacter { field, character } => {
                write!(f, "{} contains forbidden character {:?}", field, character)
            }
            ValidationIssue::InvalidFormat { field, expected } => {
                write!(f, "{} must match {}", field, expected)
            }
        }
    }
}

// =====================================================================================
// ERRORS
// =====================================================================================

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecurityError {
    #[error("Audit sink unavailable: {0}")]
    AuditSinkUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(ValidationIssue),
}

impl From<ValidationIssue> for SecurityError {
    fn from(issue: ValidationIssue) -> Self {
        SecurityError::Validation(issue)
    }
}

impl From<SecurityError> for AppError {
    fn from(error: SecurityError) -> Self {
        match error {
            SecurityError::AuditSinkUnavailable(msg) => AppError::Io(msg),
            SecurityError::Validation(issue) => AppError::ValidationError(issue.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_line_format() {
        let timestamp =
            NaiveDateTime::parse_from_str("2025-04-05 10:00:07", AUDIT_TIMESTAMP_FORMAT).unwrap();
        let entry = AuditEntry::new(timestamp, "P1", "Booked appointment: A1");

        assert_eq!(
            entry.to_line(),
            "2025-04-05 10:00:07 | User: P1 | Action: Booked appointment: A1"
        );
        assert_eq!(AuditEntry::parse_line(&entry.to_line()), Some(entry));
    }

    #[test]
    fn test_parse_line_rejects_foreign_text() {
        assert_eq!(AuditEntry::parse_line("Data saved successfully."), None);
        assert_eq!(AuditEntry::parse_line("yesterday | User: P1 | Action: x"), None);
    }
}
