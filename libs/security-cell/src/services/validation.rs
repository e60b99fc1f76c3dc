// =====================================================================================
// VALIDATION SERVICE - FIELD AND SLOT KEY CHECKS
// =====================================================================================

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::{debug, instrument};

use shared_models::SLOT_FORMAT;

use crate::models::{SecurityError, ValidationConfig, ValidationIssue};

pub struct ValidationService {
    config: ValidationConfig,
    slot_pattern: Regex,
}

impl ValidationService {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            slot_pattern: Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}$").unwrap(),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Identifiers and names: required, short, and storable as a record field.
    #[instrument(skip(self, value))]
    pub fn validate_field(&self, field: &str, value: &str) -> Result<(), SecurityError> {
        if value.trim().is_empty() {
            return Err(ValidationIssue::Empty { field: field.to_string() }.into());
        }
        self.check_length(field, value, self.config.max_field_length)?;
        self.check_characters(field, value)
    }

    /// IDs supplied to look up an existing record. No length bound, since
    /// records loaded from disk never went through `validate_field`.
    #[instrument(skip(self, value))]
    pub fn validate_lookup_key(&self, field: &str, value: &str) -> Result<(), SecurityError> {
        if value.trim().is_empty() {
            return Err(ValidationIssue::Empty { field: field.to_string() }.into());
        }
        self.check_characters(field, value)
    }

    /// Free text such as a medical history: may be empty.
    #[instrument(skip(self, value))]
    pub fn validate_free_text(&self, field: &str, value: &str) -> Result<(), SecurityError> {
        self.check_length(field, value, self.config.max_free_text_length)?;
        self.check_characters(field, value)
    }

    /// Slot keys must be `YYYY-MM-DD HH:MM` and name a real calendar minute.
    #[instrument(skip(self))]
    pub fn validate_slot(&self, date_time: &str) -> Result<(), SecurityError> {
        let well_formed = self.slot_pattern.is_match(date_time)
            && NaiveDateTime::parse_from_str(date_time, SLOT_FORMAT).is_ok();
        if !well_formed {
            debug!("Rejecting malformed slot key: {}", date_time);
            return Err(ValidationIssue::InvalidFormat {
                field: "date_time".to_string(),
                expected: "YYYY-MM-DD HH:MM".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn check_length(&self, field: &str, value: &str, max_length: usize) -> Result<(), SecurityError> {
        let actual_length = value.chars().count();
        if actual_length > max_length {
            return Err(ValidationIssue::ExceedsMaxLength {
                field: field.to_string(),
                max_length,
                actual_length,
            }
            .into());
        }
        Ok(())
    }

    fn check_characters(&self, field: &str, value: &str) -> Result<(), SecurityError> {
        if let Some(character) = value
            .chars()
            .find(|c| self.config.forbidden_characters.contains(c))
        {
            return Err(ValidationIssue::ForbiddenCharacter {
                field: field.to_string(),
                character,
            }
            .into());
        }
        Ok(())
    }
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::with_default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_slot_keys() {
        let validator = ValidationService::with_default_config();
        assert!(validator.validate_slot("2025-04-05 10:00").is_ok());
        assert!(validator.validate_slot("2025-04-05").is_err());
        assert!(validator.validate_slot("2025-4-5 10:00").is_err());
        assert!(validator.validate_slot("2025-02-30 10:00").is_err());
        assert!(validator.validate_slot("2025-04-05 24:00").is_err());
        assert!(validator.validate_slot(" 2025-04-05 10:00").is_err());
    }

    #[test]
    fn test_fields_reject_record_separators() {
        let validator = ValidationService::with_default_config();
        assert!(validator.validate_field("name", "Dr. Ada Grey").is_ok());
        assert_matches!(
            validator.validate_field("name", "Ada|Grey"),
            Err(SecurityError::Validation(ValidationIssue::ForbiddenCharacter { character: '|', .. }))
        );
        assert_matches!(
            validator.validate_field("id", "   "),
            Err(SecurityError::Validation(ValidationIssue::Empty { .. }))
        );
        assert_matches!(
            validator.validate_free_text("medical_history", "line one\nline two"),
            Err(SecurityError::Validation(ValidationIssue::ForbiddenCharacter { character: '\n', .. }))
        );
    }

    #[test]
    fn test_free_text_may_be_empty_but_bounded() {
        let validator = ValidationService::new(ValidationConfig {
            max_free_text_length: 5,
            ..ValidationConfig::default()
        });
        assert!(validator.validate_free_text("medical_history", "").is_ok());
        assert_matches!(
            validator.validate_free_text("medical_history", "too long"),
            Err(SecurityError::Validation(ValidationIssue::ExceedsMaxLength { max_length: 5, .. }))
        );
    }

    #[test]
    fn test_lookup_keys_are_unbounded() {
        let validator = ValidationService::with_default_config();
        let long_id = "D".repeat(80);
        assert!(validator.validate_field("id", &long_id).is_err());
        assert!(validator.validate_lookup_key("user ID", &long_id).is_ok());
        assert_matches!(
            validator.validate_lookup_key("user ID", "D1\nD2"),
            Err(SecurityError::Validation(ValidationIssue::ForbiddenCharacter { character: '\n', .. }))
        );
        assert_matches!(
            validator.validate_lookup_key("user ID", ""),
            Err(SecurityError::Validation(ValidationIssue::Empty { .. }))
        );
    }
}
