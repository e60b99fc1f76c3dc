// =====================================================================================
// PASSWORD SECURITY SERVICE - DIGESTING, VERIFICATION & POLICY
// =====================================================================================

use tracing::{debug, instrument};

use shared_utils::{digests_match, password_digest};

use crate::models::{SecurityError, ValidationIssue};

pub struct PasswordSecurityService;

impl PasswordSecurityService {
    #[instrument(skip(password))]
    pub fn hash_password(password: &str) -> String {
        password_digest(password)
    }

    #[instrument(skip(password, digest))]
    pub fn verify_password(password: &str, digest: &str) -> bool {
        digests_match(digest, &password_digest(password))
    }

    /// Passwords are read as single whitespace-delimited tokens by the console,
    /// so they must be non-empty and contain no whitespace.
    #[instrument(skip(password))]
    pub fn validate_new_password(password: &str) -> Result<(), SecurityError> {
        if password.is_empty() {
            return Err(ValidationIssue::Empty { field: "password".to_string() }.into());
        }
        if let Some(character) = password.chars().find(|c| c.is_whitespace()) {
            debug!("Rejecting password containing whitespace");
            return Err(ValidationIssue::ForbiddenCharacter {
                field: "password".to_string(),
                character,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_hash_and_verify() {
        let digest = PasswordSecurityService::hash_password("admin123");
        assert_ne!(digest, "admin123");
        assert!(PasswordSecurityService::verify_password("admin123", &digest));
        assert!(!PasswordSecurityService::verify_password("admin12", &digest));
    }

    #[test]
    fn test_new_password_policy() {
        assert!(PasswordSecurityService::validate_new_password("n3w-pass").is_ok());
        assert_matches!(
            PasswordSecurityService::validate_new_password(""),
            Err(SecurityError::Validation(ValidationIssue::Empty { .. }))
        );
        assert_matches!(
            PasswordSecurityService::validate_new_password("two words"),
            Err(SecurityError::Validation(ValidationIssue::ForbiddenCharacter { character: ' ', .. }))
        );
    }
}
