use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use directory_cell::{Directory, SharedDirectory};
use security_cell::{AuditLog, PasswordSecurityService, ValidationService};
use shared_models::{Identity, Role, UserAccount};
use shared_utils::digests_match;

use crate::models::AuthError;

/// Credential checks and password changes against the directory.
pub struct Authenticator {
    directory: SharedDirectory,
    audit: Arc<AuditLog>,
    validation: ValidationService,
}

impl Authenticator {
    pub fn new(directory: SharedDirectory, audit: Arc<AuditLog>) -> Self {
        Self {
            directory,
            audit,
            validation: ValidationService::default(),
        }
    }

    /// Doctors are searched first, then patients, then admins. Both outcomes
    /// are audited under the supplied user ID.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, user_id: &str, password: &str) -> Result<Identity, AuthError> {
        if self.validation.validate_lookup_key("user ID", user_id).is_err() {
            warn!("Login attempt with malformed user ID");
            return Err(AuthError::InvalidCredentials);
        }

        let candidate = PasswordSecurityService::hash_password(password);
        let identity = {
            let directory = self.directory.read().await;
            find_identity(&directory, user_id, &candidate)
        };

        match identity {
            Some(identity) => {
                self.audit.record_or_warn("Logged in", user_id).await;
                info!("User {} logged in as {}", user_id, identity.role);
                Ok(identity)
            }
            None => {
                self.audit.record_or_warn("Failed login attempt", user_id).await;
                warn!("Failed login attempt for {}", user_id);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Replaces the caller's password after checking the old one.
    #[instrument(skip(self, identity, old_password, new_password), fields(user_id = %identity.user_id))]
    pub async fn change_password(
        &self,
        identity: &Identity,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        PasswordSecurityService::validate_new_password(new_password)?;

        let mut directory = self.directory.write().await;

        let current_digest = account_digest(&directory, identity.role, &identity.user_id)
            .ok_or_else(|| AuthError::UserNotFound(identity.user_id.clone()))?;
        if !PasswordSecurityService::verify_password(old_password, &current_digest) {
            warn!("Password change rejected for {}: old password mismatch", identity.user_id);
            return Err(AuthError::InvalidCredentials);
        }

        directory.set_password_digest(
            identity.role,
            &identity.user_id,
            PasswordSecurityService::hash_password(new_password),
        )?;

        self.audit.record_or_warn("Password changed", &identity.user_id).await;
        info!("Password changed for {}", identity.user_id);
        Ok(())
    }
}

fn find_identity(directory: &Directory, user_id: &str, candidate_digest: &str) -> Option<Identity> {
    match_account(directory.doctors(), user_id, candidate_digest)
        .or_else(|| match_account(directory.patients(), user_id, candidate_digest))
        .or_else(|| match_account(directory.admins(), user_id, candidate_digest))
}

fn match_account<A: UserAccount>(accounts: &[A], user_id: &str, candidate_digest: &str) -> Option<Identity> {
    let identity = accounts
        .iter()
        .filter(|account| account.id() == user_id)
        .find(|account| digests_match(account.password_digest(), candidate_digest))
        .map(|account| account.identity());
    let role = A::ROLE;
    debug!(role = %role, matched = identity.is_some(), "Checked accounts");
    identity
}

fn account_digest(directory: &Directory, role: Role, user_id: &str) -> Option<String> {
    match role {
        Role::Doctor => directory.find_doctor(user_id).map(|d| d.password_digest.clone()),
        Role::Patient => directory.find_patient(user_id).map(|p| p.password_digest.clone()),
        Role::Admin => directory.find_admin(user_id).map(|a| a.password_digest.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_utils::test_utils::{sample_admin, sample_snapshot, TEST_PASSWORD};

    #[test]
    fn test_find_identity_checks_every_role() {
        let mut directory = Directory::from_snapshot(sample_snapshot());
        directory.add_admin(sample_admin()).unwrap();
        let digest = PasswordSecurityService::hash_password(TEST_PASSWORD);

        assert_eq!(find_identity(&directory, "D2", &digest).unwrap().role, Role::Doctor);
        assert_eq!(find_identity(&directory, "P1", &digest).unwrap().role, Role::Patient);
        assert_eq!(find_identity(&directory, "admin1", &digest).unwrap().role, Role::Admin);
        assert!(find_identity(&directory, "P1", "wrong").is_none());
        assert!(find_identity(&directory, "nobody", &digest).is_none());
    }
}
