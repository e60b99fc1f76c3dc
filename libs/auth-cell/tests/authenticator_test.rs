// =====================================================================================
// AUTH CELL TESTS - LOGIN & PASSWORD CHANGE
// =====================================================================================

use std::sync::Arc;

use assert_matches::assert_matches;

use auth_cell::{AuthError, Authenticator};
use directory_cell::Directory;
use security_cell::{AuditEntry, AuditLog, MemoryAuditSink};
use shared_models::Role;
use shared_utils::test_utils::{fixed_clock, sample_admin, sample_snapshot, TestUser, TEST_PASSWORD};

fn setup() -> (Authenticator, Arc<MemoryAuditSink>) {
    let mut directory = Directory::from_snapshot(sample_snapshot());
    directory.add_admin(sample_admin()).unwrap();
    let sink = Arc::new(MemoryAuditSink::new());
    let audit = Arc::new(AuditLog::new(sink.clone(), fixed_clock("2025-04-05 10:00")));
    (Authenticator::new(directory.into_shared(), audit), sink)
}

fn audited(sink: &MemoryAuditSink) -> Vec<(String, String)> {
    sink.lines()
        .iter()
        .filter_map(|line| AuditEntry::parse_line(line))
        .map(|entry| (entry.actor_id, entry.action))
        .collect()
}

#[tokio::test]
async fn test_each_role_authenticates() {
    let (auth, _) = setup();

    for (id, role) in [("D1", Role::Doctor), ("P2", Role::Patient), ("admin1", Role::Admin)] {
        let identity = auth.authenticate(id, TEST_PASSWORD).await.unwrap();
        assert_eq!(identity.user_id, id);
        assert_eq!(identity.role, role);
    }

    let identity = auth.authenticate("D1", TEST_PASSWORD).await.unwrap();
    assert_eq!(identity, TestUser::doctor("D1").to_identity());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_fail_and_are_audited() {
    let (auth, sink) = setup();

    assert_matches!(
        auth.authenticate("P1", "not-it").await,
        Err(AuthError::InvalidCredentials)
    );
    assert_matches!(
        auth.authenticate("ghost", TEST_PASSWORD).await,
        Err(AuthError::InvalidCredentials)
    );
    auth.authenticate("P1", TEST_PASSWORD).await.unwrap();

    assert_eq!(
        audited(&sink),
        vec![
            ("P1".to_string(), "Failed login attempt".to_string()),
            ("ghost".to_string(), "Failed login attempt".to_string()),
            ("P1".to_string(), "Logged in".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_malformed_user_id_is_rejected_without_audit() {
    let (auth, sink) = setup();

    assert_matches!(
        auth.authenticate("P1\n2025-01-01", TEST_PASSWORD).await,
        Err(AuthError::InvalidCredentials)
    );
    assert_matches!(auth.authenticate("", TEST_PASSWORD).await, Err(AuthError::InvalidCredentials));
    assert!(sink.lines().is_empty());
}

#[tokio::test]
async fn test_long_id_loaded_from_file_can_log_in() {
    let long_id = format!("D{}", "0".repeat(79));
    let mut snapshot = sample_snapshot();
    snapshot.doctors.push(TestUser::doctor(&long_id).to_doctor("Radiology"));

    let sink = Arc::new(MemoryAuditSink::new());
    let audit = Arc::new(AuditLog::new(sink.clone(), fixed_clock("2025-04-05 10:00")));
    let auth = Authenticator::new(Directory::from_snapshot(snapshot).into_shared(), audit);

    let identity = auth.authenticate(&long_id, TEST_PASSWORD).await.unwrap();
    assert_eq!(identity.role, Role::Doctor);
    assert_eq!(audited(&sink), vec![(long_id, "Logged in".to_string())]);
}

#[tokio::test]
async fn test_change_password_swaps_credentials() {
    let (auth, sink) = setup();
    let identity = auth.authenticate("D2", TEST_PASSWORD).await.unwrap();

    assert_matches!(
        auth.change_password(&identity, "wrong", "fresh-pass").await,
        Err(AuthError::InvalidCredentials)
    );
    assert_matches!(
        auth.change_password(&identity, TEST_PASSWORD, "has space").await,
        Err(AuthError::InvalidPassword(_))
    );
    assert_matches!(
        auth.change_password(&identity, TEST_PASSWORD, "").await,
        Err(AuthError::InvalidPassword(_))
    );

    auth.change_password(&identity, TEST_PASSWORD, "fresh-pass").await.unwrap();

    assert_matches!(
        auth.authenticate("D2", TEST_PASSWORD).await,
        Err(AuthError::InvalidCredentials)
    );
    assert_eq!(auth.authenticate("D2", "fresh-pass").await.unwrap().role, Role::Doctor);
    assert!(audited(&sink).contains(&("D2".to_string(), "Password changed".to_string())));
}

#[tokio::test]
async fn test_change_password_for_unknown_account() {
    let (auth, _) = setup();
    let stranger = TestUser::patient("P9").to_identity();

    assert_matches!(
        auth.change_password(&stranger, TEST_PASSWORD, "fresh-pass").await,
        Err(AuthError::UserNotFound(_))
    );
}
