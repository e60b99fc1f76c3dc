// =====================================================================================
// SECURITY CELL INTEGRATION TESTS - FILE-BACKED AUDIT TRAIL
// =====================================================================================

use std::sync::Arc;

use chrono::Duration;

use security_cell::{AuditEntry, AuditLog, FileAuditSink, SecurityError};
use shared_utils::test_utils::fixed_clock;

#[tokio::test]
async fn test_file_audit_log_appends_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit_log.txt");
    std::fs::write(&path, "2025-04-04 09:00:00 | User: admin1 | Action: Logged in\n").unwrap();

    let clock = fixed_clock("2025-04-05 10:00");
    let log = AuditLog::new(FileAuditSink::new(&path), clock.clone());

    log.record("Booked appointment: A1", "P1").await.unwrap();
    clock.advance(Duration::seconds(5));
    log.record("Marked emergency duty", "D1").await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let entries: Vec<AuditEntry> = content.lines().filter_map(AuditEntry::parse_line).collect();

    assert_eq!(entries.len(), 3, "existing lines must never be truncated");
    assert_eq!(entries[1].actor_id, "P1");
    assert_eq!(entries[1].action, "Booked appointment: A1");
    assert_eq!(
        content.lines().last().unwrap(),
        "2025-04-05 10:00:05 | User: D1 | Action: Marked emergency duty"
    );
}

#[tokio::test]
async fn test_concurrent_records_are_all_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit_log.txt");
    let log = Arc::new(AuditLog::to_file(&path, fixed_clock("2025-04-05 10:00")));

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let log = Arc::clone(&log);
            tokio::spawn(async move { log.record(format!("action {}", i), "P1").await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 20);
    assert!(content.lines().all(|line| AuditEntry::parse_line(line).is_some()));

    let recent: Vec<String> = log.recent_entries().await.into_iter().map(|e| e.to_line()).collect();
    let written: Vec<&str> = content.lines().collect();
    assert_eq!(recent, written, "in-memory order must match file order");
}

#[tokio::test]
async fn test_unwritable_audit_file_surfaces_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened for appending.
    let log = AuditLog::to_file(dir.path(), fixed_clock("2025-04-05 10:00"));

    let result = log.record("Logged in", "P1").await;
    assert!(matches!(result, Err(SecurityError::AuditSinkUnavailable(_))));
}
