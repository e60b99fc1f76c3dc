// =====================================================================================
// AUDIT SERVICE - APPEND-ONLY TRAIL OF STATE-CHANGING ACTIONS
// =====================================================================================

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};

use shared_utils::Clock;

use crate::models::{AuditEntry, SecurityError};

const DEFAULT_RECENT_CAPACITY: usize = 1000;

/// Durable destination for audit lines. Implementations must only append.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, line: &str) -> std::io::Result<()>;
}

/// Appends to a text file, creating it on first use. Never truncates.
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuditSink for FileAuditSink {
    async fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await
    }
}

/// In-memory sink, handy in tests. Can be switched into a failing state.
#[derive(Default)]
pub struct MemoryAuditSink {
    lines: std::sync::Mutex<Vec<String>>,
    unavailable: AtomicBool,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuditSink for Arc<MemoryAuditSink> {
    async fn append(&self, line: &str) -> std::io::Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "audit sink marked unavailable",
            ));
        }
        self.lines
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "audit buffer poisoned"))?
            .push(line.to_string());
        Ok(())
    }
}

pub struct AuditLog {
    sink: Box<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    // Held across timestamp + append so file order matches call order.
    write_lock: Mutex<()>,
    recent: RwLock<VecDeque<AuditEntry>>,
    recent_capacity: usize,
}

impl AuditLog {
    pub fn new(sink: impl AuditSink + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            sink: Box::new(sink),
            clock,
            write_lock: Mutex::new(()),
            recent: RwLock::new(VecDeque::new()),
            recent_capacity: DEFAULT_RECENT_CAPACITY,
        }
    }

    pub fn to_file(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self::new(FileAuditSink::new(path), clock)
    }

    /// Appends `(now, actor_id, action)`. The entry is only kept in the
    /// recent window once the sink accepted it.
    #[instrument(skip(self, action))]
    pub async fn record(
        &self,
        action: impl Into<String> + Send,
        actor_id: &str,
    ) -> Result<AuditEntry, SecurityError> {
        let _guard = self.write_lock.lock().await;

        let entry = AuditEntry::new(self.clock.now(), actor_id, action);
        self.sink
            .append(&entry.to_line())
            .await
            .map_err(|e| SecurityError::AuditSinkUnavailable(e.to_string()))?;

        info!(actor_id = %entry.actor_id, "AUDIT: {}", entry.action);

        let mut recent = self.recent.write().await;
        recent.push_back(entry.clone());
        while recent.len() > self.recent_capacity {
            recent.pop_front();
        }

        Ok(entry)
    }

    /// Like [`record`](Self::record), but an unwritable sink is reported as a
    /// warning instead of an error. Business operations use this: the action
    /// they document has already happened.
    pub async fn record_or_warn(&self, action: impl Into<String> + Send, actor_id: &str) -> Option<AuditEntry> {
        let action = action.into();
        match self.record(action.clone(), actor_id).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(actor_id, action = %action, "AUDIT FAILURE: {}", e);
                None
            }
        }
    }

    pub async fn entries_for_user(&self, user_id: &str, limit: Option<usize>) -> Vec<AuditEntry> {
        let recent = self.recent.read().await;
        recent
            .iter()
            .filter(|entry| entry.actor_id == user_id)
            .take(limit.unwrap_or(100))
            .cloned()
            .collect()
    }

    pub async fn recent_entries(&self) -> Vec<AuditEntry> {
        self.recent.read().await.iter().cloned().collect()
    }
}
