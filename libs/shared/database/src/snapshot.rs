use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use shared_config::{AppConfig, APPOINTMENTS_FILE, AUDIT_LOG_FILE, DOCTORS_FILE, PATIENTS_FILE};
use shared_models::Snapshot;

use crate::codec::{self, RecordError};

/// Load/save boundary for the scheduling state.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load_snapshot(&self) -> Result<Snapshot>;

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()>;

    /// Writes `snapshot` plus a copy of the audit log into a new
    /// `backup_<stamp>` directory and returns its path.
    async fn backup(&self, snapshot: &Snapshot, stamp: &str) -> Result<PathBuf>;
}

pub struct FileSnapshotStore {
    data_dir: PathBuf,
    backup_root: PathBuf,
    audit_log_path: Option<PathBuf>,
}

impl FileSnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            backup_root: data_dir.clone(),
            data_dir,
            audit_log_path: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            backup_root: config.backup_root.clone(),
            audit_log_path: Some(config.audit_log_path.clone()),
        }
    }

    pub fn with_backup_root(mut self, backup_root: impl Into<PathBuf>) -> Self {
        self.backup_root = backup_root.into();
        self
    }

    pub fn with_audit_log(mut self, audit_log_path: impl Into<PathBuf>) -> Self {
        self.audit_log_path = Some(audit_log_path.into());
        self
    }

    async fn write_snapshot_to(dir: &Path, snapshot: &Snapshot) -> Result<()> {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating data directory {}", dir.display()))?;

        write_records(
            &dir.join(DOCTORS_FILE),
            snapshot.doctors.iter().map(codec::encode_doctor),
        )
        .await?;
        write_records(
            &dir.join(PATIENTS_FILE),
            snapshot.patients.iter().map(codec::encode_patient),
        )
        .await?;
        write_records(
            &dir.join(APPOINTMENTS_FILE),
            snapshot.appointments.iter().map(codec::encode_appointment),
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    #[instrument(skip(self), fields(data_dir = %self.data_dir.display()))]
    async fn load_snapshot(&self) -> Result<Snapshot> {
        let snapshot = Snapshot {
            doctors: read_records(&self.data_dir.join(DOCTORS_FILE), codec::decode_doctor).await?,
            patients: read_records(&self.data_dir.join(PATIENTS_FILE), codec::decode_patient).await?,
            appointments: read_records(
                &self.data_dir.join(APPOINTMENTS_FILE),
                codec::decode_appointment,
            )
            .await?,
        };

        info!(
            doctors = snapshot.doctors.len(),
            patients = snapshot.patients.len(),
            appointments = snapshot.appointments.len(),
            "Data loaded"
        );
        Ok(snapshot)
    }

    #[instrument(skip(self, snapshot), fields(data_dir = %self.data_dir.display()))]
    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        Self::write_snapshot_to(&self.data_dir, snapshot).await?;
        info!("Data saved");
        Ok(())
    }

    #[instrument(skip(self, snapshot))]
    async fn backup(&self, snapshot: &Snapshot, stamp: &str) -> Result<PathBuf> {
        let backup_dir = self.backup_root.join(format!("backup_{}", stamp));
        Self::write_snapshot_to(&backup_dir, snapshot).await?;

        if let Some(audit_log) = &self.audit_log_path {
            match fs::copy(audit_log, backup_dir.join(AUDIT_LOG_FILE)).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("No audit log at {} to back up", audit_log.display());
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("copying audit log {} into backup", audit_log.display())
                    })
                }
            }
        }

        info!("Data backup completed to directory: {}", backup_dir.display());
        Ok(backup_dir)
    }
}

/// A missing file is an empty collection. Malformed lines are skipped.
async fn read_records<T>(
    path: &Path,
    decode: impl Fn(&str) -> Result<T, RecordError>,
) -> Result<Vec<T>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not found, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match decode(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed record {}:{}: {}", path.display(), index + 1, e),
        }
    }
    Ok(records)
}

/// Writes through a sibling temp file so a failed save leaves the old file intact.
async fn write_records(path: &Path, lines: impl Iterator<Item = String>) -> Result<()> {
    let mut body = String::new();
    for line in lines {
        body.push_str(&line);
        body.push('\n');
    }

    let tmp = path.with_extension("txt.tmp");
    fs::write(&tmp, body)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
