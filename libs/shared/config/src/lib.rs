use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const DOCTORS_FILE: &str = "doctors.txt";
pub const PATIENTS_FILE: &str = "patients.txt";
pub const APPOINTMENTS_FILE: &str = "appointments.txt";
pub const AUDIT_LOG_FILE: &str = "audit_log.txt";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub audit_log_path: PathBuf,
    pub backup_root: PathBuf,
    pub admin_id: String,
    pub admin_name: String,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(env::var("HOSPITAL_DATA_DIR").unwrap_or_else(|_| {
            warn!("HOSPITAL_DATA_DIR not set, using current directory");
            ".".to_string()
        }));

        let config = Self {
            audit_log_path: env::var("HOSPITAL_AUDIT_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join(AUDIT_LOG_FILE)),
            backup_root: env::var("HOSPITAL_BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.clone()),
            admin_id: env::var("HOSPITAL_ADMIN_ID").unwrap_or_else(|_| {
                warn!("HOSPITAL_ADMIN_ID not set, using default");
                "admin1".to_string()
            }),
            admin_name: env::var("HOSPITAL_ADMIN_NAME")
                .unwrap_or_else(|_| "System Administrator".to_string()),
            admin_password: env::var("HOSPITAL_ADMIN_PASSWORD").unwrap_or_else(|_| {
                warn!("HOSPITAL_ADMIN_PASSWORD not set, using built-in default password");
                "admin123".to_string()
            }),
            data_dir,
        };

        if !config.is_configured() {
            warn!("Hospital data directory does not exist yet: {}", config.data_dir.display());
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        self.data_dir.is_dir()
    }
}
