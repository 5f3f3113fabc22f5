use crate::env::string_or;

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Directory for the rolling log files.
    pub log_dir: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            log_dir: string_or("LOG_DIR", "storage/logs"),
        }
    }
}
