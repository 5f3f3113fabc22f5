//! PostgreSQL connection settings.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)

use std::env;
use std::fmt;

use crate::env::parsed_or;

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("DATABASE_URL must be set")]
pub struct MissingDatabaseUrl;

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, MissingDatabaseUrl> {
        let url = env::var("DATABASE_URL").map_err(|_| MissingDatabaseUrl)?;

        Ok(Self {
            url,
            max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10),
        })
    }
}

// The URL carries credentials.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}
