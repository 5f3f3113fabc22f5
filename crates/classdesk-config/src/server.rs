use crate::env::{parsed_or, string_or};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Create the default roles and their permissions at boot.
    pub seed_on_startup: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: string_or("SERVER_HOST", "0.0.0.0"),
            port: parsed_or("SERVER_PORT", 3000),
            seed_on_startup: parsed_or("SEED_ON_STARTUP", true),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
