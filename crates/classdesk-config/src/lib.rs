//! # Classdesk Config
//!
//! Configuration types for the Classdesk API.
//!
//! Every structure is loaded from environment variables with a `from_env()`
//! constructor and falls back to development defaults:
//!
//! - [`jwt`]: Bearer token signing configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`database`]: PostgreSQL connection settings
//! - [`server`]: Listen address and startup behavior
//! - [`logging`]: Log file location
//!
//! # Example
//!
//! ```ignore
//! use classdesk_config::{CorsConfig, DatabaseConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! let database_config = DatabaseConfig::from_env()?;
//! ```

pub mod cors;
pub mod database;
pub mod jwt;
pub mod logging;
pub mod server;

pub(crate) mod env;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use database::{DatabaseConfig, MissingDatabaseUrl};
pub use jwt::JwtConfig;
pub use logging::LoggingConfig;
pub use server::ServerConfig;
